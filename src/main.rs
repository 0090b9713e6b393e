use clap::Parser;
use rt_digest::app::{MailAssembler, SmtpSink, StdoutSink, TemplateSet};
use rt_digest::domain::ports::DigestSink;
use rt_digest::rt::{RtClient, Session};
use rt_digest::utils::logger;
use rt_digest::{CliConfig, DigestEngine, DigestPipeline, DigestSettings, Result};
use secrecy::SecretString;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting rt-digest");

    if let Err(e) = run(&cli).await {
        tracing::error!(
            "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: &CliConfig) -> Result<()> {
    let settings = cli.settings()?;
    tracing::debug!("Settings: {:?}", settings);

    // Load templates before touching the network so a typo fails fast.
    let assembler = if cli.list {
        None
    } else {
        Some(MailAssembler::new(TemplateSet::load(&settings.templates)?))
    };

    let password = read_password()?;
    let session = Session::authenticate(&settings.user, &password, &settings.service).await?;
    let client = RtClient::new(session);

    let Some(assembler) = assembler else {
        for summary in client
            .search_summaries(&settings.query, &settings.order_by)
            .await?
        {
            println!("{}: {}", summary.id, summary.subject);
        }
        return Ok(());
    };

    match (&settings.to_address, settings.dry_run) {
        (Some(to), false) => {
            let sink = SmtpSink::new(
                &settings.mail.smtp_host,
                settings.mail.smtp_port,
                &settings.from_address,
                to,
            )
            .with_echo(!settings.silent);
            deliver(client, &settings, assembler, sink).await
        }
        _ => {
            if settings.dry_run {
                tracing::info!("🔍 Dry run: printing the digest instead of sending it");
            }
            deliver(client, &settings, assembler, StdoutSink).await
        }
    }
}

async fn deliver<S: DigestSink>(
    client: RtClient,
    settings: &DigestSettings,
    assembler: MailAssembler,
    sink: S,
) -> Result<()> {
    let pipeline = DigestPipeline::new(client, settings, assembler, sink);
    DigestEngine::new(pipeline).run().await?;
    Ok(())
}

fn read_password() -> Result<SecretString> {
    let password = match std::env::var("RT_PASSWORD") {
        Ok(password) => password,
        Err(_) => rpassword::prompt_password("RT password: ")?,
    };
    Ok(SecretString::from(password))
}
