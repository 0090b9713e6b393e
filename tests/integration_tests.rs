use anyhow::Result;
use chrono::NaiveDate;
use httpmock::prelude::*;
use rt_digest::app::{MailAssembler, TemplateSet};
use rt_digest::config::toml_config::TomlConfig;
use rt_digest::domain::model::Digest;
use rt_digest::domain::ports::DigestSink;
use rt_digest::rt::{RtClient, Session};
use rt_digest::{DigestEngine, DigestError, DigestPipeline, DigestSettings};
use secrecy::SecretString;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Mutex;

#[derive(Clone, Default)]
struct CapturingSink {
    delivered: Arc<Mutex<Vec<Digest>>>,
}

impl DigestSink for CapturingSink {
    async fn deliver(&self, digest: &Digest) -> rt_digest::Result<String> {
        self.delivered.lock().await.push(digest.clone());
        Ok("capture".to_string())
    }
}

fn write_templates(dir: &TempDir) -> Result<()> {
    std::fs::write(
        dir.path().join("change-control.txt"),
        "Ticket ${id}: ${Subject}\n  Owner: ${Owner}\n",
    )?;
    std::fs::write(
        dir.path().join("change-control-preamble.txt"),
        "Subject: Change control for ${date}\n\n${changes}-- end --\n",
    )?;
    Ok(())
}

fn settings_for(server: &MockServer, templates: &TempDir) -> Result<DigestSettings> {
    let config = TomlConfig::from_toml_str(&format!(
        r#"
[service]
base_url = "{}"

[search]
query = "Queue='change-control' AND Status='new'"
order_by = "+Starts"

[templates]
dir = "{}"
"#,
        server.base_url(),
        templates.path().to_str().unwrap().replace('\\', "/")
    ))?;
    Ok(DigestSettings::from_toml(config, "maxp")?)
}

fn mock_login(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(POST).path("/").body("user=maxp&pass=hunter2");
        then.status(200)
            .header("Set-Cookie", "RT_SID_test=cookie1; path=/");
    })
}

async fn build_pipeline(
    settings: &DigestSettings,
    sink: CapturingSink,
) -> rt_digest::Result<DigestPipeline<CapturingSink>> {
    let assembler = MailAssembler::new(TemplateSet::load(&settings.templates)?);
    let session =
        Session::authenticate(&settings.user, &SecretString::from("hunter2"), &settings.service)
            .await?;
    Ok(
        DigestPipeline::new(RtClient::new(session), settings, assembler, sink)
            .with_date(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()),
    )
}

#[tokio::test]
async fn test_end_to_end_digest_in_search_order() -> Result<()> {
    let templates = TempDir::new()?;
    write_templates(&templates)?;

    let server = MockServer::start();
    let login = mock_login(&server);
    let search = server.mock(|when, then| {
        when.method(GET)
            .path("/REST/1.0/search/ticket")
            .query_param("query", "Queue='change-control' AND Status='new'")
            .query_param("orderby", "+Starts")
            .query_param("format", "i")
            .header("cookie", "RT_SID_test=cookie1");
        then.status(200)
            .body("RT/3.8.7 200 Ok\n\nticket/204\nticket/198\n");
    });
    let show_204 = server.mock(|when, then| {
        when.method(GET).path("/REST/1.0/ticket/204/show");
        then.status(200).body(
            "RT/3.8.7 200 Ok\n\nid: ticket/204\nSubject: Core switch\n    firmware upgrade\nCF-Owner: netops\n",
        );
    });
    let show_198 = server.mock(|when, then| {
        when.method(GET).path("/REST/1.0/ticket/198/show");
        then.status(200).body(
            "RT/3.8.7 200 Ok\n\nid: ticket/198\nSubject: Mail relay patch\n\nCF-Owner: sysadmins\n",
        );
    });

    let settings = settings_for(&server, &templates)?;
    let sink = CapturingSink::default();
    let pipeline = build_pipeline(&settings, sink.clone()).await?;

    let target = DigestEngine::new(pipeline).run().await?;

    login.assert();
    search.assert();
    show_204.assert();
    show_198.assert();
    assert_eq!(target, "capture");

    let delivered = sink.delivered.lock().await;
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].ticket_count, 2);
    assert_eq!(
        delivered[0].body,
        "Subject: Change control for 2026-10-16\n\n\
         Ticket 204: Core switch firmware upgrade\n  Owner: netops\n\
         Ticket 198: Mail relay patch\n  Owner: sysadmins\n\
         -- end --\n"
    );
    Ok(())
}

#[tokio::test]
async fn test_no_matching_tickets_still_renders_preamble() -> Result<()> {
    let templates = TempDir::new()?;
    write_templates(&templates)?;

    let server = MockServer::start();
    mock_login(&server);
    server.mock(|when, then| {
        when.method(GET).path("/REST/1.0/search/ticket");
        then.status(200)
            .body("RT/3.8.7 200 Ok\n\nNo matching results.\n");
    });

    let settings = settings_for(&server, &templates)?;
    let sink = CapturingSink::default();
    let pipeline = build_pipeline(&settings, sink.clone()).await?;

    DigestEngine::new(pipeline).run().await?;

    let delivered = sink.delivered.lock().await;
    assert_eq!(delivered[0].ticket_count, 0);
    assert_eq!(
        delivered[0].body,
        "Subject: Change control for 2026-10-16\n\n-- end --\n"
    );
    Ok(())
}

#[tokio::test]
async fn test_missing_template_field_aborts_without_delivery() -> Result<()> {
    let templates = TempDir::new()?;
    write_templates(&templates)?;

    let server = MockServer::start();
    mock_login(&server);
    server.mock(|when, then| {
        when.method(GET).path("/REST/1.0/search/ticket");
        then.status(200).body("RT/3.8.7 200 Ok\n\nticket/5\n");
    });
    server.mock(|when, then| {
        when.method(GET).path("/REST/1.0/ticket/5/show");
        then.status(200)
            .body("RT/3.8.7 200 Ok\n\nid: ticket/5\nSubject: No owner here\n");
    });

    let settings = settings_for(&server, &templates)?;
    let sink = CapturingSink::default();
    let pipeline = build_pipeline(&settings, sink.clone()).await?;

    let err = DigestEngine::new(pipeline).run().await.unwrap_err();

    match err {
        DigestError::TemplateMismatch { placeholder, .. } => assert_eq!(placeholder, "Owner"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(sink.delivered.lock().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_malformed_detail_aborts_without_delivery() -> Result<()> {
    let templates = TempDir::new()?;
    write_templates(&templates)?;

    let server = MockServer::start();
    mock_login(&server);
    server.mock(|when, then| {
        when.method(GET).path("/REST/1.0/search/ticket");
        then.status(200).body("RT/3.8.7 200 Ok\n\nticket/5\n");
    });
    server.mock(|when, then| {
        when.method(GET).path("/REST/1.0/ticket/5/show");
        then.status(200)
            .body("RT/3.8.7 200 Ok\n\n    orphaned continuation\nid: ticket/5\n");
    });

    let settings = settings_for(&server, &templates)?;
    let sink = CapturingSink::default();
    let pipeline = build_pipeline(&settings, sink.clone()).await?;

    let err = DigestEngine::new(pipeline).run().await.unwrap_err();

    assert!(matches!(err, DigestError::ParseAmbiguity { line_number: 1, .. }));
    assert!(sink.delivered.lock().await.is_empty());
    Ok(())
}
