pub mod etl;
pub mod pipeline;

pub use crate::domain::model::{Digest, RawTicket, TicketRecord};
pub use crate::domain::ports::{DigestSink, Pipeline};
pub use crate::utils::error::Result;
