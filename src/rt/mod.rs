//! Client side of the RT REST 1.0 interface.

pub mod client;
pub mod fetch;
pub mod parser;
pub mod query;
pub mod session;

pub use client::RtClient;
pub use session::Session;
