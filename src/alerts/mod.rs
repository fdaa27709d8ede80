//! Alert delivery backends

mod log;
mod webhook;

pub use self::log::LogSink;
pub use webhook::WebhookSink;
