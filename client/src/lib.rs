mod client;
pub mod config;
mod error;
pub mod framing;
mod mirror;
pub mod subscriber;
mod transport;

pub use client::{LedStripClient, LedStripClientBuilder, RestartPolicy};
pub use config::ConnectionConfig;
pub use error::ClientError;
pub use lumistrip_protocol as protocol;
pub use subscriber::Subscriber;
