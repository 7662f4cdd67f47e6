use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Connection settings for a [`LedStripClient`](crate::LedStripClient).
/// All durations are in milliseconds on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

fn default_connect_timeout_ms() -> u64 {
    2000
}

fn default_read_timeout_ms() -> u64 {
    1000
}

fn default_settle_delay_ms() -> u64 {
    2000
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 1606,
            connect_timeout_ms: default_connect_timeout_ms(),
            read_timeout_ms: default_read_timeout_ms(),
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

impl ConnectionConfig {
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_timeouts_fall_back_to_defaults() {
        let config: ConnectionConfig =
            serde_json::from_str(r#"{"host": "lights.local", "port": 1606}"#).unwrap();
        assert_eq!(config.endpoint(), "lights.local:1606");
        assert_eq!(config.connect_timeout(), Duration::from_millis(2000));
        assert_eq!(config.read_timeout(), Duration::from_millis(1000));
        assert_eq!(config.settle_delay(), Duration::from_millis(2000));
    }
}
