//! Configuration for the array store

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Array store configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Namespace prepended to every key as `prefix:key`
    pub key_prefix: Option<String>,
    /// Deadline for a single read (milliseconds), unbounded when unset
    pub read_timeout_ms: Option<u64>,
}

impl StoreConfig {
    /// Read deadline, if any
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }

    /// Full key as stored
    pub fn object_key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{prefix}:{key}"),
            None => key.to_string(),
        }
    }
}

/// Key-value client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server address (`host:port`)
    pub addr: String,
    /// Connect timeout (milliseconds)
    pub connect_timeout_ms: u64,
    /// Disable Nagle's algorithm on the connection
    pub nodelay: bool,
    /// Initial read buffer capacity (bytes)
    pub read_buffer_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:6379".to_string(),
            connect_timeout_ms: 5_000,
            nodelay: true,
            read_buffer_size: 64 * 1024, // 64 KB
        }
    }
}

impl ClientConfig {
    /// Config for a server at `addr`
    pub fn with_addr(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            ..Default::default()
        }
    }

    /// Connect timeout
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}
