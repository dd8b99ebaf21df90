use chrono::{DateTime, Utc};
use std::fmt;

/// One parsed log line. Immutable once built by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub address: String,
    pub timestamp: DateTime<Utc>,
    pub text: String,
}

impl LogEntry {
    pub fn new(address: impl Into<String>, timestamp: DateTime<Utc>, text: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            timestamp,
            text: text.into(),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.address,
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.text
        )
    }
}
