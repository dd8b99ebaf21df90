//! Log ingestion
//!
//! Raw log text comes from a [`LogSource`] (stdin, a local file, or a remote server),
//! is split into lines, and each line is matched against the regex for its
//! [`LogFormat`]. Matching lines become [`LogEntry`] values with a UTC timestamp.
//!
//! The overall flow is:
//!
//! LogSource
//! read_to_string
//! LogParser::parse_lines
//! Vec<LogEntry>
//!

mod parse;
mod source;
mod timestamp;
mod types;

pub use parse::{LogFormat, LogParser};
pub use source::LogSource;
pub use timestamp::normalize_timestamp;
pub use types::LogEntry;
