use crate::logs::timestamp::normalize_timestamp;
use crate::logs::types::LogEntry;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static ACCESS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(\S+).+\[(.+)] "([^"]+)""#).expect("valid access log regex"));

static ERROR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(.+)] \[core:info] \[.+] \[client (\S+):\S+](.+)").expect("valid error log regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Combined/common access log. Also covers the small "other" log.
    Access,
    /// Apache error log, `core:info` client lines only.
    Error,
}

/// Capture group positions for one format.
struct Layout {
    re: &'static Regex,
    address: usize,
    time: usize,
    text: usize,
}

impl LogFormat {
    fn layout(self) -> Layout {
        match self {
            LogFormat::Access => Layout {
                re: &ACCESS_RE,
                address: 1,
                time: 2,
                text: 3,
            },
            LogFormat::Error => Layout {
                re: &ERROR_RE,
                address: 2,
                time: 1,
                text: 3,
            },
        }
    }
}

#[derive(Debug, PartialEq)]
enum Parsed {
    Entry(LogEntry),
    NoMatch,
    Excluded,
    BadTimestamp(String),
}

pub struct LogParser {
    format: LogFormat,
    exclude: HashSet<String>,
}

impl LogParser {
    pub fn new(format: LogFormat, exclude: HashSet<String>) -> Self {
        Self { format, exclude }
    }

    /// Parse one line. Non-matching, excluded, and undatable lines yield `None`.
    pub fn parse_line(&self, line: &str) -> Option<LogEntry> {
        match self.classify(line) {
            Parsed::Entry(entry) => Some(entry),
            _ => None,
        }
    }

    /// Parse every line, preserving input order.
    pub fn parse_lines<I, S>(&self, lines: I) -> Vec<LogEntry>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries = Vec::new();
        let mut skipped = 0usize;
        let mut excluded = 0usize;

        for (lineno, line) in lines.into_iter().enumerate() {
            match self.classify(line.as_ref()) {
                Parsed::Entry(entry) => entries.push(entry),
                Parsed::NoMatch => skipped += 1,
                Parsed::Excluded => excluded += 1,
                Parsed::BadTimestamp(raw) => {
                    tracing::warn!(line = lineno + 1, timestamp = %raw, "unparseable timestamp, line skipped");
                    skipped += 1;
                }
            }
        }

        tracing::debug!(
            format = ?self.format,
            parsed = entries.len(),
            skipped,
            excluded,
            "log parsed"
        );

        entries
    }

    fn classify(&self, line: &str) -> Parsed {
        let layout = self.format.layout();

        let Some(caps) = layout.re.captures(line) else {
            return Parsed::NoMatch;
        };

        let field = |i: usize| caps.get(i).map(|m| m.as_str()).unwrap_or_default();

        let address = field(layout.address);
        if self.exclude.contains(address) {
            return Parsed::Excluded;
        }

        let raw_time = field(layout.time);
        let Some(timestamp) = normalize_timestamp(raw_time) else {
            return Parsed::BadTimestamp(raw_time.to_string());
        };

        Parsed::Entry(LogEntry::new(address, timestamp, field(layout.text)))
    }
}
