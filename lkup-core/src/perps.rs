use crate::logs::LogEntry;
use std::collections::HashMap;

/// Log entries for one address, in encounter order. Never empty.
pub type AddressGroup = Vec<LogEntry>;

/// Address -> every log entry seen from it.
///
/// Append-only. Also remembers the order in which addresses were first seen,
/// so everything derived from the table iterates deterministically.
///
/// Not synchronized: only the orchestrating thread writes it.
#[derive(Debug, Default, Clone)]
pub struct PerpsTable {
    groups: HashMap<String, AddressGroup>,
    order: Vec<String>,
}

impl PerpsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `entry` to its address group. Returns `true` when this is the
    /// first entry for that address.
    pub fn add_entry(&mut self, entry: LogEntry) -> bool {
        if let Some(group) = self.groups.get_mut(&entry.address) {
            group.push(entry);
            return false;
        }

        self.order.push(entry.address.clone());
        self.groups.insert(entry.address.clone(), vec![entry]);
        true
    }

    pub fn get(&self, address: &str) -> Option<&[LogEntry]> {
        self.groups.get(address).map(Vec::as_slice)
    }

    /// Number of distinct addresses.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn entry_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Addresses in first-seen order.
    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// `(address, group)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[LogEntry])> {
        self.order
            .iter()
            .filter_map(|a| self.groups.get(a).map(|g| (a.as_str(), g.as_slice())))
    }
}
