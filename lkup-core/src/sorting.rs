use crate::perps::PerpsTable;
use chrono::{DateTime, Utc};

/// An address and the time of its latest log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityToken {
    pub address: String,
    pub latest: DateTime<Utc>,
}

pub type ActivityIndex = Vec<ActivityToken>;

/// One token per address, in first-seen order.
///
/// "Latest" is the last-appended entry of each group, which assumes the log is
/// time-ordered per address.
pub fn make_index(perps: &PerpsTable) -> ActivityIndex {
    perps
        .iter()
        .filter_map(|(address, group)| {
            group.last().map(|latest| ActivityToken {
                address: address.to_string(),
                latest: latest.timestamp,
            })
        })
        .collect()
}

/// Least to most recently active. Stable, so ties keep first-seen order.
pub fn sort(mut index: ActivityIndex) -> ActivityIndex {
    index.sort_by_key(|token| token.latest);
    index
}

/// Addresses ordered for presentation.
pub fn presentation_order(perps: &PerpsTable) -> Vec<String> {
    sort(make_index(perps))
        .into_iter()
        .map(|token| token.address)
        .collect()
}
