use async_trait::async_trait;
use lkup_core::enrichment::hostname::ReverseResolver;
use std::collections::HashMap;
use std::io;

/// Answers from a fixed table so tests never touch the system resolver.
#[derive(Debug, Default, Clone)]
pub struct FixedResolver {
    names: HashMap<String, String>,
}

impl FixedResolver {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            names: pairs
                .iter()
                .map(|(a, n)| (a.to_string(), n.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl ReverseResolver for FixedResolver {
    async fn reverse(&self, address: &str) -> io::Result<String> {
        self.names
            .get(address)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no PTR record"))
    }
}
