use lkup_core::config::LkupConfig;
use std::path::PathBuf;

pub fn fixture_path(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(file)
}

pub fn read_fixture(file: &str) -> String {
    std::fs::read_to_string(fixture_path(file))
        .unwrap_or_else(|e| panic!("failed to read fixture {file}: {e}"))
}

pub fn load_config(file: &str) -> LkupConfig {
    LkupConfig::load(Some(&fixture_path(file)))
        .unwrap_or_else(|e| panic!("failed to load config fixture {file}: {e}"))
}
