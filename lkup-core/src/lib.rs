pub mod config;
pub mod coordination;
pub mod enrichment;
pub mod error;
pub mod logging;
pub mod logs;
pub mod perps;
pub mod progress;
pub mod render;
pub mod sorting;
