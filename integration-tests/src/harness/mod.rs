mod fixtures;
pub mod http_stub;
pub mod resolver;
pub mod tracing;

pub use fixtures::{fixture_path, load_config, read_fixture};
pub use http_stub::{Reply, StubServer};
pub use resolver::FixedResolver;
pub use self::tracing::{CapturedEvent, init_test_tracing};
