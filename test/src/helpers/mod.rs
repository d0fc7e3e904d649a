pub mod entity_builder;

pub use entity_builder::TestEntityBuilder;
pub use test_server::TestServer;

/// Routes `log` output through the test harness. Safe to call from every test.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
