// Common test utilities

#[allow(dead_code)]
pub mod fake_server;
#[allow(dead_code)]
pub mod mock_index;
#[allow(dead_code)]
pub mod tracing;
