//! Integration tests against a mock HTTP server

mod error_handling;
mod mock_server;
mod streaming;
