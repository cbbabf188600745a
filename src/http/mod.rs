//! HTTP server startup and graceful shutdown.
//!
//! The server speaks plain HTTP; TLS is terminated in front of it.
//! SIGTERM/SIGINT stop accepting connections and drain in-flight requests.

mod server;
mod shutdown;

pub use server::{start_server, ServerError};
