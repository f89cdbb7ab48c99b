/// Re-export `Config` from `civitas-core` for use within this crate.
///
/// Environment parsing lives in the core crate so integration tests can build
/// a `Config` without depending on the server.
pub use civitas_core::config::Config;
