//! Common test utilities for sparql-export integration tests

#[allow(dead_code)]
pub mod server;
#[allow(dead_code)]
pub mod targets;

#[allow(unused_imports)]
pub use server::*;
#[allow(unused_imports)]
pub use targets::*;
