//! Shared fixtures for the replicant scenario tests: a protocol enum, a
//! server wired with every bundled object type, and builders for viewers
//! and entities.

pub mod helpers;
pub mod test_protocol;

pub use helpers::*;
pub use test_protocol::TestPacket;
