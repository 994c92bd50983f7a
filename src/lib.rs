//! dbbench: backend adapters and run orchestration on top of the
//! `bench-core` execution engine.

pub mod backends;
pub mod runner;
