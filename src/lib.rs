// Library root: re-exports all modules so integration tests and external
// consumers can access the crate's public API.

pub mod autopick;
pub mod config;
pub mod db;
pub mod draft;
pub mod pool;
pub mod queue;
pub mod schedule;
pub mod standings;
