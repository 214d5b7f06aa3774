pub mod algorithm;
pub mod closed;
pub mod common;
pub mod config;
pub mod domain;
pub mod open;
pub mod pool;
pub mod solution;
pub mod stat;
