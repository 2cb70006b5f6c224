//! Process-level utilities

pub mod logger;
