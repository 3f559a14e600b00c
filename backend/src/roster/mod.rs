// src/roster/mod.rs

pub mod models;

pub use models::{Agent, AgentSummary, NewAgent};
