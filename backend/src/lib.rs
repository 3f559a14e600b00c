// src/lib.rs

pub mod config;
pub mod db;
pub mod error;
pub mod roster;
pub mod routes;
pub mod store;
pub mod upload;

pub use error::AppError;
pub use routes::{build_router, AppState};
