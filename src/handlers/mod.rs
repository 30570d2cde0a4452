pub mod common;
pub mod dashboard;
pub mod health;

pub use crate::AppState;
