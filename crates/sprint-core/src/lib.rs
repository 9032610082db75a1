pub mod board;
pub mod config;
pub mod debt;
pub mod document;
pub mod error;
pub mod github;
pub mod io;
pub mod paths;
pub mod sync;
pub mod task;
pub mod types;

pub use error::{Result, SprintError};
