//! finsheet reads household budget spreadsheets and derives monthly averages, a compound savings
//! projection and a structured request for a written analysis.

pub mod aggregate;
mod api;
pub mod args;
pub mod audit;
pub mod commands;
mod config;
mod error;
pub mod model;
pub mod narrative;
pub mod parse;
pub mod projection;
pub mod session;
mod utils;


pub use api::{load_grid, Mode, Narrator, TestNarrator, TEST_MODE_VAR};
pub use config::Config;
pub use error::{error_type, Error, ErrorType, IntoResult, Result};
