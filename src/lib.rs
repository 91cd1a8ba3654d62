pub mod config;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod store;
pub mod table;

pub use config::Config;
pub use error::{FetchError, Result};
pub use pipeline::{fetch_source, run, RunSummary};
