// src/fetch/mod.rs

pub mod csv_body;
pub mod http;
pub mod sources;

pub use csv_body::parse_csv;
pub use http::{build_client, get_bytes, get_text};
pub use sources::{default_sources, Source, SourceKind};
