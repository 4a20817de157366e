//! Link-trail core library: recovers web-fetch activity from AI coding
//! session transcripts.
//!
//! A transcript is scanned for fetch-tool blocks; each block's URL is
//! reconstructed from the surrounding conversation by a cascade of
//! provenance strategies, its result is classified as success or a typed
//! failure, and the findings are emitted as [`models::FetchRecord`]s.

pub mod config;
pub mod errors;
pub mod filesystem;
pub mod models;
pub mod pipeline;
pub mod resolve;
pub mod scanner;

pub use config::{NoiseConfig, ScanConfig};
pub use errors::{LinkTrailError, LinkTrailResult};
pub use filesystem::expand_paths;
pub use models::{ErrorKind, FetchRecord, FileScan, UrlSource};
pub use pipeline::TranscriptParser;
