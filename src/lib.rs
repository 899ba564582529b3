pub mod cmd;
pub mod config;
pub mod error;
pub mod extractors;
pub mod process;
pub mod search;
pub mod types;
pub mod utils;

pub use config::ToolPaths;
pub use error::FindStringError;
pub use extractors::Extractor;
pub use search::{ScanSummary, Search};
pub use types::{ClassifiedFile, FileKind, FileReport, SearchOptions, Source, SubprocessOutcome};
pub use utils::{classify, matches};
