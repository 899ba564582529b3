use std::path::PathBuf;

use serde::Serialize;

/// Kind of image a file was classified as
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// Mach-O image, universal binary, dyld cache, or anything marked executable
    NativeExecutable,
    /// Windows Portable Executable (.exe / .dll / MZ header)
    WindowsPE,
    Unclassified,
}

impl FileKind {
    pub fn is_classified(&self) -> bool {
        !matches!(self, FileKind::Unclassified)
    }

    pub fn label(&self) -> &'static str {
        match self {
            FileKind::NativeExecutable => "native executable",
            FileKind::WindowsPE => "Windows PE",
            FileKind::Unclassified => "unclassified",
        }
    }
}

/// A directory entry together with its classification
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassifiedFile {
    pub path: PathBuf,
    pub kind: FileKind,
}

/// Category an extracted line came from, in report order
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Strings,
    Symbols,
    ObjcMethods,
}

/// One line produced by an extractor
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractedLine {
    pub source: Source,
    pub text: String,
}

/// Flat, ordered list of every line extracted from one file
pub type ExtractionResult = Vec<ExtractedLine>;

/// Captured result of one external command
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubprocessOutcome {
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl SubprocessOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Everything the scan needs to know about what the user asked for
#[derive(Clone, Debug)]
pub struct SearchOptions {
    pub case_insensitive: bool,
    pub include_symbols: bool,
    pub include_objc_methods: bool,
    pub treat_all_as_executable: bool,
    pub target_path: PathBuf,
    pub search_terms: Vec<String>,
    pub format: OutputFormat,
}

/// A matching line, trimmed for display
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MatchedLine {
    pub source: Source,
    pub line: String,
}

/// A file with at least one matching line
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub kind: FileKind,
    pub matches: Vec<MatchedLine>,
}
