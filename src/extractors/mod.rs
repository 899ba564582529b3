//! Text extraction through external inspection tools, one module per image kind.

pub mod native;
pub mod pe;

use std::path::Path;

use tracing::debug;

use crate::config::ToolPaths;
use crate::process;
use crate::types::{
    ClassifiedFile, ExtractedLine, ExtractionResult, FileKind, SearchOptions, Source,
};

/// Runs the inspection tools for classified files
#[derive(Clone, Debug)]
pub struct Extractor {
    tools: ToolPaths,
}

impl Extractor {
    pub fn new(tools: ToolPaths) -> Self {
        Self { tools }
    }

    pub fn tools(&self) -> &ToolPaths {
        &self.tools
    }

    /// Strings, then symbols, then Objective-C methods, as enabled by `options`.
    pub fn extract(&self, file: &ClassifiedFile, options: &SearchOptions) -> ExtractionResult {
        let mut sources = vec![Source::Strings];
        if options.include_symbols {
            sources.push(Source::Symbols);
        }
        if options.include_objc_methods {
            sources.push(Source::ObjcMethods);
        }

        sources
            .into_iter()
            .flat_map(|source| {
                self.lines_for(file, source)
                    .into_iter()
                    .map(move |text| ExtractedLine { source, text })
            })
            .collect()
    }

    /// Lines of a single category for `file`.
    pub fn lines_for(&self, file: &ClassifiedFile, source: Source) -> Vec<String> {
        match file.kind {
            FileKind::NativeExecutable => native::extract(&self.tools, &file.path, source),
            FileKind::WindowsPE => pe::extract(&self.tools, &file.path, source),
            FileKind::Unclassified => Vec::new(),
        }
    }
}

/// Run a tool and split its stdout into lines.
///
/// Anything short of a clean exit with UTF-8 output yields no lines.
pub fn get_lines(command: &Path, arguments: &[&str]) -> Vec<String> {
    let outcome = match process::run(command, arguments, None) {
        Ok(outcome) => outcome,
        Err(e) => {
            debug!(command = %command.display(), "extraction skipped: {}", e);
            return Vec::new();
        }
    };

    if !outcome.success() {
        debug!(
            command = %command.display(),
            exit_code = outcome.exit_code,
            stderr = %String::from_utf8_lossy(&outcome.stderr).trim(),
            "extraction failed"
        );
        return Vec::new();
    }

    match String::from_utf8(outcome.stdout) {
        Ok(text) => text
            .lines()
            .flat_map(|line| line.split('\r'))
            .map(str::to_owned)
            .collect(),
        Err(e) => {
            debug!(command = %command.display(), "output is not UTF-8: {}", e);
            Vec::new()
        }
    }
}
