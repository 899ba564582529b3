//! Mach-O images and anything else marked executable.

use std::path::Path;

use crate::config::ToolPaths;
use crate::types::Source;

use super::get_lines;

pub fn extract(tools: &ToolPaths, path: &Path, source: Source) -> Vec<String> {
    let path = path.to_string_lossy();
    let path: &str = &path;

    match source {
        Source::Strings => get_lines(&tools.strings, &[path]),
        Source::Symbols => get_lines(&tools.nm, &[path]),
        Source::ObjcMethods => get_lines(&tools.macho, &["-m", path]),
    }
}
