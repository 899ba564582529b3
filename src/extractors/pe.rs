//! Windows PE images, inspected with `rpecli`.

use std::path::Path;

use crate::config::ToolPaths;
use crate::types::Source;

use super::get_lines;

pub fn extract(tools: &ToolPaths, path: &Path, source: Source) -> Vec<String> {
    let path = path.to_string_lossy();
    let path: &str = &path;

    match source {
        Source::Strings => get_lines(&tools.rpecli, &["strings", path]),
        Source::Symbols => get_lines(&tools.rpecli, &["export", path]),
        // PE images carry no Objective-C metadata
        Source::ObjcMethods => Vec::new(),
    }
}
