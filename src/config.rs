//! Locations of the external inspection utilities.

use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::FindStringError;

pub const DEFAULT_STRINGS: &str = "/usr/bin/strings";
pub const DEFAULT_NM: &str = "/usr/bin/nm";
pub const DEFAULT_MACHO: &str = "/opt/homebrew/bin/macho";
pub const DEFAULT_RPECLI: &str = "/opt/homebrew/bin/rpecli";

pub const MACHO_INSTALL_HINT: &str = "brew install macmade/tap/macho";
pub const RPECLI_INSTALL_HINT: &str = "brew install macmade/tap/rpecli";

/// Where each collaborator tool lives
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolPaths {
    /// Printable strings of native images
    pub strings: PathBuf,
    /// Symbol table of native images
    pub nm: PathBuf,
    /// Objective-C metadata (`macho -m`)
    pub macho: PathBuf,
    /// PE inspection (`rpecli strings|export`)
    pub rpecli: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            strings: PathBuf::from(DEFAULT_STRINGS),
            nm: PathBuf::from(DEFAULT_NM),
            macho: PathBuf::from(DEFAULT_MACHO),
            rpecli: PathBuf::from(DEFAULT_RPECLI),
        }
    }
}

impl ToolPaths {
    /// Resolve bare command names against `PATH`; explicit paths are kept as given.
    pub fn resolved(self) -> Self {
        Self {
            strings: resolve_tool(&self.strings),
            nm: resolve_tool(&self.nm),
            macho: resolve_tool(&self.macho),
            rpecli: resolve_tool(&self.rpecli),
        }
    }

    pub fn require_macho(&self) -> Result<(), FindStringError> {
        require(&self.macho, "macho", MACHO_INSTALL_HINT)
    }

    pub fn require_rpecli(&self) -> Result<(), FindStringError> {
        require(&self.rpecli, "rpecli", RPECLI_INSTALL_HINT)
    }
}

fn require(path: &Path, name: &'static str, hint: &'static str) -> Result<(), FindStringError> {
    if path.exists() {
        Ok(())
    } else {
        Err(FindStringError::MissingTool {
            name,
            path: path.to_path_buf(),
            hint,
        })
    }
}

/// Look a tool up on `PATH` when it is given as a bare name like `strings`.
pub fn resolve_tool(tool: &Path) -> PathBuf {
    if tool.components().count() != 1 || tool.is_absolute() {
        return tool.to_path_buf();
    }

    let Some(search_path) = env::var_os("PATH") else {
        return tool.to_path_buf();
    };

    for dir in env::split_paths(&search_path) {
        let candidate = dir.join(tool);
        if candidate.is_file() {
            debug!(
                tool = %tool.display(),
                resolved = %candidate.display(),
                "resolved tool on PATH"
            );
            return candidate;
        }
    }

    tool.to_path_buf()
}
