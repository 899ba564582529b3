use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, FindStringError>;

/// Fatal conditions detected before or while setting up a scan
#[derive(thiserror::Error, Debug)]
pub enum FindStringError {
    #[error("The {name} utility is not installed at {}\nPlease run: {hint}", .path.display())]
    MissingTool {
        name: &'static str,
        path: PathBuf,
        hint: &'static str,
    },
    #[error("Cannot enumerate directory {}: no such file or directory", .0.display())]
    DirectoryNotFound(PathBuf),
    #[error("Cannot enumerate directory {}: not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("Cannot enumerate directory {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Command not found: {}", .0.display())]
    CommandNotFound(PathBuf),
    #[error("{0}")]
    IOError(#[from] std::io::Error),
}
