use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use crate::types::FileKind;

/// Mach-O (32/64-bit, both byte orders), universal binaries and dyld shared caches.
/// Byte-swapped pairs are intentional.
pub const NATIVE_SIGNATURES: [u32; 8] = [
    0xfeedface, 0xcefaedfe, 0xfeedfacf, 0xcffaedfe, 0xcafebabe, 0xbebafeca, 0x64796C64, 0x646C7964,
];

/// `MZ` DOS header, in either byte order
pub const PE_SIGNATURES: [u32; 2] = [0x5A4D, 0x4D5A];

/// Classify a file as a native executable, a Windows PE image, or neither.
///
/// The native test wins when both would match. I/O failures never surface:
/// they only make the corresponding magic test fail.
pub fn classify(path: &Path) -> FileKind {
    let prefix = read_prefix(path);

    if is_executable(path) || is_native_magic(&prefix) {
        FileKind::NativeExecutable
    } else if has_pe_extension(path) || is_pe_magic(&prefix) {
        FileKind::WindowsPE
    } else {
        FileKind::Unclassified
    }
}

/// First bytes of the file, or fewer when it is short or unreadable.
fn read_prefix(path: &Path) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(4);
    if let Ok(file) = File::open(path) {
        let _ = file.take(4).read_to_end(&mut prefix);
    }
    prefix
}

/// Assemble `bytes` little-endian, `b0 | b1 << 8 | ...`
fn assemble(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .enumerate()
        .fold(0u32, |acc, (i, b)| acc | (u32::from(*b) << (8 * i)))
}

pub fn is_native_magic(prefix: &[u8]) -> bool {
    prefix.len() >= 4 && NATIVE_SIGNATURES.contains(&assemble(&prefix[..4]))
}

pub fn is_pe_magic(prefix: &[u8]) -> bool {
    prefix.len() >= 2 && PE_SIGNATURES.contains(&assemble(&prefix[..2]))
}

pub fn has_pe_extension(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("exe") | Some("dll")
    )
}

#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
pub fn is_executable(_path: &Path) -> bool {
    false
}

/// True when `line` contains any of `terms`.
pub fn matches<S: AsRef<str>>(line: &str, terms: &[S], case_insensitive: bool) -> bool {
    if case_insensitive {
        let line = fold_case(line);
        terms
            .iter()
            .any(|term| line.contains(&fold_case(term.as_ref())))
    } else {
        terms.iter().any(|term| line.contains(term.as_ref()))
    }
}

/// Lowercase one char at a time. Unlike `str::to_lowercase` the result of a
/// substring is always a substring of the result.
fn fold_case(s: &str) -> String {
    s.chars().flat_map(char::to_lowercase).collect()
}
