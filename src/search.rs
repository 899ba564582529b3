//! Pre-flight checks, enumeration and per-file matching; printing is left to the caller.

use std::fs;
use std::path::Path;

use anyhow::Result;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::FindStringError;
use crate::extractors::Extractor;
use crate::types::{ClassifiedFile, FileKind, FileReport, MatchedLine, SearchOptions};
use crate::utils::{classify, matches};

/// Counters reported once a scan finishes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub files_seen: usize,
    pub candidates: usize,
    pub files_matched: usize,
    pub lines_matched: usize,
}

pub struct Search {
    options: SearchOptions,
    extractor: Extractor,
}

impl Search {
    pub fn new(options: SearchOptions, extractor: Extractor) -> Self {
        Self { options, extractor }
    }

    /// Run the whole scan, handing each file with matches to `on_report` as
    /// soon as it is known.
    pub fn run<F>(&self, mut on_report: F) -> Result<ScanSummary>
    where
        F: FnMut(&FileReport),
    {
        if self.options.include_objc_methods {
            self.extractor.tools().require_macho()?;
        }
        check_directory(&self.options.target_path)?;

        let mut summary = ScanSummary::default();
        let candidates = self.candidates(&mut summary);
        summary.candidates = candidates.len();

        if candidates.iter().any(|f| f.kind == FileKind::WindowsPE) {
            self.extractor.tools().require_rpecli()?;
        }

        for file in &candidates {
            if let Some(report) = self.search_file(file) {
                summary.files_matched += 1;
                summary.lines_matched += report.matches.len();
                on_report(&report);
            }
        }

        info!(
            files = summary.files_seen,
            candidates = summary.candidates,
            matched = summary.files_matched,
            lines = summary.lines_matched,
            "scan complete"
        );

        Ok(summary)
    }

    /// Every regular file under the target that should be extracted.
    fn candidates(&self, summary: &mut ScanSummary) -> Vec<ClassifiedFile> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.options.target_path).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("skipping unreadable entry: {}", e);
                    continue;
                }
            };

            let is_file = entry.file_type().is_file()
                || (entry.path_is_symlink() && entry.path().is_file());
            if !is_file {
                continue;
            }
            summary.files_seen += 1;

            let mut kind = classify(entry.path());
            if self.options.treat_all_as_executable && !kind.is_classified() {
                kind = FileKind::NativeExecutable;
            }

            if kind.is_classified() {
                debug!(path = %entry.path().display(), kind = kind.label(), "candidate");
                files.push(ClassifiedFile {
                    path: entry.into_path(),
                    kind,
                });
            }
        }

        files
    }

    /// Extract and filter one file. `None` when nothing matched.
    pub fn search_file(&self, file: &ClassifiedFile) -> Option<FileReport> {
        let lines = self.extractor.extract(file, &self.options);

        let matched: Vec<MatchedLine> = lines
            .into_iter()
            .filter(|l| {
                matches(
                    &l.text,
                    &self.options.search_terms,
                    self.options.case_insensitive,
                )
            })
            .map(|l| MatchedLine {
                source: l.source,
                line: l.text.trim().to_string(),
            })
            .collect();

        if matched.is_empty() {
            None
        } else {
            Some(FileReport {
                path: file.path.clone(),
                kind: file.kind,
                matches: matched,
            })
        }
    }
}

fn check_directory(path: &Path) -> Result<(), FindStringError> {
    if !path.exists() {
        return Err(FindStringError::DirectoryNotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(FindStringError::NotADirectory(path.to_path_buf()));
    }
    fs::read_dir(path).map_err(|source| FindStringError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::ToolPaths;
    use crate::types::{OutputFormat, Source};
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn script(path: &Path, body: &str) {
        fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    struct Fixture {
        _tools_dir: TempDir,
        target: TempDir,
        tools: ToolPaths,
    }

    fn fixture() -> Fixture {
        let tools_dir = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();

        let strings = tools_dir.path().join("strings");
        script(&strings, "echo '  hello world  '; echo 'other text'");
        let nm = tools_dir.path().join("nm");
        script(&nm, "echo '0000 T _hello_symbol'");
        let rpecli = tools_dir.path().join("rpecli");
        script(&rpecli, "echo \"pe $1 hello\"");

        let tools = ToolPaths {
            strings,
            nm,
            macho: PathBuf::from("/nonexistent/macho"),
            rpecli,
        };

        Fixture {
            _tools_dir: tools_dir,
            target,
            tools,
        }
    }

    fn options(target: &Path, terms: &[&str]) -> SearchOptions {
        SearchOptions {
            case_insensitive: false,
            include_symbols: false,
            include_objc_methods: false,
            treat_all_as_executable: false,
            target_path: target.to_path_buf(),
            search_terms: terms.iter().map(|t| t.to_string()).collect(),
            format: OutputFormat::Text,
        }
    }

    fn new_search(target: &Path, terms: &[&str], tools: &ToolPaths) -> Search {
        Search::new(options(target, terms), Extractor::new(tools.clone()))
    }

    fn collect(search: &Search) -> (Vec<FileReport>, ScanSummary) {
        let mut reports = Vec::new();
        let summary = search.run(|r| reports.push(r.clone())).unwrap();
        (reports, summary)
    }

    #[test]
    fn test_reports_trimmed_matches_for_executables() {
        let fx = fixture();
        let exe = fx.target.path().join("app");
        script(&exe, "true");

        let search = new_search(fx.target.path(), &["hello"], &fx.tools);
        let (reports, summary) = collect(&search);

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].path, exe);
        assert_eq!(reports[0].kind, FileKind::NativeExecutable);
        assert_eq!(
            reports[0].matches,
            vec![MatchedLine {
                source: Source::Strings,
                line: "hello world".to_string()
            }]
        );
        assert_eq!(summary.files_matched, 1);
        assert_eq!(summary.lines_matched, 1);
    }

    #[test]
    fn test_symbols_follow_strings() {
        let fx = fixture();
        script(&fx.target.path().join("app"), "true");

        let mut opts = options(fx.target.path(), &["hello"]);
        opts.include_symbols = true;
        let search = Search::new(opts, Extractor::new(fx.tools.clone()));
        let (reports, _) = collect(&search);

        let sources: Vec<_> = reports[0].matches.iter().map(|m| m.source).collect();
        assert_eq!(sources, vec![Source::Strings, Source::Symbols]);
    }

    #[test]
    fn test_unclassified_files_are_never_extracted() {
        let fx = fixture();
        fs::write(fx.target.path().join("notes.txt"), "hello world").unwrap();

        let search = new_search(fx.target.path(), &["hello"], &fx.tools);
        let (reports, summary) = collect(&search);

        assert!(reports.is_empty());
        assert_eq!(summary.files_seen, 1);
        assert_eq!(summary.candidates, 0);
    }

    #[test]
    fn test_all_flag_extracts_everything() {
        let fx = fixture();
        fs::write(fx.target.path().join("notes.txt"), "irrelevant").unwrap();

        let mut opts = options(fx.target.path(), &["hello"]);
        opts.treat_all_as_executable = true;
        let search = Search::new(opts, Extractor::new(fx.tools.clone()));
        let (reports, _) = collect(&search);

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].kind, FileKind::NativeExecutable);
    }

    #[test]
    fn test_pe_files_use_pe_tool() {
        let fx = fixture();
        fs::write(fx.target.path().join("setup.exe"), "MZ").unwrap();

        let search = new_search(fx.target.path(), &["hello"], &fx.tools);
        let (reports, _) = collect(&search);

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].kind, FileKind::WindowsPE);
        assert_eq!(reports[0].matches[0].line, "pe strings hello");
    }

    #[test]
    fn test_missing_pe_tool_is_fatal_only_with_pe_files() {
        let fx = fixture();
        let tools = ToolPaths {
            rpecli: PathBuf::from("/nonexistent/rpecli"),
            ..fx.tools.clone()
        };
        script(&fx.target.path().join("app"), "true");

        let search = new_search(fx.target.path(), &["hello"], &tools);
        assert!(search.run(|_| {}).is_ok());

        fs::write(fx.target.path().join("setup.dll"), "").unwrap();
        let search = new_search(fx.target.path(), &["hello"], &tools);
        let mut reported = 0;
        let err = search.run(|_| reported += 1).unwrap_err();
        assert!(err.to_string().contains("rpecli"));
        assert_eq!(reported, 0);
    }

    #[test]
    fn test_missing_objc_tool_is_fatal_before_enumeration() {
        let fx = fixture();
        let mut opts = options(Path::new("/nonexistent/dir"), &["hello"]);
        opts.include_objc_methods = true;
        let search = Search::new(opts, Extractor::new(fx.tools.clone()));

        let err = search.run(|_| {}).unwrap_err();
        let err = err.downcast::<FindStringError>().unwrap();
        assert!(matches!(err, FindStringError::MissingTool { name: "macho", .. }));
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let fx = fixture();
        let search = new_search(Path::new("/nonexistent/dir"), &["x"], &fx.tools);
        let err = search.run(|_| {}).unwrap_err();
        assert!(matches!(
            err.downcast::<FindStringError>().unwrap(),
            FindStringError::DirectoryNotFound(_)
        ));

        let file = fx.target.path().join("plain");
        fs::write(&file, "").unwrap();
        let search = new_search(&file, &["x"], &fx.tools);
        assert!(matches!(
            search.run(|_| {}).unwrap_err().downcast::<FindStringError>().unwrap(),
            FindStringError::NotADirectory(_)
        ));
    }

    #[test]
    fn test_unreadable_directory_is_fatal() {
        let fx = fixture();
        let locked = fx.target.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users can still list it; nothing to check then.
        let listable = fs::read_dir(&locked).is_ok();
        let result = new_search(&locked, &["x"], &fx.tools).run(|_| {});
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        if listable {
            return;
        }

        let err = result.unwrap_err().downcast::<FindStringError>().unwrap();
        assert!(matches!(err, FindStringError::Unreadable { .. }));
        assert!(err.to_string().contains("locked"));
    }

    #[test]
    fn test_nested_directories_are_walked_in_order() {
        let fx = fixture();
        fs::create_dir_all(fx.target.path().join("b/inner")).unwrap();
        script(&fx.target.path().join("b/inner/tool"), "true");
        script(&fx.target.path().join("a"), "true");

        let search = new_search(fx.target.path(), &["hello"], &fx.tools);
        let (reports, _) = collect(&search);

        let paths: Vec<_> = reports.iter().map(|r| r.path.clone()).collect();
        assert_eq!(
            paths,
            vec![fx.target.path().join("a"), fx.target.path().join("b/inner/tool")]
        );
    }
}
