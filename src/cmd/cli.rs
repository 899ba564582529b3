use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use crate::{
    config::{ToolPaths, DEFAULT_MACHO, DEFAULT_NM, DEFAULT_RPECLI, DEFAULT_STRINGS},
    extractors::Extractor,
    search::Search,
    types::{FileReport, OutputFormat, SearchOptions},
};

#[derive(Parser, Debug)]
#[command(name = "find-string")]
#[command(about = "Search the strings, symbols and Objective-C methods of executables")]
#[command(version)]
pub struct Cli {
    /// Performs a case-insensitive search
    #[arg(long)]
    pub insensitive: bool,

    /// Also search in the symbols table
    #[arg(long)]
    pub symbols: bool,

    /// Also search in the Objective-C methods table
    #[arg(long)]
    pub objc: bool,

    /// Treat every file as an executable, skipping classification
    #[arg(long)]
    pub all: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Log debug information to stderr (overridden by RUST_LOG)
    #[arg(short, long)]
    pub verbose: bool,

    /// strings utility used for native executables
    #[arg(long, env = "FIND_STRING_STRINGS", default_value = DEFAULT_STRINGS)]
    pub strings_tool: PathBuf,

    /// nm utility used for native symbol tables
    #[arg(long, env = "FIND_STRING_NM", default_value = DEFAULT_NM)]
    pub nm_tool: PathBuf,

    /// macho utility used for Objective-C methods
    #[arg(long, env = "FIND_STRING_MACHO", default_value = DEFAULT_MACHO)]
    pub macho_tool: PathBuf,

    /// rpecli utility used for Windows PE images
    #[arg(long, env = "FIND_STRING_RPECLI", default_value = DEFAULT_RPECLI)]
    pub rpecli_tool: PathBuf,

    /// The directory to search
    pub path: PathBuf,

    /// The strings to search for
    #[arg(required = true, value_parser = non_empty)]
    pub strings: Vec<String>,
}

fn non_empty(value: &str) -> Result<String, String> {
    if value.is_empty() {
        Err("search strings must not be empty".to_string())
    } else {
        Ok(value.to_string())
    }
}

impl Cli {
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            case_insensitive: self.insensitive,
            include_symbols: self.symbols,
            include_objc_methods: self.objc,
            treat_all_as_executable: self.all,
            target_path: self.path.clone(),
            search_terms: self.strings.clone(),
            format: self.format,
        }
    }

    pub fn tool_paths(&self) -> ToolPaths {
        ToolPaths {
            strings: self.strings_tool.clone(),
            nm: self.nm_tool.clone(),
            macho: self.macho_tool.clone(),
            rpecli: self.rpecli_tool.clone(),
        }
        .resolved()
    }
}

pub struct CliApp {
    cli: Cli,
}

impl CliApp {
    pub fn new() -> Self {
        Self { cli: Cli::parse() }
    }

    pub fn run() -> Result<()> {
        let app = Self::new();
        app.init_logging();
        app.init_color();
        app.execute()
    }

    fn init_logging(&self) {
        let default = if self.cli.verbose { "debug" } else { "warn" };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    fn init_color(&self) {
        if self.cli.no_color || !std::io::stdout().is_terminal() {
            colored::control::set_override(false);
        }
    }

    fn execute(&self) -> Result<()> {
        let options = self.cli.search_options();
        let format = options.format;
        let search = Search::new(options, Extractor::new(self.cli.tool_paths()));

        match format {
            OutputFormat::Text => {
                search.run(Self::display_text_report)?;
            }
            OutputFormat::Json => {
                let mut reports = Vec::new();
                search.run(|report| reports.push(report.clone()))?;
                Self::display_json_reports(&reports)?;
            }
        }

        Ok(())
    }

    fn display_text_report(report: &FileReport) {
        println!("{}", report.path.display().to_string().bold());
        for matched in &report.matches {
            println!("    {}", matched.line);
        }
    }

    fn display_json_reports(reports: &[FileReport]) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(reports)?);
        Ok(())
    }
}

impl Default for CliApp {
    fn default() -> Self {
        Self::new()
    }
}
