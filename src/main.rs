use colored::Colorize;
use find_string::cmd::CliApp;

fn main() {
    if let Err(e) = CliApp::run() {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
