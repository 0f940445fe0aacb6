//! Colored terminal messages. Everything goes to stderr so stdout stays clean for
//! `render` and `query` output that may be piped.

use colored::Colorize;
use std::path::Path;

pub fn error(msg: &str) {
    eprintln!("{} {}", "error:".red().bold(), msg);
}

pub fn warning(msg: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), msg);
}

pub fn success(msg: &str) {
    eprintln!("{} {}", "✓".green().bold(), msg);
}

/// Dimmed follow-up to an error, suggesting a fix.
pub fn hint(msg: &str) {
    eprintln!("  {} {}", "hint:".cyan(), msg.dimmed());
}

pub fn status(msg: &str) {
    eprintln!("{} {}", "→".blue(), msg);
}

pub fn path(p: &Path) -> String {
    p.display().to_string().bright_white().to_string()
}

pub fn url(u: &str) -> String {
    u.bright_blue().underline().to_string()
}

/// GraphQL type names, as they appear in messages.
pub fn type_name(name: &str) -> String {
    name.magenta().bold().to_string()
}
