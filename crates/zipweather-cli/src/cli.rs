//! Command-line arguments and the interactive prompt's input handling.

use clap::Parser;
use std::path::PathBuf;

pub const PROMPT: &str = "Enter 5 digit zipcode (q to quit): ";

/// Look up the current temperature for a US ZIP code
#[derive(Parser, Debug)]
#[command(name = "zipweather")]
#[command(about = "Current temperature for a US ZIP code, via OpenWeatherMap")]
#[command(version)]
pub struct Cli {
    /// Run once for this ZIP code instead of prompting
    #[arg(long, value_name = "ZIP")]
    pub zip: Option<String>,

    /// Path to a config.toml (defaults to the user config directory)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// What to do with one line typed at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptAction {
    /// Five digits: run the lookup
    Lookup(String),
    /// `q`: leave without a lookup
    Quit,
    /// Anything else: ask again
    Reprompt,
}

/// Classify a raw input line. Only the line ending is stripped.
pub fn classify_input(line: &str) -> PromptAction {
    let input = line.trim_end_matches(&['\r', '\n'][..]);

    if input.len() == 5 && input.bytes().all(|b| b.is_ascii_digit()) {
        PromptAction::Lookup(input.to_string())
    } else if input == "q" {
        PromptAction::Quit
    } else {
        PromptAction::Reprompt
    }
}

/// Text printed for a finished lookup
pub fn format_temperature(zip: &str, temperature: Option<f64>) -> String {
    match temperature {
        Some(t) => format!("{}°F ({})", t, zip),
        None => format!("No temperature reported for {}", zip),
    }
}
