//! Terminal rendering for streamed answers

use sift_ai::WebSource;
use std::io::{self, Write};

/// Prints a growing answer incrementally: each update carries the full
/// cumulative text, and only the unseen suffix is written.
#[derive(Default)]
pub struct StreamPrinter {
    printed_chars: usize,
}

impl StreamPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Print whatever extends past what is already on screen.
    /// Use chars().count() for proper Unicode handling.
    pub fn update(&mut self, cumulative: &str) {
        let chars: Vec<char> = cumulative.chars().collect();
        if chars.len() > self.printed_chars {
            let suffix: String = chars[self.printed_chars..].iter().collect();
            print!("{}", suffix);
            io::stdout().flush().ok();
            self.printed_chars = chars.len();
        }
    }

    /// Whether anything has been printed yet
    pub fn has_output(&self) -> bool {
        self.printed_chars > 0
    }
}

/// Print the numbered source list for a completed answer
pub fn print_sources(sources: &[WebSource]) {
    if sources.is_empty() {
        return;
    }

    println!("\nSources:");
    for (i, source) in sources.iter().enumerate() {
        let title = if source.title.is_empty() {
            &source.uri
        } else {
            &source.title
        };
        println!("  [{}] {}", i + 1, title);
        if !source.title.is_empty() {
            println!("      {}", source.uri);
        }
    }
}
