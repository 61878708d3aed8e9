//! Interactive collection of the code description.
//!
//! The collector prints a short banner, shows a `> ` prompt and reads a
//! single line. Reader and writer are injected so the dialog can be driven
//! from tests without a terminal.

use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use tracing::debug;

/// Reads one description line from the user.
pub struct InputCollector;

impl InputCollector {
    pub fn new() -> Self {
        Self
    }

    /// Prints the banner and reads one line from the given streams.
    ///
    /// Returns `None` when the input is already exhausted, otherwise the line
    /// with its line ending stripped (which may be empty).
    ///
    /// # Errors
    ///
    /// Returns an error if writing the banner or reading the line fails.
    pub fn collect_with_io<R: BufRead, W: Write>(
        &self,
        input: &mut R,
        output: &mut W,
    ) -> Result<Option<String>> {
        writeln!(output, "--- Gemma Code Generator ---")?;
        writeln!(
            output,
            "Describe the code you want me to generate (e.g., 'a function to check if a number is prime')."
        )?;
        writeln!(output, "Press Enter when you are finished.")?;
        write!(output, "> ")?;
        output.flush()?;

        let mut line = String::new();
        let read = input
            .read_line(&mut line)
            .context("Failed to read description")?;
        if read == 0 {
            debug!("End of input reached before a description was entered");
            return Ok(None);
        }

        let trimmed = line.strip_suffix('\n').unwrap_or(&line);
        let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
        Ok(Some(trimmed.to_string()))
    }
}

impl Default for InputCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn collect(input: &str) -> (Option<String>, String) {
        let mut reader = Cursor::new(input.as_bytes().to_vec());
        let mut output = Vec::new();
        let line = InputCollector::new()
            .collect_with_io(&mut reader, &mut output)
            .unwrap();
        (line, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_collect_reads_single_line() {
        let (line, _) = collect("a function to check if a number is prime\nignored\n");
        assert_eq!(line.as_deref(), Some("a function to check if a number is prime"));
    }

    #[test]
    fn test_collect_strips_crlf() {
        let (line, _) = collect("sort a list\r\n");
        assert_eq!(line.as_deref(), Some("sort a list"));
    }

    #[test]
    fn test_collect_line_without_newline() {
        let (line, _) = collect("parse json");
        assert_eq!(line.as_deref(), Some("parse json"));
    }

    #[test]
    fn test_collect_empty_line_is_not_eof() {
        let (line, _) = collect("\n");
        assert_eq!(line.as_deref(), Some(""));
    }

    #[test]
    fn test_collect_eof_returns_none() {
        let (line, _) = collect("");
        assert!(line.is_none());
    }

    #[test]
    fn test_collect_prints_banner_and_prompt() {
        let (_, output) = collect("x\n");
        assert!(output.starts_with("--- Gemma Code Generator ---\n"));
        assert!(output.contains("Press Enter when you are finished."));
        assert!(output.ends_with("> "));
    }
}
