//! Interactive input and startup summary
//!
//! When no inventory references are given on the command line the user is
//! asked for one line of input, from which every digit run is taken as an
//! identifier.

use std::io::{self, BufRead, Write};
use std::path::Path;

use tracing::debug;

use crate::app::identifiers::extract_identifiers;
use crate::errors::{AppError, Result};

/// Prompt shown when no inputs were given
pub const INPUT_PROMPT: &str = "Enter URL or number (e.g. 355857): ";

/// Ask for inventory references on stdin
pub fn interactive_input() -> Result<Vec<String>> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    prompt_identifiers(&mut stdin.lock(), &mut stdout)
}

/// Write the prompt to `output` and read one line of references from `input`
pub fn prompt_identifiers<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Vec<String>> {
    write!(output, "{}", INPUT_PROMPT).map_err(AppError::Io)?;
    output.flush().map_err(AppError::Io)?;

    let mut line = String::new();
    input.read_line(&mut line).map_err(AppError::Io)?;

    let identifiers = extract_identifiers(&line);
    debug!("Interactive input yielded {} identifiers", identifiers.len());

    if identifiers.is_empty() {
        return Err(AppError::generic(format!(
            "No inventory number found in '{}'",
            line.trim()
        )));
    }

    Ok(identifiers)
}

/// Print the settings a download run will use
pub fn show_run_settings(identifiers: &[String], download_root: &Path, workers: usize, retries: u32) {
    println!();
    println!("EAIS Fetcher");
    println!("============");
    println!("Inventories: {}", identifiers.join(", "));
    println!("Download to: {}", download_root.display());
    println!("Workers:     {} (up to {} attempts per file)", workers, retries);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_prompt_reads_identifiers() {
        let mut input = Cursor::new("https://eais.archyvai.lt/inventories/355857 and 12\n");
        let mut output = Vec::new();

        let ids = prompt_identifiers(&mut input, &mut output).unwrap();

        assert_eq!(ids, vec!["355857", "12"]);
        assert_eq!(String::from_utf8(output).unwrap(), INPUT_PROMPT);
    }

    #[test]
    fn test_prompt_without_digits_is_an_error() {
        let mut input = Cursor::new("nothing here\n");
        let mut output = Vec::new();

        let err = prompt_identifiers(&mut input, &mut output).unwrap_err();
        assert_eq!(err.category(), "generic");
    }

    #[test]
    fn test_prompt_on_closed_stdin() {
        let mut input = Cursor::new("");
        let mut output = Vec::new();

        assert!(prompt_identifiers(&mut input, &mut output).is_err());
    }
}
