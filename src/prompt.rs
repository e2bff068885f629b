//! Interactive fallback for settings the config file left out.

use std::io::{self, BufRead, Write};
use watch_core::{KeywordSet, WatchSettings};

pub const SUBREDDIT_PROMPT: &str = "Enter the subreddit name to monitor: ";
pub const KEYWORDS_PROMPT: &str = "Enter keywords to search for (comma-separated): ";
pub const COMMENTS_PROMPT: &str = "Search in comments as well? (y/n): ";

/// Asks for each of subreddit, keywords and include-comments that is still unset.
pub fn fill_missing<R: BufRead, W: Write>(
    settings: &mut WatchSettings,
    input: &mut R,
    output: &mut W,
) -> io::Result<()> {
    if settings.subreddit.is_none() {
        settings.subreddit = Some(ask(input, output, SUBREDDIT_PROMPT)?);
    }
    if settings.keywords.is_none() {
        settings.keywords = Some(KeywordSet::parse(&ask(input, output, KEYWORDS_PROMPT)?));
    }
    if settings.include_comments.is_none() {
        let answer = ask(input, output, COMMENTS_PROMPT)?;
        settings.include_comments = Some(answer.eq_ignore_ascii_case("y"));
    }
    Ok(())
}

fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> io::Result<String> {
    write!(output, "{}", prompt)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "standard input closed before all settings were given",
        ));
    }
    Ok(line.trim().to_string())
}
