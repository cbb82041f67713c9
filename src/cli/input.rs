//! Presenter input
//!
//! Parses one line of presenter input into a ceremony command. Unknown
//! words get a typo suggestion.

use crate::ceremony::Command;

/// Recognized input words, long form first.
const WORDS: [(&str, &str, Input); 6] = [
    ("next", "n", Input::Command(Command::Next)),
    ("prev", "p", Input::Command(Command::Previous)),
    ("auto", "a", Input::Command(Command::ToggleAutoplay)),
    ("finalists", "f", Input::Command(Command::RevealFinalists)),
    ("winner", "w", Input::Command(Command::RevealWinner)),
    ("quit", "q", Input::Quit),
];

/// Parsed input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// A ceremony command
    Command(Command),
    /// Stop the ceremony
    Quit,
    /// Blank line
    Empty,
}

/// Rejected input word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownInput {
    /// What was typed
    pub word: String,
    /// Closest known word, if any is close
    pub suggestion: Option<&'static str>,
}

impl std::fmt::Display for UnknownInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown command '{}'", self.word)?;
        if let Some(s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

/// Parses a line of input. Matching is case-insensitive.
///
/// # Errors
///
/// Returns [`UnknownInput`] for an unrecognized word.
pub fn parse_line(line: &str) -> Result<Input, UnknownInput> {
    let word = line.trim().to_ascii_lowercase();
    if word.is_empty() {
        return Ok(Input::Empty);
    }
    WORDS
        .iter()
        .find(|(long, short, _)| word == *long || word == *short)
        .map(|(_, _, input)| *input)
        .ok_or_else(|| UnknownInput {
            suggestion: suggest(&word),
            word,
        })
}

/// Closest known word within Damerau-Levenshtein distance 2.
#[must_use]
pub fn suggest(input: &str) -> Option<&'static str> {
    WORDS
        .iter()
        .map(|(long, _, _)| (*long, strsim::damerau_levenshtein(input, long)))
        .filter(|(_, dist)| *dist <= 2)
        .min_by_key(|(_, dist)| *dist)
        .map(|(word, _)| word)
}

/// One-line help for the interactive prompt.
#[must_use]
pub fn help_line() -> String {
    WORDS
        .iter()
        .map(|(long, short, _)| format!("{long}/{short}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_and_short_forms() {
        assert_eq!(parse_line("next"), Ok(Input::Command(Command::Next)));
        assert_eq!(parse_line(" N \n"), Ok(Input::Command(Command::Next)));
        assert_eq!(parse_line("p"), Ok(Input::Command(Command::Previous)));
        assert_eq!(parse_line("winner"), Ok(Input::Command(Command::RevealWinner)));
        assert_eq!(parse_line("q"), Ok(Input::Quit));
        assert_eq!(parse_line("   "), Ok(Input::Empty));
    }

    #[test]
    fn test_unknown_with_suggestion() {
        let err = parse_line("nxet").unwrap_err();
        assert_eq!(err.suggestion, Some("next"));
        assert!(err.to_string().contains("did you mean 'next'"));
    }

    #[test]
    fn test_unknown_without_suggestion() {
        let err = parse_line("fireworks").unwrap_err();
        assert_eq!(err.suggestion, None);
        assert_eq!(err.to_string(), "unknown command 'fireworks'");
    }

    #[test]
    fn test_help_lists_every_word() {
        let help = help_line();
        for (long, short, _) in WORDS {
            assert!(help.contains(&format!("{long}/{short}")));
        }
    }
}
