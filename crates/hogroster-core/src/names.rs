//! Full-name parsing.
//!
//! Raw roster names arrive with stray whitespace and random casing, e.g.
//! `"  hermione jean granger  "` or `"ron \"won-won\" weasley"`. This module
//! normalizes the casing and splits a name into its parts.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Characters after which the next letter is uppercased.
const WORD_BREAKS: [char; 3] = [' ', '-', '"'];

/// Trim, lowercase and re-capitalize a raw string.
///
/// The first character and every character directly after a space, hyphen or
/// double quote is uppercased. Applying it twice gives the same result as
/// applying it once.
pub fn capitalize(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    let mut out = String::with_capacity(lower.len());
    let mut upper_next = true;

    for c in lower.chars() {
        if upper_next {
            out.push(single_upper(c));
        } else {
            out.push(c);
        }
        upper_next = WORD_BREAKS.contains(&c);
    }

    out
}

/// Uppercase form of `c` when it is a single char. Letters that expand on
/// uppercasing (`ß` becomes `SS`) stay as they are.
fn single_upper(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

/// A full name split into its parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedName {
    pub first: String,
    pub middle: Option<String>,
    pub last: Option<String>,
    pub nickname: Option<String>,
}

impl ParsedName {
    /// Parse a raw full name. Never fails: a name without a usable first
    /// token is kept whole as the first name.
    pub fn parse(raw: &str) -> Self {
        let full = capitalize(raw);
        let (rest, nickname) = split_nickname(&full);

        let first = match rest.find(' ') {
            Some(idx) => &rest[..idx],
            None => rest.as_str(),
        };

        if first.is_empty() {
            warn!(name = %raw, "Name has no first token, keeping it whole");
            return Self {
                first: full,
                middle: None,
                last: None,
                nickname: None,
            };
        }

        let (middle, last) = match (rest.find(' '), rest.rfind(' ')) {
            (Some(first_space), Some(last_space)) => {
                let last = &rest[last_space + 1..];
                let middle = if first_space < last_space {
                    rest[first_space + 1..last_space].trim()
                } else {
                    ""
                };
                (non_empty(middle), non_empty(last))
            }
            _ => (None, None),
        };

        Self {
            first: first.to_string(),
            // A quoted nickname takes the middle-name slot.
            middle: if nickname.is_some() { None } else { middle },
            last,
            nickname,
        }
    }
}

/// Pull a `"quoted"` segment out of a name. Returns the remaining name with
/// whitespace collapsed, and the interior of the quotes if a pair was found.
fn split_nickname(full: &str) -> (String, Option<String>) {
    let Some(open) = full.find('"') else {
        return (full.to_string(), None);
    };
    let Some(len) = full[open + 1..].find('"') else {
        return (full.to_string(), None);
    };
    let close = open + 1 + len;

    let nickname = full[open + 1..close].trim();
    let rest = format!("{} {}", &full[..open], &full[close + 1..]);
    let rest = rest.split_whitespace().collect::<Vec<_>>().join(" ");

    (rest, non_empty(nickname))
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Capitalization
    // -------------------------------------------------------------------------

    #[test]
    fn test_capitalize_basic() {
        assert_eq!(capitalize("  hermione jean granger  "), "Hermione Jean Granger");
        assert_eq!(capitalize("HARRY POTTER"), "Harry Potter");
        assert_eq!(capitalize("justin finch-fletchley"), "Justin Finch-Fletchley");
        assert_eq!(capitalize("ron \"won-won\" weasley"), "Ron \"Won-Won\" Weasley");
    }

    #[test]
    fn test_capitalize_house() {
        assert_eq!(capitalize(" gryffinDOR "), "Gryffindor");
        assert_eq!(capitalize("Slytherin").to_lowercase(), "slytherin");
    }

    #[test]
    fn test_capitalize_idempotent() {
        for raw in [
            "  hermione jean granger  ",
            "ron \"won-won\" weasley",
            "LEANNE",
            "ernie macmillan",
            "ßo stella",
            "",
        ] {
            let once = capitalize(raw);
            assert_eq!(capitalize(&once), once, "not idempotent for {:?}", raw);
        }
    }

    #[test]
    fn test_capitalize_keeps_expanding_letters() {
        assert_eq!(capitalize("ßo stella"), "ßo Stella");
        assert_eq!(capitalize("anna-ßophie"), "Anna-ßophie");
        assert_eq!(capitalize("élodie ÖZTÜRK"), "Élodie Öztürk");
    }

    // -------------------------------------------------------------------------
    // Parsing
    // -------------------------------------------------------------------------

    #[test]
    fn test_parse_three_tokens() {
        let name = ParsedName::parse("  hermione jean granger  ");
        assert_eq!(name.first, "Hermione");
        assert_eq!(name.middle.as_deref(), Some("Jean"));
        assert_eq!(name.last.as_deref(), Some("Granger"));
        assert_eq!(name.nickname, None);
    }

    #[test]
    fn test_parse_nickname() {
        let name = ParsedName::parse("Ron \"Won-Won\" Weasley");
        assert_eq!(name.first, "Ron");
        assert_eq!(name.nickname.as_deref(), Some("Won-Won"));
        assert_eq!(name.middle, None);
        assert_eq!(name.last.as_deref(), Some("Weasley"));
    }

    #[test]
    fn test_parse_nickname_never_middle() {
        let name = ParsedName::parse("ronald bilius \"won-won\" weasley");
        assert_eq!(name.first, "Ronald");
        assert_eq!(name.nickname.as_deref(), Some("Won-Won"));
        assert_eq!(name.middle, None);
        assert_eq!(name.last.as_deref(), Some("Weasley"));
    }

    #[test]
    fn test_parse_two_tokens() {
        for (raw, last) in [("harry potter", "Potter"), ("DRACO malfoy", "Malfoy")] {
            let name = ParsedName::parse(raw);
            assert_eq!(name.middle, None);
            assert_eq!(name.last.as_deref(), Some(last));
        }
    }

    #[test]
    fn test_parse_single_token() {
        let name = ParsedName::parse("leanne");
        assert_eq!(name.first, "Leanne");
        assert_eq!(name.last, None);
        assert_eq!(name.middle, None);
    }

    #[test]
    fn test_parse_double_space_has_no_middle() {
        let name = ParsedName::parse("cho  chang");
        assert_eq!(name.first, "Cho");
        assert_eq!(name.middle, None);
        assert_eq!(name.last.as_deref(), Some("Chang"));
    }

    #[test]
    fn test_parse_unclosed_quote_is_not_nickname() {
        let name = ParsedName::parse("ron \"won weasley");
        assert_eq!(name.nickname, None);
        assert_eq!(name.first, "Ron");
        assert_eq!(name.last.as_deref(), Some("Weasley"));
    }

    #[test]
    fn test_parse_malformed_falls_back() {
        let name = ParsedName::parse("   ");
        assert_eq!(name.first, "");
        assert_eq!(name.last, None);

        let name = ParsedName::parse("\"ghost\"");
        assert_eq!(name.first, "\"Ghost\"");
        assert_eq!(name.nickname, None);
        assert_eq!(name.middle, None);
        assert_eq!(name.last, None);
    }
}
