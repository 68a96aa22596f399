//! Identifier slugs derived from titles.

/// Maximum slug length in characters.
pub const MAX_SLUG_LEN: usize = 120;

/// Lowercase `value`, collapse every run of characters outside `[a-z0-9]`
/// into a single hyphen, and trim hyphens from both ends.
///
/// The result is ASCII, at most [`MAX_SLUG_LEN`] long, and may be empty.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len().min(MAX_SLUG_LEN));
    let mut pending_hyphen = false;

    for ch in value.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else {
            pending_hyphen = true;
        }
    }

    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
        while slug.ends_with('-') {
            slug.pop();
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation_and_lowercases() {
        assert_eq!(slugify("Awesome Bot!!"), "awesome-bot");
        assert_eq!(slugify("chess.js"), "chess-js");
        assert_eq!(slugify("Notation / PGN / FEN"), "notation-pgn-fen");
    }

    #[test]
    fn no_leading_or_trailing_hyphens() {
        assert_eq!(slugify("  --Leela Chess Zero--  "), "leela-chess-zero");
        assert_eq!(slugify("(2023) Candidates"), "2023-candidates");
    }

    #[test]
    fn non_ascii_characters_are_separators() {
        assert_eq!(slugify("Café Décor"), "caf-d-cor");
    }

    #[test]
    fn empty_when_nothing_alphanumeric() {
        assert_eq!(slugify("!!! ???"), "");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn length_is_capped_without_trailing_hyphen() {
        let long = "ab ".repeat(100);
        let slug = slugify(&long);
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('-'));
        assert!(slug.starts_with("ab-ab"));
    }

    #[test]
    fn deterministic() {
        let title = "Zurich International Chess Tournament 1953";
        assert_eq!(slugify(title), slugify(title));
        assert_eq!(slugify(title), "zurich-international-chess-tournament-1953");
    }
}
