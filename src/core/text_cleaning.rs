//! Ticket text normalization applied before vectorization.

use regex::Regex;
use std::sync::LazyLock;

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"http\S+|www\S+|https\S+").unwrap());

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S+@\S+").unwrap());

static SPECIAL_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9\s]").unwrap());

// Phone numbers and other long identifiers.
static LONG_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{10,}\b").unwrap());

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Lowercase, strip URLs, e-mail addresses and long digit runs, drop
/// everything outside `[a-z0-9]`, and collapse whitespace.
///
/// The digit rule runs after symbols are blanked, so `ref_1234567890`
/// loses its digits on the first pass rather than the second. That keeps
/// the function idempotent.
pub fn clean_text(text: &str) -> String {
    let text = text.to_lowercase();
    let text = URL_PATTERN.replace_all(&text, "");
    let text = EMAIL_PATTERN.replace_all(&text, "");
    let text = SPECIAL_CHARS.replace_all(&text, " ");
    let text = LONG_DIGITS.replace_all(&text, "");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worked_example() {
        assert_eq!(clean_text("Contact us@ http://x.com NOW!!"), "contact us now");
    }

    #[test]
    fn test_strips_urls() {
        assert_eq!(
            clean_text("See https://status.example.com/incidents/42 and www.example.org today"),
            "see and today"
        );
        // The pattern is unanchored: anything from `http` to the end of the token goes.
        assert_eq!(clean_text("foo.httpbar baz"), "foo baz");
    }

    #[test]
    fn test_strips_email_addresses() {
        assert_eq!(
            clean_text("Reply to jane.doe@corp.example please"),
            "reply to please"
        );
    }

    #[test]
    fn test_strips_long_digit_runs() {
        assert_eq!(clean_text("Call me on 0123456789 asap"), "call me on asap");
        assert_eq!(clean_text("+44 (0)20 7946 0958"), "44 0 20 7946 0958");
        assert_eq!(clean_text("order 123456789 shipped"), "order 123456789 shipped");
        assert_eq!(clean_text("ref_12345678901"), "ref");
        // Digits glued to letters are part of a longer word and survive.
        assert_eq!(clean_text("sku12345678901"), "sku12345678901");
    }

    #[test]
    fn test_replaces_symbols_and_collapses_whitespace() {
        assert_eq!(
            clean_text("  VPN\tdown!!!\n\nCan't   connect -- help?? "),
            "vpn down can t connect help"
        );
        assert_eq!(clean_text("Café crème"), "caf cr me");
    }

    #[test]
    fn test_empty_and_blank_input() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text(" \t\n "), "");
        assert_eq!(clean_text("!!!"), "");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "Contact us@ http://x.com NOW!!",
            "Printer on floor 3 is jammed, ticket #1234567890123",
            "ref_12345678901 and über-wichtig 9876543210é",
            "Password reset for bob@example.com via https://sso.example.com/reset?x=1",
            "   multiple    spaces\tand\nnewlines   ",
            "http",
            "email@ @domain",
        ];

        for sample in samples {
            let once = clean_text(sample);
            assert_eq!(clean_text(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_output_alphabet() {
        let cleaned = clean_text("Straße ÅNGSTRÖM 東京 — server#42 DOWN?!");
        assert!(cleaned
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == ' '));
        assert!(!cleaned.contains("  "));
        assert_eq!(cleaned, cleaned.trim());
    }
}
