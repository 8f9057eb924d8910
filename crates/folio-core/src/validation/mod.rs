//! Validation helpers shared by the request DTOs

use std::sync::LazyLock;

use regex::Regex;

/// Brazilian phone number, e.g. `(11) 98765-4321` or `(11) 3456-7890`.
pub static PHONE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\(\d{2}\)\s\d{4,5}-\d{4}$").expect("phone pattern is a valid regex")
});

/// Treat blank optional form fields as absent.
pub fn blank_to_none(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Trim tag names and drop blanks and duplicates, keeping first-seen order.
pub fn normalize_tags<I>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_regex() {
        assert!(PHONE_REGEX.is_match("(11) 98765-4321"));
        assert!(PHONE_REGEX.is_match("(21) 3456-7890"));
        assert!(!PHONE_REGEX.is_match("11 98765-4321"));
        assert!(!PHONE_REGEX.is_match("(11)98765-4321"));
    }

    #[test]
    fn test_blank_to_none() {
        assert_eq!(blank_to_none(Some("   ".to_string())), None);
        assert_eq!(blank_to_none(None), None);
        assert_eq!(
            blank_to_none(Some(" https://x.y ".to_string())),
            Some("https://x.y".to_string())
        );
    }

    #[test]
    fn test_normalize_tags() {
        let tags = normalize_tags(vec![
            "poster".to_string(),
            " 3d ".to_string(),
            "poster".to_string(),
            "".to_string(),
        ]);
        assert_eq!(tags, vec!["poster".to_string(), "3d".to_string()]);
    }
}
