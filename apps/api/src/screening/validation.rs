//! Field validation for the screening conversation.
//!
//! Pure functions with no dependencies on the rest of the system. Error
//! messages are candidate-facing: they name the offending field and how to
//! fix it, and never mention internals.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{0}")]
    InvalidFormat(String),

    #[error("I couldn't recognize any technologies in that list. Could you rephrase it, e.g. \"Python, React, AWS\"?")]
    EmptyStack,
}

/// Alias → canonical technology identifier. Kept as data so new aliases are
/// additions, not logic changes. Identity entries mark the canonical names
/// themselves as recognized.
const TECH_ALIASES: &[(&str, &str)] = &[
    ("python", "python"),
    ("py", "python"),
    ("python3", "python"),
    ("javascript", "javascript"),
    ("js", "javascript"),
    ("java script", "javascript"),
    ("ecmascript", "javascript"),
    ("typescript", "javascript"),
    ("node", "javascript"),
    ("node.js", "javascript"),
    ("nodejs", "javascript"),
    ("react", "react"),
    ("react.js", "react"),
    ("reactjs", "react"),
    ("java", "java"),
    ("sql", "sql"),
    ("postgresql", "sql"),
    ("postgres", "sql"),
    ("mysql", "sql"),
    ("sqlite", "sql"),
    ("mariadb", "sql"),
    ("aws", "aws"),
    ("amazon web services", "aws"),
    ("docker", "docker"),
    ("kubernetes", "kubernetes"),
    ("k8s", "kubernetes"),
    ("kube", "kubernetes"),
    ("git", "git"),
    ("github", "git"),
    ("gitlab", "git"),
    ("mongodb", "mongodb"),
    ("mongo", "mongodb"),
];

/// Result of normalizing a free-text tech stack.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedStack {
    /// Canonical identifiers, deduplicated, in first-seen order.
    pub canonical: Vec<String>,
    /// Tokens that matched no alias. Never blocks progress; kept for telemetry.
    pub unrecognized: Vec<String>,
}

/// Accepts a `local@domain.tld` address: one `@`, a non-empty local part of
/// word characters and `._%+-`, at least two domain labels, and an alphabetic
/// top-level segment of two or more letters. Returns the lowercased address.
pub fn validate_email(input: &str) -> Result<String, ValidationError> {
    let invalid = || {
        ValidationError::InvalidFormat(
            "That doesn't look like a valid email address. Please use the form name@example.com."
                .to_string(),
        )
    };

    let trimmed = input.trim();
    let (local, domain) = trimmed.split_once('@').ok_or_else(invalid)?;

    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    if !local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "._%+-".contains(c))
    {
        return Err(invalid());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return Err(invalid());
    }
    for label in &labels {
        if label.is_empty()
            || !label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(invalid());
        }
    }
    let tld = labels.last().ok_or_else(invalid)?;
    if tld.len() < 2 || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(invalid());
    }

    Ok(trimmed.to_ascii_lowercase())
}

/// Accepts 7–15 digits, optionally prefixed with `+`, after stripping the
/// common separators (spaces, dashes, dots, parentheses). Returns the
/// canonical stripped form.
pub fn validate_phone(input: &str) -> Result<String, ValidationError> {
    let invalid = || {
        ValidationError::InvalidFormat(
            "That doesn't look like a valid phone number. Please provide 7-15 digits, e.g. +1 555-123-4567.".to_string(),
        )
    };

    let stripped: String = input
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();

    let (prefix, digits) = match stripped.strip_prefix('+') {
        Some(rest) => ("+", rest),
        None => ("", stripped.as_str()),
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if !(7..=15).contains(&digits.len()) {
        return Err(invalid());
    }

    Ok(format!("{prefix}{digits}"))
}

/// A name must be non-empty and contain at least one alphabetic character.
pub fn validate_name(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.chars().any(|c| c.is_alphabetic()) {
        return Err(ValidationError::InvalidFormat(
            "I didn't catch a name there. Could you tell me your full name?".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Years of experience: a non-negative number with an upper sanity bound.
pub fn validate_years_experience(input: &str) -> Result<f32, ValidationError> {
    let invalid = || {
        ValidationError::InvalidFormat(
            "Please give your years of professional experience as a number, e.g. 3 or 2.5."
                .to_string(),
        )
    };

    let years: f32 = input.trim().parse().map_err(|_| invalid())?;
    if !years.is_finite() || years < 0.0 || years > 60.0 {
        return Err(invalid());
    }
    Ok(years)
}

/// Desired positions: a comma/semicolon-separated list with at least one
/// entry. Deduplicates case-insensitively, preserving order.
pub fn parse_positions(input: &str) -> Result<Vec<String>, ValidationError> {
    let mut positions: Vec<String> = Vec::new();
    for part in input.split(&[',', ';'][..]) {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if !positions
            .iter()
            .any(|p: &String| p.eq_ignore_ascii_case(part))
        {
            positions.push(part.to_string());
        }
    }
    if positions.is_empty() {
        return Err(ValidationError::InvalidFormat(
            "Which position(s) are you interested in? For example: Backend Engineer.".to_string(),
        ));
    }
    Ok(positions)
}

/// Current location: any non-empty text.
pub fn validate_location(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::InvalidFormat(
            "Where are you currently located?".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Normalizes free-text tech stack input into canonical identifiers.
///
/// Splits on commas, semicolons, slashes and the word "and"; trims and
/// lowercases each token; resolves aliases via [`TECH_ALIASES`]; silently
/// drops unrecognized tokens (returned separately for telemetry); dedups
/// preserving first-seen order. An empty canonical result is `EmptyStack`.
pub fn normalize_tech_stack(input: &str) -> Result<NormalizedStack, ValidationError> {
    let mut canonical: Vec<String> = Vec::new();
    let mut unrecognized: Vec<String> = Vec::new();

    for fragment in input.split(&[',', ';', '/'][..]) {
        for token in fragment.split(" and ") {
            let token = normalize_token(token);
            if token.is_empty() {
                continue;
            }
            match lookup_alias(&token) {
                Some(id) => {
                    if !canonical.iter().any(|c| c == id) {
                        canonical.push(id.to_string());
                    }
                }
                None => {
                    if !unrecognized.iter().any(|u| u == &token) {
                        unrecognized.push(token);
                    }
                }
            }
        }
    }

    if canonical.is_empty() {
        return Err(ValidationError::EmptyStack);
    }
    Ok(NormalizedStack {
        canonical,
        unrecognized,
    })
}

fn lookup_alias(token: &str) -> Option<&'static str> {
    TECH_ALIASES
        .iter()
        .find(|(alias, _)| *alias == token)
        .map(|(_, canonical)| *canonical)
}

/// Lowercases, trims, collapses internal whitespace, and drops a leading
/// standalone "and" left over from splitting.
fn normalize_token(token: &str) -> String {
    let collapsed = token
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase();
    collapsed
        .strip_prefix("and ")
        .map(str::to_string)
        .unwrap_or(collapsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails_accepted() {
        for email in [
            "alice@example.com",
            "john.doe@email.com",
            "a_b%c+d@sub.domain.co",
            "USER123@Example.ORG",
        ] {
            assert!(validate_email(email).is_ok(), "should accept {email}");
        }
    }

    #[test]
    fn test_email_is_lowercased() {
        assert_eq!(
            validate_email("Alice@Example.COM").unwrap(),
            "alice@example.com"
        );
    }

    #[test]
    fn test_invalid_emails_rejected() {
        for email in [
            "",
            "no-at-sign",
            "@example.com",
            "alice@",
            "alice@nodot",
            "alice@example.c",
            "alice@example.c0m",
            "alice@@example.com",
            "al ice@example.com",
            "alice@.com",
        ] {
            assert!(
                matches!(validate_email(email), Err(ValidationError::InvalidFormat(_))),
                "should reject {email:?}"
            );
        }
    }

    #[test]
    fn test_valid_phones_accepted() {
        assert_eq!(
            validate_phone("+1 555-123-4567").unwrap(),
            "+15551234567"
        );
        assert_eq!(validate_phone("(555) 123-4567").unwrap(), "5551234567");
        assert_eq!(validate_phone("5551234").unwrap(), "5551234");
        assert_eq!(
            validate_phone("+123456789012345").unwrap(),
            "+123456789012345"
        );
    }

    #[test]
    fn test_invalid_phones_rejected() {
        for phone in ["", "123456", "1234567890123456", "555-CALL-NOW", "+", "++15551234567"] {
            assert!(validate_phone(phone).is_err(), "should reject {phone:?}");
        }
    }

    #[test]
    fn test_name_requires_alphabetic() {
        assert_eq!(validate_name("  Alice Smith ").unwrap(), "Alice Smith");
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name("12345").is_err());
    }

    #[test]
    fn test_years_experience_bounds() {
        assert_eq!(validate_years_experience("3").unwrap(), 3.0);
        assert_eq!(validate_years_experience("2.5").unwrap(), 2.5);
        assert_eq!(validate_years_experience("0").unwrap(), 0.0);
        assert!(validate_years_experience("-1").is_err());
        assert!(validate_years_experience("seventy").is_err());
        assert!(validate_years_experience("100").is_err());
        assert!(validate_years_experience("NaN").is_err());
    }

    #[test]
    fn test_parse_positions_splits_and_dedups() {
        let positions = parse_positions("Backend Engineer, SRE; backend engineer").unwrap();
        assert_eq!(positions, vec!["Backend Engineer", "SRE"]);
        assert!(parse_positions("  ,  ; ").is_err());
    }

    #[test]
    fn test_normalize_resolves_aliases_preserving_order() {
        let stack = normalize_tech_stack("Python, JS and react").unwrap();
        assert_eq!(stack.canonical, vec!["python", "javascript", "react"]);
        assert!(stack.unrecognized.is_empty());
    }

    #[test]
    fn test_normalize_dedups_aliases_of_same_canonical() {
        let stack = normalize_tech_stack("js, node.js, JavaScript").unwrap();
        assert_eq!(stack.canonical, vec!["javascript"]);
    }

    #[test]
    fn test_normalize_collects_unrecognized_without_blocking() {
        let stack = normalize_tech_stack("python, cobol, fortran").unwrap();
        assert_eq!(stack.canonical, vec!["python"]);
        assert_eq!(stack.unrecognized, vec!["cobol", "fortran"]);
    }

    #[test]
    fn test_normalize_handles_slashes_and_semicolons() {
        let stack = normalize_tech_stack("postgres/mysql; k8s").unwrap();
        assert_eq!(stack.canonical, vec!["sql", "kubernetes"]);
    }

    #[test]
    fn test_normalize_empty_stack() {
        assert_eq!(
            normalize_tech_stack("basket weaving"),
            Err(ValidationError::EmptyStack)
        );
        assert_eq!(normalize_tech_stack(""), Err(ValidationError::EmptyStack));
    }

    #[test]
    fn test_normalize_does_not_split_inside_android() {
        // "android" contains "and" but is one token; it is simply unrecognized.
        let result = normalize_tech_stack("android, python").unwrap();
        assert_eq!(result.canonical, vec!["python"]);
        assert_eq!(result.unrecognized, vec!["android"]);
    }

    #[test]
    fn test_alias_table_targets_are_recognized() {
        // Every canonical name must itself resolve, or dedup breaks.
        for (_, canonical) in TECH_ALIASES {
            assert_eq!(lookup_alias(canonical), Some(*canonical));
        }
    }
}
