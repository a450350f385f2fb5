use regex::Regex;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\S+@\S+\.\S+").expect("email pattern is valid")
});

const PASSWORD_SYMBOLS: &str = "!@#$%^&*";

/// Loose email check: something, `@`, something, `.`, something.
pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
}

impl PasswordStrength {
    pub fn as_str(self) -> &'static str {
        match self {
            PasswordStrength::Weak => "weak",
            PasswordStrength::Medium => "medium",
            PasswordStrength::Strong => "strong",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            PasswordStrength::Weak => "Weak password",
            PasswordStrength::Medium => "Medium password",
            PasswordStrength::Strong => "Strong password",
        }
    }
}

/// Classifies a password. Empty input has no strength at all.
///
/// Strong: lowercase, uppercase, digit and one of `!@#$%^&*`, 8+ chars.
/// Medium: lowercase and digit, 6+ chars. Anything else is weak, including
/// passwords spanning several lines.
pub fn password_strength(password: &str) -> Option<PasswordStrength> {
    if password.is_empty() {
        return None;
    }
    if password.chars().any(is_line_terminator) {
        return Some(PasswordStrength::Weak);
    }

    let len = password.chars().count();
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| PASSWORD_SYMBOLS.contains(c));

    if has_lower && has_upper && has_digit && has_symbol && len >= 8 {
        Some(PasswordStrength::Strong)
    } else if has_lower && has_digit && len >= 6 {
        Some(PasswordStrength::Medium)
    } else {
        Some(PasswordStrength::Weak)
    }
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strength_levels() {
        assert_eq!(password_strength("abc"), Some(PasswordStrength::Weak));
        assert_eq!(password_strength("abc123"), Some(PasswordStrength::Medium));
        assert_eq!(password_strength("Abc123!@"), Some(PasswordStrength::Strong));
        assert_eq!(password_strength(""), None);
    }

    #[test]
    fn strong_needs_every_class_and_length() {
        assert_eq!(password_strength("Abc12!@"), Some(PasswordStrength::Medium));
        assert_eq!(password_strength("Abcdefg!@"), Some(PasswordStrength::Weak));
        assert_eq!(password_strength("ABC123!@#"), Some(PasswordStrength::Weak));
        assert_eq!(password_strength("Abc123?~"), Some(PasswordStrength::Medium));
        assert_eq!(password_strength("Abc123!@\nx"), Some(PasswordStrength::Weak));
    }

    #[test]
    fn email_shapes() {
        assert!(!validate_email("not-an-email"));
        assert!(validate_email("user@example.com"));
        assert!(!validate_email("user@example"));
        assert!(!validate_email("@."));
    }
}
