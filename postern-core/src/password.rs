//! Password strength scoring
//!
//! A pure scorer used as an advisory pre-submission check on sign-up forms.
//! It never gates authentication; hard validation lives in
//! [`crate::validation::validate_password`] and credential verdicts belong
//! to the identity provider.

/// Passwords starting with any of these (case-insensitively) are penalized.
const COMMON_PASSWORDS: &[&str] = &[
    "password", "123456", "12345678", "qwerty", "abc123", "letmein", "admin", "welcome",
    "iloveyou", "monkey", "dragon", "111111",
];

/// Strength tier derived from the bounded score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrengthTier {
    Weak,
    Medium,
    Strong,
}

/// Result of scoring a password: a score clamped to `0..=5` and a
/// human-readable feedback line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordScore {
    pub score: u8,
    pub feedback: String,
}

impl PasswordScore {
    pub fn tier(&self) -> StrengthTier {
        match self.score {
            5 => StrengthTier::Strong,
            3..=4 => StrengthTier::Medium,
            _ => StrengthTier::Weak,
        }
    }
}

/// Score a password.
///
/// Scoring combines length, character-class diversity, and penalties for
/// consecutive repeats and common-password prefixes:
///
/// - length `>= 12` contributes +2, `8..12` contributes +1, shorter
///   contributes nothing
/// - each present class (uppercase, lowercase, digit, other) contributes +1
/// - any character repeated 3+ times in a row costs 1
/// - a common-password prefix costs 2
/// - 3 of 4 classes earn +1, all 4 earn +1 more
///
/// The result is clamped to `0..=5`. Identical input always yields identical
/// output.
///
/// # Examples
///
/// ```
/// use postern_core::password::score_password;
///
/// assert_eq!(score_password("").score, 0);
/// assert!(score_password("Tr0ub4dor&3extra!").score >= 4);
/// assert!(score_password("aaaaaaaa").score < 3);
/// ```
pub fn score_password(password: &str) -> PasswordScore {
    if password.is_empty() {
        return PasswordScore {
            score: 0,
            feedback: "Password is required".to_string(),
        };
    }

    let mut score: i32 = 0;
    let mut issues: Vec<&str> = Vec::new();

    let length = password.chars().count();
    if length >= 12 {
        score += 2;
    } else if length >= 8 {
        score += 1;
    } else {
        issues.push("use at least 8 characters");
    }

    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| !c.is_alphanumeric());

    let mut classes = 0;
    for (present, issue) in [
        (has_upper, "add uppercase letters"),
        (has_lower, "add lowercase letters"),
        (has_digit, "add digits"),
        (has_symbol, "add symbols"),
    ] {
        if present {
            score += 1;
            classes += 1;
        } else {
            issues.push(issue);
        }
    }

    if has_consecutive_repeat(password) {
        score -= 1;
        issues.push("avoid repeated characters");
    }

    let lowered = password.to_lowercase();
    if COMMON_PASSWORDS.iter().any(|p| lowered.starts_with(p)) {
        score -= 2;
        issues.push("avoid common passwords");
    }

    if classes >= 3 {
        score += 1;
    }
    if classes == 4 {
        score += 1;
    }

    let score = score.clamp(0, 5) as u8;
    let feedback = match score {
        5 => "Strong password".to_string(),
        3..=4 => "Medium strength password; add length or character variety to strengthen it"
            .to_string(),
        _ => format!("Weak password: {}", issues.join(", ")),
    };

    PasswordScore { score, feedback }
}

/// True if any character appears 3 or more times in a row.
fn has_consecutive_repeat(password: &str) -> bool {
    let mut run = 0;
    let mut previous = None;
    for c in password.chars() {
        if Some(c) == previous {
            run += 1;
            if run >= 3 {
                return true;
            }
        } else {
            previous = Some(c);
            run = 1;
        }
    }
    false
}
