//! Password strength scoring
//!
//! A fixed additive heuristic: up to 3 points for length, 1 each for
//! lowercase, uppercase and digits, 2 for symbols and 1 for character
//! variety, for a maximum of 9.

use crate::crypto::password::CharClass;
use std::collections::HashSet;
use std::fmt;

/// Highest score [`score_password`] can return
pub const MAX_SCORE: u8 = 9;

/// Strength rating derived from the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StrengthRating {
    /// Score below 3
    Weak,
    /// Score 3-4
    Medium,
    /// Score 5-6
    Strong,
    /// Score 7 and above
    VeryStrong,
}

impl StrengthRating {
    fn from_score(score: u8) -> Self {
        if score >= 7 {
            StrengthRating::VeryStrong
        } else if score >= 5 {
            StrengthRating::Strong
        } else if score >= 3 {
            StrengthRating::Medium
        } else {
            StrengthRating::Weak
        }
    }

    /// Get the rating as a display string
    pub fn as_str(&self) -> &'static str {
        match self {
            StrengthRating::Weak => "Weak",
            StrengthRating::Medium => "Medium",
            StrengthRating::Strong => "Strong",
            StrengthRating::VeryStrong => "Very Strong",
        }
    }

    /// Presentation tag for this rating
    pub fn tag(&self) -> StrengthTag {
        match self {
            StrengthRating::Weak => StrengthTag::Danger,
            StrengthRating::Medium => StrengthTag::Warning,
            StrengthRating::Strong => StrengthTag::Info,
            StrengthRating::VeryStrong => StrengthTag::Success,
        }
    }
}

impl fmt::Display for StrengthRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display tag mirroring [`StrengthRating`], only meaningful to front ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrengthTag {
    Danger,
    Warning,
    Info,
    Success,
}

impl StrengthTag {
    /// Hex color used by graphical front ends
    pub fn color(&self) -> &'static str {
        match self {
            StrengthTag::Danger => "#f44336",
            StrengthTag::Warning => "#FF9800",
            StrengthTag::Info => "#2196F3",
            StrengthTag::Success => "#4CAF50",
        }
    }

    /// ANSI color escape for terminals
    pub fn color_code(&self) -> &'static str {
        match self {
            StrengthTag::Danger => "\x1b[31m",
            StrengthTag::Warning => "\x1b[33m",
            StrengthTag::Info => "\x1b[36m",
            StrengthTag::Success => "\x1b[32m",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Positive,
    Negative,
}

/// One line of scoring feedback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub message: &'static str,
}

impl Feedback {
    fn positive(message: &'static str) -> Self {
        Self {
            kind: FeedbackKind::Positive,
            message,
        }
    }

    fn negative(message: &'static str) -> Self {
        Self {
            kind: FeedbackKind::Negative,
            message,
        }
    }

    pub fn is_positive(&self) -> bool {
        self.kind == FeedbackKind::Positive
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = match self.kind {
            FeedbackKind::Positive => '✓',
            FeedbackKind::Negative => '✗',
        };
        write!(f, "{} {}", mark, self.message)
    }
}

/// Result of scoring a password
#[derive(Debug, Clone, PartialEq)]
pub struct StrengthReport {
    /// Total score, 0 to [`MAX_SCORE`]
    pub score: u8,
    pub rating: StrengthRating,
    /// Feedback in check order: length, lowercase, uppercase, digits,
    /// symbols, variety
    pub feedback: Vec<Feedback>,
    pub tag: StrengthTag,
    /// Informal entropy estimate: length * log2(charset size)
    pub entropy_bits: f64,
}

/// Score a password
///
/// Deterministic: the same input always yields the same report.
pub fn score_password(password: &str) -> StrengthReport {
    let length = password.chars().count();
    let mut score = 0u8;
    let mut feedback = Vec::new();

    if length >= 16 {
        score += 3;
        feedback.push(Feedback::positive("Excellent length"));
    } else if length >= 12 {
        score += 2;
        feedback.push(Feedback::positive("Good length"));
    } else if length >= 8 {
        score += 1;
        feedback.push(Feedback::positive("Sufficient length"));
    } else {
        feedback.push(Feedback::negative("Password is too short"));
    }

    let has_lowercase = password.chars().any(char::is_lowercase);
    let has_uppercase = password.chars().any(char::is_uppercase);
    let has_digits = password.chars().any(char::is_numeric);
    let has_symbols = password.chars().any(|c| CharClass::Symbols.contains(c));

    if has_lowercase {
        score += 1;
    } else {
        feedback.push(Feedback::negative("No lowercase letters"));
    }

    if has_uppercase {
        score += 1;
    } else {
        feedback.push(Feedback::negative("No uppercase letters"));
    }

    if has_digits {
        score += 1;
    } else {
        feedback.push(Feedback::negative("No digits"));
    }

    if has_symbols {
        score += 2;
        feedback.push(Feedback::positive("Contains special characters"));
    } else {
        feedback.push(Feedback::negative("No special characters"));
    }

    let unique = password.chars().collect::<HashSet<_>>().len();
    if unique as f64 > length as f64 * 0.7 {
        score += 1;
        feedback.push(Feedback::positive("Good character variety"));
    }

    let rating = StrengthRating::from_score(score);

    StrengthReport {
        score,
        rating,
        feedback,
        tag: rating.tag(),
        entropy_bits: entropy_bits(password),
    }
}

/// Estimate entropy in bits from length and the character classes present
pub fn entropy_bits(password: &str) -> f64 {
    let mut charset_size = 0u32;
    if password.chars().any(|c| c.is_ascii_lowercase()) {
        charset_size += 26;
    }
    if password.chars().any(|c| c.is_ascii_uppercase()) {
        charset_size += 26;
    }
    if password.chars().any(|c| c.is_ascii_digit()) {
        charset_size += 10;
    }
    if password.chars().any(|c| c.is_ascii_punctuation()) {
        charset_size += 32;
    }

    if charset_size == 0 {
        return 0.0;
    }
    password.chars().count() as f64 * f64::from(charset_size).log2()
}
