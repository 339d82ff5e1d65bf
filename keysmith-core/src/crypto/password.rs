//! Secure random password generator

use crate::crypto::{CryptoError, Result};
use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Shortest password the generator will produce
pub const MIN_LENGTH: usize = 4;

/// Characters removed when ambiguous characters are excluded
pub const AMBIGUOUS: &[u8] = b"Il1O0";

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*()_+-=[]{}|;:,.<>?";

const VOWELS: &[u8] = b"aeiou";
const CONSONANTS: &[u8] = b"bcdfghjklmnpqrstvwxyz";

/// A character class a policy can enable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Lowercase,
    Uppercase,
    Digits,
    Symbols,
}

impl CharClass {
    /// The full character set of this class
    pub fn chars(self) -> &'static [u8] {
        match self {
            CharClass::Lowercase => LOWERCASE,
            CharClass::Uppercase => UPPERCASE,
            CharClass::Digits => DIGITS,
            CharClass::Symbols => SYMBOLS,
        }
    }

    /// Check whether `c` belongs to this class
    pub fn contains(self, c: char) -> bool {
        c.is_ascii() && self.chars().contains(&(c as u8))
    }
}

/// Which character classes and length a generated password must satisfy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterPolicy {
    /// Requested length, clamped to [`MIN_LENGTH`] at generation time
    pub length: usize,
    pub use_lowercase: bool,
    pub use_uppercase: bool,
    pub use_digits: bool,
    pub use_symbols: bool,
    /// Exclude ambiguous characters (I, l, 1, O, 0)
    pub exclude_ambiguous: bool,
}

impl Default for CharacterPolicy {
    fn default() -> Self {
        Self {
            length: 16,
            use_lowercase: true,
            use_uppercase: true,
            use_digits: true,
            use_symbols: true,
            exclude_ambiguous: false,
        }
    }
}

impl CharacterPolicy {
    /// Create a new policy with every class enabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the password length
    pub fn length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    /// Include lowercase letters
    pub fn with_lowercase(mut self, include: bool) -> Self {
        self.use_lowercase = include;
        self
    }

    /// Include uppercase letters
    pub fn with_uppercase(mut self, include: bool) -> Self {
        self.use_uppercase = include;
        self
    }

    /// Include digits
    pub fn with_digits(mut self, include: bool) -> Self {
        self.use_digits = include;
        self
    }

    /// Include symbols
    pub fn with_symbols(mut self, include: bool) -> Self {
        self.use_symbols = include;
        self
    }

    /// Exclude ambiguous characters (I, l, 1, O, 0)
    pub fn exclude_ambiguous(mut self, exclude: bool) -> Self {
        self.exclude_ambiguous = exclude;
        self
    }

    /// The classes that take part in generation.
    ///
    /// A policy with nothing enabled falls back to lowercase and digits.
    pub fn enabled_classes(&self) -> Vec<CharClass> {
        let mut classes = Vec::with_capacity(4);
        if self.use_lowercase {
            classes.push(CharClass::Lowercase);
        }
        if self.use_uppercase {
            classes.push(CharClass::Uppercase);
        }
        if self.use_digits {
            classes.push(CharClass::Digits);
        }
        if self.use_symbols {
            classes.push(CharClass::Symbols);
        }
        if classes.is_empty() {
            classes.extend([CharClass::Lowercase, CharClass::Digits]);
        }
        classes
    }

    /// Length after clamping
    pub fn effective_length(&self) -> usize {
        self.length.max(MIN_LENGTH)
    }

    fn class_chars(&self, class: CharClass) -> Vec<u8> {
        class
            .chars()
            .iter()
            .copied()
            .filter(|c| !(self.exclude_ambiguous && AMBIGUOUS.contains(c)))
            .collect()
    }
}

/// Generate a secure random password
///
/// One character of every enabled class is always present; the rest are
/// drawn from the union of the enabled classes, then the whole buffer is
/// shuffled. All randomness comes from the OS CSPRNG.
pub fn generate_password(policy: &CharacterPolicy) -> Result<String> {
    let mut rng = OsRng;
    let length = policy.effective_length();

    let class_sets = policy
        .enabled_classes()
        .into_iter()
        .map(|class| {
            let chars = policy.class_chars(class);
            if chars.is_empty() {
                Err(CryptoError::InvalidPolicy(format!(
                    "{:?} has no characters left after excluding ambiguous ones",
                    class
                )))
            } else {
                Ok(chars)
            }
        })
        .collect::<Result<Vec<_>>>()?;

    let pool: Vec<u8> = class_sets.iter().flatten().copied().collect();

    let mut password = Vec::with_capacity(length);
    for chars in &class_sets {
        password.push(pick(chars, &mut rng)?);
    }
    while password.len() < length {
        password.push(pick(&pool, &mut rng)?);
    }

    password.shuffle(&mut rng);

    Ok(password.into_iter().map(char::from).collect())
}

fn pick<R: Rng + ?Sized>(chars: &[u8], rng: &mut R) -> Result<u8> {
    chars
        .choose(rng)
        .copied()
        .ok_or_else(|| CryptoError::InvalidPolicy("Character pool is empty".to_string()))
}

/// Named generation presets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrengthLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl StrengthLevel {
    pub const ALL: [StrengthLevel; 4] = [
        StrengthLevel::Low,
        StrengthLevel::Medium,
        StrengthLevel::High,
        StrengthLevel::VeryHigh,
    ];

    /// Look up a level by name, falling back to `Medium` for unknown names
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or(StrengthLevel::Medium)
    }

    /// Character classes used by this preset
    pub fn policy(self) -> CharacterPolicy {
        let (upper, symbols) = match self {
            StrengthLevel::Low => (false, false),
            StrengthLevel::Medium => (true, false),
            StrengthLevel::High | StrengthLevel::VeryHigh => (true, true),
        };
        CharacterPolicy {
            length: *self.length_range().start(),
            use_lowercase: true,
            use_uppercase: upper,
            use_digits: true,
            use_symbols: symbols,
            exclude_ambiguous: false,
        }
    }

    /// Inclusive length bounds drawn from when no length is given
    pub fn length_range(self) -> RangeInclusive<usize> {
        match self {
            StrengthLevel::Low => 6..=12,
            StrengthLevel::Medium => 8..=16,
            StrengthLevel::High => 12..=24,
            StrengthLevel::VeryHigh => 16..=32,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StrengthLevel::Low => "Low",
            StrengthLevel::Medium => "Medium",
            StrengthLevel::High => "High",
            StrengthLevel::VeryHigh => "VeryHigh",
        }
    }

    /// Generate a password with this preset
    pub fn generate(self, length: Option<usize>) -> Result<String> {
        let length = length.unwrap_or_else(|| OsRng.gen_range(self.length_range()));
        generate_password(&self.policy().length(length))
    }
}

impl fmt::Display for StrengthLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrengthLevel {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "low" => Ok(StrengthLevel::Low),
            "medium" => Ok(StrengthLevel::Medium),
            "high" => Ok(StrengthLevel::High),
            "veryhigh" => Ok(StrengthLevel::VeryHigh),
            _ => Err(CryptoError::InvalidPolicy(format!("Unknown level: {}", s))),
        }
    }
}

/// Generate a password from a named preset
///
/// Unknown names use the `Medium` preset. Without an explicit length, one
/// is drawn uniformly from the preset's range.
pub fn generate_by_level(level: &str, length: Option<usize>) -> Result<String> {
    StrengthLevel::from_name(level).generate(length)
}

/// Generate a pronounceable password of alternating consonants and vowels
///
/// Passwords longer than four characters get a capitalized first letter and
/// a trailing digit.
pub fn generate_pronounceable(length: usize) -> Result<String> {
    let length = length.max(MIN_LENGTH);
    let mut rng = OsRng;

    let mut password = (0..length)
        .map(|i| pick(if i % 2 == 0 { CONSONANTS } else { VOWELS }, &mut rng))
        .collect::<Result<Vec<u8>>>()?;

    if length > MIN_LENGTH {
        password[0] = password[0].to_ascii_uppercase();
        password[length - 1] = pick(DIGITS, &mut rng)?;
    }

    Ok(password.into_iter().map(char::from).collect())
}

/// Generate a numeric PIN
pub fn generate_pin(length: usize) -> Result<String> {
    let length = length.max(MIN_LENGTH);
    let mut rng = OsRng;
    (0..length)
        .map(|_| pick(DIGITS, &mut rng).map(char::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_policies() -> Vec<CharacterPolicy> {
        let mut policies = Vec::new();
        for mask in 1u8..16 {
            for exclude in [false, true] {
                policies.push(CharacterPolicy {
                    length: 12,
                    use_lowercase: mask & 1 != 0,
                    use_uppercase: mask & 2 != 0,
                    use_digits: mask & 4 != 0,
                    use_symbols: mask & 8 != 0,
                    exclude_ambiguous: exclude,
                });
            }
        }
        policies
    }

    #[test]
    fn test_generate_default_password() {
        let password = generate_password(&CharacterPolicy::default()).unwrap();
        assert_eq!(password.len(), 16);
    }

    #[test]
    fn test_every_class_combination_is_honored() {
        let all = [
            CharClass::Lowercase,
            CharClass::Uppercase,
            CharClass::Digits,
            CharClass::Symbols,
        ];
        for policy in all_policies() {
            let enabled = policy.enabled_classes();
            for _ in 0..20 {
                let password = generate_password(&policy).unwrap();
                assert_eq!(password.chars().count(), 12);
                for class in &enabled {
                    assert!(
                        password.chars().any(|c| class.contains(c)),
                        "{:?} missing from {} for {:?}",
                        class,
                        password,
                        policy
                    );
                }
                for class in all.iter().filter(|c| !enabled.contains(*c)) {
                    assert!(!password.chars().any(|c| class.contains(c)));
                }
            }
        }
    }

    #[test]
    fn test_length_clamped_to_minimum() {
        let password = generate_password(&CharacterPolicy::default().length(1)).unwrap();
        assert_eq!(password.len(), MIN_LENGTH);

        let password = generate_password(&CharacterPolicy::default().length(0)).unwrap();
        assert_eq!(password.len(), MIN_LENGTH);
    }

    #[test]
    fn test_no_classes_falls_back_to_lower_and_digits() {
        let policy = CharacterPolicy {
            length: 10,
            use_lowercase: false,
            use_uppercase: false,
            use_digits: false,
            use_symbols: false,
            exclude_ambiguous: false,
        };
        assert_eq!(
            policy.enabled_classes(),
            vec![CharClass::Lowercase, CharClass::Digits]
        );

        for _ in 0..50 {
            let password = generate_password(&policy).unwrap();
            assert_eq!(password.len(), 10);
            assert!(password.chars().any(|c| c.is_ascii_lowercase()));
            assert!(password.chars().any(|c| c.is_ascii_digit()));
            assert!(password
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_generate_no_ambiguous() {
        let policy = CharacterPolicy::default().exclude_ambiguous(true).length(64);
        for _ in 0..100 {
            let password = generate_password(&policy).unwrap();
            assert!(!password
                .chars()
                .any(|c| matches!(c, 'I' | 'l' | '1' | 'O' | '0')));
        }
    }

    #[test]
    fn test_guaranteed_characters_are_shuffled() {
        // Before shuffling, slot 0 always holds the lowercase pick and slot 1
        // the digit pick.
        let policy = CharacterPolicy::new()
            .with_uppercase(false)
            .with_symbols(false)
            .length(10);
        let trials = 2000;
        let mut digit_first = 0;
        let mut lower_second = 0;
        for _ in 0..trials {
            let password: Vec<char> = generate_password(&policy).unwrap().chars().collect();
            if password[0].is_ascii_digit() {
                digit_first += 1;
            }
            if password[1].is_ascii_lowercase() {
                lower_second += 1;
            }
        }
        // Expected rate for a digit in any slot is about 0.35
        let digit_rate = digit_first as f64 / trials as f64;
        let lower_rate = lower_second as f64 / trials as f64;
        assert!(digit_rate > 0.2 && digit_rate < 0.5, "digit rate {}", digit_rate);
        assert!(lower_rate > 0.5 && lower_rate < 0.8, "lower rate {}", lower_rate);
    }

    #[test]
    fn test_passwords_are_unique() {
        let policy = CharacterPolicy::default();
        let p1 = generate_password(&policy).unwrap();
        let p2 = generate_password(&policy).unwrap();
        assert_ne!(p1, p2);
    }

    #[test]
    fn test_level_lengths_within_range() {
        for level in StrengthLevel::ALL {
            for _ in 0..30 {
                let password = level.generate(None).unwrap();
                assert!(level.length_range().contains(&password.len()));
            }
        }
    }

    #[test]
    fn test_level_explicit_length() {
        let password = generate_by_level("High", Some(20)).unwrap();
        assert_eq!(password.len(), 20);
        assert!(password.chars().any(|c| CharClass::Symbols.contains(c)));
    }

    #[test]
    fn test_unknown_level_uses_medium() {
        assert_eq!(StrengthLevel::from_name("Ultra"), StrengthLevel::Medium);
        for _ in 0..20 {
            let password = generate_by_level("Ultra", None).unwrap();
            assert!((8..=16).contains(&password.len()));
            assert!(!password.chars().any(|c| CharClass::Symbols.contains(c)));
        }
    }

    #[test]
    fn test_level_names_parse() {
        assert_eq!("low".parse::<StrengthLevel>().unwrap(), StrengthLevel::Low);
        assert_eq!(
            "Very-High".parse::<StrengthLevel>().unwrap(),
            StrengthLevel::VeryHigh
        );
        assert_eq!(
            "VeryHigh".parse::<StrengthLevel>().unwrap(),
            StrengthLevel::VeryHigh
        );
        assert!("extreme".parse::<StrengthLevel>().is_err());
    }

    #[test]
    fn test_low_level_has_no_upper_or_symbols() {
        let password = StrengthLevel::Low.generate(Some(30)).unwrap();
        assert!(password
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_pronounceable_shape() {
        let password = generate_pronounceable(12).unwrap();
        let chars: Vec<char> = password.chars().collect();
        assert_eq!(chars.len(), 12);
        assert!(chars[0].is_ascii_uppercase());
        assert!(chars[11].is_ascii_digit());
        for (i, c) in chars.iter().enumerate().skip(1).take(10) {
            let set = if i % 2 == 0 { CONSONANTS } else { VOWELS };
            assert!(set.contains(&(*c as u8)), "{} at {}", c, i);
        }

        let short = generate_pronounceable(4).unwrap();
        assert!(short.chars().all(|c| c.is_ascii_lowercase()));
    }

    #[test]
    fn test_pin() {
        let pin = generate_pin(6).unwrap();
        assert_eq!(pin.len(), 6);
        assert!(pin.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(generate_pin(2).unwrap().len(), MIN_LENGTH);
    }
}
