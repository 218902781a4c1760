//! Challenge Rating value object
//!
//! A creature's CR is either a whole number ("0".."30") or one of the
//! simple fractions used for weak creatures ("1/8", "1/4", "1/2").
//! Ratings are kept as a reduced fraction so that "2/4" and "1/2" compare equal.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Highest challenge rating a creature can have
pub const MAX_CHALLENGE_RATING: u32 = 30;

/// Denominators accepted in fractional ratings
const ALLOWED_DENOMINATORS: [u32; 3] = [2, 4, 8];

/// Reasons a challenge rating string can be rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CrParseError {
    #[error("challenge rating is empty")]
    Empty,
    #[error("challenge rating '{0}' is not a whole number or simple fraction")]
    NotNumeric(String),
    #[error("challenge rating '{0}' has a zero denominator")]
    ZeroDenominator(String),
    #[error("challenge rating '{input}' uses denominator {denominator}; expected 2, 4 or 8")]
    UnsupportedDenominator { input: String, denominator: u32 },
    #[error("challenge rating '{0}' is outside 0..=30")]
    OutOfRange(String),
}

/// A parsed challenge rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChallengeRating {
    numerator: u32,
    denominator: u32,
}

impl ChallengeRating {
    /// Parse a rating string such as "5" or "1/4"
    pub fn parse(input: &str) -> Result<Self, CrParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(CrParseError::Empty);
        }

        let (numerator, denominator) = match trimmed.split_once('/') {
            Some((num, den)) => {
                let numerator = parse_component(num, input)?;
                let denominator = parse_component(den, input)?;
                if denominator == 0 {
                    return Err(CrParseError::ZeroDenominator(input.to_string()));
                }
                if !ALLOWED_DENOMINATORS.contains(&denominator) {
                    return Err(CrParseError::UnsupportedDenominator {
                        input: input.to_string(),
                        denominator,
                    });
                }
                (numerator, denominator)
            }
            None => (parse_component(trimmed, input)?, 1),
        };

        if numerator > MAX_CHALLENGE_RATING * denominator {
            return Err(CrParseError::OutOfRange(input.to_string()));
        }

        Ok(Self::reduced(numerator, denominator))
    }

    /// Convert a numeric rating as reported by the D&D 5e API (e.g. `0.125`)
    pub fn from_f64(value: f64) -> Result<Self, CrParseError> {
        let eighths = value * 8.0;
        if !value.is_finite()
            || value < 0.0
            || (eighths - eighths.round()).abs() > f64::EPSILON * 64.0
        {
            return Err(CrParseError::NotNumeric(value.to_string()));
        }
        if value > f64::from(MAX_CHALLENGE_RATING) {
            return Err(CrParseError::OutOfRange(value.to_string()));
        }
        Ok(Self::reduced(eighths.round() as u32, 8))
    }

    /// Numeric value used for range comparison
    pub fn value(&self) -> f64 {
        f64::from(self.numerator) / f64::from(self.denominator)
    }

    /// Display label, e.g. "CR 1/4"
    pub fn label(&self) -> String {
        format!("CR {}", self)
    }

    /// Every rating a creature can have, in ascending order:
    /// 0, 1/8, 1/4, 1/2, 1, 2, ..., 30
    pub fn canonical_values() -> Vec<Self> {
        let fractions = [(1, 8), (1, 4), (1, 2)];
        let mut values = Vec::with_capacity(MAX_CHALLENGE_RATING as usize + 4);
        values.push(Self::reduced(0, 1));
        values.extend(fractions.iter().map(|&(n, d)| Self::reduced(n, d)));
        values.extend((1..=MAX_CHALLENGE_RATING).map(|n| Self::reduced(n, 1)));
        values
    }

    fn reduced(numerator: u32, denominator: u32) -> Self {
        let divisor = gcd(numerator, denominator);
        Self {
            numerator: numerator / divisor,
            denominator: denominator / divisor,
        }
    }
}

fn parse_component(part: &str, input: &str) -> Result<u32, CrParseError> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CrParseError::NotNumeric(input.to_string()));
    }
    part.parse::<u32>()
        .map_err(|_| CrParseError::OutOfRange(input.to_string()))
}

fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 {
        a.max(1)
    } else {
        gcd(b, a % b)
    }
}

impl fmt::Display for ChallengeRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator == 1 {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

impl FromStr for ChallengeRating {
    type Err = CrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ChallengeRating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ChallengeRating {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawRating {
            Text(String),
            Number(f64),
        }

        match RawRating::deserialize(deserializer)? {
            RawRating::Text(text) => Self::parse(&text),
            RawRating::Number(number) => Self::from_f64(number),
        }
        .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whole_numbers() {
        assert_eq!(ChallengeRating::parse("0").unwrap().value(), 0.0);
        assert_eq!(ChallengeRating::parse("5").unwrap().value(), 5.0);
        assert_eq!(ChallengeRating::parse("30").unwrap().value(), 30.0);
        assert_eq!(ChallengeRating::parse(" 7 ").unwrap().value(), 7.0);
    }

    #[test]
    fn test_parse_fractions() {
        assert_eq!(ChallengeRating::parse("1/8").unwrap().value(), 0.125);
        assert_eq!(ChallengeRating::parse("1/4").unwrap().value(), 0.25);
        assert_eq!(ChallengeRating::parse("1/2").unwrap().value(), 0.5);
        assert_eq!(ChallengeRating::parse("3/2").unwrap().value(), 1.5);
        assert_eq!(ChallengeRating::parse("2/4").unwrap(), ChallengeRating::parse("1/2").unwrap());
    }

    #[test]
    fn test_every_valid_fraction_parses_to_its_quotient() {
        for denominator in ALLOWED_DENOMINATORS {
            for numerator in 0..=(MAX_CHALLENGE_RATING * denominator) {
                let input = format!("{}/{}", numerator, denominator);
                let cr = ChallengeRating::parse(&input).unwrap();
                assert_eq!(cr.value(), f64::from(numerator) / f64::from(denominator));
            }
        }
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        assert_eq!(ChallengeRating::parse(""), Err(CrParseError::Empty));
        assert_eq!(ChallengeRating::parse("   "), Err(CrParseError::Empty));
        assert!(matches!(ChallengeRating::parse("abc"), Err(CrParseError::NotNumeric(_))));
        assert!(matches!(ChallengeRating::parse("-1"), Err(CrParseError::NotNumeric(_))));
        assert!(matches!(ChallengeRating::parse("1.5"), Err(CrParseError::NotNumeric(_))));
        assert!(matches!(ChallengeRating::parse("1/"), Err(CrParseError::NotNumeric(_))));
        assert!(matches!(ChallengeRating::parse("/4"), Err(CrParseError::NotNumeric(_))));
        assert!(matches!(ChallengeRating::parse("1/2/3"), Err(CrParseError::NotNumeric(_))));
        assert!(matches!(ChallengeRating::parse("1/0"), Err(CrParseError::ZeroDenominator(_))));
        assert!(matches!(ChallengeRating::parse("31"), Err(CrParseError::OutOfRange(_))));
        assert!(matches!(ChallengeRating::parse("241/8"), Err(CrParseError::OutOfRange(_))));
    }

    #[test]
    fn test_parse_rejects_unsupported_denominator() {
        assert_eq!(
            ChallengeRating::parse("1/3"),
            Err(CrParseError::UnsupportedDenominator {
                input: "1/3".to_string(),
                denominator: 3,
            })
        );
        assert!(ChallengeRating::parse("1/16").is_err());
    }

    #[test]
    fn test_from_api_number() {
        assert_eq!(ChallengeRating::from_f64(0.125).unwrap().to_string(), "1/8");
        assert_eq!(ChallengeRating::from_f64(0.25).unwrap().to_string(), "1/4");
        assert_eq!(ChallengeRating::from_f64(0.5).unwrap().to_string(), "1/2");
        assert_eq!(ChallengeRating::from_f64(17.0).unwrap().to_string(), "17");
        assert!(ChallengeRating::from_f64(-1.0).is_err());
        assert!(ChallengeRating::from_f64(0.3).is_err());
        assert!(ChallengeRating::from_f64(31.0).is_err());
    }

    #[test]
    fn test_display_and_label() {
        let cr = ChallengeRating::parse("1/4").unwrap();
        assert_eq!(cr.to_string(), "1/4");
        assert_eq!(cr.label(), "CR 1/4");
        assert_eq!(ChallengeRating::parse("8/8").unwrap().to_string(), "1");
    }

    #[test]
    fn test_canonical_values_are_sorted_and_complete() {
        let values = ChallengeRating::canonical_values();
        assert_eq!(values.len(), 34);
        assert!(values.windows(2).all(|w| w[0].value() < w[1].value()));
        assert_eq!(values[1].to_string(), "1/8");
        assert_eq!(values[33].to_string(), "30");
    }

    #[test]
    fn test_serde_accepts_strings_and_numbers() {
        let from_text: ChallengeRating = serde_json::from_str("\"1/2\"").unwrap();
        let from_number: ChallengeRating = serde_json::from_str("0.5").unwrap();
        assert_eq!(from_text, from_number);
        assert_eq!(serde_json::to_string(&from_text).unwrap(), "\"1/2\"");
        assert!(serde_json::from_str::<ChallengeRating>("\"1/3\"").is_err());
    }
}
