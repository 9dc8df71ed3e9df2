// Yen amounts paired with their display strings

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

static YEN_PATTERN: OnceLock<Regex> = OnceLock::new();

fn get_yen_pattern() -> &'static Regex {
    YEN_PATTERN.get_or_init(|| Regex::new(r"^(-)?[¥￥](\d{1,3}(?:,\d{3})*)$").unwrap())
}

/// Format a yen amount with thousands separators: `10000000` -> `¥10,000,000`
pub fn format_yen(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-¥{}", grouped)
    } else {
        format!("¥{}", grouped)
    }
}

/// Inverse of [`format_yen`]. Only canonical grouping is accepted.
pub fn parse_yen(formatted: &str) -> Option<i64> {
    let caps = get_yen_pattern().captures(formatted.trim())?;
    let digits: String = caps[2].chars().filter(|c| *c != ',').collect();
    let magnitude: i64 = digits.parse().ok()?;
    if caps.get(1).is_some() {
        Some(-magnitude)
    } else {
        Some(magnitude)
    }
}

/// Format a 0-100 percentage with one decimal place
pub fn format_percentage(value: f64) -> String {
    format!("{:.1}%", value)
}

/// A monetary figure: numeric yen plus its formatted string.
///
/// Deserialization rejects pairs whose string does not parse back to the
/// value, so every `Money` in a report is self-consistent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MoneyRepr")]
pub struct Money {
    pub value: i64,
    pub formatted: String,
}

#[derive(Deserialize)]
struct MoneyRepr {
    value: i64,
    formatted: String,
}

impl TryFrom<MoneyRepr> for Money {
    type Error = String;

    fn try_from(repr: MoneyRepr) -> Result<Self, Self::Error> {
        match parse_yen(&repr.formatted) {
            Some(parsed) if parsed == repr.value => Ok(Money {
                value: repr.value,
                formatted: repr.formatted,
            }),
            _ => Err(format!(
                "formatted amount '{}' does not match value {}",
                repr.formatted, repr.value
            )),
        }
    }
}

impl Money {
    pub fn yen(value: i64) -> Self {
        Self {
            value,
            formatted: format_yen(value),
        }
    }

    pub fn zero() -> Self {
        Self::yen(0)
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        Money::yen(iter.map(|m| m.value).sum())
    }
}

impl<'a> std::iter::Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        Money::yen(iter.map(|m| m.value).sum())
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.formatted)
    }
}

/// A percentage rounded to one decimal place, paired with its display string.
///
/// The value is stored as given, so callers that need the 0-100 range
/// check [`is_in_range`](Self::is_in_range) and [`clamped`](Self::clamped).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PercentageRepr")]
pub struct Percentage {
    pub value: f64,
    pub formatted: String,
}

#[derive(Deserialize)]
struct PercentageRepr {
    value: f64,
    formatted: String,
}

impl TryFrom<PercentageRepr> for Percentage {
    type Error = String;

    fn try_from(repr: PercentageRepr) -> Result<Self, Self::Error> {
        if repr.formatted == format_percentage(repr.value) {
            Ok(Percentage {
                value: repr.value,
                formatted: repr.formatted,
            })
        } else {
            Err(format!(
                "formatted percentage '{}' does not match value {}",
                repr.formatted, repr.value
            ))
        }
    }
}

impl Percentage {
    pub fn new(value: f64) -> Self {
        let value = if value.is_finite() {
            (value * 10.0).round() / 10.0
        } else {
            0.0
        };
        Self {
            value,
            formatted: format_percentage(value),
        }
    }

    pub fn is_in_range(&self) -> bool {
        (0.0..=100.0).contains(&self.value)
    }

    pub fn clamped(&self) -> Self {
        Self::new(self.value.clamp(0.0, 100.0))
    }
}

impl Default for Percentage {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl std::fmt::Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.formatted)
    }
}
