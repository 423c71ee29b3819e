//! Rupee amounts with two decimal places.
//!
//! Amounts arrive from the storefront as plain JSON numbers (`899`, `49.5`)
//! and sometimes as strings; both are accepted. They are serialized back as
//! JSON numbers so the front-end can compare them directly.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};
use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const SCALE: i64 = 2;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(BigDecimal);

impl Money {
    pub fn new(amount: BigDecimal) -> Self {
        Money(amount.with_scale_round(SCALE, RoundingMode::HalfUp))
    }

    pub fn zero() -> Self {
        Money(BigDecimal::zero())
    }

    pub fn from_rupees(rupees: i64) -> Self {
        Money(BigDecimal::from(rupees))
    }

    pub fn amount(&self) -> &BigDecimal {
        &self.0
    }

    pub fn into_inner(self) -> BigDecimal {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > BigDecimal::zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0 < BigDecimal::zero()
    }

    /// Price × quantity for a single cart line.
    pub fn times(&self, quantity: i32) -> Money {
        Money::new(&self.0 * BigDecimal::from(quantity))
    }

    /// `percent` per cent of this amount.
    pub fn percent(&self, percent: &Money) -> Money {
        Money::new(&self.0 * &percent.0 / BigDecimal::from(100))
    }

    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl From<BigDecimal> for Money {
    fn from(amount: BigDecimal) -> Self {
        Money::new(amount)
    }
}

impl FromStr for Money {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BigDecimal::from_str(s.trim())
            .map(Money::new)
            .map_err(|e| format!("invalid amount '{}': {}", s, e))
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money::new(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money::new(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.with_scale(SCALE))
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(serde_json::Number),
    Text(String),
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = match RawAmount::deserialize(deserializer)? {
            RawAmount::Number(n) => n.to_string(),
            RawAmount::Text(s) => s,
        };
        Money::from_str(&text).map_err(serde::de::Error::custom)
    }
}
