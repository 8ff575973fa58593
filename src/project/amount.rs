//! Default-to-zero parsing for monetary input fields.
//!
//! Data entry happens mid-form, so a half-typed or missing amount must never
//! fail a request. Every raw monetary field is routed through [`lenient`],
//! which is the only place where a bad value becomes zero.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::{self, Deserializer, Visitor};
use std::fmt;
use std::str::FromStr;

/// Largest magnitude a single amount may have. Larger values count as zero.
// 1_000_000_000_000_000 (10^15), built via the const `from_parts` constructor.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Decimal places kept on every amount.
pub const AMOUNT_SCALE: u32 = 4;

/// Clamp an amount into the range the calculator works in: values beyond
/// [`MAX_AMOUNT`] become zero, the rest are rounded to [`AMOUNT_SCALE`]
/// places. Sums and ratios of bounded amounts cannot overflow `Decimal`.
pub fn bound(value: Decimal) -> Decimal {
    if value.abs() > MAX_AMOUNT {
        return Decimal::ZERO;
    }
    value.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Parse a user-supplied amount string. Anything that is not a plain decimal
/// number, or is out of range, is zero.
pub fn parse_amount(raw: &str) -> Decimal {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Decimal::ZERO;
    }
    let parsed = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .unwrap_or(Decimal::ZERO);
    bound(parsed)
}

fn from_float(value: f64) -> Decimal {
    if !value.is_finite() {
        return Decimal::ZERO;
    }
    // Shortest round-trip text keeps 0.1 as 0.1 rather than its binary expansion.
    let parsed = Decimal::from_str(&value.to_string())
        .ok()
        .or_else(|| Decimal::from_f64(value))
        .unwrap_or(Decimal::ZERO);
    bound(parsed)
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Option<Decimal>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an amount")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(bound(Decimal::from(v))))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(bound(Decimal::from(v))))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Some(from_float(v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Some(parse_amount(v)))
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
        Ok(Some(Decimal::ZERO))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Some(Decimal::ZERO))
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Some(Decimal::ZERO))
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_any(AmountVisitor)
    }

    fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<de::IgnoredAny>()?.is_some() {}
        Ok(Some(Decimal::ZERO))
    }

    fn visit_map<A: de::MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        while map.next_entry::<de::IgnoredAny, de::IgnoredAny>()?.is_some() {}
        Ok(Some(Decimal::ZERO))
    }
}

/// `deserialize_with` target for `Option<Decimal>` input fields.
///
/// A present field always yields `Some`, zero when it does not parse, so a
/// patch that sends garbage still overwrites the stored value. Absent fields
/// are handled by `#[serde(default)]` and stay `None`.
pub fn lenient<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(AmountVisitor)
}
