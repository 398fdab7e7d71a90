//! Forgiving decoding for categorical intake fields.
//!
//! Intake payloads arrive from several form generations, so a categorical field may
//! carry a bracket name, a raw number (`"medications": 2`, `"cup_disc_ratio": 0.8`),
//! a boolean, or null. None of these fail the request: names go through the enum's
//! own serde names, numbers and flags through [`Categorical`], and anything else
//! lands on the default bucket.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

/// A categorical input with a default bucket and optional numeric conversions.
pub trait Categorical: Default {
    /// Bucket for a finite number. Numbers mean nothing for most fields.
    fn from_number(_value: f64) -> Self {
        Self::default()
    }

    fn from_flag(_value: bool) -> Self {
        Self::default()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Wire<T> {
    Named(T),
    Number(f64),
    Flag(bool),
    Other(IgnoredAny),
}

/// `deserialize_with` target for categorical fields. Only malformed JSON errors.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Categorical + Deserialize<'de>,
{
    let value = match Wire::<T>::deserialize(deserializer)? {
        Wire::Named(value) => value,
        Wire::Number(number) if number.is_finite() => T::from_number(number),
        Wire::Flag(flag) => T::from_flag(flag),
        Wire::Number(_) | Wire::Other(IgnoredAny) => T::default(),
    };
    Ok(value)
}
