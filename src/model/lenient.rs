//! Deserializers for stored records where "no value" was written as an empty string, e.g.
//! `"worth": ""` on a non-item transaction or `"startDate": ""` on a cleared event.

use crate::model::Amount;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

/// `""` or `null` becomes `None`, anything else must parse as an `Amount`.
pub(super) fn optional_amount<'de, D>(deserializer: D) -> Result<Option<Amount>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(s) if !s.trim().is_empty() => Amount::from_str(&s)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// `""` or `null` becomes zero, anything else must parse as an `Amount`.
pub(super) fn amount_or_zero<'de, D>(deserializer: D) -> Result<Amount, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_amount(deserializer)?.unwrap_or_default())
}

/// `""` or `null` becomes `None`, anything else must parse as a date.
pub(super) fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(s) if !s.trim().is_empty() => super::parse_date(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("'{s}' is not a valid date"))),
        _ => Ok(None),
    }
}

/// `""` or `null` becomes `None`.
pub(super) fn optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.is_empty()))
}
