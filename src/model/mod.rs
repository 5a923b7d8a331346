//! Types that represent the core data model: `Event`, `Transaction` and `Amount`, plus the forms
//! that produce them from raw input.
mod amount;
mod event;
mod form;
mod lenient;
mod transaction;

pub use amount::{Amount, AmountError};
pub use event::Event;
pub use form::{
    EventForm, Field, Limits, TransactionForm, ValidationError, ValidationErrors,
    DEFAULT_MAX_AMOUNT, DEFAULT_MAX_ITEM_NAME_LEN,
};
pub use transaction::{DateError, Transaction, TransactionDate, TransactionType};

use chrono::NaiveDate;
use std::str::FromStr;

/// Parses an event date. A full timestamp is accepted too, in which case its date is used.
pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| TransactionDate::from_str(trimmed).ok().map(|d| d.date()))
}
