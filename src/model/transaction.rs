use crate::model::{lenient, Amount};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// Whether a transaction brings money in, sends money out, or records an item.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Money received. Adds to the balance.
    #[default]
    Incoming,
    /// Money spent. Subtracts from the balance.
    Outgoing,
    /// A tracked item with an approximate worth. Never affects the balance.
    Item,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

/// The point in time a transaction happened. This is the only ordering key of a ledger.
///
/// Timestamps carry no timezone and are local time, like `now()`. Input with an offset is
/// converted to local time.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TransactionDate(NaiveDateTime);

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const DISPLAY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

impl TransactionDate {
    pub const fn new(value: NaiveDateTime) -> Self {
        Self(value)
    }

    /// The current local time, truncated to the minute.
    pub fn now() -> Self {
        let now = Local::now().naive_local();
        Self(
            now.with_second(0)
                .and_then(|t| t.with_nanosecond(0))
                .unwrap_or(now),
        )
    }

    pub fn value(&self) -> NaiveDateTime {
        self.0
    }

    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }
}

/// Returned when a string is not a timestamp in any of the accepted forms.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[error("'{0}' is not a valid date and time")]
pub struct DateError(String);

impl FromStr for TransactionDate {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(with_offset) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Self(with_offset.with_timezone(&Local).naive_local()));
        }
        for format in DATE_TIME_FORMATS {
            if let Ok(value) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(Self(value));
            }
        }
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map(|d| Self(d.and_time(NaiveTime::MIN)))
            .map_err(|_| DateError(s.to_string()))
    }
}

impl Display for TransactionDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DISPLAY_FORMAT))
    }
}

impl Serialize for TransactionDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TransactionDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        TransactionDate::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<NaiveDateTime> for TransactionDate {
    fn from(value: NaiveDateTime) -> Self {
        Self(value)
    }
}

/// A single dated entry of an event.
///
/// `balance_amount_now` is owned by the ledger: it is overwritten every time the event the
/// transaction belongs to is mutated.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    id: String,
    #[serde(default)]
    event_id: String,
    #[serde(rename = "type")]
    kind: TransactionType,
    #[serde(default, deserialize_with = "lenient::amount_or_zero")]
    amount: Amount,
    #[serde(default, deserialize_with = "lenient::amount_or_zero")]
    balance_amount_now: Amount,
    #[serde(default)]
    description: String,
    date: TransactionDate,
    #[serde(
        default,
        deserialize_with = "lenient::optional_amount",
        skip_serializing_if = "Option::is_none"
    )]
    worth: Option<Amount>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    item_name: Option<String>,
}

impl Transaction {
    /// Creates an `incoming` or `outgoing` transaction. If `kind` is `Item`, the amount is
    /// dropped; use `Transaction::new_item` to record the item's name and worth.
    pub fn new(
        id: impl Into<String>,
        event_id: impl Into<String>,
        kind: TransactionType,
        amount: Amount,
        date: TransactionDate,
        description: impl Into<String>,
    ) -> Self {
        let mut transaction = Self {
            id: id.into(),
            event_id: event_id.into(),
            kind,
            amount,
            balance_amount_now: Amount::ZERO,
            description: description.into(),
            date,
            worth: None,
            item_name: None,
        };
        transaction.normalize();
        transaction
    }

    /// Creates an `item` transaction. Its amount is always zero.
    pub fn new_item(
        id: impl Into<String>,
        event_id: impl Into<String>,
        item_name: impl Into<String>,
        worth: Amount,
        date: TransactionDate,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            event_id: event_id.into(),
            kind: TransactionType::Item,
            amount: Amount::ZERO,
            balance_amount_now: Amount::ZERO,
            description: description.into(),
            date,
            worth: Some(worth),
            item_name: Some(item_name.into()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// The running balance of the event right after this transaction.
    pub fn balance_amount_now(&self) -> Amount {
        self.balance_amount_now
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn date(&self) -> TransactionDate {
        self.date
    }

    pub fn worth(&self) -> Option<Amount> {
        self.worth
    }

    pub fn item_name(&self) -> Option<&str> {
        self.item_name.as_deref()
    }

    /// The transaction's contribution to the event balance: `+amount`, `-amount` or zero.
    pub fn signed_amount(&self) -> Amount {
        match self.kind {
            TransactionType::Incoming => self.amount,
            TransactionType::Outgoing => -self.amount,
            TransactionType::Item => Amount::ZERO,
        }
    }

    pub(crate) fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub(crate) fn set_balance_amount_now(&mut self, balance: Amount) {
        self.balance_amount_now = balance;
    }

    /// Items carry no amount; money transactions carry no item fields.
    pub(crate) fn normalize(&mut self) {
        match self.kind {
            TransactionType::Item => self.amount = Amount::ZERO,
            TransactionType::Incoming | TransactionType::Outgoing => {
                self.worth = None;
                self.item_name = None;
            }
        }
    }
}
