//! Parsing of loosely typed input into transactions and events.
//!
//! Forms hold exactly what a person typed. `parse` either produces a well-formed model value or
//! a `ValidationErrors` listing every field that is wrong, at most one error per field.

use crate::model::{parse_date, Amount, Event, Transaction, TransactionDate, TransactionType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// The largest amount or worth accepted by default: 9,999,999,999.
pub const DEFAULT_MAX_AMOUNT: Amount = Amount::new(Decimal::from_parts(1410065407, 2, 0, false, 0));

/// The longest item name accepted by default.
pub const DEFAULT_MAX_ITEM_NAME_LEN: usize = 25;

/// Bounds applied while parsing forms.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Limits {
    pub max_amount: Amount,
    pub max_item_name_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_amount: DEFAULT_MAX_AMOUNT,
            max_item_name_len: DEFAULT_MAX_ITEM_NAME_LEN,
        }
    }
}

/// The input fields that can fail validation.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Field {
    Id,
    Type,
    Amount,
    Worth,
    ItemName,
    Date,
    Title,
    StartDate,
    EndDate,
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Field::Id => "Id",
            Field::Type => "Type",
            Field::Amount => "Amount",
            Field::Worth => "Item value (worth)",
            Field::ItemName => "Item name",
            Field::Date => "Date",
            Field::Title => "Event title",
            Field::StartDate => "Start date",
            Field::EndDate => "End date",
        };
        f.write_str(s)
    }
}

/// A single reason why a form could not be parsed.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(Field),
    #[error("{field} must be a number, got '{value}'")]
    NotANumber { field: Field, value: String },
    #[error("{0} must be greater than 0")]
    NotPositive(Field),
    #[error("{field} must be at most {max}")]
    TooLarge { field: Field, max: Amount },
    #[error("{field} can be at most {max} characters long")]
    TooLong { field: Field, max: usize },
    #[error("{field} '{value}' is not a valid date")]
    InvalidDate { field: Field, value: String },
    #[error("'{0}' is not a transaction type, expected incoming, outgoing or item")]
    UnknownType(String),
}

impl ValidationError {
    /// The field this error is about.
    pub fn field(&self) -> Field {
        match self {
            ValidationError::Required(field) | ValidationError::NotPositive(field) => *field,
            ValidationError::NotANumber { field, .. }
            | ValidationError::TooLarge { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::InvalidDate { field, .. } => *field,
            ValidationError::UnknownType(_) => Field::Type,
        }
    }
}

/// Every problem found while parsing a form. Never empty.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[error("Invalid input: {}", join(.0))]
pub struct ValidationErrors(Vec<ValidationError>);

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    /// The error reported for `field`, if any.
    pub fn get(&self, field: Field) -> Option<&ValidationError> {
        self.0.iter().find(|e| e.field() == field)
    }
}

/// Collects errors while a form is being checked.
#[derive(Debug, Default)]
struct Checker(Vec<ValidationError>);

impl Checker {
    fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    /// Returns `value` when no errors were recorded.
    fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, ValidationErrors> {
        if self.0.is_empty() {
            Ok(value())
        } else {
            Err(ValidationErrors(self.0))
        }
    }

    /// Parses a required, positive, bounded money value.
    fn money(&mut self, field: Field, raw: &str, limits: &Limits) -> Option<Amount> {
        let raw = raw.trim();
        if raw.is_empty() {
            self.push(ValidationError::Required(field));
            return None;
        }
        let amount = match Amount::from_str(raw) {
            Ok(amount) => amount,
            Err(_) => {
                self.push(ValidationError::NotANumber {
                    field,
                    value: raw.to_string(),
                });
                return None;
            }
        };
        if !amount.is_positive() {
            self.push(ValidationError::NotPositive(field));
            None
        } else if amount > limits.max_amount {
            self.push(ValidationError::TooLarge {
                field,
                max: limits.max_amount,
            });
            None
        } else {
            Some(amount)
        }
    }

    fn required(&mut self, field: Field, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            self.push(ValidationError::Required(field));
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// Raw transaction input.
///
/// For `item` transactions `amount` is ignored; `item_name` and `worth` are required instead.
/// For `incoming` and `outgoing` transactions `worth` and `item_name` are ignored.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionForm {
    pub id: String,
    pub event_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: String,
    pub description: String,
    pub date: String,
    pub worth: String,
    pub item_name: String,
}

impl TransactionForm {
    /// Fills a form with the values of an existing transaction, e.g. to edit some of them.
    pub fn from_transaction(transaction: &Transaction) -> Self {
        Self {
            id: transaction.id().to_string(),
            event_id: transaction.event_id().to_string(),
            kind: transaction.kind().to_string(),
            amount: transaction.amount().to_string(),
            description: transaction.description().to_string(),
            date: transaction.date().to_string(),
            worth: transaction
                .worth()
                .map(|w| w.to_string())
                .unwrap_or_default(),
            item_name: transaction.item_name().unwrap_or_default().to_string(),
        }
    }

    pub fn parse(&self, limits: &Limits) -> Result<Transaction, ValidationErrors> {
        let mut checker = Checker::default();

        let id = checker.required(Field::Id, &self.id);

        let kind = match TransactionType::from_str(self.kind.trim()) {
            Ok(kind) => Some(kind),
            Err(_) if self.kind.trim().is_empty() => {
                checker.push(ValidationError::Required(Field::Type));
                None
            }
            Err(_) => {
                checker.push(ValidationError::UnknownType(self.kind.trim().to_string()));
                None
            }
        };

        let mut amount = None;
        let mut item = None;
        match kind {
            Some(TransactionType::Item) => {
                let name = checker.required(Field::ItemName, &self.item_name);
                let name = match name {
                    Some(name) if name.chars().count() > limits.max_item_name_len => {
                        checker.push(ValidationError::TooLong {
                            field: Field::ItemName,
                            max: limits.max_item_name_len,
                        });
                        None
                    }
                    other => other,
                };
                let worth = checker.money(Field::Worth, &self.worth, limits);
                item = name.zip(worth);
            }
            Some(TransactionType::Incoming | TransactionType::Outgoing) => {
                amount = checker.money(Field::Amount, &self.amount, limits);
            }
            None => {}
        }

        let date = match TransactionDate::from_str(&self.date) {
            Ok(date) => Some(date),
            Err(_) if self.date.trim().is_empty() => {
                checker.push(ValidationError::Required(Field::Date));
                None
            }
            Err(_) => {
                checker.push(ValidationError::InvalidDate {
                    field: Field::Date,
                    value: self.date.trim().to_string(),
                });
                None
            }
        };

        checker.finish(|| {
            // every Option below is Some when no errors were recorded
            let id = id.unwrap_or_default();
            let date = date.unwrap_or_else(TransactionDate::now);
            let description = self.description.trim();
            match (kind, item) {
                (Some(TransactionType::Item), Some((name, worth))) => Transaction::new_item(
                    id,
                    self.event_id.trim(),
                    name,
                    worth,
                    date,
                    description,
                ),
                (kind, _) => Transaction::new(
                    id,
                    self.event_id.trim(),
                    kind.unwrap_or_default(),
                    amount.unwrap_or_default(),
                    date,
                    description,
                ),
            }
        })
    }
}

/// Raw event input.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventForm {
    pub id: String,
    pub title: String,
    pub start_date: String,
    pub is_multi_day: bool,
    pub end_date: String,
    pub open: bool,
}

impl Default for EventForm {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            start_date: String::new(),
            is_multi_day: false,
            end_date: String::new(),
            open: true,
        }
    }
}

impl EventForm {
    pub fn parse(&self) -> Result<Event, ValidationErrors> {
        let mut checker = Checker::default();
        let id = checker.required(Field::Id, &self.id);
        let title = checker.required(Field::Title, &self.title);
        let start_date = checker
            .required(Field::StartDate, &self.start_date)
            .and_then(|raw| date_or_error(&mut checker, Field::StartDate, &raw));

        let end_date = if self.is_multi_day && !self.end_date.trim().is_empty() {
            date_or_error(&mut checker, Field::EndDate, self.end_date.trim())
        } else {
            None
        };

        checker.finish(|| {
            let start_date = start_date.unwrap_or_default();
            let mut event = Event::new(
                id.unwrap_or_default(),
                title.unwrap_or_default(),
                start_date,
                end_date,
            );
            event.set_multi_day(self.is_multi_day);
            event.set_open(self.open);
            event
        })
    }
}

fn date_or_error(checker: &mut Checker, field: Field, raw: &str) -> Option<chrono::NaiveDate> {
    let date = parse_date(raw);
    if date.is_none() {
        checker.push(ValidationError::InvalidDate {
            field,
            value: raw.to_string(),
        });
    }
    date
}
