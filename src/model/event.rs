use crate::model::{lenient, Amount, Transaction};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A named, dated container of transactions, such as a trip.
///
/// The transaction sequence and the three totals are maintained by the functions in
/// `crate::ledger`; everything else is metadata supplied by the caller.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(
        default,
        deserialize_with = "lenient::optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    start_date: Option<NaiveDate>,
    #[serde(default)]
    is_multi_day: bool,
    #[serde(
        default,
        deserialize_with = "lenient::optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    end_date: Option<NaiveDate>,
    #[serde(default)]
    transactions: Vec<Transaction>,
    #[serde(default, deserialize_with = "lenient::amount_or_zero")]
    incoming_amount: Amount,
    #[serde(default, deserialize_with = "lenient::amount_or_zero")]
    outgoing_amount: Amount,
    #[serde(default, deserialize_with = "lenient::amount_or_zero")]
    balance_amount: Amount,
    #[serde(default = "open_by_default")]
    open: bool,
}

fn open_by_default() -> bool {
    true
}

impl Default for Event {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            start_date: None,
            is_multi_day: false,
            end_date: None,
            transactions: Vec::new(),
            incoming_amount: Amount::ZERO,
            outgoing_amount: Amount::ZERO,
            balance_amount: Amount::ZERO,
            open: true,
        }
    }
}

impl Event {
    /// Creates an empty, open event. Passing an `end_date` makes it a multi-day event.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            start_date: Some(start_date),
            is_multi_day: end_date.is_some(),
            end_date,
            ..Self::default()
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    pub fn is_multi_day(&self) -> bool {
        self.is_multi_day
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    /// Transactions in chronological order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Transactions most-recent-first, the order in which they are usually displayed.
    pub fn newest_first(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().rev()
    }

    pub fn transaction(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id() == id)
    }

    pub fn incoming_amount(&self) -> Amount {
        self.incoming_amount
    }

    pub fn outgoing_amount(&self) -> Amount {
        self.outgoing_amount
    }

    pub fn balance_amount(&self) -> Amount {
        self.balance_amount
    }

    /// Whether the event still accepts transactions. This is informational only; the ledger
    /// does not refuse mutations of a closed event.
    pub fn open(&self) -> bool {
        self.open
    }

    /// True when the event has no transactions.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub(crate) fn set_open(&mut self, open: bool) {
        self.open = open;
    }

    pub(crate) fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub(crate) fn set_start_date(&mut self, start_date: NaiveDate) {
        self.start_date = Some(start_date);
    }

    /// Setting `is_multi_day` to false also drops the end date.
    pub(crate) fn set_multi_day(&mut self, is_multi_day: bool) {
        self.is_multi_day = is_multi_day;
        if !is_multi_day {
            self.end_date = None;
        }
    }

    pub(crate) fn set_end_date(&mut self, end_date: Option<NaiveDate>) {
        self.end_date = end_date;
    }

    pub(crate) fn transactions_mut(&mut self) -> &mut Vec<Transaction> {
        &mut self.transactions
    }

    pub(crate) fn set_totals(&mut self, incoming: Amount, outgoing: Amount) {
        self.incoming_amount = incoming;
        self.outgoing_amount = outgoing;
        self.balance_amount = incoming - outgoing;
    }

    /// Copies the ledger-owned fields (transactions and totals) from `other`.
    pub(crate) fn copy_ledger_from(&mut self, other: &Event) {
        self.transactions = other.transactions.clone();
        self.incoming_amount = other.incoming_amount;
        self.outgoing_amount = other.outgoing_amount;
        self.balance_amount = other.balance_amount;
    }
}
