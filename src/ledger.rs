//! The event ledger: keeps an event's transactions in chronological order and its totals and
//! running balances consistent.
//!
//! Every mutation recomputes all derived values by replaying the whole sequence from the start.
//!
//! The operations are available as functions that take an `Event` by value and return the
//! updated `Event`, and as methods on `Ledger`, which owns the event currently being worked on.

use crate::model::{Amount, Event, Transaction, TransactionDate, TransactionType};
use tracing::{debug, trace};

/// Inserts `transaction` after every existing transaction dated at or before it.
///
/// Backdated transactions land in their chronological position. Among transactions with equal
/// dates, arrival order is kept.
pub fn insert_transaction(mut event: Event, mut transaction: Transaction) -> Event {
    transaction.normalize();
    let index = insert_index(event.transactions(), transaction.date());
    debug!(
        "Inserting transaction '{}' into event '{}' at position {index}",
        transaction.id(),
        event.id()
    );
    event.transactions_mut().insert(index, transaction);
    recalculate(&mut event);
    event
}

/// Removes the transaction with `transaction_id`. If there is none, `event` is returned as is.
pub fn delete_transaction(mut event: Event, transaction_id: &str) -> Event {
    let Some(index) = position(&event, transaction_id) else {
        debug!(
            "No transaction '{transaction_id}' in event '{}', nothing to delete",
            event.id()
        );
        return event;
    };
    let removed = event.transactions_mut().remove(index);
    debug!(
        "Deleted transaction '{}' from position {index} of event '{}'",
        removed.id(),
        event.id()
    );
    recalculate(&mut event);
    event
}

/// Replaces the transaction with `transaction_id` by `replacement`, which takes over its id.
///
/// If the date changed, the transaction moves to its new chronological position as if it had
/// just been inserted. If there is no such transaction, `event` is returned as is.
pub fn update_transaction(
    mut event: Event,
    transaction_id: &str,
    mut replacement: Transaction,
) -> Event {
    let Some(index) = position(&event, transaction_id) else {
        debug!(
            "No transaction '{transaction_id}' in event '{}', nothing to update",
            event.id()
        );
        return event;
    };
    replacement.set_id(transaction_id);
    replacement.normalize();

    let transactions = event.transactions_mut();
    if transactions[index].date() == replacement.date() {
        transactions[index] = replacement;
        debug!("Updated transaction '{transaction_id}' in place at position {index}");
    } else {
        transactions.remove(index);
        let new_index = insert_index(transactions, replacement.date());
        transactions.insert(new_index, replacement);
        debug!("Moved transaction '{transaction_id}' from position {index} to {new_index}");
    }
    recalculate(&mut event);
    event
}

/// Returns the empty initial event.
pub fn clear_event() -> Event {
    Event::default()
}

/// Restores the ledger invariants on an event that came from elsewhere, e.g. storage.
///
/// Transactions are stably sorted by date and every derived value is recomputed.
pub fn rebuild(mut event: Event) -> Event {
    let transactions = event.transactions_mut();
    transactions.iter_mut().for_each(Transaction::normalize);
    transactions.sort_by_key(Transaction::date);
    recalculate(&mut event);
    event
}

/// The first position holding a transaction dated strictly after `date`, or the end.
fn insert_index(transactions: &[Transaction], date: TransactionDate) -> usize {
    transactions
        .iter()
        .position(|t| t.date() > date)
        .unwrap_or(transactions.len())
}

fn position(event: &Event, transaction_id: &str) -> Option<usize> {
    event
        .transactions()
        .iter()
        .position(|t| t.id() == transaction_id)
}

fn recalculate(event: &mut Event) {
    recalculate_totals(event);
    recalculate_running_balances(event);
}

fn recalculate_totals(event: &mut Event) {
    let incoming = total(event.transactions(), TransactionType::Incoming);
    let outgoing = total(event.transactions(), TransactionType::Outgoing);
    event.set_totals(incoming, outgoing);
    trace!(
        "Event '{}' totals: incoming {incoming}, outgoing {outgoing}, balance {}",
        event.id(),
        event.balance_amount()
    );
}

fn total(transactions: &[Transaction], kind: TransactionType) -> Amount {
    transactions
        .iter()
        .filter(|t| t.kind() == kind)
        .map(Transaction::amount)
        .sum()
}

fn recalculate_running_balances(event: &mut Event) {
    let mut running = Amount::ZERO;
    for transaction in event.transactions_mut() {
        running += transaction.signed_amount();
        transaction.set_balance_amount_now(running);
    }
}

/// Owns the event currently being viewed or edited.
///
/// Whoever displays an event holds its `Ledger` and hands out access explicitly. After each
/// mutation, copies of the event held elsewhere (see `crate::Events::sync`) are stale until the
/// caller updates them.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Ledger {
    event: Event,
}

impl Ledger {
    /// Takes ownership of `event`, restoring the ledger invariants with `rebuild`.
    pub fn new(event: Event) -> Self {
        Self {
            event: rebuild(event),
        }
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn into_event(self) -> Event {
        self.event
    }

    pub fn insert(&mut self, transaction: Transaction) -> &Event {
        self.apply(|event| insert_transaction(event, transaction))
    }

    pub fn delete(&mut self, transaction_id: &str) -> &Event {
        self.apply(|event| delete_transaction(event, transaction_id))
    }

    pub fn update(&mut self, transaction_id: &str, replacement: Transaction) -> &Event {
        self.apply(|event| update_transaction(event, transaction_id, replacement))
    }

    /// Switches to a different event.
    pub fn replace(&mut self, event: Event) -> &Event {
        self.apply(|_| rebuild(event))
    }

    pub fn clear(&mut self) -> &Event {
        self.apply(|_| clear_event())
    }

    fn apply(&mut self, f: impl FnOnce(Event) -> Event) -> &Event {
        let event = std::mem::take(&mut self.event);
        self.event = f(event);
        &self.event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn amt(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    fn date(s: &str) -> TransactionDate {
        TransactionDate::from_str(s).unwrap()
    }

    fn incoming(id: &str, amount: &str, d: &str) -> Transaction {
        Transaction::new(id, "e1", TransactionType::Incoming, amt(amount), date(d), "")
    }

    fn outgoing(id: &str, amount: &str, d: &str) -> Transaction {
        Transaction::new(id, "e1", TransactionType::Outgoing, amt(amount), date(d), "")
    }

    fn item(id: &str, worth: &str, d: &str) -> Transaction {
        Transaction::new_item(id, "e1", "Camera", amt(worth), date(d), "")
    }

    fn trip() -> Event {
        Event::new(
            "e1",
            "Goa Trip",
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            None,
        )
    }

    fn ids(event: &Event) -> Vec<&str> {
        event.transactions().iter().map(|t| t.id()).collect()
    }

    fn running(event: &Event) -> Vec<Amount> {
        event
            .transactions()
            .iter()
            .map(|t| t.balance_amount_now())
            .collect()
    }

    /// Checks sort order, totals and running balances against values computed from scratch.
    fn assert_invariants(event: &Event) {
        let transactions = event.transactions();
        for pair in transactions.windows(2) {
            assert!(pair[0].date() <= pair[1].date(), "not sorted: {pair:?}");
        }

        let mut incoming = Amount::ZERO;
        let mut outgoing = Amount::ZERO;
        let mut balance = Amount::ZERO;
        for t in transactions {
            match t.kind() {
                TransactionType::Incoming => {
                    incoming += t.amount();
                    balance += t.amount();
                }
                TransactionType::Outgoing => {
                    outgoing += t.amount();
                    balance -= t.amount();
                }
                TransactionType::Item => assert_eq!(t.amount(), Amount::ZERO),
            }
            assert_eq!(t.balance_amount_now(), balance, "running balance of {}", t.id());
        }
        assert_eq!(event.incoming_amount(), incoming);
        assert_eq!(event.outgoing_amount(), outgoing);
        assert_eq!(event.balance_amount(), incoming - outgoing);
    }

    #[test]
    fn test_backdated_insert() {
        let event = insert_transaction(trip(), incoming("t1", "100", "2025-01-02"));
        let event = insert_transaction(event, outgoing("t2", "40", "2025-01-01"));

        assert_eq!(ids(&event), vec!["t2", "t1"]);
        assert_eq!(running(&event), vec![amt("-40"), amt("60")]);
        assert_eq!(event.incoming_amount(), amt("100"));
        assert_eq!(event.outgoing_amount(), amt("40"));
        assert_eq!(event.balance_amount(), amt("60"));
        assert_invariants(&event);
    }

    #[test]
    fn test_offset_date_orders_with_local_now() {
        let later = chrono::Local::now() + chrono::Duration::minutes(1);
        let event = insert_transaction(
            trip(),
            Transaction::new(
                "defaulted",
                "e1",
                TransactionType::Incoming,
                amt("10"),
                TransactionDate::now(),
                "",
            ),
        );
        let event = insert_transaction(event, incoming("explicit", "5", &later.to_rfc3339()));
        assert_eq!(ids(&event), vec!["defaulted", "explicit"]);
        assert_eq!(running(&event), vec![amt("10"), amt("15")]);
    }

    #[test]
    fn test_item_does_not_change_totals() {
        let event = insert_transaction(trip(), incoming("t1", "100", "2025-01-01"));
        let event = insert_transaction(event, outgoing("t2", "30", "2025-01-02"));
        // an item typed with an amount still contributes nothing
        let tent = Transaction::new(
            "t3",
            "e1",
            TransactionType::Item,
            amt("75"),
            date("2025-01-03"),
            "",
        );
        let event = insert_transaction(event, tent);
        let event = insert_transaction(event, item("t4", "500", "2025-01-04"));

        assert_eq!(event.incoming_amount(), amt("100"));
        assert_eq!(event.outgoing_amount(), amt("30"));
        assert_eq!(event.balance_amount(), amt("70"));
        assert_eq!(
            running(&event),
            vec![amt("100"), amt("70"), amt("70"), amt("70")]
        );
        assert_eq!(event.transactions()[3].worth(), Some(amt("500")));
        assert_invariants(&event);
    }

    #[test]
    fn test_equal_dates_keep_arrival_order() {
        let event = insert_transaction(trip(), outgoing("a", "1", "2025-01-01"));
        let event = insert_transaction(event, outgoing("b", "2", "2025-01-01"));
        let event = insert_transaction(event, outgoing("c", "3", "2025-01-03"));
        assert_eq!(ids(&event), vec!["a", "b", "c"]);

        // a late arrival with an equal date goes after its peers, before later dates
        let event = insert_transaction(event, incoming("d", "10", "2025-01-01"));
        assert_eq!(ids(&event), vec!["a", "b", "d", "c"]);
        assert_invariants(&event);
    }

    #[test]
    fn test_delete_middle() {
        let event = insert_transaction(trip(), incoming("t1", "100", "2025-01-01"));
        let event = insert_transaction(event, outgoing("t2", "40", "2025-01-02"));
        let event = insert_transaction(event, outgoing("t3", "25", "2025-01-03"));
        assert_eq!(running(&event), vec![amt("100"), amt("60"), amt("35")]);
        let before = event.balance_amount();

        let event = delete_transaction(event, "t2");
        assert_eq!(ids(&event), vec!["t1", "t3"]);
        assert_eq!(running(&event), vec![amt("100"), amt("75")]);
        assert_eq!(event.outgoing_amount(), amt("25"));
        assert_eq!(event.balance_amount() - before, amt("40"));
        assert_invariants(&event);
    }

    #[test]
    fn test_delete_unknown_id_is_a_no_op() {
        let event = insert_transaction(trip(), incoming("t1", "100", "2025-01-02"));
        let event = insert_transaction(event, outgoing("t2", "40", "2025-01-01"));
        let before = serde_json::to_string(&event).unwrap();

        let event = delete_transaction(event, "nope");
        assert_eq!(serde_json::to_string(&event).unwrap(), before);
    }

    #[test]
    fn test_delete_last_transaction_empties_event() {
        let event = insert_transaction(trip(), outgoing("t1", "12.5", "2025-01-02"));
        assert!(!event.is_empty());
        let event = delete_transaction(event, "t1");
        assert!(event.is_empty());
        assert_eq!(event.incoming_amount(), Amount::ZERO);
        assert_eq!(event.outgoing_amount(), Amount::ZERO);
        assert_eq!(event.balance_amount(), Amount::ZERO);
        assert_eq!(event.title(), "Goa Trip");
    }

    #[test]
    fn test_update_in_place() {
        let event = insert_transaction(trip(), incoming("t1", "100", "2025-01-01"));
        let event = insert_transaction(event, outgoing("t2", "40", "2025-01-02"));
        let event = insert_transaction(event, outgoing("t3", "10", "2025-01-03"));

        let event = update_transaction(event, "t2", outgoing("ignored", "55", "2025-01-02"));
        assert_eq!(ids(&event), vec!["t1", "t2", "t3"]);
        assert_eq!(running(&event), vec![amt("100"), amt("45"), amt("35")]);
        assert_invariants(&event);
    }

    #[test]
    fn test_update_with_new_date_moves_transaction() {
        let event = insert_transaction(trip(), incoming("t1", "100", "2025-01-01"));
        let event = insert_transaction(event, outgoing("t2", "40", "2025-01-02"));
        let event = insert_transaction(event, outgoing("t3", "10", "2025-01-03"));

        let event = update_transaction(event, "t1", incoming("t1", "100", "2025-01-05"));
        assert_eq!(ids(&event), vec!["t2", "t3", "t1"]);
        assert_eq!(running(&event), vec![amt("-40"), amt("-50"), amt("50")]);
        assert_invariants(&event);
    }

    #[test]
    fn test_update_type_change() {
        let event = insert_transaction(trip(), incoming("t1", "100", "2025-01-01"));
        let event = update_transaction(event, "t1", item("x", "300", "2025-01-01"));
        assert_eq!(event.transactions()[0].kind(), TransactionType::Item);
        assert_eq!(event.balance_amount(), Amount::ZERO);
        assert_invariants(&event);
    }

    #[test]
    fn test_update_unknown_id_is_a_no_op() {
        let event = insert_transaction(trip(), incoming("t1", "100", "2025-01-01"));
        let updated = update_transaction(event.clone(), "t9", incoming("t9", "1", "2025-01-01"));
        assert_eq!(updated, event);
    }

    #[test]
    fn test_clear_event() {
        let event = clear_event();
        assert!(event.transactions().is_empty());
        assert_eq!(event.incoming_amount(), Amount::ZERO);
        assert_eq!(event.outgoing_amount(), Amount::ZERO);
        assert_eq!(event.balance_amount(), Amount::ZERO);
        assert_eq!(event, Event::default());
    }

    #[test]
    fn test_rebuild_repairs_stored_event() {
        let json = r#"{
            "id": "e1",
            "title": "Goa Trip",
            "startDate": "2025-01-01",
            "isMultiDay": false,
            "balanceAmount": "999",
            "incomingAmount": "0",
            "outgoingAmount": "0",
            "transactions": [
                {"id": "b", "type": "outgoing", "amount": "40", "balanceAmountNow": "",
                 "description": "", "date": "2025-01-02", "eventId": "e1"},
                {"id": "a", "type": "incoming", "amount": "100", "balanceAmountNow": "",
                 "description": "", "date": "2025-01-01", "eventId": "e1"},
                {"id": "c", "type": "outgoing", "amount": "5", "balanceAmountNow": "",
                 "description": "", "date": "2025-01-02", "eventId": "e1"}
            ],
            "open": true
        }"#;
        let event = rebuild(serde_json::from_str(json).unwrap());
        assert_eq!(ids(&event), vec!["a", "b", "c"]);
        assert_eq!(event.balance_amount(), amt("55"));
        assert_invariants(&event);
    }

    #[test]
    fn test_event_json_round_trip() {
        let event = insert_transaction(trip(), incoming("t1", "100.10", "2025-01-02T08:00"));
        let event = insert_transaction(event, item("t2", "500", "2025-01-02T09:30"));
        let event = insert_transaction(event, outgoing("t3", "0.35", "2025-01-01T23:59:59.5"));
        let json = serde_json::to_string_pretty(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_ledger_object() {
        let mut ledger = Ledger::new(trip());
        ledger.insert(incoming("t1", "100", "2025-01-02"));
        let event = ledger.insert(outgoing("t2", "40", "2025-01-01"));
        assert_eq!(event.balance_amount(), amt("60"));

        ledger.delete("t1");
        assert_eq!(ledger.event().balance_amount(), amt("-40"));

        ledger.update("t2", outgoing("t2", "20", "2025-01-01"));
        assert_eq!(ledger.event().balance_amount(), amt("-20"));

        let other = Event::new(
            "e2",
            "Birthday Party",
            NaiveDate::from_ymd_opt(2025, 5, 10).unwrap(),
            None,
        );
        assert_eq!(ledger.replace(other).id(), "e2");
        assert!(ledger.event().is_empty());

        ledger.insert(incoming("t5", "1", "2025-05-10"));
        ledger.clear();
        assert_eq!(ledger.into_event(), Event::default());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Insert {
            kind: TransactionType,
            cents: i64,
            day: u32,
            minute: u32,
        },
        Delete(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (
                prop_oneof![
                    Just(TransactionType::Incoming),
                    Just(TransactionType::Outgoing),
                    Just(TransactionType::Item),
                ],
                1i64..1_000_000,
                1u32..6,
                0u32..3,
            )
                .prop_map(|(kind, cents, day, minute)| Op::Insert {
                    kind,
                    cents,
                    day,
                    minute
                }),
            1 => (0usize..20).prop_map(Op::Delete),
        ]
    }

    fn make(ix: usize, kind: TransactionType, cents: i64, day: u32, minute: u32) -> Transaction {
        let amount = Amount::new(rust_decimal::Decimal::new(cents, 2));
        let when = TransactionDate::new(
            NaiveDate::from_ymd_opt(2025, 1, day)
                .unwrap()
                .and_hms_opt(12, minute, 0)
                .unwrap(),
        );
        let id = format!("t{ix}");
        match kind {
            TransactionType::Item => Transaction::new_item(id, "e1", "Thing", amount, when, ""),
            _ => Transaction::new(id, "e1", kind, amount, when, ""),
        }
    }

    proptest! {
        #[test]
        fn invariants_hold_after_every_operation(ops in proptest::collection::vec(op(), 1..40)) {
            let mut event = trip();
            for (ix, op) in ops.into_iter().enumerate() {
                match op {
                    Op::Insert { kind, cents, day, minute } => {
                        let t = make(ix, kind, cents, day, minute);
                        let date = t.date();
                        let before: Vec<String> =
                            event.transactions().iter().map(|t| t.id().to_string()).collect();
                        event = insert_transaction(event, t);
                        // peers with equal dates that arrived earlier come first
                        let pos = event.transactions().iter().position(|t| t.id() == format!("t{ix}")).unwrap();
                        prop_assert!(event.transactions()[pos + 1..].iter().all(|t| t.date() > date));
                        let after: Vec<String> = event
                            .transactions()
                            .iter()
                            .map(|t| t.id().to_string())
                            .filter(|id| *id != format!("t{ix}"))
                            .collect();
                        prop_assert_eq!(before, after);
                    }
                    Op::Delete(pick) => {
                        let target = event
                            .transactions()
                            .get(pick)
                            .map(|t| t.id().to_string())
                            .unwrap_or_else(|| "missing".to_string());
                        let before = event.clone();
                        event = delete_transaction(event, &target);
                        if target == "missing" {
                            prop_assert_eq!(&event, &before);
                        } else {
                            prop_assert_eq!(event.transactions().len() + 1, before.transactions().len());
                        }
                    }
                }
                assert_invariants(&event);
            }
        }
    }
}
