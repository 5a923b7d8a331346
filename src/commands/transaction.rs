//! Transaction command handlers. Each one edits the current event through a `Ledger`, syncs the
//! event collection and saves the store.

use crate::args::{AddTxnArgs, TxnFields, UpdateTxnArgs};
use crate::commands::event::no_current_event;
use crate::commands::Out;
use crate::error::{not_found, Error, ErrorType};
use crate::model::{Event, Limits, Transaction, TransactionDate, TransactionForm};
use crate::utils::generate_id;
use crate::{Config, Ledger, Result};
use tracing::debug;

/// Loads the state, hands the current event's ledger to `f` and, if `f` succeeds, commits the
/// ledger and saves the state.
async fn with_ledger<T>(
    config: &Config,
    f: impl FnOnce(&mut Ledger, &Limits) -> Result<T>,
) -> Result<T> {
    let store = config.store();
    let mut state = store.load().await?;
    let mut ledger = state.take_ledger().ok_or_else(no_current_event)?;
    let value = f(&mut ledger, &config.limits())?;
    state.commit(ledger);
    store.save(&state).await?;
    Ok(value)
}

/// Copies the fields that were given on the command line into `form`.
fn overlay(form: &mut TransactionForm, fields: &TxnFields) {
    if let Some(amount) = fields.amount() {
        form.amount = amount.to_string();
    }
    if let Some(date) = fields.date() {
        form.date = date.to_string();
    }
    if let Some(description) = fields.description() {
        form.description = description.to_string();
    }
    if let Some(worth) = fields.worth() {
        form.worth = worth.to_string();
    }
    if let Some(item_name) = fields.item_name() {
        form.item_name = item_name.to_string();
    }
}

/// Returns the transaction with `id` as the ledger stored it, running balance included.
fn stored(event: &Event, id: &str) -> Result<Transaction> {
    event.transaction(id).cloned().ok_or_else(|| {
        Error::new(
            ErrorType::Internal,
            anyhow::anyhow!("Transaction '{id}' is missing from event '{}'", event.id()),
        )
    })
}

/// Adds a transaction to the current event. The date defaults to now.
pub async fn add_transaction(config: Config, args: AddTxnArgs) -> Result<Out<Transaction>> {
    let added = with_ledger(&config, |ledger, limits| {
        let mut form = TransactionForm {
            id: generate_id(None),
            event_id: ledger.event().id().to_string(),
            kind: args.kind().to_string(),
            date: TransactionDate::now().to_string(),
            ..TransactionForm::default()
        };
        overlay(&mut form, args.fields());
        let transaction = form.parse(limits)?;
        let id = transaction.id().to_string();
        stored(ledger.insert(transaction), &id)
    })
    .await?;

    Ok(Out::new(
        format!("Added {} transaction '{}'", added.kind(), added.id()),
        added,
    ))
}

/// Changes a transaction in the current event. Fields that are not given keep their values.
pub async fn update_transaction(config: Config, args: UpdateTxnArgs) -> Result<Out<Transaction>> {
    let id = args.id();
    let updated = with_ledger(&config, |ledger, limits| {
        let existing = ledger
            .event()
            .transaction(id)
            .ok_or_else(|| not_found(format!("There is no transaction with id '{id}'")))?;
        let mut form = TransactionForm::from_transaction(existing);
        if let Some(kind) = args.kind() {
            form.kind = kind.to_string();
        }
        overlay(&mut form, args.fields());
        let replacement = form.parse(limits)?;
        stored(ledger.update(id, replacement), id)
    })
    .await?;

    Ok(Out::new(format!("Updated transaction '{id}'"), updated))
}

/// Deletes a transaction from the current event. Deleting a transaction that does not exist does
/// nothing.
pub async fn delete_transaction(config: Config, id: &str) -> Result<Out<()>> {
    let deleted = with_ledger(&config, |ledger, _| {
        let exists = ledger.event().transaction(id).is_some();
        ledger.delete(id);
        Ok(exists)
    })
    .await?;

    if deleted {
        Ok(format!("Deleted transaction '{id}'").into())
    } else {
        debug!("Transaction '{id}' does not exist, nothing to delete");
        Ok(format!("There is no transaction with id '{id}', nothing was deleted").into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, TransactionType};
    use crate::test::TestEnv;
    use std::str::FromStr;

    fn amt(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    async fn add(env: &TestEnv, kind: &str, fields: TxnFields) -> Transaction {
        let out = add_transaction(env.config(), AddTxnArgs::new(kind, fields))
            .await
            .unwrap();
        out.structure().unwrap().clone()
    }

    #[tokio::test]
    async fn test_add_transactions() {
        let env = TestEnv::with_event().await;
        let t1 = add(
            &env,
            "incoming",
            TxnFields::default()
                .with_amount("100")
                .with_date("2025-01-02"),
        )
        .await;
        let t2 = add(
            &env,
            "outgoing",
            TxnFields::default()
                .with_amount("40")
                .with_date("2025-01-01")
                .with_description("Taxi"),
        )
        .await;
        assert_eq!(t1.event_id(), "goa");
        assert_eq!(t2.balance_amount_now(), amt("-40"));
        assert_eq!(t2.description(), "Taxi");

        let state = env.load().await;
        let current = state.current_event().unwrap();
        let ids: Vec<_> = current.transactions().iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec![t2.id(), t1.id()]);
        assert_eq!(current.balance_amount(), amt("60"));

        let stored = state.events().get("goa").unwrap();
        assert_eq!(stored.transactions(), current.transactions());
        assert_eq!(stored.incoming_amount(), amt("100"));
        assert_eq!(stored.outgoing_amount(), amt("40"));
    }

    #[tokio::test]
    async fn test_add_item() {
        let env = TestEnv::with_event().await;
        let item = add(
            &env,
            "item",
            TxnFields::default()
                .with_item_name("Camera")
                .with_worth("500")
                .with_amount("999"),
        )
        .await;
        assert_eq!(item.kind(), TransactionType::Item);
        assert_eq!(item.amount(), Amount::ZERO);
        assert_eq!(item.worth(), Some(amt("500")));
        assert_eq!(env.load().await.current_event().unwrap().balance_amount(), Amount::ZERO);
    }

    #[tokio::test]
    async fn test_add_invalid_leaves_state_alone() {
        let env = TestEnv::with_event().await;
        let before = env.load().await;
        let err = add_transaction(
            env.config(),
            AddTxnArgs::new("outgoing", TxnFields::default().with_amount("-5")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
        assert!(err.to_string().contains("Amount must be greater than 0"));
        assert_eq!(env.load().await, before);
    }

    #[tokio::test]
    async fn test_add_without_current_event() {
        let env = TestEnv::new().await;
        let err = add_transaction(
            env.config(),
            AddTxnArgs::new("incoming", TxnFields::default().with_amount("5")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::NotFound);
    }

    #[tokio::test]
    async fn test_update_transaction_keeps_unspecified_fields() {
        let env = TestEnv::with_event().await;
        let t1 = add(
            &env,
            "outgoing",
            TxnFields::default()
                .with_amount("40")
                .with_date("2025-07-01T10:00")
                .with_description("Taxi"),
        )
        .await;
        let t2 = add(
            &env,
            "incoming",
            TxnFields::default()
                .with_amount("100")
                .with_date("2025-07-02T10:00"),
        )
        .await;

        let args = UpdateTxnArgs::new(
            t1.id(),
            None,
            TxnFields::default().with_date("2025-07-03T10:00"),
        );
        let updated = update_transaction(env.config(), args)
            .await
            .unwrap()
            .structure()
            .unwrap()
            .clone();
        assert_eq!(updated.description(), "Taxi");
        assert_eq!(updated.amount(), amt("40"));
        assert_eq!(updated.balance_amount_now(), amt("60"));

        let state = env.load().await;
        let ids: Vec<_> = state
            .current_event()
            .unwrap()
            .transactions()
            .iter()
            .map(|t| t.id().to_string())
            .collect();
        assert_eq!(ids, vec![t2.id().to_string(), t1.id().to_string()]);
    }

    #[tokio::test]
    async fn test_update_transaction_type_change() {
        let env = TestEnv::with_event().await;
        let t = add(&env, "incoming", TxnFields::default().with_amount("10")).await;
        let args = UpdateTxnArgs::new(t.id(), Some("outgoing".to_string()), TxnFields::default());
        update_transaction(env.config(), args).await.unwrap();
        let state = env.load().await;
        assert_eq!(state.current_event().unwrap().balance_amount(), amt("-10"));
        assert_eq!(state.events().get("goa").unwrap().outgoing_amount(), amt("10"));
    }

    #[tokio::test]
    async fn test_update_unknown_transaction() {
        let env = TestEnv::with_event().await;
        let args = UpdateTxnArgs::new("nope", None, TxnFields::default());
        let err = update_transaction(env.config(), args).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::NotFound);
    }

    #[tokio::test]
    async fn test_delete_transaction() {
        let env = TestEnv::with_event().await;
        let t = add(&env, "incoming", TxnFields::default().with_amount("10")).await;

        let out = delete_transaction(env.config(), "nope").await.unwrap();
        assert!(out.message().contains("nothing was deleted"));
        assert_eq!(env.load().await.current_event().unwrap().transactions().len(), 1);

        let out = delete_transaction(env.config(), t.id()).await.unwrap();
        assert!(out.message().starts_with("Deleted transaction"));
        let state = env.load().await;
        assert!(state.current_event().unwrap().is_empty());
        assert_eq!(state.events().get("goa").unwrap().balance_amount(), Amount::ZERO);
    }
}
