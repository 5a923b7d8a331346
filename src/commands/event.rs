//! Event command handlers.

use crate::args::{CreateEventArgs, UpdateEventArgs};
use crate::commands::Out;
use crate::error::not_found;
use crate::model::{Amount, Event, EventForm, TransactionType};
use crate::utils::generate_id;
use crate::{Config, EventUpdate, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

/// One line of `ledger event list`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub open: bool,
    pub transaction_count: usize,
    pub incoming_amount: Amount,
    pub outgoing_amount: Amount,
    pub balance_amount: Amount,
    pub current: bool,
}

impl EventSummary {
    fn new(event: &Event, current: bool) -> Self {
        Self {
            id: event.id().to_string(),
            title: event.title().to_string(),
            start_date: event.start_date(),
            end_date: event.end_date(),
            open: event.open(),
            transaction_count: event.transactions().len(),
            incoming_amount: event.incoming_amount(),
            outgoing_amount: event.outgoing_amount(),
            balance_amount: event.balance_amount(),
            current,
        }
    }
}

/// Creates an event, adds it to the collection and makes it the current event.
pub async fn create_event(config: Config, args: CreateEventArgs) -> Result<Out<Event>> {
    let form = EventForm {
        id: generate_id(Some(args.title())),
        title: args.title().to_string(),
        start_date: args.start_date().to_string(),
        is_multi_day: args.end_date().is_some(),
        end_date: args.end_date().unwrap_or_default().to_string(),
        open: !args.closed(),
    };
    let event = form.parse()?;

    let store = config.store();
    let mut state = store.load().await?;
    state.events_mut().add(event.clone())?;
    state.select(event.id());
    store.save(&state).await?;

    Ok(Out::new(
        format!("Created event '{}' with id '{}'", event.title(), event.id()),
        event,
    ))
}

/// Lists every event along with its totals.
pub async fn list_events(config: Config) -> Result<Out<Vec<EventSummary>>> {
    let state = config.store().load().await?;
    let current_id = state.current_event().map(Event::id);
    let summaries: Vec<EventSummary> = state
        .events()
        .iter()
        .map(|e| EventSummary::new(e, Some(e.id()) == current_id))
        .collect();

    if summaries.is_empty() {
        return Ok(Out::new("No events", summaries));
    }
    let message = summaries
        .iter()
        .map(|s| {
            format!(
                "{} {:<24} {:<30} {:>14}",
                if s.current { "*" } else { " " },
                s.id,
                s.title,
                s.balance_amount.formatted()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    Ok(Out::new(message, summaries))
}

/// Shows the event with `id`, or the current event when `id` is `None`.
pub async fn show_event(config: Config, id: Option<&str>) -> Result<Out<Event>> {
    let state = config.store().load().await?;
    let event = match id {
        Some(id) => state
            .events()
            .get(id)
            .ok_or_else(|| not_found(format!("There is no event with id '{id}'")))?,
        None => state.current_event().ok_or_else(no_current_event)?,
    };
    Ok(Out::new(render(event), event.clone()))
}

/// Makes the event with `id` the current event.
pub async fn select_event(config: Config, id: &str) -> Result<Out<Event>> {
    let store = config.store();
    let mut state = store.load().await?;
    if !state.select(id) {
        return Err(not_found(format!("There is no event with id '{id}'")));
    }
    store.save(&state).await?;
    let event = state.current_event().cloned().unwrap_or_default();
    Ok(Out::new(
        format!("Selected event '{}'", event.title()),
        event,
    ))
}

/// Deletes the event with `id`. Deleting an event that does not exist does nothing.
pub async fn delete_event(config: Config, id: &str) -> Result<Out<()>> {
    let store = config.store();
    let mut state = store.load().await?;
    if !state.events_mut().remove(id) {
        debug!("Event '{id}' does not exist, nothing to delete");
        return Ok(format!("There is no event with id '{id}', nothing was deleted").into());
    }
    if state.current_event().map(Event::id) == Some(id) {
        state.deselect();
    }
    store.save(&state).await?;
    Ok(format!("Deleted event '{id}'").into())
}

/// Changes the metadata of the event with `id`. Fields that are not given keep their values.
///
/// The result is checked with the same rules as a new event, so for example an update cannot
/// remove the title or give a multi-day event an unparseable end date.
pub async fn update_event(config: Config, args: UpdateEventArgs) -> Result<Out<Event>> {
    let store = config.store();
    let mut state = store.load().await?;
    let id = args.id();
    let existing = state
        .events()
        .get(id)
        .ok_or_else(|| not_found(format!("There is no event with id '{id}'")))?;

    let is_multi_day = if args.single_day() {
        false
    } else {
        args.end_date().is_some() || existing.is_multi_day()
    };
    let form = EventForm {
        id: id.to_string(),
        title: args.title().unwrap_or(existing.title()).to_string(),
        start_date: args
            .start_date()
            .map(str::to_string)
            .or_else(|| existing.start_date().map(|d| d.to_string()))
            .unwrap_or_default(),
        is_multi_day,
        end_date: args
            .end_date()
            .map(str::to_string)
            .or_else(|| existing.end_date().map(|d| d.to_string()))
            .unwrap_or_default(),
        open: args.open().unwrap_or(existing.open()),
    };
    let parsed = form.parse()?;

    let update = EventUpdate {
        title: Some(parsed.title().to_string()),
        start_date: parsed.start_date(),
        is_multi_day: Some(parsed.is_multi_day()),
        end_date: Some(parsed.end_date()),
        open: Some(parsed.open()),
    };
    state.events_mut().update(id, &update);
    if state.current_event().map(Event::id) == Some(id) {
        state.select(id);
    }
    store.save(&state).await?;

    let event = state.events().get(id).cloned().unwrap_or_default();
    Ok(Out::new(format!("Updated event '{}'", event.title()), event))
}

pub(super) fn no_current_event() -> crate::Error {
    not_found(
        "No event is selected. Create one with 'ledger event create' or pick one with \
        'ledger event select'",
    )
}

/// Renders an event header, its totals and its transactions, most recent first.
fn render(event: &Event) -> String {
    let mut header = format!("{} ({})", event.title(), event.id());
    if let Some(start) = event.start_date() {
        header.push_str(&format!(", {start}"));
        if let Some(end) = event.end_date() {
            header.push_str(&format!(" to {end}"));
        }
    }
    if !event.open() {
        header.push_str(", closed");
    }

    let mut lines = vec![
        header,
        format!(
            "Incoming: {}  Outgoing: {}  Balance: {}",
            event.incoming_amount().formatted(),
            event.outgoing_amount().formatted(),
            event.balance_amount().formatted()
        ),
    ];
    lines.extend(event.newest_first().map(|t| {
        let (amount, detail) = match t.kind() {
            TransactionType::Item => (
                t.worth().unwrap_or_default().formatted(),
                t.item_name().unwrap_or_default(),
            ),
            _ => (t.amount().formatted(), t.description()),
        };
        format!(
            "{:<10} {}  {:<8} {:>14} {:>14}  {}",
            t.id(),
            t.date(),
            t.kind().to_string(),
            amount,
            t.balance_amount_now().formatted(),
            detail
        )
    }));
    lines.join("\n")
}
