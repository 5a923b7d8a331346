//! The collection of all events, keyed by event id.
//!
//! The collection holds its own copy of every event, including the one a `Ledger` is currently
//! working on. Keeping the two consistent is the caller's job: after each ledger mutation, pass
//! the updated event to `Events::sync`.

use crate::error::{Error, ErrorType};
use crate::ledger::rebuild;
use crate::model::Event;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A partial update of an event's metadata. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct EventUpdate {
    pub title: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub is_multi_day: Option<bool>,
    /// `Some(None)` removes the end date.
    pub end_date: Option<Option<NaiveDate>>,
    pub open: Option<bool>,
}

impl EventUpdate {
    pub fn is_empty(&self) -> bool {
        self == &EventUpdate::default()
    }

    /// Applies this update to `event`. Setting an end date makes the event multi-day.
    pub fn apply_to(&self, event: &mut Event) {
        if let Some(title) = &self.title {
            event.set_title(title.clone());
        }
        if let Some(start_date) = self.start_date {
            event.set_start_date(start_date);
        }
        if let Some(end_date) = self.end_date {
            event.set_end_date(end_date);
            if end_date.is_some() {
                event.set_multi_day(true);
            }
        }
        if let Some(is_multi_day) = self.is_multi_day {
            event.set_multi_day(is_multi_day);
        }
        if let Some(open) = self.open {
            event.set_open(open);
        }
    }
}

/// All events, in the order they were added.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Events(Vec<Event>);

impl Events {
    pub fn new(events: Vec<Event>) -> Self {
        Self(events)
    }

    /// Appends `event`. Fails if an event with the same id already exists.
    pub fn add(&mut self, event: Event) -> crate::Result<()> {
        if self.get(event.id()).is_some() {
            return Err(Error::new(
                ErrorType::Validation,
                anyhow::anyhow!("An event with id '{}' already exists", event.id()),
            ));
        }
        debug!("Adding event '{}'", event.id());
        self.0.push(event);
        Ok(())
    }

    /// Removes the event with `id`. Returns false if there was none.
    pub fn remove(&mut self, id: &str) -> bool {
        let len = self.0.len();
        self.0.retain(|e| e.id() != id);
        let removed = self.0.len() < len;
        if removed {
            debug!("Removed event '{id}'");
        }
        removed
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Replaces every event.
    pub fn initialize(&mut self, events: Vec<Event>) {
        self.0 = events;
    }

    /// Merges `update` into the event with `id`. Returns false if there was none.
    pub fn update(&mut self, id: &str, update: &EventUpdate) -> bool {
        match self.get_mut(id) {
            Some(event) => {
                update.apply_to(event);
                true
            }
            None => false,
        }
    }

    /// Copies the transactions and totals of `event` into the stored event with the same id.
    /// Metadata is left alone. Returns false if there is no stored event with that id.
    pub fn sync(&mut self, event: &Event) -> bool {
        match self.get_mut(event.id()) {
            Some(stored) => {
                stored.copy_ledger_from(event);
                debug!(
                    "Synced {} transactions of event '{}'",
                    event.transactions().len(),
                    event.id()
                );
                true
            }
            None => false,
        }
    }

    /// Runs `rebuild` on every event, restoring sort order, totals and running balances.
    pub fn rebuild_all(&mut self) {
        self.0 = std::mem::take(&mut self.0)
            .into_iter()
            .map(rebuild)
            .collect();
    }

    pub fn get(&self, id: &str) -> Option<&Event> {
        self.0.iter().find(|e| e.id() == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Event> {
        self.0.iter_mut().find(|e| e.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
