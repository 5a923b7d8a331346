//! Reads and writes the application state to a JSON file.

use crate::error::{ErrorType, IntoResult};
use crate::ledger::{rebuild, Ledger};
use crate::model::Event;
use crate::{utils, Events, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Everything that is persisted: the event currently open for editing, if any, and the
/// collection of all events.
///
/// Example file:
/// ```json
/// {
///   "currentEvent": null,
///   "events": [
///     {
///       "id": "goa-trip-4f1c9a2",
///       "title": "Goa Trip",
///       "startDate": "2025-07-01",
///       "isMultiDay": false,
///       "transactions": [],
///       "incomingAmount": "0",
///       "outgoingAmount": "0",
///       "balanceAmount": "0",
///       "open": true
///     }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    #[serde(default)]
    current_event: Option<Event>,
    #[serde(default)]
    events: Events,
}

impl State {
    pub fn new(current_event: Option<Event>, events: Events) -> Self {
        Self {
            current_event,
            events,
        }
    }

    pub fn current_event(&self) -> Option<&Event> {
        self.current_event.as_ref()
    }

    pub fn events(&self) -> &Events {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut Events {
        &mut self.events
    }

    /// Makes a copy of the stored event with `id` the current event. Returns false if there is
    /// no such event.
    pub fn select(&mut self, id: &str) -> bool {
        match self.events.get(id) {
            Some(event) => {
                self.current_event = Some(rebuild(event.clone()));
                true
            }
            None => false,
        }
    }

    /// Forgets the current event, if any.
    pub fn deselect(&mut self) {
        self.current_event = None;
    }

    /// Takes the current event out of the state, wrapped in a `Ledger` for editing. Hand it
    /// back with `commit`.
    pub fn take_ledger(&mut self) -> Option<Ledger> {
        self.current_event.take().map(Ledger::new)
    }

    /// Makes the ledger's event current again and copies its transactions and totals into the
    /// event collection.
    pub fn commit(&mut self, ledger: Ledger) {
        let event = ledger.into_event();
        if !self.events.sync(&event) {
            warn!(
                "The current event '{}' is not in the event collection",
                event.id()
            );
        }
        self.current_event = Some(event);
    }
}

/// The JSON file that holds the `State`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the state. A missing file is an empty state. The current event and every event in
    /// the collection are passed through `rebuild` so that they satisfy the ledger invariants even
    /// if the file was edited by hand.
    pub async fn load(&self) -> Result<State> {
        if !self.path.is_file() {
            debug!(
                "No data file at {}, starting with an empty state",
                self.path.display()
            );
            return Ok(State::default());
        }
        let content = utils::read(&self.path).await.pub_result(ErrorType::Store)?;
        let mut state: State = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse data file at {}", self.path.display()))
            .pub_result(ErrorType::Store)?;
        state.current_event = state.current_event.map(rebuild);
        state.events.rebuild_all();
        debug!(
            "Loaded {} events from {}",
            state.events.len(),
            self.path.display()
        );
        Ok(state)
    }

    /// Saves the state. The file is written next to its destination first and then moved into
    /// place, so an interrupted save leaves the previous file intact.
    pub async fn save(&self, state: &State) -> Result<()> {
        let json = serde_json::to_string_pretty(state)
            .context("Unable to serialize the ledger state")
            .pub_result(ErrorType::Store)?;
        if let Some(parent) = self.path.parent() {
            utils::make_dir(parent).await.pub_result(ErrorType::Store)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        utils::write(&tmp, json).await.pub_result(ErrorType::Store)?;
        utils::rename(&tmp, &self.path)
            .await
            .pub_result(ErrorType::Store)?;
        debug!("Saved {} events to {}", state.events.len(), self.path.display());
        Ok(())
    }
}
