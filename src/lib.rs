//! Event-scoped expense tracking.
//!
//! An `Event` holds a date-ordered list of `Transaction`s together with a running balance on
//! each transaction and totals of what came in and what went out. The functions in [`ledger`]
//! keep those derived values correct as transactions are inserted, updated and deleted.

pub mod args;
pub mod commands;
mod config;
mod error;
mod events;
pub mod ledger;
pub mod model;
mod store;
mod utils;


pub use config::Config;
pub use error::{Error, ErrorType, Result};
pub use events::{EventUpdate, Events};
pub use ledger::Ledger;
pub use store::{State, Store};
pub use utils::generate_id;
