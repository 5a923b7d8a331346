//! These structs provide the CLI interface for the ledger CLI.

use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// ledger: A command-line tool for tracking the money spent and received during events.
///
/// An event is something like a trip or a wedding. Each event holds a list of transactions,
/// kept in date order, along with a running balance and totals of what came in and what went
/// out. Items, such as gifts, can be recorded with what they are worth without affecting the
/// balance.
///
/// Create an event with `ledger event create`. It becomes the current event, and the `txn`
/// subcommands add, change and remove transactions in it.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory, an initial configuration file and an empty data file.
    ///
    /// Decide what directory you want to store data in and pass this as --ledger-home. By
    /// default, it will be $HOME/ledger.
    Init,
    /// Create, list, show, select, update or delete events.
    Event(EventArgs),
    /// Add, update or delete transactions in the current event.
    Txn(TxnArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where ledger data and configuration is held. Defaults to ~/ledger
    #[arg(long, env = "LEDGER_HOME", default_value_t = default_ledger_home())]
    ledger_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, ledger_home: PathBuf) -> Self {
        Self {
            log_level,
            ledger_home: ledger_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn ledger_home(&self) -> &DisplayPath {
        &self.ledger_home
    }
}

/// (Not shown): Args for the `ledger event` command.
#[derive(Debug, Parser, Clone)]
pub struct EventArgs {
    #[command(subcommand)]
    command: EventCommand,
}

impl EventArgs {
    pub fn new(command: EventCommand) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &EventCommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum EventCommand {
    /// Create a new event and make it the current event.
    Create(CreateEventArgs),
    /// List all events with their totals.
    List,
    /// Show an event and its transactions, most recent first. Defaults to the current event.
    Show(ShowEventArgs),
    /// Make an event the current event.
    Select(IdArgs),
    /// Delete an event and all of its transactions.
    Delete(IdArgs),
    /// Change the title, dates or open flag of an event.
    Update(UpdateEventArgs),
}

/// (Not shown): Args for the `ledger event create` command.
#[derive(Debug, Parser, Clone)]
pub struct CreateEventArgs {
    /// The name of the event, e.g. "Goa Trip".
    #[arg(long)]
    title: String,

    /// The first day of the event, e.g. 2025-07-01.
    #[arg(long)]
    start_date: String,

    /// The last day of the event. Providing it makes this a multi-day event.
    #[arg(long)]
    end_date: Option<String>,

    /// Create the event closed instead of open.
    #[arg(long)]
    closed: bool,
}

impl CreateEventArgs {
    pub fn new(
        title: impl Into<String>,
        start_date: impl Into<String>,
        end_date: Option<String>,
        closed: bool,
    ) -> Self {
        Self {
            title: title.into(),
            start_date: start_date.into(),
            end_date,
            closed,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn start_date(&self) -> &str {
        &self.start_date
    }

    pub fn end_date(&self) -> Option<&str> {
        self.end_date.as_deref()
    }

    pub fn closed(&self) -> bool {
        self.closed
    }
}

/// (Not shown): Args for the `ledger event show` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct ShowEventArgs {
    /// The event to show. Defaults to the current event.
    id: Option<String>,
}

impl ShowEventArgs {
    pub fn new(id: Option<String>) -> Self {
        Self { id }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// (Not shown): Args for commands that act on a single event or transaction.
#[derive(Debug, Parser, Clone)]
pub struct IdArgs {
    /// The ID of the event or transaction.
    id: String,
}

impl IdArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// (Not shown): Args for the `ledger event update` command.
#[derive(Debug, Parser, Clone)]
pub struct UpdateEventArgs {
    /// The ID of the event to update.
    id: String,

    /// A new title.
    #[arg(long)]
    title: Option<String>,

    /// A new first day.
    #[arg(long)]
    start_date: Option<String>,

    /// A new last day. This makes the event a multi-day event.
    #[arg(long, conflicts_with = "single_day")]
    end_date: Option<String>,

    /// Make the event a single-day event, removing its end date.
    #[arg(long)]
    single_day: bool,

    /// Open or close the event.
    #[arg(long)]
    open: Option<bool>,
}

impl UpdateEventArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            start_date: None,
            end_date: None,
            single_day: false,
            open: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_start_date(mut self, start_date: impl Into<String>) -> Self {
        self.start_date = Some(start_date.into());
        self
    }

    pub fn with_end_date(mut self, end_date: impl Into<String>) -> Self {
        self.end_date = Some(end_date.into());
        self
    }

    pub fn with_single_day(mut self) -> Self {
        self.single_day = true;
        self
    }

    pub fn with_open(mut self, open: bool) -> Self {
        self.open = Some(open);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn start_date(&self) -> Option<&str> {
        self.start_date.as_deref()
    }

    pub fn end_date(&self) -> Option<&str> {
        self.end_date.as_deref()
    }

    pub fn single_day(&self) -> bool {
        self.single_day
    }

    pub fn open(&self) -> Option<bool> {
        self.open
    }
}

/// (Not shown): Args for the `ledger txn` command.
#[derive(Debug, Parser, Clone)]
pub struct TxnArgs {
    #[command(subcommand)]
    command: TxnCommand,
}

impl TxnArgs {
    pub fn new(command: TxnCommand) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &TxnCommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum TxnCommand {
    /// Add a transaction to the current event.
    Add(AddTxnArgs),
    /// Change a transaction in the current event. Fields you leave out keep their values.
    Update(UpdateTxnArgs),
    /// Delete a transaction from the current event.
    Delete(IdArgs),
}

/// The kind of transaction, as typed on the command line. It is validated along with the other
/// fields, so any string is accepted here.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct TxnKind(String);

impl FromStr for TxnKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl Display for TxnKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TxnKind {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Transaction fields shared by `txn add` and `txn update`.
#[derive(Debug, Parser, Clone, Default)]
pub struct TxnFields {
    /// The amount of money, e.g. 1250.50. Required for incoming and outgoing transactions.
    #[arg(long)]
    amount: Option<String>,

    /// When the transaction happened, e.g. "2025-07-01 18:30". Defaults to now for new
    /// transactions.
    #[arg(long)]
    date: Option<String>,

    /// A free-form note.
    #[arg(long)]
    description: Option<String>,

    /// What an item is worth. Required for items.
    #[arg(long)]
    worth: Option<String>,

    /// The name of an item. Required for items.
    #[arg(long)]
    item_name: Option<String>,
}

impl TxnFields {
    pub fn with_amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_worth(mut self, worth: impl Into<String>) -> Self {
        self.worth = Some(worth.into());
        self
    }

    pub fn with_item_name(mut self, item_name: impl Into<String>) -> Self {
        self.item_name = Some(item_name.into());
        self
    }

    pub fn amount(&self) -> Option<&str> {
        self.amount.as_deref()
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn worth(&self) -> Option<&str> {
        self.worth.as_deref()
    }

    pub fn item_name(&self) -> Option<&str> {
        self.item_name.as_deref()
    }
}

/// (Not shown): Args for the `ledger txn add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddTxnArgs {
    /// One of: incoming, outgoing, item
    #[arg(long = "type")]
    kind: TxnKind,

    #[clap(flatten)]
    fields: TxnFields,
}

impl AddTxnArgs {
    pub fn new(kind: impl Into<String>, fields: TxnFields) -> Self {
        Self {
            kind: TxnKind(kind.into()),
            fields,
        }
    }

    pub fn kind(&self) -> &TxnKind {
        &self.kind
    }

    pub fn fields(&self) -> &TxnFields {
        &self.fields
    }
}

/// (Not shown): Args for the `ledger txn update` command.
#[derive(Debug, Parser, Clone)]
pub struct UpdateTxnArgs {
    /// The ID of the transaction to update.
    id: String,

    /// One of: incoming, outgoing, item
    #[arg(long = "type")]
    kind: Option<TxnKind>,

    #[clap(flatten)]
    fields: TxnFields,
}

impl UpdateTxnArgs {
    pub fn new(id: impl Into<String>, kind: Option<String>, fields: TxnFields) -> Self {
        Self {
            id: id.into(),
            kind: kind.map(TxnKind),
            fields,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> Option<&TxnKind> {
        self.kind.as_ref()
    }

    pub fn fields(&self) -> &TxnFields {
        &self.fields
    }
}

fn default_ledger_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("ledger"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --ledger-home or LEDGER_HOME instead of relying on the default \
                ledger home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("ledger")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
