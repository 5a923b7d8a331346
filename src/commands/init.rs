use crate::commands::Out;
use crate::{Config, Result};
use std::path::Path;

/// Creates the ledger home directory with an initial `config.json` and an empty data file.
///
/// # Errors
/// - Returns an error if the directory was already initialized or any file operations fail.
pub async fn init(ledger_home: &Path) -> Result<Out<()>> {
    let config = Config::create(ledger_home).await?;
    Ok(format!(
        "Successfully created the ledger directory at {}",
        config.root().display()
    )
    .into())
}
