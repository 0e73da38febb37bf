//! Account directory: customer ids, display names, and the JSON loader.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ReportError;
use crate::query;
use crate::source::RecordSource;
use crate::types::CustomerId;

/// One reportable account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Customer id, digits only.
    pub id: CustomerId,
    /// Display name used in menus and progress output.
    pub name: String,
}

impl Account {
    /// Create an account, normalizing the id to digits.
    ///
    /// Ids are often pasted with the dashed `123-456-7890` formatting the
    /// Ads console displays; only the digits matter.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: normalize_customer_id(&id.into()),
            name: name.into(),
        }
    }
}

/// Whether a run covers one selected account or the whole directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccountScope {
    /// One account, chosen by id or interactively.
    Single,
    /// Every account in the directory, fanned out in parallel.
    All,
}

impl AccountScope {
    /// Canonical scope keyword.
    pub fn label(self) -> &'static str {
        match self {
            AccountScope::Single => "single",
            AccountScope::All => "all",
        }
    }

    /// Resolve a scope keyword or alias.
    pub fn from_alias(alias: &str) -> Option<AccountScope> {
        match alias.trim().to_ascii_lowercase().as_str() {
            "single" | "one" => Some(AccountScope::Single),
            "all" | "*" => Some(AccountScope::All),
            _ => None,
        }
    }
}

/// Digits of `raw`, in order; everything else is dropped.
pub fn normalize_customer_id(raw: &str) -> CustomerId {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Load the account directory from a JSON file.
///
/// The file maps an arbitrary reference key to a `[customer id, name]` pair:
///
/// ```json
/// {
///     "EXAMPLE1": ["1234567890", "Example Corp 1 / example.com"],
///     "EXAMPLE2": ["0987654321", "Example Corp 2 / example2.com"]
/// }
/// ```
///
/// Accounts come back in file order with normalized ids.
pub fn load_directory(path: &Path) -> Result<Vec<Account>, ReportError> {
    let file = File::open(path)?;
    let entries: IndexMap<String, (String, String)> = serde_json::from_reader(BufReader::new(file))
        .map_err(|error| {
            ReportError::Configuration(format!(
                "account directory {}: {error}",
                path.display()
            ))
        })?;
    if entries.is_empty() {
        return Err(ReportError::Configuration(format!(
            "account directory {} lists no accounts",
            path.display()
        )));
    }
    let accounts: Vec<Account> = entries
        .into_iter()
        .map(|(_, (id, name))| Account::new(id, name))
        .collect();
    debug!(path = %path.display(), accounts = accounts.len(), "loaded account directory");
    Ok(accounts)
}

/// Find an account whose id matches `raw` after normalization.
pub fn find_by_id<'a>(accounts: &'a [Account], raw: &str) -> Option<&'a Account> {
    let wanted = normalize_customer_id(raw);
    accounts.iter().find(|account| account.id == wanted)
}

/// Fetch the reportable accounts under a manager account.
///
/// Issues the account listing query against `manager_id` and keeps only
/// non-manager clients, in the order the listing returns them. This is the
/// live alternative to [`load_directory`] for setups without a curated file.
pub fn fetch_directory(
    source: &dyn RecordSource,
    manager_id: &str,
) -> Result<Vec<Account>, ReportError> {
    let rows = source.fetch(manager_id, &query::account_listing())?;
    let accounts: Vec<Account> = rows
        .iter()
        .filter(|raw| !raw.boolean_or_false("customer_client.manager"))
        .map(|raw| {
            Account::new(
                raw.integer_or_zero("customer_client.id").to_string(),
                raw.text_or_empty("customer_client.descriptive_name"),
            )
        })
        .collect();
    debug!(manager_id, accounts = accounts.len(), "fetched account listing");
    Ok(accounts)
}
