//! OS keyring wrapper: `Entry::new(service, account)` construction and
//! a "map every `keyring::Error` to `AppError::other`" policy. Holds a
//! single plaintext connection string — no encryption envelope needed.

use keyring::Entry;

use crate::error::{AppError, AppResult};

const KEYRING_SERVICE: &str = "daylit";
const KEYRING_ACCOUNT: &str = "connection-string";

fn entry() -> AppResult<Entry> {
    Entry::new(KEYRING_SERVICE, KEYRING_ACCOUNT)
        .map_err(|err| AppError::other(format!("failed to open OS keyring entry: {err}")))
}

/// Stores `connection_string`, overwriting any existing value.
pub fn set(connection_string: &str) -> AppResult<()> {
    entry()?
        .set_password(connection_string)
        .map_err(|err| AppError::other(format!("failed to write to OS keyring: {err}")))
}

/// Returns the stored connection string, or `None` if nothing is set.
pub fn get() -> AppResult<Option<String>> {
    match entry()?.get_password() {
        Ok(value) => Ok(Some(value)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(err) => Err(AppError::other(format!(
            "failed to read OS keyring: {err}"
        ))),
    }
}

/// Removes the stored connection string. A no-op if nothing is stored.
pub fn delete() -> AppResult<()> {
    match entry()?.delete_password() {
        Ok(()) => Ok(()),
        Err(keyring::Error::NoEntry) => Ok(()),
        Err(err) => Err(AppError::other(format!(
            "failed to delete from OS keyring: {err}"
        ))),
    }
}

/// Whether a connection string is currently stored.
pub fn status() -> AppResult<bool> {
    Ok(get()?.is_some())
}
