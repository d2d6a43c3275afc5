//! Process exit codes.
//!
//! Store failures use [`StoreError::exit_code`]; the values below cover what
//! the CLI decides on its own.

use kalorik_store::StoreError;

pub const SUCCESS: i32 = 0;
pub const INPUT_ERROR: i32 = 1; // Unreadable local file or bad argument
pub const ACCESS_DENIED: i32 = 4; // Reviewer passphrase missing or wrong

/// Exit code for a failed command.
pub fn for_error(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<StoreError>() {
        Some(store_err) => store_err.exit_code(),
        None => INPUT_ERROR,
    }
}
