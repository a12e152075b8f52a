//! SQLite storage bootstrap.
//!
//! # Responsibility
//! - Open and configure the single SQLite connection used by core.
//! - Name the on-disk database file inside a data directory.
//!
//! # Invariants
//! - One connection is held per process; it is owned by the caller and
//!   borrowed by stores for their lifetime.
//! - Table creation belongs to the record store, not to connection bootstrap.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

mod open;

pub use open::{open_db, open_db_in_memory};

/// Database file name inside the configured data directory.
pub const DB_FILE_NAME: &str = "phonebook.db";

/// Single table holding every record.
pub const RECORDS_TABLE: &str = "records";

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Returns the database path for a data directory.
pub fn db_path_in(data_dir: impl AsRef<Path>) -> PathBuf {
    data_dir.as_ref().join(DB_FILE_NAME)
}
