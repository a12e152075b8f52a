//! Phonebook use-case service.
//!
//! # Responsibility
//! - Admit new records under a uniqueness policy without a check/insert race.
//! - Provide query, update, delete and export entry points for callers.
//!
//! # Invariants
//! - The policy check and the insert run in one write-locked transaction.
//! - Policy and format arrive as plain values; the service holds no settings.

use crate::auth::{UniquenessPolicy, WriteAuthorizer};
use crate::export::{export_records, ExportError, SerialFormat};
use crate::model::record::{Record, RecordField};
use crate::repo::record_repo::{RecordStore, RepoError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for phonebook use-cases.
#[derive(Debug)]
pub enum ServiceError {
    Repo(RepoError),
    Export(ExportError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Export(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Export(err) => Some(err),
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<ExportError> for ServiceError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

/// Use-case service over a record store.
pub struct PhonebookService<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> PhonebookService<S> {
    /// Creates a service and ensures the store's table exists.
    pub fn new(store: S) -> ServiceResult<Self> {
        store.initialize()?;
        Ok(Self { store })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Inserts `record` if `policy` admits it.
    ///
    /// Returns `false`, without writing, when an existing row conflicts.
    pub fn add_record(&self, record: &Record, policy: UniquenessPolicy) -> ServiceResult<bool> {
        let admitted = self.store.atomic(|store| {
            if !WriteAuthorizer::new(store).can_insert(record, policy)? {
                return Ok(false);
            }
            store.insert(record)?;
            Ok(true)
        })?;

        info!(
            "event=record_add module=service status=ok policy={} admitted={}",
            policy, admitted
        );
        Ok(admitted)
    }

    pub fn find(&self, query: &Record) -> ServiceResult<Vec<Record>> {
        Ok(self.store.find(query)?)
    }

    pub fn list(&self) -> ServiceResult<Vec<Record>> {
        Ok(self.store.find_all()?)
    }

    /// Deletes rows matching `query`; returns how many were removed.
    pub fn remove(&self, query: &Record) -> ServiceResult<usize> {
        let removed = self.store.delete(query)?;
        info!("event=record_remove module=service status=ok removed={removed}");
        Ok(removed)
    }

    pub fn update_field(
        &self,
        field: RecordField,
        query: &Record,
        updated: &Record,
    ) -> ServiceResult<usize> {
        Ok(self.store.update_field(field, query, updated)?)
    }

    pub fn update_all_fields(&self, query: &Record, updated: &Record) -> ServiceResult<usize> {
        Ok(self.store.update_all_fields(query, updated)?)
    }

    /// Exports every record as `format` into `destination`.
    pub fn export(
        &self,
        format: SerialFormat,
        destination: impl AsRef<Path>,
    ) -> ServiceResult<usize> {
        Ok(export_records(&self.store, format, destination)?)
    }
}
