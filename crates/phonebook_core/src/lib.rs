//! Core domain logic for the phonebook.
//! This crate is the single source of truth for storage, write authorization
//! and export behavior.

pub mod auth;
pub mod config;
pub mod db;
pub mod export;
pub mod logging;
pub mod model;
pub mod phone;
pub mod repo;
pub mod service;

pub use auth::{UniquenessPolicy, UnsupportedPolicyError, WriteAuthorizer};
pub use config::{ConfigError, ConfigResult, Settings};
pub use export::{
    export_records, EncodedDocument, ExportError, ExportResult, ExportRow, Exporter, SerialFormat,
    UnsupportedFormatError,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::record::{Record, RecordField, UnknownFieldError};
pub use phone::{digit_stream_to_phone, phone_to_digit_stream, PhoneFormatError};
pub use repo::record_repo::{RecordStore, RepoError, RepoResult, SqliteRecordStore};
pub use service::phonebook_service::{PhonebookService, ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
