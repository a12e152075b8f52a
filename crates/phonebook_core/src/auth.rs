//! Write authorization for new records.
//!
//! # Responsibility
//! - Declare the fixed set of uniqueness policies.
//! - Decide whether a candidate record may be inserted under a policy.
//!
//! # Invariants
//! - Authorization never writes; it only probes the store.
//! - Probes use exact equality, unlike read/update/delete containment.
//! - A check is only meaningful when followed by an insert inside the same
//!   `RecordStore::atomic` scope; see `PhonebookService::add_record`.

use crate::model::record::{Record, RecordField};
use crate::repo::record_repo::{RecordStore, RepoResult};
use log::debug;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Rule deciding which fields must be unique before an insert is admitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum UniquenessPolicy {
    NoRestriction,
    UniqueName,
    #[default]
    UniquePhone,
    UniqueAddress,
    /// Rejects only candidates equal to an existing row on all three fields.
    UniqueAll,
}

impl UniquenessPolicy {
    pub const ALL: [UniquenessPolicy; 5] = [
        Self::NoRestriction,
        Self::UniqueName,
        Self::UniquePhone,
        Self::UniqueAddress,
        Self::UniqueAll,
    ];

    /// Stable configuration name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoRestriction => "none",
            Self::UniqueName => "name",
            Self::UniquePhone => "phone",
            Self::UniqueAddress => "address",
            Self::UniqueAll => "all",
        }
    }

    /// Legacy numeric code used by older configuration files.
    pub fn code(self) -> u8 {
        match self {
            Self::NoRestriction => 1,
            Self::UniqueName => 2,
            Self::UniquePhone => 3,
            Self::UniqueAddress => 4,
            Self::UniqueAll => 5,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|policy| policy.code() == code)
    }

    /// Fields compared for equality; empty for `NoRestriction`.
    pub fn fields(self) -> &'static [RecordField] {
        match self {
            Self::NoRestriction => &[],
            Self::UniqueName => &[RecordField::Name],
            Self::UniquePhone => &[RecordField::Phone],
            Self::UniqueAddress => &[RecordField::Address],
            Self::UniqueAll => &RecordField::ALL,
        }
    }
}

impl Display for UniquenessPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UniquenessPolicy {
    type Err = UnsupportedPolicyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        if let Ok(code) = normalized.parse::<u8>() {
            return Self::from_code(code).ok_or(UnsupportedPolicyError(normalized));
        }
        Self::ALL
            .into_iter()
            .find(|policy| policy.as_str() == normalized)
            .ok_or(UnsupportedPolicyError(normalized))
    }
}

impl TryFrom<String> for UniquenessPolicy {
    type Error = UnsupportedPolicyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<UniquenessPolicy> for String {
    fn from(value: UniquenessPolicy) -> Self {
        value.as_str().to_string()
    }
}

/// Policy value outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedPolicyError(pub String);

impl Display for UnsupportedPolicyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unsupported write auth rule `{}`; expected none|name|phone|address|all or 1..5",
            self.0
        )
    }
}

impl Error for UnsupportedPolicyError {}

/// Evaluates uniqueness policies against a record store.
pub struct WriteAuthorizer<'s, S: RecordStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: RecordStore + ?Sized> WriteAuthorizer<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Returns whether `record` may be inserted under `policy`.
    ///
    /// Field values are compared literally: callers must supply meaningful
    /// values for the fields a policy constrains.
    pub fn can_insert(&self, record: &Record, policy: UniquenessPolicy) -> RepoResult<bool> {
        let fields = policy.fields();
        let admitted = fields.is_empty() || !self.store.exists_exact(fields, record)?;
        debug!(
            "event=write_auth module=auth status=ok policy={} admitted={}",
            policy, admitted
        );
        Ok(admitted)
    }
}
