//! Record domain model.
//!
//! # Responsibility
//! - Hold the name/phone/address tuple used both as data and as query template.
//! - Map logical fields to their storage columns.
//!
//! # Invariants
//! - `None` and `Some("")` are equivalent when a record is used as a query.
//! - `RecordField::column` is the only source of column names interpolated
//!   into SQL.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// One phonebook entry, or a partial template used to match entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub name: Option<String>,
    /// Digit stream, logically ten digits.
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl Record {
    /// Creates a fully populated record.
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            phone: Some(phone.into()),
            address: Some(address.into()),
        }
    }

    /// Creates an empty template that matches every row.
    pub fn query() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Returns the raw value stored for `field`.
    pub fn get(&self, field: RecordField) -> Option<&str> {
        match field {
            RecordField::Name => self.name.as_deref(),
            RecordField::Phone => self.phone.as_deref(),
            RecordField::Address => self.address.as_deref(),
        }
    }

    /// Returns the value for `field` only when it is present and non-empty.
    ///
    /// Query paths use this to decide whether a field constrains a match.
    pub fn query_value(&self, field: RecordField) -> Option<&str> {
        self.get(field).filter(|value| !value.is_empty())
    }

    /// Returns whether no field constrains a query built from this record.
    pub fn is_unconstrained(&self) -> bool {
        RecordField::ALL
            .iter()
            .all(|field| self.query_value(*field).is_none())
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.name.as_deref().unwrap_or(""),
            self.phone.as_deref().unwrap_or(""),
            self.address.as_deref().unwrap_or("")
        )
    }
}

/// Addressable record column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    Name,
    Phone,
    Address,
}

impl RecordField {
    /// All fields in storage column order.
    pub const ALL: [RecordField; 3] = [Self::Name, Self::Phone, Self::Address];

    /// Storage column backing this field.
    pub fn column(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Phone => "phone",
            Self::Address => "address",
        }
    }
}

impl Display for RecordField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for RecordField {
    type Err = UnknownFieldError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "phone" => Ok(Self::Phone),
            "address" => Ok(Self::Address),
            other => Err(UnknownFieldError(other.to_string())),
        }
    }
}

/// Field name outside `name|phone|address`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFieldError(pub String);

impl Display for UnknownFieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown record field `{}`; expected name|phone|address",
            self.0
        )
    }
}

impl Error for UnknownFieldError {}
