//! Record store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/read/update/delete APIs over the `records` table.
//! - Translate partial `Record` templates into containment filters.
//!
//! # Invariants
//! - Inserts are unconditional; uniqueness is decided by `WriteAuthorizer`.
//! - Query fields that are absent or empty never constrain a match.
//! - Column names come from `RecordField::column`, values are always bound.
//! - Every statement commits on its own unless wrapped in `atomic`.

use crate::db::{DbError, RECORDS_TABLE};
use crate::model::record::{Record, RecordField};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const RECORD_SELECT_SQL: &str = "SELECT name, phone, address FROM records";

pub type RepoResult<T> = Result<T, RepoError>;

/// Record store error.
#[derive(Debug)]
pub enum RepoError {
    /// Connection or table access failed. Never retried.
    StorageUnavailable(DbError),
    /// A persisted column holds a value that is not representable as text.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StorageUnavailable(err) => write!(f, "record storage unavailable: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StorageUnavailable(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::StorageUnavailable(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::StorageUnavailable(DbError::Sqlite(value))
    }
}

/// Repository interface for record CRUD operations.
///
/// Write operations return the number of affected rows; `Ok` alone means the
/// statement executed, even when nothing matched.
pub trait RecordStore {
    /// Ensures the backing table exists. Idempotent.
    fn initialize(&self) -> RepoResult<()>;
    /// Appends `record` verbatim.
    fn insert(&self, record: &Record) -> RepoResult<()>;
    /// Returns rows whose columns contain every non-empty query field.
    fn find(&self, query: &Record) -> RepoResult<Vec<Record>>;
    fn find_all(&self) -> RepoResult<Vec<Record>>;
    fn count(&self) -> RepoResult<u64>;
    /// Removes rows matched with the same rules as `find`.
    fn delete(&self, query: &Record) -> RepoResult<usize>;
    /// Overwrites `field` on rows whose `field` column contains the query's
    /// value for it. Other query fields are ignored.
    ///
    /// An absent query value matches nothing; an empty one matches every row.
    fn update_field(
        &self,
        field: RecordField,
        query: &Record,
        updated: &Record,
    ) -> RepoResult<usize>;
    /// Overwrites all three columns on rows matched with the rules of `find`.
    fn update_all_fields(&self, query: &Record, updated: &Record) -> RepoResult<usize>;
    /// Returns whether some row equals `record` on every listed field.
    ///
    /// Uses SQL equality: an absent value never matches, an empty string
    /// matches other empty strings.
    fn exists_exact(&self, fields: &[RecordField], record: &Record) -> RepoResult<bool>;
    /// Runs `op` inside one write-locked transaction.
    ///
    /// Commits when `op` succeeds and rolls back when it fails.
    fn atomic<T>(&self, op: impl FnOnce(&Self) -> RepoResult<T>) -> RepoResult<T>
    where
        Self: Sized;
}

/// SQLite-backed record store borrowing the process connection.
pub struct SqliteRecordStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Creates a store and ensures its table exists.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let store = Self::new(conn);
        store.initialize()?;
        Ok(store)
    }
}

impl RecordStore for SqliteRecordStore<'_> {
    fn initialize(&self) -> RepoResult<()> {
        self.conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {RECORDS_TABLE} (
                name TEXT,
                phone TEXT,
                address TEXT
            );"
        ))?;
        Ok(())
    }

    fn insert(&self, record: &Record) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO records (name, phone, address) VALUES (?1, ?2, ?3);",
            params![
                record.name.as_deref(),
                record.phone.as_deref(),
                record.address.as_deref(),
            ],
        )?;
        debug!("event=record_insert module=repo status=ok");
        Ok(())
    }

    fn find(&self, query: &Record) -> RepoResult<Vec<Record>> {
        let mut bind_values = Vec::new();
        let filter = containment_filter(query, &RecordField::ALL, &mut bind_values);
        self.select(&format!("{RECORD_SELECT_SQL}{filter}"), bind_values)
    }

    fn find_all(&self) -> RepoResult<Vec<Record>> {
        self.select(RECORD_SELECT_SQL, Vec::new())
    }

    fn count(&self) -> RepoResult<u64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM records;", [], |row| row.get::<_, i64>(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    fn delete(&self, query: &Record) -> RepoResult<usize> {
        let mut bind_values = Vec::new();
        let filter = containment_filter(query, &RecordField::ALL, &mut bind_values);
        let changed = self.conn.execute(
            &format!("DELETE FROM records{filter};"),
            params_from_iter(bind_values),
        )?;
        debug!("event=record_delete module=repo status=ok affected={changed}");
        Ok(changed)
    }

    fn update_field(
        &self,
        field: RecordField,
        query: &Record,
        updated: &Record,
    ) -> RepoResult<usize> {
        // An absent match value is contained in no column.
        if query.get(field).is_none() {
            debug!("event=record_update module=repo status=ok field={field} affected=0 reason=absent_match");
            return Ok(0);
        }
        let mut bind_values = vec![text_value(updated.get(field))];
        let filter = containment_filter(query, &[field], &mut bind_values);
        let changed = self.conn.execute(
            &format!("UPDATE records SET {} = ?{filter};", field.column()),
            params_from_iter(bind_values),
        )?;
        debug!(
            "event=record_update module=repo status=ok field={} affected={}",
            field, changed
        );
        Ok(changed)
    }

    fn update_all_fields(&self, query: &Record, updated: &Record) -> RepoResult<usize> {
        let mut bind_values = RecordField::ALL
            .iter()
            .map(|field| text_value(updated.get(*field)))
            .collect::<Vec<_>>();
        let filter = containment_filter(query, &RecordField::ALL, &mut bind_values);
        let changed = self.conn.execute(
            &format!("UPDATE records SET name = ?, phone = ?, address = ?{filter};"),
            params_from_iter(bind_values),
        )?;
        debug!("event=record_update module=repo status=ok field=all affected={changed}");
        Ok(changed)
    }

    fn exists_exact(&self, fields: &[RecordField], record: &Record) -> RepoResult<bool> {
        let mut sql = String::from("SELECT EXISTS(SELECT 1 FROM records WHERE 1 = 1");
        let mut bind_values = Vec::with_capacity(fields.len());
        for field in fields {
            sql.push_str(&format!(" AND {} = ?", field.column()));
            bind_values.push(text_value(record.get(*field)));
        }
        sql.push_str(");");

        let exists = self
            .conn
            .query_row(&sql, params_from_iter(bind_values), |row| {
                row.get::<_, i64>(0)
            })?;
        Ok(exists == 1)
    }

    fn atomic<T>(&self, op: impl FnOnce(&Self) -> RepoResult<T>) -> RepoResult<T> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        // Dropping `tx` on the error path rolls the transaction back.
        let outcome = op(self)?;
        tx.commit()?;
        Ok(outcome)
    }
}

impl SqliteRecordStore<'_> {
    fn select(&self, sql: &str, bind_values: Vec<Value>) -> RepoResult<Vec<Record>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }

        Ok(records)
    }
}

/// Builds a ` WHERE ...` clause requiring each non-empty query field to be
/// contained in its column, appending bind values in placeholder order.
fn containment_filter(
    query: &Record,
    fields: &[RecordField],
    bind_values: &mut Vec<Value>,
) -> String {
    let mut sql = String::from(" WHERE 1 = 1");
    for field in fields {
        if let Some(value) = query.query_value(*field) {
            sql.push_str(&format!(" AND instr({}, ?) > 0", field.column()));
            bind_values.push(Value::Text(value.to_string()));
        }
    }
    sql
}

fn text_value(value: Option<&str>) -> Value {
    match value {
        Some(text) => Value::Text(text.to_string()),
        None => Value::Null,
    }
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<Record> {
    Ok(Record {
        name: column_text(row, RecordField::Name)?,
        phone: column_text(row, RecordField::Phone)?,
        address: column_text(row, RecordField::Address)?,
    })
}

// Columns are untyped in SQLite; integer phones written by older tools are
// read back as their decimal text.
fn column_text(row: &Row<'_>, field: RecordField) -> RepoResult<Option<String>> {
    match row.get::<_, Value>(field.column())? {
        Value::Null => Ok(None),
        Value::Text(text) => Ok(Some(text)),
        Value::Integer(number) => Ok(Some(number.to_string())),
        Value::Real(_) | Value::Blob(_) => Err(RepoError::InvalidData(format!(
            "non-text value in records.{}",
            field.column()
        ))),
    }
}
