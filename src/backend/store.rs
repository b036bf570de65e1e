//! Document decoding helpers.
//!
//! Documents are stored one row per document: scalar fields as columns,
//! embedded lists as JSON text. Ids are stored as hyphenated strings so they
//! can be compared inside `json_each` queries. These helpers turn a
//! `SqliteRow` back into model values, reporting bad column data as
//! `sqlx::Error::ColumnDecode` like any other decode failure.
//!
//! Embedded lists are never written back whole after a read. [`EmbeddedList`]
//! appends and removes elements with a single `UPDATE` built on SQLite's JSON
//! functions, so concurrent appends to the same document all land, in the
//! order the writes commit.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::types::Json;
use sqlx::{Executor, Row, Sqlite};
use std::str::FromStr;
use uuid::Uuid;

fn decode_error(column: &str, source: impl std::error::Error + Send + Sync + 'static) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(source),
    }
}

/// Read a UUID stored as text
pub fn id(row: &SqliteRow, column: &str) -> Result<Uuid, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    Uuid::parse_str(&raw).map_err(|e| decode_error(column, e))
}

/// Read a nullable UUID column
pub fn optional_id(row: &SqliteRow, column: &str) -> Result<Option<Uuid>, sqlx::Error> {
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|s| Uuid::parse_str(&s).map_err(|e| decode_error(column, e)))
        .transpose()
}

/// Read a text column through `FromStr` (roles, ticket enums)
pub fn parsed<T>(row: &SqliteRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.try_get(column)?;
    raw.parse::<T>().map_err(|e| decode_error(column, e))
}

/// Read an embedded JSON document
pub fn document<T>(row: &SqliteRow, column: &str) -> Result<T, sqlx::Error>
where
    T: DeserializeOwned + Send + Unpin + 'static,
{
    let Json(value) = row.try_get::<Json<T>, _>(column)?;
    Ok(value)
}

/// How the elements of an embedded list are identified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    /// The element is a bare id string
    Id,
    /// The element is an object identified by one of its fields
    Field(&'static str),
}

impl Element {
    /// SQL expression for the identity of a `json_each` row
    fn identity(self) -> String {
        match self {
            Element::Id => "value".to_string(),
            Element::Field(name) => format!("json_extract(value, '$.{name}')"),
        }
    }

    /// SQL expression that re-embeds a kept `json_each` row
    fn kept(self) -> &'static str {
        match self {
            Element::Id => "value",
            Element::Field(_) => "json(value)",
        }
    }
}

/// A JSON array column, addressed by the column that identifies its row
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedList {
    pub table: &'static str,
    pub column: &'static str,
    /// Row key column, usually `id`
    pub owner: &'static str,
    pub element: Element,
}

impl EmbeddedList {
    /// Append `item` to the list of row `owner_id`
    ///
    /// Returns the list as stored after the append, or `None` when there is
    /// no such row.
    pub async fn push<'e, E, T>(
        self,
        executor: E,
        owner_id: Uuid,
        item: &T,
    ) -> Result<Option<Vec<T>>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
        T: Serialize + DeserializeOwned + Send + Unpin + 'static,
    {
        let sql = format!(
            "UPDATE {table} SET {column} = json_insert({column}, '$[#]', json(?1)), updated_at = ?2 \
             WHERE {owner} = ?3 RETURNING {column}",
            table = self.table,
            column = self.column,
            owner = self.owner,
        );
        sqlx::query(&sql)
            .bind(encode(item)?)
            .bind(Utc::now())
            .bind(owner_id.to_string())
            .fetch_optional(executor)
            .await?
            .map(|row| document(&row, self.column))
            .transpose()
    }

    /// Append `item` unless an element identified by `key` is already listed
    ///
    /// `None` means the row is missing or already lists `key`.
    pub async fn push_unique<'e, E, T>(
        self,
        executor: E,
        owner_id: Uuid,
        key: Uuid,
        item: &T,
    ) -> Result<Option<Vec<T>>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
        T: Serialize + DeserializeOwned + Send + Unpin + 'static,
    {
        let sql = format!(
            "UPDATE {table} SET {column} = json_insert({column}, '$[#]', json(?1)), updated_at = ?2 \
             WHERE {owner} = ?3 \
               AND NOT EXISTS (SELECT 1 FROM json_each({table}.{column}) WHERE {identity} = ?4) \
             RETURNING {column}",
            table = self.table,
            column = self.column,
            owner = self.owner,
            identity = self.element.identity(),
        );
        sqlx::query(&sql)
            .bind(encode(item)?)
            .bind(Utc::now())
            .bind(owner_id.to_string())
            .bind(key.to_string())
            .fetch_optional(executor)
            .await?
            .map(|row| document(&row, self.column))
            .transpose()
    }

    /// Remove the elements identified by `key` from one row's list
    ///
    /// `None` means the row is missing or does not list `key`.
    pub async fn remove<'e, E, T>(
        self,
        executor: E,
        owner_id: Uuid,
        key: Uuid,
    ) -> Result<Option<Vec<T>>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
        T: DeserializeOwned + Send + Unpin + 'static,
    {
        let sql = format!(
            "UPDATE {table} SET {column} = {remaining}, updated_at = ?2 \
             WHERE {owner} = ?3 AND {listed} RETURNING {column}",
            table = self.table,
            column = self.column,
            owner = self.owner,
            remaining = self.remaining(),
            listed = self.listed(),
        );
        sqlx::query(&sql)
            .bind(key.to_string())
            .bind(Utc::now())
            .bind(owner_id.to_string())
            .fetch_optional(executor)
            .await?
            .map(|row| document(&row, self.column))
            .transpose()
    }

    /// Remove `key` from the list of every row that has it
    ///
    /// `scope` narrows the rows to those whose column equals the given id.
    /// Returns the number of rows changed.
    pub async fn remove_from_all<'e, E>(
        self,
        executor: E,
        key: Uuid,
        scope: Option<(&'static str, Uuid)>,
    ) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let filter = scope
            .map(|(column, _)| format!(" AND {column} = ?3"))
            .unwrap_or_default();
        let sql = format!(
            "UPDATE {table} SET {column} = {remaining}, updated_at = ?2 WHERE {listed}{filter}",
            table = self.table,
            column = self.column,
            remaining = self.remaining(),
            listed = self.listed(),
        );
        let mut query = sqlx::query(&sql).bind(key.to_string()).bind(Utc::now());
        if let Some((_, scope_id)) = scope {
            query = query.bind(scope_id.to_string());
        }
        Ok(query.execute(executor).await?.rows_affected())
    }

    /// Replace the whole list; false when there is no such row
    pub async fn replace<'e, E, T>(
        self,
        executor: E,
        owner_id: Uuid,
        items: &[T],
    ) -> Result<bool, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
        T: Serialize,
    {
        let sql = format!(
            "UPDATE {table} SET {column} = json(?1), updated_at = ?2 WHERE {owner} = ?3",
            table = self.table,
            column = self.column,
            owner = self.owner,
        );
        let result = sqlx::query(&sql)
            .bind(encode(&items)?)
            .bind(Utc::now())
            .bind(owner_id.to_string())
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// The list without the elements identified by `?1`
    fn remaining(&self) -> String {
        format!(
            "(SELECT json_group_array({kept}) FROM json_each({table}.{column}) WHERE {identity} != ?1)",
            kept = self.element.kept(),
            table = self.table,
            column = self.column,
            identity = self.element.identity(),
        )
    }

    /// True when the list has an element identified by `?1`
    fn listed(&self) -> String {
        format!(
            "EXISTS (SELECT 1 FROM json_each({table}.{column}) WHERE {identity} = ?1)",
            table = self.table,
            column = self.column,
            identity = self.element.identity(),
        )
    }
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, sqlx::Error> {
    serde_json::to_string(value).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}
