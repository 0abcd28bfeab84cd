//! SQLite node table.
//!
//! Schema:
//! - `<table>`: (id INTEGER PRIMARY KEY AUTOINCREMENT, label TEXT, parent
//!   INTEGER NULL, lft INTEGER, rgt INTEGER, depth INTEGER)
//!
//! `left` and `right` are SQL keywords, hence `lft` / `rgt`. AUTOINCREMENT
//! keeps ids of deleted rows from being handed out again.

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use crate::config::SqliteConfig;
use crate::error::StoreError;
use crate::node::{NewRow, Node, NodeId};
use crate::store::{Cmp, Column, Filter, IntervalStore, Update};

pub struct SqliteStore {
    conn: Connection,
    /// Quoted table identifier, ready for interpolation.
    table: String,
    in_transaction: bool,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("table", &self.table)
            .field("in_transaction", &self.in_transaction)
            .finish()
    }
}

impl SqliteStore {
    /// Opens (or creates) the database described by `config` and makes sure
    /// the node table exists.
    pub fn open(config: &SqliteConfig) -> Result<Self, StoreError> {
        let conn = match &config.path {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                let conn = Connection::open(path)?;
                let mode: String = conn.pragma_update_and_check(
                    None,
                    "journal_mode",
                    &config.journal_mode,
                    |row| row.get(0),
                )?;
                tracing::debug!(path = %path.display(), journal_mode = %mode, "opened sqlite store");
                conn.pragma_update(None, "synchronous", &config.synchronous)?;
                conn
            }
            None => Connection::open_in_memory()?,
        };
        Self::with_connection(conn, &config.table)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::open(&SqliteConfig::in_memory())
    }

    /// Wraps an existing connection, creating `table` if needed.
    pub fn with_connection(conn: Connection, table: &str) -> Result<Self, StoreError> {
        let table = quote_identifier(table);
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                label TEXT NOT NULL,
                parent INTEGER NULL,
                lft INTEGER NOT NULL,
                rgt INTEGER NOT NULL,
                depth INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS {lft_index} ON {table} (lft);
            CREATE INDEX IF NOT EXISTS {rgt_index} ON {table} (rgt);",
            lft_index = index_name(&table, "lft"),
            rgt_index = index_name(&table, "rgt"),
        ))?;
        Ok(Self {
            conn,
            table,
            in_transaction: false,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn index_name(quoted_table: &str, column: &str) -> String {
    let bare = quoted_table.trim_matches('"');
    quote_identifier(&format!("{bare}_{column}"))
}

fn column_sql(column: Column) -> &'static str {
    match column {
        Column::Id => "id",
        Column::Left => "lft",
        Column::Right => "rgt",
        Column::Depth => "depth",
    }
}

fn cmp_sql(cmp: Cmp) -> &'static str {
    match cmp {
        Cmp::Eq => "=",
        Cmp::Lt => "<",
        Cmp::Le => "<=",
        Cmp::Gt => ">",
        Cmp::Ge => ">=",
    }
}

/// Renders `filter` as a `WHERE` clause (empty for the match-all filter),
/// appending its bound values to `params`.
fn where_clause(filter: &Filter, params: &mut Vec<Value>) -> String {
    if filter.conditions().is_empty() {
        return String::new();
    }
    let parts: Vec<String> = filter
        .conditions()
        .iter()
        .map(|c| {
            params.push(Value::Integer(c.value));
            format!("{} {} ?", column_sql(c.column), cmp_sql(c.cmp))
        })
        .collect();
    format!(" WHERE {}", parts.join(" AND "))
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<Node> {
    Ok(Node {
        id: NodeId(row.get(0)?),
        label: row.get(1)?,
        parent: row.get::<_, Option<i64>>(2)?.map(NodeId),
        left: row.get(3)?,
        right: row.get(4)?,
        depth: row.get(5)?,
    })
}

impl IntervalStore for SqliteStore {
    fn insert(&mut self, row: NewRow) -> Result<NodeId, StoreError> {
        self.conn.execute(
            &format!(
                "INSERT INTO {} (label, parent, lft, rgt, depth) VALUES (?1, ?2, ?3, ?4, ?5)",
                self.table
            ),
            params![
                row.label,
                row.parent.map(NodeId::get),
                row.interval.left,
                row.interval.right,
                row.depth
            ],
        )?;
        Ok(NodeId(self.conn.last_insert_rowid()))
    }

    fn get(&self, id: NodeId) -> Result<Option<Node>, StoreError> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT id, label, parent, lft, rgt, depth FROM {} WHERE id = ?1",
                    self.table
                ),
                params![id.0],
                read_row,
            )
            .optional()?;
        Ok(row)
    }

    fn update(&mut self, update: Update, filter: &Filter) -> Result<usize, StoreError> {
        let mut values = Vec::new();
        let assignment = match update {
            Update::Add(column, delta) => {
                values.push(Value::Integer(delta));
                let col = column_sql(column);
                format!("{col} = {col} + ?")
            }
            Update::SetParent(parent) => {
                values.push(parent.map_or(Value::Null, |p| Value::Integer(p.0)));
                "parent = ?".to_string()
            }
            Update::SetLabel(label) => {
                values.push(Value::Text(label));
                "label = ?".to_string()
            }
        };
        let sql = format!(
            "UPDATE {} SET {assignment}{}",
            self.table,
            where_clause(filter, &mut values)
        );
        tracing::trace!(%sql, ?values, "update");
        Ok(self.conn.execute(&sql, params_from_iter(values))?)
    }

    fn delete(&mut self, filter: &Filter) -> Result<usize, StoreError> {
        let mut values = Vec::new();
        let sql = format!(
            "DELETE FROM {}{}",
            self.table,
            where_clause(filter, &mut values)
        );
        tracing::trace!(%sql, ?values, "delete");
        Ok(self.conn.execute(&sql, params_from_iter(values))?)
    }

    fn max_right(&self) -> Result<Option<i64>, StoreError> {
        let max = self.conn.query_row(
            &format!("SELECT MAX(rgt) FROM {}", self.table),
            [],
            |row| row.get::<_, Option<i64>>(0),
        )?;
        Ok(max)
    }

    fn select(&self, filter: &Filter) -> Result<Vec<Node>, StoreError> {
        let mut values = Vec::new();
        let sql = format!(
            "SELECT id, label, parent, lft, rgt, depth FROM {}{} ORDER BY lft",
            self.table,
            where_clause(filter, &mut values)
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values), read_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn begin(&mut self) -> Result<(), StoreError> {
        if self.in_transaction {
            return Err(StoreError::NestedTransaction);
        }
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        self.in_transaction = true;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        if !self.in_transaction {
            return Err(StoreError::NoTransaction);
        }
        self.conn.execute_batch("COMMIT")?;
        self.in_transaction = false;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        if !self.in_transaction {
            return Err(StoreError::NoTransaction);
        }
        self.in_transaction = false;
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Interval;

    #[test]
    fn where_clause_binds_in_order() {
        let mut values = Vec::new();
        let sql = where_clause(&Filter::strictly_within(Interval::new(2, 9)), &mut values);
        assert_eq!(sql, " WHERE lft > ? AND rgt < ?");
        assert_eq!(values, vec![Value::Integer(2), Value::Integer(9)]);
        assert_eq!(where_clause(&Filter::all(), &mut values), "");
    }

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_identifier("nodes"), "\"nodes\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
        assert_eq!(index_name("\"nodes\"", "lft"), "\"nodes_lft\"");
    }

    #[test]
    fn crud_roundtrip() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.max_right().unwrap(), None);
        let a = store.insert(NewRow::detached("a", 0)).unwrap();
        let b = store.insert(NewRow::detached("b", 2)).unwrap();
        assert_eq!(store.max_right().unwrap(), Some(3));

        store
            .update(Update::SetParent(Some(a)), &Filter::id(b))
            .unwrap();
        let row = store.get(b).unwrap().unwrap();
        assert_eq!(row.parent, Some(a));
        assert_eq!(row.interval(), Interval::new(2, 3));

        let shifted = store
            .update(
                Update::Add(Column::Right, 5),
                &Filter::all().and(Column::Right, Cmp::Ge, 1),
            )
            .unwrap();
        assert_eq!(shifted, 2);

        let labels: Vec<_> = store
            .select(&Filter::all())
            .unwrap()
            .into_iter()
            .map(|n| n.label)
            .collect();
        assert_eq!(labels, vec!["a", "b"]);

        assert_eq!(store.delete(&Filter::id(a)).unwrap(), 1);
        assert!(store.get(a).unwrap().is_none());
    }

    #[test]
    fn rollback_discards_writes() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.insert(NewRow::detached("a", 0)).unwrap();
        store.begin().unwrap();
        assert!(matches!(store.begin(), Err(StoreError::NestedTransaction)));
        store.delete(&Filter::all()).unwrap();
        store.rollback().unwrap();
        assert_eq!(store.select(&Filter::all()).unwrap().len(), 1);
        assert!(matches!(store.commit(), Err(StoreError::NoTransaction)));
    }

    #[test]
    fn file_store_persists_between_opens() {
        let dir = tempfile::tempdir().unwrap();
        let config = SqliteConfig::at(dir.path().join("nested/forest.db"));
        {
            let mut store = SqliteStore::open(&config).unwrap();
            store.insert(NewRow::detached("kept", 0)).unwrap();
        }
        let store = SqliteStore::open(&config).unwrap();
        let rows = store.select(&Filter::all()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, "kept");
    }
}
