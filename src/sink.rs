// 🗄️ Tabular Sink - flat rows into the local analytical database
//
// Each non-empty table is replaced (drop + create + insert, one SQL
// transaction per table). Empty or non-list inputs are skipped with a
// diagnostic, never an error. JSON nulls stay SQL NULL.

use crate::crm::FlatRecord;
use anyhow::{bail, Context, Result};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadSummary {
    /// (table, rows written)
    pub written: Vec<(String, usize)>,
    /// (table, reason)
    pub skipped: Vec<(String, String)>,
}

impl LoadSummary {
    pub fn rows_written(&self) -> usize {
        self.written.iter().map(|(_, rows)| rows).sum()
    }
}

/// Open (or create) the database file with WAL journaling
pub fn open_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    Ok(conn)
}

/// Plain SQL identifier: letter or underscore, then alphanumerics/underscores
pub fn is_valid_table_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => n.as_f64().map(SqlValue::Real).unwrap_or(SqlValue::Null),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        nested => SqlValue::Text(nested.to_string()),
    }
}

/// Union of all row keys, in first-seen order
fn columns_of(rows: &[FlatRecord]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

/// Replace `table` with `rows`
pub fn replace_table(conn: &mut Connection, table: &str, rows: &[FlatRecord]) -> Result<usize> {
    if !is_valid_table_name(table) {
        bail!("Invalid table name: {:?}", table);
    }

    let columns = columns_of(rows);
    let table_sql = quote_identifier(table);
    let column_sql: Vec<String> = columns.iter().map(|c| quote_identifier(c)).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();

    let tx = conn.transaction()?;
    tx.execute(&format!("DROP TABLE IF EXISTS {}", table_sql), [])?;
    tx.execute(
        &format!("CREATE TABLE {} ({})", table_sql, column_sql.join(", ")),
        [],
    )
    .with_context(|| format!("Failed to create table {}", table))?;

    {
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table_sql,
            column_sql.join(", "),
            placeholders.join(", ")
        ))?;

        for row in rows {
            let values = columns
                .iter()
                .map(|c| row.get(c).map(to_sql).unwrap_or(SqlValue::Null));
            stmt.execute(params_from_iter(values))?;
        }
    }

    tx.commit()?;
    Ok(rows.len())
}

/// Write every non-empty table; empty ones are skipped with a diagnostic
pub fn load_tables(conn: &mut Connection, tables: &BTreeMap<String, Vec<FlatRecord>>) -> Result<LoadSummary> {
    let mut summary = LoadSummary::default();

    for (table, rows) in tables {
        if rows.is_empty() {
            warn!(table = %table, "skipping table: no rows");
            summary.skipped.push((table.clone(), "empty".to_string()));
            continue;
        }

        info!(table = %table, rows = rows.len(), "writing table");
        let written = replace_table(conn, table, rows)?;
        summary.written.push((table.clone(), written));
    }

    Ok(summary)
}

/// Same as `load_tables` for loosely-typed input: entries that are not a
/// list of objects are skipped with a diagnostic
pub fn load_json_tables(conn: &mut Connection, tables: &serde_json::Map<String, Value>) -> Result<LoadSummary> {
    let mut typed: BTreeMap<String, Vec<FlatRecord>> = BTreeMap::new();
    let mut not_lists = Vec::new();

    for (table, value) in tables {
        let rows = value.as_array().and_then(|items| {
            items
                .iter()
                .map(|item| item.as_object().cloned())
                .collect::<Option<Vec<FlatRecord>>>()
        });

        match rows {
            Some(rows) => {
                typed.insert(table.clone(), rows);
            }
            None => {
                warn!(table = %table, "skipping table: not a list of records");
                not_lists.push((table.clone(), "not a list of records".to_string()));
            }
        }
    }

    let mut summary = load_tables(conn, &typed)?;
    summary.skipped.extend(not_lists);
    Ok(summary)
}

pub fn count_rows(conn: &Connection, table: &str) -> Result<i64> {
    if !is_valid_table_name(table) {
        bail!("Invalid table name: {:?}", table);
    }
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", quote_identifier(table)),
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> FlatRecord {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_load_and_replace() {
        let mut conn = Connection::open_in_memory().unwrap();
        let mut tables = BTreeMap::new();
        tables.insert(
            "contacts".to_string(),
            vec![
                record(json!({"id": "1", "email": "ana@gmail.com", "lastname": null})),
                record(json!({"id": "2", "email": "rui@bol.com.br", "lastname": "Lima"})),
            ],
        );

        let summary = load_tables(&mut conn, &tables).unwrap();
        assert_eq!(summary.rows_written(), 2);
        assert_eq!(count_rows(&conn, "contacts").unwrap(), 2);

        // Second load replaces, does not append
        tables.get_mut("contacts").unwrap().truncate(1);
        load_tables(&mut conn, &tables).unwrap();
        assert_eq!(count_rows(&conn, "contacts").unwrap(), 1);

        println!("✅ Replace-if-exists test PASSED");
    }

    #[test]
    fn test_nulls_stay_null() {
        let mut conn = Connection::open_in_memory().unwrap();
        let rows = vec![record(json!({"id": "1", "lastname": null, "archived": false, "amount": 120.5}))];
        replace_table(&mut conn, "contacts", &rows).unwrap();

        let (lastname, archived, amount): (Option<String>, i64, f64) = conn
            .query_row("SELECT lastname, archived, amount FROM contacts", [], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })
            .unwrap();

        assert_eq!(lastname, None);
        assert_eq!(archived, 0);
        assert_eq!(amount, 120.5);
    }

    #[test]
    fn test_ragged_rows_get_union_of_columns() {
        let mut conn = Connection::open_in_memory().unwrap();
        let rows = vec![
            record(json!({"id": "1", "email": "a@b.com"})),
            record(json!({"id": "2", "companies_id": "9"})),
        ];
        replace_table(&mut conn, "contacts", &rows).unwrap();

        let missing: Option<String> = conn
            .query_row("SELECT companies_id FROM contacts WHERE id = '1'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(missing, None);
    }

    #[test]
    fn test_empty_tables_skipped() {
        let mut conn = Connection::open_in_memory().unwrap();
        let mut tables = BTreeMap::new();
        tables.insert("deals".to_string(), Vec::new());
        tables.insert("contacts".to_string(), vec![record(json!({"id": "1"}))]);

        let summary = load_tables(&mut conn, &tables).unwrap();

        assert_eq!(summary.written, vec![("contacts".to_string(), 1)]);
        assert_eq!(summary.skipped, vec![("deals".to_string(), "empty".to_string())]);
        assert!(count_rows(&conn, "deals").is_err());
    }

    #[test]
    fn test_json_input_skips_non_lists() {
        let mut conn = Connection::open_in_memory().unwrap();
        let input = record(json!({
            "contacts": [{"id": "1"}],
            "companies": "oops",
            "deals": []
        }));

        let summary = load_json_tables(&mut conn, &input).unwrap();

        assert_eq!(summary.written.len(), 1);
        assert_eq!(summary.skipped.len(), 2);
        assert!(summary.skipped.iter().any(|(t, _)| t == "companies"));
    }

    #[test]
    fn test_invalid_table_name_rejected() {
        let mut conn = Connection::open_in_memory().unwrap();
        let rows = vec![record(json!({"id": "1"}))];

        assert!(replace_table(&mut conn, "deals; DROP TABLE x", &rows).is_err());
        assert!(is_valid_table_name("hubspot_deals"));
        assert!(!is_valid_table_name("1deals"));
    }
}
