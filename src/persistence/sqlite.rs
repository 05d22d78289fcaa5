use super::{
    PersistenceResult, WorkloadStore, missing_resource_error, referenced_resource_error,
    validate_resource, validate_work_item,
};
use crate::{Resource, WorkItem};
use chrono::NaiveDate;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

pub struct SqliteStore {
    connection: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS resources (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                resource_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS work_items (
                id INTEGER PRIMARY KEY,
                resource_id TEXT NOT NULL REFERENCES resources(id) ON DELETE RESTRICT,
                item_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS holidays (
                holiday_date TEXT PRIMARY KEY
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }
}

impl WorkloadStore for SqliteStore {
    fn list_resources(&self) -> PersistenceResult<Vec<Resource>> {
        let conn = self.connection.lock();
        let mut stmt = conn.prepare("SELECT resource_json FROM resources ORDER BY seq ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut resources = Vec::new();
        for json in rows {
            resources.push(serde_json::from_str(&json?)?);
        }
        Ok(resources)
    }

    fn find_resource(&self, id: &str) -> PersistenceResult<Option<Resource>> {
        let conn = self.connection.lock();
        let json: Option<String> = conn
            .query_row(
                "SELECT resource_json FROM resources WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        json.map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(Into::into)
    }

    fn upsert_resource(&mut self, resource: Resource) -> PersistenceResult<()> {
        validate_resource(&resource)?;
        let json = serde_json::to_string(&resource)?;
        let conn = self.connection.lock();
        conn.execute(
            "INSERT INTO resources (id, resource_json) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET resource_json = excluded.resource_json",
            params![resource.id, json],
        )?;
        Ok(())
    }

    fn delete_resource(&mut self, id: &str) -> PersistenceResult<bool> {
        let mut conn = self.connection.lock();
        let tx = conn.transaction()?;
        let referencing = {
            let mut stmt = tx.prepare("SELECT id FROM work_items WHERE resource_id = ?1 ORDER BY id")?;
            let rows = stmt.query_map(params![id], |row| row.get::<_, i32>(0))?;
            rows.collect::<Result<Vec<i32>, _>>()?
        };
        if !referencing.is_empty() {
            return Err(referenced_resource_error(id, &referencing));
        }
        let removed = tx.execute("DELETE FROM resources WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(removed > 0)
    }

    fn list_work_items(&self) -> PersistenceResult<Vec<WorkItem>> {
        let conn = self.connection.lock();
        let mut stmt = conn.prepare("SELECT item_json FROM work_items ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut items = Vec::new();
        for json in rows {
            items.push(serde_json::from_str(&json?)?);
        }
        Ok(items)
    }

    fn find_work_item(&self, id: i32) -> PersistenceResult<Option<WorkItem>> {
        let conn = self.connection.lock();
        let json: Option<String> = conn
            .query_row(
                "SELECT item_json FROM work_items WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        json.map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(Into::into)
    }

    fn upsert_work_item(&mut self, item: WorkItem) -> PersistenceResult<()> {
        validate_work_item(&item)?;
        let json = serde_json::to_string(&item)?;
        let mut conn = self.connection.lock();
        let tx = conn.transaction()?;
        let resource_exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM resources WHERE id = ?1)",
            params![item.resource_id],
            |row| row.get(0),
        )?;
        if !resource_exists {
            return Err(missing_resource_error(item.id, &item.resource_id));
        }
        tx.execute(
            "INSERT INTO work_items (id, resource_id, item_json) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET resource_id = excluded.resource_id,
                                           item_json = excluded.item_json",
            params![item.id, item.resource_id, json],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn delete_work_item(&mut self, id: i32) -> PersistenceResult<bool> {
        let conn = self.connection.lock();
        let removed = conn.execute("DELETE FROM work_items WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    fn list_holidays(&self) -> PersistenceResult<Vec<NaiveDate>> {
        let conn = self.connection.lock();
        let mut stmt = conn.prepare("SELECT holiday_date FROM holidays ORDER BY holiday_date ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, NaiveDate>(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn add_holiday(&mut self, date: NaiveDate) -> PersistenceResult<bool> {
        let conn = self.connection.lock();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO holidays (holiday_date) VALUES (?1)",
            params![date],
        )?;
        Ok(inserted > 0)
    }

    fn remove_holiday(&mut self, date: NaiveDate) -> PersistenceResult<bool> {
        let conn = self.connection.lock();
        let removed = conn.execute("DELETE FROM holidays WHERE holiday_date = ?1", params![date])?;
        Ok(removed > 0)
    }
}
