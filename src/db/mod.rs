mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{types::Type, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::models::*;
use crate::schedule::{HouseholdSnapshot, HouseholdStore};

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open `TEND_DB` if set, else `tend.db` in the platform data directory.
    pub fn open_default() -> Result<Self> {
        if let Some(path) = std::env::var_os("TEND_DB") {
            return Self::open(PathBuf::from(path));
        }
        let dirs = directories::ProjectDirs::from("", "", "tend")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let db_path = dirs.data_dir().join("tend.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Household operations
    // ============================================================

    pub fn get_all_households(&self) -> Result<Vec<Household>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt =
            conn.prepare("SELECT id, name, created_at FROM households ORDER BY name")?;

        let households = stmt
            .query_map([], household_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(households)
    }

    pub fn get_household(&self, id: Uuid) -> Result<Option<Household>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare("SELECT id, name, created_at FROM households WHERE id = ?")?;

        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(household_from_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn create_household(&self, input: CreateHouseholdInput) -> Result<Household> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO households (id, name, created_at) VALUES (?, ?, ?)",
            (id.to_string(), &input.name, now.to_rfc3339()),
        )?;

        Ok(Household {
            id,
            name: input.name,
            created_at: now,
        })
    }

    /// Delete a household along with its items, todos and cares.
    pub fn delete_household(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM households WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Item operations
    // ============================================================

    pub fn get_items_by_household(&self, household_id: Uuid) -> Result<Vec<Item>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, household_id, name, description, created_at
             FROM items WHERE household_id = ? ORDER BY name",
        )?;

        let items = stmt
            .query_map([household_id.to_string()], |row| {
                Ok(Item {
                    id: uuid_column(row, 0)?,
                    household_id: uuid_column(row, 1)?,
                    name: row.get(2)?,
                    description: row.get(3)?,
                    created_at: datetime_column(row, 4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    pub fn create_item(&self, household_id: Uuid, input: CreateItemInput) -> Result<Item> {
        self.get_household(household_id)?
            .ok_or_else(|| anyhow::anyhow!("Household not found"))?;

        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO items (id, household_id, name, description, created_at)
             VALUES (?, ?, ?, ?, ?)",
            (
                id.to_string(),
                household_id.to_string(),
                &input.name,
                &input.description,
                now.to_rfc3339(),
            ),
        )?;

        Ok(Item {
            id,
            household_id,
            name: input.name,
            description: input.description,
            created_at: now,
        })
    }

    pub fn delete_item(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM items WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Todo operations
    // ============================================================

    /// Todos of a household in the order they were created.
    pub fn get_todos_by_household(&self, household_id: Uuid) -> Result<Vec<Todo>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        select_todos(&conn, household_id)
    }

    pub fn get_todo(&self, id: Uuid) -> Result<Option<Todo>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, household_id, item_id, title, recurrence_days, date_created
             FROM todos WHERE id = ?",
        )?;

        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(todo_from_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn create_todo(&self, household_id: Uuid, input: CreateTodoInput) -> Result<Todo> {
        validate_recurrence(input.recurrence_days)?;
        self.get_household(household_id)?
            .ok_or_else(|| anyhow::anyhow!("Household not found"))?;

        if let Some(item_id) = input.item_id {
            let conn = self.conn.lock().expect("database lock poisoned");
            let owner: Option<String> = conn
                .query_row(
                    "SELECT household_id FROM items WHERE id = ?",
                    [item_id.to_string()],
                    |row| row.get(0),
                )
                .optional()?;
            if owner != Some(household_id.to_string()) {
                anyhow::bail!("Item not found in household");
            }
        }

        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let date_created = input.date_created.unwrap_or_else(Utc::now);

        conn.execute(
            "INSERT INTO todos (id, household_id, item_id, title, recurrence_days, date_created)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                household_id.to_string(),
                input.item_id.map(|u| u.to_string()),
                &input.title,
                input.recurrence_days,
                date_created.to_rfc3339(),
            ),
        )?;

        Ok(Todo {
            id,
            household_id,
            item_id: input.item_id,
            title: input.title,
            recurrence_days: input.recurrence_days,
            date_created,
        })
    }

    pub fn update_todo(&self, id: Uuid, input: UpdateTodoInput) -> Result<Option<Todo>> {
        if let Some(days) = input.recurrence_days {
            validate_recurrence(days)?;
        }
        let Some(existing) = self.get_todo(id)? else {
            return Ok(None);
        };

        let conn = self.conn.lock().expect("database lock poisoned");
        let title = input.title.unwrap_or(existing.title);
        let recurrence_days = input.recurrence_days.unwrap_or(existing.recurrence_days);

        conn.execute(
            "UPDATE todos SET title = ?, recurrence_days = ? WHERE id = ?",
            (&title, recurrence_days, id.to_string()),
        )?;

        Ok(Some(Todo {
            title,
            recurrence_days,
            ..existing
        }))
    }

    /// Delete a todo and every care logged against it.
    pub fn delete_todo(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM todos WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Care operations
    // ============================================================

    /// Cares of a household in the order they were logged.
    pub fn get_cares_by_household(&self, household_id: Uuid) -> Result<Vec<Care>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        select_cares(&conn, household_id)
    }

    /// Cares of one todo, most recent first.
    pub fn get_cares_by_todo(&self, todo_id: Uuid) -> Result<Vec<Care>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, household_id, todo_id, note, date_created
             FROM cares WHERE todo_id = ? ORDER BY date_created DESC, id DESC",
        )?;

        let cares = stmt
            .query_map([todo_id.to_string()], care_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(cares)
    }

    /// Log a care. The todo must belong to `household_id`.
    pub fn create_care(&self, household_id: Uuid, input: CreateCareInput) -> Result<Care> {
        let todo = self
            .get_todo(input.todo_id)?
            .ok_or_else(|| anyhow::anyhow!("Todo not found"))?;
        if todo.household_id != household_id {
            anyhow::bail!("Todo not found in household");
        }

        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let date_created = input.date_created.unwrap_or_else(Utc::now);

        conn.execute(
            "INSERT INTO cares (id, household_id, todo_id, note, date_created)
             VALUES (?, ?, ?, ?, ?)",
            (
                id.to_string(),
                household_id.to_string(),
                input.todo_id.to_string(),
                &input.note,
                date_created.to_rfc3339(),
            ),
        )?;

        tracing::debug!("Logged care {} for todo {}", id, input.todo_id);

        Ok(Care {
            id,
            household_id,
            todo_id: input.todo_id,
            note: input.note,
            date_created,
        })
    }

    pub fn delete_care(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM cares WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }
}

impl HouseholdStore for Database {
    fn household_todos(&self, household_id: Uuid) -> Result<Vec<Todo>> {
        self.get_todos_by_household(household_id)
    }

    fn household_cares(&self, household_id: Uuid) -> Result<Vec<Care>> {
        self.get_cares_by_household(household_id)
    }

    /// Reads both tables under one lock so no care can slip in between.
    fn snapshot(&self, household_id: Uuid) -> Result<HouseholdSnapshot> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let todos = select_todos(&conn, household_id)?;
        let cares = select_cares(&conn, household_id)?;
        Ok(HouseholdSnapshot::new(household_id, todos, cares))
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

fn validate_recurrence(days: u32) -> Result<()> {
    if days == 0 {
        anyhow::bail!("recurrence_days must be at least 1");
    }
    Ok(())
}

fn select_todos(conn: &Connection, household_id: Uuid) -> Result<Vec<Todo>> {
    let mut stmt = conn.prepare(
        "SELECT id, household_id, item_id, title, recurrence_days, date_created
         FROM todos WHERE household_id = ? ORDER BY rowid",
    )?;

    let todos = stmt
        .query_map([household_id.to_string()], todo_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(todos)
}

fn select_cares(conn: &Connection, household_id: Uuid) -> Result<Vec<Care>> {
    let mut stmt = conn.prepare(
        "SELECT id, household_id, todo_id, note, date_created
         FROM cares WHERE household_id = ? ORDER BY rowid",
    )?;

    let cares = stmt
        .query_map([household_id.to_string()], care_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(cares)
}

fn household_from_row(row: &Row<'_>) -> rusqlite::Result<Household> {
    Ok(Household {
        id: uuid_column(row, 0)?,
        name: row.get(1)?,
        created_at: datetime_column(row, 2)?,
    })
}

fn todo_from_row(row: &Row<'_>) -> rusqlite::Result<Todo> {
    Ok(Todo {
        id: uuid_column(row, 0)?,
        household_id: uuid_column(row, 1)?,
        item_id: row
            .get::<_, Option<String>>(2)?
            .map(|value| parse_uuid(2, &value))
            .transpose()?,
        title: row.get(3)?,
        recurrence_days: row.get(4)?,
        date_created: datetime_column(row, 5)?,
    })
}

fn care_from_row(row: &Row<'_>) -> rusqlite::Result<Care> {
    Ok(Care {
        id: uuid_column(row, 0)?,
        household_id: uuid_column(row, 1)?,
        todo_id: uuid_column(row, 2)?,
        note: row.get(3)?,
        date_created: datetime_column(row, 4)?,
    })
}

fn uuid_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    parse_uuid(idx, &row.get::<_, String>(idx)?)
}

fn parse_uuid(idx: usize, value: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Errors on anything that is not RFC 3339.
fn datetime_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let value: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
