use chrono::Utc;
use log::{debug, info};
use rusqlite::{params, OptionalExtension, Row};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio_rusqlite::Connection;
use uuid::Uuid;

use super::entries::{
    format_timestamp, parse_timestamp, FoodLogEntry, FoodLogUpdate, HistoryQuery, Meal, NewFoodLogEntry,
};

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] tokio_rusqlite::Error),
    #[error("Database connection error: {0}")]
    Connection(String),
    #[error("Corrupt food log row {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

const ENTRY_COLUMNS: &str = "id, user_id, food_name, calories, carbs, protein, fat, fiber, sugar, sodium, \
                             meal, serving_size, date, created_at, updated_at";

/// A food log row as stored: enums and timestamps are still text.
#[derive(Debug, Clone)]
struct StoredRow {
    id: String,
    user_id: String,
    food_name: String,
    calories: f64,
    carbs: f64,
    protein: f64,
    fat: f64,
    fiber: f64,
    sugar: f64,
    sodium: f64,
    meal: String,
    serving_size: f64,
    date: String,
    created_at: String,
    updated_at: String,
}

impl StoredRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            food_name: row.get(2)?,
            calories: row.get(3)?,
            carbs: row.get(4)?,
            protein: row.get(5)?,
            fat: row.get(6)?,
            fiber: row.get(7)?,
            sugar: row.get(8)?,
            sodium: row.get(9)?,
            meal: row.get(10)?,
            serving_size: row.get(11)?,
            date: row.get(12)?,
            created_at: row.get(13)?,
            updated_at: row.get(14)?,
        })
    }

    fn apply(&mut self, update: &FoodLogUpdate, now: &str) {
        if let Some(food_name) = &update.food_name {
            self.food_name = food_name.clone();
        }
        let numeric = [
            (&mut self.calories, update.calories),
            (&mut self.carbs, update.carbs),
            (&mut self.protein, update.protein),
            (&mut self.fat, update.fat),
            (&mut self.fiber, update.fiber),
            (&mut self.sugar, update.sugar),
            (&mut self.sodium, update.sodium),
            (&mut self.serving_size, update.serving_size),
        ];
        for (slot, value) in numeric {
            if let Some(value) = value {
                *slot = value;
            }
        }
        if let Some(meal) = update.meal {
            self.meal = meal.as_str().to_string();
        }
        if let Some(date) = &update.date {
            self.date = format_timestamp(date);
        }
        self.updated_at = now.to_string();
    }

    fn into_entry(self) -> Result<FoodLogEntry, DatabaseError> {
        let corrupt = |id: &str, reason: String| DatabaseError::Corrupt {
            id: id.to_string(),
            reason,
        };

        let meal = self.meal.parse::<Meal>().map_err(|e| corrupt(&self.id, e))?;
        let date = parse_timestamp(&self.date).map_err(|e| corrupt(&self.id, format!("date: {}", e)))?;
        let created_at =
            parse_timestamp(&self.created_at).map_err(|e| corrupt(&self.id, format!("created_at: {}", e)))?;
        let updated_at =
            parse_timestamp(&self.updated_at).map_err(|e| corrupt(&self.id, format!("updated_at: {}", e)))?;

        Ok(FoodLogEntry {
            id: self.id,
            user_id: self.user_id,
            food_name: self.food_name,
            calories: self.calories,
            carbs: self.carbs,
            protein: self.protein,
            fat: self.fat,
            fiber: self.fiber,
            sugar: self.sugar,
            sodium: self.sodium,
            meal,
            serving_size: self.serving_size,
            date,
            created_at,
            updated_at,
        })
    }
}

#[derive(Clone)]
pub struct Database {
    conn: Arc<Connection>,
}

impl Database {
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, DatabaseError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DatabaseError::Connection(format!("{}: {}", parent.display(), e)))?;
        }

        let conn = Connection::open(path)
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;

        Self::with_connection(conn).await
    }

    pub async fn in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;

        Self::with_connection(conn).await
    }

    async fn with_connection(conn: Connection) -> Result<Self, DatabaseError> {
        let db = Self { conn: Arc::new(conn) };
        db.initialize().await?;
        Ok(db)
    }

    async fn initialize(&self) -> Result<(), DatabaseError> {
        self.conn
            .call(|conn| {
                conn.execute_batch(
                    "CREATE TABLE IF NOT EXISTS food_log (
                        id TEXT PRIMARY KEY,
                        user_id TEXT NOT NULL,
                        food_name TEXT NOT NULL,
                        calories REAL NOT NULL,
                        carbs REAL NOT NULL DEFAULT 0,
                        protein REAL NOT NULL DEFAULT 0,
                        fat REAL NOT NULL DEFAULT 0,
                        fiber REAL NOT NULL DEFAULT 0,
                        sugar REAL NOT NULL DEFAULT 0,
                        sodium REAL NOT NULL DEFAULT 0,
                        meal TEXT NOT NULL,
                        serving_size REAL NOT NULL DEFAULT 1,
                        date TEXT NOT NULL,
                        created_at TEXT NOT NULL,
                        updated_at TEXT NOT NULL
                    );
                    CREATE INDEX IF NOT EXISTS idx_food_log_user_date ON food_log (user_id, date);",
                )?;
                Ok(())
            })
            .await?;

        info!("Database initialized successfully");
        Ok(())
    }

    /// Stores a new entry. The entry date defaults to the time of insertion.
    pub async fn save_entry(&self, entry: NewFoodLogEntry) -> Result<FoodLogEntry, DatabaseError> {
        let now = format_timestamp(&Utc::now());
        let row = StoredRow {
            id: Uuid::new_v4().to_string(),
            user_id: entry.user_id,
            food_name: entry.food_name,
            calories: entry.calories,
            carbs: entry.carbs,
            protein: entry.protein,
            fat: entry.fat,
            fiber: entry.fiber,
            sugar: entry.sugar,
            sodium: entry.sodium,
            meal: entry.meal.as_str().to_string(),
            serving_size: entry.serving_size,
            date: entry.date.as_ref().map(format_timestamp).unwrap_or_else(|| now.clone()),
            created_at: now.clone(),
            updated_at: now,
        };

        let stored = row.clone();
        self.conn
            .call(move |conn| {
                conn.execute(
                    &format!(
                        "INSERT INTO food_log ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                        ENTRY_COLUMNS
                    ),
                    params![
                        stored.id,
                        stored.user_id,
                        stored.food_name,
                        stored.calories,
                        stored.carbs,
                        stored.protein,
                        stored.fat,
                        stored.fiber,
                        stored.sugar,
                        stored.sodium,
                        stored.meal,
                        stored.serving_size,
                        stored.date,
                        stored.created_at,
                        stored.updated_at,
                    ],
                )?;
                Ok(())
            })
            .await?;

        info!("Logged {} for user {}", row.food_name, row.user_id);
        row.into_entry()
    }

    /// Entries for one user, newest first, with inclusive date bounds.
    pub async fn list_history(&self, query: &HistoryQuery) -> Result<Vec<FoodLogEntry>, DatabaseError> {
        let user_id = query.user_id.clone();
        let start = query.start.as_ref().map(format_timestamp);
        let end = query.end.as_ref().map(format_timestamp);
        let limit = query.effective_limit() as i64;

        let rows = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM food_log
                     WHERE user_id = ?1
                       AND (?2 IS NULL OR date >= ?2)
                       AND (?3 IS NULL OR date <= ?3)
                     ORDER BY date DESC, created_at DESC
                     LIMIT ?4",
                    ENTRY_COLUMNS
                ))?;

                let rows = stmt.query_map(params![user_id, start, end, limit], |row| StoredRow::from_row(row))?;

                let mut entries = Vec::new();
                for row in rows {
                    entries.push(row?);
                }

                Ok(entries)
            })
            .await?;

        debug!("Fetched {} food log entries for {}", rows.len(), query.user_id);
        rows.into_iter().map(StoredRow::into_entry).collect()
    }

    pub async fn get_entry(&self, id: &str, user_id: &str) -> Result<Option<FoodLogEntry>, DatabaseError> {
        let id = id.to_string();
        let user_id = user_id.to_string();

        let row = self
            .conn
            .call(move |conn| {
                let row = conn
                    .query_row(
                        &format!("SELECT {} FROM food_log WHERE id = ?1 AND user_id = ?2", ENTRY_COLUMNS),
                        params![id, user_id],
                        |row| StoredRow::from_row(row),
                    )
                    .optional()?;
                Ok(row)
            })
            .await?;

        row.map(StoredRow::into_entry).transpose()
    }

    /// Applies a partial update to an entry owned by `user_id`. Returns `None`
    /// when no such entry exists.
    pub async fn update_entry(
        &self,
        id: &str,
        user_id: &str,
        update: FoodLogUpdate,
    ) -> Result<Option<FoodLogEntry>, DatabaseError> {
        let id = id.to_string();
        let user_id = user_id.to_string();
        let now = format_timestamp(&Utc::now());

        let row = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let existing = tx
                    .query_row(
                        &format!("SELECT {} FROM food_log WHERE id = ?1 AND user_id = ?2", ENTRY_COLUMNS),
                        params![id, user_id],
                        |row| StoredRow::from_row(row),
                    )
                    .optional()?;

                let Some(mut row) = existing else {
                    return Ok(None);
                };
                row.apply(&update, &now);

                tx.execute(
                    "UPDATE food_log
                     SET food_name = ?1, calories = ?2, carbs = ?3, protein = ?4, fat = ?5, fiber = ?6,
                         sugar = ?7, sodium = ?8, meal = ?9, serving_size = ?10, date = ?11, updated_at = ?12
                     WHERE id = ?13 AND user_id = ?14",
                    params![
                        row.food_name,
                        row.calories,
                        row.carbs,
                        row.protein,
                        row.fat,
                        row.fiber,
                        row.sugar,
                        row.sodium,
                        row.meal,
                        row.serving_size,
                        row.date,
                        row.updated_at,
                        row.id,
                        row.user_id,
                    ],
                )?;
                tx.commit()?;

                Ok(Some(row))
            })
            .await?;

        if let Some(row) = &row {
            info!("Updated food log entry {}", row.id);
        }
        row.map(StoredRow::into_entry).transpose()
    }

    /// Returns whether an entry was removed.
    pub async fn delete_entry(&self, id: &str, user_id: &str) -> Result<bool, DatabaseError> {
        let id = id.to_string();
        let user_id = user_id.to_string();

        let removed = self
            .conn
            .call(move |conn| {
                let removed = conn.execute(
                    "DELETE FROM food_log WHERE id = ?1 AND user_id = ?2",
                    params![id, user_id],
                )?;
                Ok(removed)
            })
            .await?;

        if removed > 0 {
            info!("Deleted food log entry");
        }
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::entries::parse_date_bound;
    use chrono::{DateTime, TimeZone};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
    }

    fn entry(user: &str, name: &str, calories: f64, date: DateTime<Utc>) -> NewFoodLogEntry {
        let mut entry = NewFoodLogEntry::new(user, name, calories, Meal::Lunch);
        entry.date = Some(date);
        entry
    }

    #[tokio::test]
    async fn test_save_and_get_entry() {
        let db = Database::in_memory().await.unwrap();
        let mut new_entry = entry("u1", "Apple", 52.0, at(15, 9));
        new_entry.carbs = 13.8;
        new_entry.meal = Meal::Breakfast;

        let saved = db.save_entry(new_entry).await.unwrap();
        assert!(!saved.id.is_empty());
        assert_eq!(saved.created_at, saved.updated_at);

        let fetched = db.get_entry(&saved.id, "u1").await.unwrap().unwrap();
        assert_eq!(fetched, saved);
        assert_eq!(fetched.meal, Meal::Breakfast);
        assert_eq!(fetched.carbs, 13.8);
        assert_eq!(fetched.serving_size, 1.0);
    }

    #[tokio::test]
    async fn test_entry_date_defaults_to_now() {
        let db = Database::in_memory().await.unwrap();
        let before = Utc::now() - chrono::Duration::seconds(1);
        let saved = db
            .save_entry(NewFoodLogEntry::new("u1", "Banana", 89.0, Meal::Snack))
            .await
            .unwrap();
        assert!(saved.date >= before);
        assert_eq!(saved.date, saved.created_at);
    }

    #[tokio::test]
    async fn test_history_is_scoped_ordered_and_bounded() {
        let db = Database::in_memory().await.unwrap();
        db.save_entry(entry("u1", "Oatmeal", 150.0, at(14, 8))).await.unwrap();
        db.save_entry(entry("u1", "Salad", 120.0, at(15, 12))).await.unwrap();
        db.save_entry(entry("u1", "Pasta", 400.0, at(15, 19))).await.unwrap();
        db.save_entry(entry("u1", "Toast", 80.0, at(16, 8))).await.unwrap();
        db.save_entry(entry("u2", "Steak", 500.0, at(15, 19))).await.unwrap();

        let all = db.list_history(&HistoryQuery::for_user("u1")).await.unwrap();
        let names: Vec<&str> = all.iter().map(|e| e.food_name.as_str()).collect();
        assert_eq!(names, vec!["Toast", "Pasta", "Salad", "Oatmeal"]);

        let mut query = HistoryQuery::for_user("u1");
        query.start = parse_date_bound("2024-01-15", false);
        query.end = parse_date_bound("2024-01-15", true);
        let day = db.list_history(&query).await.unwrap();
        let names: Vec<&str> = day.iter().map(|e| e.food_name.as_str()).collect();
        assert_eq!(names, vec!["Pasta", "Salad"]);

        let mut query = HistoryQuery::for_user("u1");
        query.limit = 1;
        assert_eq!(db.list_history(&query).await.unwrap().len(), 1);

        let empty = db.list_history(&HistoryQuery::for_user("nobody")).await.unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_partial_update() {
        let db = Database::in_memory().await.unwrap();
        let saved = db.save_entry(entry("u1", "Rice", 130.0, at(15, 12))).await.unwrap();

        let update = FoodLogUpdate {
            calories: Some(260.0),
            serving_size: Some(2.0),
            meal: Some(Meal::Dinner),
            ..FoodLogUpdate::default()
        };
        let updated = db.update_entry(&saved.id, "u1", update).await.unwrap().unwrap();

        assert_eq!(updated.food_name, "Rice");
        assert_eq!(updated.calories, 260.0);
        assert_eq!(updated.serving_size, 2.0);
        assert_eq!(updated.meal, Meal::Dinner);
        assert_eq!(updated.date, saved.date);
        assert_eq!(updated.created_at, saved.created_at);
        assert!(updated.updated_at >= saved.updated_at);

        let fetched = db.get_entry(&saved.id, "u1").await.unwrap().unwrap();
        assert_eq!(fetched, updated);
    }

    #[tokio::test]
    async fn test_other_users_entries_are_invisible() {
        let db = Database::in_memory().await.unwrap();
        let saved = db.save_entry(entry("u1", "Egg", 155.0, at(15, 8))).await.unwrap();

        assert!(db.get_entry(&saved.id, "u2").await.unwrap().is_none());
        let update = FoodLogUpdate {
            calories: Some(1.0),
            ..FoodLogUpdate::default()
        };
        assert!(db.update_entry(&saved.id, "u2", update).await.unwrap().is_none());
        assert!(!db.delete_entry(&saved.id, "u2").await.unwrap());

        assert!(db.delete_entry(&saved.id, "u1").await.unwrap());
        assert!(db.get_entry(&saved.id, "u1").await.unwrap().is_none());
        assert!(!db.delete_entry(&saved.id, "u1").await.unwrap());
    }

    #[tokio::test]
    async fn test_file_database_creates_parent_directory() {
        let dir = std::env::temp_dir().join(format!("food-lens-{}", Uuid::new_v4()));
        let path = dir.join("nested").join("food_log.db");

        let db = Database::new(&path).await.unwrap();
        db.save_entry(entry("u1", "Kiwi", 61.0, at(15, 10))).await.unwrap();
        assert!(path.exists());

        drop(db);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
