pub mod database;
pub mod entries;

pub use database::Database;
pub use database::DatabaseError;
pub use entries::{parse_date_bound, FoodLogEntry, FoodLogUpdate, HistoryQuery, Meal, NewFoodLogEntry};
