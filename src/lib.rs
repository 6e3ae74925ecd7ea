pub mod api;
pub mod commands;
pub mod config;
pub mod database;
pub mod error;
pub mod food;
pub mod providers;

// Re-export commonly used items
pub use error::AppError;
pub use food::analysis::{NutrientProfile, NutritionResolver};
