use async_trait::async_trait;

use crate::error::AppError;
use crate::food::analysis::detection::RawDetection;
use crate::food::models::{FoodDetail, SearchResults};

/// Free-text food search against a nutrition database.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, limit: u32) -> Result<SearchResults, AppError>;
}

/// Detailed nutrient lookup for a single food.
#[async_trait]
pub trait NutrientFetcher: Send + Sync {
    async fn fetch_detail(&self, fdc_id: u64) -> Result<FoodDetail, AppError>;
}

/// Remote object-detection model.
///
/// Failures are reported inside the returned value (`RawDetection::error`)
/// rather than as `Err`, so callers can pass them through unchanged.
#[async_trait]
pub trait DetectionBackend: Send + Sync {
    async fn detect(&self, image: Vec<u8>, file_name: &str) -> RawDetection;
}
