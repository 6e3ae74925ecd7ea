pub mod traits;
pub mod utils;

pub use traits::{DetectionBackend, NutrientFetcher, SearchProvider};
