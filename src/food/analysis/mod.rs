pub mod classifier;
pub mod detection;
pub mod nutrition;
pub mod scorer;
pub mod standard_foods;
pub mod strategy;

pub use classifier::{FoodCategory, FoodClassifier};
pub use detection::{format_detection, DetectionResponse, RawDetection};
pub use nutrition::{Confidence, NutrientProfile, NutritionResolver};
pub use strategy::{MatchStrategy, StrategyTable};
