use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Canonical nutrient keys. Values are per 100 g serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NutrientKey {
    Calories,
    Protein,
    Fat,
    Carbs,
    Fiber,
    Sugar,
    Sodium,
}

impl NutrientKey {
    pub const ALL: [NutrientKey; 7] = [
        NutrientKey::Calories,
        NutrientKey::Protein,
        NutrientKey::Fat,
        NutrientKey::Carbs,
        NutrientKey::Fiber,
        NutrientKey::Sugar,
        NutrientKey::Sodium,
    ];

    pub fn label(self) -> &'static str {
        match self {
            NutrientKey::Calories => "Calories",
            NutrientKey::Protein => "Protein",
            NutrientKey::Fat => "Fat",
            NutrientKey::Carbs => "Carbs",
            NutrientKey::Fiber => "Fiber",
            NutrientKey::Sugar => "Sugar",
            NutrientKey::Sodium => "Sodium",
        }
    }

    /// Exact-match mapping from FoodData Central nutrient names.
    pub fn from_usda_name(name: &str) -> Option<Self> {
        match name {
            "Energy" => Some(NutrientKey::Calories),
            "Protein" => Some(NutrientKey::Protein),
            "Total lipid (fat)" => Some(NutrientKey::Fat),
            "Carbohydrate, by difference" => Some(NutrientKey::Carbs),
            "Fiber, total dietary" => Some(NutrientKey::Fiber),
            "Sugars, total including NLEA" => Some(NutrientKey::Sugar),
            "Sodium, Na" => Some(NutrientKey::Sodium),
            _ => None,
        }
    }
}

/// Nutrients as reported by a detail lookup; absent keys were not reported.
pub type PartialNutrients = BTreeMap<NutrientKey, f64>;

/// All seven nutrient values, always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrients {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    pub fiber: f64,
    pub sugar: f64,
    pub sodium: f64,
}

impl Nutrients {
    pub const fn new(
        calories: f64,
        protein: f64,
        fat: f64,
        carbs: f64,
        fiber: f64,
        sugar: f64,
        sodium: f64,
    ) -> Self {
        Self {
            calories,
            protein,
            fat,
            carbs,
            fiber,
            sugar,
            sodium,
        }
    }

    pub fn get(&self, key: NutrientKey) -> f64 {
        match key {
            NutrientKey::Calories => self.calories,
            NutrientKey::Protein => self.protein,
            NutrientKey::Fat => self.fat,
            NutrientKey::Carbs => self.carbs,
            NutrientKey::Fiber => self.fiber,
            NutrientKey::Sugar => self.sugar,
            NutrientKey::Sodium => self.sodium,
        }
    }

    /// Stores `value`, clamping negatives to zero.
    pub fn set(&mut self, key: NutrientKey, value: f64) {
        let value = if value.is_finite() { value.max(0.0) } else { 0.0 };
        let slot = match key {
            NutrientKey::Calories => &mut self.calories,
            NutrientKey::Protein => &mut self.protein,
            NutrientKey::Fat => &mut self.fat,
            NutrientKey::Carbs => &mut self.carbs,
            NutrientKey::Fiber => &mut self.fiber,
            NutrientKey::Sugar => &mut self.sugar,
            NutrientKey::Sodium => &mut self.sodium,
        };
        *slot = value;
    }

    pub fn from_partial(partial: &PartialNutrients) -> Self {
        let mut nutrients = Self::default();
        for (key, value) in partial {
            nutrients.set(*key, *value);
        }
        nutrients
    }
}

/// A search hit from the nutrition database, not yet confirmed as a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateFood {
    pub fdc_id: u64,
    pub description: String,
    pub data_type: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResults {
    #[serde(rename = "foods")]
    pub candidates: Vec<CandidateFood>,
    pub total_hits: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FoodDetail {
    pub fdc_id: u64,
    pub description: String,
    pub data_type: String,
    pub nutrients: PartialNutrients,
    pub serving_size: f64,
    pub serving_unit: String,
}
