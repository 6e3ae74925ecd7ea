use super::classifier::FoodCategory;

/// Data-source tag preferred by most strategies.
pub const PRIMARY_DATA_SOURCE: &str = "Foundation";
/// Data-source tag rewarded when a strategy does not prefer the primary one.
pub const SECONDARY_DATA_SOURCE: &str = "SR Legacy";

/// Category-specific scoring configuration for best-match selection.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchStrategy {
    pub category: FoodCategory,
    pub priority_keywords: Vec<&'static str>,
    pub exclude_keywords: Vec<&'static str>,
    pub prefer_primary_source: bool,
    pub label: &'static str,
}

impl MatchStrategy {
    fn new(
        category: FoodCategory,
        priority_keywords: &[&'static str],
        exclude_keywords: &[&'static str],
        prefer_primary_source: bool,
        label: &'static str,
    ) -> Self {
        Self {
            category,
            priority_keywords: priority_keywords.to_vec(),
            exclude_keywords: exclude_keywords.to_vec(),
            prefer_primary_source,
            label,
        }
    }

    fn standard_for(category: FoodCategory) -> Self {
        use FoodCategory::*;
        match category {
            FreshFruit => Self::new(
                category,
                &["raw", "fresh", "with skin"],
                &["pie", "strudel", "croissant", "babyfood", "juice", "sauce", "canned", "frozen"],
                true,
                "Fresh fruit",
            ),
            FreshVegetable => Self::new(
                category,
                &["raw", "fresh"],
                &["canned", "frozen", "sauce", "babyfood"],
                true,
                "Fresh vegetable",
            ),
            Bakery => Self::new(category, &[], &["babyfood"], false, "Bakery"),
            Beverage => Self::new(
                category,
                &["juice", "beverage", "drink"],
                &["babyfood"],
                true,
                "Beverage",
            ),
            Meat => Self::new(
                category,
                &["raw", "fresh", "lean"],
                &["babyfood", "canned"],
                true,
                "Meat",
            ),
            Seafood => Self::new(
                category,
                &["raw", "fresh"],
                &["babyfood", "canned"],
                true,
                "Seafood",
            ),
            Dairy => Self::new(category, &[], &["babyfood"], true, "Dairy"),
            Grain => Self::new(
                category,
                &["cooked", "boiled"],
                &["babyfood"],
                true,
                "Grains and staples",
            ),
            NutsSeeds => Self::new(
                category,
                &["raw", "unsalted"],
                &["babyfood"],
                true,
                "Nuts and seeds",
            ),
            Processed => Self::new(category, &[], &["babyfood"], false, "Processed food"),
            Dessert => Self::new(category, &[], &["babyfood"], false, "Dessert"),
            Unknown => Self::new(
                category,
                &["raw", "fresh"],
                &["babyfood"],
                true,
                "Unknown type",
            ),
        }
    }
}

/// One strategy per category, built once and shared read-only.
#[derive(Debug, Clone)]
pub struct StrategyTable {
    strategies: Vec<MatchStrategy>,
}

impl Default for StrategyTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl StrategyTable {
    pub fn standard() -> Self {
        Self {
            strategies: FoodCategory::ALL
                .iter()
                .map(|category| MatchStrategy::standard_for(*category))
                .collect(),
        }
    }

    pub fn strategy_for(&self, category: FoodCategory) -> &MatchStrategy {
        &self.strategies[category.index()]
    }
}
