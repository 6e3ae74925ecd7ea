use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodCategory {
    FreshFruit,
    FreshVegetable,
    Bakery,
    Beverage,
    Meat,
    Seafood,
    Dairy,
    Grain,
    NutsSeeds,
    Processed,
    Dessert,
    Unknown,
}

impl FoodCategory {
    pub const ALL: [FoodCategory; 12] = [
        FoodCategory::FreshFruit,
        FoodCategory::FreshVegetable,
        FoodCategory::Bakery,
        FoodCategory::Beverage,
        FoodCategory::Meat,
        FoodCategory::Seafood,
        FoodCategory::Dairy,
        FoodCategory::Grain,
        FoodCategory::NutsSeeds,
        FoodCategory::Processed,
        FoodCategory::Dessert,
        FoodCategory::Unknown,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            FoodCategory::FreshFruit => "fresh_fruit",
            FoodCategory::FreshVegetable => "fresh_vegetable",
            FoodCategory::Bakery => "bakery",
            FoodCategory::Beverage => "beverage",
            FoodCategory::Meat => "meat",
            FoodCategory::Seafood => "seafood",
            FoodCategory::Dairy => "dairy",
            FoodCategory::Grain => "grain",
            FoodCategory::NutsSeeds => "nuts_seeds",
            FoodCategory::Processed => "processed",
            FoodCategory::Dessert => "dessert",
            FoodCategory::Unknown => "unknown",
        }
    }

    pub const fn is_fresh_produce(self) -> bool {
        matches!(self, FoodCategory::FreshFruit | FoodCategory::FreshVegetable)
    }
}

impl fmt::Display for FoodCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword rules checked in declaration order; the first category with a
/// keyword contained in the name wins.
const CATEGORY_KEYWORDS: &[(FoodCategory, &[&str])] = &[
    (FoodCategory::FreshFruit, &[
        "apple", "banana", "orange", "grape", "strawberry", "blueberry",
        "raspberry", "mango", "pineapple", "watermelon", "melon", "peach",
        "pear", "plum", "cherry", "kiwi", "lemon", "lime", "avocado",
    ]),
    (FoodCategory::FreshVegetable, &[
        "carrot", "broccoli", "tomato", "cucumber", "lettuce", "spinach",
        "kale", "cabbage", "onion", "garlic", "potato", "sweet potato",
        "bell pepper", "chili", "mushroom", "celery", "asparagus",
    ]),
    (FoodCategory::Bakery, &[
        "croissant", "strudel", "pie", "bread", "muffin", "cake", "cookie",
        "biscuit", "pastry", "donut", "bagel", "roll", "bun",
    ]),
    (FoodCategory::Beverage, &[
        "juice", "smoothie", "milk", "tea", "coffee", "soda", "water",
        "lemonade", "shake", "drink", "beverage",
    ]),
    (FoodCategory::Meat, &[
        "chicken", "beef", "pork", "steak", "bacon", "sausage", "ham",
        "turkey", "duck", "lamb", "veal",
    ]),
    (FoodCategory::Seafood, &[
        "salmon", "tuna", "shrimp", "prawn", "crab", "lobster", "fish",
        "cod", "tilapia", "sardine", "oyster", "clam",
    ]),
    (FoodCategory::Dairy, &[
        "cheese", "yogurt", "butter", "cream", "ice cream", "custard",
    ]),
    (FoodCategory::Grain, &[
        "rice", "pasta", "noodle", "oatmeal", "cereal", "quinoa", "barley",
        "bread", "toast",
    ]),
    (FoodCategory::NutsSeeds, &[
        "almond", "walnut", "peanut", "cashew", "pecan", "seed", "nut",
    ]),
    (FoodCategory::Processed, &[
        "babyfood", "canned", "frozen", "sauce", "ketchup", "mayonnaise",
        "chip", "cracker", "popcorn",
    ]),
    (FoodCategory::Dessert, &[
        "chocolate", "candy", "sweet", "dessert", "pudding",
    ]),
];

#[derive(Debug, Clone)]
pub struct FoodClassifier {
    rules: Vec<(FoodCategory, Vec<&'static str>)>,
}

impl Default for FoodClassifier {
    fn default() -> Self {
        Self::standard()
    }
}

impl FoodClassifier {
    pub fn standard() -> Self {
        Self {
            rules: CATEGORY_KEYWORDS
                .iter()
                .map(|(category, keywords)| (*category, keywords.to_vec()))
                .collect(),
        }
    }

    pub fn classify(&self, name: &str) -> FoodCategory {
        let name = name.to_lowercase();
        self.rules
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|keyword| name.contains(keyword)))
            .map(|(category, _)| *category)
            .unwrap_or(FoodCategory::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_all_order() {
        for (i, category) in FoodCategory::ALL.iter().enumerate() {
            assert_eq!(category.index(), i);
        }
    }

    #[test]
    fn test_classify_simple_names() {
        let classifier = FoodClassifier::standard();
        assert_eq!(classifier.classify("Banana"), FoodCategory::FreshFruit);
        assert_eq!(classifier.classify("steamed broccoli"), FoodCategory::FreshVegetable);
        assert_eq!(classifier.classify("grilled SALMON"), FoodCategory::Seafood);
        assert_eq!(classifier.classify("quinoa"), FoodCategory::Grain);
        assert_eq!(classifier.classify("dark chocolate"), FoodCategory::Dessert);
    }

    #[test]
    fn test_first_declared_category_wins() {
        let classifier = FoodClassifier::standard();
        // fresh fruit is declared before bakery
        assert_eq!(classifier.classify("apple pie"), FoodCategory::FreshFruit);
        // "milk" is a beverage keyword and beverage precedes dairy
        assert_eq!(classifier.classify("milk chocolate"), FoodCategory::Beverage);
        // "pineapple" contains "apple"
        assert_eq!(classifier.classify("pineapple"), FoodCategory::FreshFruit);
    }

    #[test]
    fn test_unmatched_names_are_unknown() {
        let classifier = FoodClassifier::standard();
        assert_eq!(classifier.classify("tofu"), FoodCategory::Unknown);
        assert_eq!(classifier.classify(""), FoodCategory::Unknown);
    }

    #[test]
    fn test_category_serializes_snake_case() {
        let json = serde_json::to_string(&FoodCategory::NutsSeeds).unwrap();
        assert_eq!(json, "\"nuts_seeds\"");
        assert_eq!(FoodCategory::FreshFruit.to_string(), "fresh_fruit");
    }
}
