use lazy_static::lazy_static;
use std::collections::HashMap;

use crate::food::models::Nutrients;

// Per 100 g: calories, protein, fat, carbs, fiber, sugar, sodium
const STANDARD_FOODS: &[(&str, Nutrients)] = &[
    // Fruit
    ("apple", Nutrients::new(52.0, 0.3, 0.2, 14.0, 2.4, 10.0, 1.0)),
    ("banana", Nutrients::new(89.0, 1.1, 0.3, 23.0, 2.6, 12.0, 1.0)),
    ("orange", Nutrients::new(47.0, 0.9, 0.1, 12.0, 2.4, 9.0, 0.0)),
    ("strawberry", Nutrients::new(32.0, 0.7, 0.3, 8.0, 2.0, 4.9, 1.0)),
    ("grape", Nutrients::new(69.0, 0.7, 0.2, 18.0, 0.9, 16.0, 2.0)),
    ("watermelon", Nutrients::new(30.0, 0.6, 0.2, 8.0, 0.4, 6.0, 1.0)),
    ("pineapple", Nutrients::new(50.0, 0.5, 0.1, 13.0, 1.4, 10.0, 1.0)),
    ("mango", Nutrients::new(60.0, 0.8, 0.4, 15.0, 1.6, 14.0, 1.0)),
    ("peach", Nutrients::new(39.0, 0.9, 0.3, 10.0, 1.5, 8.0, 0.0)),
    ("pear", Nutrients::new(57.0, 0.4, 0.1, 15.0, 3.1, 10.0, 1.0)),
    ("kiwi", Nutrients::new(61.0, 1.1, 0.5, 15.0, 3.0, 9.0, 3.0)),
    ("blueberry", Nutrients::new(57.0, 0.7, 0.3, 14.0, 2.4, 10.0, 1.0)),
    ("raspberry", Nutrients::new(52.0, 1.2, 0.7, 12.0, 6.5, 4.4, 1.0)),
    ("avocado", Nutrients::new(160.0, 2.0, 15.0, 9.0, 7.0, 0.7, 7.0)),
    // Vegetables
    ("carrot", Nutrients::new(41.0, 0.9, 0.2, 10.0, 2.8, 5.0, 69.0)),
    ("broccoli", Nutrients::new(34.0, 2.8, 0.4, 7.0, 2.6, 1.7, 33.0)),
    ("tomato", Nutrients::new(18.0, 0.9, 0.2, 4.0, 1.2, 2.6, 5.0)),
    ("cucumber", Nutrients::new(15.0, 0.7, 0.1, 3.6, 0.5, 1.7, 2.0)),
    ("lettuce", Nutrients::new(15.0, 1.4, 0.2, 2.9, 1.3, 0.8, 28.0)),
    ("spinach", Nutrients::new(23.0, 2.9, 0.4, 3.6, 2.2, 0.4, 79.0)),
    ("potato", Nutrients::new(77.0, 2.0, 0.1, 17.0, 2.2, 0.8, 6.0)),
    ("sweet potato", Nutrients::new(86.0, 1.6, 0.1, 20.0, 3.0, 4.2, 55.0)),
    ("onion", Nutrients::new(40.0, 1.1, 0.1, 9.0, 1.7, 4.2, 4.0)),
    ("bell pepper", Nutrients::new(31.0, 1.0, 0.3, 6.0, 2.1, 4.2, 4.0)),
    ("mushroom", Nutrients::new(22.0, 3.1, 0.3, 3.3, 1.0, 2.0, 5.0)),
    ("cauliflower", Nutrients::new(25.0, 1.9, 0.3, 5.0, 2.0, 1.9, 30.0)),
    ("cabbage", Nutrients::new(25.0, 1.3, 0.1, 6.0, 2.5, 3.2, 18.0)),
    // Protein
    ("chicken breast", Nutrients::new(165.0, 31.0, 3.6, 0.0, 0.0, 0.0, 74.0)),
    ("beef", Nutrients::new(250.0, 26.0, 15.0, 0.0, 0.0, 0.0, 72.0)),
    ("pork", Nutrients::new(242.0, 25.0, 14.0, 0.0, 0.0, 0.0, 62.0)),
    ("salmon", Nutrients::new(208.0, 20.0, 13.0, 0.0, 0.0, 0.0, 59.0)),
    ("tuna", Nutrients::new(184.0, 30.0, 6.0, 0.0, 0.0, 0.0, 50.0)),
    ("egg", Nutrients::new(155.0, 13.0, 11.0, 1.1, 0.0, 1.1, 124.0)),
    ("tofu", Nutrients::new(76.0, 8.0, 4.8, 1.9, 0.3, 0.0, 7.0)),
    // Dairy
    ("milk", Nutrients::new(42.0, 3.4, 1.0, 5.0, 0.0, 5.0, 44.0)),
    ("yogurt", Nutrients::new(59.0, 3.5, 0.4, 7.0, 0.0, 7.0, 36.0)),
    ("cheese", Nutrients::new(402.0, 25.0, 33.0, 1.3, 0.0, 0.5, 621.0)),
    ("butter", Nutrients::new(717.0, 0.9, 81.0, 0.1, 0.0, 0.1, 11.0)),
    // Grains
    ("rice", Nutrients::new(130.0, 2.7, 0.3, 28.0, 0.4, 0.1, 1.0)),
    ("bread", Nutrients::new(265.0, 9.0, 3.2, 49.0, 2.7, 5.0, 491.0)),
    ("pasta", Nutrients::new(131.0, 5.0, 1.1, 25.0, 1.8, 0.6, 1.0)),
    ("oatmeal", Nutrients::new(68.0, 2.4, 1.4, 12.0, 1.7, 0.5, 49.0)),
    // Nuts
    ("almond", Nutrients::new(579.0, 21.0, 50.0, 22.0, 12.5, 4.4, 1.0)),
    ("walnut", Nutrients::new(654.0, 15.0, 65.0, 14.0, 6.7, 2.6, 2.0)),
    ("peanut", Nutrients::new(567.0, 26.0, 49.0, 16.0, 8.5, 4.7, 18.0)),
    // Drinks
    ("coffee", Nutrients::new(1.0, 0.1, 0.0, 0.0, 0.0, 0.0, 2.0)),
    ("tea", Nutrients::new(1.0, 0.0, 0.0, 0.3, 0.0, 0.0, 4.0)),
    // Fast food
    ("pizza", Nutrients::new(266.0, 11.0, 10.0, 33.0, 2.3, 3.6, 598.0)),
    ("hamburger", Nutrients::new(295.0, 17.0, 14.0, 30.0, 1.8, 5.0, 414.0)),
    ("french fries", Nutrients::new(312.0, 3.4, 15.0, 41.0, 3.8, 0.3, 210.0)),
    // Sweets
    ("chocolate", Nutrients::new(546.0, 4.9, 31.0, 61.0, 7.0, 48.0, 24.0)),
    ("ice cream", Nutrients::new(207.0, 3.5, 11.0, 24.0, 0.7, 21.0, 80.0)),
];

lazy_static! {
    static ref STANDARD_FOOD_TABLE: HashMap<&'static str, Nutrients> =
        STANDARD_FOODS.iter().copied().collect();
}

/// Looks up a canonical, already normalized (trimmed, lower-cased) name.
pub fn lookup(normalized_name: &str) -> Option<Nutrients> {
    STANDARD_FOOD_TABLE.get(normalized_name).copied()
}

pub fn names() -> impl Iterator<Item = &'static str> {
    STANDARD_FOODS.iter().map(|(name, _)| *name)
}
