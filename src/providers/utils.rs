/// Rounds to `decimals` places, halves to even.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Upper-cases the first letter of every whitespace-separated word.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(91.000_000_000_001, 2), 91.0);
        assert_eq!(round_to(40.456, 2), 40.46);
        assert_eq!(round_to(100.25, 1), 100.2);
        assert_eq!(round_to(100.75, 1), 100.8);
        assert_eq!(round_to(0.125, 2), 0.12);
        assert_eq!(round_to(200.0, 1), 200.0);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("sweet potato"), "Sweet Potato");
        assert_eq!(title_case("  ICE   cream "), "Ice Cream");
        assert_eq!(title_case(""), "");
    }
}
