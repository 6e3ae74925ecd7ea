use anyhow::{bail, Context, Result};
use colored::Colorize;

use crate::food::analysis::{Confidence, NutrientProfile, NutritionResolver};
use crate::food::models::{FoodDetail, NutrientKey, SearchResults};

const CLI_SEARCH_LIMIT: u32 = 10;

pub async fn handle_command(input: &str, resolver: &NutritionResolver) -> Result<()> {
    let input = input.trim();
    let (command, argument) = match input.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (input, ""),
    };

    match command.to_lowercase().as_str() {
        "nutrition" => {
            if argument.is_empty() {
                bail!("Please specify a food item. Usage: nutrition <food>");
            }
            let profile = resolver.resolve_nutrition(argument).await;
            println!("{}", render_profile(&profile));
        }
        "search" => {
            if argument.is_empty() {
                bail!("Please specify a search query. Usage: search <query>");
            }
            let results = resolver.search(argument, CLI_SEARCH_LIMIT).await?;
            println!("{}", render_search(argument, &results));
        }
        "fdc" => {
            let fdc_id: u64 = argument
                .parse()
                .with_context(|| format!("'{}' is not a valid FDC id. Usage: fdc <id>", argument))?;
            let detail = resolver.lookup_by_external_id(fdc_id).await?;
            println!("{}", render_detail(&detail));
        }
        other => bail!("Unknown food command '{}'", other),
    }

    Ok(())
}

fn confidence_label(confidence: &Confidence) -> String {
    let label = confidence.to_string();
    match confidence {
        Confidence::Standard => label.green().to_string(),
        Confidence::SmartMatch | Confidence::AverageOf(_) => label.cyan().to_string(),
        Confidence::Estimated => label.yellow().to_string(),
    }
}

pub fn render_profile(profile: &NutrientProfile) -> String {
    let n = &profile.nutrients;
    let mut out = format!(
        "\n🍽️  {} ({})\n",
        profile.name.bold(),
        confidence_label(&profile.confidence)
    );
    if let Some(description) = &profile.description {
        out.push_str(&format!("   {}\n", description.dimmed()));
    }
    out.push_str("   Per 100 g:\n");
    out.push_str(&format!("   Calories: {:>8.1} kcal\n", n.calories));
    out.push_str(&format!("   Protein:  {:>8.1} g\n", n.protein));
    out.push_str(&format!("   Fat:      {:>8.1} g\n", n.fat));
    out.push_str(&format!("   Carbs:    {:>8.1} g\n", n.carbs));
    out.push_str(&format!("   Fiber:    {:>8.1} g\n", n.fiber));
    out.push_str(&format!("   Sugar:    {:>8.1} g\n", n.sugar));
    out.push_str(&format!("   Sodium:   {:>8.1} mg", n.sodium));
    out
}

pub fn render_search(query: &str, results: &SearchResults) -> String {
    if results.candidates.is_empty() {
        return format!("❌ No foods found for '{}'", query);
    }

    let mut out = format!(
        "\n🔍 {} of {} results for '{}':\n",
        results.candidates.len(),
        results.total_hits,
        query
    );
    for food in &results.candidates {
        out.push_str(&format!(
            "   {:>8}  {} {}\n",
            food.fdc_id.to_string().cyan(),
            food.description,
            format!("[{}]", food.data_type).dimmed()
        ));
    }
    out.truncate(out.trim_end().len());
    out
}

pub fn render_detail(detail: &FoodDetail) -> String {
    let mut out = format!(
        "\n📋 {} {}\n   FDC {} | per {} {}\n",
        detail.description.bold(),
        format!("[{}]", detail.data_type).dimmed(),
        detail.fdc_id,
        detail.serving_size,
        detail.serving_unit
    );
    if detail.nutrients.is_empty() {
        out.push_str("   No nutrient data reported");
        return out;
    }
    for key in NutrientKey::ALL {
        if let Some(value) = detail.nutrients.get(&key) {
            out.push_str(&format!("   {:<9} {:>8.2}\n", format!("{}:", key.label()), value));
        }
    }
    out.truncate(out.trim_end().len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::food::models::{CandidateFood, PartialNutrients};

    #[test]
    fn test_render_estimated_profile() {
        colored::control::set_override(false);
        let rendered = render_profile(&NutrientProfile::estimated("mystery stew"));
        assert!(rendered.contains("mystery stew (estimated)"));
        assert!(rendered.contains("Calories:    100.0 kcal"));
        assert!(rendered.contains("Sodium:       50.0 mg"));
    }

    #[test]
    fn test_render_search_lists_candidates() {
        colored::control::set_override(false);
        let results = SearchResults {
            candidates: vec![CandidateFood {
                fdc_id: 171688,
                description: "Apples, raw, with skin".to_string(),
                data_type: "SR Legacy".to_string(),
            }],
            total_hits: 42,
        };
        let rendered = render_search("apple", &results);
        assert!(rendered.contains("1 of 42 results for 'apple'"));
        assert!(rendered.contains("171688  Apples, raw, with skin [SR Legacy]"));

        let empty = render_search("zzz", &SearchResults::default());
        assert!(empty.contains("No foods found for 'zzz'"));
    }

    #[test]
    fn test_render_detail_shows_only_reported_nutrients() {
        colored::control::set_override(false);
        let mut nutrients = PartialNutrients::new();
        nutrients.insert(NutrientKey::Calories, 52.0);
        nutrients.insert(NutrientKey::Protein, 0.26);
        let detail = FoodDetail {
            fdc_id: 171688,
            description: "Apples, raw, with skin".to_string(),
            data_type: "SR Legacy".to_string(),
            nutrients,
            serving_size: 100.0,
            serving_unit: "g".to_string(),
        };

        let rendered = render_detail(&detail);
        assert!(rendered.contains("FDC 171688 | per 100 g"));
        assert!(rendered.contains("Protein:"));
        assert!(!rendered.contains("Fiber:"));
    }
}
