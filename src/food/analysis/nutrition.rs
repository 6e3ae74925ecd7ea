use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::classifier::FoodClassifier;
use super::scorer::select_best;
use super::standard_foods;
use super::strategy::StrategyTable;
use crate::error::AppError;
use crate::food::models::{CandidateFood, FoodDetail, NutrientKey, Nutrients, SearchResults};
use crate::providers::traits::{NutrientFetcher, SearchProvider};
use crate::providers::utils::{round_to, title_case};

const SMART_MATCH_SEARCH_LIMIT: u32 = 25;
const FALLBACK_SEARCH_LIMIT: u32 = 50;
const MAX_AVERAGE_SAMPLES: usize = 20;
pub const MAX_SEARCH_LIMIT: u32 = 200;
const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// Descriptions containing any of these are left out of averaging.
const AVERAGE_AVOID_TERMS: &[&str] = &[
    "croissant", "strudel", "juice", "butter", "pie", "sauce", "nuggets", "breaded",
];

const ESTIMATED_NUTRIENTS: Nutrients = Nutrients::new(100.0, 5.0, 2.0, 15.0, 2.0, 8.0, 50.0);

/// Which resolution path produced a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    Standard,
    SmartMatch,
    AverageOf(usize),
    Estimated,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::Standard => f.write_str("standard"),
            Confidence::SmartMatch => f.write_str("smart_match"),
            Confidence::AverageOf(samples) => write!(f, "average_of_{}", samples),
            Confidence::Estimated => f.write_str("estimated"),
        }
    }
}

impl Serialize for Confidence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutrientProfile {
    pub name: String,
    #[serde(flatten)]
    pub nutrients: Nutrients,
    pub confidence: Confidence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_description: Option<String>,
}

impl NutrientProfile {
    fn new(name: String, nutrients: Nutrients, confidence: Confidence) -> Self {
        Self {
            name,
            nutrients,
            confidence,
            description: None,
            data_type: None,
            selected_description: None,
        }
    }

    pub fn estimated(food_name: &str) -> Self {
        Self::new(food_name.to_string(), ESTIMATED_NUTRIENTS, Confidence::Estimated)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResolutionStep {
    StaticLookup,
    SmartMatch,
    AveragedFallback,
}

impl ResolutionStep {
    /// Attempt order. The fixed estimate follows and cannot fail.
    const ORDER: [ResolutionStep; 3] = [
        ResolutionStep::StaticLookup,
        ResolutionStep::SmartMatch,
        ResolutionStep::AveragedFallback,
    ];

    fn as_str(self) -> &'static str {
        match self {
            ResolutionStep::StaticLookup => "static_lookup",
            ResolutionStep::SmartMatch => "smart_match",
            ResolutionStep::AveragedFallback => "averaged_fallback",
        }
    }
}

#[derive(Debug, Error)]
enum StepFailure {
    #[error("not in the standard food table")]
    NotStandard,
    #[error("search returned no candidates")]
    NoCandidates,
    #[error("no candidate scored above the match threshold")]
    NoConfidentMatch,
    #[error("no candidate reported positive calories")]
    NoValidSamples,
    #[error(transparent)]
    Upstream(#[from] AppError),
}

/// Resolves free-text food names to nutrient profiles, degrading from the
/// standard table through database matching down to a fixed estimate.
#[derive(Clone)]
pub struct NutritionResolver {
    search_provider: Arc<dyn SearchProvider>,
    nutrient_fetcher: Arc<dyn NutrientFetcher>,
    classifier: Arc<FoodClassifier>,
    strategies: Arc<StrategyTable>,
    remote_timeout: Duration,
}

impl NutritionResolver {
    pub fn new(
        search_provider: Arc<dyn SearchProvider>,
        nutrient_fetcher: Arc<dyn NutrientFetcher>,
    ) -> Self {
        Self {
            search_provider,
            nutrient_fetcher,
            classifier: Arc::new(FoodClassifier::standard()),
            strategies: Arc::new(StrategyTable::standard()),
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }

    pub fn with_remote_timeout(mut self, remote_timeout: Duration) -> Self {
        self.remote_timeout = remote_timeout;
        self
    }

    pub fn with_tables(mut self, classifier: Arc<FoodClassifier>, strategies: Arc<StrategyTable>) -> Self {
        self.classifier = classifier;
        self.strategies = strategies;
        self
    }

    /// Always returns a profile; the worst case is the `estimated` constant.
    pub async fn resolve_nutrition(&self, food_name: &str) -> NutrientProfile {
        for step in ResolutionStep::ORDER {
            debug!(food = %food_name, step = step.as_str(), "resolution step attempted");

            match self.attempt(step, food_name).await {
                Ok(profile) => {
                    info!(
                        food = %food_name,
                        step = step.as_str(),
                        confidence = %profile.confidence,
                        "resolution step succeeded"
                    );
                    return profile;
                }
                Err(StepFailure::NotStandard) => {
                    debug!(food = %food_name, step = step.as_str(), "not a standard food");
                }
                Err(reason) => {
                    warn!(
                        food = %food_name,
                        step = step.as_str(),
                        reason = %reason,
                        "resolution step failed"
                    );
                }
            }
        }

        let profile = NutrientProfile::estimated(food_name);
        info!(
            food = %food_name,
            step = "fixed_estimate",
            confidence = %profile.confidence,
            "resolution step succeeded"
        );
        profile
    }

    pub async fn lookup_by_external_id(&self, fdc_id: u64) -> Result<FoodDetail, AppError> {
        self.bounded("nutrient detail", self.nutrient_fetcher.fetch_detail(fdc_id))
            .await
    }

    pub async fn search(&self, query: &str, limit: u32) -> Result<SearchResults, AppError> {
        if query.trim().is_empty() {
            return Err(AppError::validation("Search query cannot be empty"));
        }
        if limit == 0 || limit > MAX_SEARCH_LIMIT {
            return Err(AppError::validation(format!(
                "Limit must be between 1 and {}",
                MAX_SEARCH_LIMIT
            )));
        }
        self.bounded("nutrition search", self.search_provider.search(query, limit))
            .await
    }

    async fn attempt(&self, step: ResolutionStep, food_name: &str) -> Result<NutrientProfile, StepFailure> {
        match step {
            ResolutionStep::StaticLookup => self.static_lookup(food_name),
            ResolutionStep::SmartMatch => self.smart_match(food_name).await,
            ResolutionStep::AveragedFallback => self.averaged_fallback(food_name).await,
        }
    }

    fn static_lookup(&self, food_name: &str) -> Result<NutrientProfile, StepFailure> {
        let normalized = normalize(food_name);
        standard_foods::lookup(&normalized)
            .map(|nutrients| NutrientProfile::new(title_case(&normalized), nutrients, Confidence::Standard))
            .ok_or(StepFailure::NotStandard)
    }

    async fn smart_match(&self, food_name: &str) -> Result<NutrientProfile, StepFailure> {
        let results = self
            .bounded(
                "nutrition search",
                self.search_provider.search(food_name, SMART_MATCH_SEARCH_LIMIT),
            )
            .await?;
        if results.candidates.is_empty() {
            return Err(StepFailure::NoCandidates);
        }

        let category = self.classifier.classify(food_name);
        debug!(
            food = %food_name,
            category = %category,
            strategy = self.strategies.strategy_for(category).label,
            "classified food"
        );

        let best = select_best(food_name, category, &self.strategies, &results.candidates)
            .ok_or(StepFailure::NoConfidentMatch)?;

        let detail = self
            .bounded("nutrient detail", self.nutrient_fetcher.fetch_detail(best.fdc_id))
            .await?;

        let mut profile = NutrientProfile::new(
            best.description.clone(),
            Nutrients::from_partial(&detail.nutrients),
            Confidence::SmartMatch,
        );
        profile.data_type = Some(best.data_type.clone());
        profile.selected_description = Some(best.description.clone());
        Ok(profile)
    }

    async fn averaged_fallback(&self, food_name: &str) -> Result<NutrientProfile, StepFailure> {
        let normalized = normalize(food_name);
        let results = self
            .bounded(
                "nutrition search",
                self.search_provider.search(&normalized, FALLBACK_SEARCH_LIMIT),
            )
            .await?;
        if results.candidates.is_empty() {
            return Err(StepFailure::NoCandidates);
        }

        let relevant: Vec<&CandidateFood> = results
            .candidates
            .iter()
            .filter(|candidate| {
                let description = candidate.description.to_lowercase();
                !AVERAGE_AVOID_TERMS.iter().any(|term| description.contains(term))
            })
            .collect();
        let samples: Vec<&CandidateFood> = if relevant.is_empty() {
            debug!(food = %normalized, "every candidate filtered out, averaging all results");
            results.candidates.iter().collect()
        } else {
            relevant
        };

        let mut collected: BTreeMap<NutrientKey, Vec<f64>> = BTreeMap::new();
        let mut valid_count = 0usize;

        for candidate in samples.into_iter().take(MAX_AVERAGE_SAMPLES) {
            let detail = match self
                .bounded("nutrient detail", self.nutrient_fetcher.fetch_detail(candidate.fdc_id))
                .await
            {
                Ok(detail) => detail,
                Err(e) => {
                    debug!(fdc_id = candidate.fdc_id, error = %e, "skipping sample");
                    continue;
                }
            };

            let calories = detail
                .nutrients
                .get(&NutrientKey::Calories)
                .copied()
                .unwrap_or(0.0);
            if calories <= 0.0 {
                continue;
            }

            for (key, value) in &detail.nutrients {
                if *value > 0.0 {
                    collected.entry(*key).or_default().push(*value);
                }
            }
            valid_count += 1;
        }

        if valid_count == 0 {
            return Err(StepFailure::NoValidSamples);
        }

        let mut nutrients = Nutrients::default();
        for (key, values) in &collected {
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            nutrients.set(*key, round_to(mean, 1));
        }

        let mut profile = NutrientProfile::new(
            title_case(&normalized),
            nutrients,
            Confidence::AverageOf(valid_count),
        );
        profile.description = Some(format!("Average of {} {} varieties", valid_count, normalized));
        Ok(profile)
    }

    async fn bounded<T, F>(&self, service: &'static str, call: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        match tokio::time::timeout(self.remote_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(AppError::upstream(
                service,
                format!("timed out after {:?}", self.remote_timeout),
            )),
        }
    }
}

fn normalize(food_name: &str) -> String {
    food_name.trim().to_lowercase()
}
