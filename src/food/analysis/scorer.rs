use super::classifier::FoodCategory;
use super::strategy::{MatchStrategy, StrategyTable, PRIMARY_DATA_SOURCE, SECONDARY_DATA_SOURCE};
use crate::food::models::CandidateFood;

/// Candidates scoring at or below this are never selected.
pub const MIN_MATCH_SCORE: i32 = 5;

const FULL_QUERY_BONUS: i32 = 20;
const TOKEN_MATCH_BONUS: i32 = 10;
const PRIORITY_KEYWORD_BONUS: i32 = 5;
const EXCLUDE_KEYWORD_PENALTY: i32 = 10;
const PRIMARY_SOURCE_BONUS: i32 = 3;
const SECONDARY_SOURCE_BONUS: i32 = 2;
const BABY_FOOD_PENALTY: i32 = 15;
const BAKERY_CONFUSION_PENALTY: i32 = 12;

const BABY_FOOD_MARKER: &str = "babyfood";
const BAKERY_CONFUSION_TERMS: &[&str] = &["pie", "strudel", "croissant"];

#[derive(Debug, Clone)]
pub struct ScoredCandidate<'a> {
    pub candidate: &'a CandidateFood,
    pub score: i32,
    pub description: String,
}

/// Scores one candidate. `query` must already be trimmed and lower-cased.
pub fn score_candidate(
    query: &str,
    category: FoodCategory,
    strategy: &MatchStrategy,
    candidate: &CandidateFood,
) -> i32 {
    let description = candidate.description.to_lowercase();
    let mut score = 0;

    if description.contains(query) {
        score += FULL_QUERY_BONUS;
    } else if query.split_whitespace().any(|word| description.contains(word)) {
        score += TOKEN_MATCH_BONUS;
    }

    for keyword in &strategy.priority_keywords {
        if description.contains(keyword) {
            score += PRIORITY_KEYWORD_BONUS;
        }
    }

    for exclude in &strategy.exclude_keywords {
        if description.contains(exclude) && !query.contains(exclude) {
            score -= EXCLUDE_KEYWORD_PENALTY;
        }
    }

    if strategy.prefer_primary_source && candidate.data_type == PRIMARY_DATA_SOURCE {
        score += PRIMARY_SOURCE_BONUS;
    } else if !strategy.prefer_primary_source && candidate.data_type == SECONDARY_DATA_SOURCE {
        score += SECONDARY_SOURCE_BONUS;
    }

    if category.is_fresh_produce() {
        if description.contains(BABY_FOOD_MARKER) {
            score -= BABY_FOOD_PENALTY;
        }
        if BAKERY_CONFUSION_TERMS.iter().any(|term| description.contains(term)) {
            score -= BAKERY_CONFUSION_PENALTY;
        }
    }

    score
}

/// Scores and stably sorts candidates, highest first.
pub fn rank_candidates<'a>(
    query: &str,
    category: FoodCategory,
    strategies: &StrategyTable,
    candidates: &'a [CandidateFood],
) -> Vec<ScoredCandidate<'a>> {
    let query = query.trim().to_lowercase();
    let strategy = strategies.strategy_for(category);

    let mut scored: Vec<ScoredCandidate<'a>> = candidates
        .iter()
        .map(|candidate| ScoredCandidate {
            candidate,
            score: score_candidate(&query, category, strategy, candidate),
            description: candidate.description.to_lowercase(),
        })
        .collect();

    // sort_by is stable: equal scores keep provider order
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

pub fn select_best<'a>(
    query: &str,
    category: FoodCategory,
    strategies: &StrategyTable,
    candidates: &'a [CandidateFood],
) -> Option<&'a CandidateFood> {
    let ranked = rank_candidates(query, category, strategies, candidates);

    for (position, item) in ranked.iter().take(3).enumerate() {
        tracing::debug!(
            rank = position + 1,
            score = item.score,
            description = %item.description,
            "match candidate"
        );
    }

    ranked
        .into_iter()
        .find(|item| item.score > MIN_MATCH_SCORE)
        .map(|item| item.candidate)
}
