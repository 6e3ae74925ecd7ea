use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

use crate::error::AppError;
use crate::food::config::FoodConfig;
use crate::food::models::{CandidateFood, FoodDetail, NutrientKey, PartialNutrients, SearchResults};
use crate::providers::traits::{NutrientFetcher, SearchProvider};

const SERVICE: &str = "USDA API";

// Searches are restricted to the curated data sets
const SEARCH_DATA_TYPES: &[&str] = &["Foundation", "SR Legacy"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    total_hits: u64,
    #[serde(default)]
    foods: Vec<SearchFood>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchFood {
    fdc_id: u64,
    #[serde(default)]
    description: String,
    #[serde(default)]
    data_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetailResponse {
    #[serde(default)]
    description: String,
    #[serde(default)]
    data_type: String,
    #[serde(default)]
    food_nutrients: Vec<FoodNutrientRow>,
}

#[derive(Debug, Deserialize)]
struct FoodNutrientRow {
    nutrient: Option<NutrientInfo>,
    amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NutrientInfo {
    #[serde(default)]
    name: String,
    #[serde(default)]
    unit_name: String,
}

#[derive(Debug, Clone)]
pub struct UsdaClient {
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl UsdaClient {
    pub fn new(config: &FoodConfig, timeout: Duration) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key: config.usda_api_key.clone(),
            base_url: config.usda_base_url.clone(),
            http,
        })
    }

    async fn error_from_response(response: reqwest::Response) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        AppError::upstream(SERVICE, format!("HTTP {}: {}", status, body))
    }
}

#[async_trait]
impl SearchProvider for UsdaClient {
    async fn search(&self, query: &str, limit: u32) -> Result<SearchResults, AppError> {
        if query.trim().is_empty() {
            return Err(AppError::validation("Search query cannot be empty"));
        }

        let url = format!("{}/foods/search", self.base_url);
        let page_size = limit.to_string();
        let mut params = vec![
            ("api_key", self.api_key.as_str()),
            ("query", query),
            ("pageSize", page_size.as_str()),
        ];
        params.extend(SEARCH_DATA_TYPES.iter().map(|data_type| ("dataType", *data_type)));

        tracing::debug!(query = %query, limit, "searching USDA foods");

        let response = self
            .http
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| AppError::upstream(SERVICE, format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let data: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::upstream(SERVICE, format!("Failed to parse response: {}", e)))?;

        Ok(SearchResults {
            total_hits: data.total_hits,
            candidates: data
                .foods
                .into_iter()
                .map(|food| CandidateFood {
                    fdc_id: food.fdc_id,
                    description: food.description,
                    data_type: food.data_type,
                })
                .collect(),
        })
    }
}

#[async_trait]
impl NutrientFetcher for UsdaClient {
    async fn fetch_detail(&self, fdc_id: u64) -> Result<FoodDetail, AppError> {
        let url = format!("{}/food/{}", self.base_url, fdc_id);

        tracing::debug!(fdc_id, "fetching USDA food detail");

        let response = self
            .http
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| AppError::upstream(SERVICE, format!("Failed to send request: {}", e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::not_found(format!("Food with FDC ID {}", fdc_id)));
        }
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let data: DetailResponse = response
            .json()
            .await
            .map_err(|e| AppError::upstream(SERVICE, format!("Failed to parse response: {}", e)))?;

        Ok(FoodDetail {
            fdc_id,
            nutrients: map_nutrients(&data.food_nutrients),
            description: data.description,
            data_type: data.data_type,
            serving_size: 100.0,
            serving_unit: "g".to_string(),
        })
    }
}

/// Keeps only the recognised nutrients. Energy rows reported in kJ are
/// dropped so that the kcal row determines calories.
fn map_nutrients(rows: &[FoodNutrientRow]) -> PartialNutrients {
    let mut nutrients = PartialNutrients::new();
    for row in rows {
        let Some(info) = &row.nutrient else {
            continue;
        };
        let Some(key) = NutrientKey::from_usda_name(&info.name) else {
            continue;
        };
        if key == NutrientKey::Calories && info.unit_name.eq_ignore_ascii_case("kJ") {
            continue;
        }
        nutrients.insert(key, row.amount.unwrap_or(0.0));
    }
    nutrients
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_response_parsing() {
        let data: SearchResponse = serde_json::from_value(json!({
            "totalHits": 2,
            "foods": [
                { "fdcId": 171688, "description": "Apples, raw, with skin", "dataType": "SR Legacy", "score": 812.3 },
                { "fdcId": 1750339, "dataType": "Foundation" }
            ]
        }))
        .unwrap();

        assert_eq!(data.total_hits, 2);
        assert_eq!(data.foods[0].fdc_id, 171_688);
        assert_eq!(data.foods[1].description, "");
    }

    #[test]
    fn test_detail_nutrient_mapping() {
        let data: DetailResponse = serde_json::from_value(json!({
            "fdcId": 171688,
            "description": "Apples, raw, with skin",
            "dataType": "SR Legacy",
            "foodNutrients": [
                { "nutrient": { "id": 1008, "name": "Energy", "unitName": "kcal" }, "amount": 52.0 },
                { "nutrient": { "id": 1062, "name": "Energy", "unitName": "kJ" }, "amount": 218.0 },
                { "nutrient": { "id": 1003, "name": "Protein", "unitName": "g" }, "amount": 0.26 },
                { "nutrient": { "id": 1004, "name": "Total lipid (fat)", "unitName": "g" }, "amount": 0.17 },
                { "nutrient": { "id": 1093, "name": "Sodium, Na", "unitName": "mg" } },
                { "nutrient": { "id": 1087, "name": "Calcium, Ca", "unitName": "mg" }, "amount": 6.0 },
                { "amount": 3.0 }
            ]
        }))
        .unwrap();

        let nutrients = map_nutrients(&data.food_nutrients);
        assert_eq!(nutrients.get(&NutrientKey::Calories), Some(&52.0));
        assert_eq!(nutrients.get(&NutrientKey::Protein), Some(&0.26));
        assert_eq!(nutrients.get(&NutrientKey::Fat), Some(&0.17));
        assert_eq!(nutrients.get(&NutrientKey::Sodium), Some(&0.0));
        assert_eq!(nutrients.get(&NutrientKey::Fiber), None);
        assert_eq!(nutrients.len(), 4);
    }

    #[tokio::test]
    async fn test_empty_query_rejected_without_request() {
        let config = FoodConfig {
            usda_api_key: "key".to_string(),
            usda_base_url: "http://127.0.0.1:9".to_string(),
            roboflow: None,
        };
        let client = UsdaClient::new(&config, Duration::from_secs(1)).unwrap();
        let result = client.search("   ", 10).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
