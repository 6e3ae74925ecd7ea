use url::Url;

use crate::error::AppError;

pub const DEFAULT_USDA_BASE_URL: &str = "https://api.nal.usda.gov/fdc/v1";
pub const DEFAULT_ROBOFLOW_BASE_URL: &str = "https://serverless.roboflow.com";

#[derive(Debug, Clone)]
pub struct RoboflowConfig {
    pub api_key: String,
    pub model_id: String,
    pub version: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct FoodConfig {
    pub usda_api_key: String,
    pub usda_base_url: String,
    /// Detection is optional; `None` when any Roboflow variable is missing.
    pub roboflow: Option<RoboflowConfig>,
}

impl FoodConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let usda_api_key = lookup("USDA_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AppError::configuration("USDA_API_KEY environment variable not set"))?;

        let usda_base_url = lookup("USDA_BASE_URL")
            .unwrap_or_else(|| DEFAULT_USDA_BASE_URL.to_string());
        validate_url("USDA_BASE_URL", &usda_base_url)?;

        let roboflow = match (
            lookup("ROBOFLOW_API_KEY"),
            lookup("ROBOFLOW_MODEL_ID"),
            lookup("ROBOFLOW_VERSION"),
        ) {
            (Some(api_key), Some(model_id), Some(version)) => {
                let base_url = lookup("ROBOFLOW_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_ROBOFLOW_BASE_URL.to_string());
                validate_url("ROBOFLOW_BASE_URL", &base_url)?;
                Some(RoboflowConfig {
                    api_key,
                    model_id,
                    version,
                    base_url,
                })
            }
            _ => None,
        };

        Ok(Self {
            usda_api_key,
            usda_base_url: usda_base_url.trim_end_matches('/').to_string(),
            roboflow,
        })
    }
}

fn validate_url(name: &str, value: &str) -> Result<(), AppError> {
    Url::parse(value)
        .map(|_| ())
        .map_err(|e| AppError::configuration(format!("{} is not a valid URL: {}", name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_missing_usda_key_is_configuration_error() {
        let result = FoodConfig::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[test]
    fn test_defaults_and_optional_detection() {
        let config = FoodConfig::from_lookup(lookup_from(&[("USDA_API_KEY", "key")])).unwrap();
        assert_eq!(config.usda_base_url, DEFAULT_USDA_BASE_URL);
        assert!(config.roboflow.is_none());
    }

    #[test]
    fn test_roboflow_requires_all_three_variables() {
        let partial = FoodConfig::from_lookup(lookup_from(&[
            ("USDA_API_KEY", "key"),
            ("ROBOFLOW_API_KEY", "rf"),
            ("ROBOFLOW_MODEL_ID", "food-detect"),
        ]))
        .unwrap();
        assert!(partial.roboflow.is_none());

        let full = FoodConfig::from_lookup(lookup_from(&[
            ("USDA_API_KEY", "key"),
            ("ROBOFLOW_API_KEY", "rf"),
            ("ROBOFLOW_MODEL_ID", "food-detect"),
            ("ROBOFLOW_VERSION", "3"),
        ]))
        .unwrap();
        let roboflow = full.roboflow.unwrap();
        assert_eq!(roboflow.version, "3");
        assert_eq!(roboflow.base_url, DEFAULT_ROBOFLOW_BASE_URL);
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result = FoodConfig::from_lookup(lookup_from(&[
            ("USDA_API_KEY", "key"),
            ("USDA_BASE_URL", "not a url"),
        ]));
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }
}
