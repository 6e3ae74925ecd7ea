use anyhow::{bail, Result};
use std::sync::Arc;

use crate::food::analysis::NutritionResolver;

pub mod food_cmd;
mod system;

/// What the REPL should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct CommandHandler {
    resolver: Arc<NutritionResolver>,
}

impl CommandHandler {
    pub fn new(resolver: Arc<NutritionResolver>) -> Self {
        Self { resolver }
    }

    pub async fn handle_command(&mut self, input: &str) -> Result<Flow> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Flow::Continue);
        }

        // Single-word commands first
        match input.to_lowercase().as_str() {
            "help" => {
                system::print_help();
                return Ok(Flow::Continue);
            }
            "exit" | "quit" => {
                println!("👋 Goodbye!");
                return Ok(Flow::Exit);
            }
            _ => {}
        }

        let command = input.split_whitespace().next().unwrap_or_default().to_lowercase();
        match command.as_str() {
            "nutrition" | "search" | "fdc" => {
                food_cmd::handle_command(input, &self.resolver).await?;
                Ok(Flow::Continue)
            }
            _ => bail!("Unknown command '{}'. Type 'help' for available commands.", command),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::food::models::{FoodDetail, SearchResults};
    use crate::providers::traits::{NutrientFetcher, SearchProvider};
    use async_trait::async_trait;

    struct OfflineFoodData;

    #[async_trait]
    impl SearchProvider for OfflineFoodData {
        async fn search(&self, _query: &str, _limit: u32) -> Result<SearchResults, AppError> {
            Err(AppError::upstream("USDA API", "offline"))
        }
    }

    #[async_trait]
    impl NutrientFetcher for OfflineFoodData {
        async fn fetch_detail(&self, fdc_id: u64) -> Result<FoodDetail, AppError> {
            Err(AppError::not_found(format!("Food with FDC ID {}", fdc_id)))
        }
    }

    fn handler() -> CommandHandler {
        let data = Arc::new(OfflineFoodData);
        CommandHandler::new(Arc::new(NutritionResolver::new(data.clone(), data)))
    }

    #[tokio::test]
    async fn test_system_commands() {
        let mut handler = handler();
        assert_eq!(handler.handle_command("").await.unwrap(), Flow::Continue);
        assert_eq!(handler.handle_command("help").await.unwrap(), Flow::Continue);
        assert_eq!(handler.handle_command("EXIT").await.unwrap(), Flow::Exit);
        assert!(handler.handle_command("dance").await.is_err());
    }

    #[tokio::test]
    async fn test_food_commands() {
        let mut handler = handler();
        // Resolution never fails, even offline
        assert_eq!(handler.handle_command("Nutrition apple").await.unwrap(), Flow::Continue);
        assert_eq!(handler.handle_command("nutrition mystery stew").await.unwrap(), Flow::Continue);

        assert!(handler.handle_command("nutrition").await.is_err());
        assert!(handler.handle_command("search apple").await.is_err());
        assert!(handler.handle_command("fdc abc").await.is_err());
        assert!(handler.handle_command("fdc 123").await.is_err());
    }
}
