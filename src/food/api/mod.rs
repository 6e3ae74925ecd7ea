pub mod roboflow;
pub mod usda;

// Re-export common types
pub use roboflow::RoboflowClient;
pub use usda::UsdaClient;
