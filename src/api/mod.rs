use axum::{
    extract::{
        multipart::{Multipart, MultipartError, MultipartRejection},
        rejection::{JsonRejection, PathRejection, QueryRejection},
        DefaultBodyLimit, Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use validator::Validate;

use crate::config::ServerConfig;
use crate::database::{parse_date_bound, Database, FoodLogEntry, FoodLogUpdate, HistoryQuery, Meal, NewFoodLogEntry};
use crate::error::AppError;
use crate::food::analysis::detection::{format_detection, DetectionResponse};
use crate::food::analysis::{NutrientProfile, NutritionResolver};
use crate::food::models::{FoodDetail, SearchResults};
use crate::providers::traits::DetectionBackend;

const DEFAULT_SEARCH_LIMIT: u32 = 10;
const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

#[derive(Clone)]
pub struct AppState {
    resolver: Arc<NutritionResolver>,
    detector: Option<Arc<dyn DetectionBackend>>,
    db: Arc<Database>,
}

impl AppState {
    pub fn new(resolver: NutritionResolver, detector: Option<Arc<dyn DetectionBackend>>, db: Database) -> Self {
        Self {
            resolver: Arc::new(resolver),
            detector,
            db: Arc::new(db),
        }
    }
}

/// Create and configure the API router
pub fn create_api(state: AppState, config: &ServerConfig) -> Router {
    // Fully permissive CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    let routes = Router::new()
        .route("/health", get(health_check))
        .route("/detect", post(detect_handler))
        .route("/nutrition/search", get(search_handler))
        .route("/nutrition/fdc/:fdc_id", get(fdc_handler))
        .route("/nutrition/by-name", post(by_name_handler))
        .route("/foods/log", post(log_food_handler))
        .route("/foods/history", get(history_handler))
        .route("/foods/:id", put(update_food_handler).delete(delete_food_handler));

    Router::new()
        .nest("/api", routes)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(GlobalConcurrencyLimitLayer::new(config.max_concurrent_requests))
        .layer(cors)
        .with_state(state)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Configuration(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(kind = self.kind(), error = %self, "request failed");
        } else {
            tracing::debug!(kind = self.kind(), error = %self, "request rejected");
        }

        let body = json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, AppError>;

fn validated<T: Validate>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    let Json(request) = payload.map_err(|rejection| AppError::validation(rejection.body_text()))?;
    request
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    Ok(request)
}

fn required_user_id(user_id: Option<String>) -> ApiResult<String> {
    user_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::validation("user_id is required"))
}

fn parse_optional_date(value: Option<&str>, field: &str, end_of_day: bool) -> ApiResult<Option<chrono::DateTime<chrono::Utc>>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => parse_date_bound(raw, end_of_day)
            .map(Some)
            .ok_or_else(|| AppError::validation(format!("{} must be an RFC 3339 timestamp or YYYY-MM-DD", field))),
    }
}

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
}

async fn health_check() -> Json<StatusResponse> {
    Json(StatusResponse { status: "ok" })
}

async fn detect_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<DetectionResponse>> {
    let mut multipart = multipart.map_err(|_| AppError::validation("No image provided"))?;
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        if field.name() != Some("image") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        if file_name.is_empty() {
            return Err(AppError::validation("No file selected"));
        }
        if !has_allowed_extension(&file_name) {
            return Err(AppError::validation(format!(
                "Invalid file type. Allowed: {}",
                ALLOWED_IMAGE_EXTENSIONS.join(", ")
            )));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(multipart_error)?;
        upload = Some((file_name, bytes));
        break;
    }

    let (file_name, bytes) = upload.ok_or_else(|| AppError::validation("No image provided"))?;
    let detector = state
        .detector
        .as_ref()
        .ok_or_else(|| AppError::configuration("Image detection is not configured"))?;

    tracing::info!(file_name = %file_name, bytes = bytes.len(), "detect request");
    let raw = detector.detect(bytes.to_vec(), &file_name).await;
    Ok(Json(format_detection(raw)))
}

fn multipart_error(e: MultipartError) -> AppError {
    tracing::warn!("Multipart read error: {}", e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::validation("File too large")
    } else {
        AppError::validation(format!("Failed to read multipart data: {}", e.body_text()))
    }
}

fn has_allowed_extension(file_name: &str) -> bool {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    query: Option<String>,
    limit: Option<u32>,
}

async fn search_handler(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Json<SearchResults>> {
    let Query(params) = params.map_err(|rejection| AppError::validation(rejection.body_text()))?;
    let query = params
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| AppError::validation("query parameter is required"))?;

    let results = state
        .resolver
        .search(&query, params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT))
        .await?;
    Ok(Json(results))
}

async fn fdc_handler(
    State(state): State<AppState>,
    fdc_id: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<FoodDetail>> {
    let Path(fdc_id) = fdc_id.map_err(|_| AppError::validation("fdc_id must be a positive integer"))?;
    let detail = state.resolver.lookup_by_external_id(fdc_id).await?;
    Ok(Json(detail))
}

#[derive(Debug, Deserialize, Validate)]
struct ByNameRequest {
    #[validate(required, length(min = 1, max = 200))]
    food_name: Option<String>,
}

async fn by_name_handler(
    State(state): State<AppState>,
    payload: Result<Json<ByNameRequest>, JsonRejection>,
) -> ApiResult<Json<NutrientProfile>> {
    let request = validated(payload)?;
    let food_name = request.food_name.unwrap_or_default();
    if food_name.trim().is_empty() {
        return Err(AppError::validation("food_name cannot be blank"));
    }

    Ok(Json(state.resolver.resolve_nutrition(&food_name).await))
}

#[derive(Debug, Deserialize, Validate)]
struct LogFoodRequest {
    #[validate(required, length(min = 1, max = 128))]
    user_id: Option<String>,
    #[validate(required, length(min = 1, max = 200))]
    food_name: Option<String>,
    #[validate(required, range(min = 0.0))]
    calories: Option<f64>,
    #[validate(range(min = 0.0))]
    carbs: Option<f64>,
    #[validate(range(min = 0.0))]
    protein: Option<f64>,
    #[validate(range(min = 0.0))]
    fat: Option<f64>,
    #[validate(range(min = 0.0))]
    fiber: Option<f64>,
    #[validate(range(min = 0.0))]
    sugar: Option<f64>,
    #[validate(range(min = 0.0))]
    sodium: Option<f64>,
    #[validate(required)]
    meal: Option<Meal>,
    #[validate(range(min = 0.0))]
    serving_size: Option<f64>,
    date: Option<String>,
}

impl LogFoodRequest {
    fn into_new_entry(self) -> ApiResult<NewFoodLogEntry> {
        let date = parse_optional_date(self.date.as_deref(), "date", false)?;
        let user_id = required_user_id(self.user_id)?;
        let meal = self.meal.ok_or_else(|| AppError::validation("meal is required"))?;

        let mut entry = NewFoodLogEntry::new(
            user_id,
            self.food_name.unwrap_or_default(),
            self.calories.unwrap_or_default(),
            meal,
        );
        entry.carbs = self.carbs.unwrap_or_default();
        entry.protein = self.protein.unwrap_or_default();
        entry.fat = self.fat.unwrap_or_default();
        entry.fiber = self.fiber.unwrap_or_default();
        entry.sugar = self.sugar.unwrap_or_default();
        entry.sodium = self.sodium.unwrap_or_default();
        if let Some(serving_size) = self.serving_size {
            entry.serving_size = serving_size;
        }
        entry.date = date;
        Ok(entry)
    }
}

async fn log_food_handler(
    State(state): State<AppState>,
    payload: Result<Json<LogFoodRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<FoodLogEntry>)> {
    let entry = validated(payload)?.into_new_entry()?;
    let saved = state.db.save_entry(entry).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

#[derive(Debug, Deserialize)]
struct HistoryParams {
    user_id: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    limit: Option<usize>,
}

async fn history_handler(
    State(state): State<AppState>,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> ApiResult<Json<Vec<FoodLogEntry>>> {
    let Query(params) = params.map_err(|rejection| AppError::validation(rejection.body_text()))?;

    let mut query = HistoryQuery::for_user(required_user_id(params.user_id)?);
    query.start = parse_optional_date(params.start_date.as_deref(), "start_date", false)?;
    query.end = parse_optional_date(params.end_date.as_deref(), "end_date", true)?;
    if let Some(limit) = params.limit {
        query.limit = limit;
    }

    Ok(Json(state.db.list_history(&query).await?))
}

#[derive(Debug, Deserialize)]
struct OwnerParams {
    user_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
struct UpdateFoodRequest {
    #[validate(length(min = 1, max = 200))]
    food_name: Option<String>,
    #[validate(range(min = 0.0))]
    calories: Option<f64>,
    #[validate(range(min = 0.0))]
    carbs: Option<f64>,
    #[validate(range(min = 0.0))]
    protein: Option<f64>,
    #[validate(range(min = 0.0))]
    fat: Option<f64>,
    #[validate(range(min = 0.0))]
    fiber: Option<f64>,
    #[validate(range(min = 0.0))]
    sugar: Option<f64>,
    #[validate(range(min = 0.0))]
    sodium: Option<f64>,
    meal: Option<Meal>,
    #[validate(range(min = 0.0))]
    serving_size: Option<f64>,
    date: Option<String>,
}

impl UpdateFoodRequest {
    fn into_update(self) -> ApiResult<FoodLogUpdate> {
        let update = FoodLogUpdate {
            date: parse_optional_date(self.date.as_deref(), "date", false)?,
            food_name: self.food_name,
            calories: self.calories,
            carbs: self.carbs,
            protein: self.protein,
            fat: self.fat,
            fiber: self.fiber,
            sugar: self.sugar,
            sodium: self.sodium,
            meal: self.meal,
            serving_size: self.serving_size,
        };
        if update.is_empty() {
            return Err(AppError::validation("No fields to update"));
        }
        Ok(update)
    }
}

async fn update_food_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    owner: Result<Query<OwnerParams>, QueryRejection>,
    payload: Result<Json<UpdateFoodRequest>, JsonRejection>,
) -> ApiResult<Json<FoodLogEntry>> {
    let Query(owner) = owner.map_err(|rejection| AppError::validation(rejection.body_text()))?;
    let user_id = required_user_id(owner.user_id)?;
    let update = validated(payload)?.into_update()?;

    state
        .db
        .update_entry(&id, &user_id, update)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Food log entry {}", id)))
}

async fn delete_food_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    owner: Result<Query<OwnerParams>, QueryRejection>,
) -> ApiResult<Json<StatusResponse>> {
    let Query(owner) = owner.map_err(|rejection| AppError::validation(rejection.body_text()))?;
    let user_id = required_user_id(owner.user_id)?;

    if state.db.delete_entry(&id, &user_id).await? {
        Ok(Json(StatusResponse { status: "deleted" }))
    } else {
        Err(AppError::not_found(format!("Food log entry {}", id)))
    }
}
