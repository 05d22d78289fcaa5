use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::form::{parse_date, parse_optional_date};
use crate::{
    BoxedStore, Forecast, Planner, PlannerError, RefreshSummary, Resource, ResourceAvailability,
    ResourceForm, WorkItem, WorkItemForm,
};

pub type SharedPlanner = Arc<RwLock<Planner<BoxedStore>>>;

#[derive(Clone)]
pub struct AppState {
    planner: SharedPlanner,
}

impl AppState {
    pub fn new(planner: Planner<BoxedStore>) -> Self {
        Self {
            planner: Arc::new(RwLock::new(planner)),
        }
    }

    fn planner(&self) -> SharedPlanner {
        self.planner.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
    Internal(String),
}

impl From<PlannerError> for ApiError {
    fn from(value: PlannerError) -> Self {
        match value {
            PlannerError::InvalidInput { .. } => ApiError::Invalid(value.to_string()),
            PlannerError::NotFound { .. } => ApiError::NotFound(value.to_string()),
            PlannerError::Constraint(_) => ApiError::Conflict(value.to_string()),
            PlannerError::Storage(_) => {
                tracing::error!(error = %value, "storage failure");
                ApiError::Internal(value.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct DatePayload {
    date: String,
}

#[derive(Debug, Deserialize)]
struct AvailabilityQuery {
    start: String,
    #[serde(default)]
    end: String,
    estimate: f64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/resources", get(list_resources).post(create_resource))
        .route(
            "/resources/:id",
            get(get_resource).put(update_resource).delete(delete_resource),
        )
        .route("/resources/:id/pto", post(add_pto))
        .route("/resources/:id/pto/:date", delete(remove_pto))
        .route("/holidays", get(list_holidays).post(add_holiday))
        .route("/holidays/:date", delete(remove_holiday))
        .route("/work-items", get(list_work_items).post(create_work_item))
        .route(
            "/work-items/:id",
            get(get_work_item)
                .put(update_work_item)
                .delete(delete_work_item),
        )
        .route("/forecast", post(forecast))
        .route("/availability", get(availability))
        .route("/refresh", post(refresh))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, planner: Planner<BoxedStore>) -> std::io::Result<()> {
    let state = AppState::new(planner);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "workload planner HTTP API listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_resources(State(state): State<AppState>) -> Result<Json<Vec<Resource>>, ApiError> {
    let planner = state.planner();
    let resources = planner.read().resources()?;
    Ok(Json(resources))
}

async fn get_resource(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Resource>, ApiError> {
    let planner = state.planner();
    let resource = planner.read().resource(&id)?;
    Ok(Json(resource))
}

async fn create_resource(
    State(state): State<AppState>,
    Json(form): Json<ResourceForm>,
) -> Result<(StatusCode, Json<Resource>), ApiError> {
    let resource = form.parse()?;
    let planner = state.planner();
    let created = planner.write().create_resource(resource)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_resource(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<ResourceForm>,
) -> Result<Json<Resource>, ApiError> {
    let mut resource = form.parse()?;
    if resource.id != id {
        return Err(ApiError::Invalid(
            "resource id in payload does not match path parameter".into(),
        ));
    }
    let planner = state.planner();
    let updated = {
        let mut guard = planner.write();
        let existing = guard.resource(&id)?;
        resource.pto = existing.pto;
        guard.save_resource(resource)?
    };
    Ok(Json(updated))
}

async fn delete_resource(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let planner = state.planner();
    planner.write().delete_resource(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_pto(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<DatePayload>,
) -> Result<Json<Resource>, ApiError> {
    let date = parse_date("date", &payload.date)?;
    let planner = state.planner();
    let resource = {
        let mut guard = planner.write();
        guard.add_pto(&id, date)?;
        guard.resource(&id)?
    };
    Ok(Json(resource))
}

async fn remove_pto(
    State(state): State<AppState>,
    Path((id, date)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let date = parse_date("date", &date)?;
    let planner = state.planner();
    if !planner.write().remove_pto(&id, date)? {
        return Err(ApiError::NotFound(format!(
            "resource '{id}' has no PTO on {date}"
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn list_holidays(State(state): State<AppState>) -> Json<Vec<NaiveDate>> {
    let planner = state.planner();
    let holidays = planner.read().holidays();
    Json(holidays)
}

async fn add_holiday(
    State(state): State<AppState>,
    Json(payload): Json<DatePayload>,
) -> Result<(StatusCode, Json<Vec<NaiveDate>>), ApiError> {
    let date = parse_date("date", &payload.date)?;
    let planner = state.planner();
    let holidays = {
        let mut guard = planner.write();
        guard.add_holiday(date)?;
        guard.holidays()
    };
    Ok((StatusCode::CREATED, Json(holidays)))
}

async fn remove_holiday(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<StatusCode, ApiError> {
    let date = parse_date("date", &date)?;
    let planner = state.planner();
    if !planner.write().remove_holiday(date)? {
        return Err(ApiError::NotFound(format!("{date} is not a holiday")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn list_work_items(State(state): State<AppState>) -> Result<Json<Vec<WorkItem>>, ApiError> {
    let planner = state.planner();
    let items = planner.read().work_items()?;
    Ok(Json(items))
}

async fn get_work_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<WorkItem>, ApiError> {
    let planner = state.planner();
    let item = planner.read().work_item(id)?;
    Ok(Json(item))
}

async fn create_work_item(
    State(state): State<AppState>,
    Json(form): Json<WorkItemForm>,
) -> Result<(StatusCode, Json<WorkItem>), ApiError> {
    let planner = state.planner();
    let created = {
        let mut guard = planner.write();
        let draft = form.parse(guard.reference_date())?;
        guard.create_work_item(draft)?
    };
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_work_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(form): Json<WorkItemForm>,
) -> Result<Json<WorkItem>, ApiError> {
    let planner = state.planner();
    let updated = {
        let mut guard = planner.write();
        let draft = form.parse(guard.reference_date())?;
        guard.update_work_item(id, draft)?
    };
    Ok(Json(updated))
}

async fn delete_work_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let planner = state.planner();
    planner.write().delete_work_item(id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn forecast(
    State(state): State<AppState>,
    Json(form): Json<WorkItemForm>,
) -> Result<Json<Forecast>, ApiError> {
    let planner = state.planner();
    let forecast = {
        let guard = planner.read();
        let draft = form.parse(guard.reference_date())?;
        guard.forecast(&draft)?
    };
    Ok(Json(forecast))
}

async fn availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Vec<ResourceAvailability>>, ApiError> {
    let start = parse_date("start", &query.start)?;
    let end = parse_optional_date("end", &query.end)?.unwrap_or(start);
    let planner = state.planner();
    let rows = planner.read().availability(start, end, query.estimate)?;
    Ok(Json(rows))
}

async fn refresh(State(state): State<AppState>) -> Result<Json<RefreshSummary>, ApiError> {
    let planner = state.planner();
    let summary = planner.write().refresh()?;
    Ok(Json(summary))
}
