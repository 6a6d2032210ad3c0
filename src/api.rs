use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use utoipa::{OpenApi, ToSchema};

use crate::loader::LoadReport;
use crate::normalize::{CategoricalField, NumericField, Observation};
use crate::query::{
    Aggregates, CategoryCount, CategoryDistribution, FieldSummary, LogEntry, QueryError,
    QueryResult, SeriesPoint, WindRoseSector,
};
use crate::services::{DatasetInfo, DatasetService, DatasetStatus, QueryParams};

const DEFAULT_LATEST_LIMIT: usize = 10;
const MAX_LATEST_LIMIT: usize = 500;

#[derive(Clone)]
pub struct AppState {
    pub dataset_service: DatasetService,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct LatestParams {
    pub limit: Option<usize>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(e: QueryError) -> ApiError {
    warn!("Rejected query: {}", e);
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

/// Unwrap query parameters, answering a malformed query string with
/// the same JSON error body as any other rejected query
fn query_params<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    match params {
        Ok(Query(params)) => Ok(params),
        Err(rejection) => {
            let error = rejection.body_text();
            warn!("Rejected query string: {}", error);
            Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error })))
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, dataset_info, observations, summary, reports, series, latest, reload),
    components(schemas(
        HealthResponse,
        ErrorResponse,
        DatasetInfo,
        DatasetStatus,
        LoadReport,
        QueryResult,
        Observation,
        Aggregates,
        FieldSummary,
        CategoryDistribution,
        CategoryCount,
        WindRoseSector,
        LogEntry,
        SeriesPoint,
        NumericField,
        CategoricalField
    )),
    tags((name = "metar-explorer", description = "Normalized METAR observation queries"))
)]
pub struct ApiDoc;

pub fn generate_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/dataset", get(dataset_info))
        .route("/observations", get(observations))
        .route("/summary", get(summary))
        .route("/reports", get(reports))
        .route("/series", get(series))
        .route("/latest", get(latest))
        .route("/reload", post(reload))
        .with_state(state);

    Router::new().nest("/api/v1", api_routes)
}

#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
#[instrument(skip(_state))]
async fn health(State(_state): State<AppState>) -> impl IntoResponse {
    debug!("Health check requested");
    let response = HealthResponse {
        status: "healthy".to_string(),
    };
    (StatusCode::OK, Json(response))
}

#[utoipa::path(
    get,
    path = "/api/v1/dataset",
    responses((status = 200, description = "Current dataset bounds and load diagnostics", body = DatasetInfo))
)]
#[instrument(skip(state))]
async fn dataset_info(State(state): State<AppState>) -> Json<DatasetInfo> {
    let info = state.dataset_service.info();
    debug!(
        "Dataset has {} observations ({:?} to {:?})",
        info.total_observations, info.min_date, info.max_date
    );
    Json(info)
}

#[utoipa::path(
    get,
    path = "/api/v1/observations",
    params(
        ("start" = Option<String>, Query, description = "Inclusive start date (YYYY-MM-DD)"),
        ("end" = Option<String>, Query, description = "Inclusive end date (YYYY-MM-DD)"),
        ("hours" = Option<String>, Query, description = "Comma separated UTC hours, e.g. 0,6,12"),
        ("fields" = Option<String>, Query, description = "Comma separated numeric fields to summarize")
    ),
    responses(
        (status = 200, description = "Filtered observations and aggregates", body = QueryResult),
        (status = 400, description = "Invalid range, hour or field", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
async fn observations(
    State(state): State<AppState>,
    params: Result<Query<QueryParams>, QueryRejection>,
) -> Result<Json<QueryResult>, ApiError> {
    let params = query_params(params)?;
    let result = state.dataset_service.query(&params).map_err(bad_request)?;
    info!(
        "Query returned {} observations",
        result.aggregates.observation_count
    );
    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/api/v1/summary",
    params(
        ("start" = Option<String>, Query, description = "Inclusive start date (YYYY-MM-DD)"),
        ("end" = Option<String>, Query, description = "Inclusive end date (YYYY-MM-DD)"),
        ("hours" = Option<String>, Query, description = "Comma separated UTC hours"),
        ("fields" = Option<String>, Query, description = "Comma separated numeric fields to summarize")
    ),
    responses(
        (status = 200, description = "Aggregates for the selection", body = Aggregates),
        (status = 400, description = "Invalid range, hour or field", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
async fn summary(
    State(state): State<AppState>,
    params: Result<Query<QueryParams>, QueryRejection>,
) -> Result<Json<Aggregates>, ApiError> {
    let params = query_params(params)?;
    let aggregates = state.dataset_service.summary(&params).map_err(bad_request)?;
    Ok(Json(aggregates))
}

#[utoipa::path(
    get,
    path = "/api/v1/reports",
    params(
        ("start" = Option<String>, Query, description = "Inclusive start date (YYYY-MM-DD)"),
        ("end" = Option<String>, Query, description = "Inclusive end date (YYYY-MM-DD)"),
        ("hours" = Option<String>, Query, description = "Comma separated UTC hours")
    ),
    responses(
        (status = 200, description = "Raw report log for the selection", body = [LogEntry]),
        (status = 400, description = "Invalid range or hour", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
async fn reports(
    State(state): State<AppState>,
    params: Result<Query<QueryParams>, QueryRejection>,
) -> Result<Json<Vec<LogEntry>>, ApiError> {
    let params = query_params(params)?;
    let entries = state.dataset_service.reports(&params).map_err(bad_request)?;
    Ok(Json(entries))
}

#[utoipa::path(
    get,
    path = "/api/v1/series",
    params(
        ("start" = Option<String>, Query, description = "Inclusive start date (YYYY-MM-DD)"),
        ("end" = Option<String>, Query, description = "Inclusive end date (YYYY-MM-DD)"),
        ("hours" = Option<String>, Query, description = "Comma separated UTC hours"),
        ("field" = Option<String>, Query, description = "Numeric field, default temperature_c")
    ),
    responses(
        (status = 200, description = "Chart points for one field", body = [SeriesPoint]),
        (status = 400, description = "Invalid range, hour or field", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
async fn series(
    State(state): State<AppState>,
    params: Result<Query<QueryParams>, QueryRejection>,
) -> Result<Json<Vec<SeriesPoint>>, ApiError> {
    let params = query_params(params)?;
    let points = state.dataset_service.series(&params).map_err(bad_request)?;
    Ok(Json(points))
}

#[utoipa::path(
    get,
    path = "/api/v1/latest",
    params(("limit" = Option<usize>, Query, description = "Number of records, default 10")),
    responses(
        (status = 200, description = "Most recent observations, oldest first", body = [Observation]),
        (status = 400, description = "Invalid limit", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
async fn latest(
    State(state): State<AppState>,
    params: Result<Query<LatestParams>, QueryRejection>,
) -> Result<Json<Vec<Observation>>, ApiError> {
    let limit = query_params(params)?
        .limit
        .unwrap_or(DEFAULT_LATEST_LIMIT)
        .min(MAX_LATEST_LIMIT);
    Ok(Json(state.dataset_service.latest(limit)))
}

#[utoipa::path(
    post,
    path = "/api/v1/reload",
    responses((status = 200, description = "Dataset reloaded and published", body = DatasetInfo))
)]
#[instrument(skip(state))]
async fn reload(State(state): State<AppState>) -> Json<DatasetInfo> {
    info!("Reload requested");
    let snapshot = state.dataset_service.reload().await;
    Json(snapshot.info())
}
