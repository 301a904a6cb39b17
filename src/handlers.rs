use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Json, response::IntoResponse};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    AppState,
    catalog::{FilterGroup, filter_options},
    dashboard::{DashboardTab, DashboardView, build_dashboard},
    error::{ApiError, StudioError},
    filter::{FilterCategory, FilterCriterion},
    models::ClassCard,
    preferences::DisplayPreferences,
    session::{BookingView, ClassListing},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct QueryUpdate {
    pub query: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CriterionToggle {
    pub category: FilterCategory,
    pub value: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectRequest {
    pub class_id: u32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DarkModeUpdate {
    pub dark_mode: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DashboardQuery {
    pub tab: Option<String>,
}

#[utoipa::path(get, path = "/", tag = "studio")]
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Studio Booking API",
        "endpoints": {
            "/dashboard": "Member dashboard",
            "/classes": "Filtered class list and booking state",
            "/classes.ical": "Download visible classes as iCal file",
            "/booking": "Current booking flow",
            "/preferences": "Display preferences"
        }
    }))
}

#[utoipa::path(get, path = "/healthz/live", tag = "studio")]
pub async fn healthz_live() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(
    get,
    path = "/healthz/ready",
    responses(
        (status = 200, description = "Catalog loaded"),
        (status = 503, description = "Catalog still loading or failed to load")
    ),
    tag = "studio"
)]
pub async fn healthz_ready(State(state): State<AppState>) -> impl IntoResponse {
    let status = match state.session.catalog().await {
        Ok(_) => return (StatusCode::OK, Json(serde_json::json!({"status": "ok"}))),
        Err(StudioError::CatalogLoading) => "loading",
        Err(_) => "error",
    };
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(serde_json::json!({"status": status})),
    )
}

#[utoipa::path(
    get,
    path = "/classes",
    responses((status = 200, description = "Visible classes", body = ClassListing)),
    tag = "classes"
)]
pub async fn list_classes(State(state): State<AppState>) -> Json<ClassListing> {
    Json(state.session.listing().await)
}

#[utoipa::path(
    get,
    path = "/classes/options",
    responses(
        (status = 200, description = "Filter panel options", body = [FilterGroup]),
        (status = 503, description = "Catalog still loading")
    ),
    tag = "classes"
)]
pub async fn get_filter_options(
    State(state): State<AppState>,
) -> Result<Json<Vec<FilterGroup>>, ApiError> {
    let catalog = state.session.catalog().await?;
    Ok(Json(filter_options(&catalog)))
}

#[utoipa::path(
    get,
    path = "/classes/{id}",
    params(("id" = u32, Path, description = "Class id")),
    responses(
        (status = 200, description = "Class details", body = ClassCard),
        (status = 404, description = "Unknown class")
    ),
    tag = "classes"
)]
pub async fn get_class(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<ClassCard>, ApiError> {
    Ok(Json(state.session.class(id).await?))
}

#[utoipa::path(
    put,
    path = "/classes/query",
    request_body = QueryUpdate,
    responses((status = 200, description = "Visible classes", body = ClassListing)),
    tag = "classes"
)]
pub async fn set_query(
    State(state): State<AppState>,
    Json(update): Json<QueryUpdate>,
) -> Json<ClassListing> {
    state.session.set_query(update.query).await;
    Json(state.session.listing().await)
}

#[utoipa::path(
    post,
    path = "/classes/filters/toggle",
    request_body = CriterionToggle,
    responses((status = 200, description = "Visible classes", body = ClassListing)),
    tag = "classes"
)]
pub async fn toggle_filter(
    State(state): State<AppState>,
    Json(toggle): Json<CriterionToggle>,
) -> Result<Json<ClassListing>, ApiError> {
    if toggle.value.is_empty() {
        return Err(ApiError::BadRequest("Filter value must not be empty".into()));
    }
    state
        .session
        .toggle_criterion(toggle.category, &toggle.value)
        .await;
    Ok(Json(state.session.listing().await))
}

#[utoipa::path(
    delete,
    path = "/classes/filters",
    responses((status = 200, description = "Visible classes", body = ClassListing)),
    tag = "classes"
)]
pub async fn clear_filters(State(state): State<AppState>) -> Json<ClassListing> {
    state.session.clear_all().await;
    Json(state.session.listing().await)
}

#[utoipa::path(
    delete,
    path = "/classes/filters/{tag}",
    params(("tag" = String, Path, description = "Active filter tag, e.g. type:Cardio")),
    responses(
        (status = 200, description = "Visible classes", body = ClassListing),
        (status = 400, description = "Malformed tag"),
        (status = 404, description = "Tag is not active")
    ),
    tag = "classes"
)]
pub async fn remove_filter(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> Result<Json<ClassListing>, ApiError> {
    let criterion: FilterCriterion = tag.parse()?;
    if !state.session.remove_criterion(&criterion).await {
        return Err(ApiError::NotFound(format!("Filter {criterion} is not active")));
    }
    Ok(Json(state.session.listing().await))
}

#[utoipa::path(
    get,
    path = "/classes.ical",
    responses(
        (status = 200, description = "iCal file", content_type = "text/calendar"),
        (status = 404, description = "No classes visible")
    ),
    tag = "classes"
)]
pub async fn get_ical(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let classes = state.session.visible().await;
    if classes.is_empty() {
        return Err(ApiError::NotFound("No classes found".into()));
    }

    let body = state.exporter.generate(&classes);
    Ok((
        StatusCode::OK,
        [
            ("content-type", "text/calendar"),
            ("content-disposition", "attachment; filename=classes.ics"),
        ],
        body,
    ))
}

#[utoipa::path(
    get,
    path = "/booking",
    responses((status = 200, description = "Booking flow", body = BookingView)),
    tag = "booking"
)]
pub async fn get_booking(State(state): State<AppState>) -> Json<BookingView> {
    Json(state.session.booking().await)
}

#[utoipa::path(
    post,
    path = "/booking/select",
    request_body = SelectRequest,
    responses(
        (status = 200, description = "Class selected", body = BookingView),
        (status = 404, description = "Unknown class, nothing changed"),
        (status = 503, description = "Catalog still loading")
    ),
    tag = "booking"
)]
pub async fn select_class(
    State(state): State<AppState>,
    Json(request): Json<SelectRequest>,
) -> Result<Json<BookingView>, ApiError> {
    state.session.select(request.class_id).await?;
    Ok(Json(state.session.booking().await))
}

#[utoipa::path(
    post,
    path = "/booking/dismiss",
    responses((status = 200, description = "Detail view closed", body = BookingView)),
    tag = "booking"
)]
pub async fn dismiss_booking(State(state): State<AppState>) -> Json<BookingView> {
    state.session.dismiss().await;
    Json(state.session.booking().await)
}

#[utoipa::path(
    post,
    path = "/booking/confirm",
    responses(
        (status = 200, description = "Class booked", body = BookingView),
        (status = 400, description = "No class selected"),
        (status = 409, description = "Class is full")
    ),
    tag = "booking"
)]
pub async fn confirm_booking(State(state): State<AppState>) -> Result<Json<BookingView>, ApiError> {
    state.session.book().await?;
    Ok(Json(state.session.booking().await))
}

#[utoipa::path(
    get,
    path = "/dashboard",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Dashboard", body = DashboardView),
        (status = 400, description = "Unknown tab")
    ),
    tag = "dashboard"
)]
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardView>, ApiError> {
    let tab = match query.tab.as_deref() {
        Some(raw) => raw.parse::<DashboardTab>().map_err(ApiError::BadRequest)?,
        None => DashboardTab::default(),
    };
    let catalog = state.session.catalog().await.unwrap_or_default();
    Ok(Json(build_dashboard(&state.profile, &catalog, tab)))
}

#[utoipa::path(
    get,
    path = "/preferences",
    responses((status = 200, description = "Display preferences", body = DisplayPreferences)),
    tag = "preferences"
)]
pub async fn get_preferences(State(state): State<AppState>) -> Json<DisplayPreferences> {
    Json(state.preferences.current())
}

#[utoipa::path(
    put,
    path = "/preferences/dark-mode",
    request_body = DarkModeUpdate,
    responses((status = 200, description = "Display preferences", body = DisplayPreferences)),
    tag = "preferences"
)]
pub async fn set_dark_mode(
    State(state): State<AppState>,
    Json(update): Json<DarkModeUpdate>,
) -> Result<Json<DisplayPreferences>, ApiError> {
    Ok(Json(state.preferences.set_dark_mode(update.dark_mode)?))
}

#[utoipa::path(
    post,
    path = "/preferences/dark-mode/toggle",
    responses((status = 200, description = "Display preferences", body = DisplayPreferences)),
    tag = "preferences"
)]
pub async fn toggle_dark_mode(
    State(state): State<AppState>,
) -> Result<Json<DisplayPreferences>, ApiError> {
    Ok(Json(state.preferences.toggle_dark_mode()?))
}
