use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{MealDetails, MealListResponse, MealRequest},
    metrics::MealMetrics,
    services,
};
use crate::{
    app::API_PREFIX,
    error::{AppError, AppJson, AppPath},
    state::AppState,
    users::extractors::AuthContext,
};

pub fn meals_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals).post(create_meal))
        .route("/meals/metrics", get(get_metrics))
        .route(
            "/meals/:id",
            get(get_meal).put(update_meal).delete(delete_meal),
        )
}

// --- handlers ---

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> Result<Json<MealListResponse>, AppError> {
    let meals = services::list_meals(state.meals.as_ref(), &ctx).await?;
    Ok(Json(MealListResponse {
        meals: meals.into_iter().map(Into::into).collect(),
    }))
}

#[instrument(skip(state))]
pub async fn get_meal(
    State(state): State<AppState>,
    ctx: AuthContext,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MealDetails>, AppError> {
    let meal = services::get_meal(state.meals.as_ref(), &ctx, id).await?;
    Ok(Json(MealDetails { meal: meal.into() }))
}

#[instrument(skip(state))]
pub async fn get_metrics(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> Result<Json<MealMetrics>, AppError> {
    let metrics = services::meal_metrics(state.meals.as_ref(), &ctx).await?;
    Ok(Json(metrics))
}

#[instrument(skip(state, body))]
pub async fn create_meal(
    State(state): State<AppState>,
    ctx: AuthContext,
    AppJson(body): AppJson<MealRequest>,
) -> Result<impl IntoResponse, AppError> {
    let meal = services::create_meal(state.meals.as_ref(), &ctx, body.into()).await?;
    let location = format!("{API_PREFIX}/meals/{}", meal.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(MealDetails { meal: meal.into() }),
    ))
}

#[instrument(skip(state, body))]
pub async fn update_meal(
    State(state): State<AppState>,
    ctx: AuthContext,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<MealRequest>,
) -> Result<StatusCode, AppError> {
    services::update_meal(state.meals.as_ref(), &ctx, id, body.into()).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    ctx: AuthContext,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    services::delete_meal(state.meals.as_ref(), &ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
