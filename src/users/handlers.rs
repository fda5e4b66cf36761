use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::instrument;

use super::{
    dto::{RegisterRequest, UserResponse},
    extractors::AuthContext,
    services,
};
use crate::{
    error::{AppError, AppJson},
    state::AppState,
};

pub fn users_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register))
        .route("/users/me", get(get_me))
}

/// POST /users: creates the user and binds the session cookie to it.
#[instrument(skip(state, jar, payload))]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<UserResponse>), AppError> {
    let cfg = &state.config.session;
    let presented = jar.get(&cfg.cookie_name).map(|c| c.value().to_owned());

    let (user, token) = services::register(
        state.users.as_ref(),
        presented.as_deref(),
        &payload.name,
        &payload.email,
    )
    .await?;

    let jar = jar.add(services::session_cookie(cfg, token));

    Ok((
        StatusCode::CREATED,
        jar,
        Json(UserResponse { user: user.into() }),
    ))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .users
        .find_user_by_id(ctx.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(Json(UserResponse { user: user.into() }))
}

#[cfg(test)]
mod me_tests {
    use super::super::dto::PublicUser;

    #[test]
    fn test_me_response_serialization() {
        let response = PublicUser {
            id: uuid::Uuid::new_v4(),
            name: "Jhon Doe".to_string(),
            email: "test@example.com".to_string(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("test@example.com"));
        assert!(json.contains("Jhon Doe"));
        assert!(!json.contains("session"));
    }
}
