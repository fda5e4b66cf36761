use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

/// Identity of the caller, resolved once per request from the session cookie.
/// Every meal operation takes one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: Uuid,
}

impl AuthContext {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let cookie_name = &state.config.session.cookie_name;

        let Some(token) = jar.get(cookie_name).map(|c| c.value().to_owned()) else {
            warn!("missing session cookie");
            return Err(AppError::Unauthorized);
        };

        match state.users.find_user_by_session(&token).await? {
            Some(user) => Ok(AuthContext::new(user.id)),
            None => {
                warn!("unknown session token");
                Err(AppError::Unauthorized)
            }
        }
    }
}
