use axum_extra::extract::cookie::{Cookie, SameSite};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::repo_types::{NewUser, User};
use crate::config::SessionConfig;
use crate::error::AppError;
use crate::store::{StoreError, UserStore};

const MAX_NAME_LEN: usize = 255;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Builds the cookie that carries the session token back to the client.
pub fn session_cookie(cfg: &SessionConfig, token: String) -> Cookie<'static> {
    Cookie::build((cfg.cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(cfg.secure)
        .max_age(time::Duration::days(cfg.ttl_days))
        .build()
}

/// Picks the session token for a new user: the one the client already holds
/// when it is well-formed and unclaimed, otherwise a fresh one.
async fn resolve_session_token(
    users: &dyn UserStore,
    presented: Option<&str>,
) -> Result<String, AppError> {
    if let Some(token) = presented {
        if Uuid::parse_str(token).is_ok() && users.find_user_by_session(token).await?.is_none() {
            debug!("reusing presented session token");
            return Ok(token.to_string());
        }
    }
    Ok(Uuid::new_v4().to_string())
}

/// Registers a user and returns it with the session token now bound to it.
pub async fn register(
    users: &dyn UserStore,
    presented_session: Option<&str>,
    name: &str,
    email: &str,
) -> Result<(User, String), AppError> {
    let name = name.trim();
    let email = email.trim().to_lowercase();

    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        warn!("invalid name");
        return Err(AppError::Validation("Invalid name".into()));
    }

    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::Validation("Invalid email".into()));
    }

    // Ensure email is not taken
    if users.find_user_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let mut session_id = resolve_session_token(users, presented_session).await?;
    let new_user = |session_id: &str| NewUser {
        name: name.to_string(),
        email: email.clone(),
        session_id: session_id.to_string(),
    };

    // A concurrent registration may claim the presented token between the
    // lookup and the insert; fall back to a fresh token once.
    let user = match users.create_user(new_user(&session_id)).await {
        Err(StoreError::AlreadyExists {
            entity: "Session", ..
        }) => {
            warn!("presented session token claimed concurrently; issuing a fresh one");
            session_id = Uuid::new_v4().to_string();
            users.create_user(new_user(&session_id)).await?
        }
        other => other?,
    };

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((user, session_id))
}
