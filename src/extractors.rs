use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::auth::session;
use crate::error::AppError;
use crate::state::AppState;

/// An admin holding a valid session cookie.
#[derive(Debug, Clone)]
pub struct CurrentAdmin {
    pub username: String,
    pub token: String,
}

/// Extractor that requires an admin session.
/// Returns 401 if the cookie is missing, badly signed, expired or revoked.
impl FromRequestParts<AppState> for CurrentAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = &state.config.auth;
        let cookie = session::get_cookie_value(&parts.headers, &auth.cookie_name)
            .ok_or(AppError::Unauthorized)?;
        let token = session::verify(&auth.secret_key, cookie).ok_or_else(|| {
            tracing::warn!("Rejected admin cookie with a bad signature");
            AppError::Unauthorized
        })?;

        let found = session::find_session(&state.db, token)?.ok_or(AppError::Unauthorized)?;

        Ok(CurrentAdmin {
            username: found.username,
            token: found.token,
        })
    }
}

/// Optional admin extractor: None instead of 401 when not signed in.
/// Database failures still surface as errors.
pub struct MaybeAdmin(pub Option<CurrentAdmin>);

impl FromRequestParts<AppState> for MaybeAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match CurrentAdmin::from_request_parts(parts, state).await {
            Ok(admin) => Ok(MaybeAdmin(Some(admin))),
            Err(AppError::Unauthorized) => Ok(MaybeAdmin(None)),
            Err(e) => Err(e),
        }
    }
}
