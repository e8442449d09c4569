use askama::Template;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::auth::{self, session};
use crate::db::models::Reservation;
use crate::error::AppResult;
use crate::extractors::MaybeAdmin;
use crate::routes::home::Html;
use crate::seating::{seat_label, SeatingChart};
use crate::state::AppState;

pub const INVALID_CREDENTIALS: &str = "invalid credentials.";
pub const RESERVATION_REMOVED: &str = "reservation removed.";
pub const RESERVATION_NOT_FOUND: &str = "reservation not found.";

// --- View structs ---

pub struct ReservationView {
    pub id: i64,
    pub passenger_name: String,
    pub seat_label: String,
    pub ticket_code: String,
    pub created: String,
}

impl From<Reservation> for ReservationView {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id,
            seat_label: seat_label(r.seat_row, r.seat_col).unwrap_or_else(|| "?".to_string()),
            passenger_name: r.passenger_name,
            ticket_code: r.e_ticket_number,
            created: format_created(&r.created),
        }
    }
}

// --- Templates ---

#[derive(Template)]
#[template(path = "pages/admin_login.html")]
pub struct AdminLoginTemplate {
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "pages/admin.html")]
pub struct AdminDashboardTemplate {
    pub username: String,
    pub message: Option<String>,
    pub reservations: Vec<ReservationView>,
    pub chart: SeatingChart,
    pub sales: u64,
}

// --- Forms ---

#[derive(Deserialize)]
pub struct AdminForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub reservation_id: String,
}

// --- Router ---

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin", get(admin_page).post(admin_submit))
        .route("/admin/logout", post(logout))
}

// --- Handlers ---

/// GET /admin — dashboard for a signed-in admin, login form otherwise
async fn admin_page(
    State(state): State<AppState>,
    MaybeAdmin(admin): MaybeAdmin,
) -> AppResult<Response> {
    match admin {
        Some(admin) => Ok(dashboard(&state, admin.username, None)?.into_response()),
        None => Ok(login_page(None).into_response()),
    }
}

/// POST /admin — sign in and/or act on a reservation
///
/// Submitted credentials always take precedence over an existing session so
/// a wrong password never falls through to the dashboard.
async fn admin_submit(
    State(state): State<AppState>,
    MaybeAdmin(current): MaybeAdmin,
    Form(form): Form<AdminForm>,
) -> AppResult<Response> {
    let username = form.username.trim();
    let password = form.password.trim();

    let (admin_name, new_cookie) = if !username.is_empty() {
        let Some(admin) = auth::authenticate(&state.db, username, password)? else {
            tracing::warn!("Failed admin login for {}", username);
            return Ok(login_page(Some(INVALID_CREDENTIALS)).into_response());
        };

        if let Some(previous) = &current {
            session::delete_session(&state.db, &previous.token)?;
        }

        let auth_config = &state.config.auth;
        let token = session::create_session(&state.db, &admin.username, auth_config.session_hours)?;
        let cookie = session::session_cookie(
            &auth_config.cookie_name,
            &session::sign(&auth_config.secret_key, &token),
            auth_config.session_hours,
        );
        tracing::info!("Admin {} signed in", admin.username);
        (admin.username, Some(cookie))
    } else if let Some(admin) = current {
        (admin.username, None)
    } else {
        return Ok(login_page(Some(INVALID_CREDENTIALS)).into_response());
    };

    let message = if form.action == "delete" {
        Some(delete_reservation(&state, &admin_name, &form.reservation_id)?)
    } else {
        None
    };

    let page = dashboard(&state, admin_name, message)?;
    Ok(match new_cookie {
        Some(cookie) => ([(header::SET_COOKIE, cookie)], page).into_response(),
        None => page.into_response(),
    })
}

/// POST /admin/logout — revoke the session and clear the cookie
async fn logout(
    State(state): State<AppState>,
    MaybeAdmin(current): MaybeAdmin,
) -> AppResult<Response> {
    if let Some(admin) = current {
        session::delete_session(&state.db, &admin.token)?;
        tracing::info!("Admin {} signed out", admin.username);
    }

    Ok((
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, "/admin".to_string()),
            (
                header::SET_COOKIE,
                session::clear_session_cookie(&state.config.auth.cookie_name),
            ),
        ],
        "",
    )
        .into_response())
}

// --- Helpers ---

fn login_page(error: Option<&str>) -> Html<AdminLoginTemplate> {
    Html(AdminLoginTemplate {
        error: error.map(str::to_string),
    })
}

fn dashboard(
    state: &AppState,
    username: String,
    message: Option<&str>,
) -> AppResult<Html<AdminDashboardTemplate>> {
    let reservations = state
        .reservations
        .list_newest_first()?
        .into_iter()
        .map(ReservationView::from)
        .collect();
    let chart = state.reservations.chart()?;
    let sales = state.reservations.total_sales(&state.prices)?;

    Ok(Html(AdminDashboardTemplate {
        username,
        message: message.map(str::to_string),
        reservations,
        chart,
        sales,
    }))
}

fn delete_reservation(state: &AppState, admin: &str, raw_id: &str) -> AppResult<&'static str> {
    let removed = match raw_id.trim().parse::<i64>() {
        Ok(id) => match state.reservations.get(id)? {
            Some(reservation) => {
                let removed = state.reservations.delete(id)?;
                if removed {
                    tracing::info!(
                        "Admin {} removed reservation {} ({}, seat {})",
                        admin,
                        id,
                        reservation.e_ticket_number,
                        seat_label(reservation.seat_row, reservation.seat_col)
                            .unwrap_or_default()
                    );
                }
                removed
            }
            None => false,
        },
        Err(_) => false,
    };

    Ok(if removed {
        RESERVATION_REMOVED
    } else {
        RESERVATION_NOT_FOUND
    })
}

/// SQLite `datetime('now')` text to a compact display form.
fn format_created(raw: &str) -> String {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.format("%b %-d, %H:%M UTC").to_string())
        .unwrap_or_else(|_| raw.to_string())
}
