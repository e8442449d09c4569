use askama::Template;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use crate::error::AppResult;
use crate::seating::SeatingChart;
use crate::state::AppState;

pub const PICK_AN_OPTION: &str = "pick an option.";

#[derive(Template)]
#[template(path = "pages/index.html")]
pub struct IndexTemplate {
    pub chart: SeatingChart,
    pub message: Option<String>,
}

/// Wrapper to render askama templates as axum responses
pub struct Html<T: Template>(pub T);

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Template render error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}

#[derive(Deserialize)]
pub struct MenuForm {
    #[serde(default)]
    pub menu_option: String,
}

/// GET / — seating chart and menu
pub async fn index(State(state): State<AppState>) -> AppResult<Html<IndexTemplate>> {
    let chart = state.reservations.chart()?;
    Ok(Html(IndexTemplate {
        chart,
        message: None,
    }))
}

/// POST / — route the menu choice to its flow
pub async fn choose(
    State(state): State<AppState>,
    Form(form): Form<MenuForm>,
) -> AppResult<Response> {
    match form.menu_option.trim() {
        "reserve" => return Ok(Redirect::to("/reserve").into_response()),
        "admin" => return Ok(Redirect::to("/admin").into_response()),
        _ => {}
    }

    let chart = state.reservations.chart()?;
    Ok(Html(IndexTemplate {
        chart,
        message: Some(PICK_AN_OPTION.to_string()),
    })
    .into_response())
}
