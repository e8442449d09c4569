pub mod admin;
pub mod assets;
pub mod home;
pub mod reserve;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home::index).post(home::choose))
        .route(
            "/reserve",
            get(reserve::reserve_page).post(reserve::reserve_submit),
        )
        .route("/assets/{*path}", get(assets::serve))
        .merge(admin::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
