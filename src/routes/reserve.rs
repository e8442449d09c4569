use askama::Template;
use axum::extract::State;
use axum::Form;
use serde::Deserialize;

use crate::db::models::Reservation;
use crate::error::AppResult;
use crate::reservations::ReserveError;
use crate::routes::home::Html;
use crate::seating::{seat_label, SeatPosition, SeatingChart};
use crate::state::AppState;

pub const NAME_REQUIRED: &str = "please enter first and last name.";
pub const SEAT_OFF_CHART: &str = "pick a seat within the chart.";
pub const SEAT_TAKEN: &str = "seat already reserved.";

#[derive(Template)]
#[template(path = "pages/reserve.html")]
pub struct ReserveTemplate {
    pub chart: SeatingChart,
    pub error: Option<String>,
    pub success: Option<String>,
    pub ticket_code: Option<String>,
    pub first_name: String,
    pub last_name: String,
}

impl ReserveTemplate {
    fn blank(chart: SeatingChart) -> Self {
        Self {
            chart,
            error: None,
            success: None,
            ticket_code: None,
            first_name: String::new(),
            last_name: String::new(),
        }
    }
}

#[derive(Deserialize)]
pub struct ReserveForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub seat_row: String,
    #[serde(default)]
    pub seat_col: String,
}

/// GET /reserve — empty booking form
pub async fn reserve_page(State(state): State<AppState>) -> AppResult<Html<ReserveTemplate>> {
    let chart = state.reservations.chart()?;
    Ok(Html(ReserveTemplate::blank(chart)))
}

/// POST /reserve — validate and book
pub async fn reserve_submit(
    State(state): State<AppState>,
    Form(form): Form<ReserveForm>,
) -> AppResult<Html<ReserveTemplate>> {
    let first = form.first_name.trim();
    let last = form.last_name.trim();

    let outcome = book(&state, first, last, &form.seat_row, &form.seat_col)?;

    // Chart is rebuilt after the write so a fresh booking shows as taken
    let mut page = ReserveTemplate::blank(state.reservations.chart()?);
    match outcome {
        Ok(reservation) => {
            page.success = Some(format!("seat {} booked.", seat_label_of(&reservation)));
            page.ticket_code = Some(reservation.e_ticket_number);
        }
        Err(message) => {
            page.error = Some(message.to_string());
            page.first_name = first.to_string();
            page.last_name = last.to_string();
        }
    }

    Ok(Html(page))
}

/// Inner result is the user-facing validation message on failure.
fn book(
    state: &AppState,
    first: &str,
    last: &str,
    seat_row: &str,
    seat_col: &str,
) -> AppResult<Result<Reservation, &'static str>> {
    if first.is_empty() || last.is_empty() {
        return Ok(Err(NAME_REQUIRED));
    }

    let Some(seat) = SeatPosition::from_form(seat_row, seat_col) else {
        return Ok(Err(SEAT_OFF_CHART));
    };

    if state.reservations.is_taken(seat)? {
        return Ok(Err(SEAT_TAKEN));
    }

    let full_name = format!("{} {}", first, last);
    match state.reservations.reserve(&full_name, seat) {
        Ok(reservation) => {
            tracing::info!(
                "Booked seat {} with ticket {}",
                seat,
                reservation.e_ticket_number
            );
            Ok(Ok(reservation))
        }
        Err(ReserveError::SeatTaken(_)) => {
            tracing::info!("Seat {} was taken by a concurrent booking", seat);
            Ok(Err(SEAT_TAKEN))
        }
        Err(ReserveError::Store(e)) => Err(e.into()),
    }
}

fn seat_label_of(reservation: &Reservation) -> String {
    seat_label(reservation.seat_row, reservation.seat_col).unwrap_or_default()
}
