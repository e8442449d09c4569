// Reservation store - every database side effect for bookings lives here
pub mod store;

pub use store::{ReservationStore, ReserveError, MAX_TICKET_ATTEMPTS};
