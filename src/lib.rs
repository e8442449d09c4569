// Library exports for Seatline
// This allows integration tests and external code to use Seatline modules

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod reservations;
pub mod routes;
pub mod seating;
pub mod state;
