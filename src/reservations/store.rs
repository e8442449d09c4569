use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use thiserror::Error;

use crate::db::models::Reservation;
use crate::db::StoreError;
use crate::seating::ticket::generate_ticket_code;
use crate::seating::{PriceMatrix, SeatPosition, SeatingChart};
use crate::state::DbPool;

/// Upper bound on ticket regeneration before giving up.
pub const MAX_TICKET_ATTEMPTS: usize = 32;

#[derive(Debug, Error)]
pub enum ReserveError {
    #[error("Seat {0} is already reserved")]
    SeatTaken(SeatPosition),

    #[error(transparent)]
    Store(#[from] StoreError),
}

enum UniqueViolation {
    Seat,
    Ticket,
}

/// SQLite-backed reservation records.
#[derive(Clone)]
pub struct ReservationStore {
    pool: DbPool,
}

impl ReservationStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Raw (row, col) pairs as stored.
    pub fn seat_coordinates(&self) -> Result<Vec<(i64, i64)>, StoreError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare("SELECT seat_row, seat_col FROM reservations")?;
        let seats = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(seats)
    }

    pub fn reserved_positions(&self) -> Result<Vec<SeatPosition>, StoreError> {
        Ok(self
            .seat_coordinates()?
            .into_iter()
            .filter_map(|(row, col)| SeatPosition::new(row, col))
            .collect())
    }

    pub fn chart(&self) -> Result<SeatingChart, StoreError> {
        Ok(SeatingChart::build(self.reserved_positions()?))
    }

    pub fn total_sales(&self, prices: &PriceMatrix) -> Result<u64, StoreError> {
        Ok(prices.total_sales(self.seat_coordinates()?))
    }

    pub fn list_newest_first(&self) -> Result<Vec<Reservation>, StoreError> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {} FROM reservations ORDER BY created DESC, id DESC",
            Reservation::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let reservations = stmt
            .query_map([], Reservation::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(reservations)
    }

    pub fn get(&self, id: i64) -> Result<Option<Reservation>, StoreError> {
        let conn = self.pool.get()?;
        Ok(find_by_id(&conn, id)?)
    }

    pub fn count(&self) -> Result<i64, StoreError> {
        let conn = self.pool.get()?;
        let count = conn.query_row("SELECT COUNT(*) FROM reservations", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn is_taken(&self, position: SeatPosition) -> Result<bool, StoreError> {
        let conn = self.pool.get()?;
        let taken = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM reservations WHERE seat_row = ?1 AND seat_col = ?2)",
            params![position.row() as i64, position.col() as i64],
            |row| row.get(0),
        )?;
        Ok(taken)
    }

    /// Book `position` for `passenger_name` if it is still free.
    ///
    /// The insert is the authoritative check: the seat uniqueness constraint
    /// turns a lost race into `SeatTaken`, and a ticket collision regenerates
    /// the code.
    pub fn reserve(
        &self,
        passenger_name: &str,
        position: SeatPosition,
    ) -> Result<Reservation, ReserveError> {
        let conn = self.pool.get().map_err(StoreError::from)?;

        for _ in 0..MAX_TICKET_ATTEMPTS {
            let code = generate_ticket_code(passenger_name, position);
            if ticket_exists_on(&conn, &code).map_err(StoreError::from)? {
                tracing::debug!("Ticket code {} already issued, regenerating", code);
                continue;
            }

            let inserted = conn.execute(
                "INSERT INTO reservations (passenger_name, seat_row, seat_col, e_ticket_number)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    passenger_name,
                    position.row() as i64,
                    position.col() as i64,
                    code
                ],
            );

            match inserted {
                Ok(_) => {
                    let id = conn.last_insert_rowid();
                    let reservation = find_by_id(&conn, id)
                        .map_err(StoreError::from)?
                        .ok_or(StoreError::Sql(rusqlite::Error::QueryReturnedNoRows))?;
                    return Ok(reservation);
                }
                Err(e) => match unique_violation(&e) {
                    Some(UniqueViolation::Seat) => return Err(ReserveError::SeatTaken(position)),
                    Some(UniqueViolation::Ticket) => {
                        tracing::debug!("Ticket code {} raced with another booking", code);
                        continue;
                    }
                    None => return Err(StoreError::from(e).into()),
                },
            }
        }

        Err(StoreError::TicketCodesExhausted(MAX_TICKET_ATTEMPTS).into())
    }

    /// Returns true when a reservation was removed.
    pub fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let conn = self.pool.get()?;
        let rows = conn.execute("DELETE FROM reservations WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }
}

fn find_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<Reservation>> {
    let sql = format!(
        "SELECT {} FROM reservations WHERE id = ?1",
        Reservation::COLUMNS
    );
    conn.query_row(&sql, params![id], Reservation::from_row)
        .optional()
}

fn ticket_exists_on(conn: &Connection, code: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM reservations WHERE e_ticket_number = ?1)",
        params![code],
        |row| row.get(0),
    )
}

fn unique_violation(err: &rusqlite::Error) -> Option<UniqueViolation> {
    match err {
        rusqlite::Error::SqliteFailure(e, Some(msg)) if e.code == ErrorCode::ConstraintViolation => {
            if msg.contains("e_ticket_number") {
                Some(UniqueViolation::Ticket)
            } else if msg.contains("seat_row") {
                Some(UniqueViolation::Seat)
            } else {
                None
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::test_pool;
    use std::collections::HashSet;

    fn seat(row: i64, col: i64) -> SeatPosition {
        SeatPosition::new(row, col).unwrap()
    }

    #[test]
    fn reserve_stores_booking() {
        let store = ReservationStore::new(test_pool());
        let res = store.reserve("Ada Lovelace", seat(3, 1)).unwrap();

        assert_eq!(res.passenger_name, "Ada Lovelace");
        assert_eq!((res.seat_row, res.seat_col), (3, 1));
        assert!(res.e_ticket_number.starts_with("ADA"));
        assert!(res.e_ticket_number.ends_with("4B"));
        assert!(!res.created.is_empty());
        assert!(store.is_taken(seat(3, 1)).unwrap());
        let conn = store.pool.get().unwrap();
        assert!(ticket_exists_on(&conn, &res.e_ticket_number).unwrap());
        drop(conn);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn second_booking_of_same_seat_is_rejected() {
        let store = ReservationStore::new(test_pool());
        store.reserve("Ada Lovelace", seat(0, 0)).unwrap();

        let err = store.reserve("Grace Hopper", seat(0, 0)).unwrap_err();
        assert!(matches!(err, ReserveError::SeatTaken(s) if s == seat(0, 0)));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn tickets_are_pairwise_distinct() {
        let store = ReservationStore::new(test_pool());
        for position in SeatPosition::all() {
            store.reserve("Same Name", position).unwrap();
        }

        let tickets: HashSet<String> = store
            .list_newest_first()
            .unwrap()
            .into_iter()
            .map(|r| r.e_ticket_number)
            .collect();
        assert_eq!(tickets.len(), 48);
    }

    #[test]
    fn chart_reflects_bookings() {
        let store = ReservationStore::new(test_pool());
        store.reserve("Ada Lovelace", seat(5, 2)).unwrap();

        let chart = store.chart().unwrap();
        assert!(chart.is_taken(seat(5, 2)));
        assert_eq!(chart.free_count(), 47);
    }

    #[test]
    fn total_sales_sums_prices() {
        let store = ReservationStore::new(test_pool());
        store.reserve("Ada Lovelace", seat(0, 0)).unwrap();
        store.reserve("Grace Hopper", seat(0, 2)).unwrap();

        assert_eq!(store.total_sales(&PriceMatrix::default()).unwrap(), 150);
    }

    #[test]
    fn list_is_newest_first() {
        let store = ReservationStore::new(test_pool());
        let first = store.reserve("Ada Lovelace", seat(0, 0)).unwrap();
        let second = store.reserve("Grace Hopper", seat(0, 1)).unwrap();

        let ids: Vec<i64> = store
            .list_newest_first()
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn delete_frees_the_seat() {
        let store = ReservationStore::new(test_pool());
        let res = store.reserve("Ada Lovelace", seat(2, 3)).unwrap();

        assert!(store.delete(res.id).unwrap());
        assert_eq!(store.count().unwrap(), 0);
        assert!(!store.is_taken(seat(2, 3)).unwrap());
        assert!(store.get(res.id).unwrap().is_none());

        store.reserve("Grace Hopper", seat(2, 3)).unwrap();
    }

    #[test]
    fn delete_unknown_id_changes_nothing() {
        let store = ReservationStore::new(test_pool());
        store.reserve("Ada Lovelace", seat(0, 0)).unwrap();

        assert!(!store.delete(9999).unwrap());
        assert_eq!(store.count().unwrap(), 1);
    }
}
