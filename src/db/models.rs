use rusqlite::Row;

#[derive(Debug, Clone)]
pub struct Reservation {
    pub id: i64,
    pub passenger_name: String,
    pub seat_row: i64,
    pub seat_col: i64,
    pub e_ticket_number: String,
    pub created: String,
}

impl Reservation {
    pub const COLUMNS: &'static str =
        "id, passenger_name, seat_row, seat_col, e_ticket_number, created";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            passenger_name: row.get(1)?,
            seat_row: row.get(2)?,
            seat_col: row.get(3)?,
            e_ticket_number: row.get(4)?,
            created: row.get(5)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Admin {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct AdminSession {
    pub token: String,
    pub username: String,
    pub expires_at: String,
}
