use std::collections::HashSet;

use super::{SeatPosition, COLS, ROWS};

pub struct ChartSeat {
    pub label: String,
    pub taken: bool,
}

pub struct ChartRow {
    pub row_number: usize,
    pub seats: Vec<ChartSeat>,
}

/// Availability view of the whole cabin, derived from stored bookings.
pub struct SeatingChart {
    pub rows: Vec<ChartRow>,
}

impl SeatingChart {
    pub fn build<I>(reserved: I) -> Self
    where
        I: IntoIterator<Item = SeatPosition>,
    {
        let taken: HashSet<SeatPosition> = reserved.into_iter().collect();

        let rows = (0..ROWS)
            .map(|row| ChartRow {
                row_number: row + 1,
                seats: (0..COLS)
                    .filter_map(|col| SeatPosition::new(row as i64, col as i64))
                    .map(|seat| ChartSeat {
                        label: seat.label(),
                        taken: taken.contains(&seat),
                    })
                    .collect(),
            })
            .collect();

        Self { rows }
    }

    pub fn is_taken(&self, position: SeatPosition) -> bool {
        self.rows[position.row()].seats[position.col()].taken
    }

    pub fn free_count(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|r| r.seats.iter())
            .filter(|s| !s.taken)
            .count()
    }
}
