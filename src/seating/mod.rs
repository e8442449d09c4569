// Seat geometry, pure and free of side effects
pub mod chart;
pub mod pricing;
pub mod ticket;

use std::fmt;

pub use chart::SeatingChart;
pub use pricing::PriceMatrix;

pub const ROWS: usize = 12;
pub const COLS: usize = 4;

const COLUMN_LETTERS: [char; COLS] = ['A', 'B', 'C', 'D'];

/// A seat inside the 12x4 cabin, stored as 0-based indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeatPosition {
    row: usize,
    col: usize,
}

impl SeatPosition {
    /// Returns `None` when either index falls outside the chart.
    pub fn new(row: i64, col: i64) -> Option<Self> {
        let row = usize::try_from(row).ok().filter(|r| *r < ROWS)?;
        let col = usize::try_from(col).ok().filter(|c| *c < COLS)?;
        Some(Self { row, col })
    }

    /// Parse the 1-based row and column typed into the booking form.
    ///
    /// Unparsable input maps to the `-1,-1` sentinel, which never lies on the
    /// chart, so bad numbers and out-of-range numbers share one error path.
    pub fn from_form(seat_row: &str, seat_col: &str) -> Option<Self> {
        let parsed = match (seat_row.trim().parse::<i64>(), seat_col.trim().parse::<i64>()) {
            (Ok(r), Ok(c)) => r.checked_sub(1).zip(c.checked_sub(1)),
            _ => None,
        };
        let (row, col) = parsed.unwrap_or((-1, -1));
        Self::new(row, col)
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    pub fn row_number(&self) -> usize {
        self.row + 1
    }

    pub fn column_letter(&self) -> char {
        COLUMN_LETTERS[self.col]
    }

    pub fn label(&self) -> String {
        self.to_string()
    }

    /// Every seat, row-major.
    pub fn all() -> impl Iterator<Item = SeatPosition> {
        (0..ROWS).flat_map(|row| (0..COLS).map(move |col| SeatPosition { row, col }))
    }
}

impl fmt::Display for SeatPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row_number(), self.column_letter())
    }
}

/// Label for stored 0-based coordinates, e.g. row 3 column 1 is "4B".
/// `None` when the pair does not lie on the chart.
pub fn seat_label(row: i64, col: i64) -> Option<String> {
    SeatPosition::new(row, col).map(|seat| seat.label())
}
