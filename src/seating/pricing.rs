use super::{SeatPosition, COLS, ROWS};

/// Per-seat prices for the whole cabin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceMatrix {
    prices: [[u32; COLS]; ROWS],
}

impl PriceMatrix {
    /// Same column prices in every row.
    pub fn uniform(column_prices: [u32; COLS]) -> Self {
        Self {
            prices: [column_prices; ROWS],
        }
    }

    pub fn price(&self, position: SeatPosition) -> u32 {
        self.prices[position.row()][position.col()]
    }

    /// Total sales over raw stored coordinates. Records outside the chart
    /// contribute nothing.
    pub fn total_sales<I>(&self, seats: I) -> u64
    where
        I: IntoIterator<Item = (i64, i64)>,
    {
        seats
            .into_iter()
            .filter_map(|(row, col)| SeatPosition::new(row, col))
            .map(|seat| u64::from(self.price(seat)))
            .sum()
    }
}

impl Default for PriceMatrix {
    fn default() -> Self {
        Self::uniform([100, 75, 50, 100])
    }
}
