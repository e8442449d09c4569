use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::config::Config;
use crate::reservations::ReservationStore;
use crate::seating::PriceMatrix;

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub reservations: ReservationStore,
    pub prices: PriceMatrix,
}

impl AppState {
    pub fn new(db: DbPool, config: Config) -> Self {
        let prices = PriceMatrix::uniform(config.pricing.column_prices);
        Self {
            reservations: ReservationStore::new(db.clone()),
            db,
            config,
            prices,
        }
    }
}
