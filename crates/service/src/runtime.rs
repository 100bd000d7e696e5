//! Runtime wiring
//!
//! Builds the three stores from configuration so callers get a ready set
//! without knowing which adapter backs them.

use std::sync::Arc;

use configs::{AppConfig, ReservationConfig};
use models::{Customer, Hotel, Reservation};
use tracing::info;

use crate::storage::InMemorySnapshot;
use crate::stores::{CustomerStore, HotelStore, ReservationStore};

/// The three stores wired together; `reservations` reaches customers and
/// hotels through the same instances held here.
#[derive(Clone)]
pub struct Stores {
    pub customers: Arc<CustomerStore>,
    pub hotels: Arc<HotelStore>,
    pub reservations: Arc<ReservationStore>,
}

impl Stores {
    /// File-backed stores under `storage.data_dir`.
    pub fn open(config: &AppConfig) -> Self {
        let customers = Arc::new(CustomerStore::open(config.storage.customers_path()));
        let hotels = Arc::new(HotelStore::open(config.storage.hotels_path()));
        let reservations = Arc::new(ReservationStore::open(
            config.storage.reservations_path(),
            customers.clone(),
            hotels.clone(),
            config.reservations.clone(),
        ));
        Self { customers, hotels, reservations }
    }

    /// Stores that live only as long as the process.
    pub fn in_memory(config: ReservationConfig) -> Self {
        let customers = Arc::new(CustomerStore::new(Arc::new(InMemorySnapshot::<Customer>::new())));
        let hotels = Arc::new(HotelStore::new(Arc::new(InMemorySnapshot::<Hotel>::new())));
        let reservations = Arc::new(ReservationStore::new(
            Arc::new(InMemorySnapshot::<Reservation>::new()),
            customers.clone(),
            hotels.clone(),
            config,
        ));
        Self { customers, hotels, reservations }
    }
}

/// Selects JSON log output when set to `json`; anything else is compact.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Load `.env`, start logging, load configuration, make sure the data
/// directory exists and open the file-backed stores.
pub async fn bootstrap() -> anyhow::Result<Stores> {
    dotenvy::dotenv().ok();
    match std::env::var(LOG_FORMAT_ENV).as_deref() {
        Ok("json") => common::utils::logging::init_logging_json(),
        _ => common::utils::logging::init_logging_default(),
    }
    let config = AppConfig::load_and_validate()?;
    common::env::ensure_data_dir(&config.storage.data_dir).await?;
    info!(data_dir = %config.storage.data_dir, "stores_opened");
    Ok(Stores::open(&config))
}
