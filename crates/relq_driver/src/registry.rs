//! Process-wide provider registry.
//!
//! Drivers register under a provider name (for example `"sqlite"`) and are
//! looked up by that name when a session opens. The registry is seeded with
//! the bundled drivers on first access; applications embedding their own
//! driver call [`register`] once at startup.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::driver::SqlDriver;
use crate::error::{DriverError, DriverResult};
use crate::sqlite::SqliteDriver;

/// Provider name of the bundled SQLite driver.
pub const SQLITE_PROVIDER: &str = "sqlite";

type DriverMap = RwLock<HashMap<String, Arc<dyn SqlDriver>>>;

fn drivers() -> &'static DriverMap {
    static DRIVERS: OnceLock<DriverMap> = OnceLock::new();
    DRIVERS.get_or_init(|| {
        let mut map: HashMap<String, Arc<dyn SqlDriver>> = HashMap::new();
        map.insert(SQLITE_PROVIDER.to_string(), Arc::new(SqliteDriver::new()));
        RwLock::new(map)
    })
}

/// Registers `driver` under its [`SqlDriver::name`], replacing any driver
/// previously registered under that name.
pub fn register(driver: Arc<dyn SqlDriver>) {
    let name = driver.name().to_string();
    drivers().write().insert(name, driver);
}

/// Looks up the driver registered under `provider`.
///
/// # Errors
///
/// Returns [`DriverError::UnknownProvider`] if no driver is registered
/// under that name.
pub fn resolve(provider: &str) -> DriverResult<Arc<dyn SqlDriver>> {
    drivers()
        .read()
        .get(provider)
        .cloned()
        .ok_or_else(|| DriverError::unknown_provider(provider))
}
