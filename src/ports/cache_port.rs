//! Persistent series cache port trait.

use crate::domain::cache::{CacheKey, CachedSeries};
use crate::domain::error::DcasimError;
use crate::domain::series::TimeSeries;

pub trait CachePort {
    /// Load the cached series for a key. An unreadable or corrupt entry is an
    /// empty result, never an error.
    fn load(&self, key: &CacheKey) -> CachedSeries;

    /// Overwrite the entry. A no-op returning `false` when `series` is empty,
    /// so a failed refresh never erases a good cache.
    fn save(&self, key: &CacheKey, series: &TimeSeries) -> Result<bool, DcasimError>;
}
