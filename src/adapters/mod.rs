//! Concrete port implementations.

pub mod csv_cache_adapter;
pub mod csv_source_adapter;
pub mod file_config_adapter;
pub mod json_name_cache;
