pub mod cache_port;
pub mod config_port;
pub mod market_data;
pub mod name_lookup;
