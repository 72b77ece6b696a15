//! Display-name registry port trait.

/// Symbol-to-name registries, one per asset class. Each lookup returns the
/// display name or `None`; failures are treated as misses.
pub trait NameLookup {
    fn index_name(&self, symbol: &str) -> Option<String>;
    fn stock_name(&self, symbol: &str) -> Option<String>;
    fn etf_name(&self, symbol: &str) -> Option<String>;
    fn otc_fund_name(&self, symbol: &str) -> Option<String>;
}
