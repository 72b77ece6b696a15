//! Ticker classification and display-name lookup.

use crate::domain::error::DcasimError;
use crate::domain::series::AssetType;
use crate::ports::name_lookup::NameLookup;
use std::collections::HashMap;

/// Ticker qualifier carried as a dot-suffix. Only off-exchange funds are
/// supported; any other suffix is rejected at resolve time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qualifier {
    OtcFund,
}

impl Qualifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Qualifier::OtcFund => "OF",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub clean: String,
    pub qualifier: Option<Qualifier>,
    pub hint: Option<AssetType>,
}

/// Classify a raw ticker into (clean code, qualifier, asset-type hint).
///
/// A bare code resolves with no hint; the asset class is determined later by
/// probing order. `600519.SH`-style exchange suffixes are not supported.
pub fn resolve(raw: &str) -> Result<Resolved, DcasimError> {
    let trimmed = raw.trim();
    if let Some((code, suffix)) = trimmed.split_once('.') {
        if suffix.eq_ignore_ascii_case("OF") {
            return Ok(Resolved {
                clean: code.to_string(),
                qualifier: Some(Qualifier::OtcFund),
                hint: Some(AssetType::OtcFund),
            });
        }
        return Err(DcasimError::UnsupportedSuffix {
            suffix: suffix.to_string(),
        });
    }
    Ok(Resolved {
        clean: trimmed.to_string(),
        qualifier: None,
        hint: None,
    })
}

/// Resolve a human-readable name for a symbol.
///
/// Checks the local name map first, then probes the registries in fixed
/// priority: index, stock, ETF, off-exchange fund. An `OF`-qualified symbol
/// only consults the off-exchange-fund registry. Read-only, no retries.
pub fn display_name(
    raw: &str,
    names: &HashMap<String, String>,
    lookup: &dyn NameLookup,
) -> Result<Option<String>, DcasimError> {
    let trimmed = raw.trim();
    if let Some(name) = names.get(trimmed) {
        return Ok(Some(name.clone()));
    }

    let resolved = resolve(trimmed)?;
    if resolved.qualifier == Some(Qualifier::OtcFund) {
        return Ok(non_empty(lookup.otc_fund_name(&resolved.clean)));
    }

    // Each registry lookup may be a network call; stop at the first hit.
    Ok(non_empty(lookup.index_name(&resolved.clean))
        .or_else(|| non_empty(lookup.stock_name(&resolved.clean)))
        .or_else(|| non_empty(lookup.etf_name(&resolved.clean)))
        .or_else(|| non_empty(lookup.otc_fund_name(&resolved.clean))))
}

fn non_empty(name: Option<String>) -> Option<String> {
    name.filter(|n| !n.is_empty())
}
