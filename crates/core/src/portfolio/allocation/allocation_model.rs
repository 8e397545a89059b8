//! Allocation models for portfolio breakdown by classification.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::UNKNOWN_GROUP;
use crate::portfolio::holdings::{asset_type_of, CapSize, CompanyProfile, StockHolding};

/// Dimension a rollup groups by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupBy {
    Sector,
    Industry,
    CapSize,
    AssetType,
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GroupBy::Sector => "sector",
            GroupBy::Industry => "industry",
            GroupBy::CapSize => "cap size",
            GroupBy::AssetType => "asset type",
        };
        f.write_str(name)
    }
}

/// Allocation of the snapshot to one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRollup {
    pub group_key: String,
    pub market_value_sum: Decimal,
    /// Fraction of the snapshot's market value (0-1).
    pub pct_of_total: Decimal,
    /// Even-split target, `1 / group_count`.
    pub desired_pct: Decimal,
    /// `desired_pct - pct_of_total`; positive means under-allocated.
    pub pct_deviation: Decimal,
    pub security_count: usize,
}

/// What is known about how a security is classified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityClassification {
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub cap_size: Option<CapSize>,
    pub asset_type: Option<String>,
}

/// Classification lookup built from the profile and holdings tables.
#[derive(Debug, Clone, Default)]
pub struct ClassificationIndex {
    by_security: BTreeMap<String, SecurityClassification>,
}

impl ClassificationIndex {
    pub fn from_tables(profiles: &[CompanyProfile], holdings: &[StockHolding]) -> Self {
        let mut by_security: BTreeMap<String, SecurityClassification> = BTreeMap::new();

        for profile in profiles {
            let entry = by_security
                .entry(profile.symbol.trim().to_string())
                .or_default();
            entry.sector = non_blank(profile.sector.as_deref());
            entry.industry = non_blank(profile.industry.as_deref());
            entry.cap_size = profile.cap_size();
        }
        for holding in holdings {
            by_security
                .entry(holding.symbol.trim().to_string())
                .or_default()
                .asset_type = Some(asset_type_of(holding).to_string());
        }

        Self { by_security }
    }

    pub fn get(&self, security_id: &str) -> Option<&SecurityClassification> {
        self.by_security.get(security_id)
    }

    /// Group a security falls in; unknown values map to `"Unknown"`.
    pub fn group_key(&self, security_id: &str, group_by: GroupBy) -> String {
        let classification = self.by_security.get(security_id);
        let key = classification.and_then(|c| match group_by {
            GroupBy::Sector => c.sector.clone(),
            GroupBy::Industry => c.industry.clone(),
            GroupBy::CapSize => c.cap_size.map(|size| size.to_string()),
            GroupBy::AssetType => c.asset_type.clone(),
        });
        key.unwrap_or_else(|| UNKNOWN_GROUP.to_string())
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
