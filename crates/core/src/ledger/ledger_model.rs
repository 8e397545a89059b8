use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{DataQualityWarning, LedgerError, Result, WarningKind};

/// Side of a ledger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Buy,
    Sell,
}

impl TradeAction {
    /// +1 for buys, -1 for sells.
    pub fn sign(&self) -> Decimal {
        match self {
            TradeAction::Buy => Decimal::ONE,
            TradeAction::Sell => Decimal::NEGATIVE_ONE,
        }
    }
}

/// A single recorded buy or sell. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub date: NaiveDate,
    pub security_id: String,
    pub action: TradeAction,
    pub quantity: Decimal,
    pub share_price: Decimal,
    /// Brokerage the trade was made on, when recorded.
    pub platform: Option<String>,
    /// Account kind (e.g. "taxable", "roth"), when recorded.
    pub account_type: Option<String>,
}

impl Transaction {
    /// Quantity with the sign of the action applied.
    pub fn signed_quantity(&self) -> Decimal {
        self.quantity * self.action.sign()
    }
}

/// A ticker together with its full, date-ordered purchase history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Security {
    pub security_id: String,
    pub company_name: Option<String>,
    pub purchase_history: Vec<Transaction>,
}

/// Shares held and average cost of one security right after the
/// transactions of `date` were applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingState {
    pub date: NaiveDate,
    pub shares_held: Decimal,
    pub avg_cost: Decimal,
    /// Cost basis of the shares held (`shares_held × avg_cost`).
    pub equity: Decimal,
}

impl HoldingState {
    /// No position: zero shares, zero cost.
    pub fn flat(date: NaiveDate) -> Self {
        Self {
            date,
            shares_held: Decimal::ZERO,
            avg_cost: Decimal::ZERO,
            equity: Decimal::ZERO,
        }
    }
}

// === On-disk representation (stock_dictionary.json) ===

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTransactionRecord {
    #[serde(with = "crate::utils::date_format")]
    pub date: NaiveDate,
    pub quantity: Decimal,
    pub share_price: Decimal,
    pub buy_sell: TradeAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default)]
    pub purchase_history: Vec<LedgerTransactionRecord>,
}

/// The ledger document: ticker -> record.
pub type LedgerDocument = BTreeMap<String, LedgerRecord>;

/// Validated transaction ledger, keyed and iterated in ticker order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    securities: BTreeMap<String, Security>,
}

impl Ledger {
    /// Builds a ledger from its document form.
    ///
    /// Each purchase history is stably sorted by date, so same-day
    /// transactions keep their recorded order. Fails on a non-positive
    /// quantity, a negative price, or a sell that exceeds the shares held
    /// at that point. A security with an empty history is kept and reported
    /// as a warning.
    pub fn from_document(document: LedgerDocument) -> Result<(Self, Vec<DataQualityWarning>)> {
        let mut securities = BTreeMap::new();
        let mut warnings = Vec::new();

        for (security_id, record) in document {
            let security_id = security_id.trim().to_string();
            let mut history: Vec<Transaction> = record
                .purchase_history
                .into_iter()
                .map(|tx| Transaction {
                    date: tx.date,
                    security_id: security_id.clone(),
                    action: tx.buy_sell,
                    quantity: tx.quantity,
                    share_price: tx.share_price,
                    platform: tx.platform,
                    account_type: tx.account_type,
                })
                .collect();
            history.sort_by_key(|tx| tx.date);

            validate_history(&security_id, &history)?;

            if history.is_empty() {
                warnings.push(
                    DataQualityWarning::for_security(
                        WarningKind::EmptyHistory,
                        &security_id,
                        "ledger entry has no transactions",
                    )
                    .logged(),
                );
            }

            securities.insert(
                security_id.clone(),
                Security {
                    security_id,
                    company_name: record.company_name,
                    purchase_history: history,
                },
            );
        }

        Ok((Self { securities }, warnings))
    }

    pub fn from_securities(securities: impl IntoIterator<Item = Security>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for mut security in securities {
            security.purchase_history.sort_by_key(|tx| tx.date);
            validate_history(&security.security_id, &security.purchase_history)?;
            map.insert(security.security_id.clone(), security);
        }
        Ok(Self { securities: map })
    }

    pub fn securities(&self) -> impl Iterator<Item = &Security> {
        self.securities.values()
    }

    pub fn security_ids(&self) -> impl Iterator<Item = &str> {
        self.securities.keys().map(String::as_str)
    }

    pub fn get(&self, security_id: &str) -> Option<&Security> {
        self.securities.get(security_id)
    }

    pub fn contains(&self, security_id: &str) -> bool {
        self.securities.contains_key(security_id)
    }

    pub fn len(&self) -> usize {
        self.securities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.securities.is_empty()
    }

    /// Date of the first transaction across all securities.
    pub fn earliest_transaction_date(&self) -> Option<NaiveDate> {
        self.securities
            .values()
            .filter_map(|s| s.purchase_history.first().map(|tx| tx.date))
            .min()
    }
}

fn validate_history(security_id: &str, history: &[Transaction]) -> Result<()> {
    let mut held = Decimal::ZERO;
    for tx in history {
        if tx.quantity <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveQuantity {
                security_id: security_id.to_string(),
                date: tx.date,
                quantity: tx.quantity,
            }
            .into());
        }
        if tx.share_price < Decimal::ZERO {
            return Err(LedgerError::NegativePrice {
                security_id: security_id.to_string(),
                date: tx.date,
                share_price: tx.share_price,
            }
            .into());
        }
        if tx.action == TradeAction::Sell && tx.quantity > held {
            return Err(LedgerError::Oversold {
                security_id: security_id.to_string(),
                date: tx.date,
                held,
                requested: tx.quantity,
            }
            .into());
        }
        held += tx.signed_quantity();
    }
    Ok(())
}
