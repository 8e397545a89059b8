/// Security id used by the holdings export for the cash/placeholder row.
pub const PLACEHOLDER_SECURITY_ID: &str = "0";

/// Group key for rows whose classification is missing.
pub const UNKNOWN_GROUP: &str = "Unknown";

/// Decimal precision for displayed percentages and money
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Number of gainers and losers reported by default
pub const TOP_MOVERS_COUNT: usize = 5;

/// Size of the market list scanned for new-buy candidates
pub const NEW_BUY_UNIVERSE_SIZE: usize = 100;

/// Maximum contribution of each rebuy score component
pub const MARKET_SCORE_WEIGHT: i64 = 20;
pub const SECTOR_SCORE_WEIGHT: i64 = 20;
pub const HIGHLOW_SCORE_WEIGHT: i64 = 30;
pub const ANALYST_SCORE_WEIGHT: i64 = 30;

/// Market cap boundaries in billions of dollars
pub const SMALL_CAP_LIMIT_BILLIONS: i64 = 2;
pub const MID_CAP_LIMIT_BILLIONS: i64 = 10;

/// Flat files under the data directory
pub const LEDGER_FILE: &str = "stock_dictionary.json";
pub const STOCKS_FILE: &str = "stocks.csv";
pub const STOCK_INFO_FILE: &str = "stock_info.csv";
pub const DAILY_STOCKS_FILE: &str = "daily_stocks.csv";
pub const EXPENSES_FILE: &str = "expenses.csv";
pub const INCOME_FILE: &str = "income.csv";
pub const DIVIDENDS_FILE: &str = "dividends.csv";
