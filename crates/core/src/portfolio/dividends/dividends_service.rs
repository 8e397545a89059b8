use std::collections::BTreeMap;

use log::debug;
use rust_decimal::Decimal;

use super::dividends_model::{DividendProjection, DividendSchedule};
use crate::constants::DISPLAY_DECIMAL_PRECISION;
use crate::portfolio::holdings::StockHolding;

/// Projects dividend income for every held security that has a schedule.
///
/// Output follows the holdings order. A ticker listed twice in the
/// schedule uses its last row.
pub fn project_dividends(
    holdings: &[StockHolding],
    schedules: &[DividendSchedule],
) -> Vec<DividendProjection> {
    let by_ticker: BTreeMap<&str, &DividendSchedule> = schedules
        .iter()
        .map(|s| (s.ticker.trim(), s))
        .collect();

    let projections: Vec<DividendProjection> = holdings
        .iter()
        .filter(|h| h.quantity > Decimal::ZERO)
        .filter_map(|holding| {
            let schedule = by_ticker.get(holding.symbol.trim())?;
            let annual = holding.market_value * schedule.dividend_yield_pct / Decimal::ONE_HUNDRED;
            let per_payment = annual / Decimal::from(schedule.frequency.payments_per_year());
            Some(DividendProjection {
                ticker: holding.symbol.clone(),
                market_value: holding.market_value,
                dividend_yield_pct: schedule.dividend_yield_pct,
                frequency: schedule.frequency,
                last_payment_date: schedule.last_payment_date,
                amount_paid: schedule.amount_paid,
                annual_dividend: annual.round_dp(DISPLAY_DECIMAL_PRECISION),
                projected_per_payment: per_payment.round_dp(DISPLAY_DECIMAL_PRECISION),
            })
        })
        .collect();

    debug!("Projected dividends for {} holdings", projections.len());
    projections
}

/// Sum of projected annual dividends.
pub fn total_annual_dividends(projections: &[DividendProjection]) -> Decimal {
    projections.iter().map(|p| p.annual_dividend).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::dividends::PaymentFrequency;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn holding(symbol: &str, quantity: Decimal, market_value: Decimal) -> StockHolding {
        StockHolding {
            symbol: symbol.to_string(),
            company: None,
            price: Decimal::ZERO,
            quantity,
            avg_cost: Decimal::ZERO,
            market_value,
            percent_change: None,
            equity_change: None,
            high_52_week: None,
            low_52_week: None,
            asset_type: None,
        }
    }

    fn schedule(ticker: &str, yield_pct: Decimal, frequency: PaymentFrequency) -> DividendSchedule {
        DividendSchedule {
            ticker: ticker.to_string(),
            dividend_yield_pct: yield_pct,
            frequency,
            last_payment_date: NaiveDate::from_ymd_opt(2024, 12, 1),
            amount_paid: None,
        }
    }

    #[test]
    fn test_projection_by_frequency() {
        let holdings = vec![
            holding("O", dec!(200), dec!(11000)),
            holding("JNJ", dec!(100), dec!(15500)),
            holding("NODIV", dec!(5), dec!(500)),
        ];
        let schedules = vec![
            schedule("O", dec!(5.25), PaymentFrequency::Monthly),
            schedule("JNJ", dec!(2.8), PaymentFrequency::Quarterly),
        ];

        let projections = project_dividends(&holdings, &schedules);
        assert_eq!(projections.len(), 2);
        assert_eq!(projections[0].ticker, "O");
        assert_eq!(projections[0].annual_dividend, dec!(577.5));
        assert_eq!(projections[0].projected_per_payment, dec!(48.12));
        assert_eq!(projections[1].annual_dividend, dec!(434));
        assert_eq!(projections[1].projected_per_payment, dec!(108.5));
        assert_eq!(total_annual_dividends(&projections), dec!(1011.5));
    }

    #[test]
    fn test_sold_out_holding_is_not_projected() {
        let projections = project_dividends(
            &[holding("O", Decimal::ZERO, Decimal::ZERO)],
            &[schedule("O", dec!(5), PaymentFrequency::Annual)],
        );
        assert!(projections.is_empty());
    }

    #[test]
    fn test_schedule_csv_row() {
        let data = "Ticker,Dividend Yield (%),Frequency,Last Payment Date,Amount Paid\n\
                    AAPL,0.55,Quarterly,2024-12-01,2.30\n\
                    XYZ,1.0,Semi-Annual,,\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let rows: Vec<DividendSchedule> = reader.deserialize().map(|r| r.unwrap()).collect();

        assert_eq!(rows[0].frequency, PaymentFrequency::Quarterly);
        assert_eq!(rows[0].last_payment_date, NaiveDate::from_ymd_opt(2024, 12, 1));
        assert_eq!(rows[0].amount_paid, Some(dec!(2.30)));
        assert_eq!(rows[1].frequency, PaymentFrequency::Annual);
        assert_eq!(rows[1].last_payment_date, None);
        assert_eq!(rows[1].amount_paid, None);
    }
}
