//! Per-listing financial metrics for a short-term-rental hold.
//!
//! Debt service is a flat interest-only approximation on the financed share;
//! there is no amortization schedule.

use super::domain::{Assumptions, RawListing, DOWN_PAYMENT_FRACTION, LOAN_INTEREST_RATE};
use serde::{Deserialize, Serialize};

const NIGHTS_PER_YEAR: f64 = 365.0;

/// Derived yield figures for one listing under one set of assumptions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingMetrics {
    pub price: f64,
    pub estimated_nightly_rate: f64,
    pub occupancy_fraction: f64,
    pub gross_annual_income: f64,
    pub annual_expenses: f64,
    pub net_operating_income: f64,
    pub down_payment: f64,
    pub loan_amount: f64,
    pub annual_debt_service: f64,
    pub annual_cash_flow: f64,
    pub cap_rate_percent: f64,
    pub cash_on_cash_return_percent: f64,
}

/// Reason a listing cannot produce finite metrics.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetricsError {
    #[error("listing has no price")]
    MissingPrice,
    #[error("listing price {0} is not a positive number")]
    NonPositivePrice(f64),
    #[error("{metric} is not finite")]
    NonFinite { metric: &'static str },
}

/// Compute the financial metrics of `listing` without touching it.
pub fn calculate(
    listing: &RawListing,
    assumptions: &Assumptions,
) -> Result<ListingMetrics, MetricsError> {
    let price = listing.price.ok_or(MetricsError::MissingPrice)?;
    if !price.is_finite() || price <= 0.0 {
        return Err(MetricsError::NonPositivePrice(price));
    }

    let occupancy_fraction = assumptions.occupancy_percent / 100.0;
    let gross_annual_income = assumptions.nightly_rate * NIGHTS_PER_YEAR * occupancy_fraction;
    let annual_expenses = gross_annual_income * (assumptions.expense_percent / 100.0);
    let net_operating_income = gross_annual_income - annual_expenses;

    let down_payment = DOWN_PAYMENT_FRACTION * price;
    let loan_amount = (1.0 - DOWN_PAYMENT_FRACTION) * price;
    let annual_debt_service = loan_amount * LOAN_INTEREST_RATE;
    let annual_cash_flow = net_operating_income - annual_debt_service;

    let cap_rate_percent = (net_operating_income / price) * 100.0;
    let cash_on_cash_return_percent = (annual_cash_flow / down_payment) * 100.0;

    let metrics = ListingMetrics {
        price,
        estimated_nightly_rate: assumptions.nightly_rate,
        occupancy_fraction,
        gross_annual_income,
        annual_expenses,
        net_operating_income,
        down_payment,
        loan_amount,
        annual_debt_service,
        annual_cash_flow,
        cap_rate_percent,
        cash_on_cash_return_percent,
    };
    metrics.ensure_finite()?;
    Ok(metrics)
}

impl ListingMetrics {
    fn ensure_finite(&self) -> Result<(), MetricsError> {
        let checks = [
            ("estimated nightly rate", self.estimated_nightly_rate),
            ("occupancy fraction", self.occupancy_fraction),
            ("gross annual income", self.gross_annual_income),
            ("net operating income", self.net_operating_income),
            ("annual cash flow", self.annual_cash_flow),
            ("cap rate", self.cap_rate_percent),
            ("cash-on-cash return", self.cash_on_cash_return_percent),
        ];

        match checks.iter().find(|(_, value)| !value.is_finite()) {
            Some((metric, _)) => Err(MetricsError::NonFinite { metric: *metric }),
            None => Ok(()),
        }
    }
}
