use crate::infra::listing_service;
use clap::Args;
use rental_scout::config::AppConfig;
use rental_scout::error::AppError;
use rental_scout::screening::{
    Assumptions, ListingId, ListingImporter, RankingFilters, ScreeningReport, ScreeningSession,
    SessionView, SortKey,
};
use std::fmt;
use std::path::PathBuf;

/// Assumption, filter and display flags shared by `screen` and `search`.
#[derive(Args, Debug, Default)]
pub(crate) struct TuningArgs {
    /// Nightly rate in currency units (50-1500)
    #[arg(long)]
    pub(crate) nightly_rate: Option<f64>,
    /// Occupancy percent (20-100)
    #[arg(long)]
    pub(crate) occupancy: Option<f64>,
    /// Operating expenses as a percent of gross income (10-50)
    #[arg(long)]
    pub(crate) expenses: Option<f64>,
    /// Sort key: heatScore, capRate, cashOnCashReturn, priceLow, priceHigh
    #[arg(long)]
    pub(crate) sort: Option<SortKey>,
    /// Minimum cap rate percent (0-20)
    #[arg(long)]
    pub(crate) min_cap_rate: Option<f64>,
    /// Minimum cash-on-cash return percent (0-20)
    #[arg(long)]
    pub(crate) min_cash_on_cash: Option<f64>,
    /// Mark a listing id as favorite (repeatable)
    #[arg(long = "favorite")]
    pub(crate) favorites: Vec<String>,
    /// Only print the first N listings
    #[arg(long)]
    pub(crate) limit: Option<usize>,
}

impl TuningArgs {
    pub(crate) fn assumptions(&self, defaults: Assumptions) -> Assumptions {
        Assumptions {
            nightly_rate: self.nightly_rate.unwrap_or(defaults.nightly_rate),
            occupancy_percent: self.occupancy.unwrap_or(defaults.occupancy_percent),
            expense_percent: self.expenses.unwrap_or(defaults.expense_percent),
        }
        .clamp_to_surface()
    }

    pub(crate) fn filters(&self) -> RankingFilters {
        RankingFilters {
            min_cap_rate: self.min_cap_rate,
            min_cash_on_cash: self.min_cash_on_cash,
        }
        .clamp_to_surface()
    }

    fn favorite_ids(&self) -> impl Iterator<Item = ListingId> + '_ {
        self.favorites
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .map(ListingId::new)
    }
}

#[derive(Args, Debug)]
pub(crate) struct ScreenArgs {
    /// JSON (array or {"results": [...]}) or CSV listing export
    #[arg(long)]
    pub(crate) input: PathBuf,
    #[command(flatten)]
    pub(crate) tuning: TuningArgs,
}

#[derive(Args, Debug)]
pub(crate) struct SearchArgs {
    /// City to search, e.g. "Whitefish"
    #[arg(long)]
    pub(crate) city: String,
    /// State code, e.g. "MT"
    #[arg(long)]
    pub(crate) state: String,
    #[command(flatten)]
    pub(crate) tuning: TuningArgs,
}

pub(crate) fn run_screen(args: ScreenArgs) -> Result<(), AppError> {
    let ScreenArgs { input, tuning } = args;
    let config = AppConfig::load()?;

    let listings = ListingImporter::from_path(&input)?;
    let mut session = ScreeningSession::new(tuning.assumptions(config.defaults));
    session.replace_listings(listings);
    for id in tuning.favorite_ids() {
        session.toggle_favorite(&id);
    }

    let report = session.view(&tuning.filters(), tuning.sort.unwrap_or_default());
    println!("Listings from {}", input.display());
    print!("{}", render_report(&report, tuning.limit));
    Ok(())
}

pub(crate) async fn run_search(args: SearchArgs) -> Result<(), AppError> {
    let SearchArgs {
        city,
        state,
        tuning,
    } = args;
    let config = AppConfig::load()?;
    let service = listing_service(&config)?;

    service.set_assumptions(tuning.assumptions(config.defaults));
    for id in tuning.favorite_ids() {
        service.toggle_favorite(&id);
    }

    service.search(&city, &state).await?;
    let view = service.view(&tuning.filters(), tuning.sort.unwrap_or_default());

    println!(
        "Search results for {}, {}",
        city.trim(),
        state.trim().to_ascii_uppercase()
    );
    print!("{}", render_session(&view, tuning.limit));
    Ok(())
}

struct SessionTable<'a> {
    view: &'a SessionView,
    limit: Option<usize>,
}

impl fmt::Display for SessionTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.view.trending {
            writeln!(f, "Market is trending \u{1F4C8}")?;
        }
        fmt::Display::fmt(&render_report(&self.view.report, self.limit), f)
    }
}

fn render_session(view: &SessionView, limit: Option<usize>) -> SessionTable<'_> {
    SessionTable { view, limit }
}

/// Plain-text table of a ranked report.
pub(crate) struct ReportTable<'a> {
    report: &'a ScreeningReport,
    limit: Option<usize>,
}

impl fmt::Display for ReportTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        let assumptions = &report.assumptions;
        writeln!(
            f,
            "Assumptions: ${:.0}/night | {:.0}% occupancy | {:.0}% expenses | sorted by {}",
            assumptions.nightly_rate,
            assumptions.occupancy_percent,
            assumptions.expense_percent,
            report.sort.label()
        )?;
        if let Some(min) = report.filters.min_cap_rate {
            writeln!(f, "Minimum cap rate: {min:.1}%")?;
        }
        if let Some(min) = report.filters.min_cash_on_cash {
            writeln!(f, "Minimum cash-on-cash: {min:.1}%")?;
        }

        let matched = report.listings.len();
        let shown = self.limit.unwrap_or(matched).min(matched);
        writeln!(f, "{} of {} listings match", matched, report.total_listings)?;

        if report.listings.is_empty() {
            writeln!(f, "No listings match the current filters.")?;
        } else {
            writeln!(
                f,
                "{:>3}  {:<12} {:>12} {:>8} {:>8} {:>5}  {:<4} {:<2} {}",
                "#", "ID", "PRICE", "CAP %", "COC %", "HEAT", "TIER", "*", "ADDRESS"
            )?;
            for (position, view) in report.listings.iter().take(shown).enumerate() {
                let listing = &view.listing;
                write!(
                    f,
                    "{:>3}  {:<12} {:>12.0} {:>8.2} {:>8.2} {:>5}  {:<4} {:<2} {}",
                    position + 1,
                    listing.id().as_str(),
                    listing.price(),
                    listing.cap_rate_percent,
                    listing.cash_on_cash_return_percent,
                    listing.heat_score,
                    view.heat_tier.badge(),
                    if view.is_favorite { "*" } else { "" },
                    listing.listing.address.as_deref().unwrap_or("-"),
                )?;
                if listing.listing.undervalued {
                    write!(f, " [undervalued]")?;
                }
                writeln!(f)?;
            }
            if shown < matched {
                writeln!(f, "... {} more", matched - shown)?;
            }
        }

        if !report.excluded.is_empty() {
            writeln!(f, "Excluded {} listing(s):", report.excluded.len())?;
            for excluded in &report.excluded {
                writeln!(f, "  - {}: {}", excluded.id, excluded.reason)?;
            }
        }
        Ok(())
    }
}

pub(crate) fn render_report(report: &ScreeningReport, limit: Option<usize>) -> ReportTable<'_> {
    ReportTable { report, limit }
}
