use rental_scout::screening::{
    enrich, enrich_with_report, rank, Assumptions, EnrichedListing, FavoriteSet, HeatTier,
    ListingFormat, ListingId, ListingImporter, RankingFilters, RawListing, ScreeningSession,
    SortKey,
};
use std::io::Cursor;

const WHITEFISH_EXPORT: &str = r#"{
  "trending": true,
  "results": [
    { "zpid": 3001, "price": 200000, "daysOnZillow": 2, "address": "1 Spruce Ln" },
    { "zpid": 3002, "price": 325000, "zestimate": 400000, "daysOnZillow": 5, "address": "7 Ridge Rd" },
    { "zpid": 3003, "price": 780000, "zestimate": 760000, "address": "44 Lake Dr" },
    { "zpid": 3004, "price": 0, "address": "Vacant lot" },
    { "zpid": 3005, "price": "call for price" },
    { "zpid": 3006, "price": 325000, "daysOnZillow": 5, "address": "9 Ridge Rd" }
  ]
}"#;

fn whitefish() -> Vec<RawListing> {
    ListingImporter::from_reader(Cursor::new(WHITEFISH_EXPORT), ListingFormat::Json)
        .expect("export imports")
}

fn ids(listings: &[EnrichedListing]) -> Vec<&str> {
    listings.iter().map(|listing| listing.id().as_str()).collect()
}

#[test]
fn worked_example_matches_hand_calculation() {
    let listing = RawListing::new("example", 200_000.0).with_days_on_market(2);
    let enriched = enrich(&[listing], &Assumptions::default());
    let example = &enriched[0];

    assert!((example.cap_rate_percent - 12.455_625).abs() < 1e-9);
    assert!((example.cash_on_cash_return_percent - 34.278_125).abs() < 1e-9);
    assert!((example.net_operating_income - 24_911.25).abs() < 1e-9);
    assert!((example.annual_cash_flow - 13_711.25).abs() < 1e-9);
    assert_eq!(example.heat_score, 90);
    assert_eq!(example.heat_tier(), HeatTier::Hot);
    assert_eq!(example.heat_tier().label(), "double-flame");
}

#[test]
fn malformed_records_never_void_the_batch() {
    let raw = whitefish();
    // The unparseable price record is dropped at decode time.
    assert_eq!(raw.len(), 5);

    let outcome = enrich_with_report(&raw, &Assumptions::default());
    assert_eq!(ids(&outcome.listings), vec!["3001", "3002", "3003", "3006"]);
    assert_eq!(outcome.excluded.len(), 1);
    assert_eq!(outcome.excluded[0].id, ListingId::new("3004"));
    assert!(outcome
        .listings
        .iter()
        .all(|listing| listing.cap_rate_percent.is_finite()
            && listing.cash_on_cash_return_percent.is_finite()
            && listing.heat_score <= 100));
}

#[test]
fn every_sort_key_orders_the_same_working_set() {
    let enriched = enrich(&whitefish(), &Assumptions::default());
    let none = RankingFilters::default();

    assert_eq!(
        ids(&rank(&enriched, &none, SortKey::PriceLow)),
        vec!["3001", "3002", "3006", "3003"]
    );
    assert_eq!(
        ids(&rank(&enriched, &none, SortKey::PriceHigh)),
        vec!["3003", "3002", "3006", "3001"]
    );
    // Equal cap rates fall back to id order.
    assert_eq!(
        ids(&rank(&enriched, &none, SortKey::CapRate)),
        vec!["3001", "3002", "3006", "3003"]
    );
    assert_eq!(
        ids(&rank(&enriched, &none, SortKey::CashOnCashReturn)),
        vec!["3001", "3002", "3006", "3003"]
    );

    let by_heat = rank(&enriched, &none, SortKey::HeatScore);
    assert!(by_heat
        .windows(2)
        .all(|pair| pair[0].heat_score >= pair[1].heat_score));
}

#[test]
fn raising_min_cap_rate_never_grows_the_result() {
    let enriched = enrich(&whitefish(), &Assumptions::default());
    let mut previous = usize::MAX;

    for threshold in 0..=20 {
        let filters = RankingFilters {
            min_cap_rate: Some(f64::from(threshold)),
            min_cash_on_cash: None,
        };
        let count = rank(&enriched, &filters, SortKey::CapRate).len();
        assert!(count <= previous, "threshold {threshold} grew the set");
        previous = count;
    }
}

#[test]
fn ranking_is_reproducible_across_passes() {
    let assumptions = Assumptions {
        nightly_rate: 240.0,
        occupancy_percent: 55.0,
        expense_percent: 40.0,
    };
    let filters = RankingFilters {
        min_cap_rate: Some(2.0),
        min_cash_on_cash: None,
    };

    let first = rank(&enrich(&whitefish(), &assumptions), &filters, SortKey::HeatScore);
    let second = rank(&enrich(&whitefish(), &assumptions), &filters, SortKey::HeatScore);

    assert_eq!(
        serde_json::to_vec(&first).expect("serializes"),
        serde_json::to_vec(&second).expect("serializes")
    );
}

#[test]
fn favorites_mark_but_never_reorder() {
    let mut session = ScreeningSession::default();
    session.replace_listings(whitefish());
    let baseline: Vec<String> = session
        .view(&RankingFilters::default(), SortKey::CapRate)
        .listings
        .iter()
        .map(|view| view.listing.id().to_string())
        .collect();

    session.toggle_favorite(&ListingId::new("3003"));
    let report = session.view(&RankingFilters::default(), SortKey::CapRate);
    let marked: Vec<String> = report
        .listings
        .iter()
        .map(|view| view.listing.id().to_string())
        .collect();

    assert_eq!(marked, baseline);
    assert_eq!(
        report
            .favorites()
            .map(|view| view.listing.id().as_str())
            .collect::<Vec<_>>(),
        vec!["3003"]
    );
}

#[test]
fn favorite_toggle_is_an_involution() {
    let set: FavoriteSet = ["3001", "3002"].into_iter().map(ListingId::new).collect();
    let id = ListingId::new("3006");

    assert_eq!(set.toggle(&id).toggle(&id), set);
    assert_eq!(set.toggle(&ListingId::new("3001")).len(), 1);
}

#[test]
fn csv_export_feeds_the_same_pipeline() {
    let csv = "zpid,price,zestimate,daysOnZillow,address\n\
               3001,200000,,2,1 Spruce Ln\n\
               3002,325000,400000,5,7 Ridge Rd\n";
    let raw = ListingImporter::from_reader(Cursor::new(csv), ListingFormat::Csv)
        .expect("csv imports");
    let from_csv = enrich(&raw, &Assumptions::default());
    let from_json = enrich(&whitefish()[..2], &Assumptions::default());

    assert_eq!(ids(&from_csv), ids(&from_json));
    for (csv_listing, json_listing) in from_csv.iter().zip(&from_json) {
        assert_eq!(csv_listing.heat_score, json_listing.heat_score);
        assert_eq!(csv_listing.cap_rate_percent, json_listing.cap_rate_percent);
    }
}
