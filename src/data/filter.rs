use std::collections::BTreeSet;

use super::model::{StartupDataset, StartupRecord};

// ---------------------------------------------------------------------------
// Filter criteria: the sidebar selections, applied as one conjunctive predicate
// ---------------------------------------------------------------------------

/// First N markets (in sorted order) selected by default.
const DEFAULT_MARKET_COUNT: usize = 5;
/// Countries pre-selected when present in the data.
const DEFAULT_COUNTRIES: [&str; 2] = ["USA", "GBR"];
/// Default founded-year window, clamped to the data bounds.
const DEFAULT_YEAR_RANGE: (i32, i32) = (2005, 2015);
/// Default minimum funding threshold in USD.
const DEFAULT_MIN_FUNDING: f64 = 1_000_000.0;

/// Current filter selections. All clauses are AND-combined when applied.
///
/// An empty selection set matches no rows: deselecting every status (or
/// market, or country) empties the view rather than lifting the constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    /// Statuses a row may have.
    pub statuses: BTreeSet<String>,
    /// Markets a row may belong to.
    pub markets: BTreeSet<String>,
    /// Country codes a row may carry.
    pub countries: BTreeSet<String>,
    /// Inclusive founded-year range.
    pub year_range: (i32, i32),
    /// Rows must have at least this much total funding.
    pub min_funding: f64,
}

impl FilterCriteria {
    /// Default criteria for a freshly loaded dataset: every status, the first
    /// five markets, USA and GBR where present, 2005–2015 clamped to the data
    /// bounds, and a $1M funding floor clamped to the data maximum.
    pub fn defaults_for(dataset: &StartupDataset) -> Self {
        let statuses = dataset.statuses.iter().cloned().collect();
        let markets = dataset
            .markets
            .iter()
            .take(DEFAULT_MARKET_COUNT)
            .cloned()
            .collect();
        let countries = dataset
            .countries
            .iter()
            .filter(|c| DEFAULT_COUNTRIES.contains(&c.as_str()))
            .cloned()
            .collect();
        let year_range = (
            DEFAULT_YEAR_RANGE.0.clamp(dataset.year_min, dataset.year_max),
            DEFAULT_YEAR_RANGE.1.clamp(dataset.year_min, dataset.year_max),
        );
        let min_funding = DEFAULT_MIN_FUNDING.min(dataset.max_funding);

        FilterCriteria {
            statuses,
            markets,
            countries,
            year_range,
            min_funding,
        }
    }

    /// Whether a record passes every clause.
    fn matches(&self, record: &StartupRecord) -> bool {
        self.statuses.contains(&record.status)
            && self.markets.contains(&record.market)
            && self.countries.contains(&record.country_code)
            && record.founded_year >= self.year_range.0
            && record.founded_year <= self.year_range.1
            && record.funding_total_usd >= self.min_funding
    }
}

/// Return indices of records passing all filter clauses.
///
/// Indices avoid copying rows; the overview table and the aggregators walk
/// the dataset through this view.
pub fn filtered_indices(dataset: &StartupDataset, criteria: &FilterCriteria) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| criteria.matches(r))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(market: &str, country: &str, status: &str, year: i32, funding: f64) -> StartupRecord {
        StartupRecord {
            name: format!("{market}/{country}/{year}"),
            market: market.to_string(),
            country_code: country.to_string(),
            status: status.to_string(),
            founded_year: year,
            funding_total_usd: funding,
            funding_rounds: None,
            homepage_url: None,
        }
    }

    fn dataset() -> StartupDataset {
        StartupDataset::from_records(
            vec![
                record("software", "USA", "operating", 2010, 2_000_000.0),
                record("software", "GBR", "acquired", 2010, 500_000.0),
                record("biotech", "USA", "closed", 2003, 8_000_000.0),
                record("games", "DEU", "operating", 2012, 1_000_000.0),
            ],
            false,
            false,
        )
    }

    fn all_of(values: &[String]) -> BTreeSet<String> {
        values.iter().cloned().collect()
    }

    fn wide_open(ds: &StartupDataset) -> FilterCriteria {
        FilterCriteria {
            statuses: all_of(&ds.statuses),
            markets: all_of(&ds.markets),
            countries: all_of(&ds.countries),
            year_range: (ds.year_min, ds.year_max),
            min_funding: 0.0,
        }
    }

    #[test]
    fn wide_open_criteria_pass_everything() {
        let ds = dataset();
        assert_eq!(filtered_indices(&ds, &wide_open(&ds)), vec![0, 1, 2, 3]);
    }

    #[test]
    fn clauses_combine_conjunctively() {
        let ds = dataset();
        let mut criteria = wide_open(&ds);
        criteria.countries = ["USA".to_string()].into();
        criteria.year_range = (2005, 2015);
        criteria.min_funding = 1_000_000.0;
        // Row 1 fails country+funding, row 2 fails year, row 3 fails country.
        assert_eq!(filtered_indices(&ds, &criteria), vec![0]);
    }

    #[test]
    fn year_bounds_are_inclusive() {
        let ds = dataset();
        let mut criteria = wide_open(&ds);
        criteria.year_range = (2010, 2012);
        assert_eq!(filtered_indices(&ds, &criteria), vec![0, 1, 3]);
    }

    #[test]
    fn funding_threshold_admits_exact_matches() {
        let ds = dataset();
        let mut criteria = wide_open(&ds);
        criteria.min_funding = 1_000_000.0;
        assert_eq!(filtered_indices(&ds, &criteria), vec![0, 2, 3]);
    }

    #[test]
    fn empty_selection_set_matches_nothing() {
        let ds = dataset();
        let mut criteria = wide_open(&ds);
        criteria.statuses.clear();
        assert!(filtered_indices(&ds, &criteria).is_empty());
    }

    #[test]
    fn filtering_is_idempotent_and_a_subset() {
        let ds = dataset();
        let criteria = FilterCriteria::defaults_for(&ds);
        let first = filtered_indices(&ds, &criteria);
        let second = filtered_indices(&ds, &criteria);
        assert_eq!(first, second);
        assert!(first.len() <= ds.len());
        for &i in &first {
            let r = &ds.records[i];
            assert!(criteria.statuses.contains(&r.status));
            assert!(criteria.markets.contains(&r.market));
            assert!(criteria.countries.contains(&r.country_code));
            assert!(r.founded_year >= criteria.year_range.0);
            assert!(r.founded_year <= criteria.year_range.1);
            assert!(r.funding_total_usd >= criteria.min_funding);
        }
    }

    #[test]
    fn defaults_derive_from_the_dataset() {
        let ds = dataset();
        let criteria = FilterCriteria::defaults_for(&ds);
        assert_eq!(criteria.statuses, all_of(&ds.statuses));
        assert_eq!(criteria.markets.len(), ds.markets.len().min(5));
        assert_eq!(
            criteria.countries,
            ["GBR".to_string(), "USA".to_string()].into()
        );
        assert_eq!(criteria.year_range, (2005, 2012));
        assert_eq!(criteria.min_funding, 1_000_000.0);
    }

    #[test]
    fn threshold_above_max_funding_empties_the_view() {
        let ds = dataset();
        let mut criteria = wide_open(&ds);
        criteria.min_funding = ds.max_funding + 1.0;
        assert!(filtered_indices(&ds, &criteria).is_empty());
    }
}
