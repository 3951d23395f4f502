use std::collections::BTreeMap;

use super::model::{StartupDataset, STATUS_ACQUIRED};

// ---------------------------------------------------------------------------
// Chart aggregates, one function per view
// ---------------------------------------------------------------------------
//
// Each function is a pure transform over (dataset, filtered indices) and
// feeds exactly one chart. Ranked views sort strictly descending by their
// reduction value (ties alphabetical) and truncate to a fixed top-N.

/// How many markets the total-funding ranking keeps.
pub const TOP_MARKETS: usize = 10;
/// How many entries the country, mean-funding, and acquisition rankings keep.
pub const TOP_SLICES: usize = 7;

/// One point of the rounds-vs-funding scatter view.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub rounds: u32,
    pub funding: f64,
    pub market: String,
    pub name: String,
    pub status: String,
}

/// Markets ranked by summed funding, top 10.
pub fn top_markets_by_funding(dataset: &StartupDataset, view: &[usize]) -> Vec<(String, f64)> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for &i in view {
        let r = &dataset.records[i];
        *totals.entry(r.market.as_str()).or_default() += r.funding_total_usd;
    }
    rank_descending(totals, TOP_MARKETS)
}

/// Summed funding per founded year, in natural year order.
pub fn funding_by_year(dataset: &StartupDataset, view: &[usize]) -> Vec<(i32, f64)> {
    let mut totals: BTreeMap<i32, f64> = BTreeMap::new();
    for &i in view {
        let r = &dataset.records[i];
        *totals.entry(r.founded_year).or_default() += r.funding_total_usd;
    }
    totals.into_iter().collect()
}

/// Countries ranked by startup count, top 7.
pub fn startup_count_by_country(dataset: &StartupDataset, view: &[usize]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for &i in view {
        *counts.entry(dataset.records[i].country_code.as_str()).or_default() += 1;
    }
    let mut out: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out.truncate(TOP_SLICES);
    out
}

/// Raw funding values grouped by status, in status order.
///
/// No reduction happens here: the box-plot view derives its distribution
/// from the values, and the log-scale handling of zeros is a display
/// concern, not a data one.
pub fn funding_by_status(dataset: &StartupDataset, view: &[usize]) -> Vec<(String, Vec<f64>)> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for &i in view {
        let r = &dataset.records[i];
        groups
            .entry(r.status.as_str())
            .or_default()
            .push(r.funding_total_usd);
    }
    groups
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Per-record (rounds, funding) points for the scatter view.
///
/// Returns None when the dataset has no funding_rounds column; records with
/// an absent cell are skipped.
pub fn rounds_vs_funding(dataset: &StartupDataset, view: &[usize]) -> Option<Vec<ScatterPoint>> {
    if !dataset.has_funding_rounds {
        return None;
    }
    Some(
        view.iter()
            .filter_map(|&i| {
                let r = &dataset.records[i];
                r.funding_rounds.map(|rounds| ScatterPoint {
                    rounds,
                    funding: r.funding_total_usd,
                    market: r.market.clone(),
                    name: r.name.clone(),
                    status: r.status.clone(),
                })
            })
            .collect(),
    )
}

/// Markets ranked by mean funding, top 7.
pub fn avg_funding_by_market(dataset: &StartupDataset, view: &[usize]) -> Vec<(String, f64)> {
    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for &i in view {
        let r = &dataset.records[i];
        let entry = sums.entry(r.market.as_str()).or_default();
        entry.0 += r.funding_total_usd;
        entry.1 += 1;
    }
    let means: BTreeMap<&str, f64> = sums
        .into_iter()
        .map(|(market, (sum, count))| (market, sum / count as f64))
        .collect();
    rank_descending(means, TOP_SLICES)
}

/// Markets ranked by the share of their startups that were acquired, top 7.
///
/// Returns None when no record in the view has the "acquired" status.
pub fn acquisition_rate_by_market(
    dataset: &StartupDataset,
    view: &[usize],
) -> Option<Vec<(String, f64)>> {
    let mut tallies: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for &i in view {
        let r = &dataset.records[i];
        let entry = tallies.entry(r.market.as_str()).or_default();
        entry.1 += 1;
        if r.status == STATUS_ACQUIRED {
            entry.0 += 1;
        }
    }
    if !tallies.values().any(|&(acquired, _)| acquired > 0) {
        return None;
    }
    let rates: BTreeMap<&str, f64> = tallies
        .into_iter()
        .map(|(market, (acquired, total))| (market, acquired as f64 / total as f64))
        .collect();
    Some(rank_descending(rates, TOP_SLICES))
}

/// Sort a grouped reduction descending by value and keep the top `n`.
/// BTreeMap iteration plus a stable sort keeps equal values alphabetical.
fn rank_descending(map: BTreeMap<&str, f64>, n: usize) -> Vec<(String, f64)> {
    let mut out: Vec<(String, f64)> = map.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
    out.sort_by(|a, b| b.1.total_cmp(&a.1));
    out.truncate(n);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filtered_indices, FilterCriteria};
    use crate::data::model::StartupRecord;

    fn record(
        market: &str,
        country: &str,
        status: &str,
        year: i32,
        funding: f64,
        rounds: Option<u32>,
    ) -> StartupRecord {
        StartupRecord {
            name: format!("{market}/{country}/{year}"),
            market: market.to_string(),
            country_code: country.to_string(),
            status: status.to_string(),
            founded_year: year,
            funding_total_usd: funding,
            funding_rounds: rounds,
            homepage_url: None,
        }
    }

    fn all_indices(ds: &StartupDataset) -> Vec<usize> {
        (0..ds.len()).collect()
    }

    #[test]
    fn market_totals_rank_descending() {
        let ds = StartupDataset::from_records(
            vec![
                record("software", "USA", "operating", 2010, 2_000_000.0, None),
                record("biotech", "USA", "operating", 2010, 5_000_000.0, None),
                record("software", "USA", "operating", 2011, 1_000_000.0, None),
            ],
            false,
            false,
        );
        let ranked = top_markets_by_funding(&ds, &all_indices(&ds));
        assert_eq!(
            ranked,
            vec![
                ("biotech".to_string(), 5_000_000.0),
                ("software".to_string(), 3_000_000.0),
            ]
        );
    }

    #[test]
    fn equal_totals_rank_alphabetically() {
        let ds = StartupDataset::from_records(
            vec![
                record("zeta", "USA", "operating", 2010, 1_000_000.0, None),
                record("alpha", "USA", "operating", 2010, 1_000_000.0, None),
            ],
            false,
            false,
        );
        let ranked = top_markets_by_funding(&ds, &all_indices(&ds));
        assert_eq!(ranked[0].0, "alpha");
        assert_eq!(ranked[1].0, "zeta");
    }

    #[test]
    fn country_counts_truncate_to_top_seven() {
        let mut records = Vec::new();
        for (i, code) in ["AAA", "BBB", "CCC", "DDD", "EEE", "FFF", "GGG", "HHH"]
            .iter()
            .enumerate()
        {
            for _ in 0..=i {
                records.push(record("m", code, "operating", 2010, 0.0, None));
            }
        }
        let ds = StartupDataset::from_records(records, false, false);
        let counts = startup_count_by_country(&ds, &all_indices(&ds));
        assert_eq!(counts.len(), TOP_SLICES);
        assert_eq!(counts[0], ("HHH".to_string(), 8));
        assert!(counts.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn yearly_totals_come_in_year_order() {
        let ds = StartupDataset::from_records(
            vec![
                record("m", "USA", "operating", 2012, 10.0, None),
                record("m", "USA", "operating", 2008, 20.0, None),
                record("m", "USA", "operating", 2012, 5.0, None),
            ],
            false,
            false,
        );
        assert_eq!(
            funding_by_year(&ds, &all_indices(&ds)),
            vec![(2008, 20.0), (2012, 15.0)]
        );
    }

    #[test]
    fn status_groups_pass_raw_values_through() {
        let ds = StartupDataset::from_records(
            vec![
                record("m", "USA", "operating", 2010, 0.0, None),
                record("m", "USA", "acquired", 2010, 3.0, None),
                record("m", "USA", "operating", 2010, 7.0, None),
            ],
            false,
            false,
        );
        let groups = funding_by_status(&ds, &all_indices(&ds));
        assert_eq!(
            groups,
            vec![
                ("acquired".to_string(), vec![3.0]),
                ("operating".to_string(), vec![0.0, 7.0]),
            ]
        );
    }

    #[test]
    fn scatter_requires_the_rounds_column() {
        let ds = StartupDataset::from_records(
            vec![record("m", "USA", "operating", 2010, 1.0, None)],
            false,
            false,
        );
        assert!(rounds_vs_funding(&ds, &all_indices(&ds)).is_none());
    }

    #[test]
    fn scatter_skips_records_without_a_rounds_cell() {
        let ds = StartupDataset::from_records(
            vec![
                record("m", "USA", "operating", 2010, 1.0, Some(3)),
                record("m", "USA", "operating", 2011, 2.0, None),
            ],
            true,
            false,
        );
        let points = rounds_vs_funding(&ds, &all_indices(&ds)).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].rounds, 3);
    }

    #[test]
    fn mean_funding_divides_by_group_size() {
        let ds = StartupDataset::from_records(
            vec![
                record("software", "USA", "operating", 2010, 4_000_000.0, None),
                record("software", "USA", "operating", 2011, 2_000_000.0, None),
                record("biotech", "USA", "operating", 2010, 5_000_000.0, None),
            ],
            false,
            false,
        );
        let means = avg_funding_by_market(&ds, &all_indices(&ds));
        assert_eq!(
            means,
            vec![
                ("biotech".to_string(), 5_000_000.0),
                ("software".to_string(), 3_000_000.0),
            ]
        );
    }

    #[test]
    fn acquisition_rate_needs_an_acquired_record() {
        let ds = StartupDataset::from_records(
            vec![
                record("software", "USA", "operating", 2010, 1.0, None),
                record("software", "USA", "closed", 2010, 1.0, None),
            ],
            false,
            false,
        );
        assert!(acquisition_rate_by_market(&ds, &all_indices(&ds)).is_none());
    }

    #[test]
    fn acquisition_rate_is_acquired_over_total() {
        let ds = StartupDataset::from_records(
            vec![
                record("software", "USA", "acquired", 2010, 1.0, None),
                record("software", "USA", "operating", 2010, 1.0, None),
                record("biotech", "USA", "acquired", 2010, 1.0, None),
            ],
            false,
            false,
        );
        let rates = acquisition_rate_by_market(&ds, &all_indices(&ds)).unwrap();
        assert_eq!(
            rates,
            vec![("biotech".to_string(), 1.0), ("software".to_string(), 0.5)]
        );
    }

    /// The worked example: only the USA software row survives the filter, so
    /// the market total reflects it alone and the acquisition view is off.
    #[test]
    fn filtered_view_drives_every_aggregate() {
        let ds = StartupDataset::from_records(
            vec![
                record("software", "USA", "operating", 2010, 2_000_000.0, None),
                record("software", "GBR", "acquired", 2010, 500_000.0, None),
            ],
            false,
            false,
        );
        let criteria = FilterCriteria {
            statuses: ds.statuses.iter().cloned().collect(),
            markets: ds.markets.iter().cloned().collect(),
            countries: ["USA".to_string()].into(),
            year_range: (2005, 2015),
            min_funding: 1_000_000.0,
        };
        let view = filtered_indices(&ds, &criteria);
        assert_eq!(view, vec![0]);
        assert_eq!(
            top_markets_by_funding(&ds, &view),
            vec![("software".to_string(), 2_000_000.0)]
        );
        assert!(acquisition_rate_by_market(&ds, &view).is_none());
    }
}
