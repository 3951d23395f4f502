use std::collections::BTreeSet;

/// Lifecycle label counted by the acquisition-rate view.
pub const STATUS_ACQUIRED: &str = "acquired";

// ---------------------------------------------------------------------------
// StartupRecord – one row of the dataset
// ---------------------------------------------------------------------------

/// A single startup investment record (one row of the source table).
#[derive(Debug, Clone, PartialEq)]
pub struct StartupRecord {
    pub name: String,
    /// Market category, e.g. "software" or "biotech".
    pub market: String,
    /// ISO-like country code, e.g. "USA" or "GBR".
    pub country_code: String,
    /// Lifecycle status, e.g. "operating", "acquired", "closed".
    pub status: String,
    /// Founded year; 0 when the source cell was missing or unparseable.
    pub founded_year: i32,
    /// Total funding in USD; 0.0 when missing or unparseable. Never negative.
    pub funding_total_usd: f64,
    /// Number of funding rounds; None when the column or cell is absent.
    pub funding_rounds: Option<u32>,
    /// Homepage URL as found in the source; None when the cell is empty.
    pub homepage_url: Option<String>,
}

// ---------------------------------------------------------------------------
// StartupDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with indexes computed once at load time.
///
/// The unique-value lists bound the sidebar multi-selects, the year and
/// funding bounds clamp the sliders, and the presence flags gate the two
/// optional chart views.
#[derive(Debug, Clone, Default)]
pub struct StartupDataset {
    /// All records (rows), in source order.
    pub records: Vec<StartupRecord>,
    /// Sorted unique lifecycle statuses (blank cells excluded).
    pub statuses: Vec<String>,
    /// Sorted unique market categories.
    pub markets: Vec<String>,
    /// Sorted unique country codes.
    pub countries: Vec<String>,
    /// Smallest founded year present (0 when the dataset is empty).
    pub year_min: i32,
    /// Largest founded year present.
    pub year_max: i32,
    /// Largest total funding present.
    pub max_funding: f64,
    /// Whether the source carried a funding_rounds column.
    pub has_funding_rounds: bool,
    /// Whether the source carried a homepage_url column.
    pub has_homepage_url: bool,
}

impl StartupDataset {
    /// Build the load-time indexes from parsed records.
    pub fn from_records(
        records: Vec<StartupRecord>,
        has_funding_rounds: bool,
        has_homepage_url: bool,
    ) -> Self {
        let mut statuses: BTreeSet<&str> = BTreeSet::new();
        let mut markets: BTreeSet<&str> = BTreeSet::new();
        let mut countries: BTreeSet<&str> = BTreeSet::new();
        let mut year_min = i32::MAX;
        let mut year_max = i32::MIN;
        let mut max_funding = 0.0f64;

        for r in &records {
            if !r.status.is_empty() {
                statuses.insert(&r.status);
            }
            if !r.market.is_empty() {
                markets.insert(&r.market);
            }
            if !r.country_code.is_empty() {
                countries.insert(&r.country_code);
            }
            year_min = year_min.min(r.founded_year);
            year_max = year_max.max(r.founded_year);
            max_funding = max_funding.max(r.funding_total_usd);
        }

        if records.is_empty() {
            year_min = 0;
            year_max = 0;
        }

        let own = |set: BTreeSet<&str>| set.iter().map(|s| s.to_string()).collect();
        StartupDataset {
            statuses: own(statuses),
            markets: own(markets),
            countries: own(countries),
            year_min,
            year_max,
            max_funding,
            has_funding_rounds,
            has_homepage_url,
            records,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
