use std::collections::BTreeSet;

use crate::data::filter::{filtered_indices, FilterCriteria};
use crate::data::model::StartupDataset;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which multi-select facet a sidebar control operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet {
    Status,
    Market,
    Country,
}

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<StartupDataset>,

    /// Current sidebar selections.
    pub criteria: FilterCriteria,

    /// Indices of records passing the current filters (recomputed on every
    /// filter change, cached between interactions).
    pub visible_indices: Vec<usize>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Ingest a newly loaded dataset and apply the default criteria.
    pub fn set_dataset(&mut self, dataset: StartupDataset) {
        self.criteria = FilterCriteria::defaults_for(&dataset);
        self.visible_indices = filtered_indices(&dataset, &self.criteria);
        self.dataset = Some(dataset);
        self.status_message = None;
    }

    /// Recompute `visible_indices` after a criteria change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.visible_indices = filtered_indices(ds, &self.criteria);
        }
    }

    /// The dataset's full value list for a facet.
    pub fn facet_values(&self, facet: Facet) -> &[String] {
        let Some(ds) = &self.dataset else { return &[] };
        match facet {
            Facet::Status => &ds.statuses,
            Facet::Market => &ds.markets,
            Facet::Country => &ds.countries,
        }
    }

    /// The currently selected values for a facet.
    pub fn selected(&self, facet: Facet) -> &BTreeSet<String> {
        match facet {
            Facet::Status => &self.criteria.statuses,
            Facet::Market => &self.criteria.markets,
            Facet::Country => &self.criteria.countries,
        }
    }

    fn selected_mut(&mut self, facet: Facet) -> &mut BTreeSet<String> {
        match facet {
            Facet::Status => &mut self.criteria.statuses,
            Facet::Market => &mut self.criteria.markets,
            Facet::Country => &mut self.criteria.countries,
        }
    }

    /// Toggle a single value in a facet's selection.
    pub fn toggle_value(&mut self, facet: Facet, value: &str) {
        let selected = self.selected_mut(facet);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.refilter();
    }

    /// Select every value of a facet.
    pub fn select_all(&mut self, facet: Facet) {
        let all: BTreeSet<String> = self.facet_values(facet).iter().cloned().collect();
        *self.selected_mut(facet) = all;
        self.refilter();
    }

    /// Deselect every value of a facet.
    pub fn select_none(&mut self, facet: Facet) {
        self.selected_mut(facet).clear();
        self.refilter();
    }
}
