use eframe::egui::{self, RichText, ScrollArea, Slider, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::StartupDataset;
use crate::state::{AppState, Facet};
use crate::ui::charts;

/// How many filtered rows the overview table shows.
const OVERVIEW_ROWS: usize = 20;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} startups loaded, {} matching filters",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(ui.visuals().error_fg_color));
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – filter controls
// ---------------------------------------------------------------------------

/// Render the sidebar filter controls.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Data");
    ui.separator();

    let Some(ds) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone the bounds and value lists so the controls can mutate state.
    let statuses = ds.statuses.clone();
    let markets = ds.markets.clone();
    let countries = ds.countries.clone();
    let (year_min, year_max) = (ds.year_min, ds.year_max);
    let max_funding = ds.max_funding;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            facet_section(ui, state, Facet::Status, "Status", &statuses);
            facet_section(ui, state, Facet::Market, "Market", &markets);
            facet_section(ui, state, Facet::Country, "Country", &countries);

            ui.separator();
            year_section(ui, state, year_min, year_max);

            ui.separator();
            funding_section(ui, state, max_funding);
        });
}

/// One collapsible multi-select: All/None buttons plus a checkbox per value.
fn facet_section(ui: &mut Ui, state: &mut AppState, facet: Facet, label: &str, values: &[String]) {
    let header = format!("{label}  ({}/{})", state.selected(facet).len(), values.len());

    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt(label)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all(facet);
                }
                if ui.small_button("None").clicked() {
                    state.select_none(facet);
                }
            });

            for value in values {
                let mut checked = state.selected(facet).contains(value);
                if ui.checkbox(&mut checked, value.as_str()).changed() {
                    state.toggle_value(facet, value);
                }
            }
        });
}

/// Inclusive founded-year range. Dragging one bound past the other pulls
/// the other bound along so lo ≤ hi always holds.
fn year_section(ui: &mut Ui, state: &mut AppState, year_min: i32, year_max: i32) {
    ui.strong("Founded Year");
    let (mut lo, mut hi) = state.criteria.year_range;
    let from = ui.add(Slider::new(&mut lo, year_min..=year_max).text("from"));
    let to = ui.add(Slider::new(&mut hi, year_min..=year_max).text("to"));
    if from.changed() || to.changed() {
        if lo > hi {
            if from.changed() {
                hi = lo;
            } else {
                lo = hi;
            }
        }
        state.criteria.year_range = (lo, hi);
        state.refilter();
    }
}

fn funding_section(ui: &mut Ui, state: &mut AppState, max_funding: f64) {
    ui.strong("Minimum Funding");
    let mut threshold = state.criteria.min_funding;
    let slider = ui.add(
        Slider::new(&mut threshold, 0.0..=max_funding)
            .step_by(500_000.0)
            .custom_formatter(|v, _| charts::human_usd(v)),
    );
    if slider.changed() {
        state.criteria.min_funding = threshold;
        state.refilter();
    }
}

// ---------------------------------------------------------------------------
// Central panel – overview table + dashboard
// ---------------------------------------------------------------------------

/// Render the central area: overview table and chart grid, or the empty /
/// no-dataset notices.
pub fn central_panel(ui: &mut Ui, state: &AppState) {
    let Some(ds) = &state.dataset else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a dataset to explore  (File → Open…)");
        });
        return;
    };

    // Empty view is a terminal state: the warning is the only output.
    if state.visible_indices.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label(
                RichText::new("No data available for the selected filters.")
                    .heading()
                    .color(ui.visuals().warn_fg_color),
            );
        });
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Filtered Startup Overview");
            ui.label(format!("Total startups: {}", state.visible_indices.len()));
            ui.add_space(8.0);
            overview_table(ui, ds, &state.visible_indices);
            ui.add_space(16.0);
            charts::dashboard(ui, ds, &state.visible_indices);
        });
}

/// The first [`OVERVIEW_ROWS`] filtered rows; homepage cells become links
/// only for well-formed http(s) URLs and stay blank otherwise.
fn overview_table(ui: &mut Ui, ds: &StartupDataset, view: &[usize]) {
    let mut table = TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().resizable(true))
        .column(Column::auto())
        .column(Column::auto())
        .column(Column::auto())
        .column(Column::auto())
        .column(Column::auto());
    if ds.has_homepage_url {
        table = table.column(Column::remainder());
    }

    table
        .header(20.0, |mut header| {
            for title in ["Name", "Market", "Country", "Status", "Founded", "Funding"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
            if ds.has_homepage_url {
                header.col(|ui| {
                    ui.strong("Homepage");
                });
            }
        })
        .body(|mut body| {
            for &index in view.iter().take(OVERVIEW_ROWS) {
                let record = &ds.records[index];
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(&record.name);
                    });
                    row.col(|ui| {
                        ui.label(&record.market);
                    });
                    row.col(|ui| {
                        ui.label(&record.country_code);
                    });
                    row.col(|ui| {
                        ui.label(&record.status);
                    });
                    row.col(|ui| {
                        ui.label(record.founded_year.to_string());
                    });
                    row.col(|ui| {
                        ui.label(charts::human_usd(record.funding_total_usd));
                    });
                    if ds.has_homepage_url {
                        row.col(|ui| {
                            if let Some(url) =
                                record.homepage_url.as_deref().filter(|u| is_http_url(u))
                            {
                                ui.hyperlink_to("Website", url);
                            }
                        });
                    }
                });
            }
        });
}

/// Only plain http(s) URLs with a host part qualify as links.
fn is_http_url(url: &str) -> bool {
    url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .is_some_and(|rest| !rest.is_empty())
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open investment data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} startups across {} markets",
                    dataset.len(),
                    dataset.markets.len()
                );
                state.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
