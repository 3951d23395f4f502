use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use eframe::egui::{Align2, Color32, FontId, Pos2, RichText, Sense, Shape, Stroke, Ui, Vec2};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line, Plot, PlotPoints, Points,
};

use crate::color::{generate_palette, CategoryColors};
use crate::data::aggregate::{self, ScatterPoint};
use crate::data::model::StartupDataset;

/// Line/series accent, matching the classic matplotlib blue.
const ACCENT: Color32 = Color32::from_rgb(31, 119, 180);

const CHART_HEIGHT: f32 = 280.0;

// ---------------------------------------------------------------------------
// Dashboard grid
// ---------------------------------------------------------------------------

/// Render the seven chart views over the filtered records, two per row:
/// [top-markets bar, funding-over-year line], [country pie, status box],
/// [rounds scatter, mean-funding bar], [acquisition-rate bar, (empty)].
pub fn dashboard(ui: &mut Ui, dataset: &StartupDataset, view: &[usize]) {
    let market_colors = CategoryColors::new(dataset.markets.iter().map(String::as_str));

    chart_row(
        ui,
        |ui| top_markets_chart(ui, dataset, view),
        |ui| yearly_funding_chart(ui, dataset, view),
    );
    chart_row(
        ui,
        |ui| country_pie_chart(ui, dataset, view),
        |ui| status_box_chart(ui, dataset, view),
    );
    chart_row(
        ui,
        |ui| rounds_scatter_chart(ui, dataset, view, &market_colors),
        |ui| avg_funding_chart(ui, dataset, view),
    );
    chart_row(
        ui,
        |ui| acquisition_rate_chart(ui, dataset, view),
        |_ui| {},
    );
}

fn chart_row(ui: &mut Ui, left: impl FnOnce(&mut Ui), right: impl FnOnce(&mut Ui)) {
    ui.columns(2, |cols| {
        left(&mut cols[0]);
        right(&mut cols[1]);
    });
    ui.add_space(12.0);
}

fn skipped_view(ui: &mut Ui, title: &str, notice: &str) {
    ui.strong(title);
    ui.add_space(4.0);
    ui.label(RichText::new(notice).italics().weak());
}

// ---------------------------------------------------------------------------
// Individual chart views
// ---------------------------------------------------------------------------

fn top_markets_chart(ui: &mut Ui, dataset: &StartupDataset, view: &[usize]) {
    ui.strong("Top Markets by Total Funding");
    let entries = aggregate::top_markets_by_funding(dataset, view);
    ranked_bar_chart(ui, "top_markets", &entries, "Total funding (USD)", human_usd, false);
}

fn yearly_funding_chart(ui: &mut Ui, dataset: &StartupDataset, view: &[usize]) {
    ui.strong("Total Funding Over Founded Years");
    let series = aggregate::funding_by_year(dataset, view);
    let points: PlotPoints = series
        .iter()
        .map(|&(year, total)| [year as f64, total])
        .collect();

    Plot::new("funding_by_year")
        .height(CHART_HEIGHT)
        .x_axis_label("Founded year")
        .y_axis_label("Total funding (USD)")
        .x_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| {
            format!("{:.0}", mark.value)
        })
        .y_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| human_usd(mark.value))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(points).color(ACCENT).width(2.0));
        });
}

fn country_pie_chart(ui: &mut Ui, dataset: &StartupDataset, view: &[usize]) {
    ui.strong("Startup Count by Country");
    let counts = aggregate::startup_count_by_country(dataset, view);
    pie_chart(ui, &counts);
}

fn status_box_chart(ui: &mut Ui, dataset: &StartupDataset, view: &[usize]) {
    ui.strong("Funding Distribution by Status (log scale)");
    let groups = aggregate::funding_by_status(dataset, view);
    let colors = generate_palette(groups.len());

    let mut elems = Vec::new();
    let mut labels = Vec::new();
    for ((status, values), color) in groups.iter().zip(colors) {
        let Some(stats) = log_box_stats(values) else {
            continue;
        };
        elems.push(
            BoxElem::new(
                labels.len() as f64,
                BoxSpread::new(stats.min, stats.q1, stats.median, stats.q3, stats.max),
            )
            .name(status)
            .box_width(0.5)
            .fill(color.gamma_multiply(0.4))
            .stroke(Stroke::new(1.5, color)),
        );
        labels.push(status.clone());
    }

    Plot::new("funding_by_status")
        .height(CHART_HEIGHT)
        .y_axis_label("Funding (USD)")
        .x_axis_formatter(index_labels(labels))
        .y_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| {
            human_usd(10f64.powf(mark.value))
        })
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(elems));
        });
}

fn rounds_scatter_chart(
    ui: &mut Ui,
    dataset: &StartupDataset,
    view: &[usize],
    market_colors: &CategoryColors,
) {
    let title = "Funding Rounds vs Total Funding";
    let Some(points) = aggregate::rounds_vs_funding(dataset, view) else {
        skipped_view(ui, title, "Funding rounds data not available for the scatter view.");
        return;
    };
    ui.strong(title);

    // One series per market so the legend collapses to market entries.
    let mut by_market: BTreeMap<&str, Vec<&ScatterPoint>> = BTreeMap::new();
    for p in &points {
        by_market.entry(p.market.as_str()).or_default().push(p);
    }

    Plot::new("rounds_vs_funding")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Funding rounds")
        .y_axis_label("Total funding (USD)")
        .y_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| {
            human_usd(10f64.powf(mark.value))
        })
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (market, market_points) in by_market {
                let color = market_colors.color_for(market);
                for p in market_points {
                    let coords: PlotPoints = vec![[p.rounds as f64, log_scale(p.funding)]].into();
                    plot_ui.points(
                        Points::new(coords)
                            .color(color)
                            .radius(point_radius(p.funding))
                            .name(market),
                    );
                }
            }
        });
}

fn avg_funding_chart(ui: &mut Ui, dataset: &StartupDataset, view: &[usize]) {
    ui.strong("Average Funding per Market");
    let entries = aggregate::avg_funding_by_market(dataset, view);
    ranked_bar_chart(ui, "avg_funding", &entries, "Average funding (USD)", human_usd, false);
}

fn acquisition_rate_chart(ui: &mut Ui, dataset: &StartupDataset, view: &[usize]) {
    let title = "Acquisition Rate by Market";
    let Some(entries) = aggregate::acquisition_rate_by_market(dataset, view) else {
        skipped_view(ui, title, "No acquisitions in the filtered data.");
        return;
    };
    ui.strong(title);
    ranked_bar_chart(ui, "acq_rate", &entries, "Acquisition rate", percent_label, true);
}

// ---------------------------------------------------------------------------
// Chart building blocks
// ---------------------------------------------------------------------------

/// Vertical bar chart over ranked (label, value) entries; bar positions are
/// indices with the labels mapped back onto the axis.
fn ranked_bar_chart(
    ui: &mut Ui,
    id: &str,
    entries: &[(String, f64)],
    value_label: &str,
    fmt: fn(f64) -> String,
    unit_bounds: bool,
) {
    let colors = generate_palette(entries.len());
    let bars: Vec<Bar> = entries
        .iter()
        .zip(colors)
        .enumerate()
        .map(|(i, ((label, value), color))| {
            Bar::new(i as f64, *value).width(0.6).name(label).fill(color)
        })
        .collect();
    let labels: Vec<String> = entries.iter().map(|(label, _)| label.clone()).collect();

    let mut plot = Plot::new(id.to_string())
        .height(CHART_HEIGHT)
        .y_axis_label(value_label)
        .x_axis_formatter(index_labels(labels))
        .y_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| fmt(mark.value))
        .allow_scroll(false);
    if unit_bounds {
        plot = plot.include_y(0.0).include_y(1.0);
    }
    plot.show(ui, |plot_ui| {
        plot_ui.bar_chart(BarChart::new(bars));
    });
}

/// Axis formatter that maps integer grid positions back to category labels.
fn index_labels(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark, _range| {
        if mark.value < -0.25 {
            return String::new();
        }
        let index = mark.value.round();
        if (mark.value - index).abs() > 0.25 {
            return String::new();
        }
        labels.get(index as usize).cloned().unwrap_or_default()
    }
}

/// Painter-drawn pie over (label, count) slices with a percentage legend.
/// egui_plot has no pie primitive, so the slices are triangle fans on a
/// reserved canvas.
fn pie_chart(ui: &mut Ui, entries: &[(String, usize)]) {
    let total: usize = entries.iter().map(|(_, count)| *count).sum();
    if total == 0 {
        ui.label(RichText::new("No countries to chart.").italics().weak());
        return;
    }

    let colors = generate_palette(entries.len());
    let (response, painter) =
        ui.allocate_painter(Vec2::new(ui.available_width(), CHART_HEIGHT), Sense::hover());
    let rect = response.rect;
    let radius = (rect.height() * 0.9).min(rect.width() * 0.55) * 0.5;
    let center = Pos2::new(rect.left() + rect.width() * 0.32, rect.center().y);
    let on_rim = |angle: f64| {
        Pos2::new(
            center.x + radius * angle.cos() as f32,
            center.y + radius * angle.sin() as f32,
        )
    };

    // Slices start at 12 o'clock and run clockwise.
    let mut angle = -std::f64::consts::FRAC_PI_2;
    let mut boundaries = vec![on_rim(angle)];
    for ((_, count), color) in entries.iter().zip(&colors) {
        let sweep = *count as f64 / total as f64 * std::f64::consts::TAU;
        let steps = (sweep / 0.05).ceil().max(1.0) as usize;
        let mut prev = on_rim(angle);
        for step in 1..=steps {
            let next = on_rim(angle + sweep * step as f64 / steps as f64);
            painter.add(Shape::convex_polygon(
                vec![center, prev, next],
                *color,
                Stroke::NONE,
            ));
            prev = next;
        }
        angle += sweep;
        boundaries.push(on_rim(angle));
    }
    for rim in boundaries {
        painter.line_segment([center, rim], Stroke::new(1.0, ui.visuals().extreme_bg_color));
    }

    // Percentage legend beside the pie.
    let mut y = rect.top() + 16.0;
    let legend_x = rect.left() + rect.width() * 0.66;
    for ((label, count), color) in entries.iter().zip(&colors) {
        let share = *count as f64 / total as f64 * 100.0;
        painter.circle_filled(Pos2::new(legend_x, y), 5.0, *color);
        painter.text(
            Pos2::new(legend_x + 12.0, y),
            Align2::LEFT_CENTER,
            format!("{label}  {share:.1}%"),
            FontId::proportional(13.0),
            ui.visuals().text_color(),
        );
        y += 18.0;
    }
}

// ---------------------------------------------------------------------------
// Scales and labels
// ---------------------------------------------------------------------------

/// log₁₀ display scale with a $1 floor: zero-funding rows are legitimate
/// after loader normalization, and log of zero is undefined.
fn log_scale(value: f64) -> f64 {
    value.max(1.0).log10()
}

/// Scatter point radius grows with the log of the funding amount.
fn point_radius(funding: f64) -> f32 {
    (1.5 + log_scale(funding) as f32 * 0.55).clamp(1.5, 7.5)
}

/// Compact USD label: $850, $1.2K, $3.4M, $5.6B.
pub fn human_usd(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1e9 {
        format!("${:.1}B", value / 1e9)
    } else if magnitude >= 1e6 {
        format!("${:.1}M", value / 1e6)
    } else if magnitude >= 1e3 {
        format!("${:.1}K", value / 1e3)
    } else {
        format!("${value:.0}")
    }
}

fn percent_label(value: f64) -> String {
    format!("{:.0}%", value * 100.0)
}

/// Five-number summary on the log display scale.
struct LogBoxStats {
    min: f64,
    q1: f64,
    median: f64,
    q3: f64,
    max: f64,
}

fn log_box_stats(values: &[f64]) -> Option<LogBoxStats> {
    if values.is_empty() {
        return None;
    }
    let mut scaled: Vec<f64> = values.iter().map(|&v| log_scale(v)).collect();
    scaled.sort_by(f64::total_cmp);
    Some(LogBoxStats {
        min: scaled[0],
        q1: quantile(&scaled, 0.25),
        median: quantile(&scaled, 0.5),
        q3: quantile(&scaled, 0.75),
        max: scaled[scaled.len() - 1],
    })
}

/// Linear-interpolation quantile over sorted values.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let low = position.floor() as usize;
    let high = position.ceil() as usize;
    sorted[low] + (sorted[high] - sorted[low]) * (position - low as f64)
}
