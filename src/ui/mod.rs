//! UI layer: panels hold the controls and the overview table, charts render
//! the seven dashboard views.

pub mod charts;
pub mod panels;
