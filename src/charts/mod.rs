//! Charts module - chart specs and their interactive/static renderers

mod plotter;
mod renderer;
mod spec;

pub use plotter::{ChartPlotter, PALETTE};
pub use renderer::{RenderError, StaticChartRenderer};
pub use spec::{ChartBody, ChartKind, ChartPoint, ChartSpec, SegmentSeries};
