//! Presentation utilities for comparison reports — diverging difference-cell
//! coloring and table shaping. No aggregation logic lives here; everything
//! is a pure function of already-computed report values.

pub mod highlight;
pub mod table;

pub use highlight::{DivergingScale, Rgb};
pub use table::{Cell, RenderRow, RenderTable, ValueFormat};
