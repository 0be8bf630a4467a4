//! Layout algorithms for flow graphs.
//!
//! - `flow`: level-based layout, level 0 on one edge of the canvas and the
//!   deepest level on the opposite edge
//! - `hilbert`: insertion-order walk along a Hilbert curve, ignores edges

mod flow;
mod hilbert;

pub use flow::{FlowLayout, layout_flow, rank_y, spread_x};
pub use hilbert::{HilbertLayout, d2xy, grid_order, layout_hilbert};
