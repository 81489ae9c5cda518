//! Coordinate mapping between the slicing canvas and the source image.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   fit()    ┌──────────────────┐
//! │  Source image    │ ─────────▶ │  DisplayLayout   │  (uniform scale)
//! └──────────────────┘            └────────┬─────────┘
//!                                          │ display_height()
//!                                          ▼
//!                                 ┌──────────────────┐
//!                                 │  BoundaryLines   │  (display space)
//!                                 └────────┬─────────┘
//!                                          │ compute_regions()
//!                                          ▼
//!                                 ┌──────────────────┐
//!                                 │  SliceRegion[]   │  (source rows)
//!                                 └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use strip_slicer::geometry::{compute_regions, BoundaryLines, CanvasSize, DisplayLayout};
//!
//! let layout = DisplayLayout::fit(CanvasSize::new(1700.0, 1500.0), 1000, 3000).unwrap();
//! let lines = BoundaryLines::evenly_spaced(3, layout.display_height()).unwrap();
//!
//! let regions = compute_regions(lines.positions(), layout.scale(), 3000).unwrap();
//! assert_eq!(regions.len(), 3);
//! assert_eq!((regions[1].start_row, regions[1].end_row), (1000, 2000));
//! ```

mod layout;
mod lines;
mod regions;

pub use layout::{CanvasSize, DisplayLayout, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};
pub use lines::BoundaryLines;
pub use regions::{compute_regions, SliceRegion};
