//! `gt-grid`: turns weighted points into a labeled grid graph.
//!
//! # Pipeline
//!
//! ```text
//! box filter → rasterize → (place facilities) → filter cells → label → adjacency
//! ```
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`raster`]    | `Grid`, `rasterize`, `cell_counts`                        |
//! | [`shape`]     | `ShapeIndex` (R-tree over polygon bounding boxes)         |
//! | [`filter`]    | `filter_cells` (threshold + shape union)                  |
//! | [`label`]     | `Node`, `NodeTable`                                       |
//! | [`adjacency`] | `AdjacencyList` (CSR), `build_adjacency`                  |
//! | [`facility`]  | `Facility`, `place_facilities`, `label_facilities`        |
//! | [`pipeline`]  | `TopologyBuilder`, `GridTopology`, `TopologyStatus`       |
//! | [`error`]     | `GridError`, `GridResult<T>`                              |

pub mod adjacency;
pub mod error;
pub mod facility;
pub mod filter;
pub mod label;
pub mod pipeline;
pub mod raster;
pub mod shape;


pub use adjacency::{build_adjacency, AdjacencyList};
pub use error::{GridError, GridResult};
pub use facility::{label_facilities, place_facilities, Facility, FacilityAssignment};
pub use filter::filter_cells;
pub use label::{Node, NodeTable};
pub use pipeline::{DegenerateReason, GridTopology, TopologyBuilder, TopologyStatus};
pub use raster::{cell_counts, rasterize, Grid};
pub use shape::ShapeIndex;
