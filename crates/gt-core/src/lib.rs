//! `gt-core`: foundational types for the `gridtopo` toolkit.
//!
//! This crate is a dependency of every other `gt-*` crate.  It has no `gt-*`
//! dependencies and only `thiserror` (plus optional `serde`) externally.
//!
//! # What lives here
//!
//! | Module     | Contents                                                 |
//! |------------|----------------------------------------------------------|
//! | [`geo`]    | `GeoPoint`, `WeightedPoint`, Vincenty / haversine       |
//! | [`bbox`]   | `BoundingBox` and its strict containment test            |
//! | [`ids`]    | `CellIndex` (grid position), `NodeLabel` (node identity) |
//! | [`config`] | `GridConfig` and the enums it is built from              |
//! | [`error`]  | `CoreError`, `CoreResult`                                |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod bbox;
pub mod config;
pub mod error;
pub mod geo;
pub mod ids;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use bbox::BoundingBox;
pub use config::{BinExtent, GridConfig, LabelScheme, SelfLoops, ShapeSelector, UnitWeight};
pub use error::{CoreError, CoreResult};
pub use geo::{GeoPoint, WeightedPoint};
pub use ids::{CellIndex, NodeLabel};
