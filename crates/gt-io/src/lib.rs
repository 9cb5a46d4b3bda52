//! `gt-io`: file formats of the gridtopo toolkit.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                         |
//! |---------------|------------------------------------------------------------------|
//! | [`points`]    | Households / facility CSV loaders, `Weighting`                   |
//! | [`geojson`]   | `FilterShape`, `load_shapes`, `select_shapes`, `fold_name`       |
//! | [`writer`]    | Population CSV, adjacency JSON, facility CSV, pretty JSON helper |
//! | [`elevation`] | `ElevationSource`, `ElevationBatcher`, elevation CSV             |
//! | [`error`]     | `InputError`, `OutputError`                                      |

pub mod elevation;
pub mod error;
pub mod geojson;
pub mod points;
pub mod writer;

#[cfg(test)]
mod tests;

pub use elevation::{load_node_locations, write_elevations_csv, ElevationBatcher, ElevationSource};
pub use error::{InputError, InputResult, OutputError, OutputResult};
pub use geojson::{fold_name, load_shapes, parse_shapes, select_shapes, FilterShape};
pub use points::{
    load_facilities_csv, load_facilities_reader, load_households_csv, load_households_reader, LoadedPoints,
    Weighting,
};
pub use writer::{
    node_population, write_adjacency_json, write_facilities_csv, write_json_pretty, write_population_csv,
    NO_CELL,
};
