//! Grid-subsystem error type.

use thiserror::Error;

use gt_core::CoreError;

/// Errors produced by `gt-grid`.
#[derive(Debug, Error)]
pub enum GridError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("grid of {num_cells_x} x {num_cells_y} cells exceeds the {limit} cell limit; increase cell_size_m")]
    TooManyCells {
        num_cells_x: usize,
        num_cells_y: usize,
        limit:       usize,
    },
}

pub type GridResult<T> = Result<T, GridError>;
