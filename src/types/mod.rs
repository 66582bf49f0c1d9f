//! Data types for the grid view model.

mod cell;
mod patch;
mod raw_row;

pub use cell::*;
pub use patch::*;
pub use raw_row::*;
