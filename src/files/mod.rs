//! File operations behind the move, duplicate, remove and new-file actions

mod controller;
mod spec;

pub use controller::{
    filename_selection, FileController, MoveFileDialogOptions, NewFileDialogOptions,
};
pub use spec::FileSpec;
