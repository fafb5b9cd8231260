//! Summary image rendering.

pub mod renderer;

pub use renderer::{RenderError, SummaryRenderer, SUMMARY_FILE_NAME};
