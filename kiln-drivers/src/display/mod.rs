//! Status display implementations

pub mod text;

pub use text::{TextSink, TextStatusDisplay, ROWS, ROW_WIDTH};
