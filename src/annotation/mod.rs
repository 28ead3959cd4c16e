//! Neuromodulator annotations drawn on top of the charts.
//!
//! This module is independent of any plotting backend. It owns:
//! - Modulator identity and display color
//! - Annotation schedules (built-in default or JSON file)
//! - Overlay block stacking

pub mod modulator;
pub mod overlay;
pub mod schedule;

pub use modulator::Modulator;
pub use overlay::{BLOCK_WIDTH, Block, stack_blocks};
pub use schedule::{Annotation, default_schedule, load_annotation_file};
