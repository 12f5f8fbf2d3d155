//! Presentation layer: display-slot state consumed by views.

/// Per-slot image display state machine.
pub mod image_slot;

pub use image_slot::{DisplayUrl, ImageSlot, SlotConfig, SlotHandle, SlotState};
