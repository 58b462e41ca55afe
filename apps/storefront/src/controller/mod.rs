//! Controller layer: screen outcomes, UI error modeling, and command orchestration.

pub mod events;
pub mod orchestration;
