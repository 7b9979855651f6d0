//! Parameter binding layer: control values, their mappings and the
//! publish / server-override behaviour of each control.

pub mod panel;
pub mod params;

pub use panel::{ControlPanel, DEFAULT_DEVICES, DisplayUpdate, ModelMenu, Slider};
pub use params::{SLIDERS, SliderParam};
