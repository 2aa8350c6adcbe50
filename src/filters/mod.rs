//! Filter stages of the edge-map pipeline.
//!
//! ## Supported Formats
//!
//! | Format | Shape | Type | Channel order |
//! |--------|-------|------|---------------|
//! | Grayscale8 | (H, W, 1) | u8 | intensity |
//! | BGR8 | (H, W, 3) | u8 | blue, green, red |
//! | RGBA8 | (H, W, 4) | u8 | red, green, blue, alpha |
//!
//! Color input is reduced to one intensity plane first; every later stage
//! works on `(H, W)` planes. Only the final expansion returns to 4 channels.
//!
//! ## Stages
//!
//! - **grayscale**: BT.601 luma reduction
//! - **blur**: separable Gaussian, replicated border
//! - **edge**: Sobel gradients, non-maximum suppression, hysteresis, RGBA expansion

pub mod core;
pub mod grayscale;
pub mod blur;
pub mod edge;
