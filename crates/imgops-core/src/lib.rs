//! imgops-core: dense 2D buffers, separable filters and operation chains
//! (sans-IO).
//!
//! The building blocks, bottom-up:
//!
//! - [`Buffer2d`]: owned, contiguous, row-major grid of numbers.
//! - [`filter`]: 1D correlation along either axis with a selectable
//!   [`BorderCondition`], and the box, Gaussian, difference and Sobel
//!   filters built on it.
//! - [`morphology::erode`]: binary erosion for integral buffers.
//! - [`canny`]: Canny edge detection with non-maximum suppression and
//!   hysteresis linking.
//! - [`OperationChain`]: an editable list of [`Operation`]s, each built
//!   from an [`OpConfig`], executed over float luminance buffers.
//!
//! This crate has **no I/O dependencies**. Images enter as encoded bytes
//! or [`image::RgbImage`]s through [`convert`] and leave the same way;
//! file handling lives in the binaries.

pub mod border;
pub mod buffer;
pub mod canny;
pub mod chain;
pub mod consts;
pub mod convert;
pub mod diagnostics;
pub mod error;
pub mod filter;
pub mod morphology;
pub mod ops;

pub use border::BorderCondition;
pub use buffer::{Buffer2d, Element, Position};
pub use canny::canny_edge_detection;
pub use chain::{ChainEntry, OpId, OperationChain};
pub use convert::{decode_luminance, luminance_from_rgb, to_display_rgb};
pub use diagnostics::{ChainDiagnostics, Clock, OperationDiagnostics};
pub use error::Error;
pub use ops::{
    CannyConfig, FilterConfig, GradConfig, GradType, ImageOperation, OpConfig, Operation,
    OperationKind, ThresholdConfig,
};
