//! Pluggable image operations and their configurations.
//!
//! Each operation is built from exactly one [`OpConfig`] variant and maps
//! a float luminance buffer to a new one through
//! [`ImageOperation::perform`].
//!
//! # Closed set
//!
//! [`Operation`] is an enum over the four concrete operations. Adding a
//! kind means adding a config variant, an operation struct and a match
//! arm; the compiler then points at every dispatch site that needs it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::border::BorderCondition;
use crate::buffer::Buffer2d;
use crate::canny::{EDGE, canny_edge_detection};
use crate::error::Error;
use crate::filter::{gauss_filter, sobel_magnitude, sobel_x, sobel_y, threshold_image};

/// Pointwise threshold: `true_val` where the input is at least
/// `thresh`, `false_val` elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Inclusive lower bound for `true_val`.
    pub thresh: f32,
    /// Output value at or above the threshold.
    pub true_val: f32,
    /// Output value below the threshold.
    pub false_val: f32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            thresh: 128.0,
            true_val: 255.0,
            false_val: 0.0,
        }
    }
}

/// Separable Gaussian smoothing with independent radius and sigma per
/// axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Half-width of the horizontal kernel.
    pub kernel_radius_x: usize,
    /// Half-width of the vertical kernel.
    pub kernel_radius_y: usize,
    /// Horizontal standard deviation in pixels.
    pub sigma_x: f32,
    /// Vertical standard deviation in pixels.
    pub sigma_y: f32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            kernel_radius_x: 2,
            kernel_radius_y: 2,
            sigma_x: 1.0,
            sigma_y: 1.0,
        }
    }
}

/// Which Sobel output a [`GradOp`] produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradType {
    /// Horizontal gradient.
    X,
    /// Vertical gradient.
    Y,
    /// Euclidean magnitude `sqrt(gx^2 + gy^2)`.
    #[default]
    Abs,
}

/// Sobel gradient selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GradConfig {
    /// Gradient component to compute.
    #[serde(rename = "type")]
    pub kind: GradType,
}

/// Canny hysteresis thresholds on gradient magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CannyConfig {
    /// Weak-edge threshold.
    pub lo_thresh: f32,
    /// Strong-edge threshold.
    pub hi_thresh: f32,
}

impl Default for CannyConfig {
    fn default() -> Self {
        Self {
            lo_thresh: 50.0,
            hi_thresh: 150.0,
        }
    }
}

/// Configuration for one operation, tagged by kind.
///
/// Serialized with an internal `"op"` tag, e.g.
/// `{"op": "filter", "sigma_x": 1.4, ...}`. Missing fields take their
/// defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum OpConfig {
    /// See [`ThresholdConfig`].
    Threshold(ThresholdConfig),
    /// See [`FilterConfig`].
    Filter(FilterConfig),
    /// See [`GradConfig`].
    Grad(GradConfig),
    /// See [`CannyConfig`].
    Canny(CannyConfig),
}

impl OpConfig {
    /// The kind of operation this config builds.
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::Threshold(_) => OperationKind::Threshold,
            Self::Filter(_) => OperationKind::Filter,
            Self::Grad(_) => OperationKind::Grad,
            Self::Canny(_) => OperationKind::Canny,
        }
    }

    /// Check that the config holds values the operation can run with.
    ///
    /// Operations accept any config, so this is only needed for configs
    /// that come from outside the program (files, command lines).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for non-finite values, a
    /// non-positive Gaussian sigma, a negative Canny threshold, or
    /// `lo_thresh > hi_thresh`.
    pub fn validate(&self) -> Result<(), Error> {
        match self {
            Self::Threshold(c) => {
                require_finite("thresh", c.thresh)?;
                require_finite("true_val", c.true_val)?;
                require_finite("false_val", c.false_val)?;
            }
            Self::Filter(c) => {
                require_positive("sigma_x", c.sigma_x)?;
                require_positive("sigma_y", c.sigma_y)?;
            }
            Self::Grad(_) => {}
            Self::Canny(c) => {
                require_finite("lo_thresh", c.lo_thresh)?;
                require_finite("hi_thresh", c.hi_thresh)?;
                if c.lo_thresh < 0.0 {
                    return Err(Error::InvalidConfig(format!(
                        "lo_thresh must be non-negative, got {}",
                        c.lo_thresh
                    )));
                }
                if c.lo_thresh > c.hi_thresh {
                    return Err(Error::InvalidConfig(format!(
                        "lo_thresh ({}) exceeds hi_thresh ({})",
                        c.lo_thresh, c.hi_thresh
                    )));
                }
            }
        }
        Ok(())
    }
}

fn require_finite(name: &str, value: f32) -> Result<(), Error> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "{name} must be finite, got {value}"
        )))
    }
}

fn require_positive(name: &str, value: f32) -> Result<(), Error> {
    require_finite(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "{name} must be positive, got {value}"
        )))
    }
}

/// Operation kind without its configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// [`ThresholdOp`].
    Threshold,
    /// [`FilterOp`].
    Filter,
    /// [`GradOp`].
    Grad,
    /// [`CannyOp`].
    Canny,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Threshold => "threshold",
            Self::Filter => "filter",
            Self::Grad => "grad",
            Self::Canny => "canny",
        };
        f.write_str(name)
    }
}

/// An image-to-image transform over float luminance buffers.
///
/// `output` is resized to the extent of `input` if needed, then fully
/// overwritten. `input` and `output` are always distinct buffers.
pub trait ImageOperation {
    /// Apply the operation.
    fn perform(&self, input: &Buffer2d<f32>, output: &mut Buffer2d<f32>);
}

/// Pointwise threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdOp {
    config: ThresholdConfig,
}

impl ThresholdOp {
    /// Create the operation.
    #[must_use]
    pub const fn new(config: ThresholdConfig) -> Self {
        Self { config }
    }
}

impl ImageOperation for ThresholdOp {
    fn perform(&self, input: &Buffer2d<f32>, output: &mut Buffer2d<f32>) {
        let c = &self.config;
        output.ensure_extent(input.height(), input.width());
        threshold_image(input, c.thresh, c.true_val, c.false_val, output);
    }
}

/// Gaussian smoothing under a clamped border.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterOp {
    config: FilterConfig,
}

impl FilterOp {
    /// Create the operation.
    #[must_use]
    pub const fn new(config: FilterConfig) -> Self {
        Self { config }
    }
}

impl ImageOperation for FilterOp {
    fn perform(&self, input: &Buffer2d<f32>, output: &mut Buffer2d<f32>) {
        let c = &self.config;
        output.ensure_extent(input.height(), input.width());
        gauss_filter(
            input,
            c.kernel_radius_x,
            c.kernel_radius_y,
            c.sigma_x,
            c.sigma_y,
            BorderCondition::Clamp,
            output,
        );
    }
}

/// Sobel gradient under a clamped border.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradOp {
    config: GradConfig,
}

impl GradOp {
    /// Create the operation.
    #[must_use]
    pub const fn new(config: GradConfig) -> Self {
        Self { config }
    }
}

impl ImageOperation for GradOp {
    fn perform(&self, input: &Buffer2d<f32>, output: &mut Buffer2d<f32>) {
        output.ensure_extent(input.height(), input.width());
        let border = BorderCondition::Clamp;
        match self.config.kind {
            GradType::X => sobel_x(input, border, output),
            GradType::Y => sobel_y(input, border, output),
            GradType::Abs => sobel_magnitude(input, border, output),
        }
    }
}

/// Canny edge detection producing a strict mask: linked edges are 255,
/// everything else (including unlinked weak candidates) is 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CannyOp {
    config: CannyConfig,
}

impl CannyOp {
    /// Create the operation.
    #[must_use]
    pub const fn new(config: CannyConfig) -> Self {
        Self { config }
    }
}

impl ImageOperation for CannyOp {
    fn perform(&self, input: &Buffer2d<f32>, output: &mut Buffer2d<f32>) {
        let mut edges = Buffer2d::new(input.height(), input.width());
        canny_edge_detection(input, self.config.lo_thresh, self.config.hi_thresh, &mut edges);

        output.ensure_extent(input.height(), input.width());
        for (out, &edge) in output.as_mut_slice().iter_mut().zip(edges.as_slice()) {
            *out = if edge == EDGE { f32::from(EDGE) } else { 0.0 };
        }
    }
}

/// One of the concrete operations, built from an [`OpConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operation {
    /// See [`ThresholdOp`].
    Threshold(ThresholdOp),
    /// See [`FilterOp`].
    Filter(FilterOp),
    /// See [`GradOp`].
    Grad(GradOp),
    /// See [`CannyOp`].
    Canny(CannyOp),
}

impl Operation {
    /// Build the operation matching the config's variant.
    #[must_use]
    pub const fn from_config(config: OpConfig) -> Self {
        match config {
            OpConfig::Threshold(c) => Self::Threshold(ThresholdOp::new(c)),
            OpConfig::Filter(c) => Self::Filter(FilterOp::new(c)),
            OpConfig::Grad(c) => Self::Grad(GradOp::new(c)),
            OpConfig::Canny(c) => Self::Canny(CannyOp::new(c)),
        }
    }

    /// The config this operation was built from.
    #[must_use]
    pub const fn config(&self) -> OpConfig {
        match self {
            Self::Threshold(op) => OpConfig::Threshold(op.config),
            Self::Filter(op) => OpConfig::Filter(op.config),
            Self::Grad(op) => OpConfig::Grad(op.config),
            Self::Canny(op) => OpConfig::Canny(op.config),
        }
    }

    /// The operation's kind.
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        self.config().kind()
    }
}

impl From<OpConfig> for Operation {
    fn from(config: OpConfig) -> Self {
        Self::from_config(config)
    }
}

impl ImageOperation for Operation {
    fn perform(&self, input: &Buffer2d<f32>, output: &mut Buffer2d<f32>) {
        match self {
            Self::Threshold(op) => op.perform(input, output),
            Self::Filter(op) => op.perform(input, output),
            Self::Grad(op) => op.perform(input, output),
            Self::Canny(op) => op.perform(input, output),
        }
    }
}
