//! The pi family used by the gradient-direction code.

use std::f64::consts;

pub const PI: f64 = consts::PI;
pub const HALF_PI: f64 = consts::FRAC_PI_2;
pub const QUARTER_PI: f64 = consts::FRAC_PI_4;
pub const EIGHTH_PI: f64 = consts::FRAC_PI_8;
