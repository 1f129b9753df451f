//! imgops-export: Pure text serializers for imgops buffers (sans-IO).
//!
//! Converts [`Buffer2d`](imgops_core::Buffer2d) values into file formats.
//! Currently supports plain-text PPM (`P3`).

pub mod ppm;

pub use ppm::{ppm_level, to_ppm};
