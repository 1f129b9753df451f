//! Integration test: decode a synthetic image, run an operation chain
//! built from JSON, and export the result as PPM.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use approx::abs_diff_eq;
use imgops_core::{Buffer2d, OperationChain, decode_luminance};

/// Encode a white disc on a black background as PNG.
fn disc_png(size: u32, radius: u32) -> Vec<u8> {
    let center = f64::from(size) / 2.0;
    let img = image::RgbImage::from_fn(size, size, |x, y| {
        let dx = f64::from(x) + 0.5 - center;
        let dy = f64::from(y) + 0.5 - center;
        if dx.hypot(dy) <= f64::from(radius) {
            image::Rgb([255, 255, 255])
        } else {
            image::Rgb([0, 0, 0])
        }
    });
    let mut buf = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buf);
    image::ImageEncoder::write_image(
        encoder,
        img.as_raw(),
        img.width(),
        img.height(),
        image::ExtendedColorType::Rgb8,
    )
    .expect("PNG encoding should succeed");
    buf
}

#[test]
fn disc_edges_to_ppm() {
    let input = decode_luminance(&disc_png(32, 10)).unwrap();

    let chain: OperationChain = serde_json::from_str(
        r#"[
            {"id": 1, "config": {"op": "filter", "kernel_radius_x": 2, "kernel_radius_y": 2, "sigma_x": 1.0, "sigma_y": 1.0}},
            {"id": 2, "config": {"op": "canny", "lo_thresh": 40.0, "hi_thresh": 120.0}}
        ]"#,
    )
    .unwrap();
    for (_, op) in chain.iter() {
        op.config().validate().unwrap();
    }

    let mut edges = Buffer2d::default();
    chain.execute_chain(&input, &mut edges);
    assert_eq!((edges.height(), edges.width()), (32, 32));

    let edge_count = edges.as_slice().iter().filter(|&&v| abs_diff_eq!(v, 255.0)).count();
    assert!(edge_count > 20, "expected a closed contour, got {edge_count} pixels");
    // The disc interior and the corners are flat.
    assert_eq!(edges[(16, 16)], 0.0);
    assert_eq!(edges[(0, 0)], 0.0);

    let ppm = imgops_export::to_ppm(&edges);
    assert!(ppm.starts_with("P3\n32 32\n255\n"));
    let lines: Vec<&str> = ppm.lines().collect();
    assert_eq!(lines.len(), 3 + 32 * 32);
    let white = lines[3..].iter().filter(|l| **l == "255 255 255").count();
    let black = lines[3..].iter().filter(|l| **l == "0 0 0").count();
    assert_eq!(white, edge_count);
    assert_eq!(white + black, 32 * 32);
}

#[test]
fn empty_chain_exports_input_levels() {
    let input = decode_luminance(&disc_png(8, 3)).unwrap();
    let mut output = Buffer2d::default();
    OperationChain::new().execute_chain(&input, &mut output);
    assert_eq!(output, input);

    let ppm = imgops_export::to_ppm(&output);
    assert!(ppm.lines().skip(3).all(|l| l == "0 0 0" || l == "255 255 255"));
}
