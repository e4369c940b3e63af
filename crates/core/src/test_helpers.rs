//! Shared fixtures for unit tests.

use std::io::Cursor;

use serde_json::{json, Value};

use crate::rules::Rule;

/// Encode a solid white PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode_png(image::RgbImage::from_pixel(
        width,
        height,
        image::Rgb([255, 255, 255]),
    ))
}

pub fn encode_png(img: image::RgbImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}

pub fn make_rule(category: &str, parameters: Value, auto_correct: bool) -> Rule {
    serde_json::from_value(json!({
        "id": format!("{category}-rule"),
        "category": category,
        "name": format!("{category} check"),
        "description": "test rule",
        "validator": format!("{category}Validator"),
        "parameters": parameters,
        "autoCorrect": auto_correct,
    }))
    .expect("rule should deserialize")
}
