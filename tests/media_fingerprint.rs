// tests/media_fingerprint.rs
//
// Average-hash fingerprints over synthesized images.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use truthlens::error::EngineError;
use truthlens::media::fingerprint;

fn encode(img: RgbImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, format)
        .expect("encode test image");
    buf.into_inner()
}

/// Left half black, right half white.
fn split_image(w: u32, h: u32) -> RgbImage {
    RgbImage::from_fn(w, h, |x, _| if x < w / 2 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) })
}

#[test]
fn same_bytes_same_fingerprint() {
    let bytes = encode(split_image(64, 48), ImageFormat::Png);
    let a = fingerprint(&bytes).expect("png decodes");
    let b = fingerprint(&bytes).expect("png decodes");
    assert_eq!(a, b);
    assert_eq!(a.width, 64);
    assert_eq!(a.height, 48);
    assert_eq!(a.hash.len(), 16);
    assert!(a.hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn half_split_sets_right_half_bits() {
    let fp = fingerprint(&encode(split_image(64, 64), ImageFormat::Png)).unwrap();
    // each 8-sample row reads 00001111
    assert_eq!(fp.hash, "0f0f0f0f0f0f0f0f");
}

#[test]
fn resized_copy_is_a_near_duplicate() {
    let big = fingerprint(&encode(split_image(256, 256), ImageFormat::Png)).unwrap();
    let small = fingerprint(&encode(split_image(32, 32), ImageFormat::Png)).unwrap();
    assert!(big.distance(&small).unwrap() <= 4);
}

#[test]
fn flat_image_hashes_to_zero() {
    let flat = RgbImage::from_pixel(20, 20, Rgb([90, 120, 200]));
    let fp = fingerprint(&encode(flat, ImageFormat::Png)).unwrap();
    assert_eq!(fp.hash, "0000000000000000");
}

#[test]
fn other_formats_decode() {
    let bmp = fingerprint(&encode(split_image(16, 16), ImageFormat::Bmp)).unwrap();
    assert_eq!((bmp.width, bmp.height), (16, 16));
}

#[test]
fn non_image_and_truncated_bytes_are_decode_errors() {
    assert!(matches!(fingerprint(b"%PDF-1.7 not an image"), Err(EngineError::Decode(_))));

    let mut png = encode(split_image(32, 32), ImageFormat::Png);
    png.truncate(40);
    let err = fingerprint(&png).unwrap_err();
    assert!(err.to_string().starts_with("Not an image"));
}
