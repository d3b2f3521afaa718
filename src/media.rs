//! Media fingerprinting: validate an upload as a still image and compute an
//! 8×8 average hash (aHash).
//!
//! Two images with the same fingerprint are candidates for "same or
//! near-duplicate", never proof. The hash ignores fine detail on purpose.

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

pub const HASH_SIDE: u32 = 8;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaFingerprint {
    pub width: u32,
    pub height: u32,
    /// 16 lowercase hex digits.
    pub hash: String,
}

impl MediaFingerprint {
    /// Number of differing bits between two hashes; `None` if either is malformed.
    pub fn distance(&self, other: &MediaFingerprint) -> Option<u32> {
        let a = u64::from_str_radix(&self.hash, 16).ok()?;
        let b = u64::from_str_radix(&other.hash, 16).ok()?;
        Some((a ^ b).count_ones())
    }
}

pub fn fingerprint(bytes: &[u8]) -> EngineResult<MediaFingerprint> {
    let img = image::load_from_memory(bytes).map_err(|e| EngineError::Decode(e.to_string()))?;
    let (width, height) = (img.width(), img.height());
    if width == 0 || height == 0 {
        return Err(EngineError::Decode("image has no pixels".to_string()));
    }

    let small = img
        .grayscale()
        .resize_exact(HASH_SIDE, HASH_SIDE, FilterType::Lanczos3)
        .to_luma8();
    let samples: Vec<u8> = small.pixels().map(|p| p.0[0]).collect();

    Ok(MediaFingerprint {
        width,
        height,
        hash: format!("{:016x}", average_hash(&samples)),
    })
}

/// One bit per sample, `1` when brighter than the mean, raster order, MSB first.
pub fn average_hash(samples: &[u8]) -> u64 {
    if samples.is_empty() {
        return 0;
    }
    let mean = samples.iter().map(|&s| f64::from(s)).sum::<f64>() / samples.len() as f64;
    samples
        .iter()
        .take(64)
        .fold(0u64, |acc, &s| (acc << 1) | u64::from(f64::from(s) > mean))
}
