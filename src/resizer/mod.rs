//! Resizer Module
//!
//! Image-resizing capability consumed by the store.
//!
//! ## Structure
//! - [`Resizer`]: the trait the store calls (decode dimensions, resize)
//! - [`shrink_ratio`] / [`scaled_dims`]: pure dimension math
//! - [`JpegResizer`]: production implementation on the `image` crate
//!
//! The store never decodes pixels itself; it hands the original bytes to a
//! `&dyn Resizer` and appends whatever comes back.

mod jpeg;

pub use jpeg::JpegResizer;

use crate::error::Result;

/// Decode/resize capability used for dimension extraction and lazy resizing
pub trait Resizer: Send + Sync {
    /// (width, height) of an encoded image
    fn decode_dimensions(&self, data: &[u8]) -> Result<(u32, u32)>;

    /// Re-encode `data` shrunk to fit inside `max_width` x `max_height`
    fn resize(&self, data: &[u8], max_width: u16, max_height: u16) -> Result<Vec<u8>>;
}

/// Uniform scale factor that fits `orig` inside `target` without distortion
///
/// The smaller of the horizontal and vertical ratios wins.
pub fn shrink_ratio(orig: (u32, u32), target: (u16, u16)) -> f64 {
    let h_shrink = target.0 as f64 / orig.0.max(1) as f64;
    let v_shrink = target.1 as f64 / orig.1.max(1) as f64;
    h_shrink.min(v_shrink)
}

/// Apply `ratio` to both axes, rounding and never going below one pixel
pub fn scaled_dims(orig: (u32, u32), ratio: f64) -> (u32, u32) {
    let scale = |v: u32| ((v as f64 * ratio).round() as u32).max(1);
    (scale(orig.0), scale(orig.1))
}
