//! Picture resolutions

use std::fmt;
use std::str::FromStr;

use crate::error::PictDbError;

/// Number of stored resolutions per picture
pub const NB_RES: usize = 3;

/// One of the three stored variants of a picture
///
/// The discriminant is the index into the `size`/`offset` arrays of a
/// metadata record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Resolution {
    Thumb = 0,
    Small = 1,
    Orig = 2,
}

impl Resolution {
    pub const ALL: [Resolution; NB_RES] = [Resolution::Thumb, Resolution::Small, Resolution::Orig];

    /// Index into per-resolution arrays
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Inverse of `index`; rejects anything outside {0, 1, 2}
    pub fn from_index(index: u8) -> Result<Self, PictDbError> {
        match index {
            0 => Ok(Resolution::Thumb),
            1 => Ok(Resolution::Small),
            2 => Ok(Resolution::Orig),
            other => Err(PictDbError::InvalidResolution(format!("code {}", other))),
        }
    }

    /// Derived resolutions are computed lazily; the original never is
    #[inline]
    pub fn is_derived(self) -> bool {
        self != Resolution::Orig
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::Thumb => "thumb",
            Resolution::Small => "small",
            Resolution::Orig => "orig",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = PictDbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "thumb" | "thumbnail" => Ok(Resolution::Thumb),
            "small" => Ok(Resolution::Small),
            "orig" | "original" => Ok(Resolution::Orig),
            other => Err(PictDbError::InvalidResolution(other.to_string())),
        }
    }
}
