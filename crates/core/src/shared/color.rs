//! Hex color parsing and 8-bit BGR ↔ HSV conversion.
//!
//! HSV uses the 8-bit convention common to vision libraries: hue in
//! `0..180` (degrees halved), saturation and value in `0..=255`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("expected 6 hex digits (optionally prefixed with '#'), got '{0}'")]
    Length(String),
    #[error("invalid hex digit in '{0}'")]
    Digit(String),
}

/// An 8-bit color stored in BGR order, matching [`Frame`](crate::shared::frame::Frame).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Bgr(pub [u8; 3]);

impl Bgr {
    pub const BLACK: Bgr = Bgr([0, 0, 0]);
    pub const WHITE: Bgr = Bgr([255, 255, 255]);
    pub const RED: Bgr = Bgr([0, 0, 255]);
    pub const GREEN: Bgr = Bgr([0, 255, 0]);

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self([b, g, r])
    }

    /// Parses `#RRGGBB` or `RRGGBB`.
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(ColorParseError::Length(hex.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| ColorParseError::Digit(hex.to_string()))
        };
        Ok(Self::from_rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(self) -> String {
        let [b, g, r] = self.0;
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    pub fn to_hsv(self) -> [u8; 3] {
        bgr_to_hsv(self.0)
    }
}

impl FromStr for Bgr {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Bgr {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Bgr> for String {
    fn from(value: Bgr) -> Self {
        value.to_hex()
    }
}

impl fmt::Display for Bgr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Converts one BGR pixel to 8-bit HSV.
pub fn bgr_to_hsv(bgr: [u8; 3]) -> [u8; 3] {
    let b = bgr[0] as f32;
    let g = bgr[1] as f32;
    let r = bgr[2] as f32;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let s = if max > 0.0 { delta / max * 255.0 } else { 0.0 };

    let mut h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    if h < 0.0 {
        h += 360.0;
    }

    let h8 = ((h / 2.0).round() as u32 % 180) as u8;
    [h8, s.round().clamp(0.0, 255.0) as u8, max as u8]
}

/// Converts one 8-bit HSV pixel back to BGR.
pub fn hsv_to_bgr(hsv: [u8; 3]) -> [u8; 3] {
    let h = (hsv[0] as f32 * 2.0) % 360.0;
    let s = hsv[1] as f32 / 255.0;
    let v = hsv[2] as f32;

    let c = v * s;
    let sector = h / 60.0;
    let x = c * (1.0 - (sector % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match sector as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let to_u8 = |v: f32| (v + m).round().clamp(0.0, 255.0) as u8;
    [to_u8(b), to_u8(g), to_u8(r)]
}
