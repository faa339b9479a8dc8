//! RGB color algebra.
//!
//! Channels are nominally in [0, 1] but are allowed to exceed 1.0 while
//! radiance is accumulated. Every named operation takes an explicit `clamp`
//! flag that caps each channel at 1.0 afterwards; the operator impls never
//! clamp.

use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul};

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::Interval;

/// Ward's perceptual luminance weights for (r, g, b).
pub const LUMINANCE_WEIGHTS: [f32; 3] = [0.27, 0.67, 0.06];

/// Largest value of a packed 8-bit channel.
const CHANNEL_MAX: f32 = 255.0;

/// Alpha byte of every packed pixel.
const ALPHA_OPAQUE: u32 = 0xFF00_0000;

/// An RGB color with `f32` channels.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

    /// Create a color from its channels.
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Same value on all three channels.
    #[inline]
    pub const fn splat(v: f32) -> Self {
        Self::new(v, v, v)
    }

    /// Channel-wise sum.
    pub fn add(self, other: Color, clamp: bool) -> Color {
        Color::new(self.r + other.r, self.g + other.g, self.b + other.b).clamp_if(clamp)
    }

    /// Channel-wise product (light filtering through a surface color).
    pub fn mul(self, other: Color, clamp: bool) -> Color {
        Color::new(self.r * other.r, self.g * other.g, self.b * other.b).clamp_if(clamp)
    }

    /// Scale every channel by `s`.
    pub fn scale(self, s: f32, clamp: bool) -> Color {
        Color::new(self.r * s, self.g * s, self.b * s).clamp_if(clamp)
    }

    /// Cap every channel at 1.0. Negative channels are left alone.
    pub fn clamped(self) -> Color {
        Color::new(self.r.min(1.0), self.g.min(1.0), self.b.min(1.0))
    }

    #[inline]
    fn clamp_if(self, clamp: bool) -> Color {
        if clamp {
            self.clamped()
        } else {
            self
        }
    }

    /// Average of a set of colors; black for an empty slice.
    pub fn average(colors: &[Color]) -> Color {
        if colors.is_empty() {
            return Color::BLACK;
        }
        colors.iter().copied().sum::<Color>() / colors.len() as f32
    }

    /// Perceptual luminance, used by tone reproduction.
    pub fn luminance(self) -> f32 {
        let [wr, wg, wb] = LUMINANCE_WEIGHTS;
        wr * self.r + wg * self.g + wb * self.b
    }

    /// Pack into `0xAARRGGBB` with alpha fixed at 0xFF.
    ///
    /// Each channel is clamped to [0, 1], scaled by 255 and truncated.
    pub fn to_argb(self) -> u32 {
        let channel = |c: f32| (CHANNEL_MAX * Interval::UNIT.clamp(c)) as u8 as u32;
        ALPHA_OPAQUE | channel(self.r) << 16 | channel(self.g) << 8 | channel(self.b)
    }

    /// Unpack a `0xAARRGGBB` pixel. The alpha byte is ignored.
    pub fn from_argb(argb: u32) -> Color {
        let channel = |shift: u32| ((argb >> shift) & 0xFF) as f32 / CHANNEL_MAX;
        Color::new(channel(16), channel(8), channel(0))
    }
}

impl Add for Color {
    type Output = Color;

    #[inline]
    fn add(self, rhs: Color) -> Color {
        Color::add(self, rhs, false)
    }
}

impl AddAssign for Color {
    #[inline]
    fn add_assign(&mut self, rhs: Color) {
        *self = *self + rhs;
    }
}

impl Mul for Color {
    type Output = Color;

    #[inline]
    fn mul(self, rhs: Color) -> Color {
        Color::mul(self, rhs, false)
    }
}

impl Mul<f32> for Color {
    type Output = Color;

    #[inline]
    fn mul(self, rhs: f32) -> Color {
        self.scale(rhs, false)
    }
}

impl Mul<Color> for f32 {
    type Output = Color;

    #[inline]
    fn mul(self, rhs: Color) -> Color {
        rhs.scale(self, false)
    }
}

impl Div<f32> for Color {
    type Output = Color;

    #[inline]
    fn div(self, rhs: f32) -> Color {
        self.scale(1.0 / rhs, false)
    }
}

impl Sum for Color {
    fn sum<I: Iterator<Item = Color>>(iter: I) -> Color {
        iter.fold(Color::BLACK, |acc, c| acc + c)
    }
}
