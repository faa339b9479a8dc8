//! Packed output image.

use lumen_math::Color;
use rayon::prelude::*;

use crate::{RenderError, RenderResult};

/// Packed `0xAARRGGBB` pixels, row-major, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl FrameBuffer {
    /// Value of a pixel nobody has written yet.
    ///
    /// Rendered pixels always carry alpha 0xFF, so this never collides
    /// with real output.
    pub const POISON: u32 = 0x0000_0000;

    /// Create a buffer with every pixel set to [`FrameBuffer::POISON`].
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Self::POISON; width as usize * height as usize],
        }
    }

    /// Pack float colors, e.g. after tone reproduction.
    ///
    /// Fails unless `colors.len()` equals `width * height`.
    pub fn from_colors(width: u32, height: u32, colors: &[Color]) -> RenderResult<Self> {
        if colors.len() != width as usize * height as usize {
            return Err(RenderError::SizeMismatch {
                width,
                height,
                actual: colors.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels: colors.par_iter().map(|c| c.to_argb()).collect(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Packed pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> u32 {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Store a pixel that must not have been written before.
    pub fn write_once(&mut self, index: usize, argb: u32) -> RenderResult<()> {
        match self.pixels.get_mut(index) {
            Some(slot) if *slot == Self::POISON => {
                *slot = argb;
                Ok(())
            }
            _ => Err(RenderError::PixelOverwritten { index }),
        }
    }

    /// True once every pixel has been written.
    pub fn is_complete(&self) -> bool {
        !self.pixels.contains(&Self::POISON)
    }

    /// Raw native-endian bytes of the packed pixels.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Unpack to float colors.
    pub fn to_colors(&self) -> Vec<Color> {
        self.pixels.par_iter().map(|&p| Color::from_argb(p)).collect()
    }

    /// Convert to RGBA8 bytes (for encoding or display).
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; self.pixels.len() * 4];
        bytes
            .par_chunks_exact_mut(4)
            .zip(self.pixels.par_iter())
            .for_each(|(out, &argb)| {
                let [b, g, r, a] = argb.to_le_bytes();
                out.copy_from_slice(&[r, g, b, a]);
            });
        bytes
    }
}
