// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster: a decoded page image held as a flat 8-bit sample buffer.

use image::{DynamicImage, GrayAlphaImage, GrayImage, RgbImage, RgbaImage};
use umkehr_core::error::{Result, UmkehrError};

/// Channel layout of a raster's interleaved samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    Gray,
    GrayAlpha,
    Rgb,
    Rgba,
}

impl ChannelLayout {
    /// Samples per pixel, alpha included.
    pub fn channels(&self) -> usize {
        match self {
            Self::Gray => 1,
            Self::GrayAlpha => 2,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }

    pub fn has_alpha(&self) -> bool {
        matches!(self, Self::GrayAlpha | Self::Rgba)
    }

    /// The same layout without its alpha channel.
    pub fn without_alpha(&self) -> Self {
        match self {
            Self::Gray | Self::GrayAlpha => Self::Gray,
            Self::Rgb | Self::Rgba => Self::Rgb,
        }
    }

    /// The same layout with an alpha channel.
    pub fn with_alpha(&self) -> Self {
        match self {
            Self::Gray | Self::GrayAlpha => Self::GrayAlpha,
            Self::Rgb | Self::Rgba => Self::Rgba,
        }
    }
}

/// An in-memory 8-bit raster.
///
/// The sample buffer always holds exactly `width * height * channels` bytes;
/// every constructor enforces this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    layout: ChannelLayout,
    samples: Vec<u8>,
}

impl Raster {
    /// Wrap a sample buffer, checking its length against the dimensions.
    pub fn new(width: u32, height: u32, layout: ChannelLayout, samples: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * layout.channels();
        if samples.len() != expected {
            return Err(UmkehrError::RasterSize {
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            layout,
            samples,
        })
    }

    /// A raster where every pixel has the same samples.
    pub fn filled(width: u32, height: u32, layout: ChannelLayout, pixel: &[u8]) -> Result<Self> {
        if pixel.len() != layout.channels() {
            return Err(UmkehrError::RasterSize {
                expected: layout.channels(),
                actual: pixel.len(),
            });
        }
        let samples = pixel.repeat(width as usize * height as usize);
        Self::new(width, height, layout, samples)
    }

    /// Take over a decoded image. 16-bit and float images are reduced to 8-bit.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        let (width, height) = (image.width(), image.height());
        let (layout, samples) = match image {
            DynamicImage::ImageLuma8(buf) => (ChannelLayout::Gray, buf.into_raw()),
            DynamicImage::ImageLumaA8(buf) => (ChannelLayout::GrayAlpha, buf.into_raw()),
            DynamicImage::ImageRgb8(buf) => (ChannelLayout::Rgb, buf.into_raw()),
            DynamicImage::ImageRgba8(buf) => (ChannelLayout::Rgba, buf.into_raw()),
            other if other.color().has_alpha() => (ChannelLayout::Rgba, other.to_rgba8().into_raw()),
            other => (ChannelLayout::Rgb, other.to_rgb8().into_raw()),
        };
        Self {
            width,
            height,
            layout,
            samples,
        }
    }

    /// Copy into an `image::DynamicImage` with the matching 8-bit variant.
    pub fn to_dynamic(&self) -> Result<DynamicImage> {
        let samples = self.samples.clone();
        let (w, h) = (self.width, self.height);
        let image = match self.layout {
            ChannelLayout::Gray => GrayImage::from_raw(w, h, samples).map(DynamicImage::ImageLuma8),
            ChannelLayout::GrayAlpha => {
                GrayAlphaImage::from_raw(w, h, samples).map(DynamicImage::ImageLumaA8)
            }
            ChannelLayout::Rgb => RgbImage::from_raw(w, h, samples).map(DynamicImage::ImageRgb8),
            ChannelLayout::Rgba => RgbaImage::from_raw(w, h, samples).map(DynamicImage::ImageRgba8),
        };
        image.ok_or_else(|| {
            UmkehrError::Image(format!(
                "{}x{} {:?} buffer rejected by image backend",
                w, h, self.layout
            ))
        })
    }

    /// Rotate clockwise by `quarter_turns` x 90 degrees.
    pub fn rotated(&self, quarter_turns: u8) -> Result<Self> {
        let rotated = match quarter_turns % 4 {
            0 => return Ok(self.clone()),
            1 => self.to_dynamic()?.rotate90(),
            2 => self.to_dynamic()?.rotate180(),
            _ => self.to_dynamic()?.rotate270(),
        };
        Ok(Self::from_dynamic(rotated))
    }

    /// Separate colour samples from alpha samples.
    ///
    /// Returns the colour-only raster and, if this raster had alpha, one alpha
    /// byte per pixel.
    pub fn split_alpha(&self) -> (Raster, Option<Vec<u8>>) {
        if !self.layout.has_alpha() {
            return (self.clone(), None);
        }

        let channels = self.layout.channels();
        let pixels = self.pixel_count();
        let mut colour = Vec::with_capacity(pixels * (channels - 1));
        let mut alpha = Vec::with_capacity(pixels);
        for px in self.samples.chunks_exact(channels) {
            let (c, a) = px.split_at(channels - 1);
            colour.extend_from_slice(c);
            alpha.push(a[0]);
        }

        let colour = Raster {
            width: self.width,
            height: self.height,
            layout: self.layout.without_alpha(),
            samples: colour,
        };
        (colour, Some(alpha))
    }

    /// Interleave one alpha byte per pixel into a colour-only raster.
    pub fn with_alpha(self, alpha: &[u8]) -> Result<Self> {
        if self.layout.has_alpha() {
            return Err(UmkehrError::Image(
                "raster already carries an alpha channel".to_string(),
            ));
        }
        if alpha.len() != self.pixel_count() {
            return Err(UmkehrError::RasterSize {
                expected: self.pixel_count(),
                actual: alpha.len(),
            });
        }

        let channels = self.layout.channels();
        let mut samples = Vec::with_capacity(self.samples.len() + alpha.len());
        for (px, a) in self.samples.chunks_exact(channels).zip(alpha) {
            samples.extend_from_slice(px);
            samples.push(*a);
        }
        Raster::new(self.width, self.height, self.layout.with_alpha(), samples)
    }

    /// Same dimensions and layout with a replacement buffer of equal length.
    pub(crate) fn with_samples(&self, samples: Vec<u8>) -> Self {
        debug_assert_eq!(samples.len(), self.samples.len());
        Self {
            width: self.width,
            height: self.height,
            layout: self.layout,
            samples,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<u8> {
        self.samples
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Width divided by height; zero for an empty raster.
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            0.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}
