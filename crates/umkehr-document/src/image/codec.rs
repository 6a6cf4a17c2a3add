// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster codec: convert between in-memory rasters and the sample streams
// stored in a page's image XObject.

use image::ImageFormat;
use image::codecs::jpeg::JpegEncoder;
use tracing::{debug, instrument};
use umkehr_core::ImageEncoding;
use umkehr_core::error::{Result, UmkehrError};

use super::raster::{ChannelLayout, Raster};

/// Colour space of an encoded image's colour samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodedColor {
    Gray,
    Rgb,
}

impl EncodedColor {
    /// PDF colour space name.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Gray => "DeviceGray",
            Self::Rgb => "DeviceRGB",
        }
    }

    fn layout(&self) -> ChannelLayout {
        match self {
            Self::Gray => ChannelLayout::Gray,
            Self::Rgb => ChannelLayout::Rgb,
        }
    }
}

/// How the colour samples of an encoded image are compressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFilter {
    /// Uncompressed samples. The document backend may Flate-compress them.
    Raw,
    /// Baseline JPEG (`/DCTDecode`).
    Dct,
}

/// An image ready to be stored in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRaster {
    pub width: u32,
    pub height: u32,
    pub color: EncodedColor,
    pub filter: ImageFilter,
    /// Colour samples, compressed according to `filter`.
    pub data: Vec<u8>,
    /// One uncompressed alpha byte per pixel, stored as a soft mask.
    pub soft_mask: Option<Vec<u8>>,
}

/// Encodes rasters for embedding and decodes embedded images back to rasters.
pub trait RasterCodec {
    fn encode(&self, raster: &Raster, encoding: ImageEncoding) -> Result<EncodedRaster>;

    fn decode(&self, encoded: &EncodedRaster) -> Result<Raster>;
}

/// `RasterCodec` backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCodec;

impl RasterCodec for ImageCodec {
    #[instrument(skip_all, fields(width = raster.width(), height = raster.height(), encoding = ?encoding))]
    fn encode(&self, raster: &Raster, encoding: ImageEncoding) -> Result<EncodedRaster> {
        let (colour, soft_mask) = raster.split_alpha();
        let color = match colour.layout() {
            ChannelLayout::Gray => EncodedColor::Gray,
            _ => EncodedColor::Rgb,
        };

        let (filter, data) = match encoding {
            ImageEncoding::Lossless => (ImageFilter::Raw, colour.into_samples()),
            ImageEncoding::Jpeg { quality } => (ImageFilter::Dct, encode_jpeg(&colour, quality)?),
        };

        debug!(
            encoded_bytes = data.len(),
            has_soft_mask = soft_mask.is_some(),
            "Raster encoded"
        );

        Ok(EncodedRaster {
            width: raster.width(),
            height: raster.height(),
            color,
            filter,
            data,
            soft_mask,
        })
    }

    #[instrument(skip_all, fields(width = encoded.width, height = encoded.height, filter = ?encoded.filter))]
    fn decode(&self, encoded: &EncodedRaster) -> Result<Raster> {
        let colour = match encoded.filter {
            ImageFilter::Raw => Raster::new(
                encoded.width,
                encoded.height,
                encoded.color.layout(),
                encoded.data.clone(),
            )?,
            ImageFilter::Dct => decode_jpeg(encoded)?,
        };

        match &encoded.soft_mask {
            Some(alpha) => colour.with_alpha(alpha),
            None => Ok(colour),
        }
    }
}

/// JPEG-encode a colour-only raster.
fn encode_jpeg(colour: &Raster, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    colour
        .to_dynamic()?
        .write_with_encoder(encoder)
        .map_err(|err| UmkehrError::Image(format!("JPEG encoding failed: {}", err)))?;
    Ok(buffer)
}

fn decode_jpeg(encoded: &EncodedRaster) -> Result<Raster> {
    let decoded = image::load_from_memory_with_format(&encoded.data, ImageFormat::Jpeg)
        .map_err(|err| UmkehrError::Image(format!("failed to decode JPEG image: {}", err)))?;

    if decoded.width() != encoded.width || decoded.height() != encoded.height {
        return Err(UmkehrError::Image(format!(
            "JPEG is {}x{} but the image dictionary declares {}x{}",
            decoded.width(),
            decoded.height(),
            encoded.width,
            encoded.height
        )));
    }

    let decoded = match encoded.color {
        EncodedColor::Gray => image::DynamicImage::ImageLuma8(decoded.to_luma8()),
        EncodedColor::Rgb => image::DynamicImage::ImageRgb8(decoded.to_rgb8()),
    };
    Ok(Raster::from_dynamic(decoded))
}
