// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module: rasters, pixel inversion, and the codec that moves rasters
// in and out of documents.

pub mod codec;
pub mod invert;
pub mod raster;

pub use codec::{EncodedColor, EncodedRaster, ImageCodec, ImageFilter, RasterCodec};
pub use invert::{PixelInverter, invert};
pub use raster::{ChannelLayout, Raster};
