// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pixel inversion: replace every sample `s` with `255 - s`.

use tracing::{debug, instrument};

use super::raster::Raster;

/// Inverts raster samples.
///
/// By default alpha samples are inverted along with colour samples, which
/// turns an opaque raster fully transparent. Set `preserve_alpha` to leave the
/// alpha channel as it was.
#[derive(Debug, Clone, Copy, Default)]
pub struct PixelInverter {
    preserve_alpha: bool,
}

impl PixelInverter {
    pub fn new(preserve_alpha: bool) -> Self {
        Self { preserve_alpha }
    }

    /// Produce the inverted copy of `raster`. Dimensions and layout are
    /// unchanged.
    #[instrument(skip_all, fields(width = raster.width(), height = raster.height(), layout = ?raster.layout()))]
    pub fn invert(&self, raster: &Raster) -> Raster {
        let layout = raster.layout();
        let mut samples = raster.samples().to_vec();

        if self.preserve_alpha && layout.has_alpha() {
            let channels = layout.channels();
            for px in samples.chunks_exact_mut(channels) {
                for sample in &mut px[..channels - 1] {
                    *sample = 255 - *sample;
                }
            }
        } else {
            for sample in &mut samples {
                *sample = 255 - *sample;
            }
        }

        debug!(samples = samples.len(), "Raster inverted");

        raster.with_samples(samples)
    }
}

/// Invert every sample, alpha included.
pub fn invert(raster: &Raster) -> Raster {
    PixelInverter::default().invert(raster)
}
