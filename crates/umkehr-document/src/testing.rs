// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Test fixtures: generated PDFs, a canned renderer, an in-memory document
// and an event-recording observer.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use umkehr_core::error::{Result, UmkehrError};
use umkehr_core::{PageGeometry, Rect, RenderOptions};

use crate::image::{ChannelLayout, EncodedRaster, Raster};
use crate::pdf::{PageDocument, PageRenderer};
use crate::pipeline::{PipelineEvent, PipelineObserver};

/// Build an `n`-page PDF. Page `i` has a MediaBox of `600 + i` by 800 so
/// pages can be told apart after reordering or deletion.
pub(crate) fn sample_pdf(pages: usize) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::with_capacity(pages);
    for i in 0..pages {
        let content = Content {
            operations: vec![
                Operation::new(
                    "rg",
                    vec![Object::Integer(0), Object::Integer(0), Object::Integer(1)],
                ),
                Operation::new(
                    "re",
                    vec![
                        Object::Integer(10),
                        Object::Integer(10),
                        Object::Integer(100),
                        Object::Integer(100),
                    ],
                ),
                Operation::new("f", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().unwrap(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(600 + i as i64),
                Object::Integer(800),
            ],
            "Contents" => content_id,
            "Resources" => dictionary! {},
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// Save `doc` as `dir/name`.
pub(crate) fn write_pdf(dir: &Path, name: &str, mut doc: Document) -> PathBuf {
    let path = dir.join(name);
    doc.save(&path).unwrap();
    path
}

/// Serialise `doc` to bytes.
pub(crate) fn pdf_bytes(mut doc: Document) -> Vec<u8> {
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Renderer returning the same raster for every page, or always failing.
pub(crate) struct StubRenderer {
    raster: Option<Raster>,
    pub calls: RefCell<Vec<usize>>,
}

impl StubRenderer {
    pub fn white(width: u32, height: u32) -> Self {
        Self::returning(Raster::filled(width, height, ChannelLayout::Rgb, &[255, 255, 255]).unwrap())
    }

    pub fn returning(raster: Raster) -> Self {
        Self {
            raster: Some(raster),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            raster: None,
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl PageRenderer for StubRenderer {
    fn render(&self, _source: &Path, index: usize, options: RenderOptions) -> Result<Raster> {
        self.calls.borrow_mut().push(index);
        let raster = self
            .raster
            .clone()
            .ok_or_else(|| UmkehrError::Document("stub renderer refuses".to_string()))?;
        if options.with_alpha && !raster.layout().has_alpha() {
            let opaque = vec![255; raster.pixel_count()];
            return raster.with_alpha(&opaque);
        }
        Ok(raster)
    }
}

/// In-memory page used by `FakeDocument`.
#[derive(Debug, Clone)]
pub(crate) struct FakePage {
    /// Original position, stable across deletions.
    pub label: usize,
    pub geometry: PageGeometry,
    pub cleared: bool,
    pub images: Vec<(EncodedRaster, Rect)>,
}

/// A `PageDocument` that records every call.
pub(crate) struct FakeDocument {
    pub pages: Vec<FakePage>,
    pub raster: Raster,
    pub calls: Vec<String>,
}

impl FakeDocument {
    /// `count` Letter pages that render as a 4x2 white raster.
    pub fn with_pages(count: usize) -> Self {
        let pages = (0..count)
            .map(|label| FakePage {
                label,
                geometry: PageGeometry::new(Rect::LETTER, 0),
                cleared: false,
                images: Vec::new(),
            })
            .collect();
        Self {
            pages,
            raster: Raster::filled(4, 2, ChannelLayout::Rgb, &[255, 255, 255]).unwrap(),
            calls: Vec::new(),
        }
    }

    pub fn labels(&self) -> Vec<usize> {
        self.pages.iter().map(|page| page.label).collect()
    }

    fn page(&self, index: usize) -> Result<&FakePage> {
        self.pages
            .get(index)
            .ok_or_else(|| UmkehrError::Document(format!("no page {}", index)))
    }

    fn page_mut(&mut self, index: usize) -> Result<&mut FakePage> {
        self.pages
            .get_mut(index)
            .ok_or_else(|| UmkehrError::Document(format!("no page {}", index)))
    }
}

impl PageDocument for FakeDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_geometry(&self, index: usize) -> Result<PageGeometry> {
        Ok(self.page(index)?.geometry)
    }

    fn render_page(&self, index: usize, _options: RenderOptions) -> Result<Raster> {
        self.page(index)?;
        Ok(self.raster.clone())
    }

    fn clear_page(&mut self, index: usize) -> Result<()> {
        self.calls.push(format!("clear {}", index));
        let page = self.page_mut(index)?;
        page.cleared = true;
        page.images.clear();
        Ok(())
    }

    fn embed_image(&mut self, index: usize, image: &EncodedRaster, placement: Rect) -> Result<()> {
        self.calls.push(format!("embed {}", index));
        self.page_mut(index)?.images.push((image.clone(), placement));
        Ok(())
    }

    fn delete_page(&mut self, index: usize) -> Result<()> {
        self.calls.push(format!("delete {}", index));
        self.page(index)?;
        self.pages.remove(index);
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        self.calls.push(format!("save {}", path.display()));
        Ok(())
    }
}

/// Observer that keeps every event; clones share the same log.
#[derive(Clone, Default)]
pub(crate) struct RecordingObserver {
    events: Rc<RefCell<Vec<PipelineEvent>>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.borrow().clone()
    }
}

impl PipelineObserver for RecordingObserver {
    fn on_event(&self, event: &PipelineEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
