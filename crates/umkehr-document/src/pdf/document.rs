// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// lopdf-backed page document.
//
// Structure edits (clearing, embedding, deleting, saving) go through lopdf.
// Rendering is delegated to a `PageRenderer` working on the file the
// document was opened from.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use tracing::{debug, info, instrument, warn};
use umkehr_core::error::{Result, UmkehrError};
use umkehr_core::{PageGeometry, Rect, RenderOptions};

use super::provider::{DocumentProvider, PageDocument, PageRenderer};
use crate::image::{EncodedColor, EncodedRaster, ImageFilter, Raster};

/// How far up the page tree inherited attributes are looked for.
const MAX_INHERITANCE_DEPTH: usize = 10;

/// Opens PDFs with lopdf and renders them through a shared `PageRenderer`.
#[derive(Clone)]
pub struct PdfProvider {
    renderer: Rc<dyn PageRenderer>,
}

impl PdfProvider {
    pub fn new(renderer: Rc<dyn PageRenderer>) -> Self {
        Self { renderer }
    }
}

impl DocumentProvider for PdfProvider {
    type Document = LopdfDocument;

    fn open(&self, path: &Path) -> Result<LopdfDocument> {
        LopdfDocument::open(path, Rc::clone(&self.renderer))
    }
}

/// A PDF opened for editing.
pub struct LopdfDocument {
    document: Document,
    source: PathBuf,
    renderer: Rc<dyn PageRenderer>,
    /// Set once a page is deleted; the source file no longer matches.
    pages_deleted: bool,
}

impl LopdfDocument {
    /// Load `path` for editing.
    #[instrument(skip(renderer), fields(path = %path.display()))]
    pub fn open(path: &Path, renderer: Rc<dyn PageRenderer>) -> Result<Self> {
        let document = Document::load(path).map_err(|err| {
            UmkehrError::Document(format!("failed to load {}: {}", path.display(), err))
        })?;

        if document.trailer.has(b"Encrypt") {
            return Err(UmkehrError::Document(format!(
                "{} is encrypted",
                path.display()
            )));
        }

        info!(pages = document.get_pages().len(), "PDF opened");
        Ok(Self {
            document,
            source: path.to_path_buf(),
            renderer,
            pages_deleted: false,
        })
    }

    /// Images painted on a page, read back from its XObject resources.
    ///
    /// Only 8-bit DeviceGray and DeviceRGB images are returned; other image
    /// XObjects are skipped.
    pub fn page_images(&self, index: usize) -> Result<Vec<EncodedRaster>> {
        let page_id = self.page_id(index)?;
        let Some(resources) = self
            .inherited_attribute(page_id, b"Resources")
            .and_then(|obj| obj.as_dict().ok())
        else {
            return Ok(Vec::new());
        };
        let Some(xobjects) = resources
            .get(b"XObject")
            .ok()
            .and_then(|obj| self.resolve(obj))
            .and_then(|obj| obj.as_dict().ok())
        else {
            return Ok(Vec::new());
        };

        let mut images = Vec::new();
        for (name, entry) in xobjects.iter() {
            let Some(Object::Stream(stream)) = self.resolve(entry) else {
                continue;
            };
            match self.read_image(stream)? {
                Some(image) => images.push(image),
                None => debug!(name = %String::from_utf8_lossy(name), "Skipping non-image XObject"),
            }
        }
        Ok(images)
    }

    /// Object id of the page at a 0-based index.
    fn page_id(&self, index: usize) -> Result<ObjectId> {
        let page_number = u32::try_from(index + 1).map_err(|_| out_of_range(index))?;
        self.document
            .get_pages()
            .get(&page_number)
            .copied()
            .ok_or_else(|| out_of_range(index))
    }

    fn resolve<'a>(&'a self, object: &'a Object) -> Option<&'a Object> {
        match object {
            Object::Reference(id) => self.document.get_object(*id).ok(),
            other => Some(other),
        }
    }

    /// Look up a page attribute, walking up `/Parent` links for inheritable
    /// keys.
    fn inherited_attribute(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut node = self.document.get_dictionary(page_id).ok()?;
        for _ in 0..MAX_INHERITANCE_DEPTH {
            if let Ok(value) = node.get(key) {
                return self.resolve(value);
            }
            let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
            node = self.document.get_dictionary(parent).ok()?;
        }
        None
    }

    fn page_box(&self, page_id: ObjectId) -> Rect {
        [b"CropBox".as_slice(), b"MediaBox".as_slice()]
            .into_iter()
            .find_map(|key| {
                self.inherited_attribute(page_id, key)
                    .and_then(|obj| self.rect_from(obj))
            })
            .unwrap_or(Rect::LETTER)
    }

    fn rect_from(&self, object: &Object) -> Option<Rect> {
        let values = object.as_array().ok()?;
        if values.len() != 4 {
            return None;
        }
        let mut coords = [0.0f32; 4];
        for (slot, value) in coords.iter_mut().zip(values) {
            *slot = self.resolve(value)?.as_float().ok()?;
        }
        Some(Rect::from_corners(coords[0], coords[1], coords[2], coords[3]))
    }

    fn page_dict_mut(&mut self, page_id: ObjectId) -> Result<&mut Dictionary> {
        self.document
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .map_err(|err| UmkehrError::Document(format!("page object is malformed: {}", err)))
    }

    /// Give the page its own `/Resources` entry, copying inherited resources
    /// so existing content keeps resolving.
    fn ensure_own_resources(&mut self, page_id: ObjectId) -> Result<()> {
        if self
            .document
            .get_dictionary(page_id)
            .is_ok_and(|page| page.has(b"Resources"))
        {
            return Ok(());
        }
        let inherited = self
            .inherited_attribute(page_id, b"Resources")
            .and_then(|obj| obj.as_dict().ok())
            .cloned()
            .unwrap_or_default();
        self.page_dict_mut(page_id)?.set("Resources", inherited);
        Ok(())
    }

    /// Add `image_id` to the page's XObject resources under a fresh name.
    fn register_xobject(&mut self, page_id: ObjectId, image_id: ObjectId) -> Result<String> {
        self.ensure_own_resources(page_id)?;

        let resources_ref = match self.document.get_dictionary(page_id) {
            Ok(page) => match page.get(b"Resources") {
                Ok(Object::Reference(id)) => Some(*id),
                _ => None,
            },
            Err(_) => None,
        };
        let xobject_ref = self
            .document
            .get_dictionary(page_id)
            .ok()
            .and_then(|page| page.get(b"Resources").ok())
            .and_then(|obj| self.resolve(obj))
            .and_then(|obj| obj.as_dict().ok())
            .and_then(|resources| match resources.get(b"XObject") {
                Ok(Object::Reference(id)) => Some(*id),
                _ => None,
            });

        let malformed =
            |err: lopdf::Error| UmkehrError::Document(format!("page resources are malformed: {}", err));

        let xobjects = match xobject_ref {
            Some(id) => self
                .document
                .get_object_mut(id)
                .and_then(Object::as_dict_mut)
                .map_err(malformed)?,
            None => {
                let resources = match resources_ref {
                    Some(id) => self
                        .document
                        .get_object_mut(id)
                        .and_then(Object::as_dict_mut)
                        .map_err(malformed)?,
                    None => self
                        .page_dict_mut(page_id)?
                        .get_mut(b"Resources")
                        .and_then(Object::as_dict_mut)
                        .map_err(malformed)?,
                };
                if !matches!(resources.get(b"XObject"), Ok(Object::Dictionary(_))) {
                    resources.set("XObject", Dictionary::new());
                }
                resources
                    .get_mut(b"XObject")
                    .and_then(Object::as_dict_mut)
                    .map_err(malformed)?
            }
        };

        let mut n = xobjects.len();
        let name = loop {
            let candidate = format!("Im{}", n);
            if !xobjects.has(candidate.as_bytes()) {
                break candidate;
            }
            n += 1;
        };
        xobjects.set(name.as_str(), Object::Reference(image_id));
        Ok(name)
    }

    /// Append a content stream to the page's `/Contents`.
    fn append_content(&mut self, page_id: ObjectId, content_id: ObjectId) -> Result<()> {
        // A single reference may point at an array of streams.
        let referenced_array = match self.document.get_dictionary(page_id) {
            Ok(page) => match page.get(b"Contents") {
                Ok(Object::Reference(id)) => match self.document.get_object(*id) {
                    Ok(Object::Array(_)) => Some(*id),
                    _ => None,
                },
                _ => None,
            },
            Err(_) => None,
        };

        if let Some(array_id) = referenced_array {
            if let Ok(Object::Array(streams)) = self.document.get_object_mut(array_id) {
                streams.push(Object::Reference(content_id));
            }
            return Ok(());
        }

        let page = self.page_dict_mut(page_id)?;
        let contents = match page.get(b"Contents") {
            Ok(Object::Array(streams)) => {
                let mut streams = streams.clone();
                streams.push(Object::Reference(content_id));
                Object::Array(streams)
            }
            Ok(existing @ Object::Reference(_)) => {
                Object::Array(vec![existing.clone(), Object::Reference(content_id)])
            }
            _ => Object::Reference(content_id),
        };
        page.set("Contents", contents);
        Ok(())
    }

    fn read_image(&self, stream: &Stream) -> Result<Option<EncodedRaster>> {
        let dict = &stream.dict;
        let is_image = matches!(dict.get(b"Subtype"), Ok(Object::Name(name)) if name == b"Image");
        let bits = dict.get(b"BitsPerComponent").and_then(Object::as_i64).ok();
        if !is_image || bits != Some(8) {
            return Ok(None);
        }

        let color = match dict.get(b"ColorSpace").ok().and_then(|obj| self.resolve(obj)) {
            Some(Object::Name(name)) if name == b"DeviceGray" => EncodedColor::Gray,
            Some(Object::Name(name)) if name == b"DeviceRGB" => EncodedColor::Rgb,
            _ => return Ok(None),
        };
        let dimension = |key: &[u8]| {
            dict.get(key)
                .ok()
                .and_then(|obj| self.resolve(obj))
                .and_then(|obj| obj.as_i64().ok())
                .and_then(|value| u32::try_from(value).ok())
        };
        let (Some(width), Some(height)) = (dimension(b"Width"), dimension(b"Height")) else {
            return Ok(None);
        };

        let is_dct = matches!(dict.get(b"Filter"), Ok(Object::Name(name)) if name == b"DCTDecode");
        let (filter, data) = if is_dct {
            (ImageFilter::Dct, stream.content.clone())
        } else {
            (ImageFilter::Raw, stream_samples(stream)?)
        };

        let soft_mask = match dict.get(b"SMask").ok().and_then(|obj| self.resolve(obj)) {
            Some(Object::Stream(mask)) => Some(stream_samples(mask)?),
            _ => None,
        };

        Ok(Some(EncodedRaster {
            width,
            height,
            color,
            filter,
            data,
            soft_mask,
        }))
    }
}

impl PageDocument for LopdfDocument {
    fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    fn page_geometry(&self, index: usize) -> Result<PageGeometry> {
        let page_id = self.page_id(index)?;
        let rotation = self
            .inherited_attribute(page_id, b"Rotate")
            .and_then(|obj| obj.as_i64().ok())
            .unwrap_or(0);
        Ok(PageGeometry::new(self.page_box(page_id), rotation))
    }

    fn render_page(&self, index: usize, options: RenderOptions) -> Result<Raster> {
        if self.pages_deleted {
            return Err(UmkehrError::Document(
                "pages were deleted since opening; save and reopen before rendering".to_string(),
            ));
        }
        if index >= self.page_count() {
            return Err(out_of_range(index));
        }
        self.renderer.render(&self.source, index, options)
    }

    #[instrument(skip(self))]
    fn clear_page(&mut self, index: usize) -> Result<()> {
        let page_id = self.page_id(index)?;
        let page = self.page_dict_mut(page_id)?;
        page.remove(b"Contents");
        page.remove(b"Annots");
        page.set("Resources", Dictionary::new());
        debug!("Page cleared");
        Ok(())
    }

    #[instrument(skip(self, image), fields(width = image.width, height = image.height))]
    fn embed_image(&mut self, index: usize, image: &EncodedRaster, placement: Rect) -> Result<()> {
        let page_id = self.page_id(index)?;

        let mut image_dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => image.width as i64,
            "Height" => image.height as i64,
            "ColorSpace" => image.color.pdf_name(),
            "BitsPerComponent" => 8i64,
        };
        if image.filter == ImageFilter::Dct {
            image_dict.set("Filter", "DCTDecode");
        }
        if let Some(alpha) = &image.soft_mask {
            let mask_dict = dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => image.width as i64,
                "Height" => image.height as i64,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8i64,
            };
            let mask_id = self.document.add_object(Stream::new(mask_dict, alpha.clone()));
            image_dict.set("SMask", Object::Reference(mask_id));
        }
        let image_id = self
            .document
            .add_object(Stream::new(image_dict, image.data.clone()));
        let name = self.register_xobject(page_id, image_id)?;

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        Object::Real(placement.width()),
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Real(placement.height()),
                        Object::Real(placement.x0),
                        Object::Real(placement.y0),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(name.clone().into_bytes())]),
                Operation::new("Q", vec![]),
            ],
        };
        let encoded = content.encode().map_err(|err| {
            UmkehrError::Document(format!("failed to encode page content: {}", err))
        })?;
        let content_id = self
            .document
            .add_object(Stream::new(Dictionary::new(), encoded));
        self.append_content(page_id, content_id)?;

        debug!(xobject = %name, "Image embedded");
        Ok(())
    }

    #[instrument(skip(self))]
    fn delete_page(&mut self, index: usize) -> Result<()> {
        let page_number = u32::try_from(index + 1).map_err(|_| out_of_range(index))?;
        if index >= self.page_count() {
            return Err(out_of_range(index));
        }
        self.document.delete_pages(&[page_number]);
        self.pages_deleted = true;
        debug!("Page deleted");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    fn save(&mut self, path: &Path) -> Result<()> {
        let pruned = self.document.prune_objects();
        self.document.compress();
        self.document.save(path).map_err(|err| {
            UmkehrError::Document(format!("failed to save {}: {}", path.display(), err))
        })?;
        if !pruned.is_empty() {
            debug!(pruned = pruned.len(), "Unreferenced objects dropped");
        }
        info!(pages = self.page_count(), "PDF saved");
        Ok(())
    }
}

fn out_of_range(index: usize) -> UmkehrError {
    UmkehrError::Document(format!("page index {} is out of range", index))
}

/// Stream payload with any non-image filter removed.
fn stream_samples(stream: &Stream) -> Result<Vec<u8>> {
    if stream.dict.has(b"Filter") {
        stream.decompressed_content().map_err(|err| {
            warn!(error = %err, "Image stream could not be decompressed");
            UmkehrError::Document(format!("failed to decompress image stream: {}", err))
        })
    } else {
        Ok(stream.content.clone())
    }
}
