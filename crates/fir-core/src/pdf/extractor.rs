//! PDF page source: Pdfium rendering with an embedded-image fallback.

use std::path::Path;

use image::{DynamicImage, GrayImage, ImageBuffer, Rgba};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, trace, warn};

use super::{PageSource, Result};
use crate::error::PdfError;

#[cfg(feature = "pdfium")]
use super::render::PdfiumRenderer;

/// Pages are rendered at twice their 72 dpi size.
pub const RENDER_SCALE: f32 = 2.0;

/// PDF page source.
///
/// Pages are rasterized with Pdfium when the library is available. Without
/// it, the largest raster image drawn on the page stands in for the page,
/// which covers scanned forms.
pub struct PdfExtractor {
    document: Option<Document>,
    #[cfg(feature = "pdfium")]
    data: Vec<u8>,
    #[cfg(feature = "pdfium")]
    renderer: Option<PdfiumRenderer>,
}

impl PdfExtractor {
    /// Create an extractor with no document loaded and no renderer bound.
    pub fn new() -> Self {
        Self {
            document: None,
            #[cfg(feature = "pdfium")]
            data: Vec::new(),
            #[cfg(feature = "pdfium")]
            renderer: None,
        }
    }

    /// Bind the Pdfium renderer, if the library can be found.
    #[cfg(feature = "pdfium")]
    pub fn with_renderer(mut self) -> Self {
        self.renderer = match PdfiumRenderer::bind() {
            Ok(renderer) => Some(renderer),
            Err(e) => {
                warn!("Pdfium not available ({}), using embedded page images", e);
                None
            }
        };
        self
    }

    #[cfg(not(feature = "pdfium"))]
    pub fn with_renderer(self) -> Self {
        self
    }

    /// Open and load a PDF file, rendering with Pdfium when available.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PdfError::NotFound(path.to_path_buf()));
        }

        let data = std::fs::read(path).map_err(|e| PdfError::Parse(e.to_string()))?;
        let mut extractor = Self::new().with_renderer();
        extractor.load(&data)?;
        Ok(extractor)
    }

    /// Load a PDF from bytes.
    pub fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        #[cfg(feature = "pdfium")]
        {
            self.data = data.to_vec();
        }
        Ok(())
    }

    #[cfg(feature = "pdfium")]
    fn rasterize(&self, page: u32) -> Option<DynamicImage> {
        let renderer = self.renderer.as_ref()?;
        match renderer.render(&self.data, page, RENDER_SCALE) {
            Ok(image) => Some(image),
            Err(e) => {
                warn!("{}, falling back to embedded page images", e);
                None
            }
        }
    }

    #[cfg(not(feature = "pdfium"))]
    fn rasterize(&self, _page: u32) -> Option<DynamicImage> {
        None
    }

    /// Decode every image XObject drawn on a page.
    fn page_images(&self, doc: &Document, page_id: ObjectId) -> Vec<DynamicImage> {
        let mut images = Vec::new();

        let Some(resources) = self.get_page_resources(doc, page_id) else {
            return images;
        };

        if let Ok(xobjects) = resources.get(b"XObject") {
            if let Ok((_, Object::Dictionary(xobj_dict))) = doc.dereference(xobjects) {
                for (_name, obj_ref) in xobj_dict.iter() {
                    if let Ok((_, obj)) = doc.dereference(obj_ref) {
                        if let Some(img) = self.try_extract_image_from_object(doc, obj) {
                            images.push(img);
                        }
                    }
                }
            }
        }

        images
    }

    fn try_extract_image_from_object(&self, doc: &Document, obj: &Object) -> Option<DynamicImage> {
        let Object::Stream(stream) = obj else {
            return None;
        };
        let dict = &stream.dict;

        // Check if it's an image XObject
        let subtype = dict.get(b"Subtype").ok()?;
        if subtype.as_name().ok()? != b"Image" {
            return None;
        }

        let width = u32::try_from(dict.get(b"Width").ok()?.as_i64().ok()?).ok()?;
        let height = u32::try_from(dict.get(b"Height").ok()?.as_i64().ok()?).ok()?;

        trace!("Found image object: {}x{}", width, height);

        if let Ok(filter) = dict.get(b"Filter") {
            let filter_name = match filter {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(arr) if !arr.is_empty() => {
                    arr.first().and_then(|o| o.as_name().ok())
                }
                _ => None,
            };

            match filter_name {
                Some(b"DCTDecode") => {
                    trace!("Decoding JPEG image");
                    return image::load_from_memory_with_format(
                        &stream.content,
                        image::ImageFormat::Jpeg,
                    )
                    .ok();
                }
                Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
                    trace!("Unsupported image filter");
                    return None;
                }
                _ => {}
            }
        }

        let data = match stream.decompressed_content() {
            Ok(d) => d,
            Err(_) => stream.content.clone(),
        };

        let color_space = dict
            .get(b"ColorSpace")
            .ok()
            .and_then(|o| match o {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
                Object::Reference(r) => doc.get_object(*r).ok().and_then(|o| o.as_name().ok()),
                _ => None,
            })
            .unwrap_or(b"DeviceGray");

        let bits = dict
            .get(b"BitsPerComponent")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .and_then(|b| u8::try_from(b).ok())
            .unwrap_or(8);

        create_image_from_raw(&data, width, height, color_space, bits)
    }

    /// Get resources dictionary for a page, handling inheritance
    fn get_page_resources(&self, doc: &Document, node_id: ObjectId) -> Option<Dictionary> {
        let Object::Dictionary(dict) = doc.get_object(node_id).ok()? else {
            return None;
        };

        if let Ok(resources) = dict.get(b"Resources") {
            if let Ok((_, Object::Dictionary(res_dict))) = doc.dereference(resources) {
                return Some(res_dict.clone());
            }
        }

        // Continue up the page tree
        match dict.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => self.get_page_resources(doc, *parent_id),
            _ => None,
        }
    }
}

fn create_image_from_raw(
    data: &[u8],
    width: u32,
    height: u32,
    color_space: &[u8],
    bits_per_component: u8,
) -> Option<DynamicImage> {
    trace!(
        "Creating image from raw data: {}x{}, colorspace={:?}, bits={}",
        width,
        height,
        String::from_utf8_lossy(color_space),
        bits_per_component
    );

    let pixels = (width as usize).checked_mul(height as usize)?;
    let is_gray = matches!(color_space, b"DeviceGray" | b"G" | b"CalGray");

    if bits_per_component == 1 && is_gray {
        return create_bilevel_image(data, width, height);
    }

    if bits_per_component != 8 {
        trace!("Unsupported bits per component: {}", bits_per_component);
        return None;
    }

    let expected_rgb = pixels.checked_mul(3)?;
    let expected_gray = pixels;

    let rgba_data: Vec<u8> = match color_space {
        b"DeviceRGB" | b"RGB" | b"CalRGB" if data.len() >= expected_rgb => data[..expected_rgb]
            .chunks(3)
            .flat_map(|px| [px[0], px[1], px[2], 255])
            .collect(),
        _ if is_gray && data.len() >= expected_gray => data[..expected_gray]
            .iter()
            .flat_map(|&gray| [gray, gray, gray, 255])
            .collect(),
        _ => {
            trace!(
                "Could not decode image: data_len={}, expected_rgb={}, expected_gray={}",
                data.len(),
                expected_rgb,
                expected_gray
            );
            return None;
        }
    };

    ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, rgba_data).map(DynamicImage::ImageRgba8)
}

/// 1 bit per pixel, rows padded to whole bytes, 1 is white.
fn create_bilevel_image(data: &[u8], width: u32, height: u32) -> Option<DynamicImage> {
    let stride = (width as usize).div_ceil(8);
    if data.len() < stride.checked_mul(height as usize)? {
        trace!("Bilevel image data too short: {} bytes", data.len());
        return None;
    }

    let image = GrayImage::from_fn(width, height, |x, y| {
        let byte = data[y as usize * stride + x as usize / 8];
        let bit = (byte >> (7 - x % 8)) & 1;
        image::Luma([if bit == 1 { 255 } else { 0 }])
    });
    Some(DynamicImage::ImageLuma8(image))
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PageSource for PdfExtractor {
    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn render_page(&self, page: u32) -> Result<DynamicImage> {
        let doc = self
            .document
            .as_ref()
            .ok_or(PdfError::Parse("No document loaded".to_string()))?;

        let count = self.page_count();
        let pages = doc.get_pages();
        let page_id = page
            .checked_add(1)
            .and_then(|number| pages.get(&number))
            .ok_or(PdfError::PageOutOfRange { page, count })?;

        if let Some(image) = self.rasterize(page) {
            debug!("Rendered page {} with Pdfium", page);
            return Ok(image);
        }

        let images = self.page_images(doc, *page_id);
        debug!("Found {} images on page {}", images.len(), page);

        images
            .into_iter()
            .max_by_key(|img| u64::from(img.width()) * u64::from(img.height()))
            .ok_or(PdfError::NoPageImage(page))
    }
}
