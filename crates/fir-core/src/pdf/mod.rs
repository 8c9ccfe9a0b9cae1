//! Document page sources.

mod extractor;
#[cfg(feature = "pdfium")]
mod render;

pub use extractor::{PdfExtractor, RENDER_SCALE};

use std::path::Path;

use image::DynamicImage;
use tracing::debug;

use crate::error::{FirError, PdfError};

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// A document whose pages can be rasterized.
pub trait PageSource {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Rasterize a page (0-based index).
    fn render_page(&self, page: u32) -> Result<DynamicImage>;
}

impl<T: PageSource + ?Sized> PageSource for Box<T> {
    fn page_count(&self) -> u32 {
        (**self).page_count()
    }

    fn render_page(&self, page: u32) -> Result<DynamicImage> {
        (**self).render_page(page)
    }
}

/// A single raster image treated as a one-page document.
pub struct ImagePage {
    image: DynamicImage,
}

impl ImagePage {
    pub fn new(image: DynamicImage) -> Self {
        Self { image }
    }

    /// Open an image file.
    pub fn open(path: &Path) -> std::result::Result<Self, FirError> {
        if !path.exists() {
            return Err(PdfError::NotFound(path.to_path_buf()).into());
        }
        Ok(Self::new(image::open(path)?))
    }
}

impl PageSource for ImagePage {
    fn page_count(&self) -> u32 {
        1
    }

    fn render_page(&self, page: u32) -> Result<DynamicImage> {
        if page != 0 {
            return Err(PdfError::PageOutOfRange { page, count: 1 });
        }
        Ok(self.image.clone())
    }
}

/// Open a document by file extension: PDF, or a PNG/JPEG/TIFF/BMP scan.
pub fn open_source(path: &Path) -> std::result::Result<Box<dyn PageSource>, FirError> {
    if !path.exists() {
        return Err(PdfError::NotFound(path.to_path_buf()).into());
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    debug!("Opening {} as '{}'", path.display(), extension);

    match extension.as_str() {
        "png" | "jpg" | "jpeg" | "tif" | "tiff" | "bmp" => Ok(Box::new(ImagePage::open(path)?)),
        _ => Ok(Box::new(PdfExtractor::open(path)?)),
    }
}

/// PDF documents built in memory for tests.
#[cfg(test)]
pub(crate) mod fixtures {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

    /// A4 at 72 dpi.
    const MEDIA_BOX: [i64; 4] = [0, 0, 595, 842];

    fn build(pages: impl FnOnce(&mut Document) -> Vec<(Dictionary, Content)>) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let kids: Vec<Object> = pages(&mut doc)
            .into_iter()
            .map(|(resources, content)| {
                let content_id = doc.add_object(Stream::new(
                    Dictionary::new(),
                    content.encode().unwrap(),
                ));
                let page_id: ObjectId = doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "MediaBox" => MEDIA_BOX.iter().map(|&v| Object::Integer(v)).collect::<Vec<_>>(),
                    "Resources" => resources,
                    "Contents" => content_id,
                });
                page_id.into()
            })
            .collect();

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut data = Vec::new();
        doc.save_to(&mut data).unwrap();
        data
    }

    fn image_page(doc: &mut Document, image: Dictionary, samples: Vec<u8>) -> (Dictionary, Content) {
        let image_id = doc.add_object(Stream::new(image, samples));
        let resources = dictionary! {
            "XObject" => dictionary! {
                "Im0" => image_id,
            },
        };
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![595.into(), 0.into(), 0.into(), 842.into(), 0.into(), 0.into()],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        (resources, content)
    }

    /// One white 8-bit gray scan per page, with the given pixel sizes.
    pub fn scanned_pdf(sizes: &[(u32, u32)]) -> Vec<u8> {
        build(|doc| {
            sizes
                .iter()
                .map(|&(width, height)| {
                    let image = dictionary! {
                        "Type" => "XObject",
                        "Subtype" => "Image",
                        "Width" => i64::from(width),
                        "Height" => i64::from(height),
                        "ColorSpace" => "DeviceGray",
                        "BitsPerComponent" => 8,
                    };
                    image_page(doc, image, vec![255; (width * height) as usize])
                })
                .collect()
        })
    }

    /// A single page drawing one image XObject with the given dictionary.
    pub fn single_image_pdf(image: Dictionary, samples: Vec<u8>) -> Vec<u8> {
        build(|doc| vec![image_page(doc, image, samples)])
    }

    /// A single A4 page with a line of Helvetica text and no images.
    pub fn text_only_pdf() -> Vec<u8> {
        let resources = dictionary! {
            "Font" => dictionary! {
                "F1" => dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => "Helvetica",
                },
            },
        };
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), 12.into()]),
                Operation::new("Td", vec![72.into(), 770.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::String(
                        b"FIR ABCDE 123456 FG".to_vec(),
                        StringFormat::Literal,
                    )],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        build(|_| vec![(resources, content)])
    }
}
