use crate::error::{ErrorKind, Result};
use crate::walk;
use exn::ResultExt;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::{DynamicImage, ImageFormat};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Extensions of the files that become pages.
const PAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// One page worth of image data, ready to be embedded.
struct PageImage {
    width: u32,
    height: u32,
    color_space: &'static str,
    filter: &'static str,
    data: Vec<u8>,
    /// Flate-compressed 8-bit alpha channel, absent when fully opaque.
    alpha: Option<Vec<u8>>,
}
impl PageImage {
    fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).or_raise(|| ErrorKind::Io)?;
        let format = image::guess_format(&bytes).or_raise(|| ErrorKind::Image)?;
        let decoded = image::load_from_memory_with_format(&bytes, format).or_raise(|| ErrorKind::Image)?;
        if format == ImageFormat::Jpeg {
            let color_space = match jpeg_components(&bytes) {
                Some(1) => Some("DeviceGray"),
                Some(3) => Some("DeviceRGB"),
                _ => None,
            };
            if let Some(color_space) = color_space {
                return Ok(Self {
                    width: decoded.width(),
                    height: decoded.height(),
                    color_space,
                    filter: "DCTDecode",
                    data: bytes,
                    alpha: None,
                });
            }
        }
        Self::raster(&decoded)
    }

    fn raster(image: &DynamicImage) -> Result<Self> {
        let color = image.color();
        let (color_space, samples) = match color.has_color() {
            true => ("DeviceRGB", image.to_rgb8().into_raw()),
            false => ("DeviceGray", image.to_luma8().into_raw()),
        };
        let alpha = match color.has_alpha() {
            true => {
                let alpha: Vec<u8> = image.to_rgba8().pixels().map(|pixel| pixel.0[3]).collect();
                match alpha.iter().all(|&a| a == u8::MAX) {
                    true => None,
                    false => Some(deflate(&alpha)?),
                }
            },
            false => None,
        };
        Ok(Self {
            width: image.width(),
            height: image.height(),
            color_space,
            filter: "FlateDecode",
            data: deflate(&samples)?,
            alpha,
        })
    }
}

pub(crate) fn pack(archive: &Path, source: &Path) -> Result<()> {
    let mut document = Document::with_version("1.5");
    let pages_id = document.new_object_id();
    let mut kids = Vec::new();
    for entry in walk::files(source)? {
        if !is_page(&entry.relative) {
            tracing::debug!(file = %entry.relative.display(), "Not an image, leaving it out of the PDF");
            continue;
        }
        let image = PageImage::load(&entry.absolute)?;
        kids.push(Object::Reference(add_page(&mut document, pages_id, image)));
    }
    let count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
    };
    document.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    document.trailer.set("Root", catalog_id);
    document.save(archive).or_raise(|| ErrorKind::Io)?;
    tracing::debug!(pages = count, "Created PDF document");
    Ok(())
}

fn is_page(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| PAGE_EXTENSIONS.iter().any(|known| extension.eq_ignore_ascii_case(known)))
}

/// Add the image, its content stream and the page that shows it.
fn add_page(document: &mut Document, pages_id: ObjectId, image: PageImage) -> ObjectId {
    let (width, height) = (i64::from(image.width), i64::from(image.height));
    let mut xobject = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width,
        "Height" => height,
        "ColorSpace" => image.color_space,
        "BitsPerComponent" => Object::Integer(8),
        "Filter" => image.filter,
    };
    if let Some(alpha) = image.alpha {
        let mask = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width,
            "Height" => height,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => Object::Integer(8),
            "Filter" => "FlateDecode",
        };
        let mask_id = document.add_object(Stream::new(mask, alpha));
        xobject.set("SMask", mask_id);
    }
    let image_id = document.add_object(Stream::new(xobject, image.data));
    // Scale the unit square to the page so the image fills it.
    let content = format!("q\n{width} 0 0 {height} 0 0 cm\n/Im1 Do\nQ\n");
    let content_id = document.add_object(Stream::new(Dictionary::new(), content.into_bytes()));
    document.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(width), Object::Integer(height)],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                "Im1" => image_id,
            },
        },
    })
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data).or_raise(|| ErrorKind::Io)?;
    encoder.finish().or_raise(|| ErrorKind::Io)
}

/// Number of colour components declared by a JPEG's start-of-frame segment.
fn jpeg_components(bytes: &[u8]) -> Option<u8> {
    let mut position = 2;
    while position + 1 < bytes.len() {
        if bytes[position] != 0xFF {
            return None;
        }
        let marker = bytes[position + 1];
        position += 2;
        match marker {
            // Fill bytes.
            0xFF => position -= 1,
            // Standalone markers carry no length.
            0x01 | 0xD0..=0xD8 => {},
            0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
                // Length (2), precision (1), height (2), width (2), components (1).
                return bytes.get(position + 7).copied();
            },
            0xD9 | 0xDA => return None,
            _ => {
                let length = usize::from(u16::from_be_bytes([*bytes.get(position)?, *bytes.get(position + 1)?]));
                position += length;
            },
        }
    }
    None
}
