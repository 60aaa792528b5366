use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use flate2::read::ZlibDecoder;
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::fs;
use std::io::Read;
use std::path::Path;

/// How deep to chase indirect references and inherited page attributes.
const MAX_INDIRECTION: usize = 32;

/// An image XObject decoded into something that can be written to disk.
enum Extracted {
    /// JPEG data, already a complete file.
    Jpeg(Vec<u8>),
    Raster(DynamicImage),
}
impl Extracted {
    fn extension(&self) -> &'static str {
        match self {
            Extracted::Jpeg(_) => "jpeg",
            Extracted::Raster(_) => "png",
        }
    }

    fn write_to(&self, path: &Path) -> Result<()> {
        match self {
            Extracted::Jpeg(bytes) => fs::write(path, bytes).or_raise(|| ErrorKind::Io),
            Extracted::Raster(image) => image.save_with_format(path, ImageFormat::Png).or_raise(|| ErrorKind::Image),
        }
    }
}

/// How the samples of an image map onto colours.
enum ColorModel {
    /// Samples are the colour components themselves: 1 (gray), 3 (RGB) or 4
    /// (CMYK) per pixel.
    Direct(u8),
    /// One sample per pixel, an index into a palette of `base`-component
    /// colours.
    Indexed { base: u8, palette: Vec<u8> },
}
impl ColorModel {
    fn samples_per_pixel(&self) -> usize {
        match self {
            ColorModel::Direct(components) => usize::from(*components),
            ColorModel::Indexed { .. } => 1,
        }
    }
}

/// Write every image of every page to `destination`. An image that cannot be
/// decoded fails the whole extraction, so that no page is silently lost.
pub(crate) fn unpack(archive: &Path, destination: &Path) -> Result<()> {
    let document = Document::load(archive).or_raise(|| ErrorKind::Pdf)?;
    let mut written = 0usize;
    for (page_number, page_id) in document.get_pages() {
        for (index, (name, stream)) in page_images(&document, page_id)?.into_iter().enumerate() {
            let extracted =
                decode(&document, stream).or_raise(|| ErrorKind::PageImage { page: page_number, name: name.clone() })?;
            let file_name = format!("image_{:04}_{:03}.{}", page_number, index + 1, extracted.extension());
            extracted.write_to(&destination.join(file_name))?;
            written += 1;
        }
    }
    tracing::debug!(images = written, "Extracted PDF page images");
    Ok(())
}

/// The image XObjects available to a page, in resource dictionary order.
fn page_images<'a>(document: &'a Document, page_id: ObjectId) -> Result<Vec<(String, &'a Stream)>> {
    let Some(resources) = page_resources(document, page_id)? else {
        return Ok(Vec::new());
    };
    let Ok(xobjects) = resources.get(b"XObject") else {
        return Ok(Vec::new());
    };
    let xobjects = resolve(document, xobjects)?.as_dict().or_raise(|| ErrorKind::Pdf)?;
    let mut images = Vec::new();
    for (name, object) in xobjects.iter() {
        let Ok(stream) = resolve(document, object)?.as_stream() else {
            continue;
        };
        if stream.dict.get(b"Subtype").and_then(Object::as_name).is_ok_and(|subtype| subtype == b"Image") {
            images.push((String::from_utf8_lossy(name).into_owned(), stream));
        }
    }
    Ok(images)
}

/// The page's `/Resources`, inherited from ancestors in the page tree when the
/// page itself does not declare any.
fn page_resources(document: &Document, page_id: ObjectId) -> Result<Option<&Dictionary>> {
    let mut node = document.get_object(page_id).and_then(Object::as_dict).or_raise(|| ErrorKind::Pdf)?;
    for _ in 0..MAX_INDIRECTION {
        if let Ok(resources) = node.get(b"Resources") {
            return Ok(Some(resolve(document, resources)?.as_dict().or_raise(|| ErrorKind::Pdf)?));
        }
        match node.get(b"Parent") {
            Ok(parent) => node = resolve(document, parent)?.as_dict().or_raise(|| ErrorKind::Pdf)?,
            Err(_) => return Ok(None),
        }
    }
    exn::bail!(ErrorKind::Pdf)
}

fn resolve<'a>(document: &'a Document, mut object: &'a Object) -> Result<&'a Object> {
    for _ in 0..MAX_INDIRECTION {
        match object {
            Object::Reference(id) => object = document.get_object(*id).or_raise(|| ErrorKind::Pdf)?,
            other => return Ok(other),
        }
    }
    exn::bail!(ErrorKind::Pdf)
}

fn filters(document: &Document, dict: &Dictionary) -> Result<Vec<Vec<u8>>> {
    let Ok(filter) = dict.get(b"Filter") else {
        return Ok(Vec::new());
    };
    match resolve(document, filter)? {
        Object::Name(name) => Ok(vec![name.clone()]),
        Object::Array(names) => names
            .iter()
            .map(|name| resolve(document, name)?.as_name().map(<[u8]>::to_vec).or_raise(|| ErrorKind::Pdf))
            .collect(),
        _ => exn::bail!(ErrorKind::Pdf),
    }
}

/// `/DecodeParms` of a single-filter stream, which may also be written as a
/// one-element array.
fn decode_params<'a>(document: &'a Document, dict: &'a Dictionary) -> Result<Option<&'a Dictionary>> {
    let Ok(params) = dict.get(b"DecodeParms") else {
        return Ok(None);
    };
    match resolve(document, params)? {
        Object::Dictionary(params) => Ok(Some(params)),
        Object::Array(items) => match items.first() {
            Some(first) => Ok(resolve(document, first)?.as_dict().ok()),
            None => Ok(None),
        },
        Object::Null => Ok(None),
        _ => exn::bail!(ErrorKind::Pdf),
    }
}

fn integer(document: &Document, dict: &Dictionary, key: &[u8]) -> Result<i64> {
    let value = dict.get(key).or_raise(|| ErrorKind::Pdf)?;
    resolve(document, value)?.as_i64().or_raise(|| ErrorKind::Pdf)
}

/// Number of colour components of a device, calibrated or ICC colour space.
fn components(document: &Document, color_space: &Object) -> Result<u8> {
    let unsupported = |name: &[u8]| ErrorKind::UnsupportedImage(format!("colour space {}", String::from_utf8_lossy(name)));
    match resolve(document, color_space)? {
        Object::Name(name) => match name.as_slice() {
            b"DeviceGray" | b"CalGray" | b"G" => Ok(1),
            b"DeviceRGB" | b"CalRGB" | b"RGB" => Ok(3),
            b"DeviceCMYK" | b"CMYK" => Ok(4),
            other => exn::bail!(unsupported(other)),
        },
        Object::Array(items) => {
            let family = items.first().map(|f| resolve(document, f)).transpose()?;
            match family.and_then(|f| f.as_name().ok()) {
                Some(b"CalGray") => Ok(1),
                Some(b"CalRGB") => Ok(3),
                Some(b"ICCBased") => {
                    let profile = items.get(1).ok_or_raise(|| ErrorKind::Pdf)?;
                    let profile = resolve(document, profile)?.as_stream().or_raise(|| ErrorKind::Pdf)?;
                    match integer(document, &profile.dict, b"N")? {
                        1 => Ok(1),
                        3 => Ok(3),
                        4 => Ok(4),
                        n => exn::bail!(ErrorKind::UnsupportedImage(format!("ICC profile with {n} components"))),
                    }
                },
                Some(other) => exn::bail!(unsupported(other)),
                None => exn::bail!(ErrorKind::Pdf),
            }
        },
        _ => exn::bail!(ErrorKind::Pdf),
    }
}

fn color_model(document: &Document, color_space: &Object) -> Result<ColorModel> {
    let color_space = resolve(document, color_space)?;
    if let Object::Array(items) = color_space
        && let [family, base, _high, lookup] = items.as_slice()
        && matches!(resolve(document, family)?.as_name(), Ok(b"Indexed" | b"I"))
    {
        let base = components(document, base)?;
        let palette = match resolve(document, lookup)? {
            Object::String(bytes, _) => bytes.clone(),
            Object::Stream(stream) if stream.dict.has(b"Filter") => {
                stream.decompressed_content().or_raise(|| ErrorKind::Pdf)?
            },
            Object::Stream(stream) => stream.content.clone(),
            _ => exn::bail!(ErrorKind::Pdf),
        };
        return Ok(ColorModel::Indexed { base, palette });
    }
    components(document, color_space).map(ColorModel::Direct)
}

fn decode(document: &Document, stream: &Stream) -> Result<Extracted> {
    let dict = &stream.dict;
    let filters = filters(document, dict)?;
    match filters.iter().map(Vec::as_slice).collect::<Vec<_>>().as_slice() {
        [b"DCTDecode"] => {
            image::load_from_memory_with_format(&stream.content, ImageFormat::Jpeg).or_raise(|| ErrorKind::Image)?;
            return Ok(Extracted::Jpeg(stream.content.clone()));
        },
        [] | [b"FlateDecode"] => {},
        other => {
            let names: Vec<_> = other.iter().map(|f| String::from_utf8_lossy(f)).collect();
            exn::bail!(ErrorKind::UnsupportedImage(format!("filter {}", names.join(", "))));
        },
    }
    let width = u32::try_from(integer(document, dict, b"Width")?).or_raise(|| ErrorKind::Pdf)?;
    let height = u32::try_from(integer(document, dict, b"Height")?).or_raise(|| ErrorKind::Pdf)?;
    if width == 0 || height == 0 {
        exn::bail!(ErrorKind::InvalidData);
    }
    let stencil = dict.get(b"ImageMask").and_then(Object::as_bool).unwrap_or(false);
    let (bits, model) = match stencil {
        // A stencil mask is a 1-bit mask where 0 marks the painted area.
        true => (1, ColorModel::Direct(1)),
        false => {
            let color_space = dict.get(b"ColorSpace").or_raise(|| ErrorKind::Pdf)?;
            (integer(document, dict, b"BitsPerComponent")?, color_model(document, color_space)?)
        },
    };
    let bits = match bits {
        1 | 2 | 4 | 8 => bits as usize,
        other => exn::bail!(ErrorKind::UnsupportedImage(format!("{other} bits per component"))),
    };
    let data = match filters.is_empty() {
        true => stream.content.clone(),
        false => inflate(&stream.content)?,
    };
    let data = unpredict(decode_params(document, dict)?, data)?;
    let samples = unpack_samples(&data, width as usize * model.samples_per_pixel(), height as usize, bits)?;
    let (channels, pixels) = match model {
        ColorModel::Direct(channels) => {
            let inverted = channels == 1 && inverted_decode(dict);
            let pixels = samples
                .into_iter()
                .map(|sample| scale(sample, bits))
                .map(|value| if inverted { u8::MAX - value } else { value })
                .collect();
            (channels, pixels)
        },
        ColorModel::Indexed { base, palette } => {
            let size = usize::from(base);
            let mut pixels = Vec::with_capacity(samples.len() * size);
            for index in samples {
                let start = usize::from(index) * size;
                pixels.extend_from_slice(palette.get(start..start + size).ok_or_raise(|| ErrorKind::InvalidData)?);
            }
            (base, pixels)
        },
    };
    let image = match channels {
        1 => GrayImage::from_raw(width, height, pixels).map(DynamicImage::ImageLuma8),
        3 => RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8),
        _ => RgbImage::from_raw(width, height, cmyk_to_rgb(&pixels)).map(DynamicImage::ImageRgb8),
    };
    image.map(Extracted::Raster).ok_or_raise(|| ErrorKind::InvalidData)
}

fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut samples = Vec::new();
    ZlibDecoder::new(data).read_to_end(&mut samples).or_raise(|| ErrorKind::InvalidData)?;
    Ok(samples)
}

/// Undo the `/Predictor` applied to the samples before compression.
fn unpredict(params: Option<&Dictionary>, data: Vec<u8>) -> Result<Vec<u8>> {
    let Some(params) = params else {
        return Ok(data);
    };
    let param = |key: &[u8], default: i64| params.get(key).and_then(Object::as_i64).unwrap_or(default);
    let predictor = param(b"Predictor", 1);
    if predictor == 1 {
        return Ok(data);
    }
    let colors = usize::try_from(param(b"Colors", 1)).or_raise(|| ErrorKind::Pdf)?;
    let bits = usize::try_from(param(b"BitsPerComponent", 8)).or_raise(|| ErrorKind::Pdf)?;
    let columns = usize::try_from(param(b"Columns", 1)).or_raise(|| ErrorKind::Pdf)?;
    let stride = (colors * bits * columns).div_ceil(8);
    if stride == 0 {
        exn::bail!(ErrorKind::Pdf);
    }
    match predictor {
        2 if bits == 8 => Ok(tiff_unpredict(data, stride, colors)),
        10..=15 => png_unpredict(&data, stride, (colors * bits).div_ceil(8).max(1)),
        other => exn::bail!(ErrorKind::UnsupportedImage(format!("predictor {other} with {bits} bits"))),
    }
}

/// Reverse PNG row filters. Each row starts with its own filter type byte;
/// `bpp` is the distance in bytes to the corresponding byte of the previous
/// pixel.
fn png_unpredict(data: &[u8], stride: usize, bpp: usize) -> Result<Vec<u8>> {
    let mut decoded = Vec::with_capacity(data.len() / (stride + 1) * stride);
    let mut previous = vec![0u8; stride];
    for row in data.chunks(stride + 1) {
        let Some((&filter, encoded)) = row.split_first() else {
            continue;
        };
        if encoded.len() != stride {
            exn::bail!(ErrorKind::InvalidData);
        }
        let mut current = encoded.to_vec();
        for i in 0..stride {
            let left = if i >= bpp { current[i - bpp] } else { 0 };
            let up_left = if i >= bpp { previous[i - bpp] } else { 0 };
            let up = previous[i];
            let predicted = match filter {
                0 => 0,
                1 => left,
                2 => up,
                3 => ((u16::from(left) + u16::from(up)) / 2) as u8,
                4 => paeth(left, up, up_left),
                _ => exn::bail!(ErrorKind::InvalidData),
            };
            current[i] = current[i].wrapping_add(predicted);
        }
        decoded.extend_from_slice(&current);
        previous = current;
    }
    Ok(decoded)
}

fn paeth(left: u8, up: u8, up_left: u8) -> u8 {
    let estimate = i16::from(left) + i16::from(up) - i16::from(up_left);
    let distance = |value: u8| (estimate - i16::from(value)).abs();
    if distance(left) <= distance(up) && distance(left) <= distance(up_left) {
        left
    } else if distance(up) <= distance(up_left) {
        up
    } else {
        up_left
    }
}

/// Reverse TIFF predictor 2 for 8-bit samples: each sample is stored as the
/// difference to the same component of the pixel on its left.
fn tiff_unpredict(mut data: Vec<u8>, stride: usize, colors: usize) -> Vec<u8> {
    for row in data.chunks_mut(stride) {
        for i in colors..row.len() {
            row[i] = row[i].wrapping_add(row[i - colors]);
        }
    }
    data
}

/// Expand rows of `bits`-wide samples, each row padded to a whole byte, into
/// one byte per sample.
fn unpack_samples(data: &[u8], per_row: usize, rows: usize, bits: usize) -> Result<Vec<u8>> {
    let stride = (per_row * bits).div_ceil(8);
    if data.len() < stride * rows {
        exn::bail!(ErrorKind::InvalidData);
    }
    if bits == 8 {
        return Ok(data[..stride * rows].to_vec());
    }
    let mask = (1u16 << bits) - 1;
    let mut samples = Vec::with_capacity(per_row * rows);
    for row in data.chunks(stride).take(rows) {
        for i in 0..per_row {
            let offset = i * bits;
            let shift = 8 - bits - offset % 8;
            samples.push(((u16::from(row[offset / 8]) >> shift) & mask) as u8);
        }
    }
    Ok(samples)
}

/// Stretch a `bits`-wide sample to the full 8-bit range.
fn scale(sample: u8, bits: usize) -> u8 {
    match bits {
        8 => sample,
        _ => (u16::from(sample) * 255 / ((1u16 << bits) - 1)) as u8,
    }
}

/// Whether `/Decode [1 0]` flips a single-component image.
fn inverted_decode(dict: &Dictionary) -> bool {
    dict.get(b"Decode")
        .and_then(Object::as_array)
        .is_ok_and(|decode| matches!(decode.as_slice(), [low, _] if low.as_float().is_ok_and(|low| low >= 1.0)))
}

fn cmyk_to_rgb(samples: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(samples.len() / 4 * 3);
    for pixel in samples.chunks_exact(4) {
        let k = 255 - u16::from(pixel[3]);
        for &channel in &pixel[..3] {
            rgb.push(((255 - u16::from(channel)) * k / 255) as u8);
        }
    }
    rgb
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::ZlibEncoder;
    use image::{Luma, Rgb};
    use lopdf::{StringFormat, dictionary};
    use rstest::rstest;
    use std::io::{Cursor, Write};

    fn deflate(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    /// Apply PNG row filters, cycling through all five filter types.
    fn png_predict(raw: &[u8], stride: usize, bpp: usize) -> Vec<u8> {
        let mut encoded = Vec::new();
        let mut previous = vec![0u8; stride];
        for (row_index, row) in raw.chunks(stride).enumerate() {
            let filter = (row_index % 5) as u8;
            encoded.push(filter);
            for i in 0..stride {
                let left = if i >= bpp { row[i - bpp] } else { 0 };
                let up_left = if i >= bpp { previous[i - bpp] } else { 0 };
                let up = previous[i];
                let predicted = match filter {
                    0 => 0,
                    1 => left,
                    2 => up,
                    3 => ((u16::from(left) + u16::from(up)) / 2) as u8,
                    _ => paeth(left, up, up_left),
                };
                encoded.push(row[i].wrapping_sub(predicted));
            }
            previous = row.to_vec();
        }
        encoded
    }

    fn rgb_pixels(width: u32, height: u32) -> Vec<u8> {
        (0..width * height * 3).map(|i| (i * 37 % 251) as u8).collect()
    }

    /// An 8-bit RGB image stored with PNG predictors, the way PNG pages are
    /// usually embedded.
    fn predicted_rgb(width: u32, height: u32) -> Stream {
        let raw = rgb_pixels(width, height);
        let data = deflate(&png_predict(&raw, width as usize * 3, 3));
        Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(width),
                "Height" => i64::from(height),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => Object::Integer(8),
                "Filter" => "FlateDecode",
                "DecodeParms" => dictionary! {
                    "Predictor" => Object::Integer(15),
                    "Colors" => Object::Integer(3),
                    "Columns" => i64::from(width),
                    "BitsPerComponent" => Object::Integer(8),
                },
            },
            data,
        )
    }

    /// A 3x2 two-colour palette image, one bit per pixel.
    fn indexed_one_bit() -> Stream {
        Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => Object::Integer(3),
                "Height" => Object::Integer(2),
                "ColorSpace" => vec![
                    Object::Name(b"Indexed".to_vec()),
                    Object::Name(b"DeviceRGB".to_vec()),
                    Object::Integer(1),
                    Object::String(vec![255, 0, 0, 0, 0, 255], StringFormat::Hexadecimal),
                ],
                "BitsPerComponent" => Object::Integer(1),
                "Filter" => "FlateDecode",
            },
            deflate(&[0b1010_0000, 0b0100_0000]),
        )
    }

    fn jpeg(width: u32, height: u32) -> Stream {
        let image = RgbImage::from_pixel(width, height, Rgb([20, 120, 220]));
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg).unwrap();
        Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(width),
                "Height" => i64::from(height),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => Object::Integer(8),
                "Filter" => "DCTDecode",
            },
            bytes,
        )
    }

    /// One page per entry, each showing the named image XObjects in order.
    fn write_pdf(path: &Path, pages: Vec<Vec<(&str, Stream)>>) {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();
        let mut kids = Vec::new();
        for images in pages {
            let mut xobjects = Dictionary::new();
            for (name, stream) in images {
                let id = document.add_object(stream);
                xobjects.set(name, id);
            }
            let page_id = document.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(10), Object::Integer(10)],
                "Resources" => dictionary! { "XObject" => xobjects },
            });
            kids.push(Object::Reference(page_id));
        }
        let count = kids.len() as i64;
        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! { "Type" => "Pages", "Kids" => kids, "Count" => count }),
        );
        let catalog_id = document.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        document.trailer.set("Root", catalog_id);
        document.save(path).unwrap();
    }

    fn names_in(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn images_are_named_by_page_and_position() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("book.pdf");
        write_pdf(
            &archive,
            vec![vec![("Im1", predicted_rgb(4, 5)), ("Im2", indexed_one_bit())], vec![("Im1", jpeg(8, 8))]],
        );
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();
        unpack(&archive, &out).unwrap();
        assert_eq!(names_in(&out), vec!["image_0001_001.png", "image_0001_002.png", "image_0002_001.jpeg"]);

        let first = image::open(out.join("image_0001_001.png")).unwrap().to_rgb8();
        assert_eq!(first.dimensions(), (4, 5));
        assert_eq!(first.into_raw(), rgb_pixels(4, 5));

        let second = image::open(out.join("image_0001_002.png")).unwrap().to_rgb8();
        let (red, blue) = (Rgb([255, 0, 0]), Rgb([0, 0, 255]));
        let pixels: Vec<_> = second.pixels().copied().collect();
        assert_eq!(pixels, vec![blue, red, blue, red, blue, red]);
    }

    #[test]
    fn undecodable_image_fails_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("book.pdf");
        let mut jpx = jpeg(8, 8);
        jpx.dict.set("Filter", "JPXDecode");
        write_pdf(&archive, vec![vec![("Im1", predicted_rgb(2, 2))], vec![("Im1", jpx)]]);
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();
        let err = unpack(&archive, &out).unwrap_err();
        assert_eq!(*err, ErrorKind::PageImage { page: 2, name: "Im1".to_string() });
    }

    #[test]
    fn stencil_mask_becomes_gray() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("book.pdf");
        let mask = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => Object::Integer(2),
                "Height" => Object::Integer(1),
                "ImageMask" => true,
            },
            vec![0b0100_0000],
        );
        write_pdf(&archive, vec![vec![("Im1", mask)]]);
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();
        unpack(&archive, &out).unwrap();
        let image = image::open(out.join("image_0001_001.png")).unwrap().to_luma8();
        assert_eq!(image.pixels().copied().collect::<Vec<_>>(), vec![Luma([0]), Luma([255])]);
    }

    #[test]
    fn png_predictors_are_reversed() {
        let raw: Vec<u8> = (0..60).map(|i| (i * 53 % 256) as u8).collect();
        assert_eq!(png_unpredict(&png_predict(&raw, 12, 3), 12, 3).unwrap(), raw);
    }

    #[rstest]
    #[case::unknown_filter_type(vec![5, 1, 2, 3])]
    #[case::short_row(vec![0, 1, 2])]
    fn png_predictor_rejects_bad_rows(#[case] data: Vec<u8>) {
        let err = png_unpredict(&data, 3, 1).unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidData);
    }

    #[test]
    fn tiff_predictor_is_reversed() {
        let params = dictionary! {
            "Predictor" => Object::Integer(2),
            "Colors" => Object::Integer(1),
            "Columns" => Object::Integer(3),
        };
        assert_eq!(unpredict(Some(&params), vec![10, 5, 5, 200, 100, 0]).unwrap(), vec![10, 15, 20, 200, 44, 44]);
    }

    #[rstest]
    #[case(&[0b1011_0000], 4, 1, vec![1, 0, 1, 1])]
    #[case(&[0b1110_0100], 4, 2, vec![3, 2, 1, 0])]
    #[case(&[0xA5, 0xF0], 3, 4, vec![0xA, 0x5, 0xF])]
    fn samples_are_unpacked(#[case] data: &[u8], #[case] per_row: usize, #[case] bits: usize, #[case] expected: Vec<u8>) {
        assert_eq!(unpack_samples(data, per_row, 1, bits).unwrap(), expected);
    }

    #[test]
    fn samples_shorter_than_the_image_are_invalid() {
        let err = unpack_samples(&[0; 5], 3, 2, 8).unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidData);
    }

    #[rstest]
    #[case(&[0, 0, 0, 0], &[255, 255, 255])]
    #[case(&[0, 0, 0, 255], &[0, 0, 0])]
    #[case(&[255, 0, 255, 0], &[0, 255, 0])]
    fn test_cmyk_to_rgb(#[case] cmyk: &[u8], #[case] rgb: &[u8]) {
        assert_eq!(cmyk_to_rgb(cmyk), rgb);
    }

    #[test]
    fn components_of_device_spaces() {
        let document = Document::with_version("1.5");
        assert_eq!(components(&document, &Object::Name(b"DeviceGray".to_vec())).unwrap(), 1);
        assert_eq!(components(&document, &Object::Name(b"DeviceRGB".to_vec())).unwrap(), 3);
        assert_eq!(components(&document, &Object::Name(b"DeviceCMYK".to_vec())).unwrap(), 4);
        let pattern = Object::Array(vec![Object::Name(b"Pattern".to_vec())]);
        let err = components(&document, &pattern).unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnsupportedImage(_)));
    }

    #[test]
    fn unpack_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.pdf");
        fs::write(&path, b"%PDF-1.4 but nothing else").unwrap();
        let err = unpack(&path, dir.path()).unwrap_err();
        assert_eq!(*err, ErrorKind::Pdf);
    }
}
