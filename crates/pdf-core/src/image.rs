//! Signature image embedding

use crate::{PdfError, Result};
use image::{ColorType, DynamicImage, ImageDecoder, ImageReader};
use lopdf::{Dictionary, Object, ObjectId, Stream};
use std::io::{Cursor, Write};

impl From<image::ImageError> for PdfError {
    fn from(err: image::ImageError) -> Self {
        PdfError::ImageError(err.to_string())
    }
}

/// Image formats that can be placed on a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Png => "png",
        }
    }

    /// MIME type
    pub fn content_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }
}

/// Pixel dimensions of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// Detect image format from magic bytes
pub fn detect_format(data: &[u8]) -> Result<ImageFormat> {
    if data.len() < 8 {
        return Err(PdfError::ImageError("Image data too short".to_string()));
    }

    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Ok(ImageFormat::Jpeg);
    }

    if data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Ok(ImageFormat::Png);
    }

    Err(PdfError::ImageError("Unknown image format".to_string()))
}

/// Read image dimensions from the header without decoding pixel data
pub fn get_dimensions(data: &[u8]) -> Result<ImageDimensions> {
    detect_format(data)?;
    let (width, height) = ImageReader::new(Cursor::new(data))
        .with_guessed_format()?
        .into_dimensions()?;
    Ok(ImageDimensions { width, height })
}

/// Image XObject ready for embedding, with an optional alpha soft mask
#[derive(Debug, Clone)]
pub struct ImageXObject {
    pub width: u32,
    pub height: u32,
    /// "DeviceRGB", "DeviceGray" or "DeviceCMYK"
    pub color_space: String,
    pub bits_per_component: u8,
    /// "DCTDecode" for JPEG, "FlateDecode" for decoded PNG samples
    pub filter: String,
    /// Compressed sample data
    pub data: Vec<u8>,
    /// /Decode array, set for inverted CMYK JPEGs
    pub decode: Option<Vec<i64>>,
    /// Flate-compressed 8-bit alpha samples, present only when the image
    /// has at least one non-opaque pixel
    pub alpha: Option<Vec<u8>>,
}

impl ImageXObject {
    /// Build an XObject from JPEG or PNG bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        match detect_format(data)? {
            ImageFormat::Jpeg => Self::from_jpeg(data),
            ImageFormat::Png => Self::from_png(data),
        }
    }

    /// JPEG data is passed through untouched with DCTDecode
    ///
    /// The color space follows the component count of the frame header, since
    /// the decoder reports CMYK files as RGB after converting them.
    pub fn from_jpeg(data: &[u8]) -> Result<Self> {
        let decoder = ImageReader::new(Cursor::new(data))
            .with_guessed_format()?
            .into_decoder()?;
        let (width, height) = decoder.dimensions();
        let components = jpeg_components(data).unwrap_or(match decoder.color_type() {
            ColorType::L8 | ColorType::L16 => 1,
            _ => 3,
        });
        let (color_space, decode) = jpeg_color_space(components);

        Ok(Self {
            width,
            height,
            color_space: color_space.to_string(),
            bits_per_component: 8,
            filter: "DCTDecode".to_string(),
            data: data.to_vec(),
            decode,
            alpha: None,
        })
    }

    /// PNG data is decoded, split into color and alpha planes and re-compressed
    ///
    /// Drawn signatures are usually RGBA with a transparent background, so the
    /// alpha plane becomes an /SMask and the page shows through.
    pub fn from_png(data: &[u8]) -> Result<Self> {
        let decoder = ImageReader::new(Cursor::new(data))
            .with_guessed_format()?
            .into_decoder()?;
        let (width, height) = decoder.dimensions();
        let color_type = decoder.color_type();
        let image = DynamicImage::from_decoder(decoder)?;

        let (samples, alpha, color_space) = match color_type {
            ColorType::L8 | ColorType::L16 => (image.to_luma8().into_raw(), None, "DeviceGray"),
            ColorType::La8 | ColorType::La16 => {
                let la = image.to_luma_alpha8();
                let pixels = width as usize * height as usize;
                let mut gray = Vec::with_capacity(pixels);
                let mut mask = Vec::with_capacity(pixels);
                for px in la.pixels() {
                    gray.push(px[0]);
                    mask.push(px[1]);
                }
                (gray, Some(mask), "DeviceGray")
            }
            ColorType::Rgba8 | ColorType::Rgba16 | ColorType::Rgba32F => {
                let rgba = image.to_rgba8();
                let pixels = width as usize * height as usize;
                let mut rgb = Vec::with_capacity(pixels * 3);
                let mut mask = Vec::with_capacity(pixels);
                for px in rgba.pixels() {
                    rgb.extend_from_slice(&px.0[..3]);
                    mask.push(px[3]);
                }
                (rgb, Some(mask), "DeviceRGB")
            }
            _ => (image.to_rgb8().into_raw(), None, "DeviceRGB"),
        };

        // Fully opaque images don't need a mask
        let alpha = match alpha {
            Some(mask) if mask.iter().any(|&a| a < u8::MAX) => Some(deflate(&mask)?),
            _ => None,
        };

        Ok(Self {
            width,
            height,
            color_space: color_space.to_string(),
            bits_per_component: 8,
            filter: "FlateDecode".to_string(),
            data: deflate(&samples)?,
            decode: None,
            alpha,
        })
    }

    /// Stream for the alpha plane, if any
    pub fn soft_mask_stream(&self) -> Option<Stream> {
        self.alpha.as_ref().map(|mask| {
            let mut dict = image_dict(self.width, self.height, "DeviceGray", "FlateDecode");
            dict.set("BitsPerComponent", 8i64);
            Stream::new(dict, mask.clone())
        })
    }

    /// Convert to lopdf Stream, linking the soft mask object when given
    pub fn to_pdf_stream(&self, soft_mask: Option<ObjectId>) -> Stream {
        let mut dict = image_dict(self.width, self.height, &self.color_space, &self.filter);
        dict.set("BitsPerComponent", self.bits_per_component as i64);
        if let Some(decode) = &self.decode {
            dict.set(
                "Decode",
                Object::Array(decode.iter().map(|&v| Object::Integer(v)).collect()),
            );
        }
        if let Some(id) = soft_mask {
            dict.set("SMask", Object::Reference(id));
        }
        Stream::new(dict, self.data.clone())
    }
}

/// Number of color components declared in the JPEG frame header
fn jpeg_components(data: &[u8]) -> Option<u8> {
    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            return None;
        }
        let marker = data[pos + 1];
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        // SOF0..SOF15, minus DHT, JPG and DAC
        if (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC) {
            // length(2) precision(1) height(2) width(2) components(1)
            return data.get(pos + 9).copied();
        }
        if marker == 0xDA {
            return None;
        }
        let len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        pos += 2 + len;
    }
    None
}

/// PDF color space for a JPEG with `components` channels
///
/// CMYK JPEGs as written by Adobe tools store inverted samples.
fn jpeg_color_space(components: u8) -> (&'static str, Option<Vec<i64>>) {
    match components {
        1 => ("DeviceGray", None),
        4 => ("DeviceCMYK", Some(vec![1, 0, 1, 0, 1, 0, 1, 0])),
        _ => ("DeviceRGB", None),
    }
}

fn image_dict(width: u32, height: u32, color_space: &str, filter: &str) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", width as i64);
    dict.set("Height", height as i64);
    dict.set("ColorSpace", Object::Name(color_space.as_bytes().to_vec()));
    dict.set("Filter", Object::Name(filter.as_bytes().to_vec()));
    dict
}

fn deflate(raw: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(raw)?;
    Ok(encoder.finish()?)
}

/// Generate operators that paint an image XObject into a box
///
/// `x`/`y` are the bottom-left corner of the box in PDF coordinates.
pub fn generate_image_operators(
    image_name: &str,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> Vec<u8> {
    format!("q\n{width} 0 0 {height} {x} {y} cm\n/{image_name} Do\nQ\n").into_bytes()
}
