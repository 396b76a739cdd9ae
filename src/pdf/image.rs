//! Raster image embedding.
//!
//! Rasterized pages arrive as data URIs and become image XObjects. JPEG
//! payloads pass through untouched under a `DCTDecode` filter, with only the
//! SOF header read for dimensions and component count. PNG payloads are
//! decoded to raw samples and recompressed with `FlateDecode`; an alpha
//! channel splits off into a separate grayscale SMask. Those two formats are
//! the entire embedding contract; any other MIME type is rejected.

use std::io::Write;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use super::object::{dict, Dict, Object};

/// Image format for PDF embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// JPEG image (DCTDecode filter)
    Jpeg,
    /// PNG image (FlateDecode filter)
    Png,
}

impl ImageFormat {
    /// The PDF stream filter applied to this format's data.
    pub fn filter_name(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "DCTDecode",
            ImageFormat::Png => "FlateDecode",
        }
    }
}

/// Color space of the embedded samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// Grayscale, one component per pixel
    Gray,
    /// RGB, three components per pixel
    Rgb,
    /// CMYK, four components per pixel
    Cmyk,
}

impl ColorSpace {
    /// The PDF name for this color space.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ColorSpace::Gray => "DeviceGray",
            ColorSpace::Rgb => "DeviceRGB",
            ColorSpace::Cmyk => "DeviceCMYK",
        }
    }
}

/// Image embedding error.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// Payload is not a well-formed base64 data URI
    #[error("malformed data URI: {0}")]
    MalformedDataUri(String),

    /// MIME type outside the png/jpeg contract
    #[error("unsupported MIME type: {0}")]
    UnsupportedMime(String),

    /// The payload could not be decoded as its declared format
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// Recompressing decoded samples failed
    #[error("compression error: {0}")]
    Compression(String),
}

/// A bitmap prepared for embedding: dimensions, color info, and data already
/// encoded for its stream filter.
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Bits per component (always 8 here)
    pub bits_per_component: u8,
    /// Color space of `data`
    pub color_space: ColorSpace,
    /// Source format, selecting the stream filter
    pub format: ImageFormat,
    /// Filter-encoded image data (DCT for JPEG, zlib for PNG)
    pub data: Vec<u8>,
    /// Alpha channel as zlib-compressed grayscale samples, when present
    pub soft_mask: Option<Vec<u8>>,
}

impl ImageData {
    /// Prepare a JPEG for pass-through embedding. Only the frame header is
    /// read; the compressed data is not transcoded.
    pub fn from_jpeg(data: Vec<u8>) -> Result<Self, ImageError> {
        let (width, height, components) = jpeg_frame_info(&data)?;
        let color_space = match components {
            1 => ColorSpace::Gray,
            4 => ColorSpace::Cmyk,
            _ => ColorSpace::Rgb,
        };

        Ok(Self {
            width,
            height,
            bits_per_component: 8,
            color_space,
            format: ImageFormat::Jpeg,
            data,
            soft_mask: None,
        })
    }

    /// Decode a PNG and recompress its samples for FlateDecode embedding.
    pub fn from_png(data: &[u8]) -> Result<Self, ImageError> {
        use image::GenericImageView;

        let decoded = image::load_from_memory_with_format(data, image::ImageFormat::Png)
            .map_err(|err| ImageError::Decode(err.to_string()))?;

        let (width, height) = decoded.dimensions();
        let color = decoded.color();
        let grayscale = matches!(
            color,
            image::ColorType::L8
                | image::ColorType::L16
                | image::ColorType::La8
                | image::ColorType::La16
        );

        let (color_space, samples, alpha) = match (grayscale, color.has_alpha()) {
            (true, false) => (ColorSpace::Gray, decoded.to_luma8().into_raw(), None),
            (true, true) => {
                let (gray, mask) = split_alpha(decoded.to_luma_alpha8().as_raw(), 2);
                (ColorSpace::Gray, gray, Some(mask))
            }
            (false, false) => (ColorSpace::Rgb, decoded.to_rgb8().into_raw(), None),
            (false, true) => {
                let (rgb, mask) = split_alpha(decoded.to_rgba8().as_raw(), 4);
                (ColorSpace::Rgb, rgb, Some(mask))
            }
        };

        Ok(Self {
            width,
            height,
            bits_per_component: 8,
            color_space,
            format: ImageFormat::Png,
            data: deflate(&samples)?,
            soft_mask: alpha.as_deref().map(deflate).transpose()?,
        })
    }

    /// Load an image from a `data:image/{png|jpeg};base64,…` URI.
    pub fn from_data_uri(uri: &str) -> Result<Self, ImageError> {
        let (mime, bytes) = decode_data_uri(uri)?;
        match mime.as_str() {
            "image/jpeg" => Self::from_jpeg(bytes),
            "image/png" => Self::from_png(&bytes),
            other => Err(ImageError::UnsupportedMime(other.to_string())),
        }
    }

    /// The image XObject stream dictionary. `/Length` is left to the
    /// serializer, which frames every stream with its data length.
    pub fn xobject_dict(&self) -> Dict {
        dict([
            ("Type", Object::name("XObject")),
            ("Subtype", Object::name("Image")),
            ("Width", Object::Integer(self.width as i64)),
            ("Height", Object::Integer(self.height as i64)),
            ("ColorSpace", Object::name(self.color_space.pdf_name())),
            (
                "BitsPerComponent",
                Object::Integer(self.bits_per_component as i64),
            ),
            ("Filter", Object::name(self.format.filter_name())),
        ])
    }

    /// The SMask stream dictionary for the alpha channel, when one exists.
    pub fn soft_mask_dict(&self) -> Option<Dict> {
        self.soft_mask.as_ref().map(|_| {
            dict([
                ("Type", Object::name("XObject")),
                ("Subtype", Object::name("Image")),
                ("Width", Object::Integer(self.width as i64)),
                ("Height", Object::Integer(self.height as i64)),
                ("ColorSpace", Object::name("DeviceGray")),
                ("BitsPerComponent", Object::Integer(8)),
                ("Filter", Object::name("FlateDecode")),
            ])
        })
    }
}

/// Split and decode a base64 data URI, returning the lowercased MIME type
/// and the decoded payload.
pub fn decode_data_uri(uri: &str) -> Result<(String, Vec<u8>), ImageError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| ImageError::MalformedDataUri("missing 'data:' scheme".to_string()))?;

    let (mime, payload) = rest.split_once(";base64,").ok_or_else(|| {
        ImageError::MalformedDataUri("missing ';base64,' marker".to_string())
    })?;

    let bytes = BASE64
        .decode(payload.trim())
        .map_err(|err| ImageError::MalformedDataUri(format!("base64 decode failed: {}", err)))?;

    Ok((mime.trim().to_ascii_lowercase(), bytes))
}

/// Walk JPEG segments to the first SOF marker and read the frame header:
/// big-endian height, then width, then the component count.
fn jpeg_frame_info(data: &[u8]) -> Result<(u32, u32, u8), ImageError> {
    if !data.starts_with(&[0xFF, 0xD8]) {
        return Err(ImageError::Decode("missing JPEG SOI marker".to_string()));
    }

    let mut offset = 2usize;
    loop {
        // Resynchronize on the next marker byte
        while offset < data.len() && data[offset] != 0xFF {
            offset += 1;
        }
        if offset + 1 >= data.len() {
            return Err(ImageError::Decode(
                "no SOF marker before end of data".to_string(),
            ));
        }
        let marker = data[offset + 1];
        offset += 2;

        match marker {
            // Fill byte: the next byte may itself be the marker
            0xFF => {
                offset -= 1;
                continue;
            }
            // Stuffed bytes and standalone markers carry no segment
            0x00 | 0xD0..=0xD9 => continue,
            // SOF0..SOF15, excluding DHT (C4), JPG (C8) and DAC (CC)
            0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
                // Segment layout: length(2), precision(1), height(2),
                // width(2), components(1)
                let frame = data.get(offset..offset + 8).ok_or_else(|| {
                    ImageError::Decode("truncated SOF segment".to_string())
                })?;
                let height = u32::from(u16::from_be_bytes([frame[3], frame[4]]));
                let width = u32::from(u16::from_be_bytes([frame[5], frame[6]]));
                return Ok((width, height, frame[7]));
            }
            _ => {
                let length = data
                    .get(offset..offset + 2)
                    .map(|b| u16::from_be_bytes([b[0], b[1]]) as usize)
                    .ok_or_else(|| {
                        ImageError::Decode("truncated segment length".to_string())
                    })?;
                offset += length.max(2);
            }
        }
    }
}

/// Split interleaved samples into their color components and the trailing
/// alpha channel.
fn split_alpha(samples: &[u8], stride: usize) -> (Vec<u8>, Vec<u8>) {
    let pixels = samples.len() / stride;
    let mut color = Vec::with_capacity(pixels * (stride - 1));
    let mut alpha = Vec::with_capacity(pixels);
    for pixel in samples.chunks_exact(stride) {
        color.extend_from_slice(&pixel[..stride - 1]);
        alpha.push(pixel[stride - 1]);
    }
    (color, alpha)
}

/// zlib-compress raw samples for FlateDecode.
fn deflate(samples: &[u8]) -> Result<Vec<u8>, ImageError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(samples)
        .map_err(|err| ImageError::Compression(err.to_string()))?;
    encoder
        .finish()
        .map_err(|err| ImageError::Compression(err.to_string()))
}
