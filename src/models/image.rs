use std::fmt;

/// Image encodings recognized by their leading signature bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
    Bmp,
}

impl ImageFormat {
    /// Sniff the format from the first bytes of an encoded image.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

        if bytes.starts_with(PNG) {
            Some(Self::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(Self::Webp)
        } else if bytes.len() >= 14 && bytes.starts_with(b"BM") {
            Some(Self::Bmp)
        } else {
            None
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Webp => "webp",
            Self::Bmp => "bmp",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::Gif => "GIF",
            Self::Webp => "WebP",
            Self::Bmp => "BMP",
        };
        f.write_str(name)
    }
}

/// An encoded cat picture revealed for the current fact.
///
/// Only constructed from bytes that carry a known image signature, so holding
/// a `CatImage` means the payload at least looks like a decodable image.
#[derive(Clone, PartialEq, Eq)]
pub struct CatImage {
    bytes: Vec<u8>,
    format: ImageFormat,
}

impl CatImage {
    /// Wrap raw bytes, returning `None` if they do not form a known image.
    pub fn from_bytes(bytes: Vec<u8>) -> Option<Self> {
        let format = ImageFormat::detect(&bytes)?;
        Some(Self { bytes, format })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Keep image payloads out of debug logs.
impl fmt::Debug for CatImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatImage")
            .field("format", &self.format)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_common_signatures() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
        assert_eq!(ImageFormat::detect(&png), Some(ImageFormat::Png));
        assert_eq!(
            ImageFormat::detect(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::detect(b"GIF89a....."), Some(ImageFormat::Gif));
        assert_eq!(
            ImageFormat::detect(b"RIFF\x10\x00\x00\x00WEBPVP8 "),
            Some(ImageFormat::Webp)
        );
    }

    #[test]
    fn rejects_non_images() {
        assert!(CatImage::from_bytes(Vec::new()).is_none());
        assert!(CatImage::from_bytes(b"<html>not a cat</html>".to_vec()).is_none());
        assert!(CatImage::from_bytes(b"RIFF\x10\x00\x00\x00WAVE".to_vec()).is_none());
    }

    #[test]
    fn keeps_bytes_and_format() {
        let bytes = b"GIF87a-payload".to_vec();
        let image = CatImage::from_bytes(bytes.clone()).unwrap();
        assert_eq!(image.bytes(), bytes.as_slice());
        assert_eq!(image.format(), ImageFormat::Gif);
        assert_eq!(image.format().extension(), "gif");
        assert_eq!(format!("{:?}", image), "CatImage { format: Gif, len: 14 }");
    }
}
