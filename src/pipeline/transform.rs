//! Image transformation: rasterised page → encoded page image.
//!
//! Black-and-white mode thresholds the luma channel into a pure bi-level
//! image and stores it losslessly: 1 bit per pixel, rows padded to a byte
//! boundary, zlib-compressed. That matches how the assembler embeds it in
//! the output PDF (a FlateDecode DeviceGray 1-bit image stream), so no
//! second encoding step is needed.
//!
//! Grayscale mode keeps 8 bits per pixel and trades fidelity for size
//! through JPEG at the configured quality.

use crate::config::{ColorMode, ConversionConfig};
use crate::error::PageError;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::io::Write;
use tracing::debug;

/// How the pixel data of an [`EncodedPage`] is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEncoding {
    /// 1 bit per pixel, MSB first, rows byte-padded, zlib-compressed.
    /// In PDF terms: DeviceGray, BitsPerComponent 1, FlateDecode.
    Bilevel,
    /// Baseline JPEG, 8-bit grayscale.
    /// In PDF terms: DeviceGray, BitsPerComponent 8, DCTDecode.
    Jpeg,
}

/// One transformed page, ready for the assembler.
#[derive(Debug, Clone)]
pub struct EncodedPage {
    /// Zero-based page index in the source document.
    pub index: usize,
    /// Pixel dimensions of the rasterised page.
    pub width: u32,
    pub height: u32,
    /// DPI the page was rendered at; the assembler uses it to size the
    /// output page back to the original point dimensions.
    pub dpi: u32,
    pub encoding: PageEncoding,
    /// Encoded pixel data (zlib stream or JPEG file).
    pub data: Vec<u8>,
}

/// Transform a rasterised page according to the configured colour mode.
pub fn transform(
    image: &DynamicImage,
    index: usize,
    config: &ConversionConfig,
) -> Result<EncodedPage, PageError> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(PageError::TransformFailed {
            page: index + 1,
            detail: format!("degenerate buffer {width}x{height}"),
        });
    }

    let gray = image.to_luma8();
    let (encoding, data) = match config.mode {
        ColorMode::BlackWhite => {
            let packed = pack_bilevel(gray.as_raw(), width, height, config.threshold);
            let compressed = deflate(&packed).map_err(|e| PageError::TransformFailed {
                page: index + 1,
                detail: format!("zlib: {e}"),
            })?;
            (PageEncoding::Bilevel, compressed)
        }
        ColorMode::Grayscale => {
            let mut buf = Vec::new();
            JpegEncoder::new_with_quality(&mut buf, config.jpeg_quality)
                .encode(gray.as_raw(), width, height, image::ExtendedColorType::L8)
                .map_err(|e| PageError::TransformFailed {
                    page: index + 1,
                    detail: format!("jpeg: {e}"),
                })?;
            (PageEncoding::Jpeg, buf)
        }
    };

    debug!(
        "Transformed page {} → {:?}, {} bytes",
        index + 1,
        encoding,
        data.len()
    );

    Ok(EncodedPage {
        index,
        width,
        height,
        dpi: config.dpi,
        encoding,
        data,
    })
}

/// Threshold 8-bit luma into packed 1-bit rows.
///
/// Pixels with intensity below `threshold` map to black (bit 0), the rest to
/// white (bit 1), matching the DeviceGray convention. Bits are MSB-first and
/// each row is padded to a whole byte.
fn pack_bilevel(luma: &[u8], width: u32, height: u32, threshold: u8) -> Vec<u8> {
    let row_bytes = ((width as usize) + 7) / 8;
    let mut packed = vec![0u8; row_bytes * height as usize];

    for y in 0..height as usize {
        let row = &luma[y * width as usize..(y + 1) * width as usize];
        let out = &mut packed[y * row_bytes..(y + 1) * row_bytes];
        for (x, &intensity) in row.iter().enumerate() {
            if intensity >= threshold {
                out[x / 8] |= 0x80 >> (x % 8);
            }
        }
    }
    packed
}

fn deflate(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversionConfig;
    use flate2::read::ZlibDecoder;
    use image::{GrayImage, Luma};
    use std::io::Read;

    fn bw_config(threshold: u8) -> ConversionConfig {
        ConversionConfig::builder()
            .mode(ColorMode::BlackWhite)
            .threshold(threshold)
            .build()
            .unwrap()
    }

    fn unpack(page: &EncodedPage) -> Vec<u8> {
        let mut raw = Vec::new();
        ZlibDecoder::new(page.data.as_slice())
            .read_to_end(&mut raw)
            .unwrap();
        raw
    }

    #[test]
    fn all_white_page_stays_white_at_any_positive_threshold() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(16, 4, Luma([255u8])));
        for threshold in [1, 128, 254] {
            let page = transform(&img, 0, &bw_config(threshold)).unwrap();
            assert_eq!(page.encoding, PageEncoding::Bilevel);
            // All bits set → every byte 0xFF (width 16 = exactly 2 bytes/row).
            assert!(unpack(&page).iter().all(|&b| b == 0xFF));
        }
    }

    #[test]
    fn max_threshold_blackens_everything_below_pure_white() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 2, Luma([254u8])));
        let page = transform(&img, 0, &bw_config(255)).unwrap();
        assert!(unpack(&page).iter().all(|&b| b == 0x00));
    }

    #[test]
    fn threshold_zero_is_all_white() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 2, Luma([0u8])));
        let page = transform(&img, 0, &bw_config(0)).unwrap();
        assert!(unpack(&page).iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn rows_are_byte_padded_for_odd_widths() {
        // 10 px wide → 2 bytes per row, last 6 bits of each row unused.
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(10, 3, Luma([255u8])));
        let page = transform(&img, 0, &bw_config(128)).unwrap();
        let raw = unpack(&page);
        assert_eq!(raw.len(), 2 * 3);
        assert_eq!(raw[0], 0xFF);
        assert_eq!(raw[1] & 0b1100_0000, 0b1100_0000);
    }

    #[test]
    fn mixed_pixels_split_at_threshold() {
        let mut img = GrayImage::from_pixel(8, 1, Luma([200u8]));
        img.put_pixel(0, 0, Luma([10u8]));
        let page = transform(&DynamicImage::ImageLuma8(img), 0, &bw_config(128)).unwrap();
        // First pixel black (bit clear), the other seven white.
        assert_eq!(unpack(&page), vec![0b0111_1111]);
    }

    #[test]
    fn grayscale_mode_produces_jpeg() {
        let config = ConversionConfig::builder()
            .mode(ColorMode::Grayscale)
            .jpeg_quality(80)
            .build()
            .unwrap();
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(20, 20, Luma([128u8])));
        let page = transform(&img, 2, &config).unwrap();
        assert_eq!(page.encoding, PageEncoding::Jpeg);
        assert_eq!(page.index, 2);
        // JPEG SOI marker.
        assert_eq!(&page.data[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn higher_quality_is_not_smaller() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_fn(64, 64, |x, y| {
            Luma([((x * 4 + y) % 256) as u8])
        }));
        let low = transform(
            &img,
            0,
            &ConversionConfig::builder()
                .mode(ColorMode::Grayscale)
                .jpeg_quality(10)
                .build()
                .unwrap(),
        )
        .unwrap();
        let high = transform(
            &img,
            0,
            &ConversionConfig::builder()
                .mode(ColorMode::Grayscale)
                .jpeg_quality(95)
                .build()
                .unwrap(),
        )
        .unwrap();
        assert!(high.data.len() >= low.data.len());
    }
}
