//! Output assembly: encoded page images → a single PDF.
//!
//! Each transformed page becomes one output page containing a single image
//! XObject drawn over the full page area. The encoded data goes into the PDF
//! stream as-is (the transform stage already produced valid FlateDecode or
//! DCTDecode payloads), so assembly is pure structure-building, no pixel
//! work.
//!
//! Page geometry: a page rendered at `dpi` is sized back to
//! `pixels × 72 / dpi` points, so the output page has the same physical
//! dimensions as the source page.

use crate::error::PdfMonoError;
use crate::pipeline::transform::{EncodedPage, PageEncoding};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tracing::debug;

/// Build a PDF from transformed pages, in the order given.
///
/// Fails with [`PdfMonoError::AssemblyFailed`] when `pages` is empty — the
/// caller reports that as the job's `Failed` status rather than writing a
/// zero-page document.
pub fn assemble(pages: &[EncodedPage]) -> Result<Vec<u8>, PdfMonoError> {
    if pages.is_empty() {
        return Err(PdfMonoError::AssemblyFailed {
            detail: "no pages survived rendering and transformation".to_string(),
        });
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());

    for page in pages {
        let image_id = doc.add_object(image_stream(page));

        let width_pt = page.width as f32 * 72.0 / page.dpi as f32;
        let height_pt = page.height as f32 * 72.0 / page.dpi as f32;

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        width_pt.into(),
                        0.into(),
                        0.into(),
                        height_pt.into(),
                        0.into(),
                        0.into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_bytes = content
            .encode()
            .map_err(|e| PdfMonoError::AssemblyFailed {
                detail: format!("content stream: {e}"),
            })?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content_bytes));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width_pt.into(), height_pt.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => image_id },
            },
        });
        kids.push(page_id.into());
    }

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

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| PdfMonoError::AssemblyFailed {
            detail: format!("serialise: {e}"),
        })?;

    debug!("Assembled {} pages → {} bytes", pages.len(), bytes.len());
    Ok(bytes)
}

/// Build the image XObject stream for one encoded page.
///
/// The data is already encoded, so compression by lopdf must stay off or the
/// Filter entry would no longer match the stream contents.
fn image_stream(page: &EncodedPage) -> Stream {
    let (bits, filter) = match page.encoding {
        PageEncoding::Bilevel => (1, "FlateDecode"),
        PageEncoding::Jpeg => (8, "DCTDecode"),
    };
    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => page.width as i64,
        "Height" => page.height as i64,
        "ColorSpace" => "DeviceGray",
        "BitsPerComponent" => bits as i64,
        "Filter" => filter,
    };
    Stream::new(dict, page.data.clone()).with_compression(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(index: usize, encoding: PageEncoding) -> EncodedPage {
        EncodedPage {
            index,
            width: 100,
            height: 150,
            dpi: 72,
            encoding,
            data: vec![0xAB; 32],
        }
    }

    #[test]
    fn empty_sequence_fails() {
        let err = assemble(&[]).unwrap_err();
        assert!(matches!(err, PdfMonoError::AssemblyFailed { .. }));
        assert!(err.to_string().contains("no pages survived"));
    }

    #[test]
    fn output_parses_with_one_page_per_image() {
        let pages = vec![
            encoded(0, PageEncoding::Bilevel),
            encoded(2, PageEncoding::Jpeg),
        ];
        let bytes = assemble(&pages).unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        let doc = Document::load_mem(&bytes).expect("output must be a parseable PDF");
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn page_dimensions_follow_dpi() {
        // 300 px at 300 DPI is one inch = 72 points.
        let page = EncodedPage {
            index: 0,
            width: 300,
            height: 600,
            dpi: 300,
            encoding: PageEncoding::Bilevel,
            data: vec![0; 8],
        };
        let bytes = assemble(&[page]).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        let page_dict = doc.get_dictionary(page_id).unwrap();
        let media_box = page_dict.get(b"MediaBox").unwrap().as_array().unwrap();
        let w = media_box[2].as_float().unwrap();
        let h = media_box[3].as_float().unwrap();
        assert!((w - 72.0).abs() < 0.01, "width was {w}");
        assert!((h - 144.0).abs() < 0.01, "height was {h}");
    }

    #[test]
    fn bilevel_stream_keeps_flate_filter() {
        let bytes = assemble(&[encoded(0, PageEncoding::Bilevel)]).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let has_flate = doc.objects.values().any(|obj| {
            obj.as_stream()
                .map(|s| {
                    s.dict
                        .get(b"Filter")
                        .and_then(|f| f.as_name())
                        .map(|n| n == b"FlateDecode")
                        .unwrap_or(false)
                })
                .unwrap_or(false)
        });
        assert!(has_flate);
    }
}
