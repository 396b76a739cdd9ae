//! Integration tests for PDF assembly.
//!
//! Exercises the full path from rasterized pages (data URIs) to the final
//! document: ordering, naming, error preconditions, and the embedded object
//! structure of the serialized PDF.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use travelbook::{assemble, Error, RenderedPage};

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([40, 90, 160]));
    let mut buf = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageOutputFormat::Png)
        .unwrap();
    buf.into_inner()
}

fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([160, 90, 40]));
    let mut buf = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageOutputFormat::Jpeg(85))
        .unwrap();
    buf.into_inner()
}

fn page(page_id: &str, page_number: u32, image_data: String) -> RenderedPage {
    RenderedPage {
        page_id: page_id.to_string(),
        page_number,
        width: 794,
        height: 1123,
        image_data,
    }
}

fn png_page(page_id: &str, page_number: u32) -> RenderedPage {
    page(
        page_id,
        page_number,
        format!("data:image/png;base64,{}", BASE64.encode(png_bytes(8, 6))),
    )
}

fn jpeg_page(page_id: &str, page_number: u32) -> RenderedPage {
    page(
        page_id,
        page_number,
        format!("data:image/jpeg;base64,{}", BASE64.encode(jpeg_bytes(8, 6))),
    )
}

#[test]
fn assemble_sorts_pages_regardless_of_input_order() {
    let result = assemble(&[png_page("second", 2), png_page("first", 1)], "my_export").unwrap();

    assert_eq!(result.filename, "my_export.pdf");
    assert_eq!(result.pages_count, 2);
    assert_eq!(result.rendered_pages[0].page_number, 1);
    assert_eq!(result.rendered_pages[0].page_id, "first");
    assert_eq!(result.rendered_pages[1].page_number, 2);
}

#[test]
fn assemble_rejects_empty_input() {
    let err = assemble(&[], "empty").unwrap_err();
    assert!(matches!(err, Error::NoPages));
    assert!(err.to_string().contains("no pages"));
}

#[test]
fn size_equals_blob_byte_length() {
    let result = assemble(&[png_page("p", 1), jpeg_page("q", 2)], "x").unwrap();
    assert_eq!(result.size, result.blob.len());
}

#[test]
fn filename_extension_is_never_doubled() {
    let pages = [png_page("p", 1)];
    assert_eq!(assemble(&pages, "trip").unwrap().filename, "trip.pdf");
    assert_eq!(assemble(&pages, "trip.pdf").unwrap().filename, "trip.pdf");
    assert_eq!(assemble(&pages, "trip.PDF").unwrap().filename, "trip.PDF");
}

#[test]
fn document_has_pdf_structure() {
    let result = assemble(&[png_page("p1", 1), jpeg_page("p2", 2)], "trip").unwrap();
    let content = String::from_utf8_lossy(&result.blob);

    assert!(content.starts_with("%PDF-1.7"));
    assert!(content.ends_with("%%EOF"));
    assert!(content.contains("/Type /Catalog"));
    assert!(content.contains("/Count 2"));
    assert!(content.contains("xref"));
    assert!(content.contains("trailer"));
    assert!(content.contains("startxref"));

    // One media box per page, sized to the page's pixel dimensions
    assert_eq!(content.matches("[0 0 794 1123]").count(), 2);

    // PNG pages embed as FlateDecode, JPEG pages pass through as DCTDecode
    assert!(content.contains("/Filter /FlateDecode"));
    assert!(content.contains("/Filter /DCTDecode"));
}

#[test]
fn pages_embed_in_sorted_order() {
    // Three pages supplied shuffled; content streams reference Im1..Im3 in
    // sorted page order
    let result = assemble(
        &[png_page("c", 30), png_page("a", 10), png_page("b", 20)],
        "ordered",
    )
    .unwrap();
    let content = String::from_utf8_lossy(&result.blob);

    let im1 = content.find("/Im1 Do").unwrap();
    let im2 = content.find("/Im2 Do").unwrap();
    let im3 = content.find("/Im3 Do").unwrap();
    assert!(im1 < im2 && im2 < im3);

    let ids: Vec<&str> = result
        .rendered_pages
        .iter()
        .map(|p| p.page_id.as_str())
        .collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[test]
fn webp_mime_is_fatal_for_the_whole_export() {
    let bad = page(
        "webp-page",
        2,
        format!("data:image/webp;base64,{}", BASE64.encode(b"RIFFxxxx")),
    );
    let err = assemble(&[png_page("ok", 1), bad], "trip").unwrap_err();
    match err {
        Error::UnsupportedImageFormat { page_id, mime } => {
            assert_eq!(page_id, "webp-page");
            assert_eq!(mime, "image/webp");
        }
        other => panic!("expected UnsupportedImageFormat, got {:?}", other),
    }
}

#[test]
fn corrupt_payload_is_fatal_not_partial() {
    let bad = page(
        "corrupt",
        2,
        format!("data:image/png;base64,{}", BASE64.encode(b"not a png")),
    );
    let err = assemble(&[png_page("ok", 1), bad], "trip").unwrap_err();
    assert!(matches!(err, Error::ImageDecode { .. }));
}

#[test]
fn plain_url_is_rejected_as_data_uri() {
    let bad = page("url", 1, "https://maps.example.com/snapshot.png".to_string());
    let err = assemble(&[bad], "trip").unwrap_err();
    assert!(matches!(err, Error::InvalidDataUri { .. }));
}

#[test]
fn artifact_round_trips_through_disk() {
    // The (blob, filename, size) triple is what a download action writes out
    let result = assemble(&[png_page("p", 1)], "trip").unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(&result.filename);
    std::fs::write(&path, &result.blob).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), result.size);
    assert!(bytes.starts_with(b"%PDF-"));
}

#[test]
fn determinism_of_ordering_and_count() {
    let forward = assemble(&[png_page("a", 1), png_page("b", 2)], "t").unwrap();
    let backward = assemble(&[png_page("b", 2), png_page("a", 1)], "t").unwrap();

    assert_eq!(forward.pages_count, backward.pages_count);
    let forward_ids: Vec<_> = forward.rendered_pages.iter().map(|p| &p.page_id).collect();
    let backward_ids: Vec<_> = backward.rendered_pages.iter().map(|p| &p.page_id).collect();
    assert_eq!(forward_ids, backward_ids);
}
