use base64::{engine::general_purpose, Engine as _};
use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use lumen::{Configuration, Error, Service};

fn service(dir: &tempfile::TempDir) -> Service {
    let config = Configuration {
        image_dir: dir.path().to_owned(),
        model_dir: dir.path().join("models"),
        ..Default::default()
    };
    Service::with_model_classifier(config)
}

#[test]
fn solid_black_image_fills_bucket_zero() {
    let dir = tempfile::tempdir().unwrap();
    GrayImage::from_pixel(100, 100, Luma([0])).save(dir.path().join("black.png")).unwrap();

    let report = service(&dir).histogram("black.png").unwrap();
    let counts = report.histogram.counts();
    assert_eq!(counts.len(), 256);
    assert_eq!(counts[0], 10_000);
    assert!(counts[1..].iter().all(|&c| c == 0));

    let png = general_purpose::STANDARD.decode(&report.chart_png_base64).unwrap();
    assert_eq!(&png[..4], b"\x89PNG");
}

#[test]
fn counts_sum_to_pixel_count_for_color_images() {
    let dir = tempfile::tempdir().unwrap();
    let img = DynamicImage::ImageRgb8(RgbImage::from_fn(31, 17, |x, y| {
        Rgb([(x * 8) as u8, (y * 15) as u8, ((x * y) % 256) as u8])
    }));
    img.save(dir.path().join("color.png")).unwrap();
    img.save(dir.path().join("color.jpg")).unwrap();

    let svc = service(&dir);
    for id in ["color.png", "color.jpg"] {
        let report = svc.histogram(id).unwrap();
        assert_eq!(report.histogram.total(), 31 * 17, "{}", id);
    }
}

#[test]
fn repeated_requests_give_identical_counts() {
    let dir = tempfile::tempdir().unwrap();
    GrayImage::from_fn(40, 40, |x, y| Luma([((x * 3 + y * 5) % 256) as u8]))
        .save(dir.path().join("ramp.png"))
        .unwrap();

    let svc = service(&dir);
    let first = svc.histogram("ramp.png").unwrap();
    let second = svc.histogram("ramp.png").unwrap();
    assert_eq!(first.histogram, second.histogram);
}

#[test]
fn jpeg_stored_under_png_name_still_counts() {
    let dir = tempfile::tempdir().unwrap();
    let mut jpeg = Vec::new();
    DynamicImage::ImageLuma8(GrayImage::from_pixel(20, 10, Luma([0])))
        .write_to(&mut std::io::Cursor::new(&mut jpeg), ImageFormat::Jpeg)
        .unwrap();
    std::fs::write(dir.path().join("seed.png"), &jpeg).unwrap();

    let report = service(&dir).histogram("seed.png").unwrap();
    assert_eq!(report.histogram.total(), 200);
}

#[test]
fn missing_image_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = service(&dir).histogram("nope.png").unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(err.status_code(), 404);
}

#[test]
fn unreadable_image_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("broken.png"), b"not a png").unwrap();
    let err = service(&dir).histogram("broken.png").unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn path_traversal_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = service(&dir).histogram("../etc/passwd").unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}
