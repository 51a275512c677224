use super::*;
use crate::layer::model::Layer;
use crate::raster::svg::FontOpts;

fn opts() -> EngineOpts {
    EngineOpts {
        raster: RasterOpts {
            fonts: FontOpts {
                load_system_fonts: false,
                ..FontOpts::default()
            },
            ..RasterOpts::default()
        },
        ..EngineOpts::default()
    }
}

#[test]
fn media_kind_by_extension() {
    for name in ["a.jpg", "a.JPEG", "b.png", "c.webp"] {
        assert_eq!(MediaKind::from_path(Path::new(name)).unwrap(), MediaKind::Image);
    }
    for name in ["a.mp4", "a.MOV", "b.avi", "c.mkv"] {
        assert_eq!(MediaKind::from_path(Path::new(name)).unwrap(), MediaKind::Video);
    }
    for name in ["a.gif", "noext", "a.txt"] {
        let err = MediaKind::from_path(Path::new(name)).unwrap_err();
        assert!(err.to_string().contains("unsupported file type"), "{err}");
    }
}

#[test]
fn output_name_keeps_stem_and_extension() {
    let out = output_path_for(Path::new("/up/holiday.JPG"), Path::new("/results"));
    assert_eq!(out.parent(), Some(Path::new("/results")));
    assert_eq!(out.extension().unwrap(), "JPG");
    let name = out.file_stem().unwrap().to_string_lossy().into_owned();
    let rest = name.strip_prefix("holiday_").unwrap();
    let (millis, id) = rest.split_once('-').unwrap();
    assert!(millis.parse::<u128>().is_ok());
    assert_eq!(id.len(), 8);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn output_names_do_not_collide() {
    let a = output_path_for(Path::new("x.png"), Path::new("out"));
    let b = output_path_for(Path::new("x.png"), Path::new("out"));
    assert_ne!(a, b);
}

#[test]
fn image_job_lands_in_out_dir() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("photo.png");
    image::RgbaImage::from_pixel(16, 16, image::Rgba([0, 0, 0, 255]))
        .save(&src)
        .unwrap();
    let out_dir = dir.path().join("results");

    let out = process_job(&ProcessingJob::new(&src, vec![]), &out_dir, &opts()).unwrap();
    assert!(out.starts_with(&out_dir));
    assert!(out.exists());
    assert_eq!(std::fs::read(&out).unwrap(), std::fs::read(&src).unwrap());
}

#[test]
fn unsupported_source_is_rejected_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("doc.txt");
    std::fs::write(&src, b"hi").unwrap();
    let out_dir = dir.path().join("results");

    let err = process_job(&ProcessingJob::new(&src, vec![]), &out_dir, &opts()).unwrap_err();
    assert!(matches!(err, OvermarkError::Validation(_)));
    assert!(!out_dir.exists());
}

#[test]
fn invalid_layer_is_rejected_before_any_work() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("photo.png");
    image::RgbaImage::from_pixel(4, 4, image::Rgba([0, 0, 0, 255]))
        .save(&src)
        .unwrap();
    let mut logo = Layer::logo("x.png");
    logo.asset_path = None;

    let engine = Engine::new(&opts()).unwrap();
    let err = engine
        .process(&ProcessingJob::new(&src, vec![logo]), dir.path())
        .unwrap_err();
    assert!(matches!(err, OvermarkError::Validation(_)));
    let entries = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(entries, 1);
}
