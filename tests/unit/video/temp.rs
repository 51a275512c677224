use super::*;

#[test]
fn layer_images_are_removed_on_drop() {
    let dir = tempfile::tempdir().unwrap();
    let img = PremulImage::transparent(4, 4);

    let written = {
        let mut temps = TempArtifacts::new(Some(dir.path()));
        let a = temps.write_png("tiled-text", &img).unwrap();
        let b = temps.write_png("text", &img).unwrap();
        assert_ne!(a, b);
        assert!(a.exists() && b.exists());
        assert_eq!(temps.paths().len(), 2);
        vec![a, b]
    };

    assert!(written.iter().all(|p| !p.exists()));
}

#[test]
fn names_differ_between_jobs() {
    let dir = tempfile::tempdir().unwrap();
    let img = PremulImage::transparent(1, 1);
    let mut a = TempArtifacts::new(Some(dir.path()));
    let mut b = TempArtifacts::new(Some(dir.path()));
    assert_ne!(
        a.write_png("text", &img).unwrap(),
        b.write_png("text", &img).unwrap()
    );
}

#[test]
fn written_png_round_trips_pixels() {
    let dir = tempfile::tempdir().unwrap();
    let img = PremulImage::from_premul(1, 1, vec![128, 0, 0, 128]).unwrap();
    let mut temps = TempArtifacts::new(Some(dir.path()));
    let path = temps.write_png("text", &img).unwrap();

    let px = image::open(&path).unwrap().to_rgba8().get_pixel(0, 0).0;
    assert_eq!(px[3], 128);
    assert!(px[0] >= 254, "{px:?}");
}

#[test]
fn cleanup_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let mut temps = TempArtifacts::new(Some(dir.path()));
    let path = temps
        .write_png("text", &PremulImage::transparent(1, 1))
        .unwrap();
    temps.cleanup();
    temps.cleanup();
    assert!(!path.exists());
    assert!(temps.paths().is_empty());
}

#[test]
fn partial_output_is_hidden_sibling_with_same_extension() {
    let partial = PartialOutput::new(Path::new("/out/clip_1.mp4"));
    let p = partial.path();
    assert_eq!(p.parent(), Some(Path::new("/out")));
    let name = p.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with(".clip_1.partial-"), "{name}");
    assert_eq!(p.extension().unwrap(), "mp4");
}

#[test]
fn uncommitted_partial_is_removed() {
    let dir = tempfile::tempdir().unwrap();
    let final_path = dir.path().join("out.mp4");
    let partial_path = {
        let partial = PartialOutput::new(&final_path);
        std::fs::write(partial.path(), b"half").unwrap();
        partial.path().to_path_buf()
    };
    assert!(!partial_path.exists());
    assert!(!final_path.exists());
}

#[test]
fn committed_partial_moves_into_place() {
    let dir = tempfile::tempdir().unwrap();
    let final_path = dir.path().join("out.mp4");
    let partial = PartialOutput::new(&final_path);
    let partial_path = partial.path().to_path_buf();
    std::fs::write(&partial_path, b"done").unwrap();

    assert_eq!(partial.commit().unwrap(), final_path);
    assert_eq!(std::fs::read(&final_path).unwrap(), b"done");
    assert!(!partial_path.exists());
}
