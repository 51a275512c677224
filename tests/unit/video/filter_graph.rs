use std::path::Path;

use super::*;
use crate::layer::model::{Layer, ProcessingJob};
use crate::raster::rasterizer::RasterOpts;
use crate::raster::svg::FontOpts;

fn rasterizer() -> Rasterizer {
    Rasterizer::new(&RasterOpts {
        fonts: FontOpts {
            load_system_fonts: false,
            ..FontOpts::default()
        },
        ..RasterOpts::default()
    })
    .unwrap()
}

fn write_logo(dir: &Path) -> PathBuf {
    let path = dir.join("logo.png");
    image::RgbaImage::from_pixel(8, 4, image::Rgba([255, 255, 255, 255]))
        .save(&path)
        .unwrap();
    path
}

fn canvas() -> Canvas {
    Canvas::new(320, 240).unwrap()
}

#[test]
fn empty_job_builds_empty_graph() {
    let dir = tempfile::tempdir().unwrap();
    let job = ProcessingJob::new("in.mp4", vec![]);
    let mut temps = TempArtifacts::new(Some(dir.path()));
    let graph = build_filter_graph(
        &job.resolve(canvas()),
        LayerOrder::TypePriority,
        &rasterizer(),
        &mut temps,
    )
    .unwrap();
    assert!(graph.is_empty());
    assert!(graph.output_label.is_none());
    assert!(temps.paths().is_empty());
}

#[test]
fn logo_stage_scales_fades_and_centers() {
    let dir = tempfile::tempdir().unwrap();
    let logo = write_logo(dir.path());
    let job = ProcessingJob::new(
        "in.mp4",
        vec![
            Layer::logo(&logo)
                .with_size_pct(10.0)
                .with_opacity_pct(30.0)
                .with_anchor(25.0, 75.0),
        ],
    );
    let mut temps = TempArtifacts::new(Some(dir.path()));
    let graph = build_filter_graph(
        &job.resolve(canvas()),
        LayerOrder::TypePriority,
        &rasterizer(),
        &mut temps,
    )
    .unwrap();

    assert_eq!(graph.inputs, vec![logo]);
    assert_eq!(
        graph.chains,
        vec![
            "[1:v]scale=32:-1,format=rgba,colorchannelmixer=aa=0.3[logo1]".to_owned(),
            "[0:v][logo1]overlay=x=(W*0.25)-(w/2):y=(H*0.75)-(h/2)[v1]".to_owned(),
        ]
    );
    assert_eq!(graph.output_label.as_deref(), Some("v1"));
    // Logos go to ffmpeg as-is; nothing rasterized.
    assert!(temps.paths().is_empty());
}

#[test]
fn layers_stack_by_type_priority() {
    let dir = tempfile::tempdir().unwrap();
    let logo = write_logo(dir.path());
    let job = ProcessingJob::new(
        "in.mp4",
        vec![
            Layer::logo(&logo),
            Layer::text("A"),
            Layer::tiled_text("B"),
            Layer::text("C"),
        ],
    );
    let mut temps = TempArtifacts::new(Some(dir.path()));
    let graph = build_filter_graph(
        &job.resolve(canvas()),
        LayerOrder::TypePriority,
        &rasterizer(),
        &mut temps,
    )
    .unwrap();

    // tiled B, text A, text C, logo.
    assert_eq!(graph.inputs.len(), 4);
    assert_eq!(graph.inputs[3], logo);
    let names: Vec<String> = graph.inputs[..3]
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert!(names[0].ends_with("-0-tiled-text.png"), "{names:?}");
    assert!(names[1].ends_with("-1-text.png"), "{names:?}");
    assert!(names[2].ends_with("-2-text.png"), "{names:?}");

    assert_eq!(graph.chains[0], "[0:v][1:v]overlay=0:0[v1]");
    assert_eq!(graph.chains[1], "[v1][2:v]overlay=0:0[v2]");
    assert_eq!(graph.chains[2], "[v2][3:v]overlay=0:0[v3]");
    assert!(graph.chains[4].starts_with("[v3][logo4]overlay="));
    assert_eq!(graph.output_label.as_deref(), Some("v4"));
    assert_eq!(graph.filter_complex().matches(';').count(), 4);
}

#[test]
fn input_order_keeps_job_order() {
    let dir = tempfile::tempdir().unwrap();
    let logo = write_logo(dir.path());
    let job = ProcessingJob::new("in.mp4", vec![Layer::logo(&logo), Layer::tiled_text("B")]);
    let mut temps = TempArtifacts::new(Some(dir.path()));
    let graph = build_filter_graph(
        &job.resolve(canvas()),
        LayerOrder::Input,
        &rasterizer(),
        &mut temps,
    )
    .unwrap();

    assert_eq!(graph.inputs[0], logo);
    assert!(graph.chains[1].starts_with("[0:v][logo1]overlay="));
    assert_eq!(graph.chains[2], "[v1][2:v]overlay=0:0[v2]");
}

#[test]
fn rasterized_layers_are_canvas_sized_pngs() {
    let dir = tempfile::tempdir().unwrap();
    let logo = write_logo(dir.path());
    let job = ProcessingJob::new("in.mp4", vec![Layer::tiled_logo(&logo), Layer::text("T")]);
    let mut temps = TempArtifacts::new(Some(dir.path()));
    let graph = build_filter_graph(
        &job.resolve(canvas()),
        LayerOrder::TypePriority,
        &rasterizer(),
        &mut temps,
    )
    .unwrap();

    for path in &graph.inputs {
        let img = image::open(path).unwrap();
        assert_eq!((img.width(), img.height()), (320, 240));
    }
    let paths = temps.paths().to_vec();
    drop(temps);
    assert!(paths.iter().all(|p| !p.exists()));
}

#[test]
fn undecodable_logo_aborts_the_graph() {
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken.png");
    std::fs::write(&broken, b"nope").unwrap();
    let job = ProcessingJob::new("in.mp4", vec![Layer::tiled_text("A"), Layer::logo(&broken)]);
    let mut temps = TempArtifacts::new(Some(dir.path()));

    let err = build_filter_graph(
        &job.resolve(canvas()),
        LayerOrder::TypePriority,
        &rasterizer(),
        &mut temps,
    )
    .unwrap_err();
    assert!(matches!(err, crate::OvermarkError::Asset(_)), "{err}");
}

#[test]
fn positioned_rasters_are_flattened_onto_the_canvas() {
    let small = PremulImage::from_premul(2, 2, vec![255; 16]).unwrap();
    let flat = flatten_to_canvas(
        RasterizedLayer::Positioned {
            image: small,
            top_left: PixelPoint::new(3, 1),
        },
        Canvas::new(6, 4).unwrap(),
    );
    assert_eq!((flat.width, flat.height), (6, 4));
    assert_eq!(flat.pixel(3, 1), [255; 4]);
    assert_eq!(flat.pixel(4, 2), [255; 4]);
    assert_eq!(flat.pixel(0, 0), [0; 4]);
}
