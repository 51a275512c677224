use super::*;

fn renderer_without_fonts() -> SvgRenderer {
    SvgRenderer::new(&FontOpts {
        load_system_fonts: false,
        ..FontOpts::default()
    })
    .unwrap()
}

#[test]
fn renders_shapes_premultiplied() {
    let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4">
        <rect x="0" y="0" width="2" height="4" fill="#ff0000" fill-opacity="0.5"/>
    </svg>"##;
    let img = renderer_without_fonts().render(svg, 4, 4).unwrap();
    assert_eq!((img.width, img.height), (4, 4));

    let [r, g, b, a] = img.pixel(0, 0);
    assert!((127..=129).contains(&a), "alpha {a}");
    assert_eq!(r, a);
    assert_eq!((g, b), (0, 0));
    assert_eq!(img.pixel(3, 3), [0, 0, 0, 0]);
}

#[test]
fn malformed_svg_is_an_error() {
    assert!(renderer_without_fonts().render("<svg", 4, 4).is_err());
}

#[test]
fn oversized_rasters_are_rejected() {
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="1"/>"#;
    let err = renderer_without_fonts()
        .render(svg, MAX_RASTER_DIM + 1, 1)
        .unwrap_err();
    assert!(err.to_string().contains("too large"));
}

#[test]
fn missing_font_file_is_reported() {
    let err = SvgRenderer::new(&FontOpts {
        load_system_fonts: false,
        font_files: vec![PathBuf::from("/no/such/font.ttf")],
        ..FontOpts::default()
    })
    .unwrap_err();
    assert!(err.to_string().contains("font.ttf"));
}

fn any_font_file() -> Option<PathBuf> {
    let mut dirs = vec![PathBuf::from("/usr/share/fonts"), PathBuf::from("/usr/local/share/fonts")];
    while let Some(dir) = dirs.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                dirs.push(path);
            } else if matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("ttf" | "otf")
            ) {
                return Some(path);
            }
        }
    }
    None
}

#[test]
fn sans_serif_falls_back_to_a_registered_font_file() {
    let Some(font) = any_font_file() else {
        eprintln!("skipping: no font files installed");
        return;
    };
    let renderer = SvgRenderer::new(&FontOpts {
        load_system_fonts: false,
        font_files: vec![font],
        ..FontOpts::default()
    })
    .unwrap();
    assert!(renderer.font_faces() >= 1);
    let sans = renderer.fontdb.query(&usvg::fontdb::Query {
        families: &[usvg::fontdb::Family::SansSerif],
        ..Default::default()
    });
    assert!(sans.is_some());
}

#[test]
fn cropped_render_covers_only_the_content() {
    let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="80">
        <rect x="40" y="30" width="10" height="6" fill="#00ff00"/>
    </svg>"##;
    let canvas = Canvas::new(100, 80).unwrap();
    let (img, top_left) = renderer_without_fonts().render_cropped(svg, canvas).unwrap();

    assert_eq!(top_left, PixelPoint::new(38, 28));
    assert_eq!((img.width, img.height), (14, 10));
    assert_eq!(img.pixel(2, 2), [0, 255, 0, 255]);
    assert_eq!(img.pixel(0, 0), [0, 0, 0, 0]);
}

#[test]
fn cropped_render_is_clipped_to_the_canvas() {
    let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="50" height="50">
        <rect x="-20" y="40" width="40" height="40" fill="#000"/>
    </svg>"##;
    let canvas = Canvas::new(50, 50).unwrap();
    let (img, top_left) = renderer_without_fonts().render_cropped(svg, canvas).unwrap();
    assert_eq!(top_left, PixelPoint::new(0, 38));
    assert_eq!((img.width, img.height), (22, 12));
}

#[test]
fn cropped_render_of_wide_canvas_stays_small() {
    let width = MAX_RASTER_DIM + 16;
    let svg = format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="10">
            <rect x="{x}" y="2" width="8" height="4" fill="#fff"/>
        </svg>"##,
        x = width - 100
    );
    let canvas = Canvas::new(width, 10).unwrap();
    let (img, top_left) = renderer_without_fonts().render_cropped(&svg, canvas).unwrap();
    assert_eq!(top_left.x, width - 102);
    assert_eq!(img.width, 12);
}

#[test]
fn cropped_render_of_nothing_is_empty() {
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="30" height="30"/>"#;
    let canvas = Canvas::new(30, 30).unwrap();
    let (img, top_left) = renderer_without_fonts().render_cropped(svg, canvas).unwrap();
    assert_eq!((img.width, img.height), (0, 0));
    assert_eq!(top_left, PixelPoint::ORIGIN);
}
