use super::*;

#[test]
fn canvas_rejects_zero_dimensions() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(10, 0).is_err());
    assert_eq!(
        Canvas::new(4, 3).unwrap(),
        Canvas {
            width: 4,
            height: 3
        }
    );
}

#[test]
fn width_pct_px_applies_floor_then_rounds() {
    let c = Canvas::new(1000, 1000).unwrap();
    assert_eq!(c.width_pct_px(10.0, 10), 100);
    assert_eq!(c.width_pct_px(0.5, 10), 10);
    assert_eq!(c.width_pct_px(0.5, 20), 20);

    let c = Canvas::new(333, 10).unwrap();
    // 333 * 5 / 100 = 16.65
    assert_eq!(c.width_pct_px(5.0, 12), 17);
}

#[test]
fn point_at_pct_uses_both_axes() {
    let c = Canvas::new(800, 600).unwrap();
    let p = c.point_at_pct(25.0, 50.0);
    assert_eq!(p, Point::new(200.0, 300.0));
}

#[test]
fn premul_image_round_trips_through_pixmap() {
    let img = PremulImage::from_premul(2, 1, vec![10, 20, 30, 255, 0, 0, 0, 0]).unwrap();
    let pixmap = img.to_pixmap().unwrap();
    let back = PremulImage::from_pixmap(pixmap);
    assert_eq!(back, img);
    assert!(PremulImage::from_premul(2, 2, vec![0; 4]).is_err());
}

#[test]
fn transparent_image_reports_transparent() {
    let img = PremulImage::transparent(3, 2);
    assert_eq!(img.data.len(), 24);
    assert!(img.is_fully_transparent());
    assert_eq!(img.size(), Canvas::new(3, 2).unwrap());
}

#[test]
fn skia_transform_maps_points_like_kurbo() {
    let affine = Affine::rotate_about((-45f64).to_radians(), Point::new(10.0, 20.0))
        * Affine::translate((3.0, 4.0));
    let expected = affine * Point::new(5.0, 7.0);

    let mut pts = [resvg::tiny_skia::Point::from_xy(5.0, 7.0)];
    skia_transform(affine).map_points(&mut pts);
    assert!((f64::from(pts[0].x) - expected.x).abs() < 1e-3);
    assert!((f64::from(pts[0].y) - expected.y).abs() < 1e-3);
}

#[test]
fn svg_matrix_lists_six_coefficients() {
    let m = svg_matrix(Affine::translate((2.0, 3.0)));
    assert_eq!(m, "matrix(1 0 0 1 2 3)");
}
