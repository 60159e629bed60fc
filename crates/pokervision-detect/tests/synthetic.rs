use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_polygon_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;
use pokervision_detect::{
    find_quads, find_quads_with, warp_card, CardSize, DebugStage, DetectionDiagnostics,
    DetectorProfile, Quad, QuadDetector, QuadDetectorParams, RejectKind,
};
use pokervision_core::{is_convex, min_area_rect};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const FELT: Rgb<u8> = Rgb([20, 90, 40]);

/// 400x400 table with one upright card covering 5% of the frame, aspect 0.70.
fn single_card_frame() -> RgbImage {
    let mut img = RgbImage::from_pixel(400, 400, FELT);
    // 75 x 107 = 8025 px (5.02% of 160000), 75 / 107 = 0.701
    draw_filled_rect_mut(&mut img, Rect::at(150, 140).of_size(75, 107), WHITE);
    img
}

fn rotated_card(img: &mut RgbImage, cx: f32, cy: f32, w: f32, h: f32, angle: f32) {
    let (s, c) = angle.sin_cos();
    let corners = [(-w, -h), (w, -h), (w, h), (-w, h)].map(|(dx, dy)| {
        let (dx, dy) = (dx * 0.5, dy * 0.5);
        Point::new(
            (cx + c * dx - s * dy).round() as i32,
            (cy + s * dx + c * dy).round() as i32,
        )
    });
    draw_polygon_mut(img, &corners, WHITE);
}

fn assert_quad_properties(quads: &[Quad], params: &QuadDetectorParams) {
    for q in quads {
        let ratio = min_area_rect(&q.points)
            .and_then(|r| r.aspect_ratio())
            .expect("accepted quads are non-degenerate");
        assert!(
            params.aspect_min <= ratio && ratio <= params.aspect_max,
            "aspect {ratio} outside [{}, {}]",
            params.aspect_min,
            params.aspect_max
        );
        assert!(is_convex(&q.points));
    }
}

#[test]
fn one_card_yields_exactly_one_quad() {
    let params = QuadDetectorParams::default();
    let quads = find_quads(&single_card_frame(), &params).expect("valid params");
    assert_eq!(quads.len(), 1, "{quads:?}");
    assert_quad_properties(&quads, &params);

    let tl = quads[0].ordered().top_left;
    assert!((tl.x - 150.0).abs() < 6.0 && (tl.y - 140.0).abs() < 6.0, "{tl:?}");
}

#[test]
fn thin_outlined_card_survives_edge_smoothing() {
    let mut img = RgbImage::from_pixel(400, 400, FELT);
    draw_hollow_rect_mut(&mut img, Rect::at(150, 140).of_size(75, 107), WHITE);

    let params = QuadDetectorParams::default();
    let mut diag = DetectionDiagnostics::new();
    let quads = find_quads_with(&img, &params, &mut diag).expect("valid params");
    let edge_px = diag
        .image(DebugStage::Edges)
        .map(|e| e.pixels().filter(|p| p.0[0] > 0).count())
        .unwrap_or(0);
    assert!(edge_px > 0, "outline produced no edges");
    assert_eq!(quads.len(), 1, "{quads:?} {:?}", diag.counts());
    assert_quad_properties(&quads, &params);
}

#[test]
fn tight_profile_also_finds_the_card() {
    let params = DetectorProfile::Tight.params();
    let quads = find_quads(&single_card_frame(), &params).expect("valid params");
    assert_eq!(quads.len(), 1);
    assert_quad_properties(&quads, &params);
}

#[test]
fn square_and_speck_are_rejected_with_reasons() {
    let mut img = RgbImage::from_pixel(400, 400, FELT);
    draw_filled_rect_mut(&mut img, Rect::at(40, 40).of_size(100, 100), WHITE);
    draw_filled_rect_mut(&mut img, Rect::at(300, 300).of_size(5, 5), WHITE);

    let mut diag = DetectionDiagnostics::new();
    let quads = find_quads_with(&img, &QuadDetectorParams::default(), &mut diag).expect("params");
    assert!(quads.is_empty(), "{quads:?}");

    let counts = diag.counts();
    assert!(counts.get(&RejectKind::AspectRatio).copied().unwrap_or(0) >= 1, "{counts:?}");
    assert!(counts.get(&RejectKind::TooSmall).copied().unwrap_or(0) >= 1, "{counts:?}");
    assert_eq!(diag.rejections.len(), diag.contours);
    for stage in DebugStage::ALL {
        assert_eq!(diag.image(stage).map(|i| i.dimensions()), Some((400, 400)));
    }
}

#[test]
fn two_tilted_cards_are_found_and_rectified() {
    let mut img = RgbImage::from_pixel(480, 360, FELT);
    rotated_card(&mut img, 130.0, 170.0, 84.0, 120.0, 0.35);
    rotated_card(&mut img, 340.0, 180.0, 84.0, 120.0, -0.2);

    let params = QuadDetectorParams::default();
    let detector = QuadDetector::new(params.clone()).expect("valid");
    let quads = detector.detect(&img);
    assert_eq!(quads.len(), 2, "{quads:?}");
    assert_quad_properties(&quads, &params);

    for q in &quads {
        let card = warp_card(&img, q, CardSize::default()).expect("rectify");
        assert_eq!(card.image.dimensions(), (200, 300));
        // Card centre is white after rectification.
        assert_eq!(*card.image.get_pixel(100, 150), WHITE);
    }
}

#[test]
fn blank_frame_has_no_quads() {
    let img = RgbImage::from_pixel(200, 150, FELT);
    let mut diag = DetectionDiagnostics::new();
    let quads = find_quads_with(&img, &QuadDetectorParams::default(), &mut diag).expect("params");
    assert!(quads.is_empty());
    assert_eq!(diag.contours, 0);
}

#[test]
fn invalid_params_fail_before_detection() {
    let params = QuadDetectorParams {
        aspect_min: 0.9,
        aspect_max: 0.5,
        ..QuadDetectorParams::default()
    };
    assert!(find_quads(&single_card_frame(), &params).is_err());
    assert!(QuadDetector::new(params).is_err());
}
