use image::{Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use pokervision_core::Quad;

/// Outline color of accepted quads in debug overlays.
pub const OVERLAY_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Copy of `image` with every quad outlined (2 px) in [`OVERLAY_COLOR`].
pub fn draw_quads(image: &RgbImage, quads: &[Quad]) -> RgbImage {
    let mut canvas = image.clone();
    for quad in quads {
        let pts = quad.points;
        for i in 0..pts.len() {
            let a = pts[i];
            let b = pts[(i + 1) % pts.len()];
            for (dx, dy) in [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)] {
                draw_line_segment_mut(
                    &mut canvas,
                    (a.x + dx, a.y + dy),
                    (b.x + dx, b.y + dy),
                    OVERLAY_COLOR,
                );
            }
        }
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;

    #[test]
    fn outline_is_drawn_on_a_copy() {
        let frame = RgbImage::new(40, 40);
        let quad = Quad::new([
            Point2::new(5.0, 5.0),
            Point2::new(30.0, 5.0),
            Point2::new(30.0, 35.0),
            Point2::new(5.0, 35.0),
        ]);
        let overlay = draw_quads(&frame, &[quad]);
        assert_eq!(*overlay.get_pixel(15, 5), OVERLAY_COLOR);
        assert_eq!(*overlay.get_pixel(30, 20), OVERLAY_COLOR);
        assert_eq!(*overlay.get_pixel(15, 20), Rgb([0, 0, 0]));
        assert_eq!(*frame.get_pixel(15, 5), Rgb([0, 0, 0]));
    }
}
