use image::RgbImage;
use pokervision_core::{perspective_map, warp_perspective, CardSize, ImageView, OrderedQuad, Quad};

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RectifyError {
    #[error("canonical card size must be at least 2x2 (got {width}x{height})")]
    InvalidSize { width: usize, height: usize },
    #[error("quad is degenerate (collinear or coincident corners)")]
    Degenerate,
    #[error("source image has no pixels")]
    EmptyImage,
}

/// Card image in the canonical frame together with the corners it came from.
#[derive(Clone, Debug)]
pub struct WarpedCard {
    pub image: RgbImage,
    pub source: OrderedQuad,
}

/// Rectify the card bounded by `quad` into a `size.width x size.height` image.
///
/// Corner roles come from [`Quad::ordered`], so the card's top-left lands at
/// the output origin regardless of how the quad was discovered.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(image, quad), fields(width = size.width, height = size.height))
)]
pub fn warp_card(image: &RgbImage, quad: &Quad, size: CardSize) -> Result<WarpedCard, RectifyError> {
    if size.width < 2 || size.height < 2 {
        return Err(RectifyError::InvalidSize {
            width: size.width,
            height: size.height,
        });
    }
    if image.width() == 0 || image.height() == 0 {
        return Err(RectifyError::EmptyImage);
    }

    let source = quad.ordered();
    let h_card_from_img = perspective_map(&source, size).ok_or(RectifyError::Degenerate)?;
    let h_img_from_card = h_card_from_img.inverse().ok_or(RectifyError::Degenerate)?;

    let view = ImageView {
        width: image.width() as usize,
        height: image.height() as usize,
        channels: 3,
        data: image.as_raw(),
    };
    let warped = warp_perspective(&view, &h_img_from_card, size.width, size.height);

    // Buffer length is width * height * 3 by construction.
    let image = RgbImage::from_raw(size.width as u32, size.height as u32, warped.data)
        .ok_or(RectifyError::InvalidSize {
            width: size.width,
            height: size.height,
        })?;
    Ok(WarpedCard { image, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use nalgebra::Point2;

    fn quad(points: [(f32, f32); 4]) -> Quad {
        Quad::new(points.map(|(x, y)| Point2::new(x, y)))
    }

    #[test]
    fn output_always_has_canonical_size() {
        let frame = RgbImage::from_pixel(320, 240, Rgb([10, 20, 30]));
        let size = CardSize::default();
        for q in [
            quad([(10.0, 10.0), (60.0, 12.0), (58.0, 90.0), (8.0, 85.0)]),
            quad([(300.0, 200.0), (150.0, 220.0), (170.0, 20.0), (290.0, 5.0)]),
            quad([(100.0, 100.0), (104.0, 100.0), (104.0, 106.0), (100.0, 106.0)]),
        ] {
            let card = warp_card(&frame, &q, size).expect("valid quad");
            assert_eq!(card.image.dimensions(), (200, 300));
        }
    }

    #[test]
    fn axis_aligned_card_is_copied_upright() {
        let mut frame = RgbImage::from_pixel(100, 100, Rgb([0, 0, 0]));
        // Card region 20..=39 x 10..=39, marked red in its top-left quarter.
        for y in 10..40 {
            for x in 20..40 {
                let red = x < 30 && y < 25;
                frame.put_pixel(x, y, if red { Rgb([255, 0, 0]) } else { Rgb([255, 255, 255]) });
            }
        }
        let q = quad([(39.0, 39.0), (20.0, 10.0), (39.0, 10.0), (20.0, 39.0)]);
        let card = warp_card(&frame, &q, CardSize { width: 20, height: 30 }).expect("warp");
        assert_eq!(card.source.top_left, Point2::new(20.0, 10.0));
        assert_eq!(*card.image.get_pixel(2, 2), Rgb([255, 0, 0]));
        assert_eq!(*card.image.get_pixel(17, 27), Rgb([255, 255, 255]));
    }

    #[test]
    fn degenerate_quad_is_an_error() {
        let frame = RgbImage::new(50, 50);
        let q = quad([(0.0, 0.0), (10.0, 10.0), (20.0, 20.0), (30.0, 30.0)]);
        assert_eq!(
            warp_card(&frame, &q, CardSize::default()).unwrap_err(),
            RectifyError::Degenerate
        );
    }

    #[test]
    fn tiny_canonical_size_is_rejected() {
        let frame = RgbImage::new(50, 50);
        let q = quad([(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let err = warp_card(&frame, &q, CardSize { width: 1, height: 5 }).unwrap_err();
        assert!(matches!(err, RectifyError::InvalidSize { .. }));
    }
}
