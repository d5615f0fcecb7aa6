//! Graphics Support for the shadow framebuffer

use crate::color::Color;
use crate::framebuffer::ShadowBuffer;
use crate::il0398::{HEIGHT, WIDTH};
use embedded_graphics_core::pixelcolor::Rgb565;
use embedded_graphics_core::prelude::*;

/// For use with embedded_grahics
///
/// Every pixel is thresholded to black or white while drawing.
impl DrawTarget for ShadowBuffer {
    type Color = Rgb565;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, Color::from(color));
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(Color::from(color));
        Ok(())
    }
}

/// For use with embedded_grahics
impl OriginDimensions for ShadowBuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH, HEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::{
        prelude::*,
        primitives::{Line, PrimitiveStyle, Rectangle},
    };

    #[test]
    fn graphics_size() {
        let shadow = ShadowBuffer::new();
        assert_eq!(shadow.size(), Size::new(400, 300));
    }

    #[test]
    fn line_in_first_byte() {
        let mut shadow = ShadowBuffer::new();
        let _ = Line::new(Point::new(0, 0), Point::new(7, 0))
            .into_styled(PrimitiveStyle::with_stroke(Rgb565::BLACK, 1))
            .draw(&mut shadow);

        let buffer = shadow.buffer();
        assert_eq!(buffer[0], Color::Black.get_byte_value());
        for &byte in buffer.iter().skip(1) {
            assert_eq!(byte, Color::White.get_byte_value());
        }
    }

    #[test]
    fn clear_then_fill() {
        let mut shadow = ShadowBuffer::new();
        let _ = shadow.clear(Rgb565::BLACK);
        assert!(shadow.buffer().iter().all(|&b| b == 0x00));

        let _ = Rectangle::new(Point::new(8, 1), Size::new(8, 1))
            .into_styled(PrimitiveStyle::with_fill(Rgb565::WHITE))
            .draw(&mut shadow);
        assert_eq!(shadow.buffer()[51], 0xFF);
        assert_eq!(shadow.buffer()[50], 0x00);
        assert_eq!(shadow.buffer()[52], 0x00);
    }

    #[test]
    fn drawing_outside_is_clipped() {
        let mut shadow = ShadowBuffer::new();
        let _ = Rectangle::new(Point::new(-10, -10), Size::new(5, 5))
            .into_styled(PrimitiveStyle::with_fill(Rgb565::BLACK))
            .draw(&mut shadow);
        assert!(shadow.buffer().iter().all(|&b| b == 0xFF));
    }
}
