//! B/W Color for the GDEW042T2
//!
//! The controller runs in B/W mode with register LUTs, where a set bit is a white
//! pixel and a cleared bit a black one.

#[cfg(feature = "graphics")]
use embedded_graphics_core::pixelcolor::{BinaryColor, IntoStorage, Rgb565};

/// Raw RGB565 values above this count as white
pub const RGB565_WHITE_THRESHOLD: u16 = 0x8000;

/// Black and white only
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Color {
    Black,
    #[default]
    White,
}

impl Color {
    /// Get the color encoding of the color for one bit
    pub fn get_bit_value(&self) -> u8 {
        match self {
            Color::White => 1u8,
            Color::Black => 0u8,
        }
    }

    /// Gets a full byte of black or white pixels
    pub fn get_byte_value(&self) -> u8 {
        match self {
            Color::White => 0xff,
            Color::Black => 0x00,
        }
    }

    /// Inverses the given color from Black to White or from White to Black
    pub fn inverse(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Thresholds a raw RGB565 value
    ///
    /// The raw value is used as lightness approximation, which puts the cut at
    /// the top bit of the red channel.
    pub fn from_rgb565(raw: u16) -> Color {
        if raw > RGB565_WHITE_THRESHOLD {
            Color::White
        } else {
            Color::Black
        }
    }
}

impl TryFrom<u8> for Color {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Color::Black),
            1 => Ok(Color::White),
            e => Err(e),
        }
    }
}

#[cfg(feature = "graphics")]
impl From<BinaryColor> for Color {
    fn from(b: BinaryColor) -> Color {
        match b {
            BinaryColor::On => Color::Black,
            BinaryColor::Off => Color::White,
        }
    }
}

#[cfg(feature = "graphics")]
impl From<Rgb565> for Color {
    fn from(rgb: Rgb565) -> Color {
        Color::from_rgb565(rgb.into_storage())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_u8() {
        assert_eq!(Ok(Color::Black), Color::try_from(0u8));
        assert_eq!(Ok(Color::White), Color::try_from(1u8));
    }

    #[test]
    fn from_u8_rejects_other_values() {
        for val in 2..=u8::MAX {
            assert_eq!(Color::try_from(val), Err(val));
        }
    }

    #[test]
    fn u8_conversion() {
        assert_eq!(Color::try_from(Color::Black.get_bit_value()), Ok(Color::Black));
        assert_eq!(Color::try_from(Color::White.get_bit_value()), Ok(Color::White));
        assert_eq!(Color::White.get_byte_value(), 0xFF);
        assert_eq!(Color::Black.get_byte_value(), 0x00);
    }

    #[test]
    fn rgb565_threshold() {
        assert_eq!(Color::from_rgb565(0xFFFF), Color::White);
        assert_eq!(Color::from_rgb565(0x0000), Color::Black);
        assert_eq!(Color::from_rgb565(0x8000), Color::Black);
        assert_eq!(Color::from_rgb565(0x8001), Color::White);
        // pure green and blue stay below the cut
        assert_eq!(Color::from_rgb565(0x07E0), Color::Black);
        assert_eq!(Color::from_rgb565(0x001F), Color::Black);
    }

    #[test]
    fn inverse() {
        assert_eq!(Color::White.inverse(), Color::Black);
        assert_eq!(Color::Black.inverse(), Color::White);
    }

    #[cfg(feature = "graphics")]
    #[test]
    fn from_embedded_graphics_colors() {
        use embedded_graphics_core::pixelcolor::RgbColor;

        assert_eq!(Color::from(BinaryColor::On), Color::Black);
        assert_eq!(Color::from(BinaryColor::Off), Color::White);
        assert_eq!(Color::from(Rgb565::WHITE), Color::White);
        assert_eq!(Color::from(Rgb565::BLACK), Color::Black);
    }
}
