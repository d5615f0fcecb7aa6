//! Waveform look-up tables of the GDEW042T2
//!
//! Each table is a list of 6 byte phase groups (level selection, four phase
//! lengths, repeat count), padded with zeros.

use crate::traits::RefreshMode;

/// One set of the five LUT registers (0x20 to 0x24)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Waveform {
    pub vcom: &'static [u8],
    pub white_to_white: &'static [u8],
    pub black_to_white: &'static [u8],
    pub white_to_black: &'static [u8],
    pub black_to_black: &'static [u8],
}

impl Waveform {
    /// The tables loaded for a refresh mode
    pub const fn for_mode(mode: RefreshMode) -> &'static Waveform {
        match mode {
            RefreshMode::Full => &FULL,
            RefreshMode::Partial => &PARTIAL,
        }
    }
}

/// Slow refresh with several inversion passes, clears ghosting
pub const FULL: Waveform = Waveform {
    vcom: &LUT_VCOM_FULL,
    white_to_white: &LUT_WW_FULL,
    black_to_white: &LUT_BW_FULL,
    white_to_black: &LUT_WB_FULL,
    black_to_black: &LUT_BB_FULL,
};

/// Single pass refresh, fast but leaves ghosting behind
pub const PARTIAL: Waveform = Waveform {
    vcom: &LUT_VCOM_PARTIAL,
    white_to_white: &LUT_WW_PARTIAL,
    black_to_white: &LUT_BW_PARTIAL,
    white_to_black: &LUT_WB_PARTIAL,
    black_to_black: &LUT_BB_PARTIAL,
};

/// Four level grayscale, driven by the OLD and NEW planes together
pub const GRAYSCALE: Waveform = Waveform {
    vcom: &LUT_VCOM_GRAY,
    white_to_white: &LUT_WW_GRAY,
    black_to_white: &LUT_BW_GRAY,
    white_to_black: &LUT_WB_GRAY,
    black_to_black: &LUT_BB_GRAY,
};

#[rustfmt::skip]
const LUT_VCOM_FULL: [u8; 44] = [
    0x00, 0x08, 0x00, 0x00, 0x00, 0x02,
    0x60, 0x28, 0x28, 0x00, 0x00, 0x01,
    0x00, 0x14, 0x00, 0x00, 0x00, 0x01,
    0x00, 0x12, 0x12, 0x00, 0x00, 0x01,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

#[rustfmt::skip]
const LUT_WW_FULL: [u8; 38] = [
    0x40, 0x08, 0x00, 0x00, 0x00, 0x02,
    0x90, 0x28, 0x28, 0x00, 0x00, 0x01,
    0x40, 0x14, 0x00, 0x00, 0x00, 0x01,
    0xA0, 0x12, 0x12, 0x00, 0x00, 0x01,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

const LUT_BW_FULL: [u8; 38] = LUT_WW_FULL;

#[rustfmt::skip]
const LUT_WB_FULL: [u8; 38] = [
    0x80, 0x08, 0x00, 0x00, 0x00, 0x02,
    0x90, 0x28, 0x28, 0x00, 0x00, 0x01,
    0x80, 0x14, 0x00, 0x00, 0x00, 0x01,
    0x50, 0x12, 0x12, 0x00, 0x00, 0x01,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

const LUT_BB_FULL: [u8; 38] = LUT_WB_FULL;

/// Phase lengths of the partial waveform
const T1: u8 = 25;
const T2: u8 = 1;
const T3: u8 = 2;
const T4: u8 = 25;

/// A drive phase with the given level selection followed by a ground phase
const fn partial_lut<const N: usize>(levels: u8) -> [u8; N] {
    let mut lut = [0u8; N];
    lut[0] = levels;
    lut[1] = T1;
    lut[2] = T2;
    lut[3] = T3;
    lut[4] = T4;
    lut[5] = 1;
    // ground phase
    lut[7] = 1;
    lut[11] = 1;
    lut
}

const LUT_VCOM_PARTIAL: [u8; 44] = partial_lut(0x00);
const LUT_WW_PARTIAL: [u8; 42] = partial_lut(0x18);
const LUT_BW_PARTIAL: [u8; 42] = partial_lut(0x5A);
const LUT_WB_PARTIAL: [u8; 42] = partial_lut(0xA5);
const LUT_BB_PARTIAL: [u8; 42] = partial_lut(0x24);

#[rustfmt::skip]
const LUT_VCOM_GRAY: [u8; 38] = [
    0x00, 0x0A, 0x00, 0x00, 0x00, 0x01,
    0x60, 0x14, 0x14, 0x00, 0x00, 0x01,
    0x00, 0x14, 0x00, 0x00, 0x00, 0x01,
    0x00, 0x13, 0x0A, 0x01, 0x00, 0x01,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

#[rustfmt::skip]
const LUT_WW_GRAY: [u8; 32] = [
    0x40, 0x0A, 0x00, 0x00, 0x00, 0x01,
    0x90, 0x14, 0x14, 0x00, 0x00, 0x01,
    0x10, 0x14, 0x0A, 0x00, 0x00, 0x01,
    0xA0, 0x13, 0x01, 0x00, 0x00, 0x01,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

#[rustfmt::skip]
const LUT_BW_GRAY: [u8; 32] = [
    0x40, 0x0A, 0x00, 0x00, 0x00, 0x01,
    0x90, 0x14, 0x14, 0x00, 0x00, 0x01,
    0x00, 0x14, 0x0A, 0x00, 0x00, 0x01,
    0x99, 0x0C, 0x01, 0x03, 0x04, 0x01,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

#[rustfmt::skip]
const LUT_WB_GRAY: [u8; 32] = [
    0x40, 0x0A, 0x00, 0x00, 0x00, 0x01,
    0x90, 0x14, 0x14, 0x00, 0x00, 0x01,
    0x00, 0x14, 0x0A, 0x00, 0x00, 0x01,
    0x99, 0x0B, 0x04, 0x04, 0x01, 0x01,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

#[rustfmt::skip]
const LUT_BB_GRAY: [u8; 32] = [
    0x80, 0x0A, 0x00, 0x00, 0x00, 0x01,
    0x90, 0x14, 0x14, 0x00, 0x00, 0x01,
    0x20, 0x14, 0x0A, 0x00, 0x00, 0x01,
    0x50, 0x13, 0x01, 0x00, 0x00, 0x01,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lengths() {
        assert_eq!(FULL.vcom.len(), 44);
        assert_eq!(FULL.white_to_white.len(), 38);
        assert_eq!(FULL.black_to_black.len(), 38);

        assert_eq!(PARTIAL.vcom.len(), 44);
        assert_eq!(PARTIAL.white_to_white.len(), 42);
        assert_eq!(PARTIAL.black_to_white.len(), 42);
        assert_eq!(PARTIAL.white_to_black.len(), 42);
        assert_eq!(PARTIAL.black_to_black.len(), 42);
    }

    #[test]
    fn partial_tables_hold_one_drive_and_one_ground_phase() {
        assert_eq!(&PARTIAL.white_to_black[..12], &[0xA5, 25, 1, 2, 25, 1, 0, 1, 0, 0, 0, 1]);
        assert_eq!(&PARTIAL.black_to_white[..6], &[0x5A, 25, 1, 2, 25, 1]);
        assert!(PARTIAL.vcom[12..].iter().all(|&b| b == 0));
    }

    #[test]
    fn mode_selects_table() {
        assert_eq!(Waveform::for_mode(RefreshMode::Full), &FULL);
        assert_eq!(Waveform::for_mode(RefreshMode::Partial), &PARTIAL);
        assert_ne!(FULL, PARTIAL);
    }
}
