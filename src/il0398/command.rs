//! SPI Commands of the IL0398 / UC8176 controller
use crate::traits;

/// IL0398 commands used by the GDEW042T2
///
/// The parameter bytes each command expects are sent with the DC line high
/// directly after the command byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    /// Resolution, LUT source, B/W mode, scan directions, booster switch and soft reset.
    ///
    /// `0x3F`: B/W mode with LUTs set by registers
    PanelSetting = 0x00,
    /// Internal/external power selection, VCOM and gate voltage levels, VDH and VDL
    PowerSetting = 0x01,
    /// Powers off charge pump, T-con, source and gate drivers and VCOM.
    ///
    /// Register data is kept until VDD goes off. BUSY_N is active until the sequence is done.
    PowerOff = 0x02,
    /// Powers on following the power on sequence, then BUSY_N is released.
    ///
    /// Also commits freshly written LUT registers.
    PowerOn = 0x04,
    /// Soft start phases of the boosters A, B and C
    BoosterSoftStart = 0x06,
    /// Enters deep sleep. The single parameter is a check code, the command is only
    /// executed for `0xA5`.
    ///
    /// Only a hardware reset returns from deep sleep.
    DeepSleep = 0x07,
    /// Writes the "OLD" frame into SRAM in B/W mode
    DataStartTransmission1 = 0x10,
    /// Refreshes the panel from SRAM according to the loaded LUTs.
    ///
    /// BUSY_N goes active while the refresh runs.
    DisplayRefresh = 0x12,
    /// Writes the "NEW" frame into SRAM in B/W mode
    DataStartTransmission2 = 0x13,
    /// VCOM look-up table, groups of 6 bytes where the last byte is the repeat count
    LutForVcom = 0x20,
    /// White-to-White look-up table
    LutWhiteToWhite = 0x21,
    /// Black-to-White look-up table
    LutBlackToWhite = 0x22,
    /// White-to-Black look-up table
    LutWhiteToBlack = 0x23,
    /// Black-to-Black look-up table
    LutBlackToBlack = 0x24,
    /// Frame rate, `0x3A` selects 100 Hz
    PllControl = 0x30,
    /// Border output and data polarity, `0xD7` for the B/W border used here
    VcomAndDataIntervalSetting = 0x50,
    /// Horizontal and vertical resolution, both as 16 bit big endian
    ResolutionSetting = 0x61,
    /// VCOM DC level
    VcmDcSetting = 0x82,
    /// Window for partial updates: x start, x end, y start, y end (each 16 bit big endian)
    /// followed by a scan flag
    PartialWindow = 0x90,
    /// Enters partial mode, following data transmissions only cover the partial window
    PartialIn = 0x91,
    /// Leaves partial mode
    PartialOut = 0x92,
}

impl traits::Command for Command {
    /// Returns the address of the command
    fn address(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Command as CommandTrait;

    #[test]
    fn command_addr() {
        assert_eq!(Command::PanelSetting.address(), 0x00);

        assert_eq!(Command::DeepSleep.address(), 0x07);

        assert_eq!(Command::DisplayRefresh.address(), 0x12);

        assert_eq!(Command::LutBlackToBlack.address(), 0x24);

        assert_eq!(Command::PartialOut.address(), 0x92);
    }
}
