use core::fmt::Debug;

/// All commands need to have this trait which gives the address of the command
/// which needs to be send via SPI with activated CommandsPin (Data/Command Pin in CommandMode)
pub(crate) trait Command: Copy {
    fn address(self) -> u8;
}

/// Seperates the different LUT for the Display Refresh process
#[derive(Debug, Clone, PartialEq, Eq, Copy, Default)]
pub enum RefreshMode {
    /// The "normal" full Lookuptable for the Refresh-Sequence.
    ///
    /// Slow and flickering, but clears all ghosting.
    #[default]
    Full,
    /// The quick LUT where not the full refresh sequence is followed.
    /// This will lead to ghosting after a couple of refreshes.
    Partial,
}

/// Gives a driver its error type
pub trait ErrorType {
    type Error: Debug;
}

/// A rectangle on the panel used for partial updates
///
/// `x` and `width` need to be multiples of 8, since eight pixels share one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Window {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Window {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns true if the window starts and ends on a byte boundary
    pub const fn is_byte_aligned(&self) -> bool {
        self.x % 8 == 0 && self.width % 8 == 0
    }

    /// Number of bytes of packed 1bpp data covering this window
    pub const fn buffer_len(&self) -> usize {
        crate::buffer_len(self.width as usize, self.height as usize)
    }
}

/// The capabilities every panel controller used by the refresh pipeline has to offer
///
/// The SPI device is handed in with every call, so the bus can be shared between
/// transactions. Within one transaction it has to stay exclusive to the panel.
///
/// # Example
///
///```rust, no_run
///# use embedded_hal_mock::eh1::*;
///# use embedded_hal_mock::eh1::delay::NoopDelay;
///# type Error = epd_gdew042t2::error::ErrorKind<spi::Mock<u8>, digital::Mock, digital::Mock, digital::Mock>;
///# fn main() -> Result<(), Error> {
///# embassy_futures::block_on(async {
///use epd_gdew042t2::{il0398::*, prelude::*};
///#
///# let mut spi = spi::Mock::new(&[]);
///# let busy_in = digital::Mock::new(&[]);
///# let dc = digital::Mock::new(&[]);
///# let rst = digital::Mock::new(&[]);
///
///// Setup EPD
///let mut epd = Il0398::new(busy_in, dc, Some(rst), NoopDelay, PanelConfig::default());
///epd.reset(&mut spi).await?;
///epd.init(&mut spi).await?;
///
///let buffer = [Color::White.get_byte_value(); BUFFER_LEN];
///
///// Switch to quick refreshes and show a frame
///epd.set_mode(&mut spi, RefreshMode::Partial).await?;
///epd.draw_full(&mut spi, &buffer).await?;
///
///// Set the EPD to sleep
///epd.sleep(&mut spi).await?;
///# Ok::<(), Error>(())
///# })
///# }
///```
pub trait RefreshPanel<SPI>: ErrorType {
    /// Get the width of the display
    fn width(&self) -> u32;

    /// Get the height of the display
    fn height(&self) -> u32;

    /// The refresh mode currently loaded into the LUT registers
    ///
    /// `None` if the panel is not ready for drawing.
    fn mode(&self) -> Option<RefreshMode>;

    /// Pulses the reset line. Required to leave deep sleep.
    async fn reset(&mut self, spi: &mut SPI) -> Result<(), Self::Error>;

    /// Runs the controller bring-up and loads the full refresh LUTs
    async fn init(&mut self, spi: &mut SPI) -> Result<(), Self::Error>;

    /// Wakes the device up from sleep
    async fn wake_up(&mut self, spi: &mut SPI) -> Result<(), Self::Error> {
        self.reset(spi).await?;
        self.init(spi).await
    }

    /// Loads the waveforms for `mode` and commits them with a power-on
    async fn set_mode(&mut self, spi: &mut SPI, mode: RefreshMode) -> Result<(), Self::Error>;

    /// Transmits a full frame and waits until it is displayed
    async fn draw_full(&mut self, spi: &mut SPI, buffer: &[u8]) -> Result<(), Self::Error>;

    /// Transmits and displays only the given window
    ///
    /// `buffer` holds the packed bits of the window, `window.width / 8 * window.height` bytes.
    async fn draw_partial_window(
        &mut self,
        spi: &mut SPI,
        window: Window,
        buffer: &[u8],
    ) -> Result<(), Self::Error>;

    /// Turns the charge pump and drivers off. Register content is kept.
    async fn power_off(&mut self, spi: &mut SPI) -> Result<(), Self::Error>;

    /// Let the device enter deep-sleep mode to save power.
    ///
    /// The deep sleep mode returns to standby with a hardware reset.
    async fn sleep(&mut self, spi: &mut SPI) -> Result<(), Self::Error>;
}
