//! A Driver for the GDEW042T2 4.2" E-Ink Display (IL0398 / UC8176) via SPI
//!
//! The panel is driven in B/W mode with LUTs set by registers, which allows to switch
//! between the slow [`RefreshMode::Full`] waveform and the fast [`RefreshMode::Partial`]
//! one at runtime. A four level grayscale waveform is available as well.
//!
//! # References
//!
//! - [Datasheet](https://www.good-display.com/product/386.html)
//! - IL0398 command reference
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized --reset+init--> Ready(Full) <--set_mode--> Ready(Partial)
//!       ^                          |   ^
//!       |                     sleep|   |init_grayscale / set_mode
//!       +------ reset+init ---- Asleep  Grayscale
//! ```
use core::fmt::{Debug, Display};
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal_async::{delay::DelayNs, spi::SpiDevice};
use log::{debug, error, info};

use crate::buffer_len;
use crate::color::Color;
use crate::config::PanelConfig;
use crate::error::ErrorKind;
use crate::interface::{BusyStatus, DisplayInterface};
use crate::traits::{ErrorType, RefreshMode, RefreshPanel, Window};

pub(crate) mod command;
pub mod lut;

pub(crate) use self::command::Command;
use self::lut::Waveform;

/// Width of the display
pub const WIDTH: u32 = 400;
/// Height of the display
pub const HEIGHT: u32 = 300;
/// Size of one packed 1bpp frame
pub const BUFFER_LEN: usize = buffer_len(WIDTH as usize, HEIGHT as usize);
/// Default Background Color
pub const DEFAULT_BACKGROUND_COLOR: Color = Color::White;

/// Check code the deep sleep command has to carry
const DEEP_SLEEP_CHECK: u8 = 0xA5;

/// Where the controller is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    /// Not brought up since power on, or after a failed init
    Uninitialized,
    /// Initialized with the LUTs of the given mode loaded
    Ready(RefreshMode),
    /// Initialized with the grayscale LUTs loaded
    Grayscale,
    /// Powered off or in deep sleep, needs reset and init
    Asleep,
}

/// Il0398 driver
pub struct Il0398<SPI, BUSY, DC, RST, DELAY> {
    /// Connection Interface
    interface: DisplayInterface<SPI, BUSY, DC, RST, DELAY>,
    /// Background Color
    color: Color,
    state: PanelState,
}

impl<SPI, BUSY, DC, RST, DELAY> ErrorType for Il0398<SPI, BUSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    SPI::Error: Debug + Display,
    BUSY: InputPin,
    BUSY::Error: Debug + Display,
    DC: OutputPin,
    DC::Error: Debug + Display,
    RST: OutputPin,
    RST::Error: Debug + Display,
    DELAY: DelayNs,
{
    type Error = ErrorKind<SPI, BUSY, DC, RST>;
}

impl<SPI, BUSY, DC, RST, DELAY> RefreshPanel<SPI> for Il0398<SPI, BUSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    SPI::Error: Debug + Display,
    BUSY: InputPin,
    BUSY::Error: Debug + Display,
    DC: OutputPin,
    DC::Error: Debug + Display,
    RST: OutputPin,
    RST::Error: Debug + Display,
    DELAY: DelayNs,
{
    fn width(&self) -> u32 {
        WIDTH
    }

    fn height(&self) -> u32 {
        HEIGHT
    }

    fn mode(&self) -> Option<RefreshMode> {
        match self.state {
            PanelState::Ready(mode) => Some(mode),
            _ => None,
        }
    }

    async fn reset(&mut self, _spi: &mut SPI) -> Result<(), Self::Error> {
        self.interface.reset().await
    }

    async fn init(&mut self, spi: &mut SPI) -> Result<(), Self::Error> {
        self.bring_up(spi, &lut::FULL).await?;
        self.state = PanelState::Ready(RefreshMode::Full);
        info!("il0398 initialized, full refresh LUTs loaded");
        Ok(())
    }

    async fn set_mode(&mut self, spi: &mut SPI, mode: RefreshMode) -> Result<(), Self::Error> {
        self.ensure(matches!(
            self.state,
            PanelState::Ready(_) | PanelState::Grayscale
        ))?;

        self.wait_until_idle().await?;
        self.load_waveform(spi, Waveform::for_mode(mode)).await?;
        self.command(spi, Command::PowerOn).await?;
        self.wait_until_idle().await?;

        self.state = PanelState::Ready(mode);
        info!("il0398 switched to {:?} refresh", mode);
        Ok(())
    }

    async fn draw_full(&mut self, spi: &mut SPI, buffer: &[u8]) -> Result<(), Self::Error> {
        self.ensure(matches!(self.state, PanelState::Ready(_)))?;
        let frame = Self::frame(buffer, BUFFER_LEN)?;

        self.cmd_with_data(spi, Command::DataStartTransmission2, frame)
            .await?;
        self.display_frame(spi).await
    }

    async fn draw_partial_window(
        &mut self,
        spi: &mut SPI,
        window: Window,
        buffer: &[u8],
    ) -> Result<(), Self::Error> {
        if !window.is_byte_aligned() {
            error!(
                "partial window x={} w={} is not byte aligned",
                window.x, window.width
            );
            return Err(ErrorKind::InvalidAlignment {
                x: window.x,
                width: window.width,
            });
        }
        let fits = |start: u32, len: u32, max: u32| {
            len > 0 && start.checked_add(len).is_some_and(|end| end <= max)
        };
        if !fits(window.x, window.width, WIDTH) || !fits(window.y, window.height, HEIGHT) {
            return Err(ErrorKind::InvalidWindow);
        }
        let frame = Self::frame(buffer, window.buffer_len())?;
        self.ensure(matches!(self.state, PanelState::Ready(_)))?;

        self.command(spi, Command::PartialIn).await?;
        self.cmd_with_data(spi, Command::PartialWindow, &partial_window_payload(&window))
            .await?;
        self.cmd_with_data(spi, Command::DataStartTransmission2, frame)
            .await?;
        self.display_frame(spi).await?;
        self.command(spi, Command::PartialOut).await
    }

    async fn power_off(&mut self, spi: &mut SPI) -> Result<(), Self::Error> {
        self.command(spi, Command::PowerOff).await?;
        self.wait_until_idle().await?;
        self.state = PanelState::Asleep;
        Ok(())
    }

    async fn sleep(&mut self, spi: &mut SPI) -> Result<(), Self::Error> {
        self.power_off(spi).await?;
        self.cmd_with_data(spi, Command::DeepSleep, &[DEEP_SLEEP_CHECK])
            .await?;
        info!("il0398 entered deep sleep");
        Ok(())
    }
}

impl<SPI, BUSY, DC, RST, DELAY> Il0398<SPI, BUSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    SPI::Error: Debug + Display,
    BUSY: InputPin,
    BUSY::Error: Debug + Display,
    DC: OutputPin,
    DC::Error: Debug + Display,
    RST: OutputPin,
    RST::Error: Debug + Display,
    DELAY: DelayNs,
{
    /// Creates the driver without touching the hardware
    ///
    /// Call [`RefreshPanel::reset`] and [`RefreshPanel::init`] before drawing.
    pub fn new(busy: BUSY, dc: DC, rst: Option<RST>, delay: DELAY, config: PanelConfig) -> Self {
        Il0398 {
            interface: DisplayInterface::new(busy, dc, rst, delay, config),
            color: DEFAULT_BACKGROUND_COLOR,
            state: PanelState::Uninitialized,
        }
    }

    pub fn state(&self) -> PanelState {
        self.state
    }

    pub fn set_background_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn background_color(&self) -> &Color {
        &self.color
    }

    /// Runs the bring-up with the four level grayscale LUTs
    ///
    /// Afterwards frames are drawn with [`Il0398::draw_grayscale`].
    pub async fn init_grayscale(
        &mut self,
        spi: &mut SPI,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.bring_up(spi, &lut::GRAYSCALE).await?;
        self.state = PanelState::Grayscale;
        info!("il0398 initialized, grayscale LUTs loaded");
        Ok(())
    }

    /// Draws a grayscale frame from its two bit planes
    ///
    /// `old` goes to the OLD (0x10) and `new` to the NEW (0x13) SRAM, together they
    /// select one of four levels per pixel. A missing plane keeps the SRAM content.
    pub async fn draw_grayscale(
        &mut self,
        spi: &mut SPI,
        old: Option<&[u8]>,
        new: Option<&[u8]>,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.ensure(self.state == PanelState::Grayscale)?;

        if let Some(old) = old {
            let old = Self::frame(old, BUFFER_LEN)?;
            self.cmd_with_data(spi, Command::DataStartTransmission1, old)
                .await?;
        }
        if let Some(new) = new {
            let new = Self::frame(new, BUFFER_LEN)?;
            self.cmd_with_data(spi, Command::DataStartTransmission2, new)
                .await?;
        }
        self.display_frame(spi).await
    }

    /// Fills the whole panel with the background color
    pub async fn clear_frame(
        &mut self,
        spi: &mut SPI,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.ensure(matches!(self.state, PanelState::Ready(_)))?;

        let color = self.color.get_byte_value();
        self.command(spi, Command::DataStartTransmission2).await?;
        self.interface.data_x_times(spi, color, BUFFER_LEN).await?;
        self.display_frame(spi).await
    }

    /// Waits for the busy line with the command timeout
    pub async fn wait_until_idle(&mut self) -> Result<BusyStatus, ErrorKind<SPI, BUSY, DC, RST>> {
        let timeout = self.interface.config().busy_timeout;
        self.interface.wait_until_idle(timeout).await
    }

    async fn bring_up(
        &mut self,
        spi: &mut SPI,
        waveform: &Waveform,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.state = PanelState::Uninitialized;
        self.wait_until_idle().await?;

        // VDS_EN, VDG_EN / VCOM_HV, VGHL_LV / VDH / VDL
        self.cmd_with_data(spi, Command::PowerSetting, &[0x03, 0x00, 0x2B, 0x2B])
            .await?;
        self.cmd_with_data(spi, Command::BoosterSoftStart, &[0x17, 0x17, 0x17])
            .await?;
        self.cmd_with_data(spi, Command::PanelSetting, &[0x3F])
            .await?;
        self.cmd_with_data(spi, Command::PllControl, &[0x3A])
            .await?;
        self.send_resolution(spi).await?;
        self.cmd_with_data(spi, Command::VcmDcSetting, &[0x12])
            .await?;
        self.cmd_with_data(spi, Command::VcomAndDataIntervalSetting, &[0xD7])
            .await?;

        self.load_waveform(spi, waveform).await?;

        self.command(spi, Command::PowerOn).await?;
        self.wait_until_idle().await?;
        Ok(())
    }

    async fn load_waveform(
        &mut self,
        spi: &mut SPI,
        waveform: &Waveform,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.cmd_with_data(spi, Command::LutForVcom, waveform.vcom)
            .await?;
        self.cmd_with_data(spi, Command::LutWhiteToWhite, waveform.white_to_white)
            .await?;
        self.cmd_with_data(spi, Command::LutBlackToWhite, waveform.black_to_white)
            .await?;
        self.cmd_with_data(spi, Command::LutWhiteToBlack, waveform.white_to_black)
            .await?;
        self.cmd_with_data(spi, Command::LutBlackToBlack, waveform.black_to_black)
            .await
    }

    async fn display_frame(&mut self, spi: &mut SPI) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.command(spi, Command::DisplayRefresh).await?;
        let timeout = self.interface.config().refresh_timeout;
        let status = self.interface.wait_until_idle(timeout).await?;
        debug!("il0398 refresh finished: {:?}", status);
        Ok(())
    }

    async fn send_resolution(
        &mut self,
        spi: &mut SPI,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        let w = WIDTH;
        let h = HEIGHT;

        self.cmd_with_data(
            spi,
            Command::ResolutionSetting,
            &[(w >> 8) as u8, w as u8, (h >> 8) as u8, h as u8],
        )
        .await
    }

    async fn command(
        &mut self,
        spi: &mut SPI,
        command: Command,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.interface.cmd(spi, command).await
    }

    async fn cmd_with_data(
        &mut self,
        spi: &mut SPI,
        command: Command,
        data: &[u8],
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.interface.cmd_with_data(spi, command, data).await
    }

    /// The first `len` bytes of `buffer`
    fn frame(buffer: &[u8], len: usize) -> Result<&[u8], ErrorKind<SPI, BUSY, DC, RST>> {
        buffer.get(..len).ok_or(ErrorKind::InvalidBuffer {
            expected: len,
            actual: buffer.len(),
        })
    }

    fn ensure(&self, ready: bool) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        if ready {
            Ok(())
        } else {
            error!("il0398 not ready, state {:?}", self.state);
            Err(ErrorKind::NotReady)
        }
    }
}

/// Parameters of [`Command::PartialWindow`]
///
/// The horizontal range is widened to whole bytes, the last byte is the scan flag.
fn partial_window_payload(window: &Window) -> [u8; 9] {
    let x_start = window.x & 0xFFF8;
    let x_end = (window.x + window.width - 1) | 0x0007;
    let y_start = window.y;
    let y_end = window.y + window.height - 1;

    [
        (x_start >> 8) as u8,
        x_start as u8,
        (x_end >> 8) as u8,
        x_end as u8,
        (y_start >> 8) as u8,
        y_start as u8,
        (y_end >> 8) as u8,
        y_end as u8,
        0x01,
    ]
}
