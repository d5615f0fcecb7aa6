use crate::{config::Level, config::PanelConfig, error::ErrorKind, traits::Command};
use core::fmt::{Debug, Display};
use core::marker::PhantomData;
use embassy_time::Duration;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal_async::{delay::DelayNs, spi::SpiDevice};
use log::{trace, warn};

/// Result of waiting on the busy line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusyStatus {
    /// The controller released the busy line
    Idle,
    /// The timeout elapsed while the line was still active
    TimedOut,
}

/// Largest chunk written per transfer when repeating a single byte
const FILL_CHUNK: usize = 128;

/// The Connection Interface of the IL0398 panel
///
/// Owns the gpio lines and the delay source, the SPI device is passed in per call.
pub(crate) struct DisplayInterface<SPI, BUSY, DC, RST, DELAY> {
    /// SPI
    _spi: PhantomData<SPI>,
    /// Active while the controller works, see [`PanelConfig::busy_active_level`]
    busy: BUSY,
    /// Data/Command Control Pin (High for data, Low for command)
    dc: DC,
    /// Pin for Resetting, optional on some boards
    rst: Option<RST>,
    delay: DELAY,
    config: PanelConfig,
}

impl<SPI, BUSY, DC, RST, DELAY> DisplayInterface<SPI, BUSY, DC, RST, DELAY>
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
    /// Creates a new `DisplayInterface` struct
    pub fn new(busy: BUSY, dc: DC, rst: Option<RST>, delay: DELAY, config: PanelConfig) -> Self {
        DisplayInterface {
            _spi: PhantomData,
            busy,
            dc,
            rst,
            delay,
            config,
        }
    }

    pub(crate) fn config(&self) -> &PanelConfig {
        &self.config
    }

    /// Basic function for sending [Commands](Command).
    ///
    /// Enables direct interaction with the device with the help of [data()](DisplayInterface::data())
    pub(crate) async fn cmd<T: Command>(
        &mut self,
        spi: &mut SPI,
        command: T,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        // low for commands
        self.dc.set_low().map_err(ErrorKind::DcError)?;

        // Transfer the command over spi
        self.write(spi, &[command.address()]).await
    }

    /// Basic function for sending an array of u8-values of data over spi
    ///
    /// Nothing is sent for an empty slice.
    pub(crate) async fn data(
        &mut self,
        spi: &mut SPI,
        data: &[u8],
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        if data.is_empty() {
            return Ok(());
        }

        // high for data
        self.dc.set_high().map_err(ErrorKind::DcError)?;
        self.write(spi, data).await
    }

    /// Basic function for sending [Commands](Command) and the data belonging to it.
    pub(crate) async fn cmd_with_data<T: Command>(
        &mut self,
        spi: &mut SPI,
        command: T,
        data: &[u8],
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.cmd(spi, command).await?;
        self.data(spi, data).await
    }

    /// Sends the same byte `repetitions` times, in chunks of [`FILL_CHUNK`] bytes
    pub(crate) async fn data_x_times(
        &mut self,
        spi: &mut SPI,
        val: u8,
        repetitions: usize,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        if repetitions == 0 {
            return Ok(());
        }

        // high for data
        self.dc.set_high().map_err(ErrorKind::DcError)?;

        let chunk = [val; FILL_CHUNK];
        let mut remaining = repetitions;
        while remaining > 0 {
            let len = remaining.min(FILL_CHUNK);
            self.write(spi, &chunk[..len]).await?;
            remaining -= len;
        }
        Ok(())
    }

    // spi write helper/abstraction function
    async fn write(
        &mut self,
        spi: &mut SPI,
        data: &[u8],
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        trace!("spi write {} bytes", data.len());
        spi.write(data).await.map_err(ErrorKind::SpiError)
    }

    /// Waits until the device isn't busy anymore, or `timeout` passed
    ///
    /// The line is sampled every [`PanelConfig::busy_poll_interval`]. The waited time
    /// is the sum of the poll intervals, so a timeout is reported after
    /// `timeout / busy_poll_interval` sleeps. A timeout is logged and returned as
    /// [`BusyStatus::TimedOut`], callers carry on with the sequence.
    pub(crate) async fn wait_until_idle(
        &mut self,
        timeout: Duration,
    ) -> Result<BusyStatus, ErrorKind<SPI, BUSY, DC, RST>> {
        let poll = self.config.busy_poll_interval;
        let mut waited = Duration::from_ticks(0);

        loop {
            if !self.is_busy()? {
                return Ok(BusyStatus::Idle);
            }
            if waited >= timeout {
                warn!("busy wait timed out after {} ms", waited.as_millis());
                return Ok(BusyStatus::TimedOut);
            }
            self.delay_for(poll).await;
            waited += poll;
        }
    }

    /// Checks if device is still busy
    ///
    /// This is normally handled by the more complicated commands themselves,
    /// but in the case you send data and commands directly you might need to check
    /// if the device is still busy
    pub(crate) fn is_busy(&mut self) -> Result<bool, ErrorKind<SPI, BUSY, DC, RST>> {
        match self.config.busy_active_level {
            Level::Low => self.busy.is_low(),
            Level::High => self.busy.is_high(),
        }
        .map_err(ErrorKind::BusyError)
    }

    pub(crate) async fn delay_for(&mut self, duration: Duration) {
        delay_for(&mut self.delay, duration).await;
    }

    /// Resets the device.
    ///
    /// Used to awake the module from deep sleep. Skipped if the board has no
    /// reset line.
    pub(crate) async fn reset(&mut self) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        let Some(rst) = self.rst.as_mut() else {
            return Ok(());
        };
        let active = self.config.reset_active_level;

        set_level(rst, active.inverse()).map_err(ErrorKind::RstError)?;
        set_level(rst, active).map_err(ErrorKind::RstError)?;
        delay_for(&mut self.delay, self.config.reset_hold).await;

        set_level(rst, active.inverse()).map_err(ErrorKind::RstError)?;
        delay_for(&mut self.delay, self.config.reset_settle).await;
        Ok(())
    }
}

/// Sleeps for `duration`, split into steps `delay_us` can take
pub(crate) async fn delay_for<D: DelayNs>(delay: &mut D, duration: Duration) {
    let mut remaining = duration.as_micros();
    while remaining > 0 {
        let step = remaining.min(u32::MAX as u64);
        delay.delay_us(step as u32).await;
        remaining -= step;
    }
}

fn set_level<P: OutputPin>(pin: &mut P, level: Level) -> Result<(), P::Error> {
    match level {
        Level::Low => pin.set_low(),
        Level::High => pin.set_high(),
    }
}
