//! A driver and refresh pipeline for the GDEW042T2 4.2" E-Ink display (IL0398 / UC8176)
//!
//! This crate was built using [`embedded-hal`] and [`embedded-hal-async`] traits.
//!
//! It contains two layers:
//!
//! - the panel driver ([`il0398::Il0398`]) speaking the controller's command/data protocol,
//!   including waveform (LUT) management and full/partial refresh switching
//! - the refresh pipeline: a renderer writes native color pixels into a 1bpp
//!   [`ShadowBuffer`](framebuffer::ShadowBuffer), the [`RefreshScheduler`](refresh::RefreshScheduler)
//!   snapshots it on every tick and a single [`RefreshWorker`](worker::RefreshWorker)
//!   performs the slow hardware transactions
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal/1
//! [`embedded-hal-async`]: https://docs.rs/embedded-hal-async/1
//!
//! # Requirements
//!
//! ### SPI
//!
//! - MISO is not connected/available
//! - SPI_MODE_0 is used (CPHL = 0, CPOL = 0)
//! - 8 bits per word, MSB first
//! - 10Mhz is used on the reference board
//!
//! ### Other....
//!
//! - Buffersize: Wherever a buffer is used it always needs to be of the size: `width / 8 * height`,
//!   where width and height being either the full e-ink size or the partial update window size
//!
//! # Examples
//!
//! ```ignore
//! use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
//! use epd_gdew042t2::prelude::*;
//!
//! static CHANNEL: RefreshChannel<CriticalSectionRawMutex> = RefreshChannel::new();
//!
//! let mut epd = Il0398::new(busy, dc, Some(rst), delay, PanelConfig::default());
//! epd.reset(&mut spi).await?;
//! epd.init(&mut spi).await?;
//!
//! // the worker owns the panel and the spi bus from now on
//! let mut worker = RefreshWorker::new(&CHANNEL, spi, epd, &RefreshConfig::default());
//! spawner.spawn(epd_worker(worker));
//!
//! // render pass, the frame is not handed off before all areas are flushed
//! let hold = CHANNEL.hold();
//! for (area, pixels) in dirty_areas {
//!     CHANNEL.flush_rgb565(area, pixels);
//! }
//! drop(hold);
//!
//! // periodic tick
//! RefreshScheduler::new(&CHANNEL, RefreshConfig::default()).run(Delay).await;
//! ```
#![no_std]

#[cfg(feature = "graphics")]
pub mod graphics;

mod traits;

pub mod color;

/// Interface for the physical connection between display and the controlling device
mod interface;

pub mod config;
pub mod error;
pub mod framebuffer;
pub mod il0398;
pub mod refresh;
pub mod ui;
pub mod worker;

pub mod prelude {
    pub use crate::color::Color;
    pub use crate::config::{Level, PanelConfig, RefreshConfig};
    pub use crate::error::ErrorKind;
    pub use crate::framebuffer::{Area, ShadowBuffer};
    pub use crate::il0398::{Il0398, PanelState};
    pub use crate::interface::BusyStatus;
    pub use crate::refresh::{
        FrameHold, PowerRequest, RefreshChannel, RefreshCommand, RefreshScheduler, TickOutcome,
    };
    pub use crate::traits::{ErrorType, RefreshMode, RefreshPanel, Window};
    pub use crate::ui::{DisplayFrontend, UiSurface};
    pub use crate::worker::{RefreshPolicy, RefreshWorker};
    pub use crate::SPI_MODE;
}

pub use crate::interface::BusyStatus;
pub use crate::traits::{ErrorType, RefreshMode, RefreshPanel, Window};

use embedded_hal::spi::{Mode, Phase, Polarity};

/// SPI mode -
/// For more infos see [Requirements: SPI](index.html#spi)
pub const SPI_MODE: Mode = Mode {
    phase: Phase::CaptureOnFirstTransition,
    polarity: Polarity::IdleLow,
};

/// Computes the needed buffer length. Takes care of rounding up in case width
/// is not divisible by 8.
///
///  unused
///  bits        width
/// <----><------------------------>
/// \[XXXXX210\]\[76543210\]...\[76543210\] ^
/// \[XXXXX210\]\[76543210\]...\[76543210\] | height
/// \[XXXXX210\]\[76543210\]...\[76543210\] v
pub const fn buffer_len(width: usize, height: usize) -> usize {
    (width + 7) / 8 * height
}
