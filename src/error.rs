//! Errors of the panel driver
use core::fmt::{Debug, Display, Formatter};

use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal_async::spi::SpiDevice;

/// Epd error type
#[derive(Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ErrorKind<SPI, BUSY, DC, RST>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
{
    /// Encountered an SPI error
    SpiError(SPI::Error),

    /// Encountered an error on Busy GPIO
    BusyError(BUSY::Error),

    /// Encountered an error on DC GPIO
    DcError(DC::Error),

    /// Encountered an error on RST GPIO
    RstError(RST::Error),

    /// A partial window did not start or end on a byte boundary
    InvalidAlignment { x: u32, width: u32 },

    /// A partial window reaches outside of the panel
    InvalidWindow,

    /// The supplied buffer is too small for the transfer
    InvalidBuffer { expected: usize, actual: usize },

    /// The panel is not initialized or sleeping
    NotReady,

    /// Anything else
    Other,
}

impl<SPI, BUSY, DC, RST> Clone for ErrorKind<SPI, BUSY, DC, RST>
where
    SPI: SpiDevice,
    SPI::Error: Clone,
    BUSY: InputPin,
    BUSY::Error: Clone,
    DC: OutputPin,
    DC::Error: Clone,
    RST: OutputPin,
    RST::Error: Clone,
{
    fn clone(&self) -> Self {
        match self {
            Self::SpiError(err) => Self::SpiError(err.clone()),
            Self::BusyError(err) => Self::BusyError(err.clone()),
            Self::DcError(err) => Self::DcError(err.clone()),
            Self::RstError(err) => Self::RstError(err.clone()),
            Self::InvalidAlignment { x, width } => Self::InvalidAlignment {
                x: *x,
                width: *width,
            },
            Self::InvalidWindow => Self::InvalidWindow,
            Self::InvalidBuffer { expected, actual } => Self::InvalidBuffer {
                expected: *expected,
                actual: *actual,
            },
            Self::NotReady => Self::NotReady,
            Self::Other => Self::Other,
        }
    }
}

impl<SPI, BUSY, DC, RST> Copy for ErrorKind<SPI, BUSY, DC, RST>
where
    SPI: SpiDevice,
    SPI::Error: Copy,
    BUSY: InputPin,
    BUSY::Error: Copy,
    DC: OutputPin,
    DC::Error: Copy,
    RST: OutputPin,
    RST::Error: Copy,
{
}

impl<SPI, BUSY, DC, RST> ErrorKind<SPI, BUSY, DC, RST>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
{
    /// True for errors raised before anything was sent to the controller
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::InvalidAlignment { .. } | Self::InvalidWindow | Self::InvalidBuffer { .. }
        )
    }

    fn fmt_domain(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidAlignment { x, width } => write!(
                f,
                "partial window x ({x}) and width ({width}) must be multiples of 8"
            ),
            Self::InvalidWindow => write!(f, "partial window exceeds the panel"),
            Self::InvalidBuffer { expected, actual } => {
                write!(f, "buffer holds {actual} bytes, {expected} are needed")
            }
            Self::NotReady => write!(f, "panel is not initialized or asleep"),
            _ => write!(
                f,
                "A different error occurred. The original error may contain more information"
            ),
        }
    }
}

impl<SPI, BUSY, DC, RST> Display for ErrorKind<SPI, BUSY, DC, RST>
where
    SPI: SpiDevice,
    SPI::Error: Debug + Display,
    BUSY: InputPin,
    BUSY::Error: Debug + Display,
    DC: OutputPin,
    DC::Error: Debug + Display,
    RST: OutputPin,
    RST::Error: Debug + Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::SpiError(err) => Display::fmt(&err, f),
            Self::BusyError(err) => Display::fmt(&err, f),
            Self::DcError(err) => Display::fmt(&err, f),
            Self::RstError(err) => Display::fmt(&err, f),
            _ => self.fmt_domain(f),
        }
    }
}

impl<SPI, BUSY, DC, RST> Debug for ErrorKind<SPI, BUSY, DC, RST>
where
    SPI: SpiDevice,
    SPI::Error: Debug + Display,
    BUSY: InputPin,
    BUSY::Error: Debug + Display,
    DC: OutputPin,
    DC::Error: Debug + Display,
    RST: OutputPin,
    RST::Error: Debug + Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::SpiError(err) => Debug::fmt(&err, f),
            Self::BusyError(err) => Debug::fmt(&err, f),
            Self::DcError(err) => Debug::fmt(&err, f),
            Self::RstError(err) => Debug::fmt(&err, f),
            _ => self.fmt_domain(f),
        }
    }
}
