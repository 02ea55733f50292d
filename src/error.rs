// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors that can happen when working with [`Sc16is750`].

use crate::datasheet::InvalidBaudRateError;
use core::error::Error as CoreError;
use core::fmt::{self, Debug, Display, Formatter};

#[cfg(doc)]
use crate::Sc16is750;

/// A configuration value is outside of what the chip supports.
///
/// Operations returning this error do so before touching any register.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InvalidArgumentError {
    /// The 7-bit I2C address does not fit into seven bits.
    DeviceAddress(u8),
    /// The register address is above [`offsets::MAX`].
    ///
    /// [`offsets::MAX`]: crate::datasheet::registers::offsets::MAX
    RegisterAddress(u8),
    /// Only 5, 6, 7 and 8 data bits are supported.
    DataBits(u8),
    /// Only 1 and 2 stop bits are supported.
    StopBits(u8),
    /// Parity must be one of `N`, `O` or `E`.
    Parity,
    /// Flow control must be one of `NONE`, `SOFT`, `HARD` or `AUTO`.
    FlowControl,
    /// The receive trigger level must be 8, 16, 56 or 60 characters.
    RxTriggerLevel(u8),
    /// The transmit trigger level must be 0, 8, 16, 56 or 60 spaces.
    TxTriggerLevel(u8),
    /// The baud rate cannot be programmed into the divisor latch.
    BaudRate(InvalidBaudRateError),
    /// Software flow control needs at least one XON or XOFF character.
    NoFlowControlCharacters,
    /// Only the special and the enhanced register set can be entered.
    GeneralRegisterSet,
}

impl Display for InvalidArgumentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceAddress(address) => {
                write!(f, "invalid 7-bit I2C address: {address:#04x}")
            }
            Self::RegisterAddress(address) => {
                write!(f, "invalid register address: {address:#04x}")
            }
            Self::DataBits(bits) => {
                write!(f, "unsupported number of data bits: {bits}")
            }
            Self::StopBits(bits) => {
                write!(f, "unsupported number of stop bits: {bits}")
            }
            Self::Parity => write!(f, "parity must be one of N, O or E"),
            Self::FlowControl => {
                write!(f, "flow control must be one of NONE, SOFT, HARD or AUTO")
            }
            Self::RxTriggerLevel(level) => write!(
                f,
                "invalid receive trigger level {level}: must be 8, 16, 56 or 60"
            ),
            Self::TxTriggerLevel(level) => write!(
                f,
                "invalid transmit trigger level {level}: must be 0, 8, 16, 56 or 60"
            ),
            Self::BaudRate(e) => write!(f, "invalid baud rate: {e}"),
            Self::NoFlowControlCharacters => {
                write!(f, "no XON/XOFF characters defined")
            }
            Self::GeneralRegisterSet => {
                write!(f, "the general register set cannot be entered")
            }
        }
    }
}

impl CoreError for InvalidArgumentError {
    fn source(&self) -> Option<&(dyn CoreError + 'static)> {
        match self {
            Self::BaudRate(e) => Some(e),
            _ => None,
        }
    }
}

/// The chip or the driver is in a mode that does not allow the operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InvalidStateError {
    /// A register set context is already entered.
    ContextAlreadyEntered,
    /// No register set context is entered.
    NoContextEntered,
    /// The LCR holds a value (given) from which the requested register set
    /// cannot be entered.
    ForeignRegisterSet(u8),
    /// The LCR holds the enhanced register set sentinel `0xBF`.
    EnhancedRegisterSetActive,
    /// The receive FIFO still holds data.
    RxDataPending,
    /// The transmit holding or shift register still holds data.
    TxDataPending,
    /// GPIO[7:4] are not configured as modem pins.
    ModemPinsDisabled,
}

impl Display for InvalidStateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContextAlreadyEntered => {
                write!(f, "a register set context is already entered")
            }
            Self::NoContextEntered => write!(f, "no register set context is entered"),
            Self::ForeignRegisterSet(lcr) => write!(
                f,
                "the requested register set cannot be entered from LCR={lcr:#04x}"
            ),
            Self::EnhancedRegisterSetActive => {
                write!(f, "the enhanced register set is currently exposed")
            }
            Self::RxDataPending => write!(f, "the receive FIFO holds data"),
            Self::TxDataPending => {
                write!(f, "the transmit holding or shift register holds data")
            }
            Self::ModemPinsDisabled => {
                write!(f, "GPIO[7:4] are not configured for modem flow control")
            }
        }
    }
}

impl CoreError for InvalidStateError {}

/// Errors of the operations of [`Sc16is750`].
///
/// `E` is the error type of the underlying I2C bus.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Error<E> {
    /// The I2C transfer failed, typically because the chip did not
    /// acknowledge.
    NotConnected(E),
    /// The I/O lock was not released within
    /// [`LOCK_TIMEOUT_CYCLES`] chip cycles. The bus was not touched.
    ///
    /// [`LOCK_TIMEOUT_CYCLES`]: crate::datasheet::LOCK_TIMEOUT_CYCLES
    LockTimeout,
    /// A verified write read back a different value.
    VerifyMismatch {
        /// The register address.
        register: u8,
        /// The value that was written.
        written: u8,
        /// The value that was read back.
        read: u8,
    },
    /// A configuration value is outside of what the chip supports.
    InvalidArgument(InvalidArgumentError),
    /// The chip is in a mode that does not allow the operation.
    InvalidState(InvalidStateError),
    /// The transmit FIFO is full and the caller asked not to wait.
    NoBufferSpace,
    /// The receive FIFO is empty and the caller asked not to wait.
    NoBufferData,
}

impl<E> From<InvalidArgumentError> for Error<E> {
    fn from(e: InvalidArgumentError) -> Self {
        Self::InvalidArgument(e)
    }
}

impl<E> From<InvalidStateError> for Error<E> {
    fn from(e: InvalidStateError) -> Self {
        Self::InvalidState(e)
    }
}

impl<E: Debug> Display for Error<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected(e) => write!(f, "I2C transfer failed: {e:?}"),
            Self::LockTimeout => write!(f, "timeout waiting for the I/O lock"),
            Self::VerifyMismatch {
                register,
                written,
                read,
            } => write!(
                f,
                "register {register:#04x} read back {read:#04x} after writing {written:#04x}"
            ),
            Self::InvalidArgument(e) => write!(f, "{e}"),
            Self::InvalidState(e) => write!(f, "{e}"),
            Self::NoBufferSpace => write!(f, "no space in the transmit FIFO"),
            Self::NoBufferData => write!(f, "no data in the receive FIFO"),
        }
    }
}

impl<E: Debug> CoreError for Error<E> {
    fn source(&self) -> Option<&(dyn CoreError + 'static)> {
        match self {
            Self::InvalidArgument(e) => Some(e),
            Self::InvalidState(e) => Some(e),
            _ => None,
        }
    }
}

impl<E: Debug> embedded_io::Error for Error<E> {
    fn kind(&self) -> embedded_io::ErrorKind {
        use embedded_io::ErrorKind;
        match self {
            Self::NotConnected(_) => ErrorKind::NotConnected,
            Self::LockTimeout => ErrorKind::TimedOut,
            Self::InvalidArgument(_) => ErrorKind::InvalidInput,
            _ => ErrorKind::Other,
        }
    }
}

/// The step of [`Sc16is750::connect`] that failed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConnectStep {
    /// Selecting RS-232 or multidrop RS-485 mode.
    MultidropMode,
    /// Programming the baud rate.
    BaudRate,
    /// Programming data bits, parity and stop bits.
    LineFormat,
    /// Enabling the FIFOs.
    Fifo,
    /// Selecting the flow control mode.
    FlowControl,
}

impl Display for ConnectStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MultidropMode => "multidrop mode",
            Self::BaudRate => "baud rate",
            Self::LineFormat => "line format",
            Self::Fifo => "FIFO",
            Self::FlowControl => "flow control",
        };
        f.write_str(name)
    }
}

/// Error of [`Sc16is750::connect`]: the first step that failed.
///
/// Steps before the failing one stay applied.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConnectError<E> {
    /// The step that failed.
    pub step: ConnectStep,
    /// Why it failed.
    pub error: Error<E>,
}

impl<E: Debug> Display for ConnectError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "setting the {} failed: {}", self.step, self.error)
    }
}

impl<E: Debug + 'static> CoreError for ConnectError<E> {
    fn source(&self) -> Option<&(dyn CoreError + 'static)> {
        Some(&self.error)
    }
}
