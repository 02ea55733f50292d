// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for [`Sc16is750::connect`].
//!
//! [`Sc16is750::connect`]: crate::Sc16is750::connect

use crate::datasheet::registers::{Parity, StopBits, WordLength};
use crate::error::InvalidArgumentError;
use core::cmp::Ordering;
use core::str::FromStr;

/// The speed of data transmission, measured in symbols per second (or bits, in
/// the case of simple UARTs).
///
/// Use [`calc_divisor`] to get the value for the divisor latch.
///
/// [`calc_divisor`]: crate::datasheet::calc_divisor
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum BaudRate {
    // List of typical baud rates.
    Baud921600,
    Baud460800,
    Baud230400,
    Baud115200,
    Baud57600,
    Baud38400,
    Baud19200,
    #[default]
    Baud9600,
    Baud4800,
    Baud2400,
    Baud1200,
    Baud600,
    Baud300,
    Custom(u32),
}

impl BaudRate {
    /// Returns the value as corresponding integer.
    #[must_use]
    pub const fn to_integer(self) -> u32 {
        match self {
            Self::Baud921600 => 921_600,
            Self::Baud460800 => 460_800,
            Self::Baud230400 => 230_400,
            Self::Baud115200 => 115_200,
            Self::Baud57600 => 57600,
            Self::Baud38400 => 38400,
            Self::Baud19200 => 19200,
            Self::Baud9600 => 9600,
            Self::Baud4800 => 4800,
            Self::Baud2400 => 2400,
            Self::Baud1200 => 1200,
            Self::Baud600 => 600,
            Self::Baud300 => 300,
            Self::Custom(val) => val,
        }
    }

    /// Creates the type from an integer representation of the baud rate.
    #[must_use]
    pub const fn from_integer(value: u32) -> Self {
        match value {
            921_600 => Self::Baud921600,
            460_800 => Self::Baud460800,
            230_400 => Self::Baud230400,
            115_200 => Self::Baud115200,
            57600 => Self::Baud57600,
            38400 => Self::Baud38400,
            19200 => Self::Baud19200,
            9600 => Self::Baud9600,
            4800 => Self::Baud4800,
            2400 => Self::Baud2400,
            1200 => Self::Baud1200,
            600 => Self::Baud600,
            300 => Self::Baud300,
            baud_rate => Self::Custom(baud_rate),
        }
    }
}

impl From<u32> for BaudRate {
    fn from(value: u32) -> Self {
        Self::from_integer(value)
    }
}

impl PartialOrd for BaudRate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BaudRate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_integer().cmp(&other.to_integer())
    }
}

impl FromStr for Parity {
    type Err = InvalidArgumentError;

    /// Parses `N`, `O` or `E`. Only the first character counts, so `none`,
    /// `odd` and `even` work as well.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.chars().next().map(|c| c.to_ascii_uppercase()) {
            Some('N') => Ok(Self::None),
            Some('O') => Ok(Self::Odd),
            Some('E') => Ok(Self::Even),
            _ => Err(InvalidArgumentError::Parity),
        }
    }
}

/// XON/XOFF settings for software flow control.
///
/// A character pair only takes part if both of its characters are set.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SoftFlowControl {
    /// Send XON/XOFF characters to throttle the remote.
    pub tx: bool,
    /// React to XON/XOFF characters from the remote.
    pub rx: bool,
    /// XON character of pair 1.
    pub xon1: Option<u8>,
    /// XOFF character of pair 1.
    pub xoff1: Option<u8>,
    /// XON character of pair 2.
    pub xon2: Option<u8>,
    /// XOFF character of pair 2.
    pub xoff2: Option<u8>,
}

impl SoftFlowControl {
    /// DC1, the conventional XON character.
    pub const XON: u8 = 0x11;
    /// DC3, the conventional XOFF character.
    pub const XOFF: u8 = 0x13;

    /// Whether the first character pair is complete.
    #[must_use]
    pub const fn pair1(&self) -> bool {
        self.xon1.is_some() && self.xoff1.is_some()
    }

    /// Whether the second character pair is complete.
    #[must_use]
    pub const fn pair2(&self) -> bool {
        self.xon2.is_some() && self.xoff2.is_some()
    }

    /// Whether no character is set at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.xon1.is_none() && self.xoff1.is_none() && self.xon2.is_none() && self.xoff2.is_none()
    }
}

impl Default for SoftFlowControl {
    /// Both directions with DC1/DC3 as the first pair.
    fn default() -> Self {
        Self {
            tx: true,
            rx: true,
            xon1: Some(Self::XON),
            xoff1: Some(Self::XOFF),
            xon2: None,
            xoff2: None,
        }
    }
}

/// Flow control mode of the UART.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum FlowControl {
    /// No flow control; GPIO[7:4] are general purpose I/O.
    #[default]
    None,
    /// XON/XOFF characters.
    Software(SoftFlowControl),
    /// RTS/CTS driven by the host through GPIO[7:4] in modem mode.
    Hardware,
    /// RTS/CTS driven by the chip itself.
    AutoHardware,
}

impl FromStr for FlowControl {
    type Err = InvalidArgumentError;

    /// Parses `NONE`, `SOFT`, `HARD` or `AUTO`, case insensitive. Only the
    /// first four characters count, so `software` or `hardware` work as well.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let prefix = s.get(..4).unwrap_or(s);
        if prefix.eq_ignore_ascii_case("NONE") {
            Ok(Self::None)
        } else if prefix.eq_ignore_ascii_case("SOFT") {
            Ok(Self::Software(SoftFlowControl::default()))
        } else if prefix.eq_ignore_ascii_case("HARD") {
            Ok(Self::Hardware)
        } else if prefix.eq_ignore_ascii_case("AUTO") {
            Ok(Self::AutoHardware)
        } else {
            Err(InvalidArgumentError::FlowControl)
        }
    }
}

/// Configuration for [`Sc16is750::connect`].
///
/// Please note that sender and receiver **must agree** on the transmission
/// settings, otherwise you receive garbage.
///
/// [`Sc16is750::connect`]: crate::Sc16is750::connect
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Config {
    // Transmission Config
    /// The baud rate to use.
    pub baud_rate: BaudRate,
    /// The length of each transmitted word.
    pub data_bits: WordLength,
    /// Whether parity bits should be used.
    pub parity: Parity,
    /// The number of stop bits.
    pub stop_bits: StopBits,

    // Other config
    /// The flow control mode.
    pub flow_control: FlowControl,
    /// Whether to run in 9-bit multidrop (RS-485) mode instead of RS-232.
    pub rs485: bool,
}

impl Default for Config {
    fn default() -> Self {
        // Default is 9600 baud, 8-N-1, no flow control.
        Self {
            baud_rate: BaudRate::Baud9600,
            data_bits: WordLength::EightBits,
            parity: Parity::None,
            stop_bits: StopBits::One,

            flow_control: FlowControl::None,
            rs485: false,
        }
    }
}
