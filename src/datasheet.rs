// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Constants, Register Offsets, and Register Bits.
//!
//! Models the raw low-level details of the SC16IS750 as of the [datasheet],
//! and avoids too opinionated abstractions.
//!
//! The chip exposes sixteen 8-bit registers. Several addresses are shared
//! between up to three register sets; which one is visible is decided by the
//! current value of the [`LCR`]:
//!
//! | LCR value           | register set                         |
//! |---------------------|--------------------------------------|
//! | `LCR[7] == 0`       | general                              |
//! | `LCR[7] == 1`       | special (divisor latch [`DLL`]/[`DLH`]) |
//! | `LCR == 0xBF`       | enhanced ([`EFR`], XON/XOFF)         |
//!
//! [datasheet]: https://www.nxp.com/docs/en/data-sheet/SC16IS740_750_760.pdf
//! [`LCR`]: registers::LCR
//! [`DLL`]: registers::offsets::special::DLL
//! [`DLH`]: registers::offsets::special::DLH
//! [`EFR`]: registers::EFR

pub use crate::datasheet::errors::*;

/// Frequency of the crystal most SC16IS750 breakout boards carry: 14.7456 MHz.
///
/// The value must match the crystal actually feeding XTAL1, otherwise every
/// computed baud rate is off.
pub const CRYSTAL_FREQUENCY_HZ: u32 = 14_745_600;

/// The default 7-bit I2C address (A1 and A0 tied to VDD).
pub const DEFAULT_I2C_ADDRESS: u8 = 0x48;

/// The maximum size of the internal read and write FIFO.
///
/// Each channel (tx: transmission, rx: reception) has its own queue.
pub const FIFO_SIZE: usize = 64;

/// Number of chip cycles a waiter blocks on the I/O lock before giving up.
pub const LOCK_TIMEOUT_CYCLES: u32 = 10;

/// Chip cycles a FIFO reset or a software reset needs to settle.
pub const RESET_SETTLE_CYCLES: u32 = 2;

mod errors {
    use super::Prescaler;
    use core::error::Error;
    use core::fmt::{self, Display, Formatter};

    /// Error that is returned when [`calc_divisor`] cannot produce a divisor
    /// that fits into the 16 bit divisor latch.
    ///
    /// [`calc_divisor`]: crate::datasheet::calc_divisor
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct InvalidBaudRateError {
        /// The crystal frequency.
        pub frequency: u32,
        /// The requested baud rate.
        pub baud_rate: u32,
        /// The active clock prescaler.
        pub prescaler: Prescaler,
    }

    impl Display for InvalidBaudRateError {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            write!(
                f,
                "baud rate cannot be represented by the divisor latch: \
                 frequency={}, baud_rate={}, prescaler={}",
                self.frequency,
                self.baud_rate,
                self.prescaler.factor()
            )
        }
    }

    impl Error for InvalidBaudRateError {}
}

/// Clock prescaler in front of the baud rate generator, selected by
/// [`MCR::CLOCK_DIVISOR`].
///
/// [`MCR::CLOCK_DIVISOR`]: registers::MCR::CLOCK_DIVISOR
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Prescaler {
    /// The crystal drives the baud rate generator directly.
    #[default]
    DivideBy1,
    /// The crystal frequency is divided by four first.
    DivideBy4,
}

impl Prescaler {
    /// Returns the division factor.
    #[must_use]
    pub const fn factor(self) -> u32 {
        match self {
            Self::DivideBy1 => 1,
            Self::DivideBy4 => 4,
        }
    }

    /// Derives the prescaler from the [`MCR`].
    ///
    /// [`MCR`]: registers::MCR
    #[must_use]
    pub const fn from_mcr(mcr: registers::MCR) -> Self {
        if mcr.contains(registers::MCR::CLOCK_DIVISOR) {
            Self::DivideBy4
        } else {
            Self::DivideBy1
        }
    }
}

/// Calculates the divisor latch value for the given baud rate.
///
/// `divisor = frequency / prescaler / (16 * baud_rate)`, truncated. The
/// realized baud rate is therefore always equal to or slightly above the
/// requested one, see [`calc_baud_rate`].
///
/// # Arguments
/// - `frequency`: The crystal frequency, typically [`CRYSTAL_FREQUENCY_HZ`].
/// - `prescaler`: The active clock prescaler.
/// - `baud_rate`: The desired baud rate.
pub fn calc_divisor(
    frequency: u32,
    prescaler: Prescaler,
    baud_rate: u32,
) -> Result<u16, InvalidBaudRateError> {
    let error = InvalidBaudRateError {
        frequency,
        baud_rate,
        prescaler,
    };

    let denominator = baud_rate.checked_mul(16).ok_or(error)?;
    if denominator == 0 {
        return Err(error);
    }

    match frequency / prescaler.factor() / denominator {
        // Faster than the baud rate generator can go.
        0 => Err(error),
        divisor => u16::try_from(divisor).map_err(|_| error),
    }
}

/// Calculates the baud rate a divisor actually produces.
///
/// Returns `0` for a divisor of `0`, which the chip treats as "stopped".
#[must_use]
pub const fn calc_baud_rate(frequency: u32, prescaler: Prescaler, divisor: u16) -> u32 {
    if divisor == 0 {
        return 0;
    }
    frequency / prescaler.factor() / (16 * divisor as u32)
}

/// Relative deviation of `actual` from `desired` in per mille.
#[must_use]
pub const fn baud_rate_error_permille(desired: u32, actual: u32) -> i32 {
    if desired == 0 {
        return 0;
    }
    ((actual as i64 - desired as i64) * 1000 / desired as i64) as i32
}

/// Exposes low-level information about the on-chip register layout and provides
/// types that model individual registers.
///
/// The getters and setters in this module operate exclusively on raw bit
/// representations within the local computing context. They are limited to
/// extracting or updating the corresponding fields and do not perform direct
/// hardware access.
pub mod registers {
    use crate::error::InvalidArgumentError;
    use bitflags::bitflags;

    /// Register addresses.
    ///
    /// On the wire, the address is shifted left by three bits (bits 1-2 select
    /// the channel, which is always `0` on the single channel SC16IS750).
    pub mod offsets {
        /// The highest valid register address.
        pub const MAX: u8 = 0x0F;

        /// Receive Holding Register (RHR), read side of the data register.
        pub const RHR: u8 = 0x00;
        /// Transmit Holding Register (THR), write side of the data register.
        pub const THR: u8 = 0x00;
        /// Interrupt Enable Register (IER).
        pub const IER: u8 = 0x01;
        /// FIFO Control Register (FCR). **Write-only**, reads return [`IIR`].
        pub const FCR: u8 = 0x02;
        /// Interrupt Identification Register (IIR). **Read-only**.
        pub const IIR: u8 = 0x02;
        /// Line Control Register (LCR).
        pub const LCR: u8 = 0x03;
        /// Modem Control Register (MCR).
        pub const MCR: u8 = 0x04;
        /// Line Status Register (LSR).
        pub const LSR: u8 = 0x05;
        /// Modem Status Register (MSR).
        pub const MSR: u8 = 0x06;
        /// Scratch Pad Register (SPR).
        pub const SPR: u8 = 0x07;
        /// Transmission Control Register (TCR), visible when `MCR[2] = 1`.
        pub const TCR: u8 = 0x06;
        /// Trigger Level Register (TLR), visible when `MCR[2] = 1`.
        pub const TLR: u8 = 0x07;
        /// Transmit FIFO Level register: free spaces in the TX FIFO.
        pub const TXLVL: u8 = 0x08;
        /// Receive FIFO Level register: characters in the RX FIFO.
        pub const RXLVL: u8 = 0x09;
        /// I/O pin direction register.
        pub const IODIR: u8 = 0x0A;
        /// I/O pin states register.
        pub const IOSTATE: u8 = 0x0B;
        /// I/O interrupt enable register.
        pub const IOINTENA: u8 = 0x0C;
        /// I/O pins control register.
        pub const IOCONTROL: u8 = 0x0E;
        /// Extra Features Control Register (EFCR).
        pub const EFCR: u8 = 0x0F;

        /// Registers accessible only when `LCR[7] = 1`.
        pub mod special {
            /// Divisor Latch, low byte.
            pub const DLL: u8 = 0x00;
            /// Divisor Latch, high byte.
            pub const DLH: u8 = 0x01;
        }

        /// Registers accessible only when `LCR = 0xBF`.
        pub mod enhanced {
            /// Enhanced Features Register (EFR).
            pub const EFR: u8 = 0x02;
            /// First XON character.
            pub const XON1: u8 = 0x04;
            /// Second XON character.
            pub const XON2: u8 = 0x05;
            /// First XOFF character.
            pub const XOFF1: u8 = 0x06;
            /// Second XOFF character.
            pub const XOFF2: u8 = 0x07;
        }
    }

    bitflags! {
        /// Typing of the Interrupt Enable Register (IER).
        ///
        /// Bits 4 to 7 can only be modified while [`EFR::ENHANCED_FUNCTIONS`]
        /// is set.
        ///
        /// This is a **read/write** register.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct IER: u8 {
            /// Enables the RX data available interrupt.
            const RHR_INTERRUPT = 1 << 0;
            /// Enables the THR empty interrupt.
            const THR_INTERRUPT = 1 << 1;
            /// Enables the receive line status interrupt.
            const RECEIVE_LINE_STATUS = 1 << 2;
            /// Enables the modem status interrupt.
            const MODEM_STATUS = 1 << 3;
            /// Puts the chip into sleep mode.
            ///
            /// The chip wakes up by itself on any activity on the RX line or
            /// when this bit is cleared.
            const SLEEP_MODE = 1 << 4;
            /// Enables the XOFF interrupt.
            const XOFF_INTERRUPT = 1 << 5;
            /// Enables the RTS interrupt.
            const RTS_INTERRUPT = 1 << 6;
            /// Enables the CTS interrupt.
            const CTS_INTERRUPT = 1 << 7;
        }
    }

    bitflags! {
        /// Typing of the FIFO Control Register (FCR).
        ///
        /// **Write-only** register at offset [`offsets::FCR`]. Reads from that
        /// address return the interrupt identification instead, so the driver
        /// keeps a shadow copy of the last written value.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct FCR: u8 {
            /// Enables the transmit and receive FIFOs.
            const FIFO_ENABLE = 1 << 0;
            /// Clears the contents of the receive FIFO. Self-clearing.
            const RX_FIFO_RESET = 1 << 1;
            /// Clears the contents of the transmit FIFO. Self-clearing.
            const TX_FIFO_RESET = 1 << 2;
            /// Reserved.
            const _RESERVED0 = 1 << 3;
            /// First bit of [`TxTriggerLevel`]. Requires
            /// [`EFR::ENHANCED_FUNCTIONS`].
            const TX_TRIGGER_LEVEL0 = 1 << 4;
            /// Second bit of [`TxTriggerLevel`]. Requires
            /// [`EFR::ENHANCED_FUNCTIONS`].
            const TX_TRIGGER_LEVEL1 = 1 << 5;
            /// First bit of [`RxTriggerLevel`].
            const RX_TRIGGER_LEVEL0 = 1 << 6;
            /// Second bit of [`RxTriggerLevel`].
            const RX_TRIGGER_LEVEL1 = 1 << 7;
        }
    }

    impl FCR {
        /// Returns the receive trigger level.
        #[must_use]
        pub const fn rx_trigger_level(self) -> RxTriggerLevel {
            RxTriggerLevel::from_raw_bits(self.bits() >> 6)
        }

        /// Sets the receive trigger level.
        #[must_use]
        pub fn set_rx_trigger_level(self, value: RxTriggerLevel) -> Self {
            let cleared = self - (Self::RX_TRIGGER_LEVEL0 | Self::RX_TRIGGER_LEVEL1);
            cleared | Self::from_bits_retain(value.to_raw_bits() << 6)
        }

        /// Returns the transmit trigger level.
        #[must_use]
        pub const fn tx_trigger_level(self) -> TxTriggerLevel {
            TxTriggerLevel::from_raw_bits(self.bits() >> 4)
        }

        /// Sets the transmit trigger level.
        #[must_use]
        pub fn set_tx_trigger_level(self, value: TxTriggerLevel) -> Self {
            let cleared = self - (Self::TX_TRIGGER_LEVEL0 | Self::TX_TRIGGER_LEVEL1);
            cleared | Self::from_bits_retain(value.to_raw_bits() << 4)
        }
    }

    /// Number of characters in the receive FIFO that trigger a receive
    /// interrupt, encoded in [`FCR`] bits 6 and 7.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub enum RxTriggerLevel {
        /// 8 characters.
        #[default]
        Eight,
        /// 16 characters.
        Sixteen,
        /// 56 characters.
        FiftySix,
        /// 60 characters.
        Sixty,
    }

    impl RxTriggerLevel {
        /// Translates the raw two bit encoding into the corresponding value.
        #[must_use]
        pub const fn from_raw_bits(bits: u8) -> Self {
            match bits & 0b11 {
                0b00 => Self::Eight,
                0b01 => Self::Sixteen,
                0b10 => Self::FiftySix,
                _ => Self::Sixty,
            }
        }

        /// Translates the value into the raw two bit encoding.
        #[must_use]
        pub const fn to_raw_bits(self) -> u8 {
            match self {
                Self::Eight => 0b00,
                Self::Sixteen => 0b01,
                Self::FiftySix => 0b10,
                Self::Sixty => 0b11,
            }
        }

        /// Returns the trigger level in characters.
        #[must_use]
        pub const fn characters(self) -> u8 {
            match self {
                Self::Eight => 8,
                Self::Sixteen => 16,
                Self::FiftySix => 56,
                Self::Sixty => 60,
            }
        }
    }

    impl TryFrom<u8> for RxTriggerLevel {
        type Error = InvalidArgumentError;

        fn try_from(characters: u8) -> Result<Self, Self::Error> {
            match characters {
                8 => Ok(Self::Eight),
                16 => Ok(Self::Sixteen),
                56 => Ok(Self::FiftySix),
                60 => Ok(Self::Sixty),
                other => Err(InvalidArgumentError::RxTriggerLevel(other)),
            }
        }
    }

    /// Number of free spaces in the transmit FIFO that trigger a transmit
    /// interrupt, encoded in [`FCR`] bits 4 and 5.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub enum TxTriggerLevel {
        /// 8 spaces.
        #[default]
        Eight,
        /// 16 spaces.
        Sixteen,
        /// 56 spaces.
        FiftySix,
        /// 60 spaces.
        Sixty,
    }

    impl TxTriggerLevel {
        /// Translates the raw two bit encoding into the corresponding value.
        #[must_use]
        pub const fn from_raw_bits(bits: u8) -> Self {
            match bits & 0b11 {
                0b00 => Self::Eight,
                0b01 => Self::Sixteen,
                0b10 => Self::FiftySix,
                _ => Self::Sixty,
            }
        }

        /// Translates the value into the raw two bit encoding.
        #[must_use]
        pub const fn to_raw_bits(self) -> u8 {
            match self {
                Self::Eight => 0b00,
                Self::Sixteen => 0b01,
                Self::FiftySix => 0b10,
                Self::Sixty => 0b11,
            }
        }

        /// Parses a number of spaces where `0` stands for "no transmit
        /// trigger level".
        pub const fn from_spaces(spaces: u8) -> Result<Option<Self>, InvalidArgumentError> {
            match spaces {
                0 => Ok(None),
                8 => Ok(Some(Self::Eight)),
                16 => Ok(Some(Self::Sixteen)),
                56 => Ok(Some(Self::FiftySix)),
                60 => Ok(Some(Self::Sixty)),
                other => Err(InvalidArgumentError::TxTriggerLevel(other)),
            }
        }
    }

    bitflags! {
        /// Typing of the Line Control Register (LCR).
        ///
        /// Configures the serial frame format and, via [`LCR::DIVISOR_LATCH`]
        /// and the [`LCR::ENHANCED_ACCESS`] sentinel, which register set is
        /// visible.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct LCR: u8 {
            /// First bit of [`WordLength`].
            const WORD_LENGTH0 = 1 << 0;
            /// Second bit of [`WordLength`].
            const WORD_LENGTH1 = 1 << 1;
            /// If set, two stop bits (1.5 with 5-bit words) are transmitted.
            const MORE_STOP_BITS = 1 << 2;
            /// First bit of [`Parity`], parity enable.
            const PARITY0 = 1 << 3;
            /// Second bit of [`Parity`], even parity.
            const PARITY1 = 1 << 4;
            /// Third bit of [`Parity`], forced parity.
            const PARITY2 = 1 << 5;
            /// Forces TX into the break (spacing) state while set.
            const SET_BREAK = 1 << 6;
            /// Divisor latch enable: exposes the special register set.
            const DIVISOR_LATCH = 1 << 7;
        }
    }

    impl LCR {
        /// The magic value that exposes the enhanced register set.
        pub const ENHANCED_ACCESS: Self = Self::from_bits_retain(0xBF);

        /// Returns the [`WordLength`].
        #[must_use]
        pub const fn word_length(self) -> WordLength {
            WordLength::from_raw_bits(self.bits())
        }

        /// Sets the [`WordLength`].
        #[must_use]
        pub fn set_word_length(self, value: WordLength) -> Self {
            let cleared = self - (Self::WORD_LENGTH0 | Self::WORD_LENGTH1);
            cleared | Self::from_bits_retain(value.to_raw_bits())
        }

        /// Returns the [`StopBits`].
        #[must_use]
        pub const fn stop_bits(self) -> StopBits {
            if self.contains(Self::MORE_STOP_BITS) {
                StopBits::Two
            } else {
                StopBits::One
            }
        }

        /// Sets the [`StopBits`].
        #[must_use]
        pub fn set_stop_bits(self, value: StopBits) -> Self {
            match value {
                StopBits::One => self - Self::MORE_STOP_BITS,
                StopBits::Two => self | Self::MORE_STOP_BITS,
            }
        }

        /// Returns the [`Parity`], or `None` for the forced parity encodings
        /// this driver does not configure.
        #[must_use]
        pub const fn parity(self) -> Option<Parity> {
            Parity::from_raw_bits(self.bits() >> 3)
        }

        /// Sets the [`Parity`].
        #[must_use]
        pub fn set_parity(self, value: Parity) -> Self {
            let cleared = self - (Self::PARITY0 | Self::PARITY1 | Self::PARITY2);
            cleared | Self::from_bits_retain(value.to_raw_bits() << 3)
        }
    }

    /// The length of words for the transmission and reception in [`LCR`].
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub enum WordLength {
        /// 5 data bits.
        FiveBits,
        /// 6 data bits.
        SixBits,
        /// 7 data bits.
        SevenBits,
        /// 8 data bits.
        #[default]
        EightBits,
    }

    impl WordLength {
        /// Translates the raw encoding into the corresponding value.
        ///
        /// This function operates on the value as-is and does not perform any
        /// shifting bits.
        #[must_use]
        pub const fn from_raw_bits(bits: u8) -> Self {
            match bits & 0b11 {
                0b00 => Self::FiveBits,
                0b01 => Self::SixBits,
                0b10 => Self::SevenBits,
                _ => Self::EightBits,
            }
        }

        /// Translates the value into the corresponding raw encoding.
        #[must_use]
        pub const fn to_raw_bits(self) -> u8 {
            match self {
                Self::FiveBits => 0b00,
                Self::SixBits => 0b01,
                Self::SevenBits => 0b10,
                Self::EightBits => 0b11,
            }
        }
    }

    impl TryFrom<u8> for WordLength {
        type Error = InvalidArgumentError;

        fn try_from(bits: u8) -> Result<Self, Self::Error> {
            match bits {
                5 => Ok(Self::FiveBits),
                6 => Ok(Self::SixBits),
                7 => Ok(Self::SevenBits),
                8 => Ok(Self::EightBits),
                other => Err(InvalidArgumentError::DataBits(other)),
            }
        }
    }

    /// Number of stop bits, [`LCR`] bit 2.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub enum StopBits {
        /// One stop bit.
        #[default]
        One,
        /// Two stop bits (1.5 for 5-bit words).
        Two,
    }

    impl TryFrom<u8> for StopBits {
        type Error = InvalidArgumentError;

        fn try_from(bits: u8) -> Result<Self, Self::Error> {
            match bits {
                1 => Ok(Self::One),
                2 => Ok(Self::Two),
                other => Err(InvalidArgumentError::StopBits(other)),
            }
        }
    }

    /// Parity of each transmitted word, [`LCR`] bits 3 to 5.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub enum Parity {
        /// No parity bit is transmitted nor expected.
        #[default]
        None,
        /// The number of bits including the parity bit must be odd.
        Odd,
        /// The number of bits including the parity bit must be even.
        Even,
    }

    impl Parity {
        /// Translates the raw three bit encoding into the corresponding value.
        ///
        /// Forced parity (`0b101`, `0b111`) has no representation.
        #[must_use]
        pub const fn from_raw_bits(bits: u8) -> Option<Self> {
            let bits = bits & 0b111;
            if bits & 1 == 0 {
                return Some(Self::None);
            }
            match bits {
                0b001 => Some(Self::Odd),
                0b011 => Some(Self::Even),
                _ => None,
            }
        }

        /// Translates the value into the raw three bit encoding.
        #[must_use]
        pub const fn to_raw_bits(self) -> u8 {
            match self {
                Self::None => 0b000,
                Self::Odd => 0b001,
                Self::Even => 0b011,
            }
        }
    }

    bitflags! {
        /// Typing of the Modem Control Register (MCR).
        ///
        /// Bits 2, 5, 6 and 7 can only be modified while
        /// [`EFR::ENHANCED_FUNCTIONS`] is set.
        ///
        /// This is a **read/write** register.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct MCR: u8 {
            /// Forces the DTR output low (active).
            ///
            /// Only has an effect when GPIO[7:4] are in modem mode.
            const DTR = 1 << 0;
            /// Forces the RTS output low (active).
            const RTS = 1 << 1;
            /// Exposes TCR and TLR at the MSR and SPR addresses.
            const TCR_TLR_ENABLE = 1 << 2;
            /// Reserved.
            const _RESERVED0 = 1 << 3;
            /// Internal loopback of TX to RX.
            const LOOPBACK = 1 << 4;
            /// Any received character resumes transmission after XOFF.
            const XON_ANY = 1 << 5;
            /// Switches the UART into IrDA mode.
            const IRDA_MODE = 1 << 6;
            /// Divides the crystal clock by four before the baud rate
            /// generator, see [`Prescaler`].
            ///
            /// [`Prescaler`]: crate::datasheet::Prescaler
            const CLOCK_DIVISOR = 1 << 7;
        }
    }

    bitflags! {
        /// Typing of the Line Status Register (LSR).
        ///
        /// This is a **read-only** register. Error bits 1 to 4 reflect the
        /// character at the top of the RX FIFO.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct LSR: u8 {
            /// At least one character waits in the RX FIFO.
            const DATA_IN_RECEIVER = 1 << 0;
            /// A character arrived while the RX FIFO was full.
            const OVERRUN_ERROR = 1 << 1;
            /// Parity error in the received character.
            const PARITY_ERROR = 1 << 2;
            /// The received character had no valid stop bit.
            const FRAMING_ERROR = 1 << 3;
            /// RX was held low for a whole character time.
            const BREAK_INTERRUPT = 1 << 4;
            /// The transmit holding register (or TX FIFO) is empty.
            const THR_EMPTY = 1 << 5;
            /// Both the THR and the transmit shift register are empty.
            const THR_TSR_EMPTY = 1 << 6;
            /// At least one character in the RX FIFO carries an error.
            const FIFO_DATA_ERROR = 1 << 7;
        }
    }

    bitflags! {
        /// Typing of the Modem Status Register (MSR).
        ///
        /// Bits 5 to 7 reflect modem pins only when GPIO[7:4] are configured
        /// for modem use ([`IOCONTROL::MODEM_PINS`]).
        ///
        /// This is a **read-only** register.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct MSR: u8 {
            /// CTS changed since the last read.
            const DELTA_CTS = 1 << 0;
            /// DSR changed since the last read.
            const DELTA_DSR = 1 << 1;
            /// RI changed from active to inactive.
            const DELTA_RI = 1 << 2;
            /// CD changed since the last read.
            const DELTA_CD = 1 << 3;
            /// Complement of the CTS input.
            const CTS = 1 << 4;
            /// Complement of the DSR input.
            const DSR = 1 << 5;
            /// Complement of the RI input.
            const RI = 1 << 6;
            /// Complement of the CD input.
            const CD = 1 << 7;
        }
    }

    bitflags! {
        /// Typing of the Enhanced Features Register (EFR).
        ///
        /// Only visible while the LCR holds [`LCR::ENHANCED_ACCESS`].
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct EFR: u8 {
            /// Receiver compares against XON2/XOFF2.
            const RX_XON2_XOFF2 = 1 << 0;
            /// Receiver compares against XON1/XOFF1.
            const RX_XON1_XOFF1 = 1 << 1;
            /// Transmitter sends XON2/XOFF2.
            const TX_XON2_XOFF2 = 1 << 2;
            /// Transmitter sends XON1/XOFF1.
            const TX_XON1_XOFF1 = 1 << 3;
            /// Unlocks IER[7:4], FCR[5:4] and MCR[7:5].
            const ENHANCED_FUNCTIONS = 1 << 4;
            /// Special character detection.
            const SPECIAL_CHAR_DETECT = 1 << 5;
            /// Automatic RTS flow control.
            const AUTO_RTS = 1 << 6;
            /// Automatic CTS flow control.
            const AUTO_CTS = 1 << 7;
        }
    }

    impl EFR {
        /// All software flow control bits.
        pub const SOFTWARE_FLOW_CONTROL: Self = Self::from_bits_retain(0x0F);
        /// Both automatic hardware flow control bits.
        pub const AUTO_FLOW_CONTROL: Self = Self::from_bits_retain(0xC0);
    }

    bitflags! {
        /// Typing of the I/O pins control register.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct IOCONTROL: u8 {
            /// Latches the input values of the GPIO pins.
            const IO_LATCH = 1 << 0;
            /// GPIO[7:4] act as the modem pins RI, CD, DTR and DSR.
            const MODEM_PINS = 1 << 1;
            /// Reserved.
            const _RESERVED0 = 1 << 2;
            /// Software reset. Self-clearing; the chip does not acknowledge
            /// the write.
            const SOFTWARE_RESET = 1 << 3;
            /// Reserved.
            const _RESERVED1 = 1 << 4;
            /// Reserved.
            const _RESERVED2 = 1 << 5;
            /// Reserved.
            const _RESERVED3 = 1 << 6;
            /// Reserved.
            const _RESERVED4 = 1 << 7;
        }
    }

    bitflags! {
        /// Typing of the Extra Features Control Register (EFCR).
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct EFCR: u8 {
            /// 9-bit (multidrop RS-485) mode.
            const MULTIDROP = 1 << 0;
            /// Disables the receiver.
            const RX_DISABLE = 1 << 1;
            /// Disables the transmitter.
            const TX_DISABLE = 1 << 2;
            /// Reserved.
            const _RESERVED0 = 1 << 3;
            /// RTS drives the RS-485 transceiver direction.
            const AUTO_RS485_RTS = 1 << 4;
            /// Inverts the RTS direction signal.
            const AUTO_RS485_RTS_INVERT = 1 << 5;
            /// Reserved.
            const _RESERVED1 = 1 << 6;
            /// Fast IrDA mode.
            const IRDA_FAST = 1 << 7;
        }
    }
}
