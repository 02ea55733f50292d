// SPDX-License-Identifier: MIT OR Apache-2.0

//! # sc16is750
//!
//! Low-level driver for the NXP [SC16IS750][datasheet], a single UART with a
//! 64 byte transmit and receive FIFO behind an I2C bus. Easy integration into
//! Rust while providing fine-grained control where needed.
//!
//! The driver is generic over [`embedded_hal::i2c::I2c`] and
//! [`embedded_hal::delay::DelayNs`], so it runs on every platform with an
//! `embedded-hal` 1.0 implementation, including Linux via `linux-embedded-hal`.
//! See [`Sc16is750`] to get started.
//!
//! ## Features
//!
//! - ✅ Full transmit and receive support, blocking and fail-fast
//! - ✅ `no_std`-compatible and allocation-free
//! - ✅ Baud rate, line format, FIFO, RS-485 multidrop and all flow control
//!   modes of the chip (none, XON/XOFF, host driven and automatic RTS/CTS)
//! - ✅ Safe switching between the general, special and enhanced register sets
//!   that share the same addresses
//! - ✅ [`embedded_io`] `Read`/`Write` implementations
//! - ✅ Optional diagnostic tracing of every register access via [`log`]
//!
//! ## Focus, Scope & Limitations
//!
//! Only the I2C interface and the UART function of the chip are covered. The
//! SPI interface, interrupts (other than the sleep mode bit) and the GPIO
//! pins, except for their use as modem control lines, are out of scope.
//!
//! [datasheet]: https://www.nxp.com/docs/en/data-sheet/SC16IS740_750_760.pdf

#![no_std]
#![deny(
    clippy::all,
    clippy::cargo,
    clippy::nursery,
    clippy::must_use_candidate,
    clippy::missing_safety_doc,
    clippy::undocumented_unsafe_blocks
)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

// Must come first: provides the diagnostic macros to all other modules.
pub mod diag;

pub mod datasheet;

mod backend;
mod config;
mod context;
mod error;
mod io;
mod setup;
mod status;

#[cfg(test)]
mod sim;

use crate::backend::I2cBackend;
use crate::context::SavedContext;
use crate::datasheet::registers::{offsets, EFCR, FCR, IER, IOCONTROL, LCR, LSR, MCR, MSR};
use crate::datasheet::{CRYSTAL_FREQUENCY_HZ, RESET_SETTLE_CYCLES};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

pub use crate::backend::IoLock;
pub use crate::config::{BaudRate, Config, FlowControl, SoftFlowControl};
pub use crate::context::{RegisterSet, RegisterSetGuard};
pub use crate::datasheet::registers::{Parity, RxTriggerLevel, StopBits, TxTriggerLevel, WordLength};
pub use crate::datasheet::{Prescaler, DEFAULT_I2C_ADDRESS};
pub use crate::error::*;
pub use crate::setup::BaudRateSettings;
pub use crate::status::{LineStatus, ModemStatus};

/// Scratch pad patterns of [`Sc16is750::ping`].
const PING_PATTERNS: [u8; 3] = [0xFF, 0xAA, 0x81];

/// Driver for one [SC16IS750][datasheet] behind an I2C bus.
///
/// All reads and writes involving device registers operate on the
/// underlying hardware; the handle only tracks what the chip cannot tell:
/// the entered register set, the value last written to the write-only
/// [`FCR`] and the [`IoLock`].
///
/// Most writes are verified, i.e., the register is read back and a
/// difference is reported as [`Error::VerifyMismatch`].
///
/// # Example
///
/// ```rust,no_run
/// use embedded_hal::delay::DelayNs;
/// use embedded_hal::i2c::I2c;
/// use sc16is750::{Config, Sc16is750, DEFAULT_I2C_ADDRESS};
///
/// fn hello<I2C: I2c, D: DelayNs>(i2c: I2C, delay: D) -> Option<()> {
///     let mut uart = Sc16is750::new(i2c, delay, DEFAULT_I2C_ADDRESS).ok()?;
///     uart.reset();
///     if !uart.ping() {
///         return None;
///     }
///     uart.connect(&Config::default()).ok()?;
///     for byte in b"hello world!" {
///         uart.transmit_byte(*byte, false).ok()?;
///     }
///     Some(())
/// }
/// ```
///
/// # Sending and Receiving Data
///
/// - [`Sc16is750::transmit_byte`]: send a single byte, optionally waiting
///   for space
/// - [`Sc16is750::send_bytes`]: send provided bytes without waiting and
///   return `n`
/// - [`Sc16is750::receive_byte`]: receive a single byte, optionally waiting
///   for data
/// - [`Sc16is750::receive_bytes`]: receive bytes into a buffer without
///   waiting and return `n`
/// - [`embedded_io::Read`] and [`embedded_io::Write`]
///
/// [datasheet]: https://www.nxp.com/docs/en/data-sheet/SC16IS740_750_760.pdf
#[derive(Debug)]
pub struct Sc16is750<I2C, D> {
    backend: I2cBackend<I2C, D>,
    crystal_frequency: u32,
    // The register set entered through `enter_context`.
    context: Option<SavedContext>,
    // FCR is write-only: reading its address yields IIR.
    fcr: FCR,
}

impl<I2C: I2c, D: DelayNs> Sc16is750<I2C, D> {
    /* ----- Construction --------------------------------------------------- */

    /// Creates a new handle for the chip at the given 7-bit address, clocked
    /// by the usual 14.7456 MHz crystal.
    ///
    /// Does not touch the bus. Call [`Self::reset`] and [`Self::ping`] next.
    pub fn new(i2c: I2C, delay: D, address: u8) -> Result<Self, InvalidArgumentError> {
        Self::with_crystal(i2c, delay, address, CRYSTAL_FREQUENCY_HZ)
    }

    /// Like [`Self::new`] but with a custom crystal frequency in Hz.
    pub fn with_crystal(
        i2c: I2C,
        delay: D,
        address: u8,
        crystal_frequency: u32,
    ) -> Result<Self, InvalidArgumentError> {
        let backend = I2cBackend::new(i2c, delay, address, crystal_frequency)?;
        Ok(Self {
            backend,
            crystal_frequency,
            context: None,
            fcr: FCR::empty(),
        })
    }

    /// Returns the 7-bit I2C address of the chip.
    #[must_use]
    pub const fn address(&self) -> u8 {
        self.backend.address()
    }

    /// Returns the crystal frequency in Hz.
    #[must_use]
    pub const fn crystal_frequency(&self) -> u32 {
        self.crystal_frequency
    }

    /// Consumes the handle and returns the I2C bus and the delay provider.
    ///
    /// An entered register set is not left.
    pub fn release(self) -> (I2C, D) {
        self.backend.release()
    }

    /* ----- Register Access ------------------------------------------------ */

    /// Reads a register of the currently selected register set.
    pub fn read_register(&mut self, offset: u8) -> Result<u8, Error<I2C::Error>> {
        self.backend.read_register(offset)
    }

    /// Writes a register and verifies the write by reading it back.
    pub fn write_register(&mut self, offset: u8, value: u8) -> Result<(), Error<I2C::Error>> {
        self.backend.write_register_verified(offset, value)
    }

    /// Writes a register without reading it back.
    ///
    /// Needed for registers that read back something else (THR, FCR) or that
    /// change their value on their own.
    pub fn write_register_unverified(
        &mut self,
        offset: u8,
        value: u8,
    ) -> Result<(), Error<I2C::Error>> {
        self.backend.write_register(offset, value)
    }

    /// Holds the [`IoLock`] until [`Self::unlock_io`]. Meanwhile, every
    /// register access fails with [`Error::LockTimeout`].
    pub fn lock_io(&mut self) {
        self.backend.lock_mut().hold();
    }

    /// Releases the [`IoLock`].
    pub fn unlock_io(&mut self) {
        self.backend.lock_mut().release();
    }

    /// Returns the current state of the [`IoLock`].
    #[must_use]
    pub const fn io_lock(&self) -> &IoLock {
        self.backend.lock()
    }

    /// Read-modify-write of a register with verification.
    fn update_register(
        &mut self,
        offset: u8,
        f: impl FnOnce(u8) -> u8,
    ) -> Result<(), Error<I2C::Error>> {
        let value = self.read_register(offset)?;
        self.write_register(offset, f(value))
    }

    /* ----- Typed Register Getters ----------------------------------------- */

    /// Fetches the current value from the [`IER`].
    pub fn ier(&mut self) -> Result<IER, Error<I2C::Error>> {
        self.read_register(offsets::IER).map(IER::from_bits_retain)
    }

    /// Returns the value last written to the [`FCR`].
    ///
    /// The register itself is write-only. The self-clearing FIFO reset bits
    /// are never part of the value.
    #[must_use]
    pub const fn fcr(&self) -> FCR {
        self.fcr
    }

    /// Fetches the current value from the [`LCR`].
    pub fn lcr(&mut self) -> Result<LCR, Error<I2C::Error>> {
        self.read_register(offsets::LCR).map(LCR::from_bits_retain)
    }

    /// Fetches the current value from the [`MCR`].
    pub fn mcr(&mut self) -> Result<MCR, Error<I2C::Error>> {
        self.read_register(offsets::MCR).map(MCR::from_bits_retain)
    }

    /// Fetches the current value from the [`LSR`].
    pub fn lsr(&mut self) -> Result<LSR, Error<I2C::Error>> {
        self.read_register(offsets::LSR).map(LSR::from_bits_retain)
    }

    /// Fetches the current value from the [`MSR`].
    ///
    /// Reading clears the delta bits.
    pub fn msr(&mut self) -> Result<MSR, Error<I2C::Error>> {
        self.read_register(offsets::MSR).map(MSR::from_bits_retain)
    }

    /// Fetches the current value from the [`IOCONTROL`].
    pub fn iocontrol(&mut self) -> Result<IOCONTROL, Error<I2C::Error>> {
        self.read_register(offsets::IOCONTROL)
            .map(IOCONTROL::from_bits_retain)
    }

    /// Fetches the current value from the [`EFCR`].
    pub fn efcr(&mut self) -> Result<EFCR, Error<I2C::Error>> {
        self.read_register(offsets::EFCR).map(EFCR::from_bits_retain)
    }

    /* ----- Chip Control --------------------------------------------------- */

    /// Resets the chip via the software reset bit of [`IOCONTROL`].
    ///
    /// All registers return to their defaults. The chip does not acknowledge
    /// the write that triggers the reset, so bus errors are ignored and this
    /// never fails. Afterwards, the [`IoLock`] is held for
    /// [`RESET_SETTLE_CYCLES`] chip cycles.
    pub fn reset(&mut self) {
        let iocontrol = self.iocontrol().unwrap_or_default();
        let request = iocontrol | IOCONTROL::SOFTWARE_RESET;
        if let Err(e) = self
            .backend
            .write_register(offsets::IOCONTROL, request.bits())
        {
            trace!("software reset not acknowledged (expected): {:?}", e);
        }
        self.context = None;
        self.fcr = FCR::empty();
        self.backend.lock_mut().hold_for(RESET_SETTLE_CYCLES);
        debug!("sc16is750@{:#04x}: software reset", self.address());
    }

    /// Checks whether the chip is present and the bus works.
    ///
    /// Writes a few patterns to the scratch pad register and reads them
    /// back. Returns `true` only if all of them round-trip; a bus error
    /// counts as failure.
    pub fn ping(&mut self) -> bool {
        let alive = PING_PATTERNS.iter().all(|&pattern| {
            self.backend.write_register(offsets::SPR, pattern).is_ok()
                && matches!(self.backend.read_register(offsets::SPR), Ok(read) if read == pattern)
        });
        debug!("sc16is750@{:#04x}: ping {}", self.address(), alive);
        alive
    }

    /// Puts the chip into sleep mode.
    ///
    /// Fails with [`InvalidStateError::RxDataPending`] if the receive FIFO
    /// holds data, unless `discard_rx_buffer` is set, in which case the FIFO
    /// is flushed. Fails with [`InvalidStateError::TxDataPending`] while
    /// anything is left to transmit.
    ///
    /// Sleep mode requires the enhanced functions, which are enabled on the
    /// way.
    pub fn sleep(&mut self, discard_rx_buffer: bool) -> Result<(), Error<I2C::Error>> {
        if self.rx_buffer_used()? > 0 {
            if !discard_rx_buffer {
                return Err(InvalidStateError::RxDataPending.into());
            }
            self.reset_rx_fifo()?;
        }
        if !self.line_status()?.thr_tsr_empty {
            return Err(InvalidStateError::TxDataPending.into());
        }

        self.set_enhanced_functions(true)?;
        self.update_register(offsets::IER, |ier| {
            (IER::from_bits_retain(ier) | IER::SLEEP_MODE).bits()
        })?;
        debug!("sc16is750@{:#04x}: sleeping", self.address());
        Ok(())
    }

    /// Returns whether sleep mode is requested.
    pub fn sleep_state(&mut self) -> Result<bool, Error<I2C::Error>> {
        Ok(self.ier()?.contains(IER::SLEEP_MODE))
    }

    /// Leaves sleep mode. Does nothing if the chip is awake.
    pub fn wake(&mut self) -> Result<(), Error<I2C::Error>> {
        if !self.sleep_state()? {
            return Ok(());
        }
        self.update_register(offsets::IER, |ier| {
            (IER::from_bits_retain(ier) - IER::SLEEP_MODE).bits()
        })?;
        debug!("sc16is750@{:#04x}: awake", self.address());
        Ok(())
    }

    /* ----- Data Path ------------------------------------------------------ */

    /// Returns the number of characters in the receive FIFO (0 to 64).
    pub fn rx_buffer_used(&mut self) -> Result<u8, Error<I2C::Error>> {
        self.read_register(offsets::RXLVL)
    }

    /// Returns the number of free spaces in the transmit FIFO (0 to 64).
    pub fn tx_buffer_available(&mut self) -> Result<u8, Error<I2C::Error>> {
        self.read_register(offsets::TXLVL)
    }

    /// Writes a byte to the transmit FIFO.
    ///
    /// If the FIFO is full, fails with [`Error::NoBufferSpace`] when
    /// `fail_if_no_space` is set and otherwise polls, once per chip cycle and
    /// without timeout, until the transmit holding register is empty.
    pub fn transmit_byte(
        &mut self,
        byte: u8,
        fail_if_no_space: bool,
    ) -> Result<(), Error<I2C::Error>> {
        if self.tx_buffer_available()? == 0 {
            if fail_if_no_space {
                return Err(Error::NoBufferSpace);
            }
            while !self.lsr()?.contains(LSR::THR_EMPTY) {
                self.backend.wait_cycle();
            }
        }
        self.backend.write_register(offsets::THR, byte)
    }

    /// Reads a byte from the receive FIFO.
    ///
    /// If the FIFO is empty, fails with [`Error::NoBufferData`] when
    /// `fail_if_no_data` is set and otherwise polls, once per chip cycle and
    /// without timeout, until a byte arrives.
    pub fn receive_byte(&mut self, fail_if_no_data: bool) -> Result<u8, Error<I2C::Error>> {
        if self.rx_buffer_used()? == 0 {
            if fail_if_no_data {
                return Err(Error::NoBufferData);
            }
            while self.rx_buffer_used()? == 0 {
                self.backend.wait_cycle();
            }
        }
        self.read_register(offsets::RHR)
    }

    /// Tries to send bytes to the remote without waiting.
    ///
    /// This function returns the number of bytes that have been written to
    /// the transmit FIFO. It stops at the first byte that does not fit or
    /// fails.
    pub fn send_bytes(&mut self, buffer: &[u8]) -> usize {
        buffer
            .iter()
            .map_while(|byte: &u8| self.transmit_byte(*byte, true).ok())
            .count()
    }

    /// Tries to receive bytes from the device and writes them into the
    /// provided buffer without waiting.
    ///
    /// This function returns the number of bytes that have been received and
    /// put into the buffer.
    pub fn receive_bytes(&mut self, buffer: &mut [u8]) -> usize {
        buffer
            .iter_mut()
            .map_while(|slot: &mut u8| {
                self.receive_byte(true).ok().map(|byte| {
                    *slot = byte;
                })
            })
            .count()
    }

    /// Waits until the transmit holding and shift registers are empty.
    pub fn wait_tx_empty(&mut self) -> Result<(), Error<I2C::Error>> {
        while !self.lsr()?.contains(LSR::THR_TSR_EMPTY) {
            self.backend.wait_cycle();
        }
        Ok(())
    }

    /// Returns the decoded [`LSR`].
    ///
    /// Reading clears the error bits of the chip.
    pub fn line_status(&mut self) -> Result<LineStatus, Error<I2C::Error>> {
        self.lsr().map(LineStatus::from)
    }

    /// Returns the decoded [`MSR`].
    ///
    /// DSR, RI and CD levels are only reported while GPIO[7:4] are used as
    /// modem pins, see [`Self::set_modem_flow_pins`].
    pub fn modem_status(&mut self) -> Result<ModemStatus, Error<I2C::Error>> {
        let modem_pins = self.modem_flow_pins()?;
        let msr = self.msr()?;
        Ok(ModemStatus::new(msr, modem_pins))
    }

    /// Starts (`true`) or stops (`false`) sending a break condition.
    pub fn set_line_break(&mut self, active: bool) -> Result<(), Error<I2C::Error>> {
        let lcr = self.general_lcr()?;
        let lcr = if active {
            lcr | LCR::SET_BREAK
        } else {
            lcr - LCR::SET_BREAK
        };
        self.write_register(offsets::LCR, lcr.bits())
    }

    /// Drives RTS low (active, `true`) or high (`false`).
    ///
    /// Requires GPIO[7:4] in modem mode; fails with
    /// [`InvalidStateError::ModemPinsDisabled`] otherwise.
    pub fn set_rts(&mut self, low: bool) -> Result<(), Error<I2C::Error>> {
        self.set_modem_output(MCR::RTS, low)
    }

    /// Drives DTR low (active, `true`) or high (`false`).
    ///
    /// Requires GPIO[7:4] in modem mode; fails with
    /// [`InvalidStateError::ModemPinsDisabled`] otherwise.
    pub fn set_dtr(&mut self, low: bool) -> Result<(), Error<I2C::Error>> {
        self.set_modem_output(MCR::DTR, low)
    }

    fn set_modem_output(&mut self, bit: MCR, low: bool) -> Result<(), Error<I2C::Error>> {
        if !self.modem_flow_pins()? {
            return Err(InvalidStateError::ModemPinsDisabled.into());
        }
        self.update_register(offsets::MCR, |mcr| {
            let mcr = MCR::from_bits_retain(mcr);
            let mcr = if low { mcr | bit } else { mcr - bit };
            mcr.bits()
        })
    }

    /* ----- Facade --------------------------------------------------------- */

    /// Configures the UART according to the provided [`Config`]: multidrop
    /// mode, baud rate, line format, FIFOs (receive trigger at 8 characters)
    /// and flow control, in that order.
    ///
    /// Stops at the first step that fails and reports it. Steps before stay
    /// applied.
    pub fn connect(&mut self, config: &Config) -> Result<(), ConnectError<I2C::Error>> {
        debug!("sc16is750@{:#04x}: connecting with {:?}", self.address(), config);
        self.set_multidrop_mode(config.rs485)
            .map_err(at(ConnectStep::MultidropMode))?;
        self.set_baud_rate(config.baud_rate)
            .map_err(at(ConnectStep::BaudRate))?;
        self.set_line_format(config.data_bits, config.parity, config.stop_bits)
            .map_err(at(ConnectStep::LineFormat))?;
        self.set_fifo(true, RxTriggerLevel::Eight, None)
            .map_err(at(ConnectStep::Fifo))?;
        self.set_flow_control(&config.flow_control)
            .map_err(at(ConnectStep::FlowControl))?;
        Ok(())
    }
}

/// Attaches the failed step to an error of [`Sc16is750::connect`].
fn at<E>(step: ConnectStep) -> impl FnOnce(Error<E>) -> ConnectError<E> {
    move |error| ConnectError { step, error }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{CountingDelay, SimChip, SimError};
    use std::vec::Vec;

    type Chip = Sc16is750<SimChip, CountingDelay>;

    fn chip() -> Chip {
        Sc16is750::new(SimChip::new(), CountingDelay::default(), DEFAULT_I2C_ADDRESS).unwrap()
    }

    fn chip_with(setup: impl FnOnce(&mut SimChip)) -> Chip {
        let mut sim = SimChip::new();
        setup(&mut sim);
        Sc16is750::new(sim, CountingDelay::default(), DEFAULT_I2C_ADDRESS).unwrap()
    }

    #[test]
    fn test_new_rejects_8bit_address() {
        let result = Sc16is750::new(SimChip::new(), CountingDelay::default(), 0x90);
        assert_eq!(result.err(), Some(InvalidArgumentError::DeviceAddress(0x90)));
    }

    #[test]
    fn test_ping() {
        let mut uart = chip();
        assert!(uart.ping());
        let (sim, _) = uart.release();
        let written = sim
            .writes()
            .iter()
            .map(|&(_, value)| value)
            .collect::<Vec<_>>();
        assert_eq!(written, PING_PATTERNS);
    }

    #[test]
    fn test_ping_detects_stuck_bit() {
        // 0xFF and 0xAA have bit 1 set, only 0x81 notices.
        let mut uart = chip_with(|sim| sim.stick_bits_high(offsets::SPR, 0x02));
        assert!(!uart.ping());
    }

    #[test]
    fn test_ping_disconnected() {
        let mut uart = chip_with(SimChip::disconnect);
        assert!(!uart.ping());
    }

    #[test]
    fn test_reset_ignores_nak_and_settles() {
        let mut uart = chip_with(|sim| sim.set_register(offsets::LCR, 0x03));
        uart.reset();
        assert!(uart.io_lock().is_held());
        assert_eq!(uart.fcr(), FCR::empty());
        assert_eq!(uart.register_set(), RegisterSet::General);

        // The next access waits out the settle window.
        assert_eq!(uart.lcr(), Ok(LCR::from_bits_retain(0x1D)));
        assert!(!uart.io_lock().is_held());
        let (sim, delay) = uart.release();
        assert_eq!(sim.resets(), 1);
        assert_eq!(delay.calls, RESET_SETTLE_CYCLES);
    }

    #[test]
    fn test_reset_disconnected_does_not_fail() {
        let mut uart = chip_with(SimChip::disconnect);
        uart.reset();
        let (sim, _) = uart.release();
        assert_eq!(sim.resets(), 0);
    }

    #[test]
    fn test_held_lock_blocks_all_traffic() {
        let mut uart = chip();
        uart.lock_io();
        assert_eq!(uart.lcr(), Err(Error::LockTimeout));
        assert_eq!(uart.transmit_byte(0x55, true), Err(Error::LockTimeout));
        assert!(!uart.ping());
        uart.unlock_io();
        assert!(uart.ping());
    }

    #[test]
    fn test_sleep_and_wake() {
        let mut uart = chip();
        assert_eq!(uart.sleep_state(), Ok(false));
        uart.wake().unwrap();

        uart.sleep(false).unwrap();
        assert_eq!(uart.sleep_state(), Ok(true));
        assert!(uart.ier().unwrap().contains(IER::SLEEP_MODE));

        uart.wake().unwrap();
        assert_eq!(uart.sleep_state(), Ok(false));
        let (sim, _) = uart.release();
        assert_eq!(sim.efr() & 0x10, 0x10);
        assert_eq!(sim.register(offsets::LCR), 0x1D);
    }

    #[test]
    fn test_sleep_with_rx_data() {
        let mut uart = chip_with(|sim| sim.push_rx(b"abc"));
        assert_eq!(
            uart.sleep(false),
            Err(Error::InvalidState(InvalidStateError::RxDataPending))
        );
        assert_eq!(uart.sleep_state(), Ok(false));

        uart.sleep(true).unwrap();
        assert_eq!(uart.sleep_state(), Ok(true));
        assert_eq!(uart.rx_buffer_used(), Ok(0));
    }

    #[test]
    fn test_sleep_with_tx_data() {
        let mut uart = chip_with(|sim| sim.set_lsr(0x20));
        assert_eq!(
            uart.sleep(true),
            Err(Error::InvalidState(InvalidStateError::TxDataPending))
        );
        assert_eq!(uart.sleep_state(), Ok(false));
    }

    #[test]
    fn test_transmit_fail_fast_without_delay() {
        let mut uart = chip_with(|sim| sim.tx_full_for(1));
        assert_eq!(uart.transmit_byte(b'x', true), Err(Error::NoBufferSpace));
        let (sim, delay) = uart.release();
        assert!(sim.sent().is_empty());
        assert_eq!(delay.calls, 0);
    }

    #[test]
    fn test_transmit_blocks_until_drained() {
        let mut uart = chip_with(|sim| sim.tx_full_for(3));
        uart.transmit_byte(b'x', false).unwrap();
        let (sim, delay) = uart.release();
        assert_eq!(sim.sent(), b"x");
        assert_eq!(delay.calls, 2);
    }

    #[test]
    fn test_receive_fail_fast() {
        let mut uart = chip();
        assert_eq!(uart.receive_byte(true), Err(Error::NoBufferData));
        let (_, delay) = uart.release();
        assert_eq!(delay.calls, 0);
    }

    #[test]
    fn test_receive_blocks_until_data() {
        let mut uart = chip_with(|sim| sim.rx_arrives_after(3, &[0x42]));
        assert_eq!(uart.receive_byte(false), Ok(0x42));
        let (sim, delay) = uart.release();
        assert_eq!(sim.rx_len(), 0);
        assert_eq!(delay.calls, 1);
    }

    #[test]
    fn test_bulk_helpers() {
        let mut uart = chip_with(|sim| sim.push_rx(b"hi"));
        assert_eq!(uart.send_bytes(b"hello"), 5);

        let mut buffer = [0; 4];
        assert_eq!(uart.receive_bytes(&mut buffer), 2);
        assert_eq!(&buffer[..2], b"hi");

        let (sim, _) = uart.release();
        assert_eq!(sim.sent(), b"hello");
    }

    #[test]
    fn test_buffer_levels() {
        let mut uart = chip_with(|sim| sim.push_rx(&[0; 10]));
        assert_eq!(uart.rx_buffer_used(), Ok(10));
        assert_eq!(uart.tx_buffer_available(), Ok(64));
    }

    #[test]
    fn test_line_status() {
        let mut uart = chip_with(|sim| sim.set_lsr(0b0010_0001));
        let status = uart.line_status().unwrap();
        let set = status
            .flags()
            .filter(|(_, value)| *value)
            .map(|(name, _)| name)
            .collect::<Vec<_>>();
        assert_eq!(set, ["data-in-receiver", "thr-empty"]);
    }

    #[test]
    fn test_modem_status_follows_modem_pins() {
        let mut uart = chip_with(|sim| sim.set_register(offsets::MSR, 0xF1));
        let status = uart.modem_status().unwrap();
        assert!(status.cts_delta && status.cts_high);
        assert_eq!(status.dsr_high, None);

        uart.set_modem_flow_pins(true).unwrap();
        let status = uart.modem_status().unwrap();
        assert_eq!(status.dsr_high, Some(true));
        assert_eq!(status.cd_high, Some(true));
    }

    #[test]
    fn test_rts_dtr_need_modem_pins() {
        let mut uart = chip();
        assert_eq!(
            uart.set_rts(true),
            Err(Error::InvalidState(InvalidStateError::ModemPinsDisabled))
        );
        assert_eq!(
            uart.set_dtr(true),
            Err(Error::InvalidState(InvalidStateError::ModemPinsDisabled))
        );

        uart.set_modem_flow_pins(true).unwrap();
        uart.set_rts(true).unwrap();
        uart.set_dtr(true).unwrap();
        assert_eq!(uart.mcr(), Ok(MCR::RTS | MCR::DTR));
        uart.set_rts(false).unwrap();
        assert_eq!(uart.mcr(), Ok(MCR::DTR));
    }

    #[test]
    fn test_line_break() {
        let mut uart = chip_with(|sim| sim.set_register(offsets::LCR, 0x03));
        uart.set_line_break(true).unwrap();
        assert_eq!(uart.lcr(), Ok(LCR::from_bits_retain(0x43)));
        uart.set_line_break(false).unwrap();
        assert_eq!(uart.lcr(), Ok(LCR::from_bits_retain(0x03)));
    }

    #[test]
    fn test_line_break_refused_in_enhanced_set() {
        let mut uart = chip_with(|sim| sim.set_register(offsets::LCR, 0xBF));
        assert_eq!(
            uart.set_line_break(true),
            Err(Error::InvalidState(InvalidStateError::EnhancedRegisterSetActive))
        );
    }

    #[test]
    fn test_connect_default() {
        let mut uart = chip();
        uart.connect(&Config::default()).unwrap();
        assert!(uart.fcr().contains(FCR::FIFO_ENABLE));

        let (sim, _) = uart.release();
        assert_eq!(sim.register(offsets::LCR), 0x03);
        assert_eq!(sim.fcr() & 0x01, 0x01);
        assert_eq!(sim.divisor(), 96);
        assert_eq!(sim.register(offsets::EFCR) & 0x01, 0x00);
        assert_eq!(sim.efr() & 0xCF, 0x00);
        assert_eq!(sim.xon_xoff(), [0; 4]);
    }

    #[test]
    fn test_connect_with_divisor_latch_left_selected() {
        let mut uart = chip_with(|sim| sim.set_register(offsets::LCR, 0x83));
        uart.connect(&Config::default()).unwrap();

        let (sim, _) = uart.release();
        assert_eq!(sim.register(offsets::LCR), 0x03);
        assert_eq!(sim.divisor(), 96);
    }

    #[test]
    fn test_connect_rs485_auto_flow_control() {
        let mut uart = chip();
        let config = Config {
            baud_rate: BaudRate::Baud115200,
            parity: Parity::Even,
            stop_bits: StopBits::Two,
            flow_control: FlowControl::AutoHardware,
            rs485: true,
            ..Config::default()
        };
        uart.connect(&config).unwrap();

        let (sim, _) = uart.release();
        assert_eq!(sim.register(offsets::LCR), 0x1F);
        assert_eq!(sim.divisor(), 8);
        assert_eq!(sim.register(offsets::EFCR) & 0x01, 0x01);
        assert_eq!(sim.efr() & 0xC0, 0xC0);
        assert_eq!(sim.register(offsets::IOCONTROL) & 0x02, 0x02);
    }

    #[test]
    fn test_connect_reports_failing_step() {
        let mut uart = chip();
        let config = Config {
            baud_rate: BaudRate::Custom(0),
            ..Config::default()
        };
        let error = uart.connect(&config).unwrap_err();
        assert_eq!(error.step, ConnectStep::BaudRate);
        assert!(matches!(
            error.error,
            Error::InvalidArgument(InvalidArgumentError::BaudRate(_))
        ));

        let mut uart = chip_with(SimChip::disconnect);
        let error = uart.connect(&Config::default()).unwrap_err();
        assert_eq!(error.step, ConnectStep::MultidropMode);
        assert_eq!(error.error, Error::NotConnected(SimError::Nak));
    }
}
