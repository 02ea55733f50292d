// SPDX-License-Identifier: MIT OR Apache-2.0

//! Register transport over I2C (Hardware Abstraction Layer (HAL)).
//!
//! Main exports:
//! - [`I2cBackend`]
//! - [`IoLock`]

use crate::datasheet::registers::offsets;
use crate::datasheet::LOCK_TIMEOUT_CYCLES;
use crate::error::{Error, InvalidArgumentError};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{I2c, SevenBitAddress};

/// Guard against register transactions while the chip is busy.
///
/// The chip ignores the bus for a few crystal cycles after a software reset
/// or a FIFO reset. While the lock is held, every register access first
/// waits, one chip cycle at a time, and gives up after
/// [`LOCK_TIMEOUT_CYCLES`] cycles without touching the bus.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct IoLock {
    state: LockState,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
enum LockState {
    #[default]
    Released,
    /// Releases itself after the given number of chip cycles.
    Settling(u32),
    /// Held until explicitly released.
    Held,
}

impl IoLock {
    /// Returns whether the lock is currently held.
    #[must_use]
    pub const fn is_held(&self) -> bool {
        !matches!(self.state, LockState::Released)
    }

    /// Holds the lock until [`IoLock::release`].
    pub fn hold(&mut self) {
        self.state = LockState::Held;
    }

    /// Holds the lock for the given number of chip cycles.
    ///
    /// Does not shorten an indefinite hold.
    pub fn hold_for(&mut self, cycles: u32) {
        match self.state {
            LockState::Held => {}
            LockState::Settling(remaining) if remaining >= cycles => {}
            _ if cycles == 0 => self.state = LockState::Released,
            _ => self.state = LockState::Settling(cycles),
        }
    }

    /// Releases the lock.
    pub fn release(&mut self) {
        self.state = LockState::Released;
    }

    /// Accounts for one elapsed chip cycle.
    fn tick(&mut self) {
        if let LockState::Settling(remaining) = self.state {
            self.state = match remaining {
                0 | 1 => LockState::Released,
                n => LockState::Settling(n - 1),
            };
        }
    }
}

/// Returns the duration of one crystal cycle in nanoseconds, rounded up.
pub(crate) const fn chip_cycle_ns(crystal_frequency: u32) -> u32 {
    if crystal_frequency == 0 {
        return 1;
    }
    let ns = 1_000_000_000_u32.div_ceil(crystal_frequency);
    if ns == 0 { 1 } else { ns }
}

fn check_offset(offset: u8) -> Result<(), InvalidArgumentError> {
    if offset > offsets::MAX {
        return Err(InvalidArgumentError::RegisterAddress(offset));
    }
    Ok(())
}

/// Register access of one SC16IS750 behind an I2C bus.
///
/// Owns the bus handle and a delay provider used for all waits of the
/// driver, which are multiples of one crystal cycle.
#[derive(Debug)]
pub struct I2cBackend<I2C, D> {
    i2c: I2C,
    delay: D,
    address: SevenBitAddress,
    cycle_ns: u32,
    lock: IoLock,
}

impl<I2C: I2c, D: DelayNs> I2cBackend<I2C, D> {
    /// Creates a new backend. Does not touch the bus.
    pub(crate) fn new(
        i2c: I2C,
        delay: D,
        address: SevenBitAddress,
        crystal_frequency: u32,
    ) -> Result<Self, InvalidArgumentError> {
        if address > 0x7F {
            return Err(InvalidArgumentError::DeviceAddress(address));
        }
        Ok(Self {
            i2c,
            delay,
            address,
            cycle_ns: chip_cycle_ns(crystal_frequency),
            lock: IoLock::default(),
        })
    }

    /// The 7-bit I2C address of the chip.
    pub(crate) const fn address(&self) -> SevenBitAddress {
        self.address
    }

    pub(crate) fn lock_mut(&mut self) -> &mut IoLock {
        &mut self.lock
    }

    pub(crate) const fn lock(&self) -> &IoLock {
        &self.lock
    }

    pub(crate) fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    /// Blocks for one crystal cycle.
    pub(crate) fn wait_cycle(&mut self) {
        self.delay.delay_ns(self.cycle_ns);
        self.lock.tick();
    }

    /// Waits for the I/O lock to be released.
    fn wait_for_lock(&mut self) -> Result<(), Error<I2C::Error>> {
        let mut waited = 0;
        while self.lock.is_held() {
            if waited >= LOCK_TIMEOUT_CYCLES {
                warn!(
                    "sc16is750@{:#04x}: I/O lock timeout, request aborted",
                    self.address
                );
                return Err(Error::LockTimeout);
            }
            self.wait_cycle();
            waited += 1;
        }
        Ok(())
    }

    /// Reads one byte from the specified register.
    ///
    /// This needs a mutable reference as reads can have side effects on the
    /// device, depending on the register (e.g., popping the RX FIFO).
    pub(crate) fn read_register(&mut self, offset: u8) -> Result<u8, Error<I2C::Error>> {
        check_offset(offset)?;
        self.wait_for_lock()?;

        let mut buffer = [0_u8];
        self.i2c
            .write_read(self.address, &[offset << 3], &mut buffer)
            .map_err(Error::NotConnected)?;
        trace!(
            "sc16is750@{:#04x}: read  {:#04x} = {:#04x} ({:#010b})",
            self.address,
            offset,
            buffer[0],
            buffer[0]
        );
        Ok(buffer[0])
    }

    /// Writes one byte to the specified register without reading it back.
    pub(crate) fn write_register(
        &mut self,
        offset: u8,
        value: u8,
    ) -> Result<(), Error<I2C::Error>> {
        check_offset(offset)?;
        self.wait_for_lock()?;

        trace!(
            "sc16is750@{:#04x}: write {:#04x} = {:#04x} ({:#010b})",
            self.address,
            offset,
            value,
            value
        );
        self.i2c
            .write(self.address, &[offset << 3, value])
            .map_err(Error::NotConnected)
    }

    /// Writes one byte to the specified register and reads it back.
    ///
    /// A differing read back is reported, not retried.
    pub(crate) fn write_register_verified(
        &mut self,
        offset: u8,
        value: u8,
    ) -> Result<(), Error<I2C::Error>> {
        self.write_register(offset, value)?;
        let read = self.read_register(offset)?;
        if read != value {
            warn!(
                "sc16is750@{:#04x}: read back {:#04x} from {:#04x} after writing {:#04x}",
                self.address,
                read,
                offset,
                value
            );
            return Err(Error::VerifyMismatch {
                register: offset,
                written: value,
                read,
            });
        }
        Ok(())
    }
}
