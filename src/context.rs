// SPDX-License-Identifier: MIT OR Apache-2.0

//! Switching between the general, special and enhanced register sets.
//!
//! Addresses `0x00` to `0x07` are shared by up to three registers. Which one
//! is addressed depends on the value of the [`LCR`], so the LCR doubles as a
//! bank selector. Entering a register set saves the current LCR and exiting
//! restores it; an unbalanced pair would leave every following register
//! access pointing at the wrong register.
//!
//! The saved state lives in the [`Sc16is750`] handle and is only changed
//! through [`Sc16is750::enter_context`], [`Sc16is750::exit_context`] and the
//! returned [`RegisterSetGuard`], which restores the LCR when dropped.

use crate::datasheet::registers::{offsets, LCR};
use crate::error::{Error, InvalidArgumentError, InvalidStateError};
use crate::Sc16is750;
use core::ops::{Deref, DerefMut};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

/// The register set currently addressable through the shared addresses.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum RegisterSet {
    /// The general register set (`LCR[7] = 0`).
    #[default]
    General,
    /// The divisor latch registers DLL and DLH (`LCR[7] = 1`).
    Special,
    /// EFR and the XON/XOFF characters (`LCR = 0xBF`).
    Enhanced,
}

impl RegisterSet {
    /// Returns the register set the given LCR value selects.
    #[must_use]
    pub fn from_lcr(lcr: LCR) -> Self {
        if lcr == LCR::ENHANCED_ACCESS {
            Self::Enhanced
        } else if lcr.contains(LCR::DIVISOR_LATCH) {
            Self::Special
        } else {
            Self::General
        }
    }
}

/// A register set entered by the driver and the LCR value to restore.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct SavedContext {
    pub(crate) set: RegisterSet,
    pub(crate) lcr: LCR,
}

/// Scoped access to the special or enhanced register set.
///
/// Dereferences to the [`Sc16is750`] so all register operations remain
/// available. Call [`RegisterSetGuard::finish`] to restore the LCR and learn
/// whether that worked; if the guard is dropped instead (e.g., on an early
/// return with `?`), the LCR is restored on a best effort basis.
#[derive(Debug)]
pub struct RegisterSetGuard<'a, I2C: I2c, D: DelayNs> {
    chip: &'a mut Sc16is750<I2C, D>,
}

impl<I2C: I2c, D: DelayNs> RegisterSetGuard<'_, I2C, D> {
    /// Leaves the register set and restores the saved LCR value.
    pub fn finish(self) -> Result<(), Error<I2C::Error>> {
        // Drop finds no context left and does nothing.
        self.chip.exit_context()
    }
}

impl<I2C: I2c, D: DelayNs> Deref for RegisterSetGuard<'_, I2C, D> {
    type Target = Sc16is750<I2C, D>;

    fn deref(&self) -> &Self::Target {
        self.chip
    }
}

impl<I2C: I2c, D: DelayNs> DerefMut for RegisterSetGuard<'_, I2C, D> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.chip
    }
}

impl<I2C: I2c, D: DelayNs> Drop for RegisterSetGuard<'_, I2C, D> {
    fn drop(&mut self) {
        if self.chip.context.is_none() {
            return;
        }
        if let Err(e) = self.chip.exit_context() {
            warn!("failed to restore LCR when leaving register set: {:?}", e);
        }
    }
}

impl<I2C: I2c, D: DelayNs> Sc16is750<I2C, D> {
    /// Returns the register set the driver has entered.
    #[must_use]
    pub fn register_set(&self) -> RegisterSet {
        self.context.map_or(RegisterSet::General, |saved| saved.set)
    }

    /// Exposes the special or the enhanced register set.
    ///
    /// Reads and saves the current LCR, then writes the selector value:
    /// `LCR | 0x80` for [`RegisterSet::Special`], `0xBF` for
    /// [`RegisterSet::Enhanced`]. An LCR that already has the divisor latch
    /// bit set, e.g. after an interrupted sequence, is saved with that bit
    /// cleared, so leaving the context returns to the general register set.
    ///
    /// Fails with [`InvalidStateError::ContextAlreadyEntered`] if a register
    /// set is already entered (there is no nesting), and with
    /// [`InvalidStateError::ForeignRegisterSet`] if the LCR holds `0xBF`, or
    /// holds `0x3F` and the special set is requested: `0x3F | 0x80` selects
    /// the enhanced set instead.
    pub fn enter_context(
        &mut self,
        target: RegisterSet,
    ) -> Result<RegisterSetGuard<'_, I2C, D>, Error<I2C::Error>> {
        if target == RegisterSet::General {
            return Err(InvalidArgumentError::GeneralRegisterSet.into());
        }
        if self.context.is_some() {
            return Err(InvalidStateError::ContextAlreadyEntered.into());
        }

        let current = self.lcr()?;
        if current == LCR::ENHANCED_ACCESS {
            return Err(InvalidStateError::ForeignRegisterSet(current.bits()).into());
        }
        let lcr = current - LCR::DIVISOR_LATCH;
        if lcr != current {
            debug!(
                "LCR={:#04x} left in divisor latch mode, restoring {:#04x} on exit",
                current.bits(),
                lcr.bits()
            );
        }

        let selector = if target == RegisterSet::Enhanced {
            LCR::ENHANCED_ACCESS
        } else {
            lcr | LCR::DIVISOR_LATCH
        };
        if target == RegisterSet::Special && selector == LCR::ENHANCED_ACCESS {
            return Err(InvalidStateError::ForeignRegisterSet(current.bits()).into());
        }
        if selector != current {
            if let Err(e) = self
                .backend
                .write_register_verified(offsets::LCR, selector.bits())
            {
                // Don't leave the chip half switched.
                if let Err(rollback) = self.backend.write_register(offsets::LCR, current.bits()) {
                    warn!("failed to roll back LCR after failed switch: {:?}", rollback);
                }
                return Err(e);
            }
        }

        trace!("entered {:?} register set, saved LCR={:#04x}", target, lcr.bits());
        self.context = Some(SavedContext { set: target, lcr });
        Ok(RegisterSetGuard { chip: self })
    }

    /// Restores the LCR saved by [`Sc16is750::enter_context`].
    ///
    /// The saved state is cleared even if the write fails.
    pub fn exit_context(&mut self) -> Result<(), Error<I2C::Error>> {
        let saved = self
            .context
            .take()
            .ok_or(InvalidStateError::NoContextEntered)?;
        trace!(
            "leaving {:?} register set, restoring LCR={:#04x}",
            saved.set,
            saved.lcr.bits()
        );
        self.backend
            .write_register_verified(offsets::LCR, saved.lcr.bits())
    }
}
