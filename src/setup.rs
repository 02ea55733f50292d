// SPDX-License-Identifier: MIT OR Apache-2.0

//! UART configuration: baud rate, line format, FIFOs, RS-485 and flow
//! control.

use crate::config::{BaudRate, FlowControl, SoftFlowControl};
use crate::context::RegisterSet;
use crate::datasheet::registers::offsets::{enhanced, special};
use crate::datasheet::registers::{
    offsets, Parity, RxTriggerLevel, StopBits, TxTriggerLevel, WordLength, EFCR, EFR, FCR, IER,
    IOCONTROL, LCR,
};
use crate::datasheet::{
    baud_rate_error_permille, calc_baud_rate, calc_divisor, Prescaler, RESET_SETTLE_CYCLES,
};
use crate::error::{Error, InvalidArgumentError, InvalidStateError};
use crate::Sc16is750;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

/// What [`Sc16is750::set_baud_rate`] programmed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BaudRateSettings {
    /// The value written to DLL and DLH.
    pub divisor: u16,
    /// The prescaler that was active.
    pub prescaler: Prescaler,
    /// The baud rate the divisor actually produces.
    pub actual: u32,
    /// Deviation of the actual from the requested baud rate in per mille.
    pub error_permille: i32,
}

impl<I2C: I2c, D: DelayNs> Sc16is750<I2C, D> {
    /* ----- Baud Rate & Line Format ---------------------------------------- */

    /// Programs the divisor latch for the given baud rate.
    ///
    /// The divisor is truncated, so the actual rate is equal to or slightly
    /// above the requested one; the deviation is returned, never an error. A
    /// sleeping chip is woken up for the write and put back to sleep
    /// afterwards, also if the write fails. An LCR left with the divisor
    /// latch selected is restored with that bit cleared.
    ///
    /// Fails with [`InvalidArgumentError::BaudRate`] if the rate is zero or
    /// out of the range of the divisor, and with
    /// [`InvalidStateError::EnhancedRegisterSetActive`] if the LCR selects
    /// the enhanced register set.
    pub fn set_baud_rate(
        &mut self,
        baud_rate: BaudRate,
    ) -> Result<BaudRateSettings, Error<I2C::Error>> {
        let lcr = self.lcr()?;
        if lcr == LCR::ENHANCED_ACCESS {
            return Err(InvalidStateError::EnhancedRegisterSetActive.into());
        }
        let prescaler = Prescaler::from_mcr(self.mcr()?);
        let desired = baud_rate.to_integer();
        let divisor = calc_divisor(self.crystal_frequency, prescaler, desired)
            .map_err(InvalidArgumentError::BaudRate)?;

        // IER is hidden behind DLH while the divisor latch is selected.
        if lcr.contains(LCR::DIVISOR_LATCH) && self.context.is_none() {
            self.write_register(offsets::LCR, (lcr - LCR::DIVISOR_LATCH).bits())?;
        }
        let asleep = self.sleep_state()?;
        if asleep {
            self.wake()?;
        }
        let written = self.write_divisor(divisor);
        if asleep {
            // Restore IER[4] without the checks of `sleep`.
            let restored = self.update_register(offsets::IER, |ier| {
                (IER::from_bits_retain(ier) | IER::SLEEP_MODE).bits()
            });
            written?;
            restored?;
        } else {
            written?;
        }

        let actual = calc_baud_rate(self.crystal_frequency, prescaler, divisor);
        let settings = BaudRateSettings {
            divisor,
            prescaler,
            actual,
            error_permille: baud_rate_error_permille(desired, actual),
        };
        debug!(
            "sc16is750@{:#04x}: baud rate {} requested, {} set (divisor {}, {:?}, {}‰)",
            self.address(),
            desired,
            actual,
            divisor,
            prescaler,
            settings.error_permille
        );
        Ok(settings)
    }

    fn write_divisor(&mut self, divisor: u16) -> Result<(), Error<I2C::Error>> {
        let [low, high] = divisor.to_le_bytes();
        let mut latch = self.enter_context(RegisterSet::Special)?;
        latch.write_register(special::DLL, low)?;
        latch.write_register(special::DLH, high)?;
        latch.finish()
    }

    /// Returns the LCR if it can be modified as a general register.
    pub(crate) fn general_lcr(&mut self) -> Result<LCR, Error<I2C::Error>> {
        if self.context.is_some() {
            return Err(InvalidStateError::ContextAlreadyEntered.into());
        }
        let lcr = self.lcr()?;
        if lcr == LCR::ENHANCED_ACCESS {
            return Err(InvalidStateError::EnhancedRegisterSetActive.into());
        }
        Ok(lcr)
    }

    /// Sets data bits, parity and stop bits with one LCR write.
    ///
    /// Clears a line break and the divisor latch selection. Use
    /// [`TryFrom<u8>`] on [`WordLength`] and [`StopBits`] or
    /// [`str::parse`] on [`Parity`] to get the arguments from plain values.
    pub fn set_line_format(
        &mut self,
        data_bits: WordLength,
        parity: Parity,
        stop_bits: StopBits,
    ) -> Result<(), Error<I2C::Error>> {
        self.general_lcr()?;
        let lcr = LCR::empty()
            .set_word_length(data_bits)
            .set_parity(parity)
            .set_stop_bits(stop_bits);
        self.write_register(offsets::LCR, lcr.bits())
    }

    /* ----- FIFOs ---------------------------------------------------------- */

    /// Enables or disables the FIFOs.
    ///
    /// When enabling, the receive trigger level is always programmed. The
    /// transmit trigger level is optional; setting it also enables the
    /// enhanced functions, without which the chip ignores FCR bits 4 and 5.
    /// Parse a raw number of spaces with [`TxTriggerLevel::from_spaces`].
    pub fn set_fifo(
        &mut self,
        enabled: bool,
        rx_trigger: RxTriggerLevel,
        tx_trigger: Option<TxTriggerLevel>,
    ) -> Result<(), Error<I2C::Error>> {
        if !enabled {
            self.write_register_unverified(offsets::FCR, 0)?;
            self.fcr = FCR::empty();
            return Ok(());
        }

        let mut fcr = FCR::FIFO_ENABLE.set_rx_trigger_level(rx_trigger);
        if let Some(tx_trigger) = tx_trigger {
            self.set_enhanced_functions(true)?;
            fcr = fcr.set_tx_trigger_level(tx_trigger);
        }
        self.write_register_unverified(offsets::FCR, fcr.bits())?;
        self.fcr = fcr;
        Ok(())
    }

    /// Discards everything in the receive FIFO.
    pub fn reset_rx_fifo(&mut self) -> Result<(), Error<I2C::Error>> {
        self.reset_fifo(FCR::RX_FIFO_RESET)
    }

    /// Discards everything in the transmit FIFO.
    pub fn reset_tx_fifo(&mut self) -> Result<(), Error<I2C::Error>> {
        self.reset_fifo(FCR::TX_FIFO_RESET)
    }

    fn reset_fifo(&mut self, reset: FCR) -> Result<(), Error<I2C::Error>> {
        self.write_register_unverified(offsets::FCR, (self.fcr | reset).bits())?;
        self.backend.lock_mut().hold_for(RESET_SETTLE_CYCLES);
        Ok(())
    }

    /* ----- Modes ---------------------------------------------------------- */

    /// Selects 9-bit multidrop (RS-485, `true`) or normal (RS-232) mode.
    pub fn set_multidrop_mode(&mut self, nine_bit: bool) -> Result<(), Error<I2C::Error>> {
        self.update_register(offsets::EFCR, |efcr| {
            let efcr = EFCR::from_bits_retain(efcr);
            let efcr = if nine_bit {
                efcr | EFCR::MULTIDROP
            } else {
                efcr - EFCR::MULTIDROP
            };
            efcr.bits()
        })
    }

    /// Enables or disables the enhanced functions ([`EFR::ENHANCED_FUNCTIONS`]).
    ///
    /// They unlock IER bits 4 to 7, FCR bits 4 and 5 and MCR bits 2 and 5 to 7.
    pub fn set_enhanced_functions(&mut self, enabled: bool) -> Result<(), Error<I2C::Error>> {
        let mut bank = self.enter_context(RegisterSet::Enhanced)?;
        let efr = bank.efr()?;
        let efr = if enabled {
            efr | EFR::ENHANCED_FUNCTIONS
        } else {
            efr - EFR::ENHANCED_FUNCTIONS
        };
        bank.write_register(enhanced::EFR, efr.bits())?;
        bank.finish()
    }

    /// Uses GPIO[7:4] as modem control lines DSR, DTR, CD and RI (`true`)
    /// or as general purpose I/O (`false`).
    pub fn set_modem_flow_pins(&mut self, modem_use: bool) -> Result<(), Error<I2C::Error>> {
        self.update_register(offsets::IOCONTROL, |iocontrol| {
            let iocontrol = IOCONTROL::from_bits_retain(iocontrol) - IOCONTROL::SOFTWARE_RESET;
            let iocontrol = if modem_use {
                iocontrol | IOCONTROL::MODEM_PINS
            } else {
                iocontrol - IOCONTROL::MODEM_PINS
            };
            iocontrol.bits()
        })
    }

    /// Returns whether GPIO[7:4] are used as modem control lines.
    pub fn modem_flow_pins(&mut self) -> Result<bool, Error<I2C::Error>> {
        Ok(self.iocontrol()?.contains(IOCONTROL::MODEM_PINS))
    }

    /* ----- Flow Control --------------------------------------------------- */

    /// Reads the EFR. Only valid inside the enhanced register set.
    fn efr(&mut self) -> Result<EFR, Error<I2C::Error>> {
        self.read_register(enhanced::EFR).map(EFR::from_bits_retain)
    }

    /// Clears all XON/XOFF characters. Only valid inside the enhanced
    /// register set.
    fn clear_flow_control_characters(&mut self) -> Result<(), Error<I2C::Error>> {
        for offset in [enhanced::XON1, enhanced::XON2, enhanced::XOFF1, enhanced::XOFF2] {
            self.write_register(offset, 0)?;
        }
        Ok(())
    }

    /// Selects the given flow control mode.
    pub fn set_flow_control(
        &mut self,
        flow_control: &FlowControl,
    ) -> Result<(), Error<I2C::Error>> {
        match flow_control {
            FlowControl::None => self.set_no_flow_control(),
            FlowControl::Software(soft) => self.set_soft_flow_control(soft),
            FlowControl::Hardware => self.set_hard_flow_control(),
            FlowControl::AutoHardware => self.set_auto_hard_flow_control(),
        }
    }

    /// Disables flow control.
    ///
    /// Keeps only the enhanced functions and special character detection
    /// bits of the EFR, clears the XON/XOFF characters and returns GPIO[7:4]
    /// to general purpose use.
    pub fn set_no_flow_control(&mut self) -> Result<(), Error<I2C::Error>> {
        let mut bank = self.enter_context(RegisterSet::Enhanced)?;
        let efr = bank.efr()? & (EFR::ENHANCED_FUNCTIONS | EFR::SPECIAL_CHAR_DETECT);
        bank.write_register(enhanced::EFR, efr.bits())?;
        bank.clear_flow_control_characters()?;
        bank.set_modem_flow_pins(false)?;
        bank.finish()?;
        debug!("sc16is750@{:#04x}: no flow control", self.address());
        Ok(())
    }

    /// Enables XON/XOFF flow control.
    ///
    /// A character pair only takes part if both of its characters are set.
    /// Fails with [`InvalidArgumentError::NoFlowControlCharacters`] if no
    /// character is set at all.
    pub fn set_soft_flow_control(
        &mut self,
        soft: &SoftFlowControl,
    ) -> Result<(), Error<I2C::Error>> {
        if soft.is_empty() {
            return Err(InvalidArgumentError::NoFlowControlCharacters.into());
        }

        let mut efr = EFR::empty();
        if soft.tx {
            efr.set(EFR::TX_XON1_XOFF1, soft.pair1());
            efr.set(EFR::TX_XON2_XOFF2, soft.pair2());
        }
        if soft.rx {
            efr.set(EFR::RX_XON1_XOFF1, soft.pair1());
            efr.set(EFR::RX_XON2_XOFF2, soft.pair2());
        }

        let mut bank = self.enter_context(RegisterSet::Enhanced)?;
        let kept = bank.efr()? - EFR::AUTO_FLOW_CONTROL - EFR::SOFTWARE_FLOW_CONTROL;
        bank.write_register(enhanced::EFR, (kept | efr).bits())?;
        let characters = [
            (enhanced::XON1, soft.xon1),
            (enhanced::XON2, soft.xon2),
            (enhanced::XOFF1, soft.xoff1),
            (enhanced::XOFF2, soft.xoff2),
        ];
        let defined = characters
            .into_iter()
            .filter_map(|(offset, character)| Some((offset, character?)));
        for (offset, character) in defined {
            bank.write_register(offset, character)?;
        }
        bank.set_modem_flow_pins(false)?;
        bank.finish()?;
        debug!(
            "sc16is750@{:#04x}: software flow control, EFR[3:0]={:#06b}",
            self.address(),
            efr.bits()
        );
        Ok(())
    }

    /// Enables RTS/CTS flow control driven by the host through the modem
    /// pins, see [`Self::set_rts`].
    pub fn set_hard_flow_control(&mut self) -> Result<(), Error<I2C::Error>> {
        self.set_rts_cts_flow_control(false)?;
        debug!("sc16is750@{:#04x}: hardware flow control", self.address());
        Ok(())
    }

    /// Enables automatic RTS/CTS flow control by the chip.
    pub fn set_auto_hard_flow_control(&mut self) -> Result<(), Error<I2C::Error>> {
        self.set_rts_cts_flow_control(true)?;
        debug!("sc16is750@{:#04x}: automatic hardware flow control", self.address());
        Ok(())
    }

    fn set_rts_cts_flow_control(&mut self, automatic: bool) -> Result<(), Error<I2C::Error>> {
        let mut bank = self.enter_context(RegisterSet::Enhanced)?;
        let efr = bank.efr()?;
        let efr = if automatic {
            efr | EFR::AUTO_FLOW_CONTROL
        } else {
            efr - EFR::AUTO_FLOW_CONTROL
        };
        bank.write_register(enhanced::EFR, efr.bits())?;
        bank.clear_flow_control_characters()?;
        bank.set_modem_flow_pins(true)?;
        bank.finish()
    }
}
