// SPDX-License-Identifier: MIT OR Apache-2.0

//! Simulated SC16IS750 behind an [`I2c`] bus, for tests.
//!
//! Models the register banking by LCR value, the FIFO level registers, the
//! write-only FCR, the NAK during software reset and a few injectable faults.

use crate::datasheet::registers::offsets;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{self, ErrorKind, I2c, NoAcknowledgeSource, Operation, SevenBitAddress};
use std::collections::VecDeque;
use std::vec::Vec;

/// The only error the simulated bus produces.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SimError {
    /// The chip did not acknowledge.
    Nak,
}

impl i2c::Error for SimError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data)
    }
}

/// Delay that only counts.
#[derive(Clone, Debug, Default)]
pub struct CountingDelay {
    pub calls: u32,
    pub total_ns: u64,
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.calls += 1;
        self.total_ns += u64::from(ns);
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Bank {
    General,
    Special,
    Enhanced,
}

#[derive(Debug)]
pub struct SimChip {
    general: [u8; 16],
    dll: u8,
    dlh: u8,
    efr: u8,
    /// XON1, XON2, XOFF1, XOFF2.
    xon_xoff: [u8; 4],
    fcr: u8,
    rx_fifo: VecDeque<u8>,
    rx_pending: Option<(u32, Vec<u8>)>,
    sent: Vec<u8>,
    tx_full_polls: u32,
    lsr_override: Option<u8>,
    readback_xor: [u8; 16],
    readback_or: [u8; 16],
    disconnected: bool,
    pointer: u8,
    transactions: u32,
    device_addresses: Vec<u8>,
    sub_addresses: Vec<u8>,
    writes: Vec<(u8, u8)>,
    general_writes: Vec<(u8, u8)>,
    resets: u32,
}

impl SimChip {
    pub fn new() -> Self {
        let mut chip = Self {
            general: [0; 16],
            dll: 0,
            dlh: 0,
            efr: 0,
            xon_xoff: [0; 4],
            fcr: 0,
            rx_fifo: VecDeque::new(),
            rx_pending: None,
            sent: Vec::new(),
            tx_full_polls: 0,
            lsr_override: None,
            readback_xor: [0; 16],
            readback_or: [0; 16],
            disconnected: false,
            pointer: 0,
            transactions: 0,
            device_addresses: Vec::new(),
            sub_addresses: Vec::new(),
            writes: Vec::new(),
            general_writes: Vec::new(),
            resets: 0,
        };
        chip.reset_registers();
        chip
    }

    /// Register values after power-on or software reset.
    fn reset_registers(&mut self) {
        self.general = [0; 16];
        self.general[usize::from(offsets::LCR)] = 0x1D;
        self.general[usize::from(offsets::SPR)] = 0xFF;
        self.dll = 0;
        self.dlh = 0;
        self.efr = 0;
        self.xon_xoff = [0; 4];
        self.fcr = 0;
        self.rx_fifo.clear();
    }

    fn bank(&self) -> Bank {
        match self.general[usize::from(offsets::LCR)] {
            0xBF => Bank::Enhanced,
            lcr if lcr & 0x80 != 0 => Bank::Special,
            _ => Bank::General,
        }
    }

    fn read(&mut self, offset: u8) -> u8 {
        match (self.bank(), offset) {
            (Bank::Special | Bank::Enhanced, 0x00) => return self.dll,
            (Bank::Special | Bank::Enhanced, 0x01) => return self.dlh,
            (Bank::Enhanced, 0x02) => return self.efr,
            (Bank::Enhanced, 0x04..=0x07) => return self.xon_xoff[usize::from(offset - 4)],
            _ => {}
        }

        let value = match offset {
            offsets::RHR => self.rx_fifo.pop_front().unwrap_or(0),
            offsets::IIR => {
                if self.fcr & 0x01 != 0 {
                    0xC1
                } else {
                    0x01
                }
            }
            offsets::LSR => self.lsr(),
            offsets::TXLVL => {
                if self.tx_full_polls > 0 {
                    self.tx_full_polls -= 1;
                    0
                } else {
                    64
                }
            }
            offsets::RXLVL => {
                self.poll_pending_rx();
                self.rx_fifo.len().min(64) as u8
            }
            other => self.general[usize::from(other)],
        };
        let index = usize::from(offset);
        (value | self.readback_or[index]) ^ self.readback_xor[index]
    }

    fn lsr(&mut self) -> u8 {
        if let Some(lsr) = self.lsr_override {
            return lsr;
        }
        let mut lsr = 0;
        if !self.rx_fifo.is_empty() {
            lsr |= 0x01;
        }
        if self.tx_full_polls > 0 {
            self.tx_full_polls -= 1;
        } else {
            lsr |= 0x60;
        }
        lsr
    }

    fn poll_pending_rx(&mut self) {
        if let Some((polls, bytes)) = self.rx_pending.take() {
            if polls <= 1 {
                self.rx_fifo.extend(bytes);
            } else {
                self.rx_pending = Some((polls - 1, bytes));
            }
        }
    }

    fn write(&mut self, offset: u8, value: u8) -> Result<(), SimError> {
        self.writes.push((offset, value));
        if self.bank() == Bank::General {
            self.general_writes.push((offset, value));
        }
        match (self.bank(), offset) {
            (Bank::Special | Bank::Enhanced, 0x00) => self.dll = value,
            (Bank::Special | Bank::Enhanced, 0x01) => self.dlh = value,
            (Bank::Enhanced, 0x02) => self.efr = value,
            (Bank::Enhanced, 0x04..=0x07) => self.xon_xoff[usize::from(offset - 4)] = value,
            (_, offsets::THR) => self.sent.push(value),
            (_, offsets::FCR) => {
                if value & 0x02 != 0 {
                    self.rx_fifo.clear();
                }
                // Reset bits clear themselves.
                self.fcr = value & !0x06;
            }
            (_, offsets::IOCONTROL) if value & 0x08 != 0 => {
                self.resets += 1;
                self.reset_registers();
                return Err(SimError::Nak);
            }
            (_, other) => self.general[usize::from(other)] = value,
        }
        Ok(())
    }

    /* ----- Fault injection and setup ------------------------------------ */

    /// Every following transaction fails.
    pub fn disconnect(&mut self) {
        self.disconnected = true;
    }

    /// Flips bits of every value read from a general register.
    pub fn corrupt_readback(&mut self, offset: u8, xor: u8) {
        self.readback_xor[usize::from(offset)] = xor;
    }

    /// Bits that always read back as one.
    pub fn stick_bits_high(&mut self, offset: u8, mask: u8) {
        self.readback_or[usize::from(offset)] = mask;
    }

    /// Presets a general register.
    pub fn set_register(&mut self, offset: u8, value: u8) {
        self.general[usize::from(offset)] = value;
    }

    pub fn set_efr(&mut self, value: u8) {
        self.efr = value;
    }

    pub fn set_xon_xoff(&mut self, values: [u8; 4]) {
        self.xon_xoff = values;
    }

    /// Fixes the LSR value, independent of the FIFO state.
    pub fn set_lsr(&mut self, value: u8) {
        self.lsr_override = Some(value);
    }

    pub fn push_rx(&mut self, bytes: &[u8]) {
        self.rx_fifo.extend(bytes.iter().copied());
    }

    /// The bytes arrive after the given number of RXLVL reads.
    pub fn rx_arrives_after(&mut self, polls: u32, bytes: &[u8]) {
        self.rx_pending = Some((polls, bytes.to_vec()));
    }

    /// The TX FIFO reports full for the given number of TXLVL/LSR reads.
    pub fn tx_full_for(&mut self, polls: u32) {
        self.tx_full_polls = polls;
    }

    /* ----- Inspection ---------------------------------------------------- */

    pub fn register(&self, offset: u8) -> u8 {
        self.general[usize::from(offset)]
    }

    pub fn fcr(&self) -> u8 {
        self.fcr
    }

    pub fn efr(&self) -> u8 {
        self.efr
    }

    pub fn xon_xoff(&self) -> [u8; 4] {
        self.xon_xoff
    }

    pub fn divisor(&self) -> u16 {
        u16::from_le_bytes([self.dll, self.dlh])
    }

    pub fn sent(&self) -> &[u8] {
        &self.sent
    }

    pub fn rx_len(&self) -> usize {
        self.rx_fifo.len()
    }

    pub fn transactions(&self) -> u32 {
        self.transactions
    }

    pub fn device_addresses(&self) -> &[u8] {
        &self.device_addresses
    }

    pub fn sub_addresses(&self) -> &[u8] {
        &self.sub_addresses
    }

    /// All register writes as `(offset, value)`, in any bank.
    pub fn writes(&self) -> &[(u8, u8)] {
        &self.writes
    }

    /// Values written to a register while the general set was selected.
    pub fn general_writes(&self, offset: u8) -> Vec<u8> {
        self.general_writes
            .iter()
            .filter(|&&(written, _)| written == offset)
            .map(|&(_, value)| value)
            .collect()
    }

    pub fn resets(&self) -> u32 {
        self.resets
    }
}

impl i2c::ErrorType for SimChip {
    type Error = SimError;
}

impl I2c for SimChip {
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.transactions += 1;
        self.device_addresses.push(address);
        if self.disconnected {
            return Err(SimError::Nak);
        }

        for operation in operations {
            match operation {
                Operation::Write(bytes) => {
                    let Some((&sub_address, values)) = bytes.split_first() else {
                        continue;
                    };
                    self.pointer = sub_address >> 3;
                    self.sub_addresses.push(sub_address);
                    for &value in values {
                        self.write(self.pointer, value)?;
                    }
                }
                Operation::Read(buffer) => {
                    for slot in buffer.iter_mut() {
                        *slot = self.read(self.pointer);
                    }
                }
            }
        }
        Ok(())
    }
}
