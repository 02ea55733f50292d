// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decoded line and modem status.

use crate::datasheet::registers::{LSR, MSR};

/// LSR bits in bit order with their names.
const LSR_FIELDS: [(LSR, &str); 8] = [
    (LSR::DATA_IN_RECEIVER, "data-in-receiver"),
    (LSR::OVERRUN_ERROR, "overrun-error"),
    (LSR::PARITY_ERROR, "parity-error"),
    (LSR::FRAMING_ERROR, "framing-error"),
    (LSR::BREAK_INTERRUPT, "break-interrupt"),
    (LSR::THR_EMPTY, "thr-empty"),
    (LSR::THR_TSR_EMPTY, "thr-tsr-empty"),
    (LSR::FIFO_DATA_ERROR, "fifo-data-error"),
];

/// The Line Status Register (LSR) as named flags.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct LineStatus {
    /// At least one character is in the receive FIFO.
    pub data_in_receiver: bool,
    /// A character was lost because the receive FIFO was full.
    pub overrun_error: bool,
    /// The character on top of the receive FIFO has a parity error.
    pub parity_error: bool,
    /// The character on top of the receive FIFO has no valid stop bit.
    pub framing_error: bool,
    /// A break condition was received.
    pub break_interrupt: bool,
    /// The transmit holding register is empty.
    pub thr_empty: bool,
    /// The transmit holding and shift registers are both empty.
    pub thr_tsr_empty: bool,
    /// At least one character in the receive FIFO has an error.
    pub fifo_data_error: bool,
}

impl LineStatus {
    /// Returns `(name, value)` for each bit, starting with bit 0.
    pub fn flags(&self) -> impl Iterator<Item = (&'static str, bool)> {
        let values = [
            self.data_in_receiver,
            self.overrun_error,
            self.parity_error,
            self.framing_error,
            self.break_interrupt,
            self.thr_empty,
            self.thr_tsr_empty,
            self.fifo_data_error,
        ];
        LSR_FIELDS
            .into_iter()
            .zip(values)
            .map(|((_, name), value)| (name, value))
    }

    /// Whether any of the receive error bits is set.
    #[must_use]
    pub const fn has_error(&self) -> bool {
        self.overrun_error || self.parity_error || self.framing_error || self.fifo_data_error
    }
}

impl From<LSR> for LineStatus {
    fn from(lsr: LSR) -> Self {
        let [
            data_in_receiver,
            overrun_error,
            parity_error,
            framing_error,
            break_interrupt,
            thr_empty,
            thr_tsr_empty,
            fifo_data_error,
        ] = LSR_FIELDS.map(|(bit, _)| lsr.contains(bit));
        Self {
            data_in_receiver,
            overrun_error,
            parity_error,
            framing_error,
            break_interrupt,
            thr_empty,
            thr_tsr_empty,
            fifo_data_error,
        }
    }
}

/// The Modem Status Register (MSR) as named flags.
///
/// DSR, RI and CD share their pins with GPIO[7:4]; their levels are only
/// meaningful, and therefore only present, while those pins are in modem
/// mode.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ModemStatus {
    /// CTS changed since the last read.
    pub cts_delta: bool,
    /// DSR changed since the last read.
    pub dsr_delta: bool,
    /// RI went from low to high since the last read.
    pub ri_delta: bool,
    /// CD changed since the last read.
    pub cd_delta: bool,
    /// The (inverted) CTS input is high.
    pub cts_high: bool,
    /// The (inverted) DSR input is high.
    pub dsr_high: Option<bool>,
    /// The (inverted) RI input is high.
    pub ri_high: Option<bool>,
    /// The (inverted) CD input is high.
    pub cd_high: Option<bool>,
}

impl ModemStatus {
    /// Decodes the MSR. `modem_pins` tells whether GPIO[7:4] are in modem
    /// mode.
    #[must_use]
    pub fn new(msr: MSR, modem_pins: bool) -> Self {
        let level = |bit: MSR| modem_pins.then_some(msr.contains(bit));
        Self {
            cts_delta: msr.contains(MSR::DELTA_CTS),
            dsr_delta: msr.contains(MSR::DELTA_DSR),
            ri_delta: msr.contains(MSR::DELTA_RI),
            cd_delta: msr.contains(MSR::DELTA_CD),
            cts_high: msr.contains(MSR::CTS),
            dsr_high: level(MSR::DSR),
            ri_high: level(MSR::RI),
            cd_high: level(MSR::CD),
        }
    }

    /// Returns `(name, value)` for each present field, starting with bit 0.
    pub fn flags(&self) -> impl Iterator<Item = (&'static str, bool)> {
        [
            ("cts-delta", Some(self.cts_delta)),
            ("dsr-delta", Some(self.dsr_delta)),
            ("ri-delta", Some(self.ri_delta)),
            ("cd-delta", Some(self.cd_delta)),
            ("cts-high", Some(self.cts_high)),
            ("dsr-high", self.dsr_high),
            ("ri-high", self.ri_high),
            ("cd-high", self.cd_high),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|value| (name, value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    #[test]
    fn test_line_status_decoding() {
        let status = LineStatus::from(LSR::from_bits_retain(0b0010_0001));
        assert_eq!(
            status,
            LineStatus {
                data_in_receiver: true,
                thr_empty: true,
                ..Default::default()
            }
        );
        assert!(!status.has_error());
    }

    #[test]
    fn test_line_status_flags_are_in_bit_order() {
        for bit in 0..8 {
            let status = LineStatus::from(LSR::from_bits_retain(1 << bit));
            let set = status
                .flags()
                .enumerate()
                .filter(|(_, (_, value))| *value)
                .map(|(index, _)| index)
                .collect::<Vec<_>>();
            assert_eq!(set, [bit]);
        }
        let names = LineStatus::default()
            .flags()
            .map(|(name, _)| name)
            .collect::<Vec<_>>();
        assert_eq!(names[0], "data-in-receiver");
        assert_eq!(names[7], "fifo-data-error");
    }

    #[test]
    fn test_modem_status_without_modem_pins() {
        let status = ModemStatus::new(MSR::from_bits_retain(0xFF), false);
        assert!(status.cts_delta && status.cd_delta && status.cts_high);
        assert_eq!(status.dsr_high, None);
        assert_eq!(status.ri_high, None);
        assert_eq!(status.cd_high, None);
        assert_eq!(status.flags().count(), 5);
    }

    #[test]
    fn test_modem_status_with_modem_pins() {
        let status = ModemStatus::new(MSR::CTS | MSR::RI, true);
        assert!(status.cts_high);
        assert_eq!(status.dsr_high, Some(false));
        assert_eq!(status.ri_high, Some(true));
        assert_eq!(status.cd_high, Some(false));
        assert!(!status.cts_delta);
        assert_eq!(status.flags().count(), 8);
    }
}
