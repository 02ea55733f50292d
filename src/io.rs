// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`embedded_io`] traits for [`Sc16is750`], so the UART plugs into generic
//! byte stream code.
//!
//! Reads and writes block for the first byte only and then move as much as
//! the FIFOs allow.

use crate::datasheet::registers::offsets;
use crate::error::Error;
use crate::Sc16is750;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

impl<I2C: I2c, D: DelayNs> embedded_io::ErrorType for Sc16is750<I2C, D> {
    type Error = Error<I2C::Error>;
}

impl<I2C: I2c, D: DelayNs> embedded_io::Read for Sc16is750<I2C, D> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let Some((first, rest)) = buf.split_first_mut() else {
            return Ok(0);
        };
        // Block until we have received at least one byte
        *first = self.receive_byte(false)?;

        let buffered = usize::from(self.rx_buffer_used()?);
        let mut count = 1;
        for slot in rest.iter_mut().take(buffered) {
            *slot = self.read_register(offsets::RHR)?;
            count += 1;
        }
        Ok(count)
    }
}

impl<I2C: I2c, D: DelayNs> embedded_io::ReadReady for Sc16is750<I2C, D> {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(self.rx_buffer_used()? > 0)
    }
}

impl<I2C: I2c, D: DelayNs> embedded_io::Write for Sc16is750<I2C, D> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        let Some((&first, rest)) = buf.split_first() else {
            return Ok(0);
        };
        self.transmit_byte(first, false)?;

        let space = usize::from(self.tx_buffer_available()?);
        let mut count = 1;
        for &byte in rest.iter().take(space) {
            self.write_register_unverified(offsets::THR, byte)?;
            count += 1;
        }
        Ok(count)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.wait_tx_empty()
    }
}

impl<I2C: I2c, D: DelayNs> embedded_io::WriteReady for Sc16is750<I2C, D> {
    fn write_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(self.tx_buffer_available()? > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::sim::{CountingDelay, SimChip};
    use crate::{Error, Sc16is750, DEFAULT_I2C_ADDRESS};
    use embedded_io::{Read, ReadReady, Write, WriteReady};

    fn chip_with(setup: impl FnOnce(&mut SimChip)) -> Sc16is750<SimChip, CountingDelay> {
        let mut sim = SimChip::new();
        setup(&mut sim);
        Sc16is750::new(sim, CountingDelay::default(), DEFAULT_I2C_ADDRESS).unwrap()
    }

    #[test]
    fn test_read_drains_what_is_buffered() {
        let mut uart = chip_with(|sim| sim.push_rx(b"hello"));
        assert_eq!(uart.read_ready(), Ok(true));

        let mut buffer = [0; 3];
        assert_eq!(uart.read(&mut buffer), Ok(3));
        assert_eq!(&buffer, b"hel");

        let mut buffer = [0; 8];
        assert_eq!(uart.read(&mut buffer), Ok(2));
        assert_eq!(&buffer[..2], b"lo");
        assert_eq!(uart.read_ready(), Ok(false));
        assert_eq!(uart.read(&mut []), Ok(0));
    }

    #[test]
    fn test_read_blocks_for_first_byte() {
        let mut uart = chip_with(|sim| sim.rx_arrives_after(4, b"ok"));
        let mut buffer = [0; 4];
        assert_eq!(uart.read(&mut buffer), Ok(2));
        assert_eq!(&buffer[..2], b"ok");
    }

    #[test]
    fn test_write_all_and_flush() {
        let mut uart = chip_with(|_| {});
        assert_eq!(uart.write_ready(), Ok(true));
        uart.write_all(b"hello world").unwrap();
        uart.flush().unwrap();

        let (sim, _) = uart.release();
        assert_eq!(sim.sent(), b"hello world");
    }

    #[test]
    fn test_write_ready_on_full_fifo() {
        let mut uart = chip_with(|sim| sim.tx_full_for(1));
        assert_eq!(uart.write_ready(), Ok(false));
    }

    #[test]
    fn test_io_error_kind() {
        use embedded_io::Error as _;

        let mut uart = chip_with(SimChip::disconnect);
        let error = uart.write(b"x").unwrap_err();
        assert!(matches!(error, Error::NotConnected(_)));
        assert_eq!(error.kind(), embedded_io::ErrorKind::NotConnected);

        let mut uart = chip_with(|_| {});
        uart.lock_io();
        let error = uart.read(&mut [0]).unwrap_err();
        assert_eq!(error.kind(), embedded_io::ErrorKind::TimedOut);
    }
}
