//! Byte-wide access to the device pins and serial bus.
//!
//! The driver only needs five primitives from the board: assert and release
//! the chip select, exchange one byte full-duplex, and drive the reset and
//! wake lines. [`Transport`] captures exactly that, and [`HalTransport`]
//! implements it on top of `embedded-hal`.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

/// The primitives the driver performs every bus transaction with.
///
/// Exchanges within one select/release bracket must reach the device in
/// order. The driver never retries and does not expect the transport to
/// report failures: a failed exchange is indistinguishable from reading
/// `0xff`.
pub trait Transport {
    /// Assert the chip select line.
    fn assert_select(&mut self);

    /// Release the chip select line.
    fn release_select(&mut self);

    /// Shift `out` to the device and return the byte shifted in.
    fn exchange_byte(&mut self, out: u8) -> u8;

    /// Drive the hardware reset line. `true` holds the device in reset.
    fn assert_reset_line(&mut self, active: bool);

    /// Drive the wake line. `true` wakes the device when pin wake-up is
    /// configured.
    fn assert_wake_line(&mut self, active: bool);
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn assert_select(&mut self) {
        T::assert_select(self)
    }

    fn release_select(&mut self) {
        T::release_select(self)
    }

    fn exchange_byte(&mut self, out: u8) -> u8 {
        T::exchange_byte(self, out)
    }

    fn assert_reset_line(&mut self, active: bool) {
        T::assert_reset_line(self, active)
    }

    fn assert_wake_line(&mut self, active: bool) {
        T::assert_wake_line(self, active)
    }
}

/// [`Transport`] over an `embedded-hal` SPI bus and GPIO pins.
///
/// The chip select and reset lines are active low, the wake line is active
/// high. The SPI bus must be configured for mode 0, MSB first.
pub struct HalTransport<SPI, CS, RST, WAKE> {
    spi: SPI,
    cs: CS,
    reset: RST,
    wake: WAKE,
}

impl<SPI, CS, RST, WAKE> HalTransport<SPI, CS, RST, WAKE>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
    RST: OutputPin,
    WAKE: OutputPin,
{
    /// Creates a new [`HalTransport`].
    pub fn new(spi: SPI, cs: CS, reset: RST, wake: WAKE) -> Self {
        Self {
            spi,
            cs,
            reset,
            wake,
        }
    }

    /// Give back the bus and the pins.
    pub fn release(self) -> (SPI, CS, RST, WAKE) {
        (self.spi, self.cs, self.reset, self.wake)
    }
}

impl<SPI, CS, RST, WAKE> Transport for HalTransport<SPI, CS, RST, WAKE>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
    RST: OutputPin,
    WAKE: OutputPin,
{
    fn assert_select(&mut self) {
        if self.cs.set_low().is_err() {
            warn!("mrf24j40: unable to assert chip select");
        }
    }

    fn release_select(&mut self) {
        if self.cs.set_high().is_err() {
            warn!("mrf24j40: unable to release chip select");
        }
    }

    fn exchange_byte(&mut self, out: u8) -> u8 {
        let mut word = [out];
        match self
            .spi
            .transfer_in_place(&mut word)
            .and_then(|_| self.spi.flush())
        {
            Ok(()) => word[0],
            Err(_) => {
                warn!("mrf24j40: spi exchange failed");
                0xff
            }
        }
    }

    fn assert_reset_line(&mut self, active: bool) {
        let res = if active {
            self.reset.set_low()
        } else {
            self.reset.set_high()
        };

        if res.is_err() {
            warn!("mrf24j40: unable to drive reset line");
        }
    }

    fn assert_wake_line(&mut self, active: bool) {
        let res = if active {
            self.wake.set_high()
        } else {
            self.wake.set_low()
        };

        if res.is_err() {
            warn!("mrf24j40: unable to drive wake line");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::vec::Vec;

    use embedded_hal::digital::{ErrorType as PinErrorType, OutputPin};
    use embedded_hal::spi::{ErrorKind, ErrorType, SpiBus};

    use super::*;

    #[derive(Default)]
    struct Pin {
        levels: Vec<bool>,
    }

    impl PinErrorType for Pin {
        type Error = core::convert::Infallible;
    }

    impl OutputPin for Pin {
        fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
            self.levels.push(false);
            Ok(())
        }

        fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
            self.levels.push(true);
            Ok(())
        }
    }

    /// Echoes the complement of every byte, or fails every transfer.
    #[derive(Default)]
    struct Spi {
        sent: Vec<u8>,
        broken: bool,
    }

    impl ErrorType for Spi {
        type Error = ErrorKind;
    }

    impl SpiBus<u8> for Spi {
        fn read(&mut self, words: &mut [u8]) -> core::result::Result<(), Self::Error> {
            words.fill(0);
            Ok(())
        }

        fn write(&mut self, words: &[u8]) -> core::result::Result<(), Self::Error> {
            self.sent.extend_from_slice(words);
            Ok(())
        }

        fn transfer(
            &mut self,
            read: &mut [u8],
            write: &[u8],
        ) -> core::result::Result<(), Self::Error> {
            self.sent.extend_from_slice(write);
            read.fill(0);
            Ok(())
        }

        fn transfer_in_place(&mut self, words: &mut [u8]) -> core::result::Result<(), Self::Error> {
            if self.broken {
                return Err(ErrorKind::Other);
            }
            self.sent.extend_from_slice(words);
            for w in words.iter_mut() {
                *w = !*w;
            }
            Ok(())
        }

        fn flush(&mut self) -> core::result::Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn pin_polarity() {
        let mut t = HalTransport::new(Spi::default(), Pin::default(), Pin::default(), Pin::default());

        t.assert_select();
        t.release_select();
        t.assert_reset_line(true);
        t.assert_reset_line(false);
        t.assert_wake_line(true);
        t.assert_wake_line(false);

        let (_, cs, reset, wake) = t.release();
        assert_eq!(cs.levels, [false, true]);
        assert_eq!(reset.levels, [false, true]);
        assert_eq!(wake.levels, [true, false]);
    }

    #[test]
    fn exchange_returns_shifted_in_byte() {
        let mut t = HalTransport::new(Spi::default(), Pin::default(), Pin::default(), Pin::default());
        assert_eq!(t.exchange_byte(0x0f), 0xf0);

        let (spi, ..) = t.release();
        assert_eq!(spi.sent, [0x0f]);
    }

    #[test]
    fn failed_exchange_reads_as_ff() {
        let spi = Spi {
            broken: true,
            ..Default::default()
        };
        let mut t = HalTransport::new(spi, Pin::default(), Pin::default(), Pin::default());
        assert_eq!(t.exchange_byte(0x00), 0xff);
    }
}
