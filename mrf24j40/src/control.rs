//! Device bring-up and configuration.

use bitflags::bitflags;
use embedded_hal::delay::DelayNs;

use crate::config::Channel;
use crate::device::Mrf24j40;
use crate::registers::*;
use crate::transport::Transport;
use crate::{Error, Result};

bitflags! {
    /// Software reset targets (`SOFTRST`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Reset: u8 {
        /// Power management circuitry.
        const POWER = softrst::RSTPWR;
        /// Baseband circuitry.
        const BASEBAND = softrst::RSTBB;
        /// MAC circuitry. Every control register returns to its power-on
        /// default.
        const MAC = softrst::RSTMAC;
    }
}

/// How the device is woken from sleep.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeSource {
    /// Set and clear `WAKECON.REGWAKE` over the bus.
    Register,
    /// Drive the external wake pin high.
    Pin,
}

impl<T, D> Mrf24j40<T, D>
where
    T: Transport,
    D: DelayNs,
{
    /// Issue a software reset.
    pub fn reset(&mut self, kind: Reset) {
        debug!("mrf24j40: software reset {:#x}", kind.bits());
        self.bus.write(SOFTRST, kind.bits());
    }

    /// Reset the RF state machine and wait for it to settle.
    ///
    /// `RFCTL` also holds the wake count, which is preserved.
    pub fn rf_reset(&mut self) {
        let old = self.bus.read(RFCTL);
        self.bus.write(RFCTL, old | rfctl::RFRST);
        self.bus.write(RFCTL, old & !rfctl::RFRST);
        self.delay.delay_us(self.config.rf_settle_us);
    }

    /// Bring the device up from an unknown state and tune it to `channel`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceNotResponding`] if the software reset does not
    /// complete within [`Config::reset_poll_attempts`](crate::Config) polls.
    pub fn full_init(&mut self, channel: Channel) -> Result<()> {
        info!("mrf24j40: initializing on channel {}", channel.number());

        // Any receive session in progress is lost with the FIFO contents.
        self.rx.forget();

        let settle = self.config.reset_settle_ms;
        self.bus.transport_mut().assert_reset_line(true);
        self.delay.delay_ms(settle);
        self.bus.transport_mut().assert_reset_line(false);
        self.delay.delay_ms(settle);

        self.reset(Reset::all());
        self.wait_for_reset()?;
        self.delay.delay_ms(settle);

        // Initialization sequence from the datasheet.
        self.bus.modify(PACON2, |v| v | pacon2::FIFOEN);
        self.bus.write(
            TXSTBL,
            txstbl::rfstbl(self.config.tx_stabilization) | txstbl::msifs(self.config.min_sifs),
        );
        self.bus.write(
            RFCON0,
            rfcon0::channel(channel.index()) | rfcon0::rfopt(0x03),
        );
        self.bus.write(RFCON1, rfcon1::vcoopt(0x02));
        self.bus.write(RFCON2, rfcon2::PLLEN);
        self.bus.write(RFCON6, rfcon6::TXFIL);
        self.bus.write(RFCON7, rfcon7::slpclksel(0x02));
        self.bus.write(RFCON8, rfcon8::RFVCO);
        // Rising edge interrupt polarity.
        self.bus.write(SLPCON0, slpcon0::INTEDGE);
        self.bus.write(SLPCON1, slpcon1::slpclkdiv(1) | slpcon1::CLKOUTDIS);

        // Carrier sense with energy above threshold.
        self.bus
            .write(BBREG2, bbreg2::ccamode(0x03) | bbreg2::ccasth(0x02));
        self.bus.write(CCAEDTH, self.config.cca_ed_threshold);

        self.flush_rx_fifo();
        self.enable_interrupts();
        self.rf_reset();

        info!("mrf24j40: ready");
        Ok(())
    }

    fn wait_for_reset(&mut self) -> Result<()> {
        let pending = Reset::all().bits();

        for attempt in 0..self.config.reset_poll_attempts {
            if self.bus.read(SOFTRST) & pending == 0 {
                debug!("mrf24j40: reset complete after {} polls", attempt + 1);
                return Ok(());
            }
        }

        error!(
            "mrf24j40: device still in reset after {} polls",
            self.config.reset_poll_attempts
        );
        Err(Error::DeviceNotResponding)
    }

    /// Unmask the transmit-normal, receive and security interrupts and mask
    /// every other source.
    pub fn enable_interrupts(&mut self) {
        // A cleared INTCON bit enables the interrupt.
        self.bus
            .write(INTCON, !(intcon::TXNIE | intcon::RXIE | intcon::SECIE));
    }

    /// Discard the contents of the RX FIFO.
    pub fn flush_rx_fifo(&mut self) {
        // RXFLUSH also holds the wake pin configuration.
        self.bus.modify(RXFLUSH, |v| v | rxflush::RXFLUSH);
    }

    /// Tune to `channel`. The RF state machine is reset to relock the PLL.
    pub fn set_channel(&mut self, channel: Channel) {
        debug!("mrf24j40: channel {}", channel.number());
        self.bus.write(
            RFCON0,
            rfcon0::channel(channel.index()) | rfcon0::rfopt(0x03),
        );
        self.rf_reset();
    }

    /// Read the channel the device is tuned to.
    pub fn read_channel(&mut self) -> Channel {
        Channel::from_index(self.bus.read(RFCON0) >> 4)
    }

    /// Enter promiscuous mode. Automatic acknowledgments are disabled.
    ///
    /// With `accept_crc_errors` every frame is delivered, including frames
    /// with a bad CRC. Without it, frames failing address filtering are
    /// delivered but frames with a bad CRC are not.
    pub fn set_promiscuous(&mut self, accept_crc_errors: bool) {
        let mut mode = rxmcr::NOACKRSP;
        if accept_crc_errors {
            mode |= rxmcr::ERRPKT;
        } else {
            mode |= rxmcr::PROMI;
        }

        self.bus.write(RXMCR, mode);
    }

    /// Leave promiscuous mode: address filtering and automatic
    /// acknowledgments are restored.
    pub fn set_normal_mode(&mut self) {
        self.bus.write(RXMCR, 0);
    }

    /// Set the PAN ID used for address filtering and outgoing frames.
    pub fn set_pan(&mut self, pan_id: u16) {
        let [high, low] = pan_id.to_be_bytes();
        self.bus.write(PANIDH, high);
        self.bus.write(PANIDL, low);
    }

    /// Read the PAN ID back from the device.
    pub fn pan_id(&mut self) -> u16 {
        u16::from_be_bytes([self.bus.read(PANIDH), self.bus.read(PANIDL)])
    }

    /// Set the 16-bit short address of this device.
    pub fn set_short_address(&mut self, addr: u16) {
        let [high, low] = addr.to_be_bytes();
        self.bus.write(SADRH, high);
        self.bus.write(SADRL, low);
    }

    /// Read the short address back from the device.
    pub fn short_address(&mut self) -> u16 {
        u16::from_be_bytes([self.bus.read(SADRH), self.bus.read(SADRL)])
    }

    /// Put the device to sleep. `wake` selects how [`wake`](Self::wake) will
    /// bring it back.
    pub fn sleep(&mut self, wake: WakeSource) {
        debug!("mrf24j40: sleep");
        self.bus.write(WAKECON, wakecon::IMMWAKE);

        let ack = self.bus.read(SLPACK);

        if wake == WakeSource::Pin {
            self.bus.transport_mut().assert_wake_line(false);
            // Enable the wake pin, active high.
            self.bus
                .modify(RXFLUSH, |v| v | rxflush::WAKEPAD | rxflush::WAKEPOL);
        }

        self.reset(Reset::POWER);
        self.bus.write(SLPACK, ack | slpack::SLPACK);
    }

    /// Wake the device. The RF state is lost during sleep, so the RF state
    /// machine is reset afterwards.
    pub fn wake(&mut self, wake: WakeSource) {
        debug!("mrf24j40: wake");
        match wake {
            WakeSource::Register => {
                self.bus.write(WAKECON, wakecon::REGWAKE);
                self.bus.write(WAKECON, 0);
            }
            WakeSource::Pin => self.bus.transport_mut().assert_wake_line(true),
        }

        self.rf_reset();
    }
}
