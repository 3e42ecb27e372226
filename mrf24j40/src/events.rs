//! Interrupt events.

use bitflags::bitflags;
use embedded_hal::delay::DelayNs;

use crate::device::Mrf24j40;
use crate::registers::{intstat, INTSTAT};
use crate::transport::Transport;

bitflags! {
    /// Events reported by [`poll_events`](Mrf24j40::poll_events).
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct Events: u8 {
        /// A frame is waiting in the RX FIFO.
        const RECEIVE_READY = 1;
        /// A transmission from the transmit normal FIFO has finished. See
        /// [`transmit_result`](Mrf24j40::transmit_result).
        const TRANSMIT_DONE = 1 << 1;
        /// A received frame needs a security key.
        const SECURITY = 1 << 2;
    }
}

impl Events {
    /// Map an `INTSTAT` value. Sleep, wake and timer interrupts are not
    /// reported.
    pub const fn from_intstat(status: u8) -> Self {
        let mut bits = 0;
        if status & intstat::RXIF != 0 {
            bits |= Self::RECEIVE_READY.bits();
        }
        if status & intstat::TXNIF != 0 {
            bits |= Self::TRANSMIT_DONE.bits();
        }
        if status & intstat::SECIF != 0 {
            bits |= Self::SECURITY.bits();
        }
        Self::from_bits_retain(bits)
    }
}

impl<T, D> Mrf24j40<T, D>
where
    T: Transport,
    D: DelayNs,
{
    /// Read the pending events.
    ///
    /// Reading `INTSTAT` clears it, so every event is reported exactly once.
    /// Call this once per interrupt.
    pub fn poll_events(&mut self) -> Events {
        let status = self.bus.read(INTSTAT);
        trace!("mrf24j40: INTSTAT {:#x}", status);
        Events::from_intstat(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::{txstat, TXNCON, txncon};
    use crate::sim::{SimDelay, SimDevice};
    use crate::Config;

    #[test]
    fn map_intstat() {
        assert_eq!(Events::from_intstat(0), Events::empty());
        assert_eq!(Events::from_intstat(intstat::RXIF), Events::RECEIVE_READY);
        assert_eq!(Events::from_intstat(intstat::TXNIF), Events::TRANSMIT_DONE);
        assert_eq!(Events::from_intstat(intstat::SECIF), Events::SECURITY);
        assert_eq!(Events::from_intstat(0xff), Events::all());

        // Sleep, wake, timer and GTS interrupts are dropped.
        let ignored = intstat::SLPIF
            | intstat::WAKEIF
            | intstat::HSYMTMRIF
            | intstat::TXG1IF
            | intstat::TXG2IF;
        assert_eq!(Events::from_intstat(ignored), Events::empty());
    }

    #[test]
    fn poll_clears_events() {
        let mut sim = SimDevice::new();
        sim.load_rx_frame(&[0x01, 0x02], 0, 0);
        sim.raise_interrupt(intstat::WAKEIF);
        let mut radio = Mrf24j40::new(sim, SimDelay::default(), Config::default());

        assert_eq!(radio.poll_events(), Events::RECEIVE_READY);
        assert_eq!(radio.poll_events(), Events::empty());
    }

    #[test]
    fn transmit_raises_done() {
        let mut sim = SimDevice::new();
        sim.set_tx_status(txstat::TXNSTAT);
        let mut radio = Mrf24j40::new(sim, SimDelay::default(), Config::default());

        radio.bus().write(TXNCON, txncon::TXNTRIG);
        assert_eq!(radio.poll_events(), Events::TRANSMIT_DONE);
    }
}
