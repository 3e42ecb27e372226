use embedded_hal::delay::DelayNs;

use crate::bus::Bus;
use crate::config::Config;
use crate::receive::RxEngine;
use crate::transmit::TxEngine;
use crate::transport::Transport;

/// An MRF24J40 transceiver.
///
/// The driver exclusively owns the transport. Every operation takes
/// `&mut self`, so register transactions and the receive session can only be
/// driven from one context at a time. Sharing the driver between an interrupt
/// handler and the main loop requires wrapping it in a mutex.
pub struct Mrf24j40<T, D> {
    pub(crate) bus: Bus<T>,
    pub(crate) delay: D,
    pub(crate) config: Config,
    pub(crate) tx: TxEngine,
    pub(crate) rx: RxEngine,
}

impl<T, D> Mrf24j40<T, D>
where
    T: Transport,
    D: DelayNs,
{
    /// Creates a new [`Mrf24j40`]. The device is not touched until
    /// [`full_init`](Self::full_init) or another operation is called.
    pub fn new(transport: T, delay: D, config: Config) -> Self {
        Self {
            bus: Bus::new(transport),
            delay,
            tx: TxEngine::new(config.initial_sequence),
            rx: RxEngine::new(),
            config,
        }
    }

    /// Give back the transport and the delay.
    pub fn release(self) -> (T, D) {
        (self.bus.release(), self.delay)
    }

    /// The runtime configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Raw register access.
    ///
    /// Writing registers behind the driver's back can break the receive
    /// session and the transmit sequence.
    pub fn bus(&mut self) -> &mut Bus<T> {
        &mut self.bus
    }

    /// Borrow the transport.
    pub fn transport(&self) -> &T {
        self.bus.transport()
    }

    /// Mutably borrow the transport, for instance to drive it in tests.
    pub fn transport_mut(&mut self) -> &mut T {
        self.bus.transport_mut()
    }
}
