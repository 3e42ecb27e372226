//! Driver for the Microchip MRF24J40 IEEE 802.15.4 transceiver.
//!
//! The driver turns radio operations into register transactions over a
//! byte-wide serial [`Transport`]:
//!
//! - [`bus`]: short and long register transactions and FIFO buffer access.
//! - Device control: bring-up, resets, channel, PAN ID, short address,
//!   promiscuous mode, sleep and wake (methods on [`Mrf24j40`]).
//! - Transmit: [`Mrf24j40::transmit`] builds a minimal data frame header,
//!   [`Mrf24j40::transmit_raw`] sends a caller-framed MPDU, and
//!   [`Mrf24j40::transmit_result`] classifies the outcome.
//! - [`receive`]: reads a frame out of the RX FIFO either in one call or in
//!   bounded chunks spread over several calls.
//! - [`events`]: reads and clears the interrupt status.
//!
//! ## Example
//!
//! ```ignore
//! let transport = HalTransport::new(spi, cs, reset, wake);
//! let mut radio = Mrf24j40::new(transport, delay, Config::default());
//!
//! radio.full_init(Channel::_15)?;
//! radio.set_pan(0x1234);
//! radio.set_short_address(0xabcd);
//! radio.transmit(0x0001, &[0x01, 0x02, 0x03])?;
//!
//! // In the interrupt handler:
//! let events = radio.poll_events();
//! if events.contains(Events::TRANSMIT_DONE) {
//!     let outcome = radio.transmit_result();
//! }
//! if events.contains(Events::RECEIVE_READY) {
//!     let mut buffer = [0u8; 128];
//!     let link = radio.receive_whole(&mut buffer)?;
//! }
//! ```
#![no_std]

#[cfg(any(feature = "std", test))]
#[macro_use]
extern crate std;

#[macro_use]
pub(crate) mod utils;

pub mod bus;
pub mod config;
mod control;
mod device;
pub mod events;
pub mod frame;
pub mod receive;
pub mod registers;
#[cfg(any(test, feature = "sim"))]
pub mod sim;
mod transmit;
pub mod transport;

#[cfg(test)]
mod tests;

pub use config::{Channel, Config};
pub use control::{Reset, WakeSource};
pub use device::Mrf24j40;
pub use events::Events;
pub use receive::{Chunk, ChunkFlags, LinkQuality, RxFrame};
pub use transport::{HalTransport, Transport};

/// Errors reported by the driver.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// The receive buffer cannot hold the frame. The frame was discarded.
    BufferTooSmall,
    /// The transmission failed because the channel was busy.
    ChannelBusy,
    /// The transmission failed, e.g. no acknowledgment was received.
    TransmitFailed,
    /// A receive session is already open.
    SessionInProgress,
    /// A continuation chunk was requested without an open receive session.
    NoSession,
    /// The device did not leave reset within the configured poll budget.
    DeviceNotResponding,
    /// Channel number outside 11 to 26 (or index outside 0 to 10).
    InvalidChannel,
    /// The frame does not fit in the transmit FIFO.
    FrameTooLong,
    /// The header length is larger than the frame.
    InvalidHeaderLength,
    /// The address does not fit in its register space.
    InvalidAddress,
    /// The buffer does not hold a frame of the expected shape, or the RX
    /// FIFO reports a length larger than the largest PSDU.
    InvalidFrame,
}

/// A type alias for `Result<T, mrf24j40::Error>`.
pub type Result<T> = core::result::Result<T, Error>;
