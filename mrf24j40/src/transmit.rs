//! Transmit engine.
//!
//! Frames are written to the transmit normal FIFO prefixed by two length
//! octets, the header length and the frame length:
//!
//! ```text
//! | hdr len | frame len | header | payload |
//! |    1    |     1     |   ..   |   ..    |
//! ```
//!
//! The hardware appends the FCS, so the frame length excludes it.

use embedded_hal::delay::DelayNs;
use rand_core::RngCore;

use crate::device::Mrf24j40;
use crate::frame::{DataFrameRepr, HEADER_LEN, MAX_FRAME_LEN};
use crate::registers::*;
use crate::transport::Transport;
use crate::{Error, Result};

/// Transmit state owned by the driver: the data sequence number.
#[derive(Debug)]
pub(crate) struct TxEngine {
    sequence: u8,
}

impl TxEngine {
    pub(crate) fn new(initial_sequence: u8) -> Self {
        Self {
            sequence: initial_sequence,
        }
    }

    /// Hand out the current sequence number and advance the counter.
    pub(crate) fn next_sequence(&mut self) -> u8 {
        let sequence = self.sequence;
        self.sequence = self.sequence.wrapping_add(1);
        sequence
    }
}

/// Classify the content of `TXSTAT` after a transmit normal FIFO
/// transmission has finished.
pub(crate) fn classify(status: u8) -> Result<()> {
    if status & txstat::TXNSTAT == 0 {
        Ok(())
    } else if status & txstat::CCAFAIL != 0 {
        Err(Error::ChannelBusy)
    } else {
        Err(Error::TransmitFailed)
    }
}

impl<T, D> Mrf24j40<T, D>
where
    T: Transport,
    D: DelayNs,
{
    /// Send a frame that already carries its MAC header.
    ///
    /// `frame` holds the header followed by the payload, `header_len` is the
    /// length of the header within it. An acknowledgment is requested.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FrameTooLong`] if the frame does not fit in the FIFO
    /// and [`Error::InvalidHeaderLength`] if `header_len` is larger than the
    /// frame. The device is not touched in either case.
    pub fn transmit_raw(&mut self, frame: &[u8], header_len: u8) -> Result<()> {
        if frame.len() > MAX_FRAME_LEN {
            warn!("mrf24j40: frame of {} octets is too long", frame.len());
            return Err(Error::FrameTooLong);
        }

        if header_len as usize > frame.len() {
            warn!(
                "mrf24j40: header length {} exceeds frame length {}",
                header_len,
                frame.len()
            );
            return Err(Error::InvalidHeaderLength);
        }

        self.bus.modify(TXNCON, |v| v | txncon::TXNACKREQ);
        self.bus
            .write_buffer(TXNFIFO, &[header_len, frame.len() as u8]);
        self.bus.write_buffer(TXNFIFO.offset(2), frame);
        self.trigger();

        Ok(())
    }

    /// Send `payload` to `dst_address` in a data frame.
    ///
    /// The header uses PAN ID compression with the configured PAN ID, short
    /// addresses on both ends with the configured short address as source,
    /// and requests an acknowledgment. Returns the sequence number of the
    /// frame.
    ///
    /// The sequence number advances on every call that reaches the device,
    /// whatever the outcome of the transmission.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FrameTooLong`] if header and payload do not fit in
    /// the FIFO. The sequence number is not consumed in that case.
    pub fn transmit(&mut self, dst_address: u16, payload: &[u8]) -> Result<u8> {
        let frame_len = HEADER_LEN + payload.len();
        if frame_len > MAX_FRAME_LEN {
            warn!("mrf24j40: payload of {} octets is too long", payload.len());
            return Err(Error::FrameTooLong);
        }

        let repr = DataFrameRepr {
            sequence_number: self.tx.next_sequence(),
            pan_id: self.pan_id(),
            dst_address,
            src_address: self.short_address(),
        };

        let mut header = [0u8; HEADER_LEN];
        repr.emit(&mut header);

        debug!(
            "mrf24j40: transmit seq {} to {:#x}, {} octets",
            repr.sequence_number, dst_address, frame_len
        );

        self.bus.modify(TXNCON, |v| v | txncon::TXNACKREQ);
        self.bus
            .write_buffer(TXNFIFO, &[HEADER_LEN as u8, frame_len as u8]);
        self.bus.write_buffer(TXNFIFO.offset(2), &header);
        self.bus
            .write_buffer(TXNFIFO.offset(2 + HEADER_LEN as u16), payload);
        self.trigger();

        Ok(repr.sequence_number)
    }

    fn trigger(&mut self) {
        self.bus.modify(TXNCON, |v| v | txncon::TXNTRIG);
    }

    /// Outcome of the last transmission. Call after
    /// [`Events::TRANSMIT_DONE`](crate::Events::TRANSMIT_DONE) was reported.
    ///
    /// This only reads the status. Retrying is up to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelBusy`] if clear channel assessment failed and
    /// [`Error::TransmitFailed`] for any other failure, typically a missing
    /// acknowledgment.
    pub fn transmit_result(&mut self) -> Result<()> {
        let status = self.bus.read(TXSTAT);
        let result = classify(status);

        match result {
            Ok(()) => {
                debug!("mrf24j40: transmit ok");
            }
            Err(_) => {
                debug!("mrf24j40: transmit failed, status {:#x}", status);
            }
        }

        result
    }

    /// The sequence number the next [`transmit`](Self::transmit) will use.
    pub fn sequence_number(&self) -> u8 {
        self.tx.sequence
    }

    /// Start the sequence numbers at a random value.
    pub fn seed_sequence(&mut self, rng: &mut impl RngCore) {
        self.tx = TxEngine::new(rng.next_u32() as u8);
    }
}
