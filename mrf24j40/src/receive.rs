//! Receive engine.
//!
//! The RX FIFO holds the received frame as
//!
//! ```text
//! | len | PSDU (len octets, FCS included) | LQI | RSSI |
//! ```
//!
//! Frame decoding is inhibited while a frame is read out so that a new frame
//! cannot overwrite it, and the FIFO is flushed once the frame is consumed
//! (silicon errata: stale FIFO state corrupts the next frame otherwise).
//!
//! A frame can be read in one call with [`Mrf24j40::receive_whole`], or
//! drained in bounded chunks over several calls with
//! [`Mrf24j40::receive_chunk`]. Both write the same layout into the caller's
//! buffer: the length octet followed by the PSDU.

use bitflags::bitflags;
use embedded_hal::delay::DelayNs;
use heapless::Vec;

use crate::device::Mrf24j40;
use crate::frame::{self, MAX_PSDU_LEN};
use crate::registers::*;
use crate::transport::Transport;
use crate::{Error, Result};

/// Link metrics the hardware appends to a received frame.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LinkQuality {
    /// Link quality indicator.
    pub lqi: u8,
    /// Received signal strength indicator.
    pub rssi: u8,
}

bitflags! {
    /// Flags controlling a [`receive_chunk`](Mrf24j40::receive_chunk) call.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ChunkFlags: u8 {
        /// Start a new session: the first octet of the buffer receives the
        /// frame length.
        const FIRST = 1;
        /// Drop the frame being received and resume reception.
        const ABORT = 1 << 1;
    }
}

/// Progress of a chunked receive session.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chunk {
    /// The session is still open, `remaining` PSDU octets are left.
    Pending { remaining: usize },
    /// The whole frame was read and the session is closed.
    Complete(LinkQuality),
    /// The session was aborted.
    Aborted,
}

impl Chunk {
    /// Number of PSDU octets left to read. Zero once the session is closed.
    pub fn remaining(&self) -> usize {
        match self {
            Chunk::Pending { remaining } => *remaining,
            _ => 0,
        }
    }
}

/// A received frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RxFrame {
    psdu: Vec<u8, MAX_PSDU_LEN>,
    link: LinkQuality,
}

impl RxFrame {
    /// The frame as received, FCS included.
    pub fn psdu(&self) -> &[u8] {
        &self.psdu
    }

    /// The frame without its FCS.
    pub fn mpdu(&self) -> &[u8] {
        frame::split_fcs(&self.psdu).map_or(&[][..], |(mpdu, _)| mpdu)
    }

    /// Whether the FCS matches the frame content.
    ///
    /// Only frames received in promiscuous mode with CRC errors accepted can
    /// fail this check.
    pub fn fcs_valid(&self) -> bool {
        frame::split_fcs(&self.psdu).is_some_and(|(mpdu, fcs)| frame::fcs(mpdu) == fcs)
    }

    /// Link metrics of the frame.
    pub fn link(&self) -> LinkQuality {
        self.link
    }
}

#[derive(Debug, Clone, Copy)]
struct RxSession {
    /// PSDU octets not read yet.
    remaining: usize,
    /// Next RX FIFO address to read.
    cursor: LongAddr,
}

/// Receive state owned by the driver. At most one session is open.
#[derive(Debug, Default)]
pub(crate) struct RxEngine {
    session: Option<RxSession>,
}

impl RxEngine {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Drop the open session, if any, without touching the device.
    pub(crate) fn forget(&mut self) {
        self.session = None;
    }
}

impl<T, D> Mrf24j40<T, D>
where
    T: Transport,
    D: DelayNs,
{
    /// Whether a chunked receive session is open.
    pub fn is_receiving(&self) -> bool {
        self.rx.session.is_some()
    }

    /// Read the pending frame in one go.
    ///
    /// `buffer` receives the length octet followed by the PSDU, so it must
    /// be at least one octet longer than the frame.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidFrame`] if the length octet exceeds the largest
    ///   PSDU. The frame is discarded and reception resumes.
    /// - [`Error::BufferTooSmall`] if the frame does not fit. The frame is
    ///   discarded and reception resumes.
    /// - [`Error::SessionInProgress`] if a chunked session is open. The
    ///   device is not touched.
    pub fn receive_whole(&mut self, buffer: &mut [u8]) -> Result<LinkQuality> {
        if self.rx.session.is_some() {
            warn!("mrf24j40: receive while a chunked session is open");
            return Err(Error::SessionInProgress);
        }

        self.disable_reception();

        let len = self.read_frame_length()?;
        let frame_len = len as usize;
        if buffer.len() <= frame_len {
            warn!(
                "mrf24j40: dropping frame of {} octets, buffer holds {}",
                frame_len,
                buffer.len()
            );
            self.finish_reception();
            return Err(Error::BufferTooSmall);
        }

        buffer[0] = len;
        self.bus
            .read_buffer(RXFIFO.offset(1), &mut buffer[1..=frame_len]);
        let link = self.read_link_quality(RXFIFO.offset(1 + frame_len as u16));

        self.finish_reception();

        debug!(
            "mrf24j40: received {} octets, lqi {} rssi {}",
            frame_len, link.lqi, link.rssi
        );
        Ok(link)
    }

    /// Read the pending frame into an owned buffer.
    ///
    /// # Errors
    ///
    /// Same as [`receive_whole`](Self::receive_whole).
    pub fn receive_frame(&mut self) -> Result<RxFrame> {
        let mut buffer = [0u8; MAX_PSDU_LEN + 1];
        let link = self.receive_whole(&mut buffer)?;

        let len = buffer[0] as usize;
        let psdu = Vec::from_slice(&buffer[1..=len]).map_err(|_| Error::BufferTooSmall)?;

        Ok(RxFrame { psdu, link })
    }

    /// Read part of the pending frame.
    ///
    /// With [`ChunkFlags::FIRST`] a session is opened: reception is
    /// inhibited, `buffer[0]` receives the frame length and the rest of the
    /// buffer is filled with the start of the PSDU. Without it, the open
    /// session continues and the whole buffer is filled with the next PSDU
    /// octets. Each call reads at most `buffer.len()` octets.
    ///
    /// Once the last PSDU octet is read, the link quality is read, the FIFO
    /// is flushed, reception resumes and [`Chunk::Complete`] is returned.
    ///
    /// [`ChunkFlags::ABORT`] takes precedence over every other flag: the
    /// frame is discarded, reception resumes and [`Chunk::Aborted`] is
    /// returned. Aborting without an open session does the same.
    ///
    /// # Errors
    ///
    /// - [`Error::SessionInProgress`] when opening a session while one is
    ///   already open.
    /// - [`Error::NoSession`] when continuing without an open session.
    /// - [`Error::BufferTooSmall`] when opening a session with an empty
    ///   buffer.
    ///
    /// The device is not touched in any of these cases.
    ///
    /// - [`Error::InvalidFrame`] when the length octet exceeds the largest
    ///   PSDU. No session is opened, the frame is discarded and reception
    ///   resumes.
    pub fn receive_chunk(&mut self, buffer: &mut [u8], flags: ChunkFlags) -> Result<Chunk> {
        if flags.contains(ChunkFlags::ABORT) {
            if self.rx.session.take().is_some() {
                debug!("mrf24j40: receive session aborted");
            }
            self.finish_reception();
            return Ok(Chunk::Aborted);
        }

        let (mut session, dest) = if flags.contains(ChunkFlags::FIRST) {
            if self.rx.session.is_some() {
                warn!("mrf24j40: receive session already open");
                return Err(Error::SessionInProgress);
            }

            let Some((first, rest)) = buffer.split_first_mut() else {
                return Err(Error::BufferTooSmall);
            };

            self.disable_reception();
            let len = self.read_frame_length()?;
            *first = len;

            debug!("mrf24j40: receive session opened, {} octets", len);
            let session = RxSession {
                remaining: len as usize,
                cursor: RXFIFO.offset(1),
            };
            (session, rest)
        } else {
            match self.rx.session {
                Some(session) => (session, buffer),
                None => {
                    warn!("mrf24j40: receive chunk without an open session");
                    return Err(Error::NoSession);
                }
            }
        };

        let n = session.remaining.min(dest.len());
        self.bus.read_buffer(session.cursor, &mut dest[..n]);
        session.cursor = session.cursor.offset(n as u16);
        session.remaining -= n;

        if session.remaining > 0 {
            self.rx.session = Some(session);
            return Ok(Chunk::Pending {
                remaining: session.remaining,
            });
        }

        let link = self.read_link_quality(session.cursor);
        self.rx.session = None;
        self.finish_reception();

        debug!(
            "mrf24j40: receive session complete, lqi {} rssi {}",
            link.lqi, link.rssi
        );
        Ok(Chunk::Complete(link))
    }

    /// Read the length octet of the pending frame. A length the RX FIFO
    /// cannot hold drops the frame.
    fn read_frame_length(&mut self) -> Result<u8> {
        let len = self.bus.read(RXFIFO);
        if len as usize > MAX_PSDU_LEN {
            warn!("mrf24j40: dropping frame with length octet {}", len);
            self.finish_reception();
            return Err(Error::InvalidFrame);
        }
        Ok(len)
    }

    fn read_link_quality(&mut self, at: LongAddr) -> LinkQuality {
        LinkQuality {
            lqi: self.bus.read(at),
            rssi: self.bus.read(at.offset(1)),
        }
    }

    fn disable_reception(&mut self) {
        self.bus.modify(BBREG1, |v| v | bbreg1::RXDECINV);
    }

    fn enable_reception(&mut self) {
        self.bus.modify(BBREG1, |v| v & !bbreg1::RXDECINV);
    }

    /// Flush the FIFO and resume reception.
    fn finish_reception(&mut self) {
        self.flush_rx_fifo();
        self.enable_reception();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimDelay, SimDevice};
    use crate::Config;

    const PSDU: [u8; 12] = [
        0x61, 0x88, 0x07, 0x34, 0x12, 0xcd, 0xab, 0x01, 0x00, 0x2a, 0x5c, 0x3e,
    ];

    fn radio_with_frame(psdu: &[u8]) -> Mrf24j40<SimDevice, SimDelay> {
        let mut sim = SimDevice::new();
        sim.load_rx_frame(psdu, 0xff, 0x80);
        Mrf24j40::new(sim, SimDelay::default(), Config::default())
    }

    #[test]
    fn whole_frame() {
        let mut radio = radio_with_frame(&PSDU);
        let mut buffer = [0u8; 13];

        let link = radio.receive_whole(&mut buffer).unwrap();

        assert_eq!(link, LinkQuality { lqi: 0xff, rssi: 0x80 });
        assert_eq!(buffer[0], 12);
        assert_eq!(&buffer[1..], &PSDU);

        let sim = radio.transport();
        assert_eq!(sim.flushes(), 1);
        assert!(!sim.reception_disabled());
        // Reception was inhibited, then resumed.
        assert_eq!(
            sim.writes_to(BBREG1).collect::<std::vec::Vec<_>>(),
            [bbreg1::RXDECINV, 0]
        );
    }

    #[test]
    fn whole_frame_too_small() {
        let mut radio = radio_with_frame(&PSDU);
        // Room for the frame but not for the length octet.
        let mut buffer = [0u8; 12];

        assert_eq!(radio.receive_whole(&mut buffer), Err(Error::BufferTooSmall));
        assert_eq!(radio.transport().flushes(), 1);
        assert!(!radio.transport().reception_disabled());
        assert_eq!(buffer, [0; 12]);
    }

    #[test]
    fn receive_frame_checks_fcs() {
        let mut psdu = [0u8; 7];
        psdu[..5].copy_from_slice(&[0x41, 0x88, 0x01, 0xff, 0xff]);
        let fcs = frame::fcs(&psdu[..5]);
        psdu[5..].copy_from_slice(&fcs.to_le_bytes());

        let mut radio = radio_with_frame(&psdu);
        let frame = radio.receive_frame().unwrap();

        assert_eq!(frame.psdu(), &psdu);
        assert_eq!(frame.mpdu(), &psdu[..5]);
        assert!(frame.fcs_valid());
        assert_eq!(frame.link().lqi, 0xff);

        psdu[0] ^= 0x01;
        radio.transport_mut().load_rx_frame(&psdu, 0, 0);
        assert!(!radio.receive_frame().unwrap().fcs_valid());
    }

    #[test]
    fn receive_frame_rejects_oversized_length() {
        let mut radio = radio_with_frame(&[]);
        radio.transport_mut().set_long(RXFIFO, 0xc8);

        assert_eq!(radio.receive_frame(), Err(Error::InvalidFrame));
        assert_eq!(radio.transport().flushes(), 1);
    }

    #[test]
    fn length_octet_beyond_largest_psdu() {
        for len in [MAX_PSDU_LEN as u8 + 1, 0xc8, 0xff] {
            let mut radio = radio_with_frame(&[]);
            radio.transport_mut().set_long(RXFIFO, len);

            let mut buffer = [0xeeu8; 256];
            assert_eq!(radio.receive_whole(&mut buffer), Err(Error::InvalidFrame));
            assert!(buffer.iter().all(|&b| b == 0xee));

            let sim = radio.transport();
            assert_eq!(sim.flushes(), 1);
            assert!(!sim.reception_disabled());
            // Inhibit, the length octet, flush, resume. Nothing past the
            // length octet is read.
            assert_eq!(sim.transactions(), 2 + 1 + 2 + 2);

            let mut radio = radio_with_frame(&[]);
            radio.transport_mut().set_long(RXFIFO, len);

            assert_eq!(
                radio.receive_chunk(&mut buffer, ChunkFlags::FIRST),
                Err(Error::InvalidFrame)
            );
            assert!(!radio.is_receiving());
            assert_eq!(radio.transport().flushes(), 1);
            assert!(!radio.transport().reception_disabled());
            assert_eq!(
                radio.receive_chunk(&mut buffer, ChunkFlags::empty()),
                Err(Error::NoSession)
            );
        }

        // The largest PSDU is still accepted.
        let psdu = [0x5au8; MAX_PSDU_LEN];
        let mut radio = radio_with_frame(&psdu);
        let mut buffer = [0u8; MAX_PSDU_LEN + 1];
        radio.receive_whole(&mut buffer).unwrap();
        assert_eq!(buffer[0] as usize, MAX_PSDU_LEN);
        assert_eq!(&buffer[1..], &psdu);
    }

    #[test]
    fn chunked_frame() {
        let mut radio = radio_with_frame(&PSDU);
        let mut buffer = [0u8; 13];

        let (first, rest) = buffer.split_at_mut(5);
        assert_eq!(
            radio.receive_chunk(first, ChunkFlags::FIRST),
            Ok(Chunk::Pending { remaining: 8 })
        );
        assert!(radio.is_receiving());
        assert!(radio.transport().reception_disabled());
        assert_eq!(radio.transport().flushes(), 0);

        let (second, third) = rest.split_at_mut(4);
        assert_eq!(
            radio.receive_chunk(second, ChunkFlags::empty()),
            Ok(Chunk::Pending { remaining: 4 })
        );

        let result = radio.receive_chunk(third, ChunkFlags::empty()).unwrap();
        assert_eq!(result, Chunk::Complete(LinkQuality { lqi: 0xff, rssi: 0x80 }));
        assert_eq!(result.remaining(), 0);

        assert!(!radio.is_receiving());
        assert_eq!(buffer[0], 12);
        assert_eq!(&buffer[1..], &PSDU);
        assert_eq!(radio.transport().flushes(), 1);
        assert!(!radio.transport().reception_disabled());
    }

    #[test]
    fn chunk_larger_than_remaining() {
        let mut radio = radio_with_frame(&PSDU);
        let mut buffer = [0xeeu8; 32];

        let result = radio.receive_chunk(&mut buffer, ChunkFlags::FIRST).unwrap();
        assert!(matches!(result, Chunk::Complete(_)));
        assert_eq!(&buffer[1..13], &PSDU);
        // Nothing is written past the frame.
        assert!(buffer[13..].iter().all(|&b| b == 0xee));
    }

    #[test]
    fn zero_length_frame() {
        let mut radio = radio_with_frame(&[]);
        let mut buffer = [0u8; 1];

        assert_eq!(
            radio.receive_chunk(&mut buffer, ChunkFlags::FIRST),
            Ok(Chunk::Complete(LinkQuality { lqi: 0xff, rssi: 0x80 }))
        );
        assert_eq!(buffer[0], 0);
    }

    #[test]
    fn session_misuse() {
        let mut radio = radio_with_frame(&PSDU);
        let mut buffer = [0u8; 4];

        assert_eq!(
            radio.receive_chunk(&mut buffer, ChunkFlags::empty()),
            Err(Error::NoSession)
        );
        assert_eq!(
            radio.receive_chunk(&mut [], ChunkFlags::FIRST),
            Err(Error::BufferTooSmall)
        );
        assert_eq!(radio.transport().transactions(), 0);

        radio.receive_chunk(&mut buffer, ChunkFlags::FIRST).unwrap();
        let transactions = radio.transport().transactions();

        assert_eq!(
            radio.receive_chunk(&mut buffer, ChunkFlags::FIRST),
            Err(Error::SessionInProgress)
        );
        assert_eq!(
            radio.receive_whole(&mut [0u8; 128]),
            Err(Error::SessionInProgress)
        );
        assert_eq!(radio.transport().transactions(), transactions);

        // The open session is untouched.
        assert_eq!(
            radio.receive_chunk(&mut buffer, ChunkFlags::empty()),
            Ok(Chunk::Pending { remaining: 5 })
        );
    }

    #[test]
    fn abort_is_idempotent() {
        let mut radio = radio_with_frame(&PSDU);
        let mut buffer = [0u8; 4];

        radio.receive_chunk(&mut buffer, ChunkFlags::FIRST).unwrap();
        assert_eq!(
            radio.receive_chunk(&mut buffer, ChunkFlags::ABORT),
            Ok(Chunk::Aborted)
        );
        assert!(!radio.is_receiving());
        assert!(!radio.transport().reception_disabled());

        // Abort wins over FIRST, and aborting twice is harmless.
        assert_eq!(
            radio.receive_chunk(&mut buffer, ChunkFlags::ABORT | ChunkFlags::FIRST),
            Ok(Chunk::Aborted)
        );
        assert!(!radio.is_receiving());
        assert_eq!(radio.transport().flushes(), 2);

        // A fresh session starts from the FIFO base.
        radio.transport_mut().load_rx_frame(&PSDU[..3], 1, 2);
        let mut buffer = [0u8; 4];
        assert_eq!(
            radio.receive_chunk(&mut buffer, ChunkFlags::FIRST),
            Ok(Chunk::Complete(LinkQuality { lqi: 1, rssi: 2 }))
        );
        assert_eq!(buffer, [3, 0x61, 0x88, 0x07]);
    }
}
