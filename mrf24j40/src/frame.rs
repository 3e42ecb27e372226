//! Readers and writers for the MAC frames the driver sends.
//!
//! [`transmit`](crate::Mrf24j40::transmit) always uses the same minimal data
//! frame header: PAN ID compression, short destination and source addresses,
//! acknowledgment requested, 2003 frame version. That header is 9 octets:
//!
//! ```text
//! | frame control | seq | dst PAN | dst addr | src addr |
//! |       2       |  1  |    2    |    2     |    2     |
//! ```
//!
//! All multi-octet fields are little endian.

use crc::{Crc, CRC_16_KERMIT};

use crate::{Error, Result};

/// Length of the header emitted by [`DataFrameRepr`].
pub const HEADER_LEN: usize = 9;
/// Length of the frame check sequence appended by the hardware.
pub const FCS_LEN: usize = 2;
/// The maximum PSDU size (in octets) the PHY shall be able to receive.
pub const MAX_PSDU_LEN: usize = 127;
/// The maximum header plus payload length that can be queued for transmission.
pub const MAX_FRAME_LEN: usize = MAX_PSDU_LEN - FCS_LEN;

const FCS: Crc<u16> = Crc::<u16>::new(&CRC_16_KERMIT);

/// Compute the IEEE 802.15.4 frame check sequence over `mpdu`.
pub fn fcs(mpdu: &[u8]) -> u16 {
    FCS.checksum(mpdu)
}

/// Split a received PSDU into the MPDU and its frame check sequence.
pub fn split_fcs(psdu: &[u8]) -> Option<(&[u8], u16)> {
    if psdu.len() < FCS_LEN {
        return None;
    }
    let (mpdu, fcs) = psdu.split_at(psdu.len() - FCS_LEN);
    Some((mpdu, u16::from_le_bytes([fcs[0], fcs[1]])))
}

/// IEEE 802.15.4 frame type.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum FrameType {
    Beacon = 0b000,
    Data = 0b001,
    Ack = 0b010,
    MacCommand = 0b011,
    Unknown,
}

impl From<u8> for FrameType {
    fn from(value: u8) -> Self {
        match value {
            0b000 => Self::Beacon,
            0b001 => Self::Data,
            0b010 => Self::Ack,
            0b011 => Self::MacCommand,
            _ => Self::Unknown,
        }
    }
}

/// IEEE 802.15.4 frame version.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum FrameVersion {
    Ieee802154_2003 = 0b00,
    Ieee802154_2006 = 0b01,
    Ieee802154_2020 = 0b10,
    Unknown,
}

impl From<u8> for FrameVersion {
    fn from(value: u8) -> Self {
        match value {
            0b00 => Self::Ieee802154_2003,
            0b01 => Self::Ieee802154_2006,
            0b10 => Self::Ieee802154_2020,
            _ => Self::Unknown,
        }
    }
}

/// IEEE 802.15.4 addressing mode.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum AddressingMode {
    Absent = 0b00,
    Short = 0b10,
    Extended = 0b11,
    Unknown,
}

impl From<u8> for AddressingMode {
    fn from(value: u8) -> Self {
        match value {
            0b00 => Self::Absent,
            0b10 => Self::Short,
            0b11 => Self::Extended,
            _ => Self::Unknown,
        }
    }
}

/// A reader/writer for the IEEE 802.15.4 Frame Control field.
pub struct FrameControl<T: AsRef<[u8]>> {
    buffer: T,
}

impl<T: AsRef<[u8]>> FrameControl<T> {
    /// Create a new [`FrameControl`] reader/writer from a given buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is too short.
    pub fn new(buffer: T) -> Result<Self> {
        let fc = Self::new_unchecked(buffer);

        if fc.buffer.as_ref().len() < 2 {
            return Err(Error::InvalidFrame);
        }

        Ok(fc)
    }

    /// Create a new [`FrameControl`] reader/writer without length checking.
    pub fn new_unchecked(buffer: T) -> Self {
        Self { buffer }
    }

    fn raw(&self) -> u16 {
        let b = &self.buffer.as_ref()[..2];
        u16::from_le_bytes([b[0], b[1]])
    }

    /// Return the [`FrameType`] field.
    pub fn frame_type(&self) -> FrameType {
        FrameType::from((self.raw() & 0b111) as u8)
    }

    /// Returns `true` when the security enabled field is set.
    pub fn security_enabled(&self) -> bool {
        (self.raw() >> 3) & 0b1 == 1
    }

    /// Returns `true` when the frame pending field is set.
    pub fn frame_pending(&self) -> bool {
        (self.raw() >> 4) & 0b1 == 1
    }

    /// Returns `true` when the acknowledgement request field is set.
    pub fn ack_request(&self) -> bool {
        (self.raw() >> 5) & 0b1 == 1
    }

    /// Returns `true` when the PAN ID compression field is set.
    pub fn pan_id_compression(&self) -> bool {
        (self.raw() >> 6) & 0b1 == 1
    }

    /// Return the destination [`AddressingMode`].
    pub fn dst_addressing_mode(&self) -> AddressingMode {
        AddressingMode::from(((self.raw() >> 10) & 0b11) as u8)
    }

    /// Return the [`FrameVersion`].
    pub fn frame_version(&self) -> FrameVersion {
        FrameVersion::from(((self.raw() >> 12) & 0b11) as u8)
    }

    /// Return the source [`AddressingMode`].
    pub fn src_addressing_mode(&self) -> AddressingMode {
        AddressingMode::from(((self.raw() >> 14) & 0b11) as u8)
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> FrameControl<T> {
    fn set_field(&mut self, shift: u16, width: u16, value: u16) {
        let b = &mut self.buffer.as_mut()[..2];
        let mask = ((1 << width) - 1) << shift;
        let raw = (u16::from_le_bytes([b[0], b[1]]) & !mask) | ((value << shift) & mask);
        b.copy_from_slice(&raw.to_le_bytes());
    }

    /// Set the frame type field.
    pub fn set_frame_type(&mut self, frame_type: FrameType) {
        self.set_field(0, 3, frame_type as u16);
    }

    /// Set the security enabled field.
    pub fn set_security_enabled(&mut self, security_enabled: bool) {
        self.set_field(3, 1, security_enabled as u16);
    }

    /// Set the frame pending field.
    pub fn set_frame_pending(&mut self, frame_pending: bool) {
        self.set_field(4, 1, frame_pending as u16);
    }

    /// Set the acknowledgement request field.
    pub fn set_ack_request(&mut self, ack_request: bool) {
        self.set_field(5, 1, ack_request as u16);
    }

    /// Set the PAN ID compression field.
    pub fn set_pan_id_compression(&mut self, pan_id_compression: bool) {
        self.set_field(6, 1, pan_id_compression as u16);
    }

    /// Set the destination addressing mode field.
    pub fn set_dst_addressing_mode(&mut self, mode: AddressingMode) {
        self.set_field(10, 2, mode as u16);
    }

    /// Set the frame version field.
    pub fn set_frame_version(&mut self, version: FrameVersion) {
        self.set_field(12, 2, version as u16);
    }

    /// Set the source addressing mode field.
    pub fn set_src_addressing_mode(&mut self, mode: AddressingMode) {
        self.set_field(14, 2, mode as u16);
    }
}

/// A reader for a data frame with the minimal header described in the module
/// documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataFrame<T: AsRef<[u8]>> {
    buffer: T,
}

impl<T: AsRef<[u8]>> DataFrame<T> {
    /// Create a new [`DataFrame`] reader from an MPDU (without FCS).
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is too short or the header does not
    /// have the expected shape.
    pub fn new(buffer: T) -> Result<Self> {
        let frame = Self::new_unchecked(buffer);

        if frame.buffer.as_ref().len() < HEADER_LEN
            || frame.buffer.as_ref().len() > MAX_FRAME_LEN
        {
            return Err(Error::InvalidFrame);
        }

        let fc = frame.frame_control();

        if fc.frame_type() != FrameType::Data
            || fc.security_enabled()
            || !fc.pan_id_compression()
            || fc.dst_addressing_mode() != AddressingMode::Short
            || fc.src_addressing_mode() != AddressingMode::Short
        {
            return Err(Error::InvalidFrame);
        }

        Ok(frame)
    }

    /// Create a new [`DataFrame`] reader without any checks.
    pub fn new_unchecked(buffer: T) -> Self {
        Self { buffer }
    }

    /// Return a [`FrameControl`] reader.
    pub fn frame_control(&self) -> FrameControl<&'_ [u8]> {
        FrameControl::new_unchecked(&self.buffer.as_ref()[..2])
    }

    fn field(&self, offset: usize) -> u16 {
        let b = self.buffer.as_ref();
        u16::from_le_bytes([b[offset], b[offset + 1]])
    }

    /// Return the data sequence number.
    pub fn sequence_number(&self) -> u8 {
        self.buffer.as_ref()[2]
    }

    /// Return the destination PAN ID, also the source PAN ID.
    pub fn dst_pan_id(&self) -> u16 {
        self.field(3)
    }

    /// Return the short destination address.
    pub fn dst_address(&self) -> u16 {
        self.field(5)
    }

    /// Return the short source address.
    pub fn src_address(&self) -> u16 {
        self.field(7)
    }

    /// Return the octets following the header.
    pub fn payload(&self) -> &[u8] {
        &self.buffer.as_ref()[HEADER_LEN..]
    }
}

/// High-level representation of the data frame header.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataFrameRepr {
    pub sequence_number: u8,
    pub pan_id: u16,
    pub dst_address: u16,
    pub src_address: u16,
}

impl DataFrameRepr {
    /// Parse the header of a [`DataFrame`].
    pub fn parse<T: AsRef<[u8]>>(frame: &DataFrame<T>) -> Self {
        Self {
            sequence_number: frame.sequence_number(),
            pan_id: frame.dst_pan_id(),
            dst_address: frame.dst_address(),
            src_address: frame.src_address(),
        }
    }

    /// Write the header into `buffer`. Every octet is overwritten.
    pub fn emit(&self, buffer: &mut [u8; HEADER_LEN]) {
        // The setters only touch their own fields.
        buffer[..2].fill(0);
        let mut fc = FrameControl::new_unchecked(&mut buffer[..2]);
        fc.set_frame_type(FrameType::Data);
        fc.set_security_enabled(false);
        fc.set_frame_pending(false);
        fc.set_ack_request(true);
        fc.set_pan_id_compression(true);
        fc.set_dst_addressing_mode(AddressingMode::Short);
        fc.set_frame_version(FrameVersion::Ieee802154_2003);
        fc.set_src_addressing_mode(AddressingMode::Short);

        buffer[2] = self.sequence_number;
        buffer[3..5].copy_from_slice(&self.pan_id.to_le_bytes());
        buffer[5..7].copy_from_slice(&self.dst_address.to_le_bytes());
        buffer[7..9].copy_from_slice(&self.src_address.to_le_bytes());
    }
}
