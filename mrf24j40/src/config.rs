//! Driver configuration.
//!
//! Defaults are generated at build time and can be overridden by setting the
//! matching `MRF24J40_*` environment variable, e.g.
//! `MRF24J40_RESET_POLL_ATTEMPTS=5000`.

use crate::{Error, Result};

/// Build-time defaults.
pub mod defaults {
    include!(concat!(env!("OUT_DIR"), "/config.rs"));
}

/// IEEE 802.15.4 channels in the 2.4 GHz band.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Channel {
    /// 2_405 MHz
    _11 = 11,
    /// 2_410 MHz
    _12,
    /// 2_415 MHz
    _13,
    /// 2_420 MHz
    _14,
    /// 2_425 MHz
    _15,
    /// 2_430 MHz
    _16,
    /// 2_435 MHz
    _17,
    /// 2_440 MHz
    _18,
    /// 2_445 MHz
    _19,
    /// 2_450 MHz
    _20,
    /// 2_455 MHz
    _21,
    /// 2_460 MHz
    _22,
    /// 2_465 MHz
    _23,
    /// 2_470 MHz
    _24,
    /// 2_475 MHz
    _25,
    /// 2_480 MHz
    _26,
}

const CHANNELS: [Channel; 16] = [
    Channel::_11,
    Channel::_12,
    Channel::_13,
    Channel::_14,
    Channel::_15,
    Channel::_16,
    Channel::_17,
    Channel::_18,
    Channel::_19,
    Channel::_20,
    Channel::_21,
    Channel::_22,
    Channel::_23,
    Channel::_24,
    Channel::_25,
    Channel::_26,
];

impl Channel {
    /// Channel from its zero-based index, as stored in `RFCON0`.
    pub const fn from_index(index: u8) -> Self {
        CHANNELS[(index & 0x0f) as usize]
    }

    /// Zero-based index, `0` for channel 11.
    pub const fn index(self) -> u8 {
        self as u8 - 11
    }

    /// Channel number, 11 to 26.
    pub const fn number(self) -> u8 {
        self as u8
    }
}

/// Accepts channel numbers (11 to 26) and zero-based indices. Values of 11
/// and above are always channel numbers, so indices 11 to 15 can only be
/// reached through [`Channel::from_index`].
impl TryFrom<u8> for Channel {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            11..=26 => Ok(Self::from_index(value - 11)),
            0..=10 => Ok(Self::from_index(value)),
            _ => Err(Error::InvalidChannel),
        }
    }
}

impl From<Channel> for u8 {
    fn from(ch: Channel) -> u8 {
        ch.number()
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::_11
    }
}

/// Runtime configuration of the driver.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// How many times `SOFTRST` is polled during bring-up before giving up
    /// with [`Error::DeviceNotResponding`].
    pub reset_poll_attempts: u32,
    /// Settle time around the hardware reset edges, in milliseconds.
    pub reset_settle_ms: u32,
    /// Settle time after an RF state machine reset, in microseconds. The
    /// datasheet requires at least 192.
    pub rf_settle_us: u32,
    /// Energy detection threshold for clear channel assessment (`CCAEDTH`).
    pub cca_ed_threshold: u8,
    /// RF stabilisation time (`TXSTBL.RFSTBL`).
    pub tx_stabilization: u8,
    /// Minimum short interframe spacing (`TXSTBL.MSIFS`).
    pub min_sifs: u8,
    /// Sequence number of the first frame sent with
    /// [`transmit`](crate::Mrf24j40::transmit).
    pub initial_sequence: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reset_poll_attempts: defaults::RESET_POLL_ATTEMPTS,
            reset_settle_ms: defaults::RESET_SETTLE_MS,
            rf_settle_us: defaults::RF_SETTLE_US,
            cca_ed_threshold: defaults::CCA_ED_THRESHOLD,
            tx_stabilization: defaults::TX_STABILIZATION,
            min_sifs: defaults::MIN_SIFS,
            initial_sequence: 0,
        }
    }
}
