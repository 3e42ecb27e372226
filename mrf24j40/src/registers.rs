//! MRF24J40 register and memory map.
//!
//! The device exposes two address spaces. Short addresses (6 bits) cover the
//! most frequently used control registers and are accessed with a one byte
//! command. Long addresses (10 bits) cover the remaining control registers and
//! the on-chip FIFOs, and are accessed with a two byte command. The long
//! command has room for ten address bits only, so `0x3ff` is the top of the
//! long space.
//!
//! Register and bit names follow the datasheet (DS39776).

use crate::{Error, Result};

/// An address in the 6-bit short register space.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShortAddr(u8);

impl ShortAddr {
    /// Highest valid short address.
    pub const MAX: u8 = 0x3f;

    /// Create a short address.
    ///
    /// # Panics
    ///
    /// Panics if `addr` does not fit in 6 bits. In a `const` context this is a
    /// compile error, which is how the register table below is checked.
    pub const fn new(addr: u8) -> Self {
        assert!(addr <= Self::MAX, "short address out of range");
        Self(addr)
    }

    /// Create a short address, returning `None` if it does not fit in 6 bits.
    pub const fn checked(addr: u8) -> Option<Self> {
        if addr <= Self::MAX {
            Some(Self(addr))
        } else {
            None
        }
    }

    /// Return the raw address.
    pub const fn addr(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for ShortAddr {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::checked(value).ok_or(Error::InvalidAddress)
    }
}

/// An address in the 10-bit long register and memory space.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LongAddr(u16);

impl LongAddr {
    /// Highest valid long address.
    pub const MAX: u16 = 0x3ff;

    /// Create a long address.
    ///
    /// # Panics
    ///
    /// Panics if `addr` does not fit in 10 bits.
    pub const fn new(addr: u16) -> Self {
        assert!(addr <= Self::MAX, "long address out of range");
        Self(addr)
    }

    /// Create a long address, returning `None` if it does not fit in 10 bits.
    pub const fn checked(addr: u16) -> Option<Self> {
        if addr <= Self::MAX {
            Some(Self(addr))
        } else {
            None
        }
    }

    /// Return the raw address.
    pub const fn addr(self) -> u16 {
        self.0
    }

    /// Return the address `n` bytes further, wrapping inside the 10-bit space.
    pub const fn offset(self, n: u16) -> Self {
        Self(self.0.wrapping_add(n) & Self::MAX)
    }
}

impl TryFrom<u16> for LongAddr {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self> {
        Self::checked(value).ok_or(Error::InvalidAddress)
    }
}

/// A register in either address space.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    Short(ShortAddr),
    Long(LongAddr),
}

impl From<ShortAddr> for Register {
    fn from(addr: ShortAddr) -> Self {
        Self::Short(addr)
    }
}

impl From<LongAddr> for Register {
    fn from(addr: LongAddr) -> Self {
        Self::Long(addr)
    }
}

// Short address control registers
pub const RXMCR: ShortAddr = ShortAddr::new(0x00);
pub const PANIDL: ShortAddr = ShortAddr::new(0x01);
pub const PANIDH: ShortAddr = ShortAddr::new(0x02);
pub const SADRL: ShortAddr = ShortAddr::new(0x03);
pub const SADRH: ShortAddr = ShortAddr::new(0x04);
pub const EADR0: ShortAddr = ShortAddr::new(0x05);
pub const RXFLUSH: ShortAddr = ShortAddr::new(0x0d);
pub const ORDER: ShortAddr = ShortAddr::new(0x10);
pub const TXMCR: ShortAddr = ShortAddr::new(0x11);
pub const ACKTMOUT: ShortAddr = ShortAddr::new(0x12);
pub const PACON2: ShortAddr = ShortAddr::new(0x18);
pub const TXBCON0: ShortAddr = ShortAddr::new(0x1a);
pub const TXNCON: ShortAddr = ShortAddr::new(0x1b);
pub const TXG1CON: ShortAddr = ShortAddr::new(0x1c);
pub const TXG2CON: ShortAddr = ShortAddr::new(0x1d);
pub const TXPEND: ShortAddr = ShortAddr::new(0x21);
pub const WAKECON: ShortAddr = ShortAddr::new(0x22);
pub const TXSTAT: ShortAddr = ShortAddr::new(0x24);
pub const SOFTRST: ShortAddr = ShortAddr::new(0x2a);
pub const SECCON0: ShortAddr = ShortAddr::new(0x2c);
pub const TXSTBL: ShortAddr = ShortAddr::new(0x2e);
pub const RXSR: ShortAddr = ShortAddr::new(0x30);
pub const INTSTAT: ShortAddr = ShortAddr::new(0x31);
pub const INTCON: ShortAddr = ShortAddr::new(0x32);
pub const SLPACK: ShortAddr = ShortAddr::new(0x35);
pub const RFCTL: ShortAddr = ShortAddr::new(0x36);
pub const BBREG0: ShortAddr = ShortAddr::new(0x38);
pub const BBREG1: ShortAddr = ShortAddr::new(0x39);
pub const BBREG2: ShortAddr = ShortAddr::new(0x3a);
pub const BBREG6: ShortAddr = ShortAddr::new(0x3e);
pub const CCAEDTH: ShortAddr = ShortAddr::new(0x3f);

// Long address control registers
pub const RFCON0: LongAddr = LongAddr::new(0x200);
pub const RFCON1: LongAddr = LongAddr::new(0x201);
pub const RFCON2: LongAddr = LongAddr::new(0x202);
pub const RFCON3: LongAddr = LongAddr::new(0x203);
pub const RFCON5: LongAddr = LongAddr::new(0x205);
pub const RFCON6: LongAddr = LongAddr::new(0x206);
pub const RFCON7: LongAddr = LongAddr::new(0x207);
pub const RFCON8: LongAddr = LongAddr::new(0x208);
pub const RFSTATE: LongAddr = LongAddr::new(0x20f);
pub const RSSI: LongAddr = LongAddr::new(0x210);
pub const SLPCON0: LongAddr = LongAddr::new(0x211);
pub const SLPCON1: LongAddr = LongAddr::new(0x220);

// Long address memory map
/// Transmit normal FIFO, 128 bytes.
pub const TXNFIFO: LongAddr = LongAddr::new(0x000);
/// Transmit beacon FIFO, 128 bytes.
pub const TXBFIFO: LongAddr = LongAddr::new(0x080);
/// Transmit GTS1 FIFO, 128 bytes.
pub const TXG1FIFO: LongAddr = LongAddr::new(0x100);
/// Transmit GTS2 FIFO, 128 bytes.
pub const TXG2FIFO: LongAddr = LongAddr::new(0x180);
/// Security key FIFO, 64 bytes.
pub const SECKFIFO: LongAddr = LongAddr::new(0x280);
/// Receive FIFO, 144 bytes (length, PSDU, LQI, RSSI).
pub const RXFIFO: LongAddr = LongAddr::new(0x300);

/// Size of each transmit FIFO.
pub const TX_FIFO_LEN: usize = 128;

pub mod rxmcr {
    pub const NOACKRSP: u8 = 1 << 5;
    pub const PANCOORD: u8 = 1 << 3;
    pub const COORD: u8 = 1 << 2;
    pub const ERRPKT: u8 = 1 << 1;
    pub const PROMI: u8 = 1;
}

pub mod rxflush {
    pub const WAKEPOL: u8 = 1 << 6;
    pub const WAKEPAD: u8 = 1 << 5;
    pub const CMDONLY: u8 = 1 << 3;
    pub const DATAONLY: u8 = 1 << 2;
    pub const BCNONLY: u8 = 1 << 1;
    pub const RXFLUSH: u8 = 1;
}

pub mod pacon2 {
    pub const FIFOEN: u8 = 1 << 7;
}

pub mod txncon {
    pub const FPSTAT: u8 = 1 << 4;
    pub const INDIRECT: u8 = 1 << 3;
    pub const TXNACKREQ: u8 = 1 << 2;
    pub const TXNSECEN: u8 = 1 << 1;
    pub const TXNTRIG: u8 = 1;
}

pub mod wakecon {
    pub const IMMWAKE: u8 = 1 << 7;
    pub const REGWAKE: u8 = 1 << 6;
}

pub mod txstat {
    pub const CCAFAIL: u8 = 1 << 5;
    pub const TXNSTAT: u8 = 1;
}

pub mod softrst {
    pub const RSTPWR: u8 = 1 << 2;
    pub const RSTBB: u8 = 1 << 1;
    pub const RSTMAC: u8 = 1;
}

pub mod txstbl {
    pub const fn rfstbl(x: u8) -> u8 {
        (x & 0x0f) << 4
    }

    pub const fn msifs(x: u8) -> u8 {
        x & 0x0f
    }
}

pub mod intstat {
    pub const SLPIF: u8 = 1 << 7;
    pub const WAKEIF: u8 = 1 << 6;
    pub const HSYMTMRIF: u8 = 1 << 5;
    pub const SECIF: u8 = 1 << 4;
    pub const RXIF: u8 = 1 << 3;
    pub const TXG2IF: u8 = 1 << 2;
    pub const TXG1IF: u8 = 1 << 1;
    pub const TXNIF: u8 = 1;
}

/// Interrupt enables. A cleared bit enables the interrupt.
pub mod intcon {
    pub const SLPIE: u8 = 1 << 7;
    pub const WAKEIE: u8 = 1 << 6;
    pub const HSYMTMRIE: u8 = 1 << 5;
    pub const SECIE: u8 = 1 << 4;
    pub const RXIE: u8 = 1 << 3;
    pub const TXG2IE: u8 = 1 << 2;
    pub const TXG1IE: u8 = 1 << 1;
    pub const TXNIE: u8 = 1;
}

pub mod slpack {
    pub const SLPACK: u8 = 1 << 7;
}

pub mod rfctl {
    pub const fn wakecnt(x: u8) -> u8 {
        (x & 0x03) << 3
    }

    pub const RFRST: u8 = 1 << 2;
    pub const RFTXMODE: u8 = 1 << 1;
    pub const RFRXMODE: u8 = 1;
}

pub mod bbreg1 {
    /// Invert the demodulator output, which stops the device from decoding
    /// new frames.
    pub const RXDECINV: u8 = 1 << 2;
}

pub mod bbreg2 {
    pub const fn ccamode(x: u8) -> u8 {
        (x & 0x03) << 6
    }

    pub const fn ccasth(x: u8) -> u8 {
        (x & 0x0f) << 2
    }
}

pub mod rfcon0 {
    pub const fn channel(x: u8) -> u8 {
        (x & 0x0f) << 4
    }

    pub const fn rfopt(x: u8) -> u8 {
        x & 0x0f
    }
}

pub mod rfcon1 {
    pub const fn vcoopt(x: u8) -> u8 {
        x
    }
}

pub mod rfcon2 {
    pub const PLLEN: u8 = 1 << 7;
}

pub mod rfcon6 {
    pub const TXFIL: u8 = 1 << 7;
}

pub mod rfcon7 {
    pub const fn slpclksel(x: u8) -> u8 {
        (x & 0x03) << 6
    }
}

pub mod rfcon8 {
    pub const RFVCO: u8 = 1 << 4;
}

pub mod slpcon0 {
    pub const INTEDGE: u8 = 1 << 1;
    pub const SLPCLKEN: u8 = 1;
}

pub mod slpcon1 {
    /// Active low: setting the bit disables the CLKOUT pin.
    pub const CLKOUTDIS: u8 = 1 << 5;

    pub const fn slpclkdiv(x: u8) -> u8 {
        x & 0x1f
    }
}
