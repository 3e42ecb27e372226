//! Register transactions.
//!
//! Every register access is one transaction: chip select is asserted, a
//! command of one (short address) or two (long address) bytes is shifted out,
//! the data byte is exchanged and chip select is released again.
//!
//! Short command, one byte:
//!
//! ```text
//! | 7 | 6 .. 1  | 0   |
//! | 0 | address | R/W |
//! ```
//!
//! Long command, two bytes:
//!
//! ```text
//! | 7 | 6 .. 0          | 7 .. 5         | 4   | 3 .. 0 |
//! | 1 | address [9..3]  | address [2..0] | R/W | 0      |
//! ```
//!
//! The R/W bit is set for writes. Buffer accesses are plain sequences of
//! single-byte long transactions at consecutive addresses.

use crate::registers::{LongAddr, Register, ShortAddr};
use crate::transport::Transport;

/// Direction of a transaction.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

impl Access {
    const fn bit(self) -> u8 {
        match self {
            Access::Read => 0,
            Access::Write => 1,
        }
    }
}

/// Marks a long command in the first command byte.
const LONG_FORMAT: u8 = 0x80;

impl ShortAddr {
    /// The command byte for accessing this register.
    pub const fn command(self, access: Access) -> u8 {
        (self.addr() << 1) | access.bit()
    }
}

impl LongAddr {
    /// The two command bytes for accessing this address.
    pub const fn command(self, access: Access) -> [u8; 2] {
        let addr = self.addr();
        [
            LONG_FORMAT | ((addr >> 3) as u8 & 0x7f),
            (((addr & 0x07) as u8) << 5) | (access.bit() << 4),
        ]
    }
}

/// Holds chip select asserted until dropped.
struct Selected<'t, T: Transport> {
    transport: &'t mut T,
}

impl<'t, T: Transport> Selected<'t, T> {
    fn new(transport: &'t mut T) -> Self {
        transport.assert_select();
        Self { transport }
    }

    fn exchange(&mut self, out: u8) -> u8 {
        self.transport.exchange_byte(out)
    }
}

impl<T: Transport> Drop for Selected<'_, T> {
    fn drop(&mut self) {
        self.transport.release_select();
    }
}

/// Register level access to the device.
pub struct Bus<T> {
    transport: T,
}

impl<T: Transport> Bus<T> {
    /// Creates a new [`Bus`] owning the transport.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Give back the transport.
    pub fn release(self) -> T {
        self.transport
    }

    /// Borrow the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Run `f` with chip select asserted, inside a critical section so that
    /// no other context can interleave bytes with this transaction.
    fn transaction<R>(&mut self, f: impl FnOnce(&mut Selected<'_, T>) -> R) -> R {
        let transport = &mut self.transport;
        critical_section::with(|_| {
            let mut selected = Selected::new(transport);
            f(&mut selected)
        })
    }

    /// Read a register.
    pub fn read(&mut self, reg: impl Into<Register>) -> u8 {
        match reg.into() {
            Register::Short(addr) => self.read_short(addr),
            Register::Long(addr) => self.read_long(addr),
        }
    }

    /// Write a register.
    pub fn write(&mut self, reg: impl Into<Register>, value: u8) {
        match reg.into() {
            Register::Short(addr) => self.write_short(addr, value),
            Register::Long(addr) => self.write_long(addr, value),
        }
    }

    /// Read a register and write back `f` applied to its value.
    ///
    /// This is two separate transactions.
    pub fn modify(&mut self, reg: impl Into<Register>, f: impl FnOnce(u8) -> u8) {
        let reg = reg.into();
        let value = self.read(reg);
        self.write(reg, f(value));
    }

    /// Fill `buffer` from consecutive long addresses starting at `start`.
    pub fn read_buffer(&mut self, start: LongAddr, buffer: &mut [u8]) {
        for (i, byte) in buffer.iter_mut().enumerate() {
            *byte = self.read_long(start.offset(i as u16));
        }
    }

    /// Write `data` to consecutive long addresses starting at `start`.
    pub fn write_buffer(&mut self, start: LongAddr, data: &[u8]) {
        for (i, byte) in data.iter().enumerate() {
            self.write_long(start.offset(i as u16), *byte);
        }
    }

    fn read_short(&mut self, addr: ShortAddr) -> u8 {
        let value = self.transaction(|t| {
            t.exchange(addr.command(Access::Read));
            t.exchange(0)
        });
        trace!("mrf24j40: read short {:#x} = {:#x}", addr.addr(), value);
        value
    }

    fn write_short(&mut self, addr: ShortAddr, value: u8) {
        trace!("mrf24j40: write short {:#x} = {:#x}", addr.addr(), value);
        self.transaction(|t| {
            t.exchange(addr.command(Access::Write));
            t.exchange(value);
        });
    }

    fn read_long(&mut self, addr: LongAddr) -> u8 {
        let [msb, lsb] = addr.command(Access::Read);
        let value = self.transaction(|t| {
            t.exchange(msb);
            t.exchange(lsb);
            t.exchange(0)
        });
        trace!("mrf24j40: read long {:#x} = {:#x}", addr.addr(), value);
        value
    }

    fn write_long(&mut self, addr: LongAddr, value: u8) {
        trace!("mrf24j40: write long {:#x} = {:#x}", addr.addr(), value);
        let [msb, lsb] = addr.command(Access::Write);
        self.transaction(|t| {
            t.exchange(msb);
            t.exchange(lsb);
            t.exchange(value);
        });
    }
}
