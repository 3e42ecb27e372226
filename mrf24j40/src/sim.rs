//! A register-level model of the MRF24J40 for tests.
//!
//! [`SimDevice`] implements [`Transport`] and decodes the command bytes it is
//! sent exactly as the device does, so everything above the transport runs
//! unmodified against it. It models:
//!
//! - the short register file and the long address space (including FIFOs),
//! - `INTSTAT` being cleared by a read,
//! - a MAC reset returning the short registers to zero,
//! - the self-clearing `SOFTRST`, `RXFLUSH`, `RFCTL.RFRST` and `TXNCON.TXNTRIG`
//!   bits,
//! - a transmit completing immediately on trigger with a configurable status.
//!
//! Framing violations (bytes exchanged without chip select, nested selects,
//! over-long transactions) panic.

use embedded_hal::delay::DelayNs;
use heapless::Deque;

use crate::registers::*;
use crate::transport::Transport;

const HISTORY: usize = 512;
const LONG_SPACE: usize = LongAddr::MAX as usize + 1;

/// A register write observed by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Write {
    pub reg: Register,
    pub value: u8,
}

pub struct SimDevice {
    short: [u8; 64],
    long: [u8; LONG_SPACE],
    selected: bool,
    command: [u8; 2],
    position: usize,
    reset_line: bool,
    wake_line: bool,
    /// Number of `SOFTRST` reads that still report a pending reset. `None`
    /// means the reset never completes.
    reset_latency: Option<u32>,
    reset_pending: Option<u32>,
    tx_status: u8,
    transactions: usize,
    flushes: usize,
    triggers: usize,
    rf_resets: usize,
    history: Deque<Write, HISTORY>,
}

impl Default for SimDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl SimDevice {
    pub fn new() -> Self {
        Self {
            short: [0; 64],
            long: [0; LONG_SPACE],
            selected: false,
            command: [0; 2],
            position: 0,
            reset_line: false,
            wake_line: false,
            reset_latency: Some(2),
            reset_pending: None,
            tx_status: 0,
            transactions: 0,
            flushes: 0,
            triggers: 0,
            rf_resets: 0,
            history: Deque::new(),
        }
    }

    /// Peek a short register without side effects.
    pub fn short(&self, addr: ShortAddr) -> u8 {
        self.short[addr.addr() as usize]
    }

    /// Peek a long address without side effects.
    pub fn long(&self, addr: LongAddr) -> u8 {
        self.long[addr.addr() as usize]
    }

    pub fn set_short(&mut self, addr: ShortAddr, value: u8) {
        self.short[addr.addr() as usize] = value;
    }

    pub fn set_long(&mut self, addr: LongAddr, value: u8) {
        self.long[addr.addr() as usize] = value;
    }

    /// Peek `len` bytes of long memory starting at `start`.
    pub fn long_slice(&self, start: LongAddr, len: usize) -> &[u8] {
        let start = start.addr() as usize;
        &self.long[start..start + len]
    }

    /// Place a received frame in the RX FIFO and raise the RX interrupt.
    ///
    /// `psdu` is the frame as received over the air, including the FCS.
    pub fn load_rx_frame(&mut self, psdu: &[u8], lqi: u8, rssi: u8) {
        let start = RXFIFO.addr() as usize;
        self.long[start] = psdu.len() as u8;
        self.long[start + 1..start + 1 + psdu.len()].copy_from_slice(psdu);
        self.long[start + 1 + psdu.len()] = lqi;
        self.long[start + 2 + psdu.len()] = rssi;
        self.raise_interrupt(intstat::RXIF);
    }

    pub fn raise_interrupt(&mut self, bits: u8) {
        self.short[INTSTAT.addr() as usize] |= bits;
    }

    /// The `TXSTAT` value reported by the next triggered transmission.
    pub fn set_tx_status(&mut self, status: u8) {
        self.tx_status = status;
    }

    /// Number of `SOFTRST` polls before reset completes, `None` for never.
    pub fn set_reset_latency(&mut self, latency: Option<u32>) {
        self.reset_latency = latency;
    }

    pub fn transactions(&self) -> usize {
        self.transactions
    }

    pub fn flushes(&self) -> usize {
        self.flushes
    }

    pub fn triggers(&self) -> usize {
        self.triggers
    }

    pub fn rf_resets(&self) -> usize {
        self.rf_resets
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Whether the reset line is currently holding the device in reset.
    pub fn reset_line(&self) -> bool {
        self.reset_line
    }

    pub fn wake_line(&self) -> bool {
        self.wake_line
    }

    /// Whether frame decoding is currently inhibited (`BBREG1.RXDECINV`).
    pub fn reception_disabled(&self) -> bool {
        self.short(BBREG1) & bbreg1::RXDECINV != 0
    }

    /// Most recent register writes, oldest first.
    pub fn writes(&self) -> impl Iterator<Item = &Write> {
        self.history.iter()
    }

    /// Writes to `reg`, oldest first.
    pub fn writes_to(&self, reg: impl Into<Register>) -> impl Iterator<Item = u8> + '_ {
        let reg = reg.into();
        self.history
            .iter()
            .filter(move |w| w.reg == reg)
            .map(|w| w.value)
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    fn record(&mut self, reg: Register, value: u8) {
        if self.history.is_full() {
            self.history.pop_front();
        }
        let _ = self.history.push_back(Write { reg, value });
    }

    fn read_short(&mut self, addr: u8) -> u8 {
        let reg = ShortAddr::new(addr);
        let value = self.short[addr as usize];

        if reg == INTSTAT {
            self.short[addr as usize] = 0;
        } else if reg == SOFTRST {
            match self.reset_pending {
                Some(0) => {
                    self.reset_pending = None;
                    self.short[addr as usize] = 0;
                    return 0;
                }
                Some(n) if self.reset_latency.is_some() => self.reset_pending = Some(n - 1),
                _ => {}
            }
        }

        value
    }

    fn write_short(&mut self, addr: u8, value: u8) {
        let reg = ShortAddr::new(addr);
        self.record(reg.into(), value);

        let mut stored = value;
        if reg == SOFTRST {
            if value & softrst::RSTMAC != 0 {
                self.short = [0; 64];
            }
            self.reset_pending = Some(self.reset_latency.unwrap_or(u32::MAX));
        } else if reg == RXFLUSH && value & rxflush::RXFLUSH != 0 {
            self.flushes += 1;
            stored &= !rxflush::RXFLUSH;
        } else if reg == RFCTL && value & rfctl::RFRST != 0 {
            self.rf_resets += 1;
        } else if reg == TXNCON && value & txncon::TXNTRIG != 0 {
            self.triggers += 1;
            stored &= !txncon::TXNTRIG;
            self.short[TXSTAT.addr() as usize] = self.tx_status;
            self.raise_interrupt(intstat::TXNIF);
        }

        self.short[addr as usize] = stored;
    }

    fn write_long(&mut self, addr: u16, value: u8) {
        self.record(LongAddr::new(addr).into(), value);
        self.long[addr as usize] = value;
    }
}

impl Transport for SimDevice {
    fn assert_select(&mut self) {
        assert!(!self.selected, "chip select asserted twice");
        self.selected = true;
        self.position = 0;
    }

    fn release_select(&mut self) {
        assert!(self.selected, "chip select released while not asserted");
        self.selected = false;
        self.transactions += 1;
    }

    fn exchange_byte(&mut self, out: u8) -> u8 {
        assert!(self.selected, "byte exchanged without chip select");
        let position = self.position;
        self.position += 1;

        let long = position > 0 && self.command[0] & 0x80 != 0;
        match (position, long) {
            (0, _) => {
                self.command[0] = out;
                0
            }
            (1, false) => {
                let addr = (self.command[0] >> 1) & 0x3f;
                if self.command[0] & 1 == 1 {
                    self.write_short(addr, out);
                    0
                } else {
                    self.read_short(addr)
                }
            }
            (1, true) => {
                self.command[1] = out;
                0
            }
            (2, true) => {
                let addr = (((self.command[0] & 0x7f) as u16) << 3) | (self.command[1] >> 5) as u16;
                if self.command[1] & 0x10 != 0 {
                    self.write_long(addr, out);
                    0
                } else {
                    self.long[addr as usize]
                }
            }
            _ => panic!("transaction too long"),
        }
    }

    fn assert_reset_line(&mut self, active: bool) {
        self.reset_line = active;
    }

    fn assert_wake_line(&mut self, active: bool) {
        self.wake_line = active;
    }
}

/// A [`DelayNs`] that only accumulates the requested time.
#[derive(Debug, Default, Clone)]
pub struct SimDelay {
    pub elapsed_ns: u64,
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += ns as u64;
    }
}
