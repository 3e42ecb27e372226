//! Pretty printer for MRF24J40 receive buffers.
//!
//! The input is what [`Mrf24j40::receive_whole`](mrf24j40::Mrf24j40) fills in
//! (the length octet followed by the PSDU), optionally followed by the LQI and
//! RSSI octets as they sit in the RX FIFO.

use colored::*;
use mrf24j40::frame::{self, DataFrame, FrameControl};
use mrf24j40::{Error, Result};

struct Writer<'b> {
    buffer: &'b mut String,
    indent: usize,
}

impl<'b> Writer<'b> {
    fn new(buffer: &'b mut String) -> Self {
        Self { buffer, indent: 0 }
    }

    fn increase_indent(&mut self) {
        self.indent += 2;
    }

    fn decrease_indent(&mut self) {
        self.indent -= 2;
    }

    fn write(&mut self, s: String) {
        self.buffer.push_str(&" ".repeat(self.indent));
        self.buffer.push_str(&s);
    }

    fn writeln(&mut self, s: String) {
        self.write(s);
        self.buffer.push('\n');
    }
}

pub struct FrameParser {}

impl FrameParser {
    pub fn parse_hex(input: &str) -> Result<String> {
        let data = hex::decode(input.trim()).map_err(|_| Error::InvalidFrame)?;
        Self::parse(&data)
    }

    pub fn parse(input: &[u8]) -> Result<String> {
        let (&len, rest) = input.split_first().ok_or(Error::InvalidFrame)?;
        let len = len as usize;
        if rest.len() < len {
            return Err(Error::InvalidFrame);
        }

        let (psdu, trailer) = rest.split_at(len);
        let (mpdu, fcs) = frame::split_fcs(psdu).ok_or(Error::InvalidFrame)?;
        let fc = FrameControl::new(mpdu)?;

        let mut buffer = String::new();
        let mut w = Writer::new(&mut buffer);

        // -----------------------------------------------------------------
        // Receive Buffer
        // -----------------------------------------------------------------
        w.writeln("Receive Buffer".underline().bold().to_string());
        w.increase_indent();
        w.writeln(format!("{}: {}", "length".bold(), len));
        w.writeln(format!(
            "{}: {:04x} ({})",
            "fcs".bold(),
            fcs,
            if frame::fcs(mpdu) == fcs {
                "ok".green()
            } else {
                "bad".red()
            }
        ));
        if let [lqi, rssi, ..] = trailer {
            w.writeln(format!("{}: {}", "lqi".bold(), lqi));
            w.writeln(format!("{}: {}", "rssi".bold(), rssi));
        }
        w.decrease_indent();

        // -----------------------------------------------------------------
        // Frame Control
        // -----------------------------------------------------------------
        w.writeln("Frame Control".underline().bold().to_string());
        w.increase_indent();
        w.writeln(format!(
            "{}: {}",
            "frame type".bold(),
            format!("{:?}", fc.frame_type()).bright_blue(),
        ));
        w.writeln(format!(
            "{}: {}",
            "security".bold(),
            fc.security_enabled() as usize
        ));
        w.writeln(format!(
            "{}: {}",
            "frame pending".bold(),
            fc.frame_pending() as usize
        ));
        w.writeln(format!(
            "{}: {}",
            "ack request".bold(),
            fc.ack_request() as usize
        ));
        w.writeln(format!(
            "{}: {}",
            "pan id compression".bold(),
            fc.pan_id_compression() as usize
        ));
        w.writeln(format!(
            "{}: {:?}",
            "dst addressing mode".bold(),
            fc.dst_addressing_mode()
        ));
        w.writeln(format!(
            "{}: {:?}",
            "src addressing mode".bold(),
            fc.src_addressing_mode()
        ));
        w.writeln(format!(
            "{}: {} ({:?})",
            "frame version".bold(),
            fc.frame_version() as usize,
            fc.frame_version()
        ));
        w.decrease_indent();

        // Only the header shape the driver sends is decoded further.
        let Ok(data) = DataFrame::new(mpdu) else {
            w.writeln("Raw".underline().bold().to_string());
            w.increase_indent();
            w.writeln(format!("{:x?}", &mpdu[2..]));
            w.decrease_indent();
            return Ok(buffer);
        };

        // -----------------------------------------------------------------
        // Sequence Number
        // -----------------------------------------------------------------
        w.writeln(format!("{}", "Sequence Number".underline().bold()));
        w.increase_indent();
        w.writeln(format!(
            "{}: {}",
            "sequence number".bold(),
            data.sequence_number()
        ));
        w.decrease_indent();

        // -----------------------------------------------------------------
        // Addressing
        // -----------------------------------------------------------------
        w.writeln(format!("{}", "Addressing".underline().bold()));
        w.increase_indent();
        w.writeln(format!("{}: {:04x}", "dst pan id".bold(), data.dst_pan_id()));
        w.writeln(format!(
            "{}: {:04x}{}",
            "dst addr".bold(),
            data.dst_address(),
            if data.dst_address() == 0xffff {
                " (broadcast)"
            } else {
                ""
            }
        ));
        w.writeln(format!("{}: {:04x}", "src addr".bold(), data.src_address()));
        w.decrease_indent();

        // -----------------------------------------------------------------
        // Payload
        // -----------------------------------------------------------------
        if !data.payload().is_empty() {
            w.writeln(format!("{}", "Payload".underline().bold()));
            w.increase_indent();
            w.writeln(format!("{:x?}", data.payload()));
            w.decrease_indent();
        }

        Ok(buffer)
    }
}
