#![no_main]

use mrf24j40::sim::{SimDelay, SimDevice};
use mrf24j40::{Chunk, ChunkFlags, Config, Mrf24j40};

use libfuzzer_sys::{fuzz_target, Corpus};

fn radio(psdu: &[u8]) -> Mrf24j40<SimDevice, SimDelay> {
    let mut sim = SimDevice::new();
    sim.load_rx_frame(psdu, 0x5a, 0xa5);
    Mrf24j40::new(sim, SimDelay::default(), Config::default())
}

// Chunked and single-call reception must fill the buffer identically for any
// chunk partition.
fuzz_target!(|input: (&[u8], Vec<u8>)| -> Corpus {
    let (psdu, chunks) = input;
    if psdu.len() > 127 || chunks.is_empty() {
        return Corpus::Reject;
    }

    let mut expected = [0u8; 128];
    let link = radio(psdu).receive_whole(&mut expected).unwrap();

    let mut radio = radio(psdu);
    let mut buffer = [0u8; 128];
    let mut start = 0;
    let mut flags = ChunkFlags::FIRST;

    for len in chunks.iter().cycle() {
        let min = if flags.contains(ChunkFlags::FIRST) { 1 } else { 0 };
        let end = (start + (*len as usize).max(min)).min(buffer.len());

        match radio.receive_chunk(&mut buffer[start..end], flags).unwrap() {
            Chunk::Pending { .. } if start == end && flags.is_empty() => {
                // A zero-length continuation makes no progress.
                if chunks.iter().all(|&c| c == 0) {
                    return Corpus::Reject;
                }
            }
            Chunk::Pending { .. } => {}
            Chunk::Complete(l) => {
                assert_eq!(l, link);
                break;
            }
            Chunk::Aborted => unreachable!(),
        }

        start = end;
        flags = ChunkFlags::empty();
    }

    assert_eq!(buffer, expected);
    assert!(!radio.is_receiving());

    Corpus::Keep
});
