use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;

/// Read the frame with chunk sizes drawn from `rng` and return the filled
/// buffer and link quality.
fn receive_in_chunks(
    radio: &mut Mrf24j40<SimDevice, SimDelay>,
    rng: &mut StdRng,
) -> ([u8; 128], LinkQuality) {
    let mut buffer = [0u8; 128];
    let mut start = 0;
    let mut flags = ChunkFlags::FIRST;

    loop {
        // The first chunk needs room for the length octet.
        let min = if flags.contains(ChunkFlags::FIRST) { 1 } else { 0 };
        let len = rng.gen_range(min..=16).min(buffer.len() - start);
        let end = start + len;

        match radio.receive_chunk(&mut buffer[start..end], flags).unwrap() {
            Chunk::Pending { .. } => {}
            Chunk::Complete(link) => return (buffer, link),
            Chunk::Aborted => unreachable!(),
        }

        start = end;
        flags = ChunkFlags::empty();
    }
}

#[test]
fn chunked_matches_whole() {
    init_logger();
    let mut rng = StdRng::seed_from_u64(0x0004_0f24);

    for _ in 0..200 {
        let len = rng.gen_range(0..=frame::MAX_PSDU_LEN);
        let mut psdu = [0u8; frame::MAX_PSDU_LEN];
        rng.fill(&mut psdu[..len]);
        let (lqi, rssi) = (rng.gen(), rng.gen());

        let mut whole = radio();
        whole.transport_mut().load_rx_frame(&psdu[..len], lqi, rssi);
        let mut expected = [0u8; 128];
        let expected_link = whole.receive_whole(&mut expected).unwrap();

        let mut chunked = radio();
        chunked.transport_mut().load_rx_frame(&psdu[..len], lqi, rssi);
        let (buffer, link) = receive_in_chunks(&mut chunked, &mut rng);

        assert_eq!(buffer, expected);
        assert_eq!(link, expected_link);
        assert_eq!(link, LinkQuality { lqi, rssi });
        assert!(!chunked.is_receiving());
        assert_eq!(chunked.transport().flushes(), 1);
        assert!(!chunked.transport().reception_disabled());
    }
}

#[test]
fn abort_at_any_point() {
    init_logger();
    let psdu: Vec<u8> = (0..60).collect();

    for chunks_before_abort in 0..8 {
        let mut radio = radio();
        radio.transport_mut().load_rx_frame(&psdu, 9, 9);

        let mut buffer = [0u8; 8];
        let mut flags = ChunkFlags::FIRST;
        for _ in 0..chunks_before_abort {
            assert!(matches!(
                radio.receive_chunk(&mut buffer, flags),
                Ok(Chunk::Pending { .. })
            ));
            flags = ChunkFlags::empty();
        }

        assert_eq!(
            radio.receive_chunk(&mut buffer, ChunkFlags::ABORT),
            Ok(Chunk::Aborted)
        );
        assert!(!radio.is_receiving());
        assert_eq!(
            radio.receive_chunk(&mut buffer, ChunkFlags::empty()),
            Err(Error::NoSession)
        );

        // A new session reads the next frame from the start.
        radio.transport_mut().load_rx_frame(&psdu[..5], 7, 8);
        let mut fresh = [0u8; 6];
        assert_eq!(
            radio.receive_chunk(&mut fresh, ChunkFlags::FIRST),
            Ok(Chunk::Complete(LinkQuality { lqi: 7, rssi: 8 }))
        );
        assert_eq!(fresh, [5, 0, 1, 2, 3, 4]);
    }
}
