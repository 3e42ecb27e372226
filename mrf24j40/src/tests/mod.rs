use std::vec::Vec;

use super::*;
use crate::frame::{DataFrame, DataFrameRepr};
use crate::registers::*;
use crate::sim::{SimDelay, SimDevice};

mod chunking;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn radio() -> Mrf24j40<SimDevice, SimDelay> {
    init_logger();
    Mrf24j40::new(SimDevice::new(), SimDelay::default(), Config::default())
}

#[test]
fn end_to_end() {
    let mut radio = radio();
    radio.full_init(Channel::_15).unwrap();
    radio.set_pan(0x1234);
    radio.set_short_address(0xabcd);

    let sequence = radio.sequence_number();
    assert_eq!(radio.transmit(0x0001, &[0x01, 0x02, 0x03]), Ok(sequence));

    let fifo = radio.transport().long_slice(TXNFIFO, 14);
    assert_eq!(fifo[0], 9);
    assert_eq!(fifo[1], 12);
    assert_eq!(&fifo[11..], &[0x01, 0x02, 0x03]);

    let frame = DataFrame::new(&fifo[2..]).unwrap();
    assert!(frame.frame_control().pan_id_compression());
    assert!(frame.frame_control().ack_request());
    assert_eq!(
        DataFrameRepr::parse(&frame),
        DataFrameRepr {
            sequence_number: sequence,
            pan_id: 0x1234,
            dst_address: 0x0001,
            src_address: 0xabcd,
        }
    );

    assert_eq!(radio.poll_events(), Events::TRANSMIT_DONE);
    assert_eq!(radio.transmit_result(), Ok(()));
    assert_eq!(radio.poll_events(), Events::empty());

    // The peer answers.
    radio
        .transport_mut()
        .load_rx_frame(&[0x41, 0x88, 0x00, 0x34, 0x12, 0xcd, 0xab, 0x01, 0x00, 0xaa, 0xbb], 0xf0, 0x42);
    assert_eq!(radio.poll_events(), Events::RECEIVE_READY);

    let frame = radio.receive_frame().unwrap();
    assert_eq!(frame.psdu().len(), 11);
    assert_eq!(frame.link(), LinkQuality { lqi: 0xf0, rssi: 0x42 });
}

#[test]
fn capacity_rejection_keeps_next_frame_intact() {
    let mut radio = radio();
    radio.transport_mut().load_rx_frame(&[0x55; 40], 1, 2);

    let mut small = [0u8; 16];
    assert_eq!(radio.receive_whole(&mut small), Err(Error::BufferTooSmall));
    assert_eq!(radio.transport().flushes(), 1);
    assert!(!radio.transport().reception_disabled());

    radio.transport_mut().load_rx_frame(&[0x66; 10], 3, 4);
    let mut buffer = [0u8; 16];
    assert_eq!(
        radio.receive_whole(&mut buffer),
        Ok(LinkQuality { lqi: 3, rssi: 4 })
    );
    assert_eq!(buffer[0], 10);
    assert!(buffer[1..11].iter().all(|&b| b == 0x66));
}

#[test]
fn reset_poll_budget() {
    init_logger();

    let config = Config {
        reset_poll_attempts: 3,
        ..Config::default()
    };

    // The simulated reset completes on the third poll.
    let mut radio = Mrf24j40::new(SimDevice::new(), SimDelay::default(), config);
    assert_eq!(radio.full_init(Channel::_11), Ok(()));

    let mut sim = SimDevice::new();
    sim.set_reset_latency(Some(3));
    let mut radio = Mrf24j40::new(sim, SimDelay::default(), config);
    assert_eq!(
        radio.full_init(Channel::_11),
        Err(Error::DeviceNotResponding)
    );
}

#[test]
fn full_init_drops_open_session() {
    let mut radio = radio();
    radio.transport_mut().load_rx_frame(&[0x01; 20], 0, 0);

    let mut buffer = [0u8; 4];
    radio.receive_chunk(&mut buffer, ChunkFlags::FIRST).unwrap();
    assert!(radio.is_receiving());

    radio.full_init(Channel::_20).unwrap();
    assert!(!radio.is_receiving());
    assert!(!radio.transport().reception_disabled());
    assert_eq!(radio.read_channel(), Channel::_20);
}

#[test]
fn every_transaction_is_bracketed() {
    let mut radio = radio();
    radio.full_init(Channel::_26).unwrap();
    radio.transmit(0xffff, &[0; 16]).unwrap();
    radio.transport_mut().load_rx_frame(&[0; 30], 0, 0);
    let mut buffer = [0u8; 8];
    let mut flags = ChunkFlags::FIRST;
    while radio.receive_chunk(&mut buffer, flags).unwrap().remaining() > 0 {
        flags = ChunkFlags::empty();
    }
    radio.sleep(WakeSource::Pin);
    radio.wake(WakeSource::Pin);

    // The simulator panics on any framing violation.
    assert!(!radio.transport().is_selected());
}

#[test]
fn transmit_outcomes_follow_status() {
    let mut radio = radio();
    let statuses = [
        (0x00, Ok(())),
        (txstat::TXNSTAT, Err(Error::TransmitFailed)),
        (txstat::TXNSTAT | txstat::CCAFAIL, Err(Error::ChannelBusy)),
    ];

    let mut sequences = Vec::new();
    for (status, expected) in statuses {
        radio.transport_mut().set_tx_status(status);
        sequences.push(radio.transmit(0x0002, b"hello").unwrap());
        assert_eq!(radio.poll_events(), Events::TRANSMIT_DONE);
        assert_eq!(radio.transmit_result(), expected);
    }

    assert_eq!(sequences, [0, 1, 2]);
}
