#![no_main]

use mrf24j40::frame::{split_fcs, DataFrame, DataFrameRepr, FrameControl};

use libfuzzer_sys::{fuzz_target, Corpus};

fuzz_target!(|data: &[u8]| -> Corpus {
    if data.len() > 127 {
        return Corpus::Reject;
    }

    let Some((mpdu, _)) = split_fcs(data) else {
        return Corpus::Reject;
    };

    if let Ok(fc) = FrameControl::new(mpdu) {
        let _ = fc.frame_type();
        let _ = fc.dst_addressing_mode();
        let _ = fc.src_addressing_mode();
    }

    if let Ok(frame) = DataFrame::new(mpdu) {
        let _ = DataFrameRepr::parse(&frame);
        let _ = frame.payload();
    }

    Corpus::Keep
});
