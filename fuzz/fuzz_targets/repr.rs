#![no_main]

use mrf24j40::frame::{DataFrame, DataFrameRepr, HEADER_LEN};

use libfuzzer_sys::fuzz_target;

fuzz_target!(|repr: DataFrameRepr| {
    let mut buffer = [0; HEADER_LEN];
    repr.emit(&mut buffer);

    let frame = DataFrame::new(&buffer[..]).expect("emitted header must parse");
    assert_eq!(DataFrameRepr::parse(&frame), repr);
});
