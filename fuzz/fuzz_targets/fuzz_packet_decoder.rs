//! Fuzz target: `link::codec::decode`
//!
//! Drives arbitrary byte sequences through the packet decoder and asserts
//! that it never panics, accepts only 8-byte packets with a known kind,
//! and that anything it accepts re-encodes to the same bytes.
//!
//! cargo fuzz run fuzz_packet_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use opensesame::link::codec::{decode, encode, PACKET_LEN};

fuzz_target!(|data: &[u8]| {
    match decode(data) {
        Ok(msg) => {
            assert_eq!(data.len(), PACKET_LEN);
            assert_eq!(&encode(&msg)[..], data, "decode/encode must be lossless");
        }
        Err(_) => {}
    }
});
