//! Fuzz target: NMEA sentence handling
//!
//! Feeds arbitrary text to the GPS adapter's sentence handler. It must
//! never panic, and a rejected sentence must leave the fix untouched.
//!
//! cargo fuzz run fuzz_nmea_sentence

#![no_main]

use libfuzzer_sys::fuzz_target;
use opensesame::adapters::nmea_gps::NmeaGps;
use opensesame::app::ports::GpsSource;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };
    let mut gps = NmeaGps::new(std::io::empty(), std::io::sink());
    if gps.handle_sentence(line).is_err() {
        assert!(!gps.has_fix());
    }
});
