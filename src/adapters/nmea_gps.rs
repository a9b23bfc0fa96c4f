//! NMEA GPS adapter (MTK33x9-style receivers).
//!
//! Implements [`GpsSource`] on top of a line-oriented NMEA stream: the UART
//! on the board, or a recorded log file on the host. Each
//! [`update`](GpsSource::update) consumes at most one sentence, so replaying
//! a 1 Hz capture at loop speed reproduces the drive.
//!
//! Only `RMC` sentences (any talker: `GP`, `GN`, ...) move the fix state.
//! Everything else that passes the checksum (GGA, PMTK acks) is ignored.
//!
//! ```text
//!  $GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A
//!         time   │ lat      │ lon       │
//!                └ status: A = fix, V = no fix
//! ```

use std::io::{self, BufRead, Write};

use log::{debug, info};

use crate::app::ports::GpsSource;
use crate::config::GpsOutputMode;
use crate::error::GpsError;
use crate::geofence::Position;

/// XOR of every byte between `$` and `*`.
pub fn nmea_checksum(body: &str) -> u8 {
    body.bytes().fold(0, |acc, b| acc ^ b)
}

/// Frame a sentence body as `$<body>*<checksum>\r\n`.
pub fn frame_sentence(body: &str) -> String {
    format!("${}*{:02X}\r\n", body, nmea_checksum(body))
}

/// Strip framing and verify the checksum. Returns the body.
pub fn verify_sentence(line: &str) -> Result<&str, GpsError> {
    let inner = line.trim().strip_prefix('$').ok_or(GpsError::BadSentence)?;
    let (body, given) = inner.rsplit_once('*').ok_or(GpsError::BadSentence)?;
    let given = u8::from_str_radix(given, 16).map_err(|_| GpsError::BadSentence)?;
    if nmea_checksum(body) != given {
        return Err(GpsError::BadSentence);
    }
    Ok(body)
}

/// `ddmm.mmmm` / `dddmm.mmmm` plus hemisphere → signed decimal degrees.
///
/// Minutes must be below 60 and the result at most `max_degrees`.
fn parse_coordinate(value: &str, hemisphere: &str, max_degrees: f64) -> Result<f64, GpsError> {
    let raw: f64 = value.parse().map_err(|_| GpsError::BadSentence)?;
    if !raw.is_finite() || raw < 0.0 {
        return Err(GpsError::BadSentence);
    }
    let degrees = (raw / 100.0).trunc();
    let minutes = raw - degrees * 100.0;
    let decimal = degrees + minutes / 60.0;
    if minutes >= 60.0 || decimal > max_degrees {
        return Err(GpsError::BadSentence);
    }
    match hemisphere {
        "N" | "E" => Ok(decimal),
        "S" | "W" => Ok(-decimal),
        _ => Err(GpsError::BadSentence),
    }
}

/// Parse the body of an RMC sentence.
///
/// `Ok(None)` means the receiver reported no fix (status `V`).
pub fn parse_rmc(body: &str) -> Result<Option<Position>, GpsError> {
    let fields: Vec<&str> = body.split(',').collect();
    if fields.len() < 7 || !fields[0].ends_with("RMC") {
        return Err(GpsError::BadSentence);
    }
    match fields[2] {
        "A" => {}
        "V" => return Ok(None),
        _ => return Err(GpsError::BadSentence),
    }
    let lat = parse_coordinate(fields[3], fields[4], 90.0)?;
    let lon = parse_coordinate(fields[5], fields[6], 180.0)?;
    Ok(Some(Position::new(lat, lon)))
}

/// GPS source reading NMEA from `R` and writing PMTK commands to `W`.
pub struct NmeaGps<R, W = io::Sink> {
    reader: R,
    writer: W,
    line: String,
    fix: bool,
    position: Position,
}

impl<R: BufRead, W: Write> NmeaGps<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            line: String::new(),
            fix: false,
            position: Position::default(),
        }
    }

    /// Select the NMEA output set and the position update rate.
    pub fn configure(&mut self, mode: GpsOutputMode, update_rate_ms: u32) -> Result<(), GpsError> {
        for sentence in [
            frame_sentence(mode.pmtk_body()),
            frame_sentence(&format!("PMTK220,{}", update_rate_ms)),
        ] {
            debug!("NmeaGps: -> {}", sentence.trim_end());
            self.writer
                .write_all(sentence.as_bytes())
                .map_err(|_| GpsError::WriteFailed)?;
        }
        self.writer.flush().map_err(|_| GpsError::WriteFailed)?;
        info!("NmeaGps: output {:?}, every {} ms", mode, update_rate_ms);
        Ok(())
    }

    /// Apply one raw sentence to the fix state.
    pub fn handle_sentence(&mut self, line: &str) -> Result<(), GpsError> {
        let body = verify_sentence(line)?;
        let Some(talker) = body.split(',').next() else {
            return Ok(());
        };
        if !talker.ends_with("RMC") {
            return Ok(());
        }
        match parse_rmc(body)? {
            Some(position) => {
                self.fix = true;
                self.position = position;
            }
            None => self.fix = false,
        }
        Ok(())
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }
}

impl<R: BufRead, W: Write> GpsSource for NmeaGps<R, W> {
    fn update(&mut self) -> Result<(), GpsError> {
        let mut line = std::mem::take(&mut self.line);
        line.clear();
        let result = match self.reader.read_line(&mut line) {
            // End of stream: keep the last known state.
            Ok(0) => Ok(()),
            Ok(_) if line.trim().is_empty() => Ok(()),
            Ok(_) => self.handle_sentence(&line),
            Err(_) => Err(GpsError::ReadFailed),
        };
        self.line = line;
        result
    }

    fn has_fix(&self) -> bool {
        self.fix
    }

    fn position(&self) -> Position {
        self.position
    }
}
