//! Mock decoder implementation for testing.
//!
//! This module provides a decoder that can be used for unit testing
//! without a radio front end or a real protocol decoder.
//!
//! The [`MockDecoder`] implements the [`Decoder`] trait, so it can be handed
//! to [`StationRegistry::handle_packet`](crate::StationRegistry::handle_packet)
//! and [`StationRegistry::poll_reportable`](crate::StationRegistry::poll_reportable)
//! like any other decoder.
//!
//! # Features
//!
//! - **Programmed readings**: map exact packet bytes to the reading they decode to
//! - **Failure injection**: reject specific packets, or every packet
//! - **Call counting**: see how often the station layer re-decoded a packet

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use fineoffset_types::{DecodeError, DecodeResult, MessageFormat, Reading};

use crate::traits::Decoder;

/// A programmable decoder for tests.
///
/// Packets that were neither programmed nor rejected decode to an
/// [`DecodeError::InvalidData`] error.
///
/// # Example
///
/// ```
/// use fineoffset_core::{Decoder, MockDecoder};
/// use fineoffset_types::{MessageFormat, Reading, StationId};
///
/// let packet = [0xA2, 0x8C, 0, 0, 0, 0, 0, 0, 0, 0];
/// let decoder = MockDecoder::new().with_reading(
///     &packet,
///     Reading { station: StationId::new(0x28, 0x2C), ..Default::default() },
/// );
///
/// let reading = decoder.decode(MessageFormat::Ws3000, &packet).unwrap();
/// assert_eq!(reading.station.id, 0x2C);
/// assert_eq!(decoder.decode_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockDecoder {
    readings: HashMap<Vec<u8>, Reading>,
    rejected: HashMap<Vec<u8>, DecodeError>,
    reject_all: AtomicBool,
    decode_count: AtomicUsize,
}

impl MockDecoder {
    /// Create a decoder with nothing programmed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `packet` to `reading`.
    #[must_use]
    pub fn with_reading(mut self, packet: &[u8], reading: Reading) -> Self {
        self.readings.insert(packet.to_vec(), reading);
        self
    }

    /// Reject `packet` with a checksum error.
    #[must_use]
    pub fn with_rejected(mut self, packet: &[u8]) -> Self {
        let actual = packet.last().copied().unwrap_or(0);
        self.rejected.insert(
            packet.to_vec(),
            DecodeError::Checksum {
                expected: actual.wrapping_add(1),
                actual,
            },
        );
        self
    }

    /// Make every decode fail (or succeed again).
    pub fn set_reject_all(&self, reject: bool) {
        self.reject_all.store(reject, Ordering::Relaxed);
    }

    /// Number of decode calls so far, successful or not.
    pub fn decode_count(&self) -> usize {
        self.decode_count.load(Ordering::Relaxed)
    }

    /// Reset the call counter.
    pub fn reset_count(&self) {
        self.decode_count.store(0, Ordering::Relaxed);
    }
}

impl Decoder for MockDecoder {
    fn decode(&self, format: MessageFormat, packet: &[u8]) -> DecodeResult<Reading> {
        self.decode_count.fetch_add(1, Ordering::Relaxed);

        if self.reject_all.load(Ordering::Relaxed) {
            return Err(DecodeError::UnsupportedFormat(format));
        }
        if let Some(err) = self.rejected.get(packet) {
            return Err(err.clone());
        }
        self.readings
            .get(packet)
            .map(|reading| Reading { format, ..*reading })
            .ok_or_else(|| DecodeError::InvalidData(format!("unprogrammed packet {:02x?}", packet)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fineoffset_types::StationId;

    const PACKET: [u8; 10] = [0xA2, 0x8C, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x3F];

    #[test]
    fn test_programmed_reading_takes_format() {
        let decoder = MockDecoder::new().with_reading(
            &PACKET,
            Reading {
                station: StationId::new(0x24, 0x10),
                temperature: 18.0,
                ..Default::default()
            },
        );

        let reading = decoder.decode(MessageFormat::Br1800, &PACKET).unwrap();
        assert_eq!(reading.format, MessageFormat::Br1800);
        assert_eq!(reading.temperature, 18.0);
    }

    #[test]
    fn test_rejected_packet() {
        let decoder = MockDecoder::new().with_rejected(&PACKET);
        let err = decoder.decode(MessageFormat::Ws3000, &PACKET).unwrap_err();
        assert!(matches!(err, DecodeError::Checksum { actual: 0x3F, .. }));
    }

    #[test]
    fn test_unprogrammed_packet_is_invalid() {
        let decoder = MockDecoder::new();
        let err = decoder.decode(MessageFormat::Ws3000, &[1, 2, 3]).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidData(_)));
    }

    #[test]
    fn test_reject_all_and_count() {
        let decoder = MockDecoder::new().with_reading(&PACKET, Reading::default());
        assert!(decoder.decode(MessageFormat::Ws3000, &PACKET).is_ok());

        decoder.set_reject_all(true);
        assert!(decoder.decode(MessageFormat::Ws3000, &PACKET).is_err());
        assert_eq!(decoder.decode_count(), 2);

        decoder.reset_count();
        assert_eq!(decoder.decode_count(), 0);
    }
}
