//! Majority voting over retransmission bursts.
//!
//! WH1080-class stations send every reading as a burst of up to six
//! identical packets. A single packet can carry a bit error that still
//! passes the checksum, so rather than trusting the last packet the
//! deduplicator keeps the whole burst and re-decodes the packet that most
//! other packets agree with.
//!
//! # Timing
//!
//! ```text
//!  packet  packet  packet            quiet > 200ms     gap > 500ms
//!  |--<500ms--|--<500ms--|------------------|--- complete ---|--- new burst
//! ```
//!
//! There is no end-of-burst marker: a burst is complete once no packet has
//! arrived for [`BurstTiming::quiet`], and a packet arriving more than
//! [`BurstTiming::gap`] after the previous one starts a fresh burst.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use fineoffset_types::{DecodeResult, MessageFormat, Reading};

use crate::traits::Decoder;

/// Maximum number of packets kept per burst.
pub const MAX_BURST_PACKETS: usize = 6;

/// Bytes stored per packet.
pub const PACKET_CAPACITY: usize = 10;

/// Leading bytes compared when voting. The trailing byte is a status/parity
/// byte and is excluded.
pub const VOTE_LEN: usize = 9;

/// Timing thresholds for burst detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurstTiming {
    /// A packet later than this after the previous one starts a new burst.
    pub gap: Duration,
    /// Silence after which a burst is considered complete.
    pub quiet: Duration,
}

impl Default for BurstTiming {
    fn default() -> Self {
        Self {
            gap: Duration::from_millis(500),
            quiet: Duration::from_millis(200),
        }
    }
}

/// One captured packet of a burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPacket {
    format: MessageFormat,
    bytes: [u8; PACKET_CAPACITY],
    len: usize,
    captured: Instant,
}

impl RawPacket {
    /// Capture `data`, keeping at most [`PACKET_CAPACITY`] bytes.
    pub fn new(format: MessageFormat, data: &[u8], captured: Instant) -> Self {
        let len = data.len().min(PACKET_CAPACITY);
        let mut bytes = [0u8; PACKET_CAPACITY];
        bytes[..len].copy_from_slice(&data[..len]);
        Self {
            format,
            bytes,
            len,
            captured,
        }
    }

    /// Format the packet was decoded in.
    pub fn format(&self) -> MessageFormat {
        self.format
    }

    /// The captured bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// When the packet arrived.
    pub fn captured(&self) -> Instant {
        self.captured
    }

    fn vote_key(&self) -> &[u8] {
        &self.bytes[..VOTE_LEN]
    }
}

/// Whether a burst is being collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstState {
    /// No packets buffered.
    Idle,
    /// At least one packet buffered, burst may still be growing.
    Accumulating,
}

/// Collects the packets of one burst and picks the most agreed-upon one.
#[derive(Debug, Clone)]
pub struct BurstDeduplicator {
    timing: BurstTiming,
    packets: Vec<RawPacket>,
    last_packet: Option<Instant>,
}

impl Default for BurstDeduplicator {
    fn default() -> Self {
        Self::new(BurstTiming::default())
    }
}

impl BurstDeduplicator {
    /// Create an empty deduplicator.
    pub fn new(timing: BurstTiming) -> Self {
        Self {
            timing,
            packets: Vec::with_capacity(MAX_BURST_PACKETS),
            last_packet: None,
        }
    }

    /// Timing thresholds in use.
    pub fn timing(&self) -> BurstTiming {
        self.timing
    }

    /// Current state.
    pub fn state(&self) -> BurstState {
        if self.packets.is_empty() {
            BurstState::Idle
        } else {
            BurstState::Accumulating
        }
    }

    /// Number of buffered packets.
    pub fn len(&self) -> usize {
        self.packets.len()
    }

    /// Returns `true` if no packets are buffered.
    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    /// Buffered packets in arrival order.
    pub fn packets(&self) -> &[RawPacket] {
        &self.packets
    }

    /// Arrival time of the most recent packet.
    pub fn last_packet(&self) -> Option<Instant> {
        self.last_packet
    }

    /// Add a packet to the current burst.
    ///
    /// Starts a new burst first if the previous packet is older than the gap.
    /// Returns `false` if the burst is already full and the packet was dropped.
    pub fn accumulate(&mut self, format: MessageFormat, data: &[u8], now: Instant) -> bool {
        let stale = self
            .last_packet
            .is_none_or(|last| now.saturating_duration_since(last) > self.timing.gap);
        if stale && !self.packets.is_empty() {
            debug!(
                "Discarding {} unresolved packet(s) from previous burst",
                self.packets.len()
            );
            self.packets.clear();
        }
        self.last_packet = Some(now);

        if self.packets.len() >= MAX_BURST_PACKETS {
            debug!("Burst already holds {} packets, ignoring", MAX_BURST_PACKETS);
            return false;
        }
        self.packets.push(RawPacket::new(format, data, now));
        true
    }

    /// Whether the burst has ended: packets are buffered and none arrived
    /// during the quiet period.
    pub fn is_complete(&self, now: Instant) -> bool {
        !self.packets.is_empty()
            && self
                .last_packet
                .is_some_and(|last| now.saturating_duration_since(last) > self.timing.quiet)
    }

    /// Index of the packet most other packets agree with.
    ///
    /// Ties go to the earliest packet. Returns `None` for an empty burst.
    pub fn select_winner(&self) -> Option<usize> {
        if self.packets.len() <= 1 {
            return if self.packets.is_empty() { None } else { Some(0) };
        }

        let mut best = 0;
        let mut best_matches = 0;
        for (i, packet) in self.packets.iter().enumerate() {
            let matches = self
                .packets
                .iter()
                .enumerate()
                .filter(|(j, other)| *j != i && other.vote_key() == packet.vote_key())
                .count();
            if matches > best_matches {
                best = i;
                best_matches = matches;
            }
        }

        info!(
            "Burst of {} packets: {} agree with packet at index {}",
            self.packets.len(),
            best_matches + 1,
            best
        );
        Some(best)
    }

    /// Vote, re-decode the winning packet and clear the buffer.
    ///
    /// Returns `None` if no packets are buffered.
    pub fn resolve<D: Decoder + ?Sized>(&mut self, decoder: &D) -> Option<DecodeResult<Reading>> {
        let winner = self.select_winner()?;
        let packet = self.packets[winner];
        self.packets.clear();

        let result = decoder.decode(packet.format(), packet.as_bytes());
        if let Err(e) = &result {
            warn!("Winning burst packet failed to decode: {}", e);
        }
        Some(result)
    }
}
