//! A registered station and its reportable state machine.
//!
//! A station is either *quiet* (nothing new since the last report) or
//! *pending*. Plain stations become pending on every [`Station::update`].
//! Burst-capable stations only buffer packets on update and become
//! reportable once the burst has gone quiet, at which point the winning
//! packet is re-decoded and merged.

use std::time::Instant;

use tracing::{debug, warn};

use fineoffset_types::{Reading, StationId, StationKind};

use crate::burst::{BurstDeduplicator, BurstTiming};
use crate::settings::StationSettings;
use crate::traits::Decoder;
use crate::window::TimeWindow;

/// Kind-specific update behaviour.
#[derive(Debug, Clone)]
enum Behavior {
    /// Every decoded packet is merged immediately.
    Direct,
    /// Packets are voted on per burst before merging.
    Burst {
        dedup: BurstDeduplicator,
        /// Decoded reading of the latest packet, used if the winner fails to decode.
        fallback: Option<Reading>,
    },
}

/// One station slot: persisted settings plus process-local state.
#[derive(Debug, Clone)]
pub struct Station {
    settings: StationSettings,
    kind: StationKind,
    behavior: Behavior,
    reading: Reading,
    rain: TimeWindow,
    wind: TimeWindow,
    gust: TimeWindow,
    pending: bool,
    last_seen: Option<Instant>,
    last_reported: Option<Instant>,
}

impl Default for Station {
    fn default() -> Self {
        Self::empty()
    }
}

impl Station {
    /// The placeholder held by an unused slot. Its identity is
    /// [`StationId::EMPTY`].
    pub fn empty() -> Self {
        Self::from_settings(StationSettings::default(), BurstTiming::default())
    }

    /// Build a station from its settings, choosing behaviour by type code.
    pub fn from_settings(settings: StationSettings, timing: BurstTiming) -> Self {
        let kind = StationKind::from_type_code(settings.station_type);
        let behavior = if kind.is_burst_capable() {
            Behavior::Burst {
                dedup: BurstDeduplicator::new(timing),
                fallback: None,
            }
        } else {
            Behavior::Direct
        };

        Self {
            settings,
            kind,
            behavior,
            reading: Reading::default(),
            rain: TimeWindow::rain(),
            wind: TimeWindow::wind_average(),
            gust: TimeWindow::gust_max(),
            pending: false,
            last_seen: None,
            last_reported: None,
        }
    }

    /// Persisted settings.
    pub fn settings(&self) -> &StationSettings {
        &self.settings
    }

    /// The `(type, id)` pair identifying this station.
    pub fn identity(&self) -> StationId {
        self.settings.identity()
    }

    /// Returns `true` for an unused slot placeholder.
    pub fn is_empty(&self) -> bool {
        self.identity() == StationId::EMPTY
    }

    /// Hardware family.
    pub fn kind(&self) -> StationKind {
        self.kind
    }

    /// The current merged reading, including calibrated wind and rolling values.
    pub fn reading(&self) -> &Reading {
        &self.reading
    }

    /// Hourly rain window.
    pub fn rain_window(&self) -> &TimeWindow {
        &self.rain
    }

    /// One-minute wind average window.
    pub fn wind_window(&self) -> &TimeWindow {
        &self.wind
    }

    /// One-minute gust window.
    pub fn gust_window(&self) -> &TimeWindow {
        &self.gust
    }

    /// Burst buffer, for burst-capable stations.
    pub fn burst(&self) -> Option<&BurstDeduplicator> {
        match &self.behavior {
            Behavior::Direct => None,
            Behavior::Burst { dedup, .. } => Some(dedup),
        }
    }

    /// Whether an update has not been reported yet.
    pub fn is_pending(&self) -> bool {
        match &self.behavior {
            Behavior::Direct => self.pending,
            Behavior::Burst { dedup, .. } => !dedup.is_empty(),
        }
    }

    /// When the last packet for this station arrived.
    pub fn last_seen(&self) -> Option<Instant> {
        self.last_seen
    }

    /// When [`reportable`](Self::reportable) last returned `true`.
    pub fn last_reported(&self) -> Option<Instant> {
        self.last_reported
    }

    /// Feed a decoded reading and the raw packet it came from.
    pub fn update(&mut self, reading: &Reading, packet: &[u8], now: Instant) {
        self.last_seen = Some(now);

        if let Behavior::Burst { dedup, fallback } = &mut self.behavior {
            dedup.accumulate(reading.format, packet, now);
            *fallback = Some(*reading);
            return;
        }

        self.merge(reading);
        self.pending = true;
    }

    /// Query-and-clear: returns `true` at most once per pending update.
    ///
    /// Burst-capable stations resolve a completed burst here, so `decoder`
    /// is only used for them.
    pub fn reportable<D: Decoder + ?Sized>(&mut self, decoder: &D, now: Instant) -> bool {
        let reading = match &mut self.behavior {
            Behavior::Direct => {
                if !self.pending {
                    return false;
                }
                self.pending = false;
                self.last_reported = Some(now);
                return true;
            }
            Behavior::Burst { dedup, fallback } => {
                if !dedup.is_complete(now) {
                    return false;
                }
                let fallback = fallback.take();
                match dedup.resolve(decoder) {
                    Some(Ok(reading)) => reading,
                    _ => match fallback {
                        Some(reading) => {
                            warn!(
                                "Station {}: using last decoded packet of burst",
                                self.settings.identity()
                            );
                            reading
                        }
                        None => return false,
                    },
                }
            }
        };

        self.merge(&reading);
        self.last_reported = Some(now);
        true
    }

    fn merge(&mut self, reading: &Reading) {
        let mut merged = *reading;
        merged.wind_speed *= self.settings.wind_factor;
        merged.wind_gust *= self.settings.wind_factor;

        let ts = merged.timestamp();
        merged.rain_1h = self.rain.update(ts, merged.rain);
        merged.wind_speed_1m = self.wind.update(ts, merged.wind_speed);
        merged.wind_gust_1m = self.gust.update(ts, merged.wind_gust);

        debug!(
            "Station {} updated: T={:.1}C rain1h={:.1}mm wind1m={:.1}km/h",
            self.settings.identity(),
            merged.temperature,
            merged.rain_1h,
            merged.wind_speed_1m
        );
        self.reading = merged;
    }
}
