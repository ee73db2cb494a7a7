//! Fixed-size station table with persistence.
//!
//! The registry owns `N` slots (four by default). Every slot always holds a
//! [`Station`]; unused slots hold [`Station::empty`], whose identity is the
//! `0xFFFF/0xFFFF` sentinel. The whole table is persisted after every
//! mutation as a JSON array of exactly `N` settings objects, in slot order.
//!
//! Adding a station reuses the slot of a station with the same identity,
//! then the first empty slot. When the table is full the last slot is
//! overwritten.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use tracing::{debug, error, info, warn};

use fineoffset_store::ConfigStore;
use fineoffset_types::{MessageFormat, StationId, UNSET};

use crate::burst::BurstTiming;
use crate::error::{Error, Result};
use crate::settings::StationSettings;
use crate::station::Station;
use crate::traits::Decoder;

/// Default number of station slots.
pub const MAX_STATIONS: usize = 4;

/// Documents this short cannot hold a station table and are replaced.
const MIN_DOCUMENT_LEN: u64 = 10;

/// A registry shared between a packet-receiving thread and a reporting thread.
pub type SharedRegistry<S> = Arc<Mutex<StationRegistry<S>>>;

/// What [`StationRegistry::load`] found in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A table was read; `stations` slots are occupied.
    Loaded { stations: usize },
    /// No usable document existed; a default table was written.
    Initialized,
    /// The document could not be parsed; a default table was written.
    Recovered,
}

/// The station table.
pub struct StationRegistry<S, const N: usize = MAX_STATIONS> {
    slots: [Station; N],
    store: S,
    timing: BurstTiming,
}

impl<S, const N: usize> std::fmt::Debug for StationRegistry<S, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StationRegistry")
            .field(
                "slots",
                &self.slots.iter().map(Station::identity).collect::<Vec<_>>(),
            )
            .field("timing", &self.timing)
            .finish_non_exhaustive()
    }
}

impl<S: ConfigStore, const N: usize> StationRegistry<S, N> {
    /// Create a registry with all slots empty. Nothing is read from `store`
    /// until [`load`](Self::load) is called.
    pub fn new(store: S) -> Self {
        Self::with_timing(store, BurstTiming::default())
    }

    /// Create a registry whose burst-capable stations use `timing`.
    pub fn with_timing(store: S, timing: BurstTiming) -> Self {
        const { assert!(N > 0, "a registry needs at least one slot") };
        Self {
            slots: empty_slots(),
            store,
            timing,
        }
    }

    /// Wrap the registry for use from several threads.
    pub fn into_shared(self) -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(self))
    }

    /// Number of slots.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of occupied slots.
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_empty()).count()
    }

    /// All slots in order, including empty ones.
    pub fn stations(&self) -> &[Station] {
        &self.slots
    }

    /// The station in `slot`, if the index is in range.
    pub fn slot(&self, slot: usize) -> Option<&Station> {
        self.slots.get(slot)
    }

    /// The station registered as `(station_type, id)`.
    pub fn get(&self, station_type: u16, id: u16) -> Option<&Station> {
        self.find(station_type, id).map(|i| &self.slots[i])
    }

    /// Burst timing handed to new stations.
    pub fn timing(&self) -> BurstTiming {
        self.timing
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the backing store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Index of the first slot whose identity is `(station_type, id)`.
    pub fn find(&self, station_type: u16, id: u16) -> Option<usize> {
        let wanted = StationId::new(station_type, id);
        self.slots.iter().position(|s| s.identity() == wanted)
    }

    fn first_free_slot(&self) -> Option<usize> {
        self.find(UNSET, UNSET)
    }

    /// Add or replace a station from its JSON settings object.
    ///
    /// Returns the slot it was placed in. Malformed JSON or a missing
    /// identity leaves the table untouched.
    pub fn add(&mut self, json: &str) -> Result<usize> {
        let settings = StationSettings::from_json(json)
            .inspect_err(|e| warn!("Rejected station settings: {}", e))?;
        let identity = settings.identity();
        if identity.is_unset() {
            return Err(Error::MissingIdentity(identity));
        }

        let slot = match self.find(identity.station_type, identity.id) {
            Some(slot) => {
                info!("Replacing station {} in slot {}", identity, slot);
                slot
            }
            None => match self.first_free_slot() {
                Some(slot) => {
                    info!("Adding station {} in slot {}", identity, slot);
                    slot
                }
                None => {
                    let slot = N - 1;
                    warn!(
                        "Station table full, evicting {} from slot {} for {}",
                        self.slots[slot].identity(),
                        slot,
                        identity
                    );
                    slot
                }
            },
        };

        self.slots[slot] = Station::from_settings(settings, self.timing);
        self.persist();
        Ok(slot)
    }

    /// Remove the station named by a JSON object carrying `wsType` and `wsID`.
    ///
    /// Returns the freed slot, or `None` if no such station is registered.
    pub fn remove(&mut self, json: &str) -> Result<Option<usize>> {
        let identity = StationSettings::from_json(json)
            .inspect_err(|e| warn!("Rejected remove request: {}", e))?
            .identity();
        if identity.is_unset() {
            warn!("Remove request without a station identity ({})", identity);
            return Ok(None);
        }

        match self.find(identity.station_type, identity.id) {
            Some(slot) => {
                info!("Removing station {} from slot {}", identity, slot);
                self.slots[slot] = Station::empty();
                self.persist();
                Ok(Some(slot))
            }
            None => {
                info!("Station {} is not registered, nothing to remove", identity);
                Ok(None)
            }
        }
    }

    /// Write all slots to the store.
    pub fn save(&mut self) -> Result<()> {
        let table: Vec<&StationSettings> = self.slots.iter().map(Station::settings).collect();
        let json = serde_json::to_vec(&table)?;
        self.store.write_all(&json)?;
        debug!("Saved station table ({} bytes)", json.len());
        Ok(())
    }

    /// Replace the table with the stored one.
    ///
    /// An absent, short or unparseable document is replaced by a default
    /// table. Individual slots that fail to parse, or repeat an earlier
    /// identity, are left empty.
    pub fn load(&mut self) -> Result<LoadOutcome> {
        if !self.store.exists() || self.store.size()? <= MIN_DOCUMENT_LEN {
            info!("No station table found, writing an empty one");
            self.slots = empty_slots();
            self.save()?;
            return Ok(LoadOutcome::Initialized);
        }

        let bytes = self.store.read_all()?;
        let elements: Vec<serde_json::Value> = match serde_json::from_slice(&bytes) {
            Ok(elements) => elements,
            Err(e) => {
                error!(
                    "Station table is malformed ({}), replacing it. Contents: {}",
                    e,
                    printable(&bytes)
                );
                self.slots = empty_slots();
                self.save()?;
                return Ok(LoadOutcome::Recovered);
            }
        };

        if elements.len() != N {
            warn!(
                "Station table has {} entries, expected {}",
                elements.len(),
                N
            );
        }

        let mut slots: [Station; N] = empty_slots();
        let mut stations = 0;
        for (slot, value) in elements.into_iter().take(N).enumerate() {
            let settings: StationSettings = match serde_json::from_value(value) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!("Slot {} is malformed, leaving it empty: {}", slot, e);
                    continue;
                }
            };

            let identity = settings.identity();
            if identity.is_unset() {
                continue;
            }
            if slots[..slot].iter().any(|s| s.identity() == identity) {
                warn!(
                    "Slot {} repeats station {}, leaving it empty",
                    slot, identity
                );
                continue;
            }

            slots[slot] = Station::from_settings(settings, self.timing);
            stations += 1;
        }

        self.slots = slots;
        info!("Loaded station table with {} station(s)", stations);
        Ok(LoadOutcome::Loaded { stations })
    }

    /// Decode a packet and feed it to the station that sent it.
    ///
    /// Returns the slot that was updated, or `None` for packets from
    /// unregistered stations. A rejected packet changes nothing.
    pub fn handle_packet<D: Decoder + ?Sized>(
        &mut self,
        format: MessageFormat,
        packet: &[u8],
        now: Instant,
        decoder: &D,
    ) -> Result<Option<usize>> {
        let reading = decoder.decode(format, packet)?;
        let identity = reading.station;
        if identity.is_unset() {
            debug!("Ignoring {} reading without station identity", format);
            return Ok(None);
        }

        match self.find(identity.station_type, identity.id) {
            Some(slot) => {
                self.slots[slot].update(&reading, packet, now);
                Ok(Some(slot))
            }
            None => {
                debug!("Ignoring {} reading from unregistered station {}", format, identity);
                Ok(None)
            }
        }
    }

    /// Poll every occupied slot and return those with data to report.
    pub fn poll_reportable<D: Decoder + ?Sized>(&mut self, now: Instant, decoder: &D) -> Vec<usize> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter(|(_, station)| !station.is_empty())
            .filter_map(|(slot, station)| station.reportable(decoder, now).then_some(slot))
            .collect()
    }

    fn persist(&mut self) {
        if let Err(e) = self.save() {
            error!("Failed to persist station table: {}", e);
        }
    }
}

fn empty_slots<const N: usize>() -> [Station; N] {
    std::array::from_fn(|_| Station::empty())
}

/// Render bytes for logging, replacing anything outside printable ASCII.
fn printable(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| {
            if (0x20..0x7f).contains(&b) {
                b as char
            } else {
                '~'
            }
        })
        .collect()
}
