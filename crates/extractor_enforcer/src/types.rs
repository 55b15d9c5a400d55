use extractor_events::{DeviceId, PlayerId};
use serde::{Deserialize, Serialize};

/// Prefab short names the world uses for placed pump jacks.
pub const PUMP_JACK_PREFABS: [&str; 4] = ["pumpjack", "pump_jack", "pump-jack", "pumpjack-static"];

/// Prefab short names the world uses for placed mining quarries.
pub const QUARRY_PREFABS: [&str; 2] = ["mining_quarry", "miningquarry_static"];

/// Device family a prefab resolves to. `Invalid` marks everything outside
/// the two tracked families; such devices are ignored entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractorKind {
    PumpJack,
    Quarry,
    Invalid,
}

impl ExtractorKind {
    /// Classify a prefab short name. Matching is exact and case-sensitive.
    pub fn classify(prefab: &str) -> Self {
        if PUMP_JACK_PREFABS.contains(&prefab) {
            ExtractorKind::PumpJack
        } else if QUARRY_PREFABS.contains(&prefab) {
            ExtractorKind::Quarry
        } else {
            ExtractorKind::Invalid
        }
    }

    pub fn is_tracked(self) -> bool {
        self != ExtractorKind::Invalid
    }
}

/// One currently-active extractor and the player who switched it on.
/// `kind` is never `Invalid` in a stored record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorRecord {
    pub player_id: PlayerId,
    pub extractor_id: DeviceId,
    pub kind: ExtractorKind,
}
