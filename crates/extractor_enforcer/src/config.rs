use serde::{Deserialize, Serialize};

fn default_ignore_extractor_kind() -> bool {
    true
}

/// Plugin options, persisted as a one-field JSON object.
///
/// When `ignore_extractor_kind` is true a player may run one extractor of
/// any kind; when false, one per kind (a pump jack and a quarry can run
/// side by side).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnforcerConfig {
    #[serde(
        rename = "Ignore Extractor Type",
        default = "default_ignore_extractor_kind"
    )]
    pub ignore_extractor_kind: bool,
}

impl Default for EnforcerConfig {
    fn default() -> Self {
        Self {
            ignore_extractor_kind: true,
        }
    }
}
