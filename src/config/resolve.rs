//! Effective render settings for one transition
//!
//! Precedence, highest first: runtime override, collection override, global
//! default. Profile and interval are not collection-scoped and only have the
//! runtime and global tiers.

use serde::{Deserialize, Serialize};

use crate::types::{Alignment, Opacity, ProfileTarget, Stretch};

/// Lowest tier: every field present
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalDefaults {
    pub profile: ProfileTarget,
    pub interval_minutes: u32,
    pub alignment: Alignment,
    pub stretch: Stretch,
    pub opacity: Opacity,
}

/// Per-collection tier, decoded once when the run config is loaded
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stretch: Option<Stretch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<Opacity>,
}

impl CollectionOverride {
    pub fn is_empty(&self) -> bool {
        self.alignment.is_none() && self.stretch.is_none() && self.opacity.is_none()
    }
}

/// Highest tier, from the command line
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RuntimeOverride {
    pub profile: Option<ProfileTarget>,
    pub interval_minutes: Option<u32>,
    pub alignment: Option<Alignment>,
    pub stretch: Option<Stretch>,
    pub opacity: Option<Opacity>,
}

/// What actually gets published; derived fresh for every transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveSettings {
    pub profile: ProfileTarget,
    pub interval_minutes: u32,
    pub alignment: Alignment,
    pub stretch: Stretch,
    pub opacity: Opacity,
}

/// Merge the three tiers field by field
pub fn resolve(
    defaults: &GlobalDefaults,
    collection: Option<&CollectionOverride>,
    runtime: Option<&RuntimeOverride>,
) -> EffectiveSettings {
    let collection = collection.copied().unwrap_or_default();
    let runtime = runtime.copied().unwrap_or_default();

    EffectiveSettings {
        profile: runtime.profile.unwrap_or(defaults.profile),
        interval_minutes: runtime.interval_minutes.unwrap_or(defaults.interval_minutes),
        alignment: runtime
            .alignment
            .or(collection.alignment)
            .unwrap_or(defaults.alignment),
        stretch: runtime
            .stretch
            .or(collection.stretch)
            .unwrap_or(defaults.stretch),
        opacity: runtime
            .opacity
            .or(collection.opacity)
            .unwrap_or(defaults.opacity),
    }
}
