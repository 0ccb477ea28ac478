//! Language version settings.
//!
//! Sessions carry one `LanguageVersionSettings` value. Resolution stages query
//! it through [`LanguageVersionSettings::supports_feature`] and
//! [`LanguageVersionSettings::get_flag`].
//!
//! Settings deserialize from a camelCase JSON object:
//!
//! ```json
//! {
//!   "enabledFeatures": ["ImplicitSignedToUnsignedIntegerConversion"],
//!   "disabledFeatures": [],
//!   "stdlibCompilation": false
//! }
//! ```

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Set of enabled language features.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LanguageFeatures: u32 {
        /// Integer literals and coercion-marked constants may be passed where an
        /// unsigned integer parameter marked for implicit coercion is expected.
        const IMPLICIT_SIGNED_TO_UNSIGNED_INTEGER_CONVERSION = 1 << 0;
        /// Candidates are never demoted to the compatibility tier.
        const DISABLE_COMPATIBILITY_MODE_FOR_NEW_INFERENCE = 1 << 1;
    }
}

bitflags! {
    /// Analysis flags that are not language features proper.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AnalysisFlags: u32 {
        /// Compiling the standard library itself: no fallback builtins provider.
        const STDLIB_COMPILATION = 1 << 0;
    }
}

/// Named language feature, as it appears in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LanguageFeature {
    ImplicitSignedToUnsignedIntegerConversion,
    DisableCompatibilityModeForNewInference,
}

impl LanguageFeature {
    pub const fn flag(self) -> LanguageFeatures {
        match self {
            Self::ImplicitSignedToUnsignedIntegerConversion => {
                LanguageFeatures::IMPLICIT_SIGNED_TO_UNSIGNED_INTEGER_CONVERSION
            }
            Self::DisableCompatibilityModeForNewInference => {
                LanguageFeatures::DISABLE_COMPATIBILITY_MODE_FOR_NEW_INFERENCE
            }
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLanguageSettings {
    #[serde(default)]
    enabled_features: Vec<LanguageFeature>,
    #[serde(default)]
    disabled_features: Vec<LanguageFeature>,
    #[serde(default)]
    stdlib_compilation: bool,
}

impl From<RawLanguageSettings> for LanguageVersionSettings {
    fn from(raw: RawLanguageSettings) -> Self {
        let mut settings = Self::default();
        for feature in raw.enabled_features {
            settings.features.insert(feature.flag());
        }
        // Explicitly disabled features win over enabled ones.
        for feature in raw.disabled_features {
            settings.features.remove(feature.flag());
        }
        if raw.stdlib_compilation {
            settings.analysis_flags.insert(AnalysisFlags::STDLIB_COMPILATION);
        }
        settings
    }
}

/// Language-feature configuration bound to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "RawLanguageSettings")]
pub struct LanguageVersionSettings {
    pub features: LanguageFeatures,
    pub analysis_flags: AnalysisFlags,
}

impl LanguageVersionSettings {
    pub const fn new(features: LanguageFeatures, analysis_flags: AnalysisFlags) -> Self {
        Self {
            features,
            analysis_flags,
        }
    }

    pub fn supports_feature(&self, feature: LanguageFeature) -> bool {
        self.features.contains(feature.flag())
    }

    pub fn get_flag(&self, flag: AnalysisFlags) -> bool {
        self.analysis_flags.contains(flag)
    }

    #[must_use]
    pub fn with_feature(mut self, feature: LanguageFeature, enabled: bool) -> Self {
        self.features.set(feature.flag(), enabled);
        self
    }

    #[must_use]
    pub fn with_flag(mut self, flag: AnalysisFlags, enabled: bool) -> Self {
        self.analysis_flags.set(flag, enabled);
        self
    }
}

#[cfg(test)]
#[path = "../tests/language_tests.rs"]
mod tests;
