//! Compiler configuration

use serde::{Deserialize, Serialize};

/// Environment variable that turns on strict validation
pub const STRICT_VALIDATION_ENV: &str = "KSVC_STRICT_VALIDATION";

/// Options controlling compilation
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerConfig {
    /// Reject models the platform would refuse before compiling them.
    ///
    /// Off by default: malformed models compile as-is and are left to the
    /// platform's admission checks.
    #[serde(default)]
    pub strict_validation: bool,
}

impl CompilerConfig {
    /// Read configuration from the environment.
    ///
    /// `KSVC_STRICT_VALIDATION` accepts `1`, `true`, `yes` or `on` (any case);
    /// anything else, or an unset variable, leaves strict validation off.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let strict_validation = lookup(STRICT_VALIDATION_ENV)
            .map(|v| parse_flag(&v))
            .unwrap_or(false);
        Self { strict_validation }
    }

    /// Enable strict validation
    pub fn strict(mut self) -> Self {
        self.strict_validation = true;
        self
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
