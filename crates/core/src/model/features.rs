use serde::{Deserialize, Serialize};

/// Feature switches of the client build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct FeatureFlags {
    pub has_pdf_export: bool,
    pub has_web_ui: bool,
    pub has_auth: bool,
    pub has_open_ended: bool,
    #[serde(rename = "hasAIFeedback")]
    pub has_ai_feedback: bool,
}

impl FeatureFlags {
    /// Everything enabled.
    #[must_use]
    pub fn ultimate() -> Self {
        Self {
            has_pdf_export: true,
            has_web_ui: true,
            has_auth: true,
            has_open_ended: true,
            has_ai_feedback: true,
        }
    }
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self::ultimate()
    }
}
