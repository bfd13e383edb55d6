use serde::{Deserialize, Serialize};

/// Per-call routing options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingOptions {
    pub organization_id: String,
    /// Overrides `RoutingConfig::confidence_threshold` for this call.
    #[serde(default)]
    pub confidence_threshold: Option<f64>,
    /// Create an INBOX stream when the organization has none.
    #[serde(default)]
    pub create_stream_if_needed: bool,
    #[serde(default = "enabled")]
    pub use_similarity: bool,
    /// Append the decision to the routing log.
    #[serde(default = "enabled")]
    pub record: bool,
}

fn enabled() -> bool {
    true
}

impl RoutingOptions {
    pub fn for_organization(organization_id: impl Into<String>) -> Self {
        Self {
            organization_id: organization_id.into(),
            confidence_threshold: None,
            create_stream_if_needed: false,
            use_similarity: true,
            record: true,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = Some(threshold);
        self
    }

    pub fn creating_inbox(mut self) -> Self {
        self.create_stream_if_needed = true;
        self
    }

    pub fn without_similarity(mut self) -> Self {
        self.use_similarity = false;
        self
    }

    pub fn unrecorded(mut self) -> Self {
        self.record = false;
        self
    }
}
