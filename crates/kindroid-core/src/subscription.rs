use serde::{Deserialize, Serialize};

/// Response of `POST /check-user-subscription`.
///
/// Platform and grace-period fields are nullable upstream. They stay `Option`
/// and are written back as explicit `null` rather than being omitted, so a
/// serialized record matches the upstream schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionInfo {
    pub uid: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub is_subscribed_base: bool,
    #[serde(default)]
    pub subscription_platform_base: String,
    pub grace_period_base: Option<i64>,
    #[serde(default)]
    pub is_subscribed_addon1: bool,
    pub subscription_platform_addon1: Option<String>,
    pub grace_period_addon1: Option<i64>,
    #[serde(default)]
    pub is_subscribed_addon2: bool,
    pub subscription_platform_addon2: Option<String>,
    pub grace_period_addon2: Option<i64>,
}

impl SubscriptionInfo {
    /// True when any plan (base or add-on) is active.
    pub fn has_any_subscription(&self) -> bool {
        self.is_subscribed_base || self.is_subscribed_addon1 || self.is_subscribed_addon2
    }
}
