//! Storefront domain models shared by both content sources and the checkout
//! layer. Instances are immutable once assembled; only checkout selection
//! state mutates during a session.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::pricing::{
    CheckboxGroupConfig, ComponentDescriptor, CustomAmountConfig, MultiBoxConfig, RangeConfig,
    SelectorSetConfig,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Game {
    pub id: String,
    pub title: String,
    pub category: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Lucide icon name rendered by the storefront.
    pub icon: String,
}

/// Non-priced section divider positioned inside the render list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SectionLabel {
    pub id: String,
    pub title: String,
}

/// A purchasable boost service with its assembled pricing configuration.
///
/// `components` is the ordered render list (storage order); the per-kind
/// fields are denormalized slots kept consistent with it by the assembler.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Service {
    pub id: String,
    pub title: String,
    pub category_id: String,
    /// Flat price used only when no range/multi-box/custom-amount component
    /// is configured.
    pub base_price: i64,
    pub image: String,
    pub description: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_points: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub games: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<RangeConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_box: Option<MultiBoxConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_amount: Option<CustomAmountConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub selector_sets: Vec<SelectorSetConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkbox_group: Option<CheckboxGroupConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub box_titles: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub section_labels: Vec<SectionLabel>,
    pub components: Vec<ComponentDescriptor>,
}

/// Delivery region offered at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
pub enum Region {
    #[serde(rename = "EU")]
    Eu,
    #[default]
    #[serde(rename = "US")]
    Us,
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Region::Eu => f.write_str("EU"),
            Region::Us => f.write_str("US"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AccordionItem {
    pub id: String,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AccordionContent {
    pub title: String,
    pub items: Vec<AccordionItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaymentConfig {
    /// Post-payment instructions shown beside the pay button.
    pub disclaimer: String,
}
