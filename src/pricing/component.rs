//! Pricing component definitions.
//!
//! Every service carries an ordered list of pricing components. Each kind is
//! configured independently and contributes to the checkout total on its own
//! terms; the two label kinds contribute nothing and only shape the layout.
//! Stored payloads keep the legacy wire names (`initValue`, `finalValue`,
//! `defaultRange`, ...) so existing rows deserialize unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use utoipa::ToSchema;

/// Discriminant for a stored pricing-component row. The string forms are the
/// kind tags persisted in the `service_prices` table.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
pub enum ComponentKind {
    #[serde(rename = "bar")]
    #[strum(serialize = "bar")]
    Range,
    #[serde(rename = "box")]
    #[strum(serialize = "box")]
    MultiBox,
    #[serde(rename = "custom")]
    #[strum(serialize = "custom")]
    CustomAmount,
    #[serde(rename = "selectors")]
    #[strum(serialize = "selectors")]
    SelectorSet,
    #[serde(rename = "additional")]
    #[strum(serialize = "additional")]
    CheckboxGroup,
    #[serde(rename = "boxtitle")]
    #[strum(serialize = "boxtitle")]
    BoxTitleLabel,
    #[serde(rename = "labeltitle")]
    #[strum(serialize = "labeltitle")]
    SectionLabel,
}

/// A sub-range of a breakpointed track with its own display resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RangeBreakpoint {
    #[serde(rename = "initValue")]
    pub lower: i64,
    #[serde(rename = "finalValue")]
    pub upper: i64,
    pub step: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RangeMode {
    Simple,
    Breakpoints,
}

/// Pre-selected sub-range shown when the control first renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DefaultRange {
    pub start: i64,
    pub end: i64,
}

/// Two-handle range control. Pricing granularity always comes from the root
/// `step`, even when breakpoints give the track variable display resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RangeConfig {
    /// Root lower bound; ignored for bounds when breakpoints are active.
    #[serde(rename = "initValue", default)]
    pub lower: i64,
    /// Root upper bound; ignored for bounds when breakpoints are active.
    #[serde(rename = "finalValue", default)]
    pub upper: i64,
    pub step: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<RangeMode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub breakpoints: Vec<RangeBreakpoint>,
    #[serde(rename = "defaultRange", default, skip_serializing_if = "Option::is_none")]
    pub default_range: Option<DefaultRange>,
}

impl RangeConfig {
    /// Overall track bounds. With breakpoints active these derive from the
    /// first breakpoint's lower and the last breakpoint's upper, never from
    /// the root-level bounds.
    pub fn bounds(&self) -> (i64, i64) {
        if self.mode == Some(RangeMode::Breakpoints) && !self.breakpoints.is_empty() {
            (
                self.breakpoints[0].lower,
                self.breakpoints[self.breakpoints.len() - 1].upper,
            )
        } else {
            (self.lower, self.upper)
        }
    }

    /// Initial handle positions: the explicit default range when present,
    /// otherwise the overall bounds.
    pub fn initial_selection(&self) -> (i64, i64) {
        match &self.default_range {
            Some(range) => (range.start, range.end),
            None => self.bounds(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.step <= 0 {
            return Err(format!("range step must be positive, got {}", self.step));
        }
        let (lower, upper) = self.bounds();
        if lower > upper {
            return Err(format!("range bounds inverted: {lower} > {upper}"));
        }
        for bp in &self.breakpoints {
            if bp.lower > bp.upper {
                return Err(format!(
                    "breakpoint bounds inverted: {} > {}",
                    bp.lower, bp.upper
                ));
            }
        }
        Ok(())
    }
}

/// One selectable amount box. Duplicate values across boxes are legal; boxes
/// are identified by list position, not by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MultiBoxOption {
    pub value: i64,
    #[serde(rename = "title", default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MultiBoxConfig {
    #[serde(default)]
    pub options: Vec<MultiBoxOption>,
}

/// Free-form amount entry with optional one-tap presets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CustomAmountConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub presets: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SelectOption {
    pub label: String,
    pub value: i64,
}

/// A single named dropdown inside a selector set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Selector {
    pub title: String,
    pub options: Vec<SelectOption>,
}

/// A group of independent single-choice dropdowns, each contributing its
/// chosen option's value to the total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SelectorSetConfig {
    pub selectors: Vec<Selector>,
}

impl SelectorSetConfig {
    /// Parses the legacy wire shape: a JSON object mapping selector title to
    /// its option list. Object key order is the render order.
    pub fn from_wire(config: &Json) -> Result<Self, String> {
        let object = config
            .as_object()
            .ok_or_else(|| "selector set payload is not an object".to_string())?;
        let mut selectors = Vec::with_capacity(object.len());
        for (title, options) in object {
            let options: Vec<SelectOption> = serde_json::from_value(options.clone())
                .map_err(|e| format!("selector '{title}': {e}"))?;
            selectors.push(Selector {
                title: title.clone(),
                options,
            });
        }
        Ok(Self { selectors })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CheckboxOption {
    #[serde(rename = "type")]
    pub type_tag: String,
    pub value: i64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CheckboxGroupEntry {
    pub key: String,
    #[serde(flatten)]
    pub option: CheckboxOption,
}

/// Multi-select add-on group. The stored payload is a flat object whose keys
/// are option identifiers, except for the reserved `title` key which names
/// the group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CheckboxGroupConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub options: Vec<CheckboxGroupEntry>,
}

impl CheckboxGroupConfig {
    pub fn from_wire(config: &Json) -> Result<Self, String> {
        let object = config
            .as_object()
            .ok_or_else(|| "checkbox group payload is not an object".to_string())?;
        let mut title = None;
        let mut options = Vec::new();
        for (key, value) in object {
            if key == "title" {
                title = value.as_str().map(str::to_owned);
                continue;
            }
            let option: CheckboxOption = serde_json::from_value(value.clone())
                .map_err(|e| format!("option '{key}': {e}"))?;
            options.push(CheckboxGroupEntry {
                key: key.clone(),
                option,
            });
        }
        Ok(Self { title, options })
    }

    pub fn get(&self, key: &str) -> Option<&CheckboxOption> {
        self.options
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.option)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BoxTitleConfig {
    #[serde(default)]
    pub options: Vec<String>,
}

/// Non-priced visual divider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SectionLabelConfig {
    #[serde(default)]
    pub title: String,
}

/// Parsed component payload, discriminated by kind.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "kind", content = "data")]
pub enum ComponentConfig {
    #[serde(rename = "bar")]
    Range(RangeConfig),
    #[serde(rename = "box")]
    MultiBox(MultiBoxConfig),
    #[serde(rename = "custom")]
    CustomAmount(CustomAmountConfig),
    #[serde(rename = "selectors")]
    SelectorSet(SelectorSetConfig),
    #[serde(rename = "additional")]
    CheckboxGroup(CheckboxGroupConfig),
    #[serde(rename = "boxtitle")]
    BoxTitleLabel(BoxTitleConfig),
    #[serde(rename = "labeltitle")]
    SectionLabel(SectionLabelConfig),
}

impl ComponentConfig {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Self::Range(_) => ComponentKind::Range,
            Self::MultiBox(_) => ComponentKind::MultiBox,
            Self::CustomAmount(_) => ComponentKind::CustomAmount,
            Self::SelectorSet(_) => ComponentKind::SelectorSet,
            Self::CheckboxGroup(_) => ComponentKind::CheckboxGroup,
            Self::BoxTitleLabel(_) => ComponentKind::BoxTitleLabel,
            Self::SectionLabel(_) => ComponentKind::SectionLabel,
        }
    }
}

/// One entry of a service's ordered render list. The list mirrors storage
/// order exactly and is authoritative for layout; the per-kind slots on the
/// service are a denormalized convenience.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ComponentDescriptor {
    pub id: String,
    pub order: usize,
    #[serde(flatten)]
    pub config: ComponentConfig,
}

impl ComponentDescriptor {
    pub fn kind(&self) -> ComponentKind {
        self.config.kind()
    }
}
