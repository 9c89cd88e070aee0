//! Per-component selection state.
//!
//! Each holder records what the user has picked on one rendered component and
//! emits the normalized numeric contribution the calculator folds into the
//! total. Holders are rebuilt from scratch whenever the owning service
//! changes, so no selection ever leaks across services.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::models::Service;
use crate::pricing::component::{
    CheckboxGroupConfig, CustomAmountConfig, MultiBoxConfig, MultiBoxOption, RangeConfig,
    SelectOption, SelectorSetConfig,
};

/// Snaps a raw value to the nearest multiple of `step` (multiples are
/// anchored at zero, not at the track's lower bound).
pub fn snap_to_step(raw: f64, step: i64) -> i64 {
    ((raw / step as f64).round() as i64) * step
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RangeHandle {
    Lower,
    Upper,
}

/// Two-handle range selection over a stepped track.
///
/// Invariant: `lower + step <= upper` at all times, with both handles inside
/// `[lower_bound, upper_bound]`. A handle moved onto or past its sibling
/// pushes the sibling one step along instead of crossing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeSelection {
    lower_bound: i64,
    upper_bound: i64,
    step: i64,
    lower: i64,
    upper: i64,
}

impl RangeSelection {
    pub fn new(config: &RangeConfig) -> Self {
        let (lower_bound, upper_bound) = config.bounds();
        let (lower, upper) = config.initial_selection();
        Self {
            lower_bound,
            upper_bound,
            step: config.step,
            lower,
            upper,
        }
    }

    pub fn lower(&self) -> i64 {
        self.lower
    }

    pub fn upper(&self) -> i64 {
        self.upper
    }

    pub fn bounds(&self) -> (i64, i64) {
        (self.lower_bound, self.upper_bound)
    }

    /// Moves a handle to a 0..1 fraction along the track: interpolate, snap
    /// to the step grid, clamp into bounds, then apply the non-crossing push
    /// rule against the opposite handle.
    pub fn set_from_pointer(&mut self, fraction: f64, handle: RangeHandle) {
        let fraction = fraction.clamp(0.0, 1.0);
        let span = (self.upper_bound - self.lower_bound) as f64;
        let raw = self.lower_bound as f64 + fraction * span;
        let value = snap_to_step(raw, self.step)
            .min(self.upper_bound)
            .max(self.lower_bound);

        match handle {
            RangeHandle::Lower => {
                if value >= self.upper {
                    let pushed = (self.upper + self.step).min(self.upper_bound);
                    self.upper = pushed;
                    self.lower = value.min(pushed - self.step);
                } else {
                    self.lower = value;
                }
            }
            RangeHandle::Upper => {
                if value <= self.lower {
                    let pushed = (self.lower - self.step).max(self.lower_bound);
                    self.lower = pushed;
                    self.upper = value.max(pushed + self.step);
                } else {
                    self.upper = value;
                }
            }
        }
    }

    /// Commits a typed value for a handle. Input must be pure digits (the
    /// field filters keystrokes to digits; commit happens on focus loss).
    /// Anything unparseable reverts to the committed value: returns `false`
    /// and changes nothing.
    pub fn set_from_text(&mut self, handle: RangeHandle, input: &str) -> bool {
        let input = input.trim();
        if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        let Ok(parsed) = input.parse::<i64>() else {
            return false;
        };
        let value = snap_to_step(parsed as f64, self.step);

        match handle {
            RangeHandle::Lower => {
                // The lower handle must leave one step of room below the top.
                let value = value.min(self.upper_bound - self.step).max(self.lower_bound);
                if value >= self.upper {
                    let pushed = (value + self.step).min(self.upper_bound);
                    self.upper = pushed;
                    self.lower = value.min(pushed - self.step);
                } else {
                    self.lower = value;
                }
            }
            RangeHandle::Upper => {
                let value = value.min(self.upper_bound).max(self.lower_bound + self.step);
                if value <= self.lower {
                    let pushed = (value - self.step).max(self.lower_bound);
                    self.lower = pushed;
                    self.upper = value.max(pushed + self.step);
                } else {
                    self.upper = value;
                }
            }
        }
        true
    }

    pub fn reset(&mut self, config: &RangeConfig) {
        *self = Self::new(config);
    }
}

/// Toggle set over amount boxes, keyed by list position so duplicate-valued
/// boxes count independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultiBoxSelection {
    options: Vec<MultiBoxOption>,
    selected: BTreeSet<usize>,
}

impl MultiBoxSelection {
    pub fn new(config: &MultiBoxConfig) -> Self {
        Self {
            options: config.options.clone(),
            selected: BTreeSet::new(),
        }
    }

    /// Toggles the box at `index`; out-of-range indices are ignored.
    pub fn toggle(&mut self, index: usize) -> bool {
        if index >= self.options.len() {
            return false;
        }
        if !self.selected.remove(&index) {
            self.selected.insert(index);
        }
        true
    }

    pub fn selected_values(&self) -> Vec<i64> {
        self.selected
            .iter()
            .map(|&index| self.options[index].value)
            .collect()
    }

    pub fn selected_labels(&self) -> Vec<String> {
        self.selected
            .iter()
            .map(|&index| {
                let option = &self.options[index];
                option
                    .label
                    .clone()
                    .unwrap_or_else(|| format!("${}", option.value))
            })
            .collect()
    }

    pub fn contribution(&self) -> i64 {
        self.selected_values().iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

/// Free-typed amount with optional presets. Typing clears the preset and
/// vice versa, so the last-touched input wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomAmountSelection {
    enabled: bool,
    presets: Vec<i64>,
    typed: Option<i64>,
    preset: Option<i64>,
}

impl CustomAmountSelection {
    pub fn new(config: &CustomAmountConfig) -> Self {
        Self {
            enabled: config.enabled,
            presets: config.presets.clone(),
            typed: None,
            preset: None,
        }
    }

    /// Applies typed input. Digits only; an empty string clears the typed
    /// amount; anything else is rejected without touching state.
    pub fn set_typed_text(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            self.typed = None;
            return true;
        }
        if !text.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        let Ok(value) = text.parse::<i64>() else {
            return false;
        };
        self.typed = Some(value);
        self.preset = None;
        true
    }

    /// Picks a preset amount; must be one of the configured presets.
    pub fn select_preset(&mut self, value: i64) -> bool {
        if !self.presets.contains(&value) {
            return false;
        }
        self.preset = Some(value);
        self.typed = None;
        true
    }

    /// The effective amount: typed input takes priority over a preset.
    pub fn current_amount(&self) -> Option<i64> {
        self.typed.or(self.preset)
    }

    pub fn contribution(&self) -> i64 {
        if !self.enabled {
            return 0;
        }
        self.current_amount().unwrap_or(0)
    }
}

/// Independent single-choice state per named selector in one selector set.
/// A chosen value of 0 means "unchosen".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorSetSelection {
    set: SelectorSetConfig,
    chosen: Vec<i64>,
}

impl SelectorSetSelection {
    pub fn new(set: &SelectorSetConfig) -> Self {
        Self {
            set: set.clone(),
            chosen: vec![0; set.selectors.len()],
        }
    }

    /// Records the chosen option value for one selector. `0` unchooses;
    /// any other value must belong to the selector's option list.
    pub fn choose(&mut self, selector: usize, value: i64) -> bool {
        let Some(config) = self.set.selectors.get(selector) else {
            return false;
        };
        if value != 0 && !config.options.iter().any(|option| option.value == value) {
            return false;
        }
        self.chosen[selector] = value;
        true
    }

    pub fn contribution(&self) -> i64 {
        self.chosen.iter().sum()
    }

    /// Chosen (selector title, option) pairs, skipping unchosen selectors.
    pub fn choices(&self) -> Vec<(&str, &SelectOption)> {
        self.set
            .selectors
            .iter()
            .zip(&self.chosen)
            .filter(|(_, &value)| value != 0)
            .filter_map(|(selector, &value)| {
                selector
                    .options
                    .iter()
                    .find(|option| option.value == value)
                    .map(|option| (selector.title.as_str(), option))
            })
            .collect()
    }
}

/// Toggle set over checkbox-group option keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckboxSelection {
    group: CheckboxGroupConfig,
    selected: BTreeSet<String>,
}

impl CheckboxSelection {
    pub fn new(group: &CheckboxGroupConfig) -> Self {
        Self {
            group: group.clone(),
            selected: BTreeSet::new(),
        }
    }

    /// Toggles a known option key; unknown keys are ignored.
    pub fn toggle(&mut self, key: &str) -> bool {
        if self.group.get(key).is_none() {
            return false;
        }
        if !self.selected.remove(key) {
            self.selected.insert(key.to_owned());
        }
        true
    }

    pub fn selected_values(&self) -> Vec<i64> {
        self.group
            .options
            .iter()
            .filter(|entry| self.selected.contains(&entry.key))
            .map(|entry| entry.option.value)
            .collect()
    }

    /// Labels of checked options, in configuration order.
    pub fn selected_labels(&self) -> Vec<&str> {
        self.group
            .options
            .iter()
            .filter(|entry| self.selected.contains(&entry.key))
            .map(|entry| entry.option.label.as_str())
            .collect()
    }

    pub fn contribution(&self) -> i64 {
        self.selected_values().iter().sum()
    }
}

/// All selection state for one service, one holder per configured component.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct ServiceSelections {
    pub range: Option<RangeSelection>,
    pub multi_box: Option<MultiBoxSelection>,
    pub custom_amount: Option<CustomAmountSelection>,
    pub selector_sets: Vec<SelectorSetSelection>,
    pub checkbox_group: Option<CheckboxSelection>,
}

impl ServiceSelections {
    /// Freshly-initialized selections for a service. Called on every service
    /// change, which is what guarantees the reset-on-identity-change rule.
    pub fn for_service(service: &Service) -> Self {
        Self {
            range: service.range.as_ref().map(RangeSelection::new),
            multi_box: service.multi_box.as_ref().map(MultiBoxSelection::new),
            custom_amount: service
                .custom_amount
                .as_ref()
                .map(CustomAmountSelection::new),
            selector_sets: service
                .selector_sets
                .iter()
                .map(SelectorSetSelection::new)
                .collect(),
            checkbox_group: service.checkbox_group.as_ref().map(CheckboxSelection::new),
        }
    }
}
