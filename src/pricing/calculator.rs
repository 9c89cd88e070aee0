//! Pure total computation. Every rule is additive and independently
//! optional; nothing here touches storage or mutates state.

use crate::models::Service;
use crate::pricing::component::RangeConfig;
use crate::pricing::selection::{RangeSelection, ServiceSelections};

/// Price of the selected span, expressed as whole steps of the *root* step.
///
/// The root step is used even in breakpoints mode, where the visible track
/// resolution varies per breakpoint; billing granularity stays uniform.
pub fn range_contribution(config: &RangeConfig, selection: &RangeSelection) -> i64 {
    let span = selection.upper() - selection.lower();
    let num_steps = (span as f64 / config.step as f64).round() as i64;
    num_steps * config.step
}

/// Final price for a service under the given selections.
///
/// The flat base price only applies when none of range/multi-box/custom-amount
/// is configured; selector sets and checkbox groups never suppress it. A
/// multi-box slot configured with an empty option list still counts as
/// configured and suppresses the fallback.
pub fn compute_total(service: &Service, selections: &ServiceSelections) -> i64 {
    let custom_enabled = service
        .custom_amount
        .as_ref()
        .map(|config| config.enabled)
        .unwrap_or(false);

    let mut total = if service.range.is_none() && service.multi_box.is_none() && !custom_enabled {
        service.base_price
    } else {
        0
    };

    if let (Some(config), Some(selection)) = (&service.range, &selections.range) {
        total += range_contribution(config, selection);
    }
    if let Some(selection) = &selections.multi_box {
        total += selection.contribution();
    }
    if let Some(selection) = &selections.custom_amount {
        total += selection.contribution();
    }
    for selection in &selections.selector_sets {
        total += selection.contribution();
    }
    if let Some(selection) = &selections.checkbox_group {
        total += selection.contribution();
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Service;
    use crate::pricing::component::{
        CheckboxGroupEntry, CheckboxOption, CheckboxGroupConfig, CustomAmountConfig,
        MultiBoxConfig, MultiBoxOption, RangeBreakpoint, RangeMode, SelectOption, Selector,
        SelectorSetConfig,
    };

    fn bare_service() -> Service {
        Service {
            id: "svc-1".into(),
            title: "Test boost".into(),
            category_id: "cat-1".into(),
            base_price: 5,
            image: "/images/test.webp".into(),
            description: vec!["Point".into()],
            service_points: None,
            games: Vec::new(),
            range: None,
            multi_box: None,
            custom_amount: None,
            selector_sets: Vec::new(),
            checkbox_group: None,
            box_titles: Vec::new(),
            section_labels: Vec::new(),
            components: Vec::new(),
        }
    }

    fn range_config(lower: i64, upper: i64, step: i64) -> RangeConfig {
        RangeConfig {
            lower,
            upper,
            step,
            label: None,
            mode: None,
            breakpoints: Vec::new(),
            default_range: None,
        }
    }

    #[test]
    fn base_price_fallback_with_selector_only() {
        // Service with no range/box/custom, base 5, one selector set.
        let mut service = bare_service();
        service.selector_sets = vec![SelectorSetConfig {
            selectors: vec![Selector {
                title: "Size".into(),
                options: vec![
                    SelectOption {
                        label: "S".into(),
                        value: 0,
                    },
                    SelectOption {
                        label: "L".into(),
                        value: 15,
                    },
                ],
            }],
        }];

        let mut selections = ServiceSelections::for_service(&service);
        assert_eq!(compute_total(&service, &selections), 5);

        assert!(selections.selector_sets[0].choose(0, 15));
        assert_eq!(compute_total(&service, &selections), 20);
    }

    #[test]
    fn range_component_suppresses_base_price() {
        let mut service = bare_service();
        service.base_price = 99;
        service.range = Some(range_config(0, 1000, 50));

        let selections = ServiceSelections::for_service(&service);
        // Full span selected: 20 steps of 50.
        assert_eq!(compute_total(&service, &selections), 1000);
    }

    #[test]
    fn empty_multi_box_slot_still_suppresses_fallback() {
        let mut service = bare_service();
        service.base_price = 42;
        service.multi_box = Some(MultiBoxConfig {
            options: Vec::new(),
        });

        let selections = ServiceSelections::for_service(&service);
        assert_eq!(compute_total(&service, &selections), 0);
    }

    #[test]
    fn disabled_custom_amount_keeps_fallback() {
        let mut service = bare_service();
        service.base_price = 42;
        service.custom_amount = Some(CustomAmountConfig {
            enabled: false,
            label: None,
            presets: vec![10],
        });

        let selections = ServiceSelections::for_service(&service);
        assert_eq!(compute_total(&service, &selections), 42);
    }

    #[test]
    fn duplicate_boxes_count_per_index() {
        let mut service = bare_service();
        service.multi_box = Some(MultiBoxConfig {
            options: vec![
                MultiBoxOption {
                    value: 10,
                    label: None,
                },
                MultiBoxOption {
                    value: 10,
                    label: None,
                },
                MultiBoxOption {
                    value: 25,
                    label: None,
                },
            ],
        });

        let mut selections = ServiceSelections::for_service(&service);
        let boxes = selections.multi_box.as_mut().unwrap();
        assert!(boxes.toggle(0));
        assert!(boxes.toggle(1));
        assert_eq!(compute_total(&service, &selections), 20);
    }

    #[test]
    fn breakpoints_price_with_root_step() {
        // Display resolution varies per breakpoint, but billing always uses
        // the root step.
        let mut service = bare_service();
        service.range = Some(RangeConfig {
            lower: 0,
            upper: 0,
            step: 50,
            label: None,
            mode: Some(RangeMode::Breakpoints),
            breakpoints: vec![
                RangeBreakpoint {
                    lower: 100,
                    upper: 500,
                    step: 10,
                },
                RangeBreakpoint {
                    lower: 500,
                    upper: 2000,
                    step: 100,
                },
            ],
            default_range: None,
        });

        let selections = ServiceSelections::for_service(&service);
        // Span 1900 at root step 50: 38 steps * 50.
        assert_eq!(compute_total(&service, &selections), 1900);
    }

    #[test]
    fn total_is_sum_of_contributions() {
        let mut service = bare_service();
        service.range = Some(range_config(0, 100, 10));
        service.multi_box = Some(MultiBoxConfig {
            options: vec![MultiBoxOption {
                value: 30,
                label: None,
            }],
        });
        service.custom_amount = Some(CustomAmountConfig {
            enabled: true,
            label: None,
            presets: vec![25],
        });
        service.selector_sets = vec![SelectorSetConfig {
            selectors: vec![Selector {
                title: "Speed".into(),
                options: vec![SelectOption {
                    label: "Express".into(),
                    value: 7,
                }],
            }],
        }];
        service.checkbox_group = Some(CheckboxGroupConfig {
            title: None,
            options: vec![CheckboxGroupEntry {
                key: "stream".into(),
                option: CheckboxOption {
                    type_tag: "addon".into(),
                    value: 3,
                    label: "Live stream".into(),
                },
            }],
        });

        let mut selections = ServiceSelections::for_service(&service);
        selections.multi_box.as_mut().unwrap().toggle(0);
        selections.custom_amount.as_mut().unwrap().select_preset(25);
        selections.selector_sets[0].choose(0, 7);
        selections.checkbox_group.as_mut().unwrap().toggle("stream");

        let range = range_contribution(
            service.range.as_ref().unwrap(),
            selections.range.as_ref().unwrap(),
        );
        assert_eq!(range, 100);
        assert_eq!(compute_total(&service, &selections), 100 + 30 + 25 + 7 + 3);

        // Changing one component leaves every other contribution untouched.
        selections.checkbox_group.as_mut().unwrap().toggle("stream");
        assert_eq!(compute_total(&service, &selections), 100 + 30 + 25 + 7);
    }
}
