//! Builds a [`Service`] from its stored rows.
//!
//! Component rows are consumed in storage order (ascending creation order)
//! and feed two views that must stay consistent: the ordered render list,
//! which is authoritative for layout, and the denormalized per-kind slots.
//! Unrecognized kinds and payloads that fail validation are dropped, never
//! propagated as untyped data.

use std::str::FromStr;

use serde_json::Value as Json;
use tracing::warn;

use crate::models::{SectionLabel, Service};
use crate::pricing::component::{
    BoxTitleConfig, CheckboxGroupConfig, ComponentConfig, ComponentDescriptor, ComponentKind,
    CustomAmountConfig, MultiBoxConfig, RangeConfig, SectionLabelConfig, SelectorSetConfig,
};

/// Service row as produced by either content source, before its pricing
/// components are resolved.
#[derive(Debug, Clone)]
pub struct RawServiceRecord {
    pub id: String,
    pub title: String,
    pub category_id: String,
    pub base_price: i64,
    pub image: String,
    pub description: Vec<String>,
    pub service_points: Option<Vec<String>>,
    pub games: Vec<String>,
}

/// One stored pricing-component row: kind tag plus untyped payload.
#[derive(Debug, Clone)]
pub struct RawComponentRow {
    pub id: String,
    pub kind: String,
    pub config: Json,
}

/// Resolves component rows (already in storage order) onto a service record.
///
/// Singular kinds (range, multi-box, custom-amount, checkbox-group) follow
/// last-write-wins into their slot when storage yields duplicates; every
/// recognized row still lands in the render list.
pub fn assemble(record: RawServiceRecord, rows: &[RawComponentRow]) -> Service {
    let mut service = Service {
        id: record.id,
        title: record.title,
        category_id: record.category_id,
        base_price: record.base_price,
        image: record.image,
        description: record.description,
        service_points: record.service_points,
        games: record.games,
        range: None,
        multi_box: None,
        custom_amount: None,
        selector_sets: Vec::new(),
        checkbox_group: None,
        box_titles: Vec::new(),
        section_labels: Vec::new(),
        components: Vec::new(),
    };

    for row in rows {
        let Ok(kind) = ComponentKind::from_str(&row.kind) else {
            warn!(service_id = %service.id, kind = %row.kind, "dropping unrecognized pricing component kind");
            continue;
        };
        let config = match parse_component(kind, &row.config) {
            Ok(config) => config,
            Err(reason) => {
                warn!(service_id = %service.id, kind = %row.kind, %reason, "dropping malformed pricing component payload");
                continue;
            }
        };

        match &config {
            ComponentConfig::Range(range) => service.range = Some(range.clone()),
            ComponentConfig::MultiBox(boxes) => service.multi_box = Some(boxes.clone()),
            ComponentConfig::CustomAmount(custom) => service.custom_amount = Some(custom.clone()),
            ComponentConfig::SelectorSet(set) => service.selector_sets.push(set.clone()),
            ComponentConfig::CheckboxGroup(group) => service.checkbox_group = Some(group.clone()),
            ComponentConfig::BoxTitleLabel(titles) => service.box_titles = titles.options.clone(),
            ComponentConfig::SectionLabel(label) => service.section_labels.push(SectionLabel {
                id: row.id.clone(),
                title: label.title.clone(),
            }),
        }

        let order = service.components.len();
        service.components.push(ComponentDescriptor {
            id: row.id.clone(),
            order,
            config,
        });
    }

    service
}

fn parse_component(kind: ComponentKind, config: &Json) -> Result<ComponentConfig, String> {
    match kind {
        ComponentKind::Range => {
            let range: RangeConfig =
                serde_json::from_value(config.clone()).map_err(|e| e.to_string())?;
            range.validate()?;
            Ok(ComponentConfig::Range(range))
        }
        ComponentKind::MultiBox => {
            let boxes: MultiBoxConfig =
                serde_json::from_value(config.clone()).map_err(|e| e.to_string())?;
            Ok(ComponentConfig::MultiBox(boxes))
        }
        ComponentKind::CustomAmount => {
            let mut custom: CustomAmountConfig =
                serde_json::from_value(config.clone()).map_err(|e| e.to_string())?;
            // Presence of the row means the control is on; an explicit
            // `enabled: false` in the payload still wins.
            if config.get("enabled").is_none() {
                custom.enabled = true;
            }
            Ok(ComponentConfig::CustomAmount(custom))
        }
        ComponentKind::SelectorSet => {
            SelectorSetConfig::from_wire(config).map(ComponentConfig::SelectorSet)
        }
        ComponentKind::CheckboxGroup => {
            CheckboxGroupConfig::from_wire(config).map(ComponentConfig::CheckboxGroup)
        }
        ComponentKind::BoxTitleLabel => {
            let titles: BoxTitleConfig =
                serde_json::from_value(config.clone()).map_err(|e| e.to_string())?;
            Ok(ComponentConfig::BoxTitleLabel(titles))
        }
        ComponentKind::SectionLabel => {
            let label: SectionLabelConfig =
                serde_json::from_value(config.clone()).map_err(|e| e.to_string())?;
            Ok(ComponentConfig::SectionLabel(label))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> RawServiceRecord {
        RawServiceRecord {
            id: "svc-1".into(),
            title: "Rank boost".into(),
            category_id: "cat-1".into(),
            base_price: 10,
            image: "/images/rank.webp".into(),
            description: vec!["Fast".into()],
            service_points: None,
            games: vec!["game-1".into()],
        }
    }

    fn row(id: &str, kind: &str, config: Json) -> RawComponentRow {
        RawComponentRow {
            id: id.into(),
            kind: kind.into(),
            config,
        }
    }

    #[test]
    fn render_list_preserves_storage_order() {
        let rows = vec![
            row("r1", "bar", json!({"initValue": 0, "finalValue": 100, "step": 10})),
            row("r2", "labeltitle", json!({"title": "Add-ons"})),
            row("r3", "box", json!({"options": [{"value": 25}]})),
            row(
                "r4",
                "selectors",
                json!({"Size": [{"label": "S", "value": 0}]}),
            ),
        ];

        let service = assemble(record(), &rows);
        let ids: Vec<&str> = service
            .components
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, vec!["r1", "r2", "r3", "r4"]);
        let orders: Vec<usize> = service.components.iter().map(|c| c.order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3]);
        assert_eq!(
            service.components[0].kind(),
            ComponentKind::Range
        );
    }

    #[test]
    fn duplicate_singular_rows_last_wins_in_slot_but_both_render() {
        let rows = vec![
            row("r1", "bar", json!({"initValue": 0, "finalValue": 100, "step": 10})),
            row("r2", "bar", json!({"initValue": 0, "finalValue": 500, "step": 50})),
        ];

        let service = assemble(record(), &rows);
        assert_eq!(service.components.len(), 2);
        let range = service.range.expect("range slot");
        assert_eq!((range.lower, range.upper, range.step), (0, 500, 50));
    }

    #[test]
    fn unrecognized_kind_is_dropped_silently() {
        let rows = vec![
            row("r1", "hologram", json!({"whatever": true})),
            row("r2", "box", json!({"options": [{"value": 5}]})),
        ];

        let service = assemble(record(), &rows);
        assert_eq!(service.components.len(), 1);
        assert_eq!(service.components[0].id, "r2");
    }

    #[test]
    fn malformed_payload_is_dropped() {
        let rows = vec![
            // Inverted bounds fail validation.
            row("r1", "bar", json!({"initValue": 100, "finalValue": 0, "step": 10})),
            row("r2", "selectors", json!("not an object")),
        ];

        let service = assemble(record(), &rows);
        assert!(service.components.is_empty());
        assert!(service.range.is_none());
        assert!(service.selector_sets.is_empty());
    }

    #[test]
    fn checkbox_group_extracts_reserved_title_key() {
        let rows = vec![row(
            "r1",
            "additional",
            json!({
                "title": "Extras",
                "stream": {"type": "addon", "value": 5, "label": "Live stream"},
                "priority": {"type": "addon", "value": 12, "label": "Priority start"},
            }),
        )];

        let service = assemble(record(), &rows);
        let group = service.checkbox_group.expect("checkbox group");
        assert_eq!(group.title.as_deref(), Some("Extras"));
        assert_eq!(group.options.len(), 2);
        assert!(group.get("title").is_none());
        assert_eq!(group.get("stream").unwrap().value, 5);
    }

    #[test]
    fn custom_amount_row_presence_enables_the_control() {
        let rows = vec![row("r1", "custom", json!({"label": "Tip", "presets": [5, 10]}))];
        let service = assemble(record(), &rows);
        let custom = service.custom_amount.expect("custom slot");
        assert!(custom.enabled);
        assert_eq!(custom.presets, vec![5, 10]);
    }

    #[test]
    fn section_labels_accumulate_per_row() {
        let rows = vec![
            row("r1", "labeltitle", json!({"title": "Pick a tier"})),
            row("r2", "labeltitle", json!({"title": "Extras"})),
            row("r3", "boxtitle", json!({"options": ["Bronze", "Silver"]})),
        ];

        let service = assemble(record(), &rows);
        let titles: Vec<&str> = service
            .section_labels
            .iter()
            .map(|l| l.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Pick a tier", "Extras"]);
        assert_eq!(service.box_titles, vec!["Bronze", "Silver"]);
    }

    #[test]
    fn selector_wire_object_order_is_kept() {
        let rows = vec![row(
            "r1",
            "selectors",
            json!({
                "Characters": [{"label": "1 Character", "value": 0}],
                "Speed": [{"label": "Express", "value": 30}],
            }),
        )];

        let service = assemble(record(), &rows);
        assert_eq!(service.selector_sets.len(), 1);
        let titles: Vec<&str> = service.selector_sets[0]
            .selectors
            .iter()
            .map(|s| s.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Characters", "Speed"]);
    }
}
