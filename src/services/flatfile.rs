//! Flat-file content source.
//!
//! Reads the same catalog from markdown files instead of the row store and
//! produces identical entity shapes: parsed pricing blocks are turned into
//! synthetic component rows (in file order) and fed through the same
//! assembler the row store uses. The content directory layout is
//! `categories/categories.md`, `games/games.md`, `services/services.md`,
//! `accordeon/accordeon.md`; a missing file is fatal at load time.

use std::fs;
use std::path::Path;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value as Json};
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::models::{AccordionContent, AccordionItem, Category, Game, PaymentConfig, Service};
use crate::pricing::{assemble, RawComponentRow, RawServiceRecord};
use crate::services::catalog::{ContentSource, DEFAULT_PAYMENT_DISCLAIMER};

/// Box line carrying a label: `- Tier 2: 200`.
static BOX_WITH_TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-\s*(.+?):\s*(\d+)").unwrap());
/// Bare numeric box or preset line: `- 100`.
static BARE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-\s*(\d+)").unwrap());
/// Selector option line: `- 1 Character: 0`.
static OPTION_WITH_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-\s+(.+?):\s*(\d+)\s*$").unwrap());
/// Checkbox option header: `- addOption1:`.
static OPTION_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-\s+\w+:$").unwrap());

/// Catalog parsed once at startup from a content directory.
#[derive(Debug)]
pub struct FlatFileCatalog {
    games: Vec<Game>,
    categories: Vec<Category>,
    services: Vec<Service>,
    accordion: AccordionContent,
}

impl FlatFileCatalog {
    #[instrument(skip(dir), fields(dir = %dir.as_ref().display()))]
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let dir = dir.as_ref();
        let read = |relative: &str| -> Result<String, ServiceError> {
            fs::read_to_string(dir.join(relative)).map_err(|e| {
                ServiceError::ContentParseError(format!("cannot read {relative}: {e}"))
            })
        };

        let catalog = Self {
            games: parse_games(&read("games/games.md")?),
            categories: parse_categories(&read("categories/categories.md")?),
            services: parse_services(&read("services/services.md")?),
            accordion: parse_accordion(&read("accordeon/accordeon.md")?),
        };
        info!(
            games = catalog.games.len(),
            categories = catalog.categories.len(),
            services = catalog.services.len(),
            "flat-file catalog loaded"
        );
        Ok(catalog)
    }
}

#[async_trait]
impl ContentSource for FlatFileCatalog {
    async fn list_games(&self) -> Result<Vec<Game>, ServiceError> {
        Ok(self.games.clone())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, ServiceError> {
        Ok(self.categories.clone())
    }

    async fn get_service_by_id(&self, id: &str) -> Result<Service, ServiceError> {
        self.services
            .iter()
            .find(|service| service.id == id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("Service {} not found", id)))
    }

    async fn list_services_by_category(
        &self,
        category_id: &str,
    ) -> Result<Vec<Service>, ServiceError> {
        Ok(self
            .services
            .iter()
            .filter(|service| service.category_id == category_id)
            .cloned()
            .collect())
    }

    async fn list_services_by_game(&self, game_id: &str) -> Result<Vec<Service>, ServiceError> {
        Ok(self
            .services
            .iter()
            .filter(|service| service.games.iter().any(|game| game == game_id))
            .cloned()
            .collect())
    }

    async fn payment_config(&self) -> Result<PaymentConfig, ServiceError> {
        Ok(PaymentConfig {
            disclaimer: DEFAULT_PAYMENT_DISCLAIMER.to_string(),
        })
    }

    async fn accordion_content(&self) -> Result<AccordionContent, ServiceError> {
        Ok(self.accordion.clone())
    }
}

/// Value of a `- **Name**: value` field line, if this line is one.
fn field<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let rest = line.strip_prefix("- **")?.strip_prefix(name)?;
    let rest = rest.strip_prefix("**:")?;
    Some(rest.trim())
}

fn parse_categories(text: &str) -> Vec<Category> {
    #[derive(Default)]
    struct Draft {
        id: Option<String>,
        name: Option<String>,
        description: Option<String>,
        icon: Option<String>,
    }
    impl Draft {
        fn finish(self) -> Option<Category> {
            Some(Category {
                id: self.id?,
                name: self.name?,
                description: self.description?,
                icon: self.icon?,
            })
        }
    }

    let mut categories = Vec::new();
    let mut draft = Draft::default();
    for line in text.lines() {
        if line.starts_with("## ") && !line.contains("Configuration") {
            if let Some(category) = std::mem::take(&mut draft).finish() {
                categories.push(category);
            }
        } else if let Some(value) = field(line, "ID") {
            draft.id = Some(value.to_string());
        } else if let Some(value) = field(line, "Name") {
            draft.name = Some(value.to_string());
        } else if let Some(value) = field(line, "Description") {
            draft.description = Some(value.to_string());
        } else if let Some(value) = field(line, "Icon") {
            draft.icon = Some(value.to_string());
        }
    }
    if let Some(category) = draft.finish() {
        categories.push(category);
    }
    categories
}

fn parse_games(text: &str) -> Vec<Game> {
    #[derive(Default)]
    struct Draft {
        id: Option<String>,
        title: Option<String>,
        category: Option<String>,
        image: Option<String>,
    }
    impl Draft {
        fn finish(self) -> Option<Game> {
            Some(Game {
                id: self.id?,
                title: self.title?,
                category: self.category?,
                image: self.image?,
            })
        }
    }

    let mut games = Vec::new();
    let mut draft = Draft::default();
    for line in text.lines() {
        if line.starts_with("## ") && !line.contains("Configuration") {
            if let Some(game) = std::mem::take(&mut draft).finish() {
                games.push(game);
            }
        } else if let Some(value) = field(line, "ID") {
            draft.id = Some(value.to_string());
        } else if let Some(value) = field(line, "Title") {
            draft.title = Some(value.to_string());
        } else if let Some(value) = field(line, "Category") {
            draft.category = Some(value.to_string());
        } else if let Some(value) = field(line, "Image") {
            draft.image = Some(value.to_string());
        }
    }
    if let Some(game) = draft.finish() {
        games.push(game);
    }
    games
}

fn parse_accordion(text: &str) -> AccordionContent {
    let lines: Vec<&str> = text.lines().collect();
    let mut accordion = AccordionContent {
        title: String::new(),
        items: Vec::new(),
    };

    #[derive(Default)]
    struct Draft {
        id: Option<String>,
        title: Option<String>,
        content: Option<String>,
    }
    impl Draft {
        fn finish(self) -> Option<AccordionItem> {
            Some(AccordionItem {
                id: self.id?,
                title: self.title?,
                content: self.content?,
            })
        }
    }

    let mut draft = Draft::default();
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if line.starts_with("## Title") {
            if let Some(next) = lines.get(i + 1) {
                accordion.title = next.trim().to_string();
                i += 1;
            }
        } else if line.starts_with("### Item") {
            if let Some(item) = std::mem::take(&mut draft).finish() {
                accordion.items.push(item);
            }
        } else if let Some(value) = field(line, "ID") {
            draft.id = Some(value.to_string());
        } else if let Some(value) = field(line, "Title") {
            draft.title = Some(value.to_string());
        } else if let Some(value) = field(line, "Content") {
            draft.content = Some(value.to_string());
        }
        i += 1;
    }
    if let Some(item) = draft.finish() {
        accordion.items.push(item);
    }
    accordion
}

#[derive(Default)]
struct ServiceDraft {
    id: Option<String>,
    title: Option<String>,
    category_id: Option<String>,
    price: Option<i64>,
    image: Option<String>,
    description: Vec<String>,
    games: Vec<String>,
    /// (kind tag, config payload) in file order.
    components: Vec<(String, Json)>,
}

impl ServiceDraft {
    fn finish(self) -> Option<Service> {
        let id = self.id?;
        let record = RawServiceRecord {
            id: id.clone(),
            title: self.title?,
            category_id: self.category_id?,
            base_price: self.price?,
            image: self.image?,
            description: self.description,
            service_points: None,
            games: self.games,
        };
        let rows: Vec<RawComponentRow> = self
            .components
            .into_iter()
            .enumerate()
            .map(|(index, (kind, config))| RawComponentRow {
                id: format!("{id}-{kind}-{index}"),
                kind,
                config,
            })
            .collect();
        Some(assemble(record, &rows))
    }
}

fn parse_services(text: &str) -> Vec<Service> {
    let lines: Vec<&str> = text.lines().collect();
    let mut services = Vec::new();
    let mut draft: Option<ServiceDraft> = None;

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if line.starts_with("## ") && !line.contains("Configuration") {
            if let Some(service) = draft.take().and_then(ServiceDraft::finish) {
                services.push(service);
            }
            draft = Some(ServiceDraft::default());
            i += 1;
            continue;
        }

        let Some(current) = draft.as_mut() else {
            i += 1;
            continue;
        };

        if let Some(value) = field(line, "ID") {
            current.id = Some(value.to_string());
        } else if let Some(value) = field(line, "Title") {
            current.title = Some(value.to_string());
        } else if let Some(value) = field(line, "Category") {
            current.category_id = Some(value.to_string());
        } else if let Some(value) = field(line, "Games") {
            current.games = value.split(',').map(|game| game.trim().to_string()).collect();
        } else if let Some(value) = field(line, "Price") {
            current.price = value.parse().ok();
        } else if let Some(value) = field(line, "Image") {
            current.image = Some(value.to_string());
        } else if field(line, "Description").is_some() {
            i = parse_description(&lines, i + 1, current);
            continue;
        } else if field(line, "BarPrice").is_some() {
            i = parse_bar_price(&lines, i + 1, current);
            continue;
        } else if field(line, "BoxPrice").is_some() {
            i = parse_box_price(&lines, i + 1, current);
            continue;
        } else if field(line, "CustomPrice").is_some() {
            i = parse_custom_price(&lines, i + 1, current);
            continue;
        } else if field(line, "Selectors").is_some() {
            i = parse_selectors(&lines, i + 1, current);
            continue;
        } else if field(line, "AdditionalServices").is_some() {
            i = parse_additional_services(&lines, i + 1, current);
            continue;
        }
        i += 1;
    }

    if let Some(service) = draft.and_then(ServiceDraft::finish) {
        services.push(service);
    }
    services
}

/// True while still inside an indented block belonging to the current field.
fn in_block(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with('-') && !trimmed.contains("**")
}

fn parse_description(lines: &[&str], mut i: usize, draft: &mut ServiceDraft) -> usize {
    while i < lines.len() && in_block(lines[i]) {
        let point = lines[i].trim().get(2..).unwrap_or("");
        draft.description.push(point.to_string());
        i += 1;
    }
    i
}

fn parse_bar_price(lines: &[&str], mut i: usize, draft: &mut ServiceDraft) -> usize {
    let mut config = Map::new();
    while i < lines.len() && in_block(lines[i]) {
        let line = lines[i].trim();
        let value_of = |line: &str| line.splitn(2, ':').nth(1).map(|v| v.trim().to_string());
        if line.contains("InitValue:") {
            if let Some(value) = value_of(line).and_then(|v| v.parse::<i64>().ok()) {
                config.insert("initValue".into(), json!(value));
            }
        } else if line.contains("FinalValue:") {
            if let Some(value) = value_of(line).and_then(|v| v.parse::<i64>().ok()) {
                config.insert("finalValue".into(), json!(value));
            }
        } else if line.contains("Step:") {
            if let Some(value) = value_of(line).and_then(|v| v.parse::<i64>().ok()) {
                config.insert("step".into(), json!(value));
            }
        } else if line.contains("Label:") {
            if let Some(value) = value_of(line) {
                config.insert("label".into(), json!(value));
            }
        }
        i += 1;
    }

    let complete = ["initValue", "finalValue", "step"]
        .iter()
        .all(|key| config.contains_key(*key));
    if complete {
        draft.components.push(("bar".into(), Json::Object(config)));
    }
    i
}

fn parse_box_price(lines: &[&str], mut i: usize, draft: &mut ServiceDraft) -> usize {
    let mut options = Vec::new();
    while i < lines.len() && in_block(lines[i]) {
        let line = lines[i].trim();
        if let Some(captures) = BOX_WITH_TITLE.captures(line) {
            options.push(json!({
                "title": captures[1].trim(),
                "value": captures[2].parse::<i64>().unwrap_or(0),
            }));
        } else if let Some(captures) = BARE_NUMBER.captures(line) {
            options.push(json!({ "value": captures[1].parse::<i64>().unwrap_or(0) }));
        }
        i += 1;
    }
    if !options.is_empty() {
        draft
            .components
            .push(("box".into(), json!({ "options": options })));
    }
    i
}

fn parse_custom_price(lines: &[&str], mut i: usize, draft: &mut ServiceDraft) -> usize {
    let mut config = Map::new();
    while i < lines.len() && in_block(lines[i]) {
        let line = lines[i].trim();
        if line.contains("Label:") {
            if let Some(value) = line.splitn(2, ':').nth(1) {
                config.insert("label".into(), json!(value.trim()));
            }
            i += 1;
        } else if line.contains("Presets:") {
            i += 1;
            let mut presets = Vec::new();
            while i < lines.len() && in_block(lines[i]) && !lines[i].contains(':') {
                if let Some(captures) = BARE_NUMBER.captures(lines[i].trim()) {
                    presets.push(captures[1].parse::<i64>().unwrap_or(0));
                }
                i += 1;
            }
            if !presets.is_empty() {
                config.insert("presets".into(), json!(presets));
            }
        } else {
            i += 1;
        }
    }
    draft
        .components
        .push(("custom".into(), Json::Object(config)));
    i
}

/// A selector header ends with a colon and carries no trailing number.
fn is_selector_header(line: &str) -> bool {
    line.starts_with('-') && line.ends_with(':') && !OPTION_WITH_VALUE.is_match(line)
}

fn parse_selectors(lines: &[&str], mut i: usize, draft: &mut ServiceDraft) -> usize {
    let mut selectors = Map::new();
    while i < lines.len() {
        let line = lines[i].trim();
        // Stop at the next field or the next document heading.
        if line.contains("**") || line.starts_with('#') {
            break;
        }
        if is_selector_header(line) {
            let title = line
                .trim_start_matches('-')
                .trim()
                .trim_end_matches(':')
                .trim()
                .to_string();
            i += 1;
            let mut options = Vec::new();
            while i < lines.len() {
                let option_line = lines[i].trim();
                if option_line.contains("**")
                    || option_line.starts_with('#')
                    || is_selector_header(option_line)
                {
                    break;
                }
                if let Some(captures) = OPTION_WITH_VALUE.captures(option_line) {
                    options.push(json!({
                        "label": captures[1].trim(),
                        "value": captures[2].parse::<i64>().unwrap_or(0),
                    }));
                    i += 1;
                } else if option_line.is_empty() {
                    i += 1;
                } else {
                    break;
                }
            }
            if !options.is_empty() {
                selectors.insert(title, json!(options));
            }
        } else {
            i += 1;
        }
    }
    if !selectors.is_empty() {
        draft
            .components
            .push(("selectors".into(), Json::Object(selectors)));
    }
    i
}

fn parse_additional_services(lines: &[&str], mut i: usize, draft: &mut ServiceDraft) -> usize {
    let mut options = Map::new();
    let mut current_key: Option<String> = None;
    let mut current = Map::new();

    let mut flush = |key: &mut Option<String>, option: &mut Map<String, Json>, out: &mut Map<String, Json>| {
        if let Some(key) = key.take() {
            if !option.is_empty() {
                out.insert(key, Json::Object(std::mem::take(option)));
            }
        }
    };

    while i < lines.len() && lines[i].trim().starts_with('-') {
        let line = lines[i].trim();
        if line.contains("**") {
            break;
        }
        if OPTION_KEY.is_match(line) {
            flush(&mut current_key, &mut current, &mut options);
            current_key = Some(
                line.trim_start_matches('-')
                    .trim()
                    .trim_end_matches(':')
                    .to_string(),
            );
        } else if current_key.is_some() {
            let value_of = |line: &str| line.splitn(2, ':').nth(1).map(|v| v.trim().to_string());
            if line.contains("Type:") {
                if let Some(value) = value_of(line) {
                    current.insert("type".into(), json!(value));
                }
            } else if line.contains("Value:") {
                if let Some(value) = value_of(line).and_then(|v| v.parse::<i64>().ok()) {
                    current.insert("value".into(), json!(value));
                }
            } else if line.contains("Label:") {
                if let Some(value) = value_of(line) {
                    current.insert("label".into(), json!(value));
                }
            }
        }
        i += 1;
    }
    flush(&mut current_key, &mut current, &mut options);

    if !options.is_empty() {
        draft
            .components
            .push(("additional".into(), Json::Object(options)));
    }
    i
}
