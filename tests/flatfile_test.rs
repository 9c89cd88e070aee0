//! Flat-file content source loaded from an on-disk fixture directory.

use std::fs;

use assert_matches::assert_matches;
use tempfile::TempDir;

use boostline_api::errors::ServiceError;
use boostline_api::pricing::ComponentKind;
use boostline_api::services::{ContentSource, FlatFileCatalog};

const CATEGORIES_MD: &str = "\
# Categories Configuration

## Category One
- **ID**: leveling
- **Name**: Leveling
- **Description**: Level up fast
- **Icon**: trending-up

## Category Two
- **ID**: coaching
- **Name**: Coaching
- **Description**: Learn from the best
- **Icon**: graduation-cap
";

const GAMES_MD: &str = "\
# Games Configuration

## Game 1
- **ID**: game-1
- **Title**: World of Warcraft
- **Category**: mmorpg
- **Image**: /images/wow.webp

## Game 2
- **ID**: game-2
- **Title**: League of Legends
- **Category**: moba
- **Image**: /images/lol.webp
";

const SERVICES_MD: &str = "\
# Services Configuration

## Rank Boost
- **ID**: rank-boost
- **Title**: Rank Boost
- **Category**: leveling
- **Games**: game-1, game-2
- **Price**: 10
- **Image**: /images/rank.webp
- **Description**:
  - Any bracket
  - Fast start
- **BarPrice**:
  - InitValue: 0
  - FinalValue: 1000
  - Step: 50
  - Label: Rating
- **AdditionalServices**:
  - stream:
    - Type: addon
    - Value: 5
    - Label: Live stream
- **Selectors**:
  - Region transfer:
    - Same region: 0
    - Cross region: 15

## Coaching Hour
- **ID**: coaching-hour
- **Title**: Coaching Hour
- **Category**: coaching
- **Games**: game-2
- **Price**: 35
- **Image**: /images/coach.webp
- **Description**:
  - One on one
";

const ACCORDEON_MD: &str = "\
# Accordion Configuration

## Title
Frequently Asked Questions

### Item 1
- **ID**: how-it-works
- **Title**: How does it work?
- **Content**: Pick a service and pay.
";

fn write_fixture() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    for (path, content) in [
        ("categories/categories.md", CATEGORIES_MD),
        ("games/games.md", GAMES_MD),
        ("services/services.md", SERVICES_MD),
        ("accordeon/accordeon.md", ACCORDEON_MD),
    ] {
        let full = dir.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }
    dir
}

#[tokio::test]
async fn catalog_loads_and_serves_every_shape() {
    let dir = write_fixture();
    let catalog = FlatFileCatalog::load(dir.path()).expect("load");

    let games = catalog.list_games().await.unwrap();
    assert_eq!(games.len(), 2);
    assert_eq!(games[0].id, "game-1");

    let categories = catalog.list_categories().await.unwrap();
    let ids: Vec<&str> = categories.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["leveling", "coaching"]);

    let accordion = catalog.accordion_content().await.unwrap();
    assert_eq!(accordion.title, "Frequently Asked Questions");
    assert_eq!(accordion.items.len(), 1);

    let payment = catalog.payment_config().await.unwrap();
    assert!(payment.disclaimer.contains("ticket"));
}

#[tokio::test]
async fn services_carry_ordered_components() {
    let dir = write_fixture();
    let catalog = FlatFileCatalog::load(dir.path()).expect("load");

    let service = catalog.get_service_by_id("rank-boost").await.unwrap();
    assert_eq!(service.title, "Rank Boost");
    assert_eq!(service.base_price, 10);
    assert_eq!(service.games, vec!["game-1", "game-2"]);

    let kinds: Vec<ComponentKind> = service.components.iter().map(|c| c.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            ComponentKind::Range,
            ComponentKind::CheckboxGroup,
            ComponentKind::SelectorSet
        ]
    );

    let range = service.range.expect("range slot");
    assert_eq!((range.lower, range.upper, range.step), (0, 1000, 50));

    let group = service.checkbox_group.expect("checkbox group");
    assert_eq!(group.get("stream").unwrap().value, 5);

    // The selector set is the last block before the next service header and
    // must not swallow it.
    assert_eq!(service.selector_sets.len(), 1);
    let selector = &service.selector_sets[0].selectors[0];
    assert_eq!(selector.title, "Region transfer");
    assert_eq!(selector.options[1].value, 15);
}

#[tokio::test]
async fn listings_filter_by_category_and_game() {
    let dir = write_fixture();
    let catalog = FlatFileCatalog::load(dir.path()).expect("load");

    let leveling = catalog.list_services_by_category("leveling").await.unwrap();
    assert_eq!(leveling.len(), 1);
    assert_eq!(leveling[0].id, "rank-boost");

    let for_lol = catalog.list_services_by_game("game-2").await.unwrap();
    let ids: Vec<&str> = for_lol.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["rank-boost", "coaching-hour"]);

    let missing = catalog.get_service_by_id("nope").await;
    assert_matches!(missing, Err(ServiceError::NotFound(_)));
}

#[tokio::test]
async fn missing_content_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    // Only games present; the rest missing.
    fs::create_dir_all(dir.path().join("games")).unwrap();
    fs::write(dir.path().join("games/games.md"), GAMES_MD).unwrap();

    let result = FlatFileCatalog::load(dir.path());
    assert_matches!(result, Err(ServiceError::ContentParseError(_)));
}
