//! End-to-end checkout flow against stub collaborators: a fixed in-memory
//! catalog and a scripted payment gateway.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use async_trait::async_trait;
use rust_decimal_macros::dec;
use tokio::sync::{mpsc, Notify};

use boostline_api::checkout::{CheckoutManager, CheckoutStage, PaymentMethod};
use boostline_api::errors::ServiceError;
use boostline_api::events::EventSender;
use boostline_api::models::{
    AccordionContent, Category, Game, PaymentConfig, Region, Service,
};
use boostline_api::pricing::{
    MultiBoxConfig, MultiBoxOption, RangeConfig, RangeHandle,
};
use boostline_api::services::checkout::{CheckoutService, PaymentResolution};
use boostline_api::services::payments::{PaymentGateway, PaymentOutcome, PaymentRequest};
use boostline_api::services::ContentSource;

fn boost_service() -> Service {
    Service {
        id: "rank-boost".into(),
        title: "Rank Boost".into(),
        category_id: "leveling".into(),
        base_price: 0,
        image: "/images/rank.webp".into(),
        description: vec!["Any bracket".into()],
        service_points: None,
        games: vec!["game-1".into()],
        range: Some(RangeConfig {
            lower: 0,
            upper: 1000,
            step: 50,
            label: Some("Rating".into()),
            mode: None,
            breakpoints: Vec::new(),
            default_range: None,
        }),
        multi_box: Some(MultiBoxConfig {
            options: vec![MultiBoxOption {
                value: 25,
                label: Some("Bonus run".into()),
            }],
        }),
        custom_amount: None,
        selector_sets: Vec::new(),
        checkbox_group: None,
        box_titles: Vec::new(),
        section_labels: Vec::new(),
        components: Vec::new(),
    }
}

fn coaching_service() -> Service {
    Service {
        id: "coaching".into(),
        title: "Coaching hour".into(),
        category_id: "coaching".into(),
        base_price: 35,
        image: "/images/coach.webp".into(),
        description: Vec::new(),
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

struct StubCatalog {
    services: Vec<Service>,
}

#[async_trait]
impl ContentSource for StubCatalog {
    async fn list_games(&self) -> Result<Vec<Game>, ServiceError> {
        Ok(Vec::new())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, ServiceError> {
        Ok(Vec::new())
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
            disclaimer: "Open a ticket after paying.".into(),
        })
    }

    async fn accordion_content(&self) -> Result<AccordionContent, ServiceError> {
        Ok(AccordionContent {
            title: "FAQ".into(),
            items: Vec::new(),
        })
    }
}

/// Gateway that replays a scripted outcome per request and records every
/// request it receives.
struct ScriptedGateway {
    outcomes: Mutex<VecDeque<PaymentOutcome>>,
    requests: Mutex<Vec<PaymentRequest>>,
}

impl ScriptedGateway {
    fn new(outcomes: impl IntoIterator<Item = PaymentOutcome>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<PaymentRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn execute(&self, request: PaymentRequest) -> PaymentOutcome {
        self.requests.lock().unwrap().push(request);
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(PaymentOutcome::Error {
                cause: "script exhausted".into(),
            })
    }
}

/// Gateway that parks until released, for exercising close-while-awaiting.
struct BlockingGateway {
    release: Arc<Notify>,
}

#[async_trait]
impl PaymentGateway for BlockingGateway {
    async fn execute(&self, _request: PaymentRequest) -> PaymentOutcome {
        self.release.notified().await;
        PaymentOutcome::Success {
            order_id: "LATE-ORDER".into(),
            captured_amount: dec!(35),
            currency: "USD".into(),
        }
    }
}

struct Harness {
    service: CheckoutService,
    manager: Arc<CheckoutManager>,
    _events: mpsc::Receiver<boostline_api::events::Event>,
}

fn harness(gateway: Arc<dyn PaymentGateway>) -> Harness {
    let (tx, rx) = mpsc::channel(64);
    let manager = Arc::new(CheckoutManager::new());
    let catalog = Arc::new(StubCatalog {
        services: vec![boost_service(), coaching_service()],
    });
    let service = CheckoutService::new(catalog, manager.clone(), gateway, EventSender::new(tx));
    Harness {
        service,
        manager,
        _events: rx,
    }
}

#[tokio::test]
async fn full_flow_settles_a_paypal_payment() {
    let gateway = ScriptedGateway::new([PaymentOutcome::Success {
        order_id: "5O190127TN364715T".into(),
        captured_amount: dec!(475),
        currency: "USD".into(),
    }]);
    let h = harness(gateway.clone());

    let opened = h.service.open("rank-boost", None).await.unwrap();
    assert_eq!(opened.stage, CheckoutStage::Selecting);
    assert_eq!(opened.region, Region::Us);

    h.service
        .range_text(opened.id, RangeHandle::Lower, "200")
        .unwrap();
    h.service
        .range_text(opened.id, RangeHandle::Upper, "650")
        .unwrap();
    h.service.toggle_box(opened.id, 0).unwrap();
    h.service.select_region(opened.id, Region::Eu).unwrap();
    h.service.toggle_terms(opened.id).unwrap();
    let snapshot = h
        .service
        .choose_payment_method(opened.id, PaymentMethod::Paypal)
        .unwrap();
    assert_eq!(snapshot.stage, CheckoutStage::PaymentMethodChosen);
    assert_eq!(snapshot.total, 475); // 9 steps of 50 + 25 box

    let resolution = h.service.submit_payment(opened.id).await.unwrap();
    assert_matches!(
        resolution,
        PaymentResolution::Settled { ref order_id, .. } if order_id == "5O190127TN364715T"
    );
    assert_eq!(
        h.service.snapshot(opened.id).unwrap().stage,
        CheckoutStage::Settled
    );

    let requests = gateway.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].amount, dec!(475));
    assert_eq!(requests[0].currency, "USD");
    assert!(requests[0].description.contains("Rank Boost (Region: EU)"));
    assert!(requests[0].description.contains("Rating: 200 -> 650"));
    assert!(requests[0].description.contains("Total: $475"));
}

#[tokio::test]
async fn submit_without_terms_issues_no_gateway_attempt() {
    let gateway = ScriptedGateway::new([]);
    let h = harness(gateway.clone());

    let opened = h.service.open("coaching", None).await.unwrap();
    h.service
        .choose_payment_method(opened.id, PaymentMethod::Paypal)
        .unwrap();

    let resolution = h.service.submit_payment(opened.id).await.unwrap();
    assert_matches!(resolution, PaymentResolution::ValidationFailed { .. });
    assert!(gateway.requests().is_empty());

    // Method stays chosen and the session is still in payment-method-chosen.
    let snapshot = h.service.snapshot(opened.id).unwrap();
    assert_eq!(snapshot.payment_method, Some(PaymentMethod::Paypal));
    assert_eq!(snapshot.stage, CheckoutStage::PaymentMethodChosen);
}

#[tokio::test]
async fn card_path_is_declared_but_unavailable() {
    let gateway = ScriptedGateway::new([]);
    let h = harness(gateway.clone());

    let opened = h.service.open("coaching", None).await.unwrap();
    h.service.toggle_terms(opened.id).unwrap();
    h.service
        .choose_payment_method(opened.id, PaymentMethod::Card)
        .unwrap();

    let resolution = h.service.submit_payment(opened.id).await.unwrap();
    assert_matches!(resolution, PaymentResolution::CardUnavailable);
    assert!(gateway.requests().is_empty());
}

#[tokio::test]
async fn gateway_error_is_retryable() {
    let gateway = ScriptedGateway::new([
        PaymentOutcome::Error {
            cause: "instrument declined".into(),
        },
        PaymentOutcome::Success {
            order_id: "RETRY-OK".into(),
            captured_amount: dec!(35),
            currency: "USD".into(),
        },
    ]);
    let h = harness(gateway.clone());

    let opened = h.service.open("coaching", None).await.unwrap();
    h.service.toggle_terms(opened.id).unwrap();
    h.service
        .choose_payment_method(opened.id, PaymentMethod::Paypal)
        .unwrap();

    let first = h.service.submit_payment(opened.id).await.unwrap();
    assert_matches!(first, PaymentResolution::Failed { .. });
    assert_eq!(
        h.service.snapshot(opened.id).unwrap().stage,
        CheckoutStage::Failed
    );

    let second = h.service.submit_payment(opened.id).await.unwrap();
    assert_matches!(second, PaymentResolution::Settled { .. });
    assert_eq!(gateway.requests().len(), 2);
}

#[tokio::test]
async fn user_cancel_is_silent_and_resubmittable() {
    let gateway = ScriptedGateway::new([PaymentOutcome::Cancelled]);
    let h = harness(gateway.clone());

    let opened = h.service.open("coaching", None).await.unwrap();
    h.service.toggle_terms(opened.id).unwrap();
    h.service
        .choose_payment_method(opened.id, PaymentMethod::Paypal)
        .unwrap();

    let resolution = h.service.submit_payment(opened.id).await.unwrap();
    assert_matches!(resolution, PaymentResolution::Cancelled);
    assert_eq!(
        h.service.snapshot(opened.id).unwrap().stage,
        CheckoutStage::PaymentMethodChosen
    );
}

#[tokio::test]
async fn closing_while_awaiting_gateway_discards_the_resolution() {
    let release = Arc::new(Notify::new());
    let gateway = Arc::new(BlockingGateway {
        release: release.clone(),
    });
    let h = harness(gateway);

    let opened = h.service.open("coaching", None).await.unwrap();
    h.service.toggle_terms(opened.id).unwrap();
    h.service
        .choose_payment_method(opened.id, PaymentMethod::Paypal)
        .unwrap();

    let service = h.service.clone();
    let session_id = opened.id;
    let submit = tokio::spawn(async move { service.submit_payment(session_id).await });

    // Session stays responsive while awaiting: close it, then let the
    // gateway resolve.
    tokio::task::yield_now().await;
    h.service.close(opened.id).await.unwrap();
    release.notify_one();

    let resolution = submit.await.unwrap().unwrap();
    assert_matches!(resolution, PaymentResolution::SessionClosed);
    assert!(h.service.snapshot(opened.id).is_err());
    assert!(h.manager.is_empty());
}

#[tokio::test]
async fn opening_a_different_service_discards_prior_state() {
    let gateway = ScriptedGateway::new([]);
    let h = harness(gateway);

    let first = h.service.open("rank-boost", None).await.unwrap();
    h.service.toggle_terms(first.id).unwrap();
    h.service.toggle_box(first.id, 0).unwrap();
    h.service.select_region(first.id, Region::Eu).unwrap();

    let second = h
        .service
        .open("coaching", Some(first.id))
        .await
        .unwrap();
    assert!(h.service.snapshot(first.id).is_err());

    // Every selection and flag on the new session is a fresh default.
    assert_eq!(second.region, Region::Us);
    assert!(!second.terms_accepted);
    assert_eq!(second.payment_method, None);
    assert_eq!(second.total, 35);
    assert_eq!(h.manager.len(), 1);
}

#[tokio::test]
async fn unknown_service_does_not_open_a_session() {
    let gateway = ScriptedGateway::new([]);
    let h = harness(gateway);

    let result = h.service.open("does-not-exist", None).await;
    assert_matches!(result, Err(ServiceError::NotFound(_)));
    assert!(h.manager.is_empty());
}

#[tokio::test]
async fn selection_updates_recompute_the_total_in_the_same_turn() {
    let gateway = ScriptedGateway::new([]);
    let h = harness(gateway);

    let opened = h.service.open("rank-boost", None).await.unwrap();
    assert_eq!(opened.total, 1000); // full span, 20 steps of 50

    let snapshot = h.service.toggle_box(opened.id, 0).unwrap();
    assert_eq!(snapshot.total, 1025);

    // Malformed typed input reverts silently; the total is unchanged.
    let snapshot = h
        .service
        .range_text(opened.id, RangeHandle::Lower, "2x0")
        .unwrap();
    assert_eq!(snapshot.total, 1025);
}
