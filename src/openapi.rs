//! OpenAPI document exposed at `/api-docs/openapi.json`.

use utoipa::OpenApi;

use crate::checkout::{CheckoutStage, PaymentMethod, PaymentSubmission};
use crate::errors::ErrorResponse;
use crate::handlers::checkout::{
    CheckoutContentResponse, CustomAmountRequest, OpenCheckoutRequest, PaymentMethodRequest,
    RangeUpdateRequest, RegionRequest, SelectorChoiceRequest,
};
use crate::models::{
    AccordionContent, AccordionItem, Category, Game, PaymentConfig, Region, SectionLabel, Service,
};
use crate::pricing::{
    BoxTitleConfig, CheckboxGroupConfig, CheckboxGroupEntry, CheckboxOption, ComponentConfig,
    ComponentDescriptor, ComponentKind, CustomAmountConfig, DefaultRange, MultiBoxConfig,
    MultiBoxOption, RangeBreakpoint, RangeConfig, RangeHandle, RangeMode, SectionLabelConfig,
    SelectOption, Selector, SelectorSetConfig,
};
use crate::services::checkout::{PaymentResolution, SessionSnapshot};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Boostline API",
        description = "Gaming-services storefront: catalog, composable boost pricing, and PayPal checkout"
    ),
    components(schemas(
        ErrorResponse,
        Game,
        Category,
        Service,
        SectionLabel,
        Region,
        AccordionContent,
        AccordionItem,
        PaymentConfig,
        ComponentKind,
        ComponentConfig,
        ComponentDescriptor,
        RangeConfig,
        RangeBreakpoint,
        RangeMode,
        RangeHandle,
        DefaultRange,
        MultiBoxConfig,
        MultiBoxOption,
        CustomAmountConfig,
        SelectorSetConfig,
        Selector,
        SelectOption,
        CheckboxGroupConfig,
        CheckboxGroupEntry,
        CheckboxOption,
        BoxTitleConfig,
        SectionLabelConfig,
        CheckoutStage,
        PaymentMethod,
        PaymentSubmission,
        SessionSnapshot,
        PaymentResolution,
        OpenCheckoutRequest,
        CheckoutContentResponse,
        RegionRequest,
        PaymentMethodRequest,
        RangeUpdateRequest,
        CustomAmountRequest,
        SelectorChoiceRequest,
    ))
)]
pub struct ApiDoc;
