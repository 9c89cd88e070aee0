//! Price-composition core: component configuration, selection state, and
//! the calculator that folds both into a final total.

pub mod assembler;
pub mod calculator;
pub mod component;
pub mod selection;

pub use assembler::{assemble, RawComponentRow, RawServiceRecord};
pub use calculator::compute_total;
pub use component::{
    BoxTitleConfig, CheckboxGroupConfig, CheckboxGroupEntry, CheckboxOption, ComponentConfig,
    ComponentDescriptor, ComponentKind, CustomAmountConfig, DefaultRange, MultiBoxConfig,
    MultiBoxOption, RangeBreakpoint, RangeConfig, RangeMode, SectionLabelConfig, SelectOption,
    Selector, SelectorSetConfig,
};
pub use selection::{
    snap_to_step, CheckboxSelection, CustomAmountSelection, MultiBoxSelection, RangeHandle,
    RangeSelection, SelectorSetSelection, ServiceSelections,
};
