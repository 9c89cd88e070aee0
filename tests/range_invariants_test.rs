//! Property tests for the range control: the non-crossing invariant under
//! arbitrary drag/edit sequences, and step-snap idempotence.

use proptest::prelude::*;

use boostline_api::pricing::{
    snap_to_step, RangeConfig, RangeHandle, RangeSelection,
};

#[derive(Debug, Clone)]
enum RangeOp {
    Pointer { fraction: f64, upper: bool },
    Typed { value: i64, upper: bool },
    Garbage { text: String, upper: bool },
}

fn op_strategy() -> impl Strategy<Value = RangeOp> {
    prop_oneof![
        (0.0f64..=1.0, any::<bool>())
            .prop_map(|(fraction, upper)| RangeOp::Pointer { fraction, upper }),
        (0i64..2500, any::<bool>()).prop_map(|(value, upper)| RangeOp::Typed { value, upper }),
        ("[a-z ]{0,6}", any::<bool>()).prop_map(|(text, upper)| RangeOp::Garbage { text, upper }),
    ]
}

fn config() -> RangeConfig {
    RangeConfig {
        lower: 0,
        upper: 1000,
        step: 50,
        label: None,
        mode: None,
        breakpoints: Vec::new(),
        default_range: None,
    }
}

fn handle(upper: bool) -> RangeHandle {
    if upper {
        RangeHandle::Upper
    } else {
        RangeHandle::Lower
    }
}

proptest! {
    /// For every sequence of drags and edits: the handles never cross, stay
    /// at least one step apart, and remain inside the track bounds.
    #[test]
    fn non_crossing_invariant_always_holds(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut selection = RangeSelection::new(&config());
        for op in ops {
            match op {
                RangeOp::Pointer { fraction, upper } => {
                    selection.set_from_pointer(fraction, handle(upper));
                }
                RangeOp::Typed { value, upper } => {
                    selection.set_from_text(handle(upper), &value.to_string());
                }
                RangeOp::Garbage { text, upper } => {
                    selection.set_from_text(handle(upper), &text);
                }
            }
            prop_assert!(selection.lower() + 50 <= selection.upper());
            prop_assert!(selection.lower() >= 0);
            prop_assert!(selection.upper() <= 1000);
        }
    }

    /// Snapping twice equals snapping once, for any raw input and step.
    #[test]
    fn snap_to_step_is_idempotent(raw in -100_000.0f64..100_000.0, step in 1i64..1000) {
        let once = snap_to_step(raw, step);
        prop_assert_eq!(once, snap_to_step(once as f64, step));
    }

    /// Garbage input never changes committed state.
    #[test]
    fn malformed_text_never_reaches_state(text in "[^0-9]{1,8}", upper in any::<bool>()) {
        let mut selection = RangeSelection::new(&config());
        selection.set_from_pointer(0.4, RangeHandle::Lower);
        let before = selection.clone();
        selection.set_from_text(handle(upper), &text);
        prop_assert_eq!(selection, before);
    }
}
