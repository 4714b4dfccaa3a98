//! Dev-mode visibility gating
//!
//! Three signals decide whether actions labelled `testing` are shown:
//! a manual override set by an explicit toggle, the `env` query parameter of
//! the current request, and whether this is a development build. Which of
//! the first two are honored depends on the deployment's [`GateMode`].

pub mod gate;

pub use gate::{
    is_visible, resolve, visible_actions, GateInputs, GateMode, ManualOverride, QueryOverride,
    VisibilityGate,
};
