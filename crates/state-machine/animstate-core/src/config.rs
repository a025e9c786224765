//! Core configuration.

use serde::{Deserialize, Serialize};

/// What the evaluator may do while a blend transition is in progress.
///
/// The conservative default skips all transition evaluation until the blend
/// completes, which rules out transition storms. `AnyState` keeps the
/// any-state list live during a blend for hosts that want interrupt
/// semantics closer to the usual authoring tools.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum InterruptPolicy {
    #[default]
    Never,
    AnyState,
}

/// Configuration for instance stepping.
/// Keep this minimal; expand as needed without breaking API.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub interrupt: InterruptPolicy,
}
