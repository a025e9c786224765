//! Typed parameter values and the per-instance parameter table.
//!
//! Conditions read parameters through an immutable snapshot once per tick;
//! hosts mutate values between ticks only. Float parameters exist for
//! LinearBlend states; float-valued conditions are a documented but
//! unimplemented extension and are rejected at compile time.

use serde::{Deserialize, Serialize};

use crate::blob::StateMachineBlob;
use crate::ids::ParamIx;

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Bool,
    Int,
    Float,
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ParamValue {
    Bool(bool),
    Int(i32),
    Float(f32),
}

impl ParamValue {
    #[inline]
    pub fn kind(&self) -> ParamType {
        match self {
            ParamValue::Bool(_) => ParamType::Bool,
            ParamValue::Int(_) => ParamType::Int,
            ParamValue::Float(_) => ParamType::Float,
        }
    }
}

impl ParamType {
    /// Zero value of this type, used when authoring supplies no default.
    #[inline]
    pub fn zero(self) -> ParamValue {
        match self {
            ParamType::Bool => ParamValue::Bool(false),
            ParamType::Int => ParamValue::Int(0),
            ParamType::Float => ParamValue::Float(0.0),
        }
    }
}

/// Dense per-instance parameter snapshot, indexed by [`ParamIx`].
///
/// Built from a blob's parameter table; indices are valid for exactly that
/// blob. Writes take effect on the next tick (the evaluator reads the
/// snapshot immutably).
#[derive(Clone, Debug, Default)]
pub struct ParamSet {
    values: Vec<ParamValue>,
}

impl ParamSet {
    pub fn from_blob(blob: &StateMachineBlob) -> Self {
        Self {
            values: blob.params.iter().map(|p| p.default).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Read a parameter. The compiler guarantees every condition's `ParamIx`
    /// is in range for the blob this set was built from.
    #[inline]
    pub fn get(&self, ix: ParamIx) -> ParamValue {
        self.values[ix.index()]
    }

    /// Write a parameter. Changing a parameter's type is host misuse and
    /// panics, matching the loud-failure contract for boundary violations.
    pub fn set(&mut self, ix: ParamIx, value: ParamValue) {
        let slot = &mut self.values[ix.index()];
        assert_eq!(
            slot.kind(),
            value.kind(),
            "parameter {ix:?} is {:?}, host wrote {:?}",
            slot.kind(),
            value.kind()
        );
        *slot = value;
    }
}
