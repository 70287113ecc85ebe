//! # Procedural Bridge
//!
//! The signal side of the procedural interface: value queries in a
//! caller-chosen representation, and value-change callbacks.
//!
//! | Item | Role |
//! |------|------|
//! | `SignalQuery` | implemented by every signal functor |
//! | `ValueFormat` / `SignalValue` | requested and returned representation |
//! | `CallbackList` | per-signal callback registry, run after each output change |
//! | `ChangeRecorder` | ready-made callback that logs every change |
//!
//! A signal owns its `CallbackList` next to its node state; the list knows
//! nothing about assignment modes and the state machine knows nothing about
//! callbacks.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::signal::SignalState;
use crate::value::{Bit4, Vector4, Vector8, vector4_to_f64, vector4_to_u64};
use crate::{Error, Result};

// ============================================================================
// Values
// ============================================================================

/// Representation requested by a value query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueFormat {
    Vector4,
    Vector8,
    Real,
    Int,
    /// MSB-first `01xz` text.
    BinStr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SignalValue {
    Vector4(Vector4),
    Vector8(Vector8),
    Real(f64),
    Int(i64),
    BinStr(String),
}

impl SignalValue {
    /// Render a logic vector in `format`. Integer and real conversions of
    /// vectors holding x/z fail with the conversion error. `Int` reads the
    /// vector as unsigned and is `Unsupported` when a set bit lies at 63 or
    /// above, since the value would not survive as an `i64`.
    pub fn from_vec4(value: &Vector4, format: ValueFormat) -> Result<Self> {
        match format {
            ValueFormat::Vector4 => Ok(Self::Vector4(value.clone())),
            ValueFormat::Vector8 => Ok(Self::Vector8(Vector8::from(value))),
            ValueFormat::Real => Ok(Self::Real(vector4_to_f64(value, false)?)),
            ValueFormat::Int => {
                let raw = vector4_to_u64(value)?;
                if (63..value.size()).any(|idx| value.value(idx) == Bit4::One) {
                    return Err(Error::Unsupported(format!(
                        "{}-bit value does not fit an i64",
                        value.size()
                    )));
                }
                Ok(Self::Int(raw as i64))
            }
            ValueFormat::BinStr => Ok(Self::BinStr(value.as_string())),
        }
    }
}

impl fmt::Display for SignalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalValue::Vector4(v) => write!(f, "{v}"),
            SignalValue::Vector8(v) => write!(f, "{v}"),
            SignalValue::Real(v) => write!(f, "{v}"),
            SignalValue::Int(v) => write!(f, "{v}"),
            SignalValue::BinStr(v) => write!(f, "{v}"),
        }
    }
}

// ============================================================================
// Callbacks
// ============================================================================

/// Notified after a signal changes its output.
pub trait ValueCallback {
    fn value_changed(&mut self, value: &SignalValue);
}

impl<F: FnMut(&SignalValue)> ValueCallback for F {
    fn value_changed(&mut self, value: &SignalValue) {
        self(value)
    }
}

/// Handle returned by `CallbackList::add`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackId(u32);

/// Membership of a signal in a memory array, as word `address`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArrayWord {
    pub array: u32,
    pub address: u64,
}

/// Callbacks registered on one signal.
#[derive(Default)]
pub struct CallbackList {
    entries: Vec<(CallbackId, Box<dyn ValueCallback>)>,
    next_id: u32,
    array_word: Option<ArrayWord>,
}

impl CallbackList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, callback: Box<dyn ValueCallback>) -> CallbackId {
        let id = CallbackId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, callback));
        id
    }

    pub fn remove(&mut self, id: CallbackId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Call every callback, in registration order, with the value built by
    /// `value`. `value` is not evaluated when the list is empty.
    pub fn run(&mut self, value: impl FnOnce() -> SignalValue) {
        if self.entries.is_empty() {
            return;
        }
        let value = value();
        for (_, callback) in &mut self.entries {
            callback.value_changed(&value);
        }
    }

    pub fn attach_as_word(&mut self, array: u32, address: u64) {
        self.array_word = Some(ArrayWord { array, address });
    }

    pub fn array_word(&self) -> Option<ArrayWord> {
        self.array_word
    }
}

impl fmt::Debug for CallbackList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackList")
            .field("callbacks", &self.entries.len())
            .field("array_word", &self.array_word)
            .finish()
    }
}

// ============================================================================
// ChangeRecorder
// ============================================================================

/// A callback that appends every reported value to a shared log.
///
/// Clones share the log, so one clone can be registered on a signal while
/// another is kept to read what happened.
#[derive(Debug, Clone, Default)]
pub struct ChangeRecorder {
    log: Arc<Mutex<Vec<SignalValue>>>,
}

impl ChangeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> Vec<SignalValue> {
        self.log.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.log.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.lock().is_empty()
    }

    /// Drain the log.
    pub fn take(&self) -> Vec<SignalValue> {
        std::mem::take(&mut *self.log.lock())
    }
}

impl ValueCallback for ChangeRecorder {
    fn value_changed(&mut self, value: &SignalValue) {
        self.log.lock().push(value.clone());
    }
}

// ============================================================================
// SignalQuery
// ============================================================================

/// What the procedural side may ask of a signal node.
pub trait SignalQuery {
    /// The value the signal currently presents, in `format`.
    fn get_value(&self, format: ValueFormat) -> Result<SignalValue>;

    fn callbacks(&self) -> &CallbackList;

    fn callbacks_mut(&mut self) -> &mut CallbackList;

    /// Assignment-mode state, including the force and continuous-assign
    /// back-links.
    fn state(&self) -> &SignalState;

    fn state_mut(&mut self) -> &mut SignalState;
}

pub(crate) fn unsupported_format(kind: &str, format: ValueFormat) -> Error {
    Error::Unsupported(format!("{kind} cannot be read as {format:?}"))
}
