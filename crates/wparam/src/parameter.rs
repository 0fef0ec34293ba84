//! A single named, typed setting.

use crate::diagnostic::Diagnostic;
use crate::error::{ParamError, Result};
use crate::value::{ParamType, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One typed, boundable, named setting with UI metadata.
///
/// The name is fixed at construction. The value always matches the declared
/// [`ParamType`]; writes of another kind are refused with a [`Diagnostic`].
///
/// Equality compares values only, so a parameter can be checked against a
/// literal (`param == 80.0`) or against another parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawParameter")]
pub struct Parameter {
    name: String,
    #[serde(rename = "type")]
    kind: ParamType,
    value: Value,
    default: Value,
    description: Option<String>,
    label: Option<String>,
    placeholder: Option<String>,
    enabled: bool,
    visible: bool,
    max: Option<f64>,
    min: Option<f64>,
    step: Option<f64>,
}

/// Wire form accepted on decode. Every UI hint is optional.
#[derive(Deserialize)]
struct RawParameter {
    name: String,
    #[serde(rename = "type")]
    kind: ParamType,
    #[serde(alias = "v")]
    value: Value,
    #[serde(default)]
    default: Option<Value>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    placeholder: Option<String>,
    #[serde(default = "yes")]
    enabled: bool,
    #[serde(default = "yes")]
    visible: bool,
    #[serde(default)]
    max: Option<f64>,
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    step: Option<f64>,
}

fn yes() -> bool {
    true
}

impl TryFrom<RawParameter> for Parameter {
    type Error = ParamError;

    fn try_from(raw: RawParameter) -> Result<Self> {
        let mut param = Parameter::new(raw.name, raw.kind, raw.value)?;
        if let Some(default) = raw.default {
            check_value(&param.name, param.kind, &default)?;
            param.default = default;
        }
        param.description = raw.description;
        param.label = raw.label;
        param.placeholder = raw.placeholder;
        param.enabled = raw.enabled;
        param.visible = raw.visible;
        param.max = raw.max;
        param.min = raw.min;
        param.step = raw.step;
        Ok(param)
    }
}

fn check_value(name: &str, expected: ParamType, value: &Value) -> Result<()> {
    let found = value.kind();
    if found != expected {
        return Err(ParamError::TypeMismatch {
            name: name.to_string(),
            expected,
            found,
        });
    }
    match value {
        Value::Num(n) if !n.is_finite() => Err(ParamError::NonFinite(name.to_string())),
        _ => Ok(()),
    }
}

/// Drop a NaN or infinite bound, which would not survive a JSON round trip.
fn finite_bound(name: &str, what: &str, bound: f64) -> Option<f64> {
    if bound.is_finite() {
        Some(bound)
    } else {
        log::warn!("ignoring {what} {bound} for '{name}'");
        None
    }
}

impl Parameter {
    /// Create a parameter; `default` starts equal to `value`.
    ///
    /// Fails with [`ParamError::TypeMismatch`] when `value` is not of `kind`
    /// and with [`ParamError::NonFinite`] for NaN or infinite numbers.
    pub fn new(name: impl Into<String>, kind: ParamType, value: impl Into<Value>) -> Result<Self> {
        let name = name.into();
        let value = value.into();
        check_value(&name, kind, &value)?;
        Ok(Self::unchecked(name, kind, value))
    }

    fn unchecked(name: String, kind: ParamType, value: Value) -> Self {
        Self {
            name,
            kind,
            default: value.clone(),
            value,
            description: None,
            label: None,
            placeholder: None,
            enabled: true,
            visible: true,
            max: None,
            min: None,
            step: None,
        }
    }

    /// Numeric parameter. NaN and infinities are stored as `0` with a warning.
    pub fn num(name: impl Into<String>, value: f64) -> Self {
        let name = name.into();
        let value = if value.is_finite() {
            value
        } else {
            log::warn!("'{name}' only accepts finite numbers, using 0 instead of {value}");
            0.0
        };
        Self::unchecked(name, ParamType::Num, Value::Num(value))
    }

    /// Boolean parameter.
    pub fn boolean(name: impl Into<String>, value: bool) -> Self {
        Self::unchecked(name.into(), ParamType::Bool, Value::Bool(value))
    }

    /// Text parameter.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::unchecked(name.into(), ParamType::Str, Value::Str(value.into()))
    }

    /// Set a default distinct from the initial value.
    ///
    /// A default of the wrong kind, or a non-finite one, is ignored with a
    /// warning.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        let default = default.into();
        match check_value(&self.name, self.kind, &default) {
            Ok(()) => self.default = default,
            Err(e) => log::warn!("ignoring default: {e}"),
        }
        self
    }

    /// Set the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the tooltip description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the input placeholder text.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Set both bounds.
    pub fn with_range(self, min: f64, max: f64) -> Self {
        self.with_min(min).with_max(max)
    }

    /// Set the lower bound. Non-finite bounds are ignored.
    pub fn with_min(mut self, min: f64) -> Self {
        self.min = finite_bound(&self.name, "min", min).or(self.min);
        self
    }

    /// Set the upper bound. Non-finite bounds are ignored.
    pub fn with_max(mut self, max: f64) -> Self {
        self.max = finite_bound(&self.name, "max", max).or(self.max);
        self
    }

    /// Set the UI increment.
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = finite_bound(&self.name, "step", step).or(self.step);
        self
    }

    /// Whether the UI control accepts input.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Whether the UI shows a control at all.
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ParamType {
        self.kind
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }

    pub fn step(&self) -> Option<f64> {
        self.step
    }

    /// Label if set, otherwise the name.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// Names are write-once: this always refuses, keeps the old name and
    /// returns the diagnostic.
    pub fn rename(&mut self, name: impl Into<String>) -> Option<Diagnostic> {
        Some(
            Diagnostic::RenameRejected {
                name: self.name.clone(),
                attempted: name.into(),
            }
            .emit(),
        )
    }

    /// Replace the value if it matches the declared type and, for numbers,
    /// is finite.
    pub fn set_value(&mut self, value: impl Into<Value>) -> Option<Diagnostic> {
        self.replace_value(value.into()).map(Diagnostic::emit)
    }

    /// Like [`set_value`](Self::set_value) but leaves logging to the caller.
    pub(crate) fn replace_value(&mut self, value: Value) -> Option<Diagnostic> {
        let found = value.kind();
        if found != self.kind {
            return Some(Diagnostic::TypeMismatch {
                name: self.name.clone(),
                expected: self.kind,
                found,
            });
        }
        if matches!(value, Value::Num(n) if !n.is_finite()) {
            return Some(Diagnostic::NonFinite {
                name: self.name.clone(),
            });
        }
        self.value = value;
        None
    }

    /// Restore the default value.
    pub fn reset(&mut self) {
        self.value = self.default.clone();
    }

    /// The number, if this is a numeric parameter.
    pub fn as_f64(&self) -> Option<f64> {
        self.value.as_f64()
    }

    /// The flag, if this is a boolean parameter.
    pub fn as_bool(&self) -> Option<bool> {
        self.value.as_bool()
    }

    /// The text, if this is a text parameter.
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_str()
    }

    /// See [`Value::to_f64`].
    pub fn to_f64(&self) -> Option<f64> {
        self.value.to_f64()
    }

    /// See [`Value::to_i64`].
    pub fn to_i64(&self) -> Option<i64> {
        self.value.to_i64()
    }

    /// See [`Value::truthy`].
    pub fn truthy(&self) -> bool {
        self.value.truthy()
    }

    /// Bounds and increment a numeric input should use.
    ///
    /// Missing bounds fall back to a fifth and five times the current value,
    /// a missing step to `1`. `None` for non-numeric parameters.
    pub fn effective_range(&self) -> Option<(f64, f64, f64)> {
        let v = self.as_f64()?;
        let min = self.min.unwrap_or(v / 5.0);
        let max = self.max.unwrap_or(v * 5.0);
        Some((min, max, self.step.unwrap_or(1.0)))
    }

    /// Report a numeric value outside its declared bounds. Does not log.
    pub fn check_range(&self) -> Option<Diagnostic> {
        let value = self.as_f64()?;
        let below = self.min.is_some_and(|m| value < m);
        let above = self.max.is_some_and(|m| value > m);
        if below || above {
            Some(Diagnostic::OutOfRange {
                name: self.name.clone(),
                value,
                min: self.min,
                max: self.max,
            })
        } else {
            None
        }
    }

    /// One-line summary: `name [type]: value`.
    pub fn summary(&self) -> String {
        format!("{} [{}]: {}", self.name, self.kind, self.value)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

impl PartialEq for Parameter {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl PartialEq<Value> for Parameter {
    fn eq(&self, other: &Value) -> bool {
        self.value == *other
    }
}

impl PartialEq<f64> for Parameter {
    fn eq(&self, other: &f64) -> bool {
        self.as_f64() == Some(*other)
    }
}

impl PartialEq<bool> for Parameter {
    fn eq(&self, other: &bool) -> bool {
        self.as_bool() == Some(*other)
    }
}

impl PartialEq<&str> for Parameter {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

impl TryFrom<&Parameter> for f64 {
    type Error = ParamError;

    fn try_from(param: &Parameter) -> Result<f64> {
        param.as_f64().ok_or_else(|| ParamError::TypeMismatch {
            name: param.name.clone(),
            expected: ParamType::Num,
            found: param.kind,
        })
    }
}
