//! WASM bindings for wparam.
//!
//! Lets the host page decode a saved parameter blob, read and edit values,
//! build input controls, and dump the result back to JSON.

use serde::Serialize;
use wasm_bindgen::prelude::*;
use wparam::{Diagnostic, Node, ParamType, ParameterGroup, Value};

mod console;

/// Initialize panic hook and console logging.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    console::init(log::LevelFilter::Info);
}

/// Change how much the library logs (`"off"`, `"warn"`, `"debug"`, ...).
#[wasm_bindgen(js_name = setLogLevel)]
pub fn set_log_level(level: &str) -> Result<(), JsError> {
    let level: log::LevelFilter = level
        .parse()
        .map_err(|_| JsError::new(&format!("unknown log level: {level}")))?;
    console::init(level);
    Ok(())
}

/// Decode a group from JSON text.
#[wasm_bindgen(js_name = loadParam)]
pub fn load_param(json: &str) -> Result<ParameterGroupHandle, JsError> {
    let inner = ParameterGroup::from_json(json).map_err(to_js_error)?;
    Ok(ParameterGroupHandle { inner })
}

/// Decode a group from an already-parsed JS object.
#[wasm_bindgen(js_name = loadParamValue)]
pub fn load_param_value(value: JsValue) -> Result<ParameterGroupHandle, JsError> {
    let json: serde_json::Value = serde_wasm_bindgen::from_value(value)?;
    let inner = group_from_json_value(json).map_err(|e| JsError::new(&e))?;
    Ok(ParameterGroupHandle { inner })
}

/// A parameter group owned by WASM memory.
#[wasm_bindgen]
pub struct ParameterGroupHandle {
    inner: ParameterGroup,
}

#[wasm_bindgen]
impl ParameterGroupHandle {
    /// Create an empty group (named "Parameters" when no name is given).
    #[wasm_bindgen(constructor)]
    pub fn new(name: Option<String>) -> Self {
        let inner = match name {
            Some(name) => ParameterGroup::new(name),
            None => ParameterGroup::default(),
        };
        Self { inner }
    }

    /// Group name.
    #[wasm_bindgen(getter)]
    pub fn name(&self) -> String {
        self.inner.name().to_string()
    }

    /// Number of direct children.
    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.inner.len()
    }

    /// Child names in display order.
    pub fn names(&self) -> Vec<String> {
        self.inner.names().map(str::to_string).collect()
    }

    /// Add a parameter or nested group given as a JS object.
    ///
    /// Returns the diagnostic if the name is taken, otherwise `undefined`.
    #[wasm_bindgen(js_name = addParameter)]
    pub fn add_parameter(&mut self, value: JsValue) -> Result<JsValue, JsError> {
        let json: serde_json::Value = serde_wasm_bindgen::from_value(value)?;
        let node = Node::from_value(json).map_err(to_js_error)?;
        diagnostic_to_js(self.inner.add(node))
    }

    /// Read a child (dotted paths reach into nested groups).
    ///
    /// Throws if nothing has that name.
    pub fn get(&self, path: &str) -> Result<JsValue, JsError> {
        let node = self.inner.lookup(path).map_err(to_js_error)?;
        to_js(node)
    }

    /// Attribute-style write (dotted paths reach into nested groups).
    ///
    /// Returns a diagnostic object or `undefined`.
    pub fn set(&mut self, path: &str, value: JsValue) -> Result<JsValue, JsError> {
        let value: Value = serde_wasm_bindgen::from_value(value)?;
        diagnostic_to_js(self.inner.set_path(path, value))
    }

    /// Compact JSON of the whole group.
    pub fn dumps(&self) -> Result<String, JsError> {
        self.inner.dumps().map_err(to_js_error)
    }

    /// The whole group as a JS object.
    #[wasm_bindgen(js_name = toValue)]
    pub fn to_value(&self) -> Result<JsValue, JsError> {
        to_js(&self.inner)
    }

    /// Out-of-range diagnostics, as an array.
    pub fn validate(&self) -> Result<JsValue, JsError> {
        to_js(&self.inner.validate())
    }

    /// Restore every parameter to its default.
    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// Drain recorded diagnostics (nested groups included), as an array.
    #[wasm_bindgen(js_name = takeDiagnostics)]
    pub fn take_diagnostics(&mut self) -> Result<JsValue, JsError> {
        to_js(&self.inner.take_diagnostics())
    }

    /// Input control descriptions for every visible parameter.
    pub fn controls(&self) -> Result<JsValue, JsError> {
        to_js(&controls(&self.inner))
    }
}

/// What the host page needs to render one input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Control {
    /// Dotted path used with `get`/`set`.
    pub path: String,
    /// Label text (falls back to the name).
    pub label: String,
    /// `"toggle"`, `"number"` or `"text"`.
    pub input: &'static str,
    /// Current value.
    pub value: Value,
    /// Tooltip.
    pub description: Option<String>,
    /// Text input placeholder.
    pub placeholder: Option<String>,
    /// Whether the input accepts edits.
    pub enabled: bool,
    /// Numeric lower bound.
    pub min: Option<f64>,
    /// Numeric upper bound.
    pub max: Option<f64>,
    /// Numeric increment.
    pub step: Option<f64>,
}

/// Flatten a group into input controls, skipping hidden parameters.
///
/// Nested parameters get dotted paths. Numeric bounds are filled in with
/// [`wparam::Parameter::effective_range`].
pub fn controls(group: &ParameterGroup) -> Vec<Control> {
    let mut out = Vec::new();
    collect_controls(group, "", &mut out);
    out
}

fn collect_controls(group: &ParameterGroup, prefix: &str, out: &mut Vec<Control>) {
    for child in group {
        let path = if prefix.is_empty() {
            child.name().to_string()
        } else {
            format!("{prefix}.{}", child.name())
        };
        let p = match child {
            Node::Group(g) => {
                collect_controls(g, &path, out);
                continue;
            }
            Node::Param(p) if !p.is_visible() => continue,
            Node::Param(p) => p,
        };
        let range = p.effective_range();
        out.push(Control {
            label: p.display_label().to_string(),
            input: match p.kind() {
                ParamType::Num => "number",
                ParamType::Bool => "toggle",
                ParamType::Str => "text",
            },
            value: p.value().clone(),
            description: p.description().map(str::to_string),
            placeholder: p.placeholder().map(str::to_string),
            enabled: p.is_enabled(),
            min: range.map(|r| r.0),
            max: range.map(|r| r.1),
            step: range.map(|r| r.2),
            path,
        });
    }
}

fn group_from_json_value(json: serde_json::Value) -> Result<ParameterGroup, String> {
    match wparam::load_param_value(json).map_err(|e| e.to_string())? {
        Node::Group(group) => Ok(group),
        Node::Param(p) => Err(format!("expected a group, found parameter '{}'", p.name())),
    }
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsError> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value
        .serialize(&serializer)
        .map_err(|e| JsError::new(&e.to_string()))
}

fn diagnostic_to_js(diagnostic: Option<Diagnostic>) -> Result<JsValue, JsError> {
    match diagnostic {
        Some(d) => to_js(&d),
        None => Ok(JsValue::UNDEFINED),
    }
}

fn to_js_error(e: wparam::ParamError) -> JsError {
    JsError::new(&e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wparam::Parameter;

    #[test]
    fn controls_follow_display_order() {
        let mut g = ParameterGroup::with_children(
            "Parameters",
            [
                Parameter::num("length", 80.0)
                    .with_range(10.0, 200.0)
                    .with_step(0.1)
                    .with_label("Length (mm)"),
                Parameter::boolean("hollow", false),
                Parameter::text("note", "").with_placeholder("text"),
                Parameter::num("secret", 1.0).visible(false),
            ],
        );
        g.add(ParameterGroup::with_children(
            "holes",
            [Parameter::num("dia", 22.0)],
        ));

        let controls = controls(&g);
        let paths: Vec<&str> = controls.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, ["length", "hollow", "note", "holes.dia"]);

        assert_eq!(controls[0].label, "Length (mm)");
        assert_eq!(controls[0].input, "number");
        assert_eq!(controls[0].step, Some(0.1));
        assert_eq!(controls[1].input, "toggle");
        assert_eq!(controls[1].min, None);
        assert_eq!(controls[2].placeholder.as_deref(), Some("text"));
        assert_eq!(controls[3].label, "dia");
        assert_eq!(controls[3].min, Some(22.0 / 5.0));
        assert_eq!(controls[3].max, Some(110.0));
    }

    #[test]
    fn control_paths_are_writable() {
        let mut g = group_from_json_value(json!({
            "name": "Parameters",
            "children": [
                {"name": "length", "type": "num", "value": 80},
                {"name": "holes", "children": [
                    {"name": "dia", "type": "num", "value": 22},
                    {"name": "through", "type": "bool", "value": true}
                ]}
            ]
        }))
        .unwrap();

        for control in controls(&g) {
            assert_eq!(g.set_path(&control.path, control.value.clone()), None);
        }
        assert_eq!(g.set_path("holes.dia", 8.0), None);
        let dia = g.lookup("holes.dia").unwrap().as_param().unwrap();
        assert_eq!(*dia, 8.0);

        // What a blank number input parses to on the page.
        let refused = g.set_path("holes.dia", f64::NAN);
        assert!(matches!(refused, Some(Diagnostic::NonFinite { .. })));
        assert_eq!(g.take_diagnostics(), [refused.unwrap()]);
    }

    #[test]
    fn parsed_values_must_be_groups() {
        let g = group_from_json_value(json!({"name": "g", "children": []})).unwrap();
        assert_eq!(g.name(), "g");
        let err = group_from_json_value(json!({"name": "x", "type": "num", "value": 1}));
        assert!(err.unwrap_err().contains("'x'"));
    }
}
