//! `name=value` assignments from the command line.

use anyhow::{bail, Context, Result};
use wparam::{Diagnostic, ParamType, ParameterGroup, Value};

/// A parsed `path=value` argument. The value stays raw until the target's
/// type is known.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub path: String,
    pub raw: String,
}

impl std::str::FromStr for Assignment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let Some((path, raw)) = s.split_once('=') else {
            bail!("expected name=value, got '{s}'");
        };
        let path = path.trim();
        if path.is_empty() {
            bail!("missing name in '{s}'");
        }
        Ok(Self {
            path: path.to_string(),
            raw: raw.to_string(),
        })
    }
}

/// Read `raw` as a value of `kind`.
pub fn parse_value(kind: ParamType, raw: &str) -> Result<Value> {
    Ok(match kind {
        ParamType::Num => {
            let n: f64 = raw
                .trim()
                .parse()
                .with_context(|| format!("'{raw}' is not a number"))?;
            if !n.is_finite() {
                bail!("'{raw}' is not a finite number");
            }
            Value::Num(n)
        }
        ParamType::Bool => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Value::Bool(true),
            "false" | "no" | "off" | "0" => Value::Bool(false),
            _ => bail!("'{raw}' is not a boolean"),
        },
        ParamType::Str => Value::Str(raw.to_string()),
    })
}

/// Guess a type for names that are not parameters. The group `name` is
/// always text.
fn infer_value(leaf: &str, raw: &str) -> Value {
    if leaf == "name" {
        return Value::Str(raw.to_string());
    }
    if let Ok(n) = raw.trim().parse::<f64>() {
        return Value::Num(n);
    }
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::Str(raw.to_string()),
    }
}

/// Apply one assignment, descending into nested groups for dotted paths.
///
/// Unknown intermediate groups and unparsable values are errors; rejected
/// writes come back as diagnostics.
pub fn apply(group: &mut ParameterGroup, assignment: &Assignment) -> Result<Option<Diagnostic>> {
    let (target, leaf) = match assignment.path.rsplit_once('.') {
        Some((parents, leaf)) => (group.lookup_group_mut(parents)?, leaf),
        None => (group, assignment.path.as_str()),
    };

    let value = if name_is_reserved(leaf) {
        infer_value(leaf, &assignment.raw)
    } else {
        match target.param(leaf) {
            Ok(p) => parse_value(p.kind(), &assignment.raw)
                .with_context(|| format!("setting {}", assignment.path))?,
            Err(_) => infer_value(leaf, &assignment.raw),
        }
    };
    Ok(target.set(leaf, value))
}

fn name_is_reserved(name: &str) -> bool {
    name.starts_with('_')
}
