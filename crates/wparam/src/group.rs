//! Ordered, uniquely named collections of parameters.

use crate::diagnostic::Diagnostic;
use crate::error::{ParamError, Result};
use crate::node::{load_param, Node};
use crate::parameter::Parameter;
use crate::value::{ParamType, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Name given to groups that do not specify one.
pub const DEFAULT_GROUP_NAME: &str = "Parameters";

/// An ordered set of parameters and nested groups with unique names.
///
/// Insertion order is display order and survives serialization. Children are
/// only ever appended through [`add`](Self::add), which keeps the name index
/// in step with `children`.
///
/// Mutations that would break an invariant are skipped. Each one returns a
/// [`Diagnostic`], logs it, and records it in [`diagnostics`](Self::diagnostics).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RawGroup")]
pub struct ParameterGroup {
    name: String,
    children: Vec<Node>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    #[serde(skip)]
    diagnostics: Vec<Diagnostic>,
    /// Set once the group is owned by a parent, whose index keys on our name.
    #[serde(skip)]
    nested: bool,
}

#[derive(Deserialize)]
struct RawGroup {
    #[serde(default)]
    name: Option<String>,
    children: Vec<Node>,
}

impl From<RawGroup> for ParameterGroup {
    fn from(raw: RawGroup) -> Self {
        let name = raw.name.unwrap_or_else(|| DEFAULT_GROUP_NAME.to_string());
        ParameterGroup::with_children(name, raw.children)
    }
}

impl Default for ParameterGroup {
    fn default() -> Self {
        Self::new(DEFAULT_GROUP_NAME)
    }
}

impl ParameterGroup {
    /// Create an empty group.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            index: HashMap::new(),
            diagnostics: Vec::new(),
            nested: false,
        }
    }

    /// Create a group and [`add`](Self::add) each child in order.
    ///
    /// Later duplicates are dropped and recorded as diagnostics.
    pub fn with_children<I, N>(name: impl Into<String>, children: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        let mut group = Self::new(name);
        for child in children {
            group.add(child);
        }
        group
    }

    /// Decode a group from JSON produced by [`dumps`](Self::dumps).
    pub fn from_json(json: &str) -> Result<Self> {
        match load_param(json)? {
            Node::Group(group) => Ok(group),
            Node::Param(p) => Err(ParamError::NotAGroup(p.name().to_string())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a child unless its name is taken.
    pub fn add(&mut self, child: impl Into<Node>) -> Option<Diagnostic> {
        let mut child = child.into();
        let name = child.name().to_string();
        if self.index.contains_key(&name) {
            return self.record(Diagnostic::DuplicateName { name });
        }
        if let Node::Group(group) = &mut child {
            group.nested = true;
        }
        self.index.insert(name, self.children.len());
        self.children.push(child);
        None
    }

    /// Look up a child by name.
    ///
    /// This is the one read path that fails: an unknown name is a
    /// [`ParamError::NoSuchParameter`], never a default.
    pub fn get(&self, name: &str) -> Result<&Node> {
        self.index
            .get(name)
            .map(|&i| &self.children[i])
            .ok_or_else(|| ParamError::NoSuchParameter(name.to_string()))
    }

    /// Look up a child parameter by name.
    pub fn param(&self, name: &str) -> Result<&Parameter> {
        match self.get(name)? {
            Node::Param(p) => Ok(p),
            Node::Group(_) => Err(ParamError::NotAParameter(name.to_string())),
        }
    }

    /// Mutable access to a child parameter. Its name stays fixed.
    pub fn param_mut(&mut self, name: &str) -> Result<&mut Parameter> {
        let i = self.position(name)?;
        match &mut self.children[i] {
            Node::Param(p) => Ok(p),
            Node::Group(_) => Err(ParamError::NotAParameter(name.to_string())),
        }
    }

    /// Look up a nested group by name.
    pub fn group(&self, name: &str) -> Result<&ParameterGroup> {
        match self.get(name)? {
            Node::Group(g) => Ok(g),
            Node::Param(_) => Err(ParamError::NotAGroup(name.to_string())),
        }
    }

    /// Mutable access to a nested group. Its name stays fixed.
    pub fn group_mut(&mut self, name: &str) -> Result<&mut ParameterGroup> {
        let i = self.position(name)?;
        match &mut self.children[i] {
            Node::Group(g) => Ok(g),
            Node::Param(_) => Err(ParamError::NotAGroup(name.to_string())),
        }
    }

    /// Resolve a dotted path such as `"sub.x"` through nested groups.
    pub fn lookup(&self, path: &str) -> Result<&Node> {
        let mut segments = path.split('.');
        let first = segments.next().unwrap_or_default();
        let mut node = self.get(first)?;
        let mut walked = first.to_string();
        for segment in segments {
            let group = match node {
                Node::Group(g) => g,
                Node::Param(_) => return Err(ParamError::NotAGroup(walked)),
            };
            node = group
                .get(segment)
                .map_err(|_| ParamError::NoSuchParameter(format!("{walked}.{segment}")))?;
            walked.push('.');
            walked.push_str(segment);
        }
        Ok(node)
    }

    /// Mutable access to a nested group by dotted path (`"holes"`, `"a.b"`).
    pub fn lookup_group_mut(&mut self, path: &str) -> Result<&mut ParameterGroup> {
        let mut target = self;
        for segment in path.split('.') {
            target = target.group_mut(segment)?;
        }
        Ok(target)
    }

    /// Read a numeric parameter's value.
    pub fn num(&self, name: &str) -> Result<f64> {
        let p = self.param(name)?;
        p.as_f64().ok_or_else(|| mismatch(p, ParamType::Num))
    }

    /// Read a boolean parameter's value.
    pub fn flag(&self, name: &str) -> Result<bool> {
        let p = self.param(name)?;
        p.as_bool().ok_or_else(|| mismatch(p, ParamType::Bool))
    }

    /// Read a text parameter's value.
    pub fn text(&self, name: &str) -> Result<&str> {
        let p = self.param(name)?;
        p.as_str().ok_or_else(|| mismatch(p, ParamType::Str))
    }

    /// Attribute-style write.
    ///
    /// Resolution order:
    /// 1. names starting with `_` are reserved;
    /// 2. a child parameter gets its value replaced in place;
    /// 3. `children` may not be assigned;
    /// 4. `name` renames this group (top-level groups only);
    /// 5. anything else is unknown.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Option<Diagnostic> {
        let value = value.into();
        if name.starts_with('_') {
            return self.record(Diagnostic::ReservedField {
                field: name.to_string(),
            });
        }
        if let Some(&i) = self.index.get(name) {
            let outcome = match &mut self.children[i] {
                Node::Param(p) => p.replace_value(value),
                Node::Group(g) => Some(Diagnostic::NotAParameter {
                    name: g.name.clone(),
                }),
            };
            return outcome.and_then(|d| self.record(d));
        }
        match name {
            "children" => self.record(Diagnostic::ChildrenWrite),
            "name" => self.rename(value),
            _ => self.record(Diagnostic::UnknownAttribute {
                name: name.to_string(),
            }),
        }
    }

    /// [`set`](Self::set) addressed by dotted path, as produced by `lookup`
    /// and the host's control list. The last segment is written on the
    /// group the others lead to.
    ///
    /// A path whose parents are not nested groups is an unknown attribute.
    pub fn set_path(&mut self, path: &str, value: impl Into<Value>) -> Option<Diagnostic> {
        let Some((parents, leaf)) = path.rsplit_once('.') else {
            return self.set(path, value);
        };
        match self.lookup_group_mut(parents) {
            Ok(target) => target.set(leaf, value),
            Err(_) => self.record(Diagnostic::UnknownAttribute {
                name: path.to_string(),
            }),
        }
    }

    fn rename(&mut self, value: Value) -> Option<Diagnostic> {
        match value {
            Value::Str(new_name) if !self.nested => {
                self.name = new_name;
                None
            }
            Value::Str(new_name) => self.record(Diagnostic::RenameRejected {
                name: self.name.clone(),
                attempted: new_name,
            }),
            other => self.record(Diagnostic::TypeMismatch {
                name: "name".to_string(),
                expected: ParamType::Str,
                found: other.kind(),
            }),
        }
    }

    /// Child at a position in display order.
    pub fn at(&self, index: usize) -> Option<&Node> {
        self.children.get(index)
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.children.iter()
    }

    /// Child names in display order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(Node::name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Copy values from a previously saved group onto same-named parameters.
    ///
    /// Only values move; metadata (bounds, labels) stays as declared here.
    /// Names missing on this side and kind mismatches are recorded.
    pub fn merge_values(&mut self, saved: &ParameterGroup) -> Vec<Diagnostic> {
        let mut found = Vec::new();
        self.merge_into(saved, &mut found);
        for d in &found {
            log::warn!("{d}");
        }
        self.diagnostics.extend(found.iter().cloned());
        log::debug!(
            "merged saved values into '{}' ({} warnings)",
            self.name,
            found.len()
        );
        found
    }

    fn merge_into(&mut self, saved: &ParameterGroup, out: &mut Vec<Diagnostic>) {
        for child in &saved.children {
            let Some(&i) = self.index.get(child.name()) else {
                out.push(Diagnostic::UnknownParameter {
                    name: child.name().to_string(),
                });
                continue;
            };
            match (&mut self.children[i], child) {
                (Node::Param(mine), Node::Param(theirs)) => {
                    out.extend(mine.replace_value(theirs.value().clone()));
                }
                (Node::Group(mine), Node::Group(theirs)) => mine.merge_into(theirs, out),
                (Node::Group(mine), Node::Param(_)) => out.push(Diagnostic::NotAParameter {
                    name: mine.name.clone(),
                }),
                (Node::Param(_), Node::Group(theirs)) => out.push(Diagnostic::NotAParameter {
                    name: theirs.name.clone(),
                }),
            }
        }
    }

    /// Restore every parameter, including nested ones, to its default.
    pub fn reset(&mut self) {
        for child in &mut self.children {
            match child {
                Node::Param(p) => p.reset(),
                Node::Group(g) => g.reset(),
            }
        }
    }

    /// Report every numeric value outside its declared bounds.
    pub fn validate(&self) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        self.collect_range_errors(&mut out);
        for d in &out {
            log::warn!("{d}");
        }
        out
    }

    fn collect_range_errors(&self, out: &mut Vec<Diagnostic>) {
        for child in &self.children {
            match child {
                Node::Param(p) => out.extend(p.check_range()),
                Node::Group(g) => g.collect_range_errors(out),
            }
        }
    }

    /// Diagnostics recorded so far by this group and every nested group.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut out = self.diagnostics.clone();
        for child in &self.children {
            if let Node::Group(g) = child {
                out.extend(g.diagnostics());
            }
        }
        out
    }

    /// Drain recorded diagnostics, nested groups included.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        let mut out = std::mem::take(&mut self.diagnostics);
        for child in &mut self.children {
            if let Node::Group(g) = child {
                out.extend(g.take_diagnostics());
            }
        }
        out
    }

    /// Compact JSON of the whole structure.
    pub fn dumps(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Indented JSON of the whole structure.
    pub fn dumps_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The structure as a JSON value.
    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn position(&self, name: &str) -> Result<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| ParamError::NoSuchParameter(name.to_string()))
    }

    fn record(&mut self, diagnostic: Diagnostic) -> Option<Diagnostic> {
        let diagnostic = diagnostic.emit();
        self.diagnostics.push(diagnostic.clone());
        Some(diagnostic)
    }

    fn write_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(f, "{:indent$}{}:", "", self.name, indent = depth * 2)?;
        for child in &self.children {
            match child {
                Node::Param(p) => {
                    writeln!(f, "{:indent$}{}", "", p.summary(), indent = (depth + 1) * 2)?
                }
                Node::Group(g) => g.write_tree(f, depth + 1)?,
            }
        }
        Ok(())
    }
}

fn mismatch(p: &Parameter, wanted: ParamType) -> ParamError {
    ParamError::TypeMismatch {
        name: p.name().to_string(),
        expected: wanted,
        found: p.kind(),
    }
}

impl PartialEq for ParameterGroup {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.children == other.children
    }
}

impl fmt::Display for ParameterGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_tree(f, 0)
    }
}

impl<'a> IntoIterator for &'a ParameterGroup {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn box_params() -> ParameterGroup {
        ParameterGroup::with_children(
            DEFAULT_GROUP_NAME,
            [Parameter::num("length", 80.0), Parameter::num("width", 60.0)],
        )
    }

    #[test]
    fn set_known_child_updates_only_that_child() {
        let mut g = box_params();
        let width_before = g.param("width").unwrap().clone();

        assert!(g.set("length", 100.0).is_none());
        assert_eq!(g.num("length").unwrap(), 100.0);
        assert_eq!(g.num("width").unwrap(), 60.0);

        let width = g.param("width").unwrap();
        assert_eq!(width.default_value(), width_before.default_value());
        assert_eq!(width.min(), width_before.min());
        assert!(g.diagnostics().is_empty());
    }

    #[test]
    fn duplicate_add_is_a_noop() {
        let mut g = box_params();
        let d = g.add(Parameter::num("length", 1.0));
        assert_eq!(
            d,
            Some(Diagnostic::DuplicateName {
                name: "length".into()
            })
        );
        assert_eq!(g.len(), 2);
        assert_eq!(g.num("length").unwrap(), 80.0);
        assert_eq!(g.diagnostics().len(), 1);
    }

    #[test]
    fn duplicates_in_constructor_keep_first() {
        let g = ParameterGroup::with_children(
            "dupes",
            [
                Parameter::num("a", 1.0),
                Parameter::num("b", 2.0),
                Parameter::num("a", 3.0),
            ],
        );
        assert_eq!(g.names().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(g.num("a").unwrap(), 1.0);
        assert_eq!(g.diagnostics().len(), 1);
    }

    #[test]
    fn unknown_read_fails() {
        let g = box_params();
        let err = g.get("height").unwrap_err();
        assert!(matches!(err, ParamError::NoSuchParameter(ref n) if n == "height"));
        assert!(err.to_string().contains("height"));
        assert!(g.param("depth").is_err());
        assert!(g.num("").is_err());
    }

    #[test]
    fn reserved_and_structural_writes_are_rejected() {
        let mut g = box_params();
        let before = g.clone();

        assert!(matches!(
            g.set("_index", 1.0),
            Some(Diagnostic::ReservedField { .. })
        ));
        assert_eq!(g.set("children", 1.0), Some(Diagnostic::ChildrenWrite));
        assert!(matches!(
            g.set("height", 5.0),
            Some(Diagnostic::UnknownAttribute { .. })
        ));
        assert!(matches!(
            g.set("length", "long"),
            Some(Diagnostic::TypeMismatch { .. })
        ));

        assert_eq!(g, before);
        assert_eq!(g.take_diagnostics().len(), 4);
        assert!(g.diagnostics().is_empty());
    }

    #[test]
    fn set_name_renames_top_level_group() {
        let mut g = box_params();
        assert!(g.set("name", "Plate").is_none());
        assert_eq!(g.name(), "Plate");
        assert!(g.set("name", 3.0).is_some());
        assert_eq!(g.name(), "Plate");
    }

    #[test]
    fn nested_group_names_are_fixed() {
        let mut root = ParameterGroup::new("root");
        root.add(ParameterGroup::with_children(
            "sub",
            [Parameter::num("x", 5.0)],
        ));

        let sub = root.group_mut("sub").unwrap();
        assert!(matches!(
            sub.set("name", "other"),
            Some(Diagnostic::RenameRejected { .. })
        ));
        assert!(sub.set("x", 6.0).is_none());

        assert!(root.contains("sub"));
        assert_eq!(root.group("sub").unwrap().num("x").unwrap(), 6.0);
        assert!(matches!(
            root.set("sub", 1.0),
            Some(Diagnostic::NotAParameter { .. })
        ));
    }

    #[test]
    fn set_path_reaches_nested_parameters() {
        let mut root = box_params();
        root.add(ParameterGroup::with_children(
            "holes",
            [Parameter::num("dia", 22.0)],
        ));

        assert!(root.set_path("holes.dia", 8.0).is_none());
        assert_eq!(root.group("holes").unwrap().num("dia").unwrap(), 8.0);
        assert!(root.set_path("length", 90.0).is_none());
        assert_eq!(root.num("length").unwrap(), 90.0);

        assert!(matches!(
            root.set_path("holes.name", "bores"),
            Some(Diagnostic::RenameRejected { .. })
        ));
        assert_eq!(
            root.set_path("length.x", 1.0),
            Some(Diagnostic::UnknownAttribute {
                name: "length.x".into()
            })
        );
        assert!(matches!(
            root.set_path("nope.dia", 1.0),
            Some(Diagnostic::UnknownAttribute { .. })
        ));
        assert_eq!(root.take_diagnostics().len(), 3);
    }

    #[test]
    fn nested_diagnostics_reach_the_root() {
        let mut root = ParameterGroup::new("root");
        root.add(ParameterGroup::with_children(
            "sub",
            [Parameter::num("a", 1.0), Parameter::num("a", 2.0)],
        ));
        assert_eq!(
            root.diagnostics(),
            [Diagnostic::DuplicateName { name: "a".into() }]
        );

        root.set_path("sub.a", true);
        let drained = root.take_diagnostics();
        assert_eq!(drained.len(), 2);
        assert!(matches!(drained[1], Diagnostic::TypeMismatch { .. }));
        assert!(root.diagnostics().is_empty());
        assert!(root.group("sub").unwrap().diagnostics().is_empty());
    }

    #[test]
    fn typed_reads() {
        let g = ParameterGroup::with_children(
            "mixed",
            [
                Parameter::num("size", 3.0),
                Parameter::boolean("hollow", true),
                Parameter::text("thread", "M6"),
            ],
        );
        assert!(g.flag("hollow").unwrap());
        assert_eq!(g.text("thread").unwrap(), "M6");
        assert!(matches!(
            g.num("thread"),
            Err(ParamError::TypeMismatch { .. })
        ));
        assert!(matches!(g.group("size"), Err(ParamError::NotAGroup(_))));
    }

    #[test]
    fn positional_access_and_order() {
        let mut g = box_params();
        g.add(Parameter::num("depth", 10.0));
        assert_eq!(g.at(1).map(Node::name), Some("width"));
        assert!(g.at(3).is_none());
        let order: Vec<&str> = g.iter().map(Node::name).collect();
        assert_eq!(order, ["length", "width", "depth"]);
    }

    #[test]
    fn lookup_paths() {
        let mut root = ParameterGroup::new("root");
        root.add(Parameter::num("top", 1.0));
        root.add(ParameterGroup::with_children(
            "sub",
            [Parameter::num("x", 5.0)],
        ));

        let x = root.lookup("sub.x").unwrap().as_param().unwrap();
        assert_eq!(*x, 5.0);
        assert!(matches!(
            root.lookup("sub.y"),
            Err(ParamError::NoSuchParameter(ref p)) if p == "sub.y"
        ));
        assert!(matches!(
            root.lookup("top.x"),
            Err(ParamError::NotAGroup(ref p)) if p == "top"
        ));
    }

    #[test]
    fn merge_copies_values_by_name() {
        let mut fresh = ParameterGroup::with_children(
            "Parameters",
            [
                Parameter::num("length", 80.0).with_range(10.0, 200.0),
                Parameter::num("thickness", 10.0),
            ],
        );
        let saved = ParameterGroup::with_children(
            "Parameters",
            [
                Parameter::num("length", 120.0),
                Parameter::num("legacy", 1.0),
                Parameter::text("thickness", "thin"),
            ],
        );

        let found = fresh.merge_values(&saved);
        assert_eq!(fresh.num("length").unwrap(), 120.0);
        assert_eq!(fresh.param("length").unwrap().max(), Some(200.0));
        assert_eq!(fresh.num("thickness").unwrap(), 10.0);
        assert_eq!(found.len(), 2);
        assert!(found.contains(&Diagnostic::UnknownParameter {
            name: "legacy".into()
        }));
        assert_eq!(fresh.diagnostics(), found);
    }

    #[test]
    fn reset_and_validate() {
        let mut g = ParameterGroup::with_children(
            "p",
            [Parameter::num("height", 20.0).with_range(1.0, 100.0)],
        );
        g.set("height", 500.0);
        let issues = g.validate();
        assert_eq!(issues.len(), 1);
        assert!(matches!(issues[0], Diagnostic::OutOfRange { .. }));

        g.reset();
        assert_eq!(g.num("height").unwrap(), 20.0);
        assert!(g.validate().is_empty());
    }

    #[test]
    fn display_tree() {
        let mut g = box_params();
        g.add(ParameterGroup::with_children(
            "holes",
            [Parameter::num("dia", 22.0)],
        ));
        let text = g.to_string();
        assert_eq!(
            text,
            "Parameters:\n  length [num]: 80\n  width [num]: 60\n  holes:\n    dia [num]: 22\n"
        );
    }

    #[test]
    fn dumps_preserves_order() {
        let mut g = box_params();
        g.set("length", 100.0);
        let json = g.to_value().unwrap();
        assert_eq!(json["name"], "Parameters");
        assert_eq!(json["children"][0]["name"], "length");
        assert_eq!(json["children"][0]["value"], 100.0);
        assert_eq!(json["children"][1]["name"], "width");
        assert_eq!(json.as_object().unwrap().len(), 2);
    }
}
