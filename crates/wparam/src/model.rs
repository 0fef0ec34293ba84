//! Parameterized models and the generation pass.

use crate::diagnostic::Diagnostic;
use crate::error::{ParamError, Result};
use crate::group::ParameterGroup;
use crate::node::{load_param, Node};

/// Something built from a [`ParameterGroup`].
///
/// The model declares its parameters with their defaults; the builder reads
/// final values back by name.
pub trait Model {
    /// What the model produces.
    type Output;

    /// Fresh parameters with default values.
    fn parameters(&self) -> ParameterGroup;

    /// Build from final parameter values.
    fn build(&self, params: &ParameterGroup) -> Result<Self::Output>;
}

/// Result of one generation pass.
#[derive(Debug)]
pub struct Generation<T> {
    /// What the model built.
    pub output: T,
    /// Parameters the model was built from.
    pub params: ParameterGroup,
    /// `params` dumped for the host UI.
    pub json: String,
    /// Warnings collected while decoding the seed, merging and validating.
    pub diagnostics: Vec<Diagnostic>,
}

/// Run a model once.
///
/// Starts from the model's defaults, copies values from `seed` (a blob from
/// an earlier pass) when given, builds, and dumps the final parameters.
/// Range violations are reported but do not stop the build.
pub fn generate<M: Model + ?Sized>(model: &M, seed: Option<&str>) -> Result<Generation<M::Output>> {
    let mut params = model.parameters();
    let mut diagnostics = Vec::new();
    if let Some(seed) = seed {
        let mut saved = match load_param(seed)? {
            Node::Group(group) => group,
            Node::Param(p) => {
                return Err(ParamError::InvalidShape(format!(
                    "seed must be a group, found parameter '{}'",
                    p.name()
                )))
            }
        };
        diagnostics.extend(saved.take_diagnostics());
        params.merge_values(&saved);
    }

    diagnostics.extend(params.take_diagnostics());
    diagnostics.extend(params.validate());

    let output = model.build(&params)?;
    let json = params.dumps()?;
    log::info!(
        "generated '{}' with {} parameter(s), {} warning(s)",
        params.name(),
        params.len(),
        diagnostics.len()
    );

    Ok(Generation {
        output,
        params,
        json,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parameter;

    /// Box whose width and depth derive from its height by default.
    struct Block;

    impl Model for Block {
        type Output = [f64; 3];

        fn parameters(&self) -> ParameterGroup {
            let h = Parameter::num("height", 20.0).with_range(1.0, 100.0).with_step(0.1);
            let h_val = h.as_f64().unwrap_or_default();
            let w = Parameter::num("width", h_val / 3.0).with_range(1.0, 100.0);
            let d = Parameter::num("depth", h_val + w.as_f64().unwrap_or_default() * 0.5);
            let mut g = ParameterGroup::with_children("Parameters", [h, w]);
            g.add(d);
            g
        }

        fn build(&self, params: &ParameterGroup) -> Result<[f64; 3]> {
            let height = params.num("height")?;
            if height <= 0.0 {
                return Err(ParamError::Build("height must be positive".into()));
            }
            Ok([height, params.num("width")?, params.num("depth")?])
        }
    }

    #[test]
    fn first_pass_uses_defaults() {
        let run = generate(&Block, None).unwrap();
        assert_eq!(run.output[0], 20.0);
        assert!(run.diagnostics.is_empty());
        assert_eq!(run.params.len(), 3);
        assert!(run.json.starts_with(r#"{"name":"Parameters","children":["#));
    }

    #[test]
    fn seed_values_carry_over() {
        let mut saved = Block.parameters();
        saved.set("height", 42.0);
        saved.set("depth", 7.0);
        let seed = saved.dumps().unwrap();

        let run = generate(&Block, Some(&seed)).unwrap();
        assert_eq!(run.output, [42.0, 20.0 / 3.0, 7.0]);
        assert!(run.diagnostics.is_empty());

        let reloaded = ParameterGroup::from_json(&run.json).unwrap();
        assert_eq!(reloaded.num("height").unwrap(), 42.0);
    }

    #[test]
    fn seed_warnings_are_reported() {
        let seed = r#"{"name":"Parameters","children":[
            {"name":"height","type":"num","value":250},
            {"name":"colour","type":"str","value":"red"}
        ]}"#;
        let run = generate(&Block, Some(seed)).unwrap();
        assert_eq!(run.output[0], 250.0);
        assert_eq!(run.diagnostics.len(), 2);
        assert!(run
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::OutOfRange { .. })));
    }

    #[test]
    fn seed_decode_warnings_are_kept() {
        let seed = r#"{"name":"Parameters","children":[
            {"name":"height","type":"num","value":30},
            {"name":"height","type":"num","value":99}
        ]}"#;
        let run = generate(&Block, Some(seed)).unwrap();
        assert_eq!(run.output[0], 30.0);
        assert_eq!(
            run.diagnostics,
            [Diagnostic::DuplicateName {
                name: "height".into()
            }]
        );
    }

    #[test]
    fn seed_must_be_a_group() {
        let err = generate(&Block, Some(r#"{"name":"height","type":"num","value":1}"#));
        assert!(matches!(err, Err(ParamError::InvalidShape(_))));
    }

    #[test]
    fn build_errors_propagate() {
        let seed = r#"{"children":[{"name":"height","type":"num","value":-1}]}"#;
        assert!(matches!(
            generate(&Block, Some(seed)),
            Err(ParamError::Build(_))
        ));
    }
}
