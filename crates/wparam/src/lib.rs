//! Typed, named parameters for parametric CAD generators.
//!
//! A generator declares its settings as a [`ParameterGroup`] of
//! [`Parameter`]s, hands the group to a UI as JSON, and rebuilds it from the
//! edited JSON on the next run.
//!
//! # Example
//!
//! ```rust
//! use wparam::{load_param, Parameter, ParameterGroup};
//!
//! let mut group = ParameterGroup::with_children(
//!     "Parameters",
//!     [
//!         Parameter::num("length", 80.0).with_range(10.0, 200.0),
//!         Parameter::num("width", 60.0),
//!     ],
//! );
//! group.set("length", 100.0);
//!
//! let json = group.dumps().unwrap();
//! let restored = load_param(&json).unwrap();
//! let restored = restored.as_group().unwrap();
//! assert_eq!(restored.num("length").unwrap(), 100.0);
//! ```

pub mod diagnostic;
pub mod error;
pub mod group;
pub mod model;
pub mod node;
pub mod parameter;
pub mod value;

pub use diagnostic::Diagnostic;
pub use error::{ParamError, Result};
pub use group::{ParameterGroup, DEFAULT_GROUP_NAME};
pub use model::{generate, Generation, Model};
pub use node::{load_param, load_param_value, Node};
pub use parameter::Parameter;
pub use value::{ParamType, Value};
