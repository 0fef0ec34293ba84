//! Demo models: simple parametric solids described as kernel features.
//!
//! The models stop at a feature list. Evaluating it into a solid and
//! exporting a mesh is the geometry kernel's job.

use clap::ValueEnum;
use serde::Serialize;
use wparam::{Model, ParamError, Parameter, ParameterGroup, Result, DEFAULT_GROUP_NAME};

/// How a feature combines with what came before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Add,
    Subtract,
}

/// One primitive handed to the geometry kernel, centered at the origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Feature {
    /// Axis-aligned box.
    Box {
        length: f64,
        width: f64,
        height: f64,
        mode: Mode,
    },
    /// Cylinder along Z.
    Cylinder {
        radius: f64,
        height: f64,
        mode: Mode,
    },
}

/// Bundled models selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModelKind {
    /// Plate with a through hole and a half-depth counterbore.
    Plate,
    /// Box whose width and depth derive from its height.
    Block,
    /// Hollow cylinder, optionally capped at the bottom.
    Tube,
}

impl ModelKind {
    pub fn model(self) -> &'static dyn Model<Output = Vec<Feature>> {
        match self {
            ModelKind::Plate => &Plate,
            ModelKind::Block => &Block,
            ModelKind::Tube => &Tube,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ModelKind::Plate => "plate",
            ModelKind::Block => "block",
            ModelKind::Tube => "tube",
        }
    }
}

pub struct Plate;

impl Model for Plate {
    type Output = Vec<Feature>;

    fn parameters(&self) -> ParameterGroup {
        let mm = |name: &str, value: f64, min: f64, max: f64, label: &str, description: &str| {
            Parameter::num(name, value)
                .with_range(min, max)
                .with_step(0.1)
                .with_label(label)
                .with_description(description)
        };
        ParameterGroup::with_children(
            DEFAULT_GROUP_NAME,
            [
                mm("length", 80.0, 10.0, 200.0, "Length (mm)", "Length of the box"),
                mm("width", 60.0, 10.0, 200.0, "Width (mm)", "Width of the box"),
                mm("thickness", 10.0, 1.0, 50.0, "Thickness (mm)", "Thickness of the box"),
                mm(
                    "center_hole_dia",
                    22.0,
                    0.0,
                    100.0,
                    "Center Hole Diameter (mm)",
                    "Diameter of the center hole",
                ),
                mm(
                    "otherhole",
                    40.0,
                    0.0,
                    100.0,
                    "Larger half thickness hole",
                    "Diameter of the larger half thickness hole",
                ),
            ],
        )
    }

    fn build(&self, params: &ParameterGroup) -> Result<Vec<Feature>> {
        let length = params.num("length")?;
        let width = params.num("width")?;
        let thickness = params.num("thickness")?;
        let hole = params.num("center_hole_dia")?;
        let counterbore = params.num("otherhole")?;

        if hole.max(counterbore) >= length.min(width) {
            return Err(ParamError::Build(format!(
                "holes ({}) must fit inside the plate ({length} x {width})",
                hole.max(counterbore)
            )));
        }

        Ok(vec![
            Feature::Box {
                length,
                width,
                height: thickness,
                mode: Mode::Add,
            },
            Feature::Cylinder {
                radius: hole / 2.0,
                height: thickness,
                mode: Mode::Subtract,
            },
            Feature::Cylinder {
                radius: counterbore / 2.0,
                height: thickness / 2.0,
                mode: Mode::Subtract,
            },
        ])
    }
}

pub struct Block;

impl Model for Block {
    type Output = Vec<Feature>;

    fn parameters(&self) -> ParameterGroup {
        let h = Parameter::num("height", 20.0).with_range(1.0, 100.0).with_step(0.1);
        let height = h.as_f64().unwrap_or_default();
        let w = Parameter::num("width", height / 3.0)
            .with_range(1.0, 100.0)
            .with_step(0.1);
        let d = Parameter::num("depth", height + w.as_f64().unwrap_or_default() * 0.5);

        let mut group = ParameterGroup::with_children(DEFAULT_GROUP_NAME, [h, w]);
        group.add(d);
        group
    }

    fn build(&self, params: &ParameterGroup) -> Result<Vec<Feature>> {
        Ok(vec![Feature::Box {
            length: params.num("height")?,
            width: params.num("width")?,
            height: params.num("depth")?,
            mode: Mode::Add,
        }])
    }
}

pub struct Tube;

impl Model for Tube {
    type Output = Vec<Feature>;

    fn parameters(&self) -> ParameterGroup {
        ParameterGroup::with_children(
            DEFAULT_GROUP_NAME,
            [
                Parameter::num("outer_dia", 30.0)
                    .with_range(2.0, 300.0)
                    .with_label("Outer diameter (mm)"),
                Parameter::num("wall", 2.0)
                    .with_range(0.4, 50.0)
                    .with_step(0.1)
                    .with_label("Wall thickness (mm)"),
                Parameter::num("height", 50.0)
                    .with_range(1.0, 500.0)
                    .with_label("Height (mm)"),
                Parameter::boolean("capped", false)
                    .with_label("Closed bottom")
                    .with_description("Leave a floor as thick as the wall"),
            ],
        )
    }

    fn build(&self, params: &ParameterGroup) -> Result<Vec<Feature>> {
        let outer = params.num("outer_dia")?;
        let wall = params.num("wall")?;
        let height = params.num("height")?;
        let capped = params.flag("capped")?;

        if wall * 2.0 >= outer {
            return Err(ParamError::Build(format!(
                "wall {wall} leaves no bore in a {outer} tube"
            )));
        }
        let bore_height = if capped { height - wall } else { height };
        if bore_height <= 0.0 {
            return Err(ParamError::Build(format!(
                "floor {wall} is taller than the tube ({height})"
            )));
        }

        Ok(vec![
            Feature::Cylinder {
                radius: outer / 2.0,
                height,
                mode: Mode::Add,
            },
            Feature::Cylinder {
                radius: outer / 2.0 - wall,
                height: bore_height,
                mode: Mode::Subtract,
            },
        ])
    }
}
