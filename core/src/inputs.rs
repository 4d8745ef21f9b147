use std::str::FromStr;

use anyhow::{Context, bail, ensure};
use rand::Rng;
use tract_hir::internal::*;

/// Shape override for one model input: `name:1,3,224,224` or `1,3,224,224`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputShape {
    pub name: Option<String>,
    pub dims: Vec<usize>,
}

impl FromStr for InputShape {
    type Err = TractError;

    fn from_str(s: &str) -> TractResult<InputShape> {
        let (name, dims) = match s.rsplit_once(':') {
            Some((name, dims)) => {
                ensure!(!name.is_empty(), "Empty input name in shape override {s:?}");
                (Some(name.to_string()), dims)
            }
            None => (None, s),
        };
        ensure!(!dims.trim().is_empty(), "No dimensions in shape override {s:?}");
        let dims = dims
            .split(',')
            .map(|d| {
                let d = d.trim();
                let value: usize =
                    d.parse().with_context(|| format!("Invalid dimension {d:?} in {s:?}"))?;
                ensure!(value > 0, "Dimensions must be positive in {s:?}");
                Ok(value)
            })
            .collect::<TractResult<Vec<usize>>>()?;
        Ok(InputShape { name, dims })
    }
}

impl std::fmt::Display for InputShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{name}:")?;
        }
        let dims: Vec<String> = self.dims.iter().map(|d| d.to_string()).collect();
        write!(f, "{}", dims.join(","))
    }
}

/// Override input facts of an inference model.
///
/// Named overrides target the input node with that name, unnamed ones are
/// matched positionally.
pub fn apply_input_shapes(model: &mut InferenceModel, shapes: &[InputShape]) -> TractResult<()> {
    let input_names: Vec<String> = model
        .input_outlets()?
        .iter()
        .map(|outlet| model.node(outlet.node).name.clone())
        .collect();
    let mut position = 0;
    for shape in shapes {
        let ix = if let Some(name) = &shape.name {
            input_names
                .iter()
                .position(|n| n == name)
                .with_context(|| format!("No input named {name:?} (inputs: {input_names:?})"))?
        } else {
            position += 1;
            position - 1
        };
        if ix >= input_names.len() {
            bail!(
                "Shape override {} targets input #{} but the model has {} input(s)",
                shape,
                ix,
                input_names.len()
            );
        }
        let dt = model.input_fact(ix)?.datum_type.concretize().unwrap_or(f32::datum_type());
        debug!("Input #{} {:?} set to {:?} {:?}", ix, input_names[ix], dt, shape.dims);
        model.set_input_fact(ix, TypedFact::dt_shape(dt, shape.dims.clone()).into())?;
    }
    Ok(())
}

/// Generate one tensor per model input. Floats are uniform in [-1, 1), other types are zeros.
pub fn random_inputs(model: &TypedModel, rng: &mut impl Rng) -> TractResult<TVec<TValue>> {
    let mut inputs = tvec!();
    for ix in 0..model.input_outlets()?.len() {
        let fact = model.input_fact(ix)?;
        let shape = fact.shape.as_concrete().with_context(|| {
            format!("Input #{ix} has a symbolic shape ({fact:?}), override it to generate data")
        })?;
        let tensor = if fact.datum_type.is_float() {
            let values =
                tract_ndarray::ArrayD::from_shape_fn(shape, |_| rng.gen_range(-1f32..1f32));
            Tensor::from(values).cast_to_dt(fact.datum_type)?.into_owned()
        } else {
            Tensor::zero_dt(fact.datum_type, shape)?
        };
        inputs.push(tensor.into_tvalue());
    }
    Ok(inputs)
}

/// True when every input of the model has a fully known shape.
pub fn has_concrete_inputs(model: &TypedModel) -> TractResult<bool> {
    for ix in 0..model.input_outlets()?.len() {
        if model.input_fact(ix)?.shape.as_concrete().is_none() {
            return Ok(false);
        }
    }
    Ok(true)
}
