#[macro_use]
extern crate log;

pub mod check;
pub mod export;
pub mod inputs;
pub mod model;
pub mod simplify;
pub mod stats;

#[doc(hidden)]
pub mod test_models;

pub use tract_onnx;

pub mod prelude {
    pub use crate::check::{Check, check_equivalence};
    pub use crate::export::save_nnef;
    pub use crate::inputs::InputShape;
    pub use crate::model::{ModelInfo, OnnxModel, Opset};
    pub use crate::simplify::{Simplified, SimplifyOptions, simplify, typed_model};
    pub use crate::stats::GraphStats;
    pub use tract_onnx::prelude::{TractResult, TypedModel};
}
