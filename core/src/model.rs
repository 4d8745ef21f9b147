use std::path::{Path, PathBuf};

use anyhow::{Context, ensure};
use tract_onnx::pb;
use tract_onnx::prelude::*;

/// Domains ONNX treats as its own default operator set.
const DEFAULT_DOMAINS: &[&str] = &["", "ai.onnx"];

/// One operator-set import declared by a model.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Opset {
    pub domain: String,
    pub version: i64,
}

impl Opset {
    pub fn is_default_domain(&self) -> bool {
        DEFAULT_DOMAINS.contains(&&*self.domain)
    }
}

impl std::fmt::Display for Opset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let domain = if self.domain.is_empty() { "ai.onnx" } else { &self.domain };
        write!(f, "{} {}", domain, self.version)
    }
}

/// Descriptive fields of a model, as declared in its protobuf.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ModelInfo {
    pub ir_version: i64,
    pub producer_name: String,
    pub producer_version: String,
    pub domain: String,
    pub model_version: i64,
    pub graph_name: String,
    pub opsets: Vec<Opset>,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub nodes: usize,
    pub initializers: usize,
}

/// A deserialized ONNX model.
///
/// The protobuf is kept as read from disk: conversions to tract graphs
/// always start from a fresh copy, so the same `OnnxModel` can be simplified
/// several times with different options.
#[derive(Clone, Debug)]
pub struct OnnxModel {
    path: Option<PathBuf>,
    proto: pb::ModelProto,
}

impl OnnxModel {
    pub fn load(path: impl AsRef<Path>) -> TractResult<OnnxModel> {
        let path = path.as_ref();
        debug!("Loading ONNX model from {path:?}");
        let mut file = fs_err::File::open(path)?;
        let proto = tract_onnx::onnx()
            .proto_model_for_read(&mut file)
            .with_context(|| format!("Decoding ONNX protobuf from {path:?}"))?;
        let model = OnnxModel { path: Some(path.to_owned()), proto };
        info!(
            "Loaded {:?}: {} nodes, {} initializers",
            path,
            model.graph().map(|g| g.node.len()).unwrap_or(0),
            model.graph().map(|g| g.initializer.len()).unwrap_or(0)
        );
        Ok(model)
    }

    pub fn from_read(reader: &mut dyn std::io::Read) -> TractResult<OnnxModel> {
        let proto =
            tract_onnx::onnx().proto_model_for_read(reader).context("Decoding ONNX protobuf")?;
        Ok(OnnxModel { path: None, proto })
    }

    pub fn from_proto(proto: pb::ModelProto) -> OnnxModel {
        OnnxModel { path: None, proto }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn proto(&self) -> &pb::ModelProto {
        &self.proto
    }

    /// Short name for display: the file stem, or the graph name for in-memory models.
    pub fn name(&self) -> String {
        self.path
            .as_ref()
            .and_then(|p| p.file_stem())
            .map(|s| s.to_string_lossy().into_owned())
            .or_else(|| self.graph().map(|g| g.name.clone()).filter(|n| !n.is_empty()))
            .unwrap_or_else(|| "model".to_string())
    }

    pub(crate) fn graph(&self) -> Option<&pb::GraphProto> {
        self.proto.graph.as_ref()
    }

    pub fn opsets(&self) -> Vec<Opset> {
        self.proto
            .opset_import
            .iter()
            .map(|o| Opset { domain: o.domain.clone(), version: o.version })
            .collect()
    }

    /// Version of the first operator set import, as declared in the model.
    pub fn opset_version(&self) -> TractResult<i64> {
        let first = self.proto.opset_import.first().context("Model declares no opset import")?;
        if !DEFAULT_DOMAINS.contains(&first.domain.as_str()) {
            debug!("First opset import is in domain {:?}", first.domain);
        }
        Ok(first.version)
    }

    /// Version of the import in the default ONNX domain, if any.
    pub fn default_opset_version(&self) -> Option<i64> {
        self.opsets().into_iter().find(|o| o.is_default_domain()).map(|o| o.version)
    }

    pub fn info(&self) -> ModelInfo {
        let graph = self.graph();
        let names = |values: Option<&Vec<pb::ValueInfoProto>>| -> Vec<String> {
            values.map(|v| v.iter().map(|vi| vi.name.clone()).collect()).unwrap_or_default()
        };
        ModelInfo {
            ir_version: self.proto.ir_version,
            producer_name: self.proto.producer_name.clone(),
            producer_version: self.proto.producer_version.clone(),
            domain: self.proto.domain.clone(),
            model_version: self.proto.model_version,
            graph_name: graph.map(|g| g.name.clone()).unwrap_or_default(),
            opsets: self.opsets(),
            inputs: names(graph.map(|g| &g.input)),
            outputs: names(graph.map(|g| &g.output)),
            nodes: graph.map(|g| g.node.len()).unwrap_or(0),
            initializers: graph.map(|g| g.initializer.len()).unwrap_or(0),
        }
    }

    /// Translate the protobuf into a tract inference graph.
    pub fn inference_model(&self) -> TractResult<InferenceModel> {
        ensure!(self.graph().is_some(), "Model has no graph");
        tract_onnx::onnx()
            .model_for_proto_model(&self.proto)
            .with_context(|| format!("Translating {} to a tract graph", self.name()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_models;

    #[test]
    fn opset_is_first_import() -> TractResult<()> {
        let mut proto = test_models::relu_chain(&[1, 4]);
        proto.opset_import = vec![
            test_models::opset("com.microsoft", 1),
            test_models::opset("", 13),
        ];
        let model = OnnxModel::from_proto(proto);
        assert_eq!(model.opset_version()?, 1);
        assert_eq!(model.default_opset_version(), Some(13));
        Ok(())
    }

    #[test]
    fn opset_accepts_explicit_onnx_domain() {
        let mut proto = test_models::relu_chain(&[1, 4]);
        proto.opset_import = vec![test_models::opset("ai.onnx", 11)];
        let model = OnnxModel::from_proto(proto);
        assert_eq!(model.opset_version().unwrap(), 11);
        assert_eq!(model.default_opset_version(), Some(11));
    }

    #[test]
    fn no_default_domain_import() {
        let mut proto = test_models::relu_chain(&[1, 4]);
        proto.opset_import =
            vec![test_models::opset("ai.onnx.ml", 3), test_models::opset("custom", 1)];
        let model = OnnxModel::from_proto(proto);
        assert_eq!(model.opset_version().unwrap(), 3);
        assert_eq!(model.default_opset_version(), None);
    }

    #[test]
    fn opset_missing_is_an_error() {
        let mut proto = test_models::relu_chain(&[1, 4]);
        proto.opset_import.clear();
        let model = OnnxModel::from_proto(proto);
        assert!(model.opset_version().is_err());
        assert_eq!(model.default_opset_version(), None);
    }

    #[test]
    fn opset_display() {
        let o = Opset { domain: "".into(), version: 17 };
        assert_eq!(o.to_string(), "ai.onnx 17");
        let o = Opset { domain: "ai.onnx.ml".into(), version: 3 };
        assert_eq!(o.to_string(), "ai.onnx.ml 3");
    }

    #[test]
    fn info_lists_graph_interface() {
        let model = OnnxModel::from_proto(test_models::relu_chain(&[1, 4]));
        let info = model.info();
        assert_eq!(info.inputs, vec!["x".to_string()]);
        assert_eq!(info.outputs, vec!["y".to_string()]);
        assert_eq!(info.nodes, 3);
        assert_eq!(info.initializers, 1);
        assert_eq!(info.opsets, vec![Opset { domain: "".into(), version: 13 }]);
        assert_eq!(model.name(), "relu_chain");
    }

    #[test]
    fn inference_model_has_declared_io() -> TractResult<()> {
        let model = OnnxModel::from_proto(test_models::relu_chain(&[1, 4]));
        let inference = model.inference_model()?;
        assert_eq!(inference.input_outlets()?.len(), 1);
        assert_eq!(inference.output_outlets()?.len(), 1);
        Ok(())
    }

    #[test]
    fn graphless_model_is_rejected() {
        let mut proto = test_models::relu_chain(&[1, 4]);
        proto.graph = None;
        assert!(OnnxModel::from_proto(proto).inference_model().is_err());
    }
}
