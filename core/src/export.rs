use std::path::Path;

use anyhow::Context;
use tract_onnx::prelude::*;
use tract_onnx_opl::WithOnnx;

fn is_gzipped(path: &Path) -> bool {
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    name.ends_with(".tgz") || name.ends_with(".tar.gz")
}

/// Serialize a typed model to an NNEF archive, gzipped when the file name asks for it.
pub fn save_nnef(model: &TypedModel, path: impl AsRef<Path>) -> TractResult<()> {
    let path = path.as_ref();
    let nnef = tract_nnef::nnef().with_tract_core().with_onnx();
    let file = fs_err::File::create(path)?;
    if is_gzipped(path) {
        let gz = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        nnef.write_to_tar(model, gz)
            .with_context(|| format!("Writing NNEF archive {path:?}"))?
            .finish()?;
    } else {
        nnef.write_to_tar(model, file).with_context(|| format!("Writing NNEF archive {path:?}"))?;
    }
    info!("Saved simplified model to {path:?}");
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::OnnxModel;
    use crate::simplify::{SimplifyOptions, simplify};
    use crate::test_models;

    #[test]
    fn gz_detection() {
        assert!(is_gzipped(Path::new("out/model.nnef.tgz")));
        assert!(is_gzipped(Path::new("model.tar.gz")));
        assert!(!is_gzipped(Path::new("model.nnef.tar")));
        assert!(!is_gzipped(Path::new("tgz")));
    }

    #[test]
    fn save_simplified_graph() -> TractResult<()> {
        let model = OnnxModel::from_proto(test_models::relu_chain(&[2, 4]));
        let simplified = simplify(&model, &SimplifyOptions::default())?;
        let dir = tempfile::tempdir()?;
        for name in ["model.nnef.tar", "model.nnef.tgz"] {
            let path = dir.path().join(name);
            save_nnef(&simplified.model, &path)?;
            assert!(std::fs::metadata(&path)?.len() > 0);
        }
        let reloaded = tract_nnef::nnef()
            .with_tract_core()
            .with_onnx()
            .model_for_path(dir.path().join("model.nnef.tar"))?;
        assert_eq!(reloaded.input_outlets()?.len(), 1);
        Ok(())
    }
}
