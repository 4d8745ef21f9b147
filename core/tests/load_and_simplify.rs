use std::io::Write;

use prost::Message;
use tidy_core::prelude::*;
use tidy_core::test_models;

fn write_model(proto: &tidy_core::tract_onnx::pb::ModelProto) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".onnx").tempfile().unwrap();
    file.write_all(&proto.encode_to_vec()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn load_print_opset_and_simplify() -> TractResult<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let file = write_model(&test_models::relu_chain(&[1, 4]));

    let model = OnnxModel::load(file.path())?;
    assert_eq!(model.opset_version()?, 13);
    assert_eq!(model.path(), Some(file.path()));

    let simplified = simplify(&model, &SimplifyOptions::default())?;
    assert!(simplified.check_ok());
    assert!(simplified.after.nodes <= simplified.before.nodes);
    Ok(())
}

#[test]
fn load_from_reader() -> TractResult<()> {
    let bytes = test_models::relu_chain(&[1, 4]).encode_to_vec();
    let model = OnnxModel::from_read(&mut &*bytes)?;
    assert_eq!(model.info().producer_name, "tidy-tests");
    assert_eq!(model.opsets(), vec![Opset { domain: String::new(), version: 13 }]);
    Ok(())
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = OnnxModel::load(dir.path().join("nope.onnx")).unwrap_err();
    assert!(format!("{err:?}").contains("nope.onnx"));
}

#[test]
fn garbage_is_not_a_model() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"\xff\xff\xff\xff this is not protobuf").unwrap();
    assert!(OnnxModel::load(file.path()).is_err());
}
