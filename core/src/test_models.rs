//! Small ONNX graphs built in memory for tests.

use tract_onnx::pb;
use tract_onnx::pb::tensor_proto::DataType;
use tract_onnx::pb::tensor_shape_proto::dimension::Value as Dim;

pub fn opset(domain: &str, version: i64) -> pb::OperatorSetIdProto {
    pb::OperatorSetIdProto { domain: domain.to_string(), version }
}

/// A float tensor value. Without `dims`, the rank is left unknown.
fn value_info(name: &str, dims: Option<&[Dim]>) -> pb::ValueInfoProto {
    let shape = dims.map(|dims| pb::TensorShapeProto {
        dim: dims
            .iter()
            .map(|d| pb::tensor_shape_proto::Dimension {
                value: Some(d.clone()),
                ..Default::default()
            })
            .collect(),
    });
    pb::ValueInfoProto {
        name: name.to_string(),
        r#type: Some(pb::TypeProto {
            value: Some(pb::type_proto::Value::TensorType(pb::type_proto::Tensor {
                elem_type: DataType::Float as i32,
                shape,
                ..Default::default()
            })),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn node(op_type: &str, inputs: &[&str], output: &str) -> pb::NodeProto {
    pb::NodeProto {
        name: output.to_string(),
        op_type: op_type.to_string(),
        input: inputs.iter().map(|s| s.to_string()).collect(),
        output: vec![output.to_string()],
        ..Default::default()
    }
}

fn graph(
    name: &str,
    input: pb::ValueInfoProto,
    channels: i64,
    constant_bias: bool,
) -> pb::ModelProto {
    let bias = pb::TensorProto {
        name: "bias".to_string(),
        dims: vec![channels],
        data_type: DataType::Float as i32,
        float_data: (0..channels).map(|i| 0.25 * i as f32 - 0.5).collect(),
        ..Default::default()
    };
    let mut nodes = vec![
        node("Identity", &["x"], "a"),
        node("Add", &["a", "bias"], "b"),
        node("Relu", &["b"], "y"),
    ];
    let mut initializer = vec![];
    if constant_bias {
        let mut constant = node("Constant", &[], "bias");
        constant.attribute.push(pb::AttributeProto {
            name: "value".to_string(),
            r#type: pb::attribute_proto::AttributeType::Tensor as i32,
            t: Some(bias),
            ..Default::default()
        });
        nodes.insert(0, constant);
    } else {
        initializer.push(bias);
    }
    let graph = pb::GraphProto {
        name: name.to_string(),
        node: nodes,
        initializer,
        input: vec![input],
        output: vec![value_info("y", None)],
        ..Default::default()
    };
    pb::ModelProto {
        ir_version: 7,
        producer_name: "tidy-tests".to_string(),
        opset_import: vec![opset("", 13)],
        graph: Some(graph),
        ..Default::default()
    }
}

/// `y = relu(identity(x) + bias)` with a fully determined input shape.
///
/// The output is declared without a shape, so the graph relies on shape
/// inference.
pub fn relu_chain(shape: &[i64]) -> pb::ModelProto {
    let dims: Vec<Dim> = shape.iter().map(|d| Dim::DimValue(*d)).collect();
    graph("relu_chain", value_info("x", Some(&dims[..])), *shape.last().unwrap_or(&1), false)
}

/// Same graph as [`relu_chain`], with the bias held by a `Constant` node
/// instead of an initializer.
pub fn relu_chain_constant_bias(shape: &[i64]) -> pb::ModelProto {
    let dims: Vec<Dim> = shape.iter().map(|d| Dim::DimValue(*d)).collect();
    let channels = *shape.last().unwrap_or(&1);
    graph("relu_chain_constant_bias", value_info("x", Some(&dims[..])), channels, true)
}

/// Same graph as [`relu_chain`], with a symbolic batch dimension `N`.
pub fn relu_chain_symbolic(channels: i64) -> pb::ModelProto {
    let dims = [Dim::DimParam("N".to_string()), Dim::DimValue(channels)];
    graph("relu_chain_symbolic", value_info("x", Some(&dims[..])), channels, false)
}
