use tidy_core::prelude::*;
use tidy_libcli::summary::{info_json, info_table};

use crate::params::{Parameters, header_style};

pub fn opset_lines(model: &OnnxModel, all: bool) -> TractResult<Vec<String>> {
    if all {
        Ok(model.opsets().iter().map(|o| o.to_string()).collect())
    } else {
        Ok(vec![model.opset_version()?.to_string()])
    }
}

pub fn handle_opset(params: &Parameters, all: bool) -> TractResult<()> {
    for line in opset_lines(&params.model, all)? {
        println!("{line}");
    }
    Ok(())
}

pub fn handle_info(params: &Parameters, json: bool) -> TractResult<()> {
    let info = params.model.info();
    if json {
        println!("{}", info_json(&info)?);
    } else {
        let table = info_table(&info).with_title(params.model.name());
        println!("{}", table.render(header_style()));
    }
    Ok(())
}
