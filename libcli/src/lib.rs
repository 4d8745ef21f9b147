#[macro_use]
extern crate log;

pub mod graphviz;
pub mod summary;
pub mod table;
