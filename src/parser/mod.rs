mod flowchart;
mod types;

pub use flowchart::{ParseError, parse_flowchart};
pub use types::*;
