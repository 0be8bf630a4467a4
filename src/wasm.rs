//! WASM bindings for the flowplace-core library.
//!
//! All functions exposed to JavaScript via wasm-bindgen are defined here.
//! Every function returns a JSON string; failures are reported in its
//! `error` field and logged to the browser console.

use wasm_bindgen::prelude::*;

use crate::error::Error;
use crate::layout::{LayoutAlgorithm, LayoutConfig};
use crate::output::{DiagramOutput, render_diagram, to_json};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console, js_name = error)]
    fn console_error(s: &str);
}

fn run(input: &str, cfg: &LayoutConfig) -> String {
    match render_diagram(input, cfg) {
        Ok(output) => to_json(&output),
        Err(e) => {
            console_error(&format!("Error laying out diagram: {e}"));
            to_json(&DiagramOutput::from_error(&e))
        }
    }
}

/// Lay out `input` with the default canvas and the named algorithm
/// ("flow" or "hilbert"; empty means flow).
#[wasm_bindgen]
pub fn compile_diagram(input: &str, layout: &str) -> String {
    let algorithm = if layout.trim().is_empty() {
        LayoutAlgorithm::default()
    } else {
        match layout.parse::<LayoutAlgorithm>() {
            Ok(a) => a,
            Err(e) => {
                console_error(&format!("Error selecting layout: {e}"));
                return to_json(&DiagramOutput::from_error(&Error::from(e)));
            }
        }
    };

    let cfg = LayoutConfig { algorithm, ..LayoutConfig::default() };
    run(input, &cfg)
}

/// Lay out `input` with a JSON `LayoutConfig`; missing fields use defaults.
#[wasm_bindgen]
pub fn compile_diagram_with_config(input: &str, config_json: &str) -> String {
    let cfg = match LayoutConfig::from_json(config_json) {
        Ok(cfg) => cfg,
        Err(e) => {
            console_error(&format!("Error reading layout config: {e}"));
            return to_json(&DiagramOutput::from_error(&Error::Config(e)));
        }
    };
    run(input, &cfg)
}

/// The default `LayoutConfig` as JSON, for the front end to start from.
#[wasm_bindgen]
pub fn default_config() -> String {
    serde_json::to_string(&LayoutConfig::default()).unwrap_or_else(|_| "{}".to_string())
}
