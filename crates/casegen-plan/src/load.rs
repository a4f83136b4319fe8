use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::errors::Result;
use crate::model::StrategyPlan;

/// Load a strategy plan. `.toml` files are read as TOML, anything else as JSON.
pub fn load_plan(path: &Path) -> Result<StrategyPlan> {
    Ok(serde_json::from_value(load_plan_value(path)?)?)
}

/// Read a plan file into a JSON document without decoding it, so TOML plans
/// can be checked against the plan JSON Schema too.
pub fn load_plan_value(path: &Path) -> Result<Value> {
    let contents = fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        Ok(toml::from_str(&contents)?)
    } else {
        Ok(serde_json::from_str(&contents)?)
    }
}
