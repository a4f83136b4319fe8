use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::model::StrategyPlan;

/// Emit the JSON Schema for strategy plan documents.
pub fn plan_json_schema() -> RootSchema {
    schema_for!(StrategyPlan)
}
