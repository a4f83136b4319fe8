use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::schema::OptionSchema;

/// Emit the JSON Schema for the option schema document.
pub fn option_schema_json_schema() -> RootSchema {
    schema_for!(OptionSchema)
}
