use crate::error::{Error, Result};
use crate::schema::OptionSchema;

/// Validate the parts of an option schema that generation depends on.
///
/// This checks:
/// - every category names a base type
/// - every dimension has at least one legal value
pub fn validate_option_schema(schema: &OptionSchema) -> Result<()> {
    for (category, config) in &schema.test_categories {
        if config.base_type.trim().is_empty() {
            return Err(Error::InvalidSchema(format!(
                "category has no base_type: {category}"
            )));
        }

        for (dimension, spec) in config.option_dimensions.iter() {
            if spec.is_empty() {
                return Err(Error::InvalidSchema(format!(
                    "dimension has no values: {category}.{dimension}"
                )));
            }
        }
    }

    Ok(())
}
