use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::dataset::Dataset;

/// Emit the JSON Schema for `family_tree.json`.
pub fn dataset_json_schema() -> RootSchema {
    schema_for!(Dataset)
}
