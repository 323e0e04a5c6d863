//! Baseline catalogs and the settings migrator.

mod defaults;
mod migrate;

pub use defaults::{
    default_service_schema, default_service_schemas, default_settings, default_triggers,
    field_defs, trigger_label_key, FieldDef,
};
pub use migrate::apply_defaults;
