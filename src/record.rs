//! The annotation payload record.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::callsite::CallSite;
use crate::labels::QueryLabels;

/// Plugin identity carried in every record.
pub const PLUGIN_NAME: &str = "intermix-rust-plugin";
/// Plugin version carried in every record.
pub const PLUGIN_VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the annotation encoding scheme.
pub const FORMAT_NAME: &str = "intermix";
/// Version of the annotation encoding scheme.
pub const FORMAT_VERSION: &str = "1";

/// The metadata payload embedded in an annotated query.
///
/// Field declaration order is the canonical serialized order; downstream
/// consumers compare against it and it must not be rearranged. Every field
/// is present in every record, empty strings included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    /// Module path containing the call site.
    pub module: String,
    /// Source file base name of the call site.
    pub file: String,
    /// Always [`PLUGIN_NAME`].
    pub plugin: String,
    /// Always [`PLUGIN_VERSION`].
    pub plugin_ver: String,
    /// Caller-supplied application version, uncoerced.
    pub app_ver: Value,
    /// Reserved user identity, empty unless populated via labels.
    pub user: String,
    /// Always [`FORMAT_NAME`].
    pub format: String,
    /// Always [`FORMAT_VERSION`].
    pub version: String,
    /// Caller-supplied extension mapping.
    pub meta: Map<String, Value>,
    /// Function or method that invoked the annotator.
    pub function: String,
    /// Caller-supplied task name.
    pub task: String,
    /// Caller-supplied workflow/DAG name.
    pub dag: String,
    /// Caller-supplied application name.
    pub app: String,
    /// Call-site line number as text, `"0"` when unresolved.
    pub linenumber: String,
    /// Enclosing `impl` type of the call site, empty for free functions.
    pub classname: String,
    /// Generation timestamp (RFC 3339, UTC), fresh on every call.
    pub at: String,
}

impl AnnotationRecord {
    /// Merge plugin constants, caller labels, the resolved call site, and a
    /// fresh timestamp into one record.
    pub fn assemble(labels: &QueryLabels, site: &CallSite) -> Self {
        Self {
            module: site.module.clone(),
            file: site.file.clone(),
            plugin: PLUGIN_NAME.to_string(),
            plugin_ver: PLUGIN_VERSION.to_string(),
            app_ver: labels.app_version.clone(),
            user: labels.user.clone(),
            format: FORMAT_NAME.to_string(),
            version: FORMAT_VERSION.to_string(),
            meta: labels.meta.clone(),
            function: site.function.clone(),
            task: labels.task.clone(),
            dag: labels.dag.clone(),
            app: labels.app.clone(),
            linenumber: site.linenumber(),
            classname: site.classname.clone(),
            at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }
}
