//! Caller-supplied labels attached to every annotation.

use serde_json::{Map, Value};

/// Application-level labels describing the unit of work issuing a query.
///
/// These are the fields a caller supplies; call-site fields (file, line,
/// function, enclosing type) are captured separately by the [`annotate!`]
/// macro, and plugin identity fields are fixed constants.
///
/// # Example
///
/// ```rust
/// use intermix::QueryLabels;
///
/// let labels = QueryLabels::new("billing-api", 3)
///     .with_dag("nightly_rollup")
///     .with_task("sum_invoices");
/// ```
///
/// [`annotate!`]: crate::annotate!
#[derive(Debug, Clone, Default)]
pub struct QueryLabels {
    /// Application name.
    pub app: String,

    /// Application version, carried verbatim into the record without
    /// coercion. Callers may pass an integer, a string, or any other
    /// JSON scalar.
    pub app_version: Value,

    /// Name of the parent workflow/DAG this query belongs to.
    pub dag: String,

    /// Name of the logical task within the workflow.
    pub task: String,

    /// Reserved user identity field, empty unless populated.
    pub user: String,

    /// Free-form extension mapping, passed through uninterpreted.
    pub meta: Map<String, Value>,

    /// Re-annotate even when the SQL already carries a valid annotation.
    /// Default: `false` (existing annotations are left untouched).
    pub override_existing: bool,
}

impl QueryLabels {
    /// Create labels for the given application name and version.
    ///
    /// The version accepts anything convertible to a JSON value and is
    /// stored as-is.
    pub fn new(app: impl Into<String>, app_version: impl Into<Value>) -> Self {
        Self {
            app: app.into(),
            app_version: app_version.into(),
            ..Self::default()
        }
    }

    /// Set the workflow/DAG name.
    pub fn with_dag(mut self, dag: impl Into<String>) -> Self {
        self.dag = dag.into();
        self
    }

    /// Set the task name.
    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.task = task.into();
        self
    }

    /// Populate the reserved user field.
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Replace the extension mapping wholesale.
    pub fn with_meta(mut self, meta: Map<String, Value>) -> Self {
        self.meta = meta;
        self
    }

    /// Add a single extension entry.
    pub fn with_meta_entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Force re-annotation of SQL that already carries an annotation.
    pub fn with_override(mut self, enabled: bool) -> Self {
        self.override_existing = enabled;
        self
    }
}
