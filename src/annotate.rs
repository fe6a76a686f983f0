//! The annotation entry points.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::callsite::CallSite;
use crate::codec;
use crate::ident;
use crate::labels::QueryLabels;
use crate::record::AnnotationRecord;

/// Marker identifying an annotated query. Detection and downstream parsers
/// both key on this exact string.
pub const MARKER: &str = "INTERMIX_ID:";

// Matches the marker inside a block comment at the head of the statement.
static ANNOTATION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*/\*[^*]*INTERMIX_ID:").unwrap());

/// Whether the SQL already carries an annotation marker.
pub fn is_annotated(sql: &str) -> bool {
    ANNOTATION_REGEX.is_match(sql)
}

/// Annotate a query, capturing the call site at the macro invocation point.
///
/// This is the primary entry point: it records the enclosing module, file,
/// line, function, and `impl` type of the caller.
///
/// ```rust
/// use intermix::QueryLabels;
///
/// let labels = QueryLabels::new("billing-api", 3)
///     .with_dag("nightly_rollup")
///     .with_task("sum_invoices");
/// let sql = intermix::annotate!("select * from invoices;", labels);
/// assert!(sql.starts_with("/* INTERMIX_ID: "));
/// assert!(sql.ends_with("select * from invoices;"));
/// ```
#[macro_export]
macro_rules! annotate {
    ($sql:expr, $labels:expr) => {
        $crate::annotate_with(
            ::std::convert::AsRef::<str>::as_ref(&$sql),
            &$labels,
            $crate::callsite!(),
        )
    };
}

/// Annotate a query from a plain function call.
///
/// Recovers file and line through `#[track_caller]`; function and type
/// names are not available on this path and are left empty. Prefer
/// [`annotate!`] when full call-site fields matter.
#[track_caller]
pub fn annotate(sql: &str, labels: &QueryLabels) -> String {
    let site = CallSite::from_location(std::panic::Location::caller());
    annotate_with(sql, labels, site)
}

/// Annotate a query with an explicitly supplied call site.
///
/// If the SQL already carries an annotation and `labels.override_existing`
/// is false, the input is returned unchanged. Otherwise the output is
///
/// ```text
/// /* INTERMIX_ID: <8-hex id> <token> */ <original sql>
/// ```
///
/// with the original SQL appended verbatim after exactly one space. This
/// path never fails and never panics on any input text.
pub fn annotate_with(sql: &str, labels: &QueryLabels, site: CallSite) -> String {
    if !labels.override_existing && is_annotated(sql) {
        tracing::debug!(app = %labels.app, "query already annotated, left untouched");
        return sql.to_string();
    }

    let record = AnnotationRecord::assemble(labels, &site);
    let token = codec::encode(&record);
    let id = ident::new_identifier();

    tracing::debug!(
        id = %id,
        app = %labels.app,
        dag = %labels.dag,
        task = %labels.task,
        "annotated query"
    );

    format!("/* {MARKER} {id} {token} */ {sql}")
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    const SQL: &str = "select * from users;";

    fn labels() -> QueryLabels {
        QueryLabels::new("test_app", 1)
            .with_dag("in_a_class")
            .with_task("class_method")
    }

    fn decode_embedded(annotated: &str) -> AnnotationRecord {
        codec::decode(codec::extract_token(annotated).expect("no token found")).unwrap()
    }

    struct ReportJob {
        labels: QueryLabels,
    }

    impl ReportJob {
        fn annotate_from_method(&self, sql: &str) -> (String, u32) {
            let line = line!() + 1;
            let annotated = crate::annotate!(sql, self.labels);
            (annotated, line)
        }

        fn annotate_from_assoc(sql: &str, labels: &QueryLabels) -> String {
            crate::annotate!(sql, labels)
        }
    }

    fn annotate_from_bare_fn(sql: &str, labels: &QueryLabels) -> String {
        crate::annotate!(sql, labels)
    }

    #[test]
    fn test_instance_method_call_site() {
        let job = ReportJob { labels: labels() };
        let (annotated, line) = job.annotate_from_method(SQL);
        let record = decode_embedded(&annotated);

        assert_eq!(record.function, "annotate_from_method");
        assert_eq!(record.classname, "ReportJob");
        assert_eq!(record.file, "annotate.rs");
        assert_eq!(record.module, module_path!());
        assert_eq!(record.linenumber, line.to_string());
        assert_eq!(record.app, "test_app");
        assert_eq!(record.app_ver, Value::from(1));
        assert_eq!(record.dag, "in_a_class");
        assert_eq!(record.task, "class_method");
        assert_eq!(record.user, "");
        assert!(record.meta.is_empty());
    }

    #[test]
    fn test_associated_function_call_site() {
        // Capture is lexical: a self-less associated function still reports
        // its impl type.
        let annotated = ReportJob::annotate_from_assoc(SQL, &labels());
        let record = decode_embedded(&annotated);
        assert_eq!(record.function, "annotate_from_assoc");
        assert_eq!(record.classname, "ReportJob");
    }

    #[test]
    fn test_bare_function_call_site() {
        let annotated = annotate_from_bare_fn(SQL, &labels().with_dag("bare").with_task("function"));
        let record = decode_embedded(&annotated);
        assert_eq!(record.function, "annotate_from_bare_fn");
        assert_eq!(record.classname, "");
        assert_eq!(record.dag, "bare");
        assert_eq!(record.task, "function");
    }

    #[test]
    fn test_nested_function_call_site() {
        fn foo() -> String {
            crate::annotate!(
                "select * from users;",
                QueryLabels::new("test_app", "2").with_dag("in_a_class").with_task("nested")
            )
        }

        let record = decode_embedded(&foo());
        assert_eq!(record.function, "foo");
        assert_eq!(record.classname, "");
        assert_eq!(record.app_ver, Value::from("2"));
    }

    #[test]
    fn test_track_caller_fn_degrades_to_file_and_line() {
        let annotated = annotate(SQL, &labels());
        let record = decode_embedded(&annotated);
        assert_eq!(record.file, "annotate.rs");
        assert_eq!(record.function, "");
        assert_eq!(record.classname, "");
        assert_ne!(record.linenumber, "0");
    }

    #[test]
    fn test_plugin_identity_fields() {
        let record = decode_embedded(&crate::annotate!(SQL, labels()));
        assert_eq!(record.plugin, crate::PLUGIN_NAME);
        assert_eq!(record.plugin_ver, crate::PLUGIN_VERSION);
        assert_eq!(record.format, "intermix");
        assert_eq!(record.version, "1");
        assert!(chrono::DateTime::parse_from_rfc3339(&record.at).is_ok());
    }

    #[test]
    fn test_already_annotated_left_untouched() {
        let sql = "/* INTERMIX_ID: deadbeef */ select * from users;";
        let labels = QueryLabels::new("test_app\u{0203}", 1).with_dag("test€").with_task("nested");
        assert_eq!(crate::annotate!(sql, labels), sql);
    }

    #[test]
    fn test_override_forces_reannotation() {
        let sql = "/* INTERMIX_ID: deadbeef */ select * from users;";
        let labels = QueryLabels::new("test_app\u{0203}", 1)
            .with_dag("test€")
            .with_task("overridden")
            .with_override(true);

        let annotated = crate::annotate!(sql, labels);
        assert_ne!(annotated, sql);
        assert!(annotated.ends_with(sql));

        let record = decode_embedded(&annotated);
        assert_eq!(record.app, "test_app\u{0203}");
        assert_eq!(record.dag, "test€");
        assert_eq!(record.task, "overridden");
        assert_eq!(record.function, "test_override_forces_reannotation");
    }

    #[test]
    fn test_annotation_is_idempotent_by_default() {
        let first = crate::annotate!(SQL, labels());
        let second = crate::annotate!(first, labels());
        assert_eq!(second, first);
    }

    #[test]
    fn test_original_sql_preserved_verbatim() {
        let annotated = crate::annotate!(SQL, labels());
        assert!(annotated.starts_with("/* INTERMIX_ID: "));
        assert!(annotated.ends_with(&format!("*/ {SQL}")));
    }

    #[test]
    fn test_unicode_sql_round_trips() {
        let sql = "select € from users;";
        let annotated = crate::annotate!(sql, labels());
        assert!(annotated.ends_with(&format!("*/ {sql}")));
        // The embedded record survives encode/decode alongside the
        // multi-byte SQL text.
        let record = decode_embedded(&annotated);
        assert_eq!(record.app, "test_app");
    }

    #[test]
    fn test_plain_comment_is_not_mistaken_for_annotation() {
        let sql = "/*               */;";
        let annotated = crate::annotate!(sql, labels().with_task("test_empty_SQL"));
        assert!(annotated.starts_with("/* INTERMIX_ID: "));
        assert!(annotated.ends_with(&format!("*/ {sql}")));
        assert_eq!(decode_embedded(&annotated).task, "test_empty_SQL");
    }

    #[test]
    fn test_meta_mapping_is_carried_through() {
        let labels = labels()
            .with_meta_entry("team", "data-eng")
            .with_meta_entry("retries", 3);
        let record = decode_embedded(&crate::annotate!(SQL, labels));
        assert_eq!(record.meta.get("team"), Some(&Value::from("data-eng")));
        assert_eq!(record.meta.get("retries"), Some(&Value::from(3)));
    }

    #[test]
    fn test_detection() {
        assert!(is_annotated("/* INTERMIX_ID: deadbeef */ select 1;"));
        assert!(is_annotated("  \n/* INTERMIX_ID: deadbeef */ select 1;"));
        assert!(is_annotated("/* note INTERMIX_ID: deadbeef */ select 1;"));
        assert!(!is_annotated("select 1;"));
        assert!(!is_annotated("select 'INTERMIX_ID:' from users;"));
        assert!(!is_annotated("/* hint */ /* INTERMIX_ID: deadbeef */ select 1;"));
    }

    #[test]
    fn test_fresh_identifier_and_timestamp_per_call() {
        // One shared call site so only the identifier and timestamp vary.
        let outputs: Vec<String> = (0..2).map(|_| crate::annotate!(SQL, labels())).collect();
        assert_ne!(outputs[0], outputs[1]);

        let mut a = decode_embedded(&outputs[0]);
        let mut b = decode_embedded(&outputs[1]);
        a.at = String::new();
        b.at = String::new();
        assert_eq!(a, b);
    }
}
