//! Call-site capture and function-path parsing.
//!
//! Rust has no runtime stack introspection, so the call site is captured at
//! compile time instead: the [`callsite!`] macro records `module_path!`,
//! `file!`, `line!` and the fully qualified path of the enclosing function
//! (via the type name of a nested helper `fn`), and [`CallSite::from_parts`]
//! parses that path down to a function name and, when the function sits
//! inside an `impl` block, the implementing type's name.

use std::panic::Location;

/// Where an annotation request originated.
///
/// Every field degrades independently: a component that cannot be resolved
/// is left empty (`line` becomes 0) rather than failing the annotation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallSite {
    /// Module path containing the call site (`my_app::jobs`).
    pub module: String,
    /// Base name of the source file (`jobs.rs`).
    pub file: String,
    /// Name of the function or method that invoked the annotator.
    pub function: String,
    /// Name of the enclosing `impl` type, empty for free functions.
    pub classname: String,
    /// 1-based source line of the call expression, 0 when unresolved.
    pub line: u32,
}

impl CallSite {
    /// A fully degraded call site: all fields empty, line 0.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Build a call site from the pieces the [`callsite!`] macro captures.
    ///
    /// `fn_path` is the type name of a helper `fn` declared inside the
    /// caller, e.g. `my_app::jobs::Report::build::__here`; the trailing
    /// helper segment is discarded, as are `{{closure}}` segments, so a
    /// closure reports its enclosing function.
    pub fn from_parts(module: &str, file: &str, line: u32, fn_path: &str) -> Self {
        let (function, classname) = parse_fn_path(fn_path);
        Self {
            module: module.to_string(),
            file: base_name(file).to_string(),
            function,
            classname,
            line,
        }
    }

    /// Build a partial call site from a `#[track_caller]` location.
    ///
    /// Only file and line are available on this path; function and
    /// classname stay empty.
    pub fn from_location(location: &Location<'_>) -> Self {
        Self {
            file: base_name(location.file()).to_string(),
            line: location.line(),
            ..Self::default()
        }
    }

    /// The line number rendered as text, `"0"` when unresolved.
    pub fn linenumber(&self) -> String {
        self.line.to_string()
    }
}

/// Captures the current call site.
///
/// Expands to a [`CallSite`] carrying the enclosing module, file base name,
/// line number, function name, and `impl` type name. Must appear inside a
/// function body.
#[macro_export]
macro_rules! callsite {
    () => {{
        fn __here() {}
        $crate::CallSite::from_parts(
            ::core::module_path!(),
            ::core::file!(),
            ::core::line!(),
            ::core::any::type_name_of_val(&__here),
        )
    }};
}

fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Extract `(function, classname)` from a helper-fn type name.
fn parse_fn_path(fn_path: &str) -> (String, String) {
    let mut segments = split_path(fn_path);

    // Drop the `__here` helper itself, then any closure frames between the
    // helper and the named function that contains it.
    segments.pop();
    while segments.last().is_some_and(|s| *s == "{{closure}}") {
        segments.pop();
    }

    let Some(function) = segments.pop() else {
        return (String::new(), String::new());
    };

    let classname = segments.last().map(|s| impl_type_name(s)).unwrap_or_default();
    (function.to_string(), classname)
}

/// Split a path on `::`, treating bracketed qualifications such as
/// `<Type as Trait>` as single segments.
fn split_path(path: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let bytes = path.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            b'>' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                segments.push(&path[start..i]);
                i += 2;
                start = i;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    segments.push(&path[start..]);
    segments
}

/// Resolve the implementing type named by the segment enclosing a function,
/// or empty when the segment is a plain module.
///
/// Handles three renderings: a bare type name (`Report`), a qualified
/// `<Type as Trait>` segment, and an `<impl Trait for Type>` segment.
fn impl_type_name(segment: &str) -> String {
    let segment = segment.trim();

    if let Some(inner) = segment.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
        let type_path = if let Some(rest) = inner.strip_prefix("impl ") {
            match rest.split_once(" for ") {
                Some((_, ty)) => ty,
                None => return String::new(),
            }
        } else {
            match inner.split_once(" as ") {
                Some((ty, _)) => ty,
                None => inner,
            }
        };
        return last_type_segment(type_path);
    }

    if segment.chars().next().is_some_and(char::is_uppercase) {
        return strip_generics(segment).to_string();
    }

    String::new()
}

fn last_type_segment(type_path: &str) -> String {
    split_path(strip_generics(type_path.trim()))
        .last()
        .map(|s| strip_generics(s).to_string())
        .unwrap_or_default()
}

fn strip_generics(s: &str) -> &str {
    s.split_once('<').map(|(head, _)| head).unwrap_or(s).trim_end()
}
