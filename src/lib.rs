//! # intermix
//!
//! SQL query annotation for correlating raw database traffic with
//! application-level context.
//!
//! This crate prepends a machine-readable, human-invisible metadata comment
//! to outgoing SQL text, identifying the call site, application, and
//! logical task that issued the query. A downstream monitoring backend can
//! then answer "which function, which workflow task, which app version
//! emitted this query" from the SQL traffic alone.
//!
//! ## Features
//!
//! - **One-line annotation**: the [`annotate!`] macro captures the call
//!   site (module, file, line, function, `impl` type) at compile time
//! - **Idempotent by default**: SQL that already carries an annotation is
//!   left untouched unless override is requested
//! - **Comment-safe encoding**: the payload is base64 inside fixed framing
//!   and can never terminate the surrounding block comment
//! - **Never in the way**: the forward path cannot fail; unresolved
//!   call-site fields degrade to empty values instead of raising
//! - **SeaORM integration** (feature `sea-orm`): wrap a connection so every
//!   outgoing statement is annotated automatically
//!
//! ## Quick Start
//!
//! ```rust
//! use intermix::QueryLabels;
//!
//! let labels = QueryLabels::new("billing-api", 3)
//!     .with_dag("nightly_rollup")
//!     .with_task("sum_invoices");
//!
//! let sql = intermix::annotate!("select * from invoices;", labels);
//! assert!(sql.starts_with("/* INTERMIX_ID: "));
//! assert!(sql.ends_with("select * from invoices;"));
//! ```
//!
//! ## Annotated form
//!
//! ```text
//! /* INTERMIX_ID: <8-hex id> $imx$<base64 payload>$ */ <original sql>
//! ```
//!
//! The 8-hex identifier is for at-a-glance correlation in logs; the framed
//! token decodes to the full metadata record (see [`codec`] for the framing
//! constants and [`decode`] for the inverse).
//!
//! ## Record fields
//!
//! | Field | Description |
//! |-------|-------------|
//! | `module`, `file`, `function`, `classname`, `linenumber` | Call site |
//! | `app`, `app_ver`, `dag`, `task`, `meta`, `user` | Caller-supplied labels |
//! | `plugin`, `plugin_ver`, `format`, `version` | Fixed plugin identity |
//! | `at` | Generation timestamp (RFC 3339, UTC) |

mod annotate;
mod callsite;
pub mod codec;
#[cfg(feature = "sea-orm")]
mod connection;
mod ident;
mod labels;
mod record;

pub use annotate::{annotate, annotate_with, is_annotated, MARKER};
pub use callsite::CallSite;
pub use codec::{decode, encode, extract_token, DecodeError, TOKEN_FOOTER, TOKEN_HEADER};
#[cfg(feature = "sea-orm")]
pub use connection::{AnnotateExt, AnnotatingConnection};
pub use ident::new_identifier;
pub use labels::QueryLabels;
pub use record::{
    AnnotationRecord, FORMAT_NAME, FORMAT_VERSION, PLUGIN_NAME, PLUGIN_VERSION,
};

/// Prelude module for convenient imports
pub mod prelude {
    #[cfg(feature = "sea-orm")]
    pub use crate::{AnnotateExt, AnnotatingConnection};
    pub use crate::{AnnotationRecord, CallSite, QueryLabels};
}
