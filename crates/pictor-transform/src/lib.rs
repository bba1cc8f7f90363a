#![forbid(unsafe_code)]

//! URL rewriting for query-based image transformation services.
//!
//! The engine recognizes URLs of the shape
//! `https://{sub}.{service}/{account}/upload/[{transforms}/]{public_id}`
//! and rewrites them with a requested [`TransformSpec`](pictor_core::TransformSpec).
//! Anything that does not match the grammar is treated as an opaque
//! third-party URL and passed through unchanged; that is a normal case,
//! not an error.

mod engine;
mod tokens;

pub use crate::engine::{canonicalize, is_transformable, transform, TransformOutcome};
