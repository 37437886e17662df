//! classweave - load-time method interception weaver for JVM class files
//!
//! Rewrites already-compiled classes so that selected instance methods run
//! through an ordered interceptor chain. For every bound method the weaver
//! relocates the original body, synthesizes a relay for deferred
//! invocation, and synthesizes a wrapper with the original signature that
//! hands an interception descriptor to an external provider. Synthetic
//! fields for the interceptors and the provider are declared on the class
//! and reported back for an external dependency-injection container to
//! populate.
//!
//! ## Architecture
//!
//! - **classfile**: class file parsing, in-memory model, constant pool
//!   with append-only deduplication, straight-line code assembly and
//!   serialization
//! - **weaver**: binding model, interceptor field planning, method
//!   rewriting and the per-class transform driver
//!
//! ## Flow
//!
//! ```text
//! bindings + class bytes -> transform -> PassThrough
//!                                      | Transformed { bytes, fields }
//! ```
//!
//! Each invocation is independent and stateless across classes; the
//! transform either completes atomically or fails without output.

pub mod classfile;
pub mod error;
pub mod weaver;

pub use error::{Error, Result};
pub use weaver::{
    transform, InjectionKind, InterceptorBinding, InterceptorRef, SyntheticField, TransformOutcome,
};
