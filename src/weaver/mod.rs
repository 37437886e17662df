//! Method interception weaver
//!
//! Rewrites selected instance methods of a compiled class so that calls
//! run through a configurable interceptor chain, without touching source
//! code and without requiring the class to implement any interface.
//!
//! Pipeline per class: bindings + raw bytes -> transform -> (pass-through
//! | rewrite bound methods + plan fields) -> emit. Instance construction,
//! field injection and chain execution are external collaborators.

pub mod binding;
pub mod fields;
pub mod rewrite;
pub mod signatures;
pub mod transform;

pub use binding::{InterceptorBinding, InterceptorRef};
pub use fields::{InjectionKind, SyntheticField};
pub use rewrite::MethodShape;
pub use transform::{transform, TransformOutcome};
