//! Interception bindings: which methods get which interceptors
//!
//! Bindings are produced by an external matching stage and are read-only
//! once a transform begins. Interceptor order is significant: it is the
//! invocation order of the chain.

use crate::weaver::signatures::SIGNATURES;

/// A reference to one interceptor instance.
///
/// Named references resolve through a logical bean name at injection time
/// and are type-erased to the common interceptor capability; typed
/// references resolve by concrete class. Equality (same variant, same key)
/// drives field deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InterceptorRef {
    /// Logical bean name
    Named(String),
    /// Binary class name, e.g. `com.example.TimingInterceptor`
    Typed(String),
}

impl InterceptorRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn typed(class: impl Into<String>) -> Self {
        Self::Typed(class.into())
    }

    /// Declared field descriptor for an instance of this interceptor
    pub fn field_descriptor(&self) -> String {
        match self {
            InterceptorRef::Named(_) => SIGNATURES.interceptor_descriptor.clone(),
            InterceptorRef::Typed(class) => format!("L{};", class.replace('.', "/")),
        }
    }
}

/// One target method together with its ordered interceptor chain
#[derive(Debug, Clone)]
pub struct InterceptorBinding {
    pub method_name: String,
    pub method_descriptor: String,
    pub interceptors: Vec<InterceptorRef>,
}

impl InterceptorBinding {
    pub fn new(
        method_name: impl Into<String>,
        method_descriptor: impl Into<String>,
        interceptors: Vec<InterceptorRef>,
    ) -> Self {
        Self {
            method_name: method_name.into(),
            method_descriptor: method_descriptor.into(),
            interceptors,
        }
    }
}
