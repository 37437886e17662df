//! Well-known runtime signatures the synthesized code calls
//!
//! Resolved once at first use into an immutable table, the same way the
//! original runtime collaborators are resolved in a one-shot static
//! initializer. The provider, interceptor and interception types are
//! external collaborators; the weaver only ever references them by name.

use once_cell::sync::Lazy;

/// Field holding the external execution-chain provider
pub const PROVIDER_FIELD: &str = "$$provider";

/// Prefix for deduplicated interceptor fields; a monotonically numbered
/// suffix is appended by the field planner
pub const INTERCEPTOR_FIELD_PREFIX: &str = "$$interceptor$";

/// Suffix appended to a relocated method body
pub const ORIGINAL_SUFFIX: &str = "$original";

/// Suffix of the synthesized relay method the deferred handle binds to
pub const RELAY_SUFFIX: &str = "$relay";

/// Internal name of the provider interface (external collaborator)
pub const PROVIDER_CLASS: &str = "classweave/runtime/InterceptionProvider";

/// Internal name of the common interceptor capability
pub const INTERCEPTOR_CLASS: &str = "classweave/runtime/MethodInterceptor";

/// Internal name of the interception descriptor class
pub const INTERCEPTION_CLASS: &str = "classweave/runtime/Interception";

/// Descriptor of the injection marker annotation
pub const INJECT_ANNOTATION_DESCRIPTOR: &str = "Lclassweave/runtime/Inject;";

/// Element name carrying the logical bean name on by-name injections
pub const INJECT_NAME_ELEMENT: &str = "name";

pub const LAMBDA_METAFACTORY_CLASS: &str = "java/lang/invoke/LambdaMetafactory";
pub const METAFACTORY_METHOD: &str = "metafactory";

pub const METHOD_HANDLES_CLASS: &str = "java/lang/invoke/MethodHandles";
pub const LOOKUP_CLASS: &str = "java/lang/invoke/MethodHandles$Lookup";
pub const LOOKUP_INNER_NAME: &str = "Lookup";

pub const RUNNABLE_CLASS: &str = "java/lang/Runnable";
pub const SUPPLIER_CLASS: &str = "java/util/function/Supplier";

pub const OBJECT_CLASS: &str = "java/lang/Object";

/// Composed descriptors, built once
pub struct Signatures {
    pub provider_descriptor: String,
    pub interceptor_descriptor: String,
    pub interceptor_array_descriptor: String,
    pub runnable_descriptor: String,
    pub supplier_descriptor: String,
    /// `run(Interception)` for void chains
    pub run_descriptor: String,
    /// `runWithResult(Interception)` for valued chains
    pub run_with_result_descriptor: String,
    /// Interception constructors, one per method shape
    pub ctor_niladic_void: String,
    pub ctor_args_void: String,
    pub ctor_niladic_valued: String,
    pub ctor_args_valued: String,
    pub metafactory_descriptor: String,
    /// Functional method types of the deferred handle
    pub void_call_type: String,
    pub valued_call_type: String,
}

pub static SIGNATURES: Lazy<Signatures> = Lazy::new(|| {
    let provider_descriptor = format!("L{};", PROVIDER_CLASS);
    let interceptor_descriptor = format!("L{};", INTERCEPTOR_CLASS);
    let interceptor_array_descriptor = format!("[L{};", INTERCEPTOR_CLASS);
    let interception_descriptor = format!("L{};", INTERCEPTION_CLASS);
    let runnable_descriptor = format!("L{};", RUNNABLE_CLASS);
    let supplier_descriptor = format!("L{};", SUPPLIER_CLASS);

    // (className, methodName, methodDescriptor, receiver, [args,] interceptors, deferred)
    let head = "(Ljava/lang/String;Ljava/lang/String;Ljava/lang/String;Ljava/lang/Object;";
    let args = "[Ljava/lang/Object;";
    let ctor_niladic_void = format!("{}{}{})V", head, interceptor_array_descriptor, runnable_descriptor);
    let ctor_args_void = format!("{}{}{}{})V", head, args, interceptor_array_descriptor, runnable_descriptor);
    let ctor_niladic_valued = format!("{}{}{})V", head, interceptor_array_descriptor, supplier_descriptor);
    let ctor_args_valued = format!("{}{}{}{})V", head, args, interceptor_array_descriptor, supplier_descriptor);

    Signatures {
        provider_descriptor,
        interceptor_descriptor,
        interceptor_array_descriptor,
        runnable_descriptor,
        supplier_descriptor,
        run_descriptor: format!("({})V", interception_descriptor),
        run_with_result_descriptor: format!("({})Ljava/lang/Object;", interception_descriptor),
        ctor_niladic_void,
        ctor_args_void,
        ctor_niladic_valued,
        ctor_args_valued,
        metafactory_descriptor: "(Ljava/lang/invoke/MethodHandles$Lookup;Ljava/lang/String;\
                                 Ljava/lang/invoke/MethodType;Ljava/lang/invoke/MethodType;\
                                 Ljava/lang/invoke/MethodHandle;Ljava/lang/invoke/MethodType;)\
                                 Ljava/lang/invoke/CallSite;"
            .to_string(),
        void_call_type: "()V".to_string(),
        valued_call_type: "()Ljava/lang/Object;".to_string(),
    }
});
