//! Method rewriting: relocate the original body, synthesize the relay and
//! the interception wrapper
//!
//! For a bound method `m` the rewriter produces three methods:
//!
//! - `m$original` - the untouched original body under a fresh name (only
//!   the name index changes; flags, descriptor, exceptions and code are
//!   preserved bit-for-bit),
//! - `m$relay` - a private synthetic method with `m`'s descriptor that
//!   invokes `m$original`; it is the implementation method of the
//!   `invokedynamic` deferred handle, so the handle captures
//!   `(this, args...)` and exposes a zero-argument callable,
//! - `m` - a new body with the original name and descriptor that builds
//!   the interception descriptor and hands it to the provider.
//!
//! Shape dispatch is a closed set: {niladic, has-args} x {void, valued}.
//! Each shape picks one interception constructor and one functional
//! interface for the deferred handle; there is no varargs path.

use crate::classfile::attribute::{BootstrapMethodEntry, BootstrapMethodsAttribute, RawAttribute};
use crate::classfile::defs::access_flags::{ACC_PRIVATE, ACC_SYNTHETIC};
use crate::classfile::defs::attribute_names;
use crate::classfile::defs::handle_kinds::REF_INVOKE_SPECIAL;
use crate::classfile::{ClassFile, CodeBuilder, ConstantPool, MethodDescriptor, MethodInfo};
use crate::error::{Error, Result};
use crate::weaver::binding::InterceptorBinding;
use crate::weaver::fields::FieldPlan;
use crate::weaver::signatures::{
    Signatures, INTERCEPTION_CLASS, INTERCEPTOR_CLASS, OBJECT_CLASS, ORIGINAL_SUFFIX,
    PROVIDER_CLASS, RELAY_SUFFIX, SIGNATURES,
};

/// The four synthesis shapes, resolved once per method at transform time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodShape {
    NiladicVoid,
    NiladicValued,
    ArgsVoid,
    ArgsValued,
}

impl MethodShape {
    pub fn of(descriptor: &MethodDescriptor) -> Self {
        match (descriptor.params.is_empty(), descriptor.ret.is_some()) {
            (true, false) => MethodShape::NiladicVoid,
            (true, true) => MethodShape::NiladicValued,
            (false, false) => MethodShape::ArgsVoid,
            (false, true) => MethodShape::ArgsValued,
        }
    }

    pub fn has_result(&self) -> bool {
        matches!(self, MethodShape::NiladicValued | MethodShape::ArgsValued)
    }

    pub fn has_args(&self) -> bool {
        matches!(self, MethodShape::ArgsVoid | MethodShape::ArgsValued)
    }

    fn ctor_descriptor(&self, signatures: &'static Signatures) -> &'static str {
        match self {
            MethodShape::NiladicVoid => &signatures.ctor_niladic_void,
            MethodShape::ArgsVoid => &signatures.ctor_args_void,
            MethodShape::NiladicValued => &signatures.ctor_niladic_valued,
            MethodShape::ArgsValued => &signatures.ctor_args_valued,
        }
    }

    /// Functional interface the deferred handle implements, with the name
    /// and type of its single abstract method
    fn deferred_binding(&self, signatures: &'static Signatures) -> (&'static str, &'static str, &'static str) {
        if self.has_result() {
            ("get", &signatures.supplier_descriptor, &signatures.valued_call_type)
        } else {
            ("run", &signatures.runnable_descriptor, &signatures.void_call_type)
        }
    }
}

/// Rewrite one bound method in place, appending the relay and wrapper and
/// registering the bootstrap entry for the deferred handle
pub(crate) fn rewrite_method(
    class: &mut ClassFile,
    method_index: usize,
    binding: &InterceptorBinding,
    plan: &FieldPlan,
    bootstrap: &mut BootstrapMethodsAttribute,
    metafactory_handle: u16,
) -> Result<()> {
    let signatures: &'static Signatures = &SIGNATURES;

    let class_name = class
        .this_class_name()
        .ok_or_else(|| Error::class_format("this_class does not resolve to a class name"))?
        .to_string();
    let binary_name = class_name.replace('/', ".");

    let name = binding.method_name.clone();
    let descriptor_text = binding.method_descriptor.clone();
    let descriptor = MethodDescriptor::parse(&descriptor_text)?;
    let shape = MethodShape::of(&descriptor);

    if binding.interceptors.len() > i16::MAX as usize {
        return Err(Error::unsupported_shape(
            &class_name,
            &name,
            "interceptor chain exceeds the constant operand range",
        ));
    }

    let original_name = format!("{}{}", name, ORIGINAL_SUFFIX);
    let relay_name = format!("{}{}", name, RELAY_SUFFIX);

    // relocate the original body under its new name
    let original_name_index = class.constant_pool.add_utf8(&original_name)?;
    class.methods[method_index].name_index = original_name_index;
    let access_flags = class.methods[method_index].access_flags;
    let exceptions_attribute = {
        let pool = &class.constant_pool;
        class.methods[method_index]
            .attributes
            .iter()
            .find(|a| pool.utf8(a.name_index) == Some(attribute_names::EXCEPTIONS))
            .cloned()
    };

    let relay = synthesize_relay(
        &mut class.constant_pool,
        &class_name,
        &descriptor_text,
        &descriptor,
        &relay_name,
        &original_name,
        exceptions_attribute.clone(),
    )?;
    class.methods.push(relay);

    let bootstrap_index = register_bootstrap_entry(
        &mut class.constant_pool,
        &class_name,
        &relay_name,
        &descriptor_text,
        shape,
        bootstrap,
        metafactory_handle,
        signatures,
    )?;

    let wrapper = synthesize_wrapper(
        &mut class.constant_pool,
        &class_name,
        &binary_name,
        &name,
        &descriptor_text,
        &descriptor,
        shape,
        access_flags,
        binding,
        plan,
        bootstrap_index,
        exceptions_attribute,
        signatures,
    )?;
    class.methods.push(wrapper);

    Ok(())
}

/// The relay loads `this` and every argument, then defers to the
/// relocated original
#[allow(clippy::too_many_arguments)]
fn synthesize_relay(
    pool: &mut ConstantPool,
    class_name: &str,
    descriptor_text: &str,
    descriptor: &MethodDescriptor,
    relay_name: &str,
    original_name: &str,
    exceptions_attribute: Option<RawAttribute>,
) -> Result<MethodInfo> {
    let original_ref = pool.add_method_ref(class_name, original_name, descriptor_text)?;

    let mut builder = CodeBuilder::new(1 + descriptor.arg_slots());
    builder.aload(0);
    let mut slot = 1;
    for param in &descriptor.params {
        builder.load(param, slot);
        slot += param.width();
    }
    builder.invokevirtual(original_ref, descriptor.arg_slots(), descriptor.return_width());
    builder.return_value(descriptor.ret.as_ref());

    let name_index = pool.add_utf8(relay_name)?;
    let descriptor_index = pool.add_utf8(descriptor_text)?;
    let mut method = MethodInfo::new(ACC_PRIVATE | ACC_SYNTHETIC, name_index, descriptor_index);
    method
        .attributes
        .push(builder.into_code_attribute().into_raw(pool)?);
    if let Some(exceptions) = exceptions_attribute {
        method.attributes.push(exceptions);
    }
    Ok(method)
}

/// One bootstrap entry per intercepted method: the metafactory handle plus
/// the (samMethodType, implMethod, instantiatedMethodType) argument triple
#[allow(clippy::too_many_arguments)]
fn register_bootstrap_entry(
    pool: &mut ConstantPool,
    class_name: &str,
    relay_name: &str,
    descriptor_text: &str,
    shape: MethodShape,
    bootstrap: &mut BootstrapMethodsAttribute,
    metafactory_handle: u16,
    signatures: &'static Signatures,
) -> Result<u16> {
    let (_, _, call_type) = shape.deferred_binding(signatures);

    let sam_type = pool.add_method_type(call_type)?;
    let relay_ref = pool.add_method_ref(class_name, relay_name, descriptor_text)?;
    let relay_handle = pool.add_method_handle(REF_INVOKE_SPECIAL, relay_ref)?;

    let index = bootstrap.entries.len() as u16;
    bootstrap.entries.push(BootstrapMethodEntry {
        method_ref: metafactory_handle,
        arguments: vec![sam_type, relay_handle, sam_type],
    });
    Ok(index)
}

/// The wrapper keeps the original name and descriptor so external callers
/// are unaffected; its body builds the interception descriptor and
/// delegates to the provider
#[allow(clippy::too_many_arguments)]
fn synthesize_wrapper(
    pool: &mut ConstantPool,
    class_name: &str,
    binary_name: &str,
    name: &str,
    descriptor_text: &str,
    descriptor: &MethodDescriptor,
    shape: MethodShape,
    access_flags: u16,
    binding: &InterceptorBinding,
    plan: &FieldPlan,
    bootstrap_index: u16,
    exceptions_attribute: Option<RawAttribute>,
    signatures: &'static Signatures,
) -> Result<MethodInfo> {
    let interception_class = pool.add_class(INTERCEPTION_CLASS)?;
    let object_class = pool.add_class(OBJECT_CLASS)?;
    let interceptor_class = pool.add_class(INTERCEPTOR_CLASS)?;
    let class_name_string = pool.add_string(binary_name)?;
    let method_name_string = pool.add_string(name)?;
    let method_descriptor_string = pool.add_string(descriptor_text)?;

    let ctor_descriptor = shape.ctor_descriptor(signatures);
    let ctor_ref = pool.add_method_ref(INTERCEPTION_CLASS, "<init>", ctor_descriptor)?;
    let ctor_arg_slots = MethodDescriptor::parse(ctor_descriptor)?.arg_slots();

    let (deferred_name, deferred_interface, _) = shape.deferred_binding(signatures);
    let captured: String = descriptor.params.iter().map(|p| p.descriptor()).collect();
    let call_site_descriptor = format!("(L{};{}){}", class_name, captured, deferred_interface);
    let invoke_dynamic =
        pool.add_invoke_dynamic(bootstrap_index, deferred_name, &call_site_descriptor)?;

    let provider = plan.provider();
    let provider_ref =
        pool.add_field_ref(class_name, &provider.name, &provider.descriptor)?;
    let (run_name, run_descriptor) = if shape.has_result() {
        ("runWithResult", signatures.run_with_result_descriptor.as_str())
    } else {
        ("run", signatures.run_descriptor.as_str())
    };
    let run_ref = pool.add_interface_method_ref(PROVIDER_CLASS, run_name, run_descriptor)?;

    // resolve interceptor fields up front, in binding order
    let mut interceptor_fields = Vec::with_capacity(binding.interceptors.len());
    for interceptor in &binding.interceptors {
        let field = plan.field_for(interceptor).ok_or_else(|| {
            Error::binding(class_name, name, "interceptor reference missing from field plan")
        })?;
        interceptor_fields.push(pool.add_field_ref(class_name, &field.name, &field.descriptor)?);
    }

    let mut builder = CodeBuilder::new(1 + descriptor.arg_slots());

    builder.new_object(interception_class);
    builder.dup();
    builder.ldc(class_name_string);
    builder.ldc(method_name_string);
    builder.ldc(method_descriptor_string);
    builder.aload(0);

    // positional arguments, boxed into Object[]; omitted entirely for
    // niladic methods (the constructor form without it is distinct)
    if shape.has_args() {
        builder.push_int(descriptor.params.len() as i16);
        builder.anewarray(object_class);
        let mut slot = 1u16;
        for (position, param) in descriptor.params.iter().enumerate() {
            builder.dup();
            builder.push_int(position as i16);
            builder.load(param, slot);
            if let Some(boxing) = param.box_info() {
                let value_of =
                    pool.add_method_ref(boxing.wrapper, "valueOf", boxing.value_of_descriptor)?;
                builder.invokestatic(value_of, param.width(), 1);
            }
            builder.aastore();
            slot += param.width();
        }
    }

    // interceptor array in binding order
    builder.push_int(binding.interceptors.len() as i16);
    builder.anewarray(interceptor_class);
    for (position, field_ref) in interceptor_fields.iter().enumerate() {
        builder.dup();
        builder.push_int(position as i16);
        builder.aload(0);
        builder.getfield(*field_ref, 1);
        builder.aastore();
    }

    // deferred handle bound to (this, args...)
    builder.aload(0);
    let mut slot = 1u16;
    for param in &descriptor.params {
        builder.load(param, slot);
        slot += param.width();
    }
    builder.invokedynamic(invoke_dynamic, 1 + descriptor.arg_slots(), 1);

    builder.invokespecial(ctor_ref, ctor_arg_slots, 0);
    let interception_local = builder.reserve_local(1);
    builder.astore(interception_local);

    builder.aload(0);
    builder.getfield(provider_ref, 1);
    builder.aload(interception_local);
    builder.invokeinterface(run_ref, 1, if shape.has_result() { 1 } else { 0 });

    if let Some(ret) = &descriptor.ret {
        match ret.box_info() {
            Some(boxing) => {
                // narrow through the primitive wrapper
                let wrapper_class = pool.add_class(boxing.wrapper)?;
                let unbox = pool.add_method_ref(
                    boxing.wrapper,
                    boxing.unbox_method,
                    boxing.unbox_descriptor,
                )?;
                builder.checkcast(wrapper_class);
                builder.invokevirtual(unbox, 0, ret.width());
            }
            None => {
                let target = ret.class_constant_name().ok_or_else(|| {
                    Error::unsupported_shape(class_name, name, "return type has no class form")
                })?;
                let target_class = pool.add_class(target)?;
                builder.checkcast(target_class);
            }
        }
    }
    builder.return_value(descriptor.ret.as_ref());

    let name_index = pool.add_utf8(name)?;
    let descriptor_index = pool.add_utf8(descriptor_text)?;
    let mut method = MethodInfo::new(access_flags, name_index, descriptor_index);
    method
        .attributes
        .push(builder.into_code_attribute().into_raw(pool)?);
    if let Some(exceptions) = exceptions_attribute {
        method.attributes.push(exceptions);
    }
    Ok(method)
}
