//! Per-class transform driver
//!
//! One call per class: validate the bindings, plan the synthetic fields,
//! rewrite every bound method, then emit the final class definition. The
//! transform is a pure function of (bytes, bindings) and either completes
//! atomically or fails without producing partial output, so callers may
//! parallelize across classes freely.

use crate::classfile::attribute::{
    make_annotation_attribute, BootstrapMethodsAttribute, InnerClassEntry, InnerClassesAttribute,
    RawAttribute,
};
use crate::classfile::defs::access_flags::{
    ACC_FINAL, ACC_PRIVATE, ACC_PUBLIC, ACC_STATIC, ACC_SYNTHETIC,
};
use crate::classfile::defs::attribute_names;
use crate::classfile::defs::handle_kinds::REF_INVOKE_STATIC;
use crate::classfile::defs::{CONSTRUCTOR_METHOD_NAME, STATIC_INITIALIZER_METHOD_NAME};
use crate::classfile::{ClassFile, ClassReader, FieldInfo};
use crate::error::{Error, Result};
use crate::weaver::binding::InterceptorBinding;
use crate::weaver::fields::{FieldPlan, InjectionKind, SyntheticField};
use crate::weaver::rewrite::rewrite_method;
use crate::weaver::signatures::{
    INJECT_ANNOTATION_DESCRIPTOR, INJECT_NAME_ELEMENT, LAMBDA_METAFACTORY_CLASS, LOOKUP_CLASS,
    LOOKUP_INNER_NAME, METAFACTORY_METHOD, METHOD_HANDLES_CLASS, ORIGINAL_SUFFIX, PROVIDER_FIELD,
    RELAY_SUFFIX, SIGNATURES,
};

/// Result of one class transform
#[derive(Debug)]
pub enum TransformOutcome {
    /// No method of this class is intercepted; the original bytes stand
    PassThrough,
    /// The rewritten class plus the synthetic fields an external injection
    /// container must populate at instance construction time
    Transformed {
        bytes: Vec<u8>,
        fields: Vec<SyntheticField>,
    },
}

/// Transform one class.
///
/// Bindings must target existing, non-static methods with bodies; any
/// violation aborts the whole-class transform before a single byte is
/// rewritten, leaving the input as the caller's safe fallback.
pub fn transform(bytes: &[u8], bindings: &[InterceptorBinding]) -> Result<TransformOutcome> {
    if bindings.is_empty() {
        // deliberate fast path: most classes in a large codebase are not
        // targeted and weaving has nonzero cost
        log::trace!("no intercepted methods, passing class through unchanged");
        return Ok(TransformOutcome::PassThrough);
    }

    let mut class = ClassReader::new(bytes).read()?;
    let class_name = class
        .this_class_name()
        .ok_or_else(|| Error::class_format("this_class does not resolve to a class name"))?
        .to_string();

    validate_bindings(&class, &class_name, bindings)?;

    let fields = weave(&mut class, bindings).map_err(|e| e.for_class(&class_name))?;
    log::debug!(
        "woven class {}: {} intercepted method(s), {} synthetic field(s)",
        class_name,
        bindings.len(),
        fields.len()
    );

    Ok(TransformOutcome::Transformed {
        bytes: class.to_bytes(),
        fields,
    })
}

fn validate_bindings(
    class: &ClassFile,
    class_name: &str,
    bindings: &[InterceptorBinding],
) -> Result<()> {
    if class.has_member_named(PROVIDER_FIELD) {
        return Err(Error::binding(
            class_name,
            "*",
            "class has already been transformed",
        ));
    }

    let mut seen: Vec<(&str, &str)> = Vec::with_capacity(bindings.len());
    for binding in bindings {
        let name = binding.method_name.as_str();
        let descriptor = binding.method_descriptor.as_str();
        let err = |reason: &str| Err(Error::binding(class_name, name, reason));

        if binding.interceptors.is_empty() {
            return err("interceptor list is empty");
        }
        if name == CONSTRUCTOR_METHOD_NAME || name == STATIC_INITIALIZER_METHOD_NAME {
            return err("constructors and initializers cannot be intercepted");
        }
        if seen.contains(&(name, descriptor)) {
            return err("method is bound more than once");
        }
        seen.push((name, descriptor));

        let index = match class.find_method(name, descriptor) {
            Some(index) => index,
            None => return err("method not found on class"),
        };
        let method = &class.methods[index];
        if method.is_static() {
            return err("static methods cannot be intercepted");
        }
        if !method.has_body() {
            return err("abstract and native methods cannot be intercepted");
        }
        if class.has_member_named(&format!("{}{}", name, ORIGINAL_SUFFIX)) {
            return err("method has already been woven");
        }
        if class.has_member_named(&format!("{}{}", name, RELAY_SUFFIX)) {
            return err("synthesized relay name collides with an existing member");
        }
    }
    Ok(())
}

fn weave(class: &mut ClassFile, bindings: &[InterceptorBinding]) -> Result<Vec<SyntheticField>> {
    let plan = FieldPlan::build(class, bindings);

    // bootstrap metadata lives in exactly one attribute per class, created
    // here when the original had none
    let existing_bootstrap = class.find_attribute(attribute_names::BOOTSTRAP_METHODS);
    let mut bootstrap = match existing_bootstrap {
        Some(index) => BootstrapMethodsAttribute::parse(&class.attributes[index].info)?,
        None => BootstrapMethodsAttribute::default(),
    };

    let metafactory_ref = class.constant_pool.add_method_ref(
        LAMBDA_METAFACTORY_CLASS,
        METAFACTORY_METHOD,
        &SIGNATURES.metafactory_descriptor,
    )?;
    let metafactory_handle = class
        .constant_pool
        .add_method_handle(REF_INVOKE_STATIC, metafactory_ref)?;

    for binding in bindings {
        let index = class
            .find_method(&binding.method_name, &binding.method_descriptor)
            .ok_or_else(|| {
                Error::binding(
                    class.this_class_name().unwrap_or_default(),
                    &binding.method_name,
                    "method not found on class",
                )
            })?;
        rewrite_method(class, index, binding, &plan, &mut bootstrap, metafactory_handle)?;
    }

    declare_fields(class, &plan)?;
    ensure_lookup_inner_class(class)?;
    store_bootstrap_attribute(class, existing_bootstrap, &bootstrap)?;

    Ok(plan.into_fields())
}

/// Declare every planned field with its injection metadata attached
fn declare_fields(class: &mut ClassFile, plan: &FieldPlan) -> Result<()> {
    for field in plan.fields() {
        let pool = &mut class.constant_pool;
        let name_index = pool.add_utf8(&field.name)?;
        let descriptor_index = pool.add_utf8(&field.descriptor)?;
        let annotation = match &field.kind {
            InjectionKind::ByName { name } => make_annotation_attribute(
                pool,
                INJECT_ANNOTATION_DESCRIPTOR,
                Some((INJECT_NAME_ELEMENT, name)),
            )?,
            InjectionKind::ByType => {
                make_annotation_attribute(pool, INJECT_ANNOTATION_DESCRIPTOR, None)?
            }
        };
        let mut info = FieldInfo::new(ACC_PRIVATE | ACC_SYNTHETIC, name_index, descriptor_index);
        info.attributes.push(annotation);
        class.fields.push(info);
    }
    Ok(())
}

/// The lambda bootstrap requires the `MethodHandles$Lookup` inner-class
/// record; add it exactly once if the original class lacks it
fn ensure_lookup_inner_class(class: &mut ClassFile) -> Result<()> {
    let existing = class.find_attribute(attribute_names::INNER_CLASSES);
    let mut inner_classes = match existing {
        Some(index) => InnerClassesAttribute::parse(&class.attributes[index].info)?,
        None => InnerClassesAttribute::default(),
    };

    let already_present = inner_classes.entries.iter().any(|entry| {
        class.constant_pool.class_name(entry.inner_class_index) == Some(LOOKUP_CLASS)
    });
    if already_present {
        return Ok(());
    }

    let pool = &mut class.constant_pool;
    let entry = InnerClassEntry {
        inner_class_index: pool.add_class(LOOKUP_CLASS)?,
        outer_class_index: pool.add_class(METHOD_HANDLES_CLASS)?,
        inner_name_index: pool.add_utf8(LOOKUP_INNER_NAME)?,
        access_flags: ACC_PUBLIC | ACC_FINAL | ACC_STATIC,
    };
    inner_classes.entries.push(entry);

    let info = inner_classes.to_bytes();
    match existing {
        Some(index) => class.attributes[index].info = info,
        None => {
            let name_index = pool.add_utf8(attribute_names::INNER_CLASSES)?;
            class.attributes.push(RawAttribute::new(name_index, info));
        }
    }
    Ok(())
}

fn store_bootstrap_attribute(
    class: &mut ClassFile,
    existing: Option<usize>,
    bootstrap: &BootstrapMethodsAttribute,
) -> Result<()> {
    let info = bootstrap.to_bytes();
    match existing {
        Some(index) => class.attributes[index].info = info,
        None => {
            let name_index = class
                .constant_pool
                .add_utf8(attribute_names::BOOTSTRAP_METHODS)?;
            class.attributes.push(RawAttribute::new(name_index, info));
        }
    }
    Ok(())
}
