//! Interceptor field planning
//!
//! Deduplicates interceptor references across all intercepted methods of a
//! class into a minimal set of synthetic fields, assigns deterministic
//! collision-free names, and records the metadata an external injection
//! container needs to populate them. Planning is pure: field names are a
//! function of the ordered binding list, never of object identity. No
//! bytecode is emitted here.

use std::collections::HashMap;

use crate::classfile::ClassFile;
use crate::weaver::binding::{InterceptorBinding, InterceptorRef};
use crate::weaver::signatures::{INTERCEPTOR_FIELD_PREFIX, PROVIDER_FIELD, SIGNATURES};

/// How the external container resolves a synthetic field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectionKind {
    /// Resolve by logical bean name
    ByName { name: String },
    /// Resolve by the field's declared type
    ByType,
}

/// A field the weaver adds to the class, to be populated externally at
/// instance construction time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticField {
    pub name: String,
    pub descriptor: String,
    pub kind: InjectionKind,
}

/// The planned synthetic fields of one class: the provider field first,
/// then one field per distinct interceptor reference in first-occurrence
/// order
#[derive(Debug)]
pub struct FieldPlan {
    fields: Vec<SyntheticField>,
    by_ref: HashMap<InterceptorRef, usize>,
}

impl FieldPlan {
    pub fn build(class: &ClassFile, bindings: &[InterceptorBinding]) -> Self {
        let mut fields = vec![SyntheticField {
            name: PROVIDER_FIELD.to_string(),
            descriptor: SIGNATURES.provider_descriptor.clone(),
            kind: InjectionKind::ByType,
        }];
        let mut by_ref = HashMap::new();

        let mut next_number = 1u32;
        for binding in bindings {
            for interceptor in &binding.interceptors {
                if by_ref.contains_key(interceptor) {
                    continue;
                }
                let name = loop {
                    let candidate = format!("{}{}", INTERCEPTOR_FIELD_PREFIX, next_number);
                    next_number += 1;
                    if !class.has_member_named(&candidate) {
                        break candidate;
                    }
                };
                let kind = match interceptor {
                    InterceptorRef::Named(bean) => InjectionKind::ByName { name: bean.clone() },
                    InterceptorRef::Typed(_) => InjectionKind::ByType,
                };
                by_ref.insert(interceptor.clone(), fields.len());
                fields.push(SyntheticField {
                    name,
                    descriptor: interceptor.field_descriptor(),
                    kind,
                });
            }
        }

        Self { fields, by_ref }
    }

    /// The field a given interceptor reference resolved to
    pub fn field_for(&self, interceptor: &InterceptorRef) -> Option<&SyntheticField> {
        self.by_ref.get(interceptor).map(|&i| &self.fields[i])
    }

    pub fn provider(&self) -> &SyntheticField {
        &self.fields[0]
    }

    /// All planned fields in declaration order
    pub fn fields(&self) -> &[SyntheticField] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<SyntheticField> {
        self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classfile::reader::ClassReader;

    fn empty_class() -> ClassFile {
        // minimal class built through the crate's own pool/model types
        use crate::classfile::constpool::ConstantPool;
        let mut pool = ConstantPool::new();
        let this_name = pool.add_class("com/example/Empty").expect("pool");
        let super_name = pool.add_class("java/lang/Object").expect("pool");
        let class = ClassFile {
            minor_version: 0,
            major_version: crate::classfile::defs::major_versions::JAVA_8,
            constant_pool: pool,
            access_flags: crate::classfile::defs::access_flags::ACC_PUBLIC,
            this_class: this_name,
            super_class: super_name,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
        };
        // round-trip through the serializer to keep the fixture honest
        ClassReader::new(&class.to_bytes()).read().expect("reread")
    }

    #[test]
    fn shared_reference_maps_to_one_field() {
        let class = empty_class();
        let bindings = vec![
            InterceptorBinding::new("a", "()V", vec![InterceptorRef::named("audit")]),
            InterceptorBinding::new("b", "()V", vec![InterceptorRef::named("audit")]),
        ];
        let plan = FieldPlan::build(&class, &bindings);
        // provider plus exactly one interceptor field
        assert_eq!(plan.fields().len(), 2);
        assert_eq!(plan.fields()[1].name, "$$interceptor$1");
    }

    #[test]
    fn distinct_references_get_numbered_fields() {
        let class = empty_class();
        let bindings = vec![InterceptorBinding::new(
            "a",
            "()V",
            vec![
                InterceptorRef::named("audit"),
                InterceptorRef::typed("com.example.Timing"),
                InterceptorRef::named("audit"),
            ],
        )];
        let plan = FieldPlan::build(&class, &bindings);
        assert_eq!(plan.fields().len(), 3);
        assert_eq!(plan.fields()[1].name, "$$interceptor$1");
        assert_eq!(plan.fields()[2].name, "$$interceptor$2");
        assert_eq!(plan.fields()[2].descriptor, "Lcom/example/Timing;");
    }

    #[test]
    fn naming_is_idempotent_across_runs() {
        let class = empty_class();
        let bindings = vec![InterceptorBinding::new(
            "a",
            "()V",
            vec![InterceptorRef::named("x"), InterceptorRef::named("y")],
        )];
        let first = FieldPlan::build(&class, &bindings);
        let second = FieldPlan::build(&empty_class(), &bindings.clone());
        assert_eq!(first.fields(), second.fields());
    }
}
