//! Core classfile structure: the in-memory model one transform pass owns
//!
//! The model keeps the input's constant pool indices stable, so untouched
//! members serialize back byte-for-byte. Serialization is a single
//! mechanical pass; nothing patches already-emitted bytes.

use super::attribute::RawAttribute;
use super::constpool::ConstantPool;
use super::defs::MAGIC;
use super::field::FieldInfo;
use super::method::MethodInfo;

#[derive(Debug)]
pub struct ClassFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub constant_pool: ConstantPool,
    pub access_flags: u16,
    pub this_class: u16,
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
    pub attributes: Vec<RawAttribute>,
}

impl ClassFile {
    /// Internal name of this class, e.g. `com/example/Service`
    pub fn this_class_name(&self) -> Option<&str> {
        self.constant_pool.class_name(self.this_class)
    }

    pub fn method_name(&self, method: &MethodInfo) -> Option<&str> {
        self.constant_pool.utf8(method.name_index)
    }

    pub fn method_descriptor(&self, method: &MethodInfo) -> Option<&str> {
        self.constant_pool.utf8(method.descriptor_index)
    }

    pub fn field_name(&self, field: &FieldInfo) -> Option<&str> {
        self.constant_pool.utf8(field.name_index)
    }

    pub fn find_method(&self, name: &str, descriptor: &str) -> Option<usize> {
        self.methods.iter().position(|m| {
            self.method_name(m) == Some(name) && self.method_descriptor(m) == Some(descriptor)
        })
    }

    /// Whether any field or method already carries this name
    pub fn has_member_named(&self, name: &str) -> bool {
        self.fields.iter().any(|f| self.field_name(f) == Some(name))
            || self.methods.iter().any(|m| self.method_name(m) == Some(name))
    }

    /// Index of a class-level attribute by name
    pub fn find_attribute(&self, name: &str) -> Option<usize> {
        self.attributes
            .iter()
            .position(|a| self.constant_pool.utf8(a.name_index) == Some(name))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAGIC.to_be_bytes());
        bytes.extend_from_slice(&self.minor_version.to_be_bytes());
        bytes.extend_from_slice(&self.major_version.to_be_bytes());
        bytes.extend_from_slice(&self.constant_pool.to_bytes());
        bytes.extend_from_slice(&self.access_flags.to_be_bytes());
        bytes.extend_from_slice(&self.this_class.to_be_bytes());
        bytes.extend_from_slice(&self.super_class.to_be_bytes());
        bytes.extend_from_slice(&(self.interfaces.len() as u16).to_be_bytes());
        for interface in &self.interfaces {
            bytes.extend_from_slice(&interface.to_be_bytes());
        }
        bytes.extend_from_slice(&(self.fields.len() as u16).to_be_bytes());
        for field in &self.fields {
            bytes.extend_from_slice(&field.to_bytes());
        }
        bytes.extend_from_slice(&(self.methods.len() as u16).to_be_bytes());
        for method in &self.methods {
            bytes.extend_from_slice(&method.to_bytes());
        }
        bytes.extend_from_slice(&(self.attributes.len() as u16).to_be_bytes());
        for attribute in &self.attributes {
            bytes.extend_from_slice(&attribute.to_bytes());
        }
        bytes
    }
}
