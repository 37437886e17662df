//! Constant pool and constants for Java class files
//!
//! The pool keeps its entries at their original 1-based indices so that
//! method bodies and attributes copied from an input class stay valid
//! without remapping. New constants are appended with deduplication
//! against everything already present.

use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during constant pool operations
#[derive(Error, Debug)]
pub enum ConstPoolError {
    #[error("constant pool is out of space")]
    OutOfSpace,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class(u16),
    String(u16),
    FieldRef(u16, u16),
    MethodRef(u16, u16),
    InterfaceMethodRef(u16, u16),
    NameAndType(u16, u16),
    MethodHandle(u8, u16),
    MethodType(u16),
    Dynamic(u16, u16),
    InvokeDynamic(u16, u16),
    Module(u16),
    Package(u16),
    /// Occupies index 0 and the phantom slot after a Long or Double;
    /// serializes to nothing
    Unusable,
}

pub mod constant_tags {
    pub const CONSTANT_UTF8: u8 = 1;
    pub const CONSTANT_INTEGER: u8 = 3;
    pub const CONSTANT_FLOAT: u8 = 4;
    pub const CONSTANT_LONG: u8 = 5;
    pub const CONSTANT_DOUBLE: u8 = 6;
    pub const CONSTANT_CLASS: u8 = 7;
    pub const CONSTANT_STRING: u8 = 8;
    pub const CONSTANT_FIELDREF: u8 = 9;
    pub const CONSTANT_METHODREF: u8 = 10;
    pub const CONSTANT_INTERFACEMETHODREF: u8 = 11;
    pub const CONSTANT_NAMEANDTYPE: u8 = 12;
    pub const CONSTANT_METHODHANDLE: u8 = 15;
    pub const CONSTANT_METHODTYPE: u8 = 16;
    pub const CONSTANT_DYNAMIC: u8 = 17;
    pub const CONSTANT_INVOKEDYNAMIC: u8 = 18;
    pub const CONSTANT_MODULE: u8 = 19;
    pub const CONSTANT_PACKAGE: u8 = 20;
}

impl Constant {
    /// Two slots for Long and Double, one for everything else (JVMS 4.4.5)
    pub fn slots(&self) -> u16 {
        match self {
            Constant::Long(_) | Constant::Double(_) => 2,
            _ => 1,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        use constant_tags::*;
        let mut bytes = Vec::new();
        match self {
            Constant::Utf8(value) => {
                bytes.push(CONSTANT_UTF8);
                let utf8_bytes = value.as_bytes();
                bytes.extend_from_slice(&(utf8_bytes.len() as u16).to_be_bytes());
                bytes.extend_from_slice(utf8_bytes);
            }
            Constant::Integer(value) => {
                bytes.push(CONSTANT_INTEGER);
                bytes.extend_from_slice(&value.to_be_bytes());
            }
            Constant::Float(value) => {
                bytes.push(CONSTANT_FLOAT);
                bytes.extend_from_slice(&value.to_be_bytes());
            }
            Constant::Long(value) => {
                bytes.push(CONSTANT_LONG);
                bytes.extend_from_slice(&value.to_be_bytes());
            }
            Constant::Double(value) => {
                bytes.push(CONSTANT_DOUBLE);
                bytes.extend_from_slice(&value.to_be_bytes());
            }
            Constant::Class(name_index) => {
                bytes.push(CONSTANT_CLASS);
                bytes.extend_from_slice(&name_index.to_be_bytes());
            }
            Constant::String(string_index) => {
                bytes.push(CONSTANT_STRING);
                bytes.extend_from_slice(&string_index.to_be_bytes());
            }
            Constant::FieldRef(class_index, name_and_type_index) => {
                bytes.push(CONSTANT_FIELDREF);
                bytes.extend_from_slice(&class_index.to_be_bytes());
                bytes.extend_from_slice(&name_and_type_index.to_be_bytes());
            }
            Constant::MethodRef(class_index, name_and_type_index) => {
                bytes.push(CONSTANT_METHODREF);
                bytes.extend_from_slice(&class_index.to_be_bytes());
                bytes.extend_from_slice(&name_and_type_index.to_be_bytes());
            }
            Constant::InterfaceMethodRef(class_index, name_and_type_index) => {
                bytes.push(CONSTANT_INTERFACEMETHODREF);
                bytes.extend_from_slice(&class_index.to_be_bytes());
                bytes.extend_from_slice(&name_and_type_index.to_be_bytes());
            }
            Constant::NameAndType(name_index, descriptor_index) => {
                bytes.push(CONSTANT_NAMEANDTYPE);
                bytes.extend_from_slice(&name_index.to_be_bytes());
                bytes.extend_from_slice(&descriptor_index.to_be_bytes());
            }
            Constant::MethodHandle(reference_kind, reference_index) => {
                bytes.push(CONSTANT_METHODHANDLE);
                bytes.push(*reference_kind);
                bytes.extend_from_slice(&reference_index.to_be_bytes());
            }
            Constant::MethodType(descriptor_index) => {
                bytes.push(CONSTANT_METHODTYPE);
                bytes.extend_from_slice(&descriptor_index.to_be_bytes());
            }
            Constant::Dynamic(bootstrap_index, name_and_type_index) => {
                bytes.push(CONSTANT_DYNAMIC);
                bytes.extend_from_slice(&bootstrap_index.to_be_bytes());
                bytes.extend_from_slice(&name_and_type_index.to_be_bytes());
            }
            Constant::InvokeDynamic(bootstrap_index, name_and_type_index) => {
                bytes.push(CONSTANT_INVOKEDYNAMIC);
                bytes.extend_from_slice(&bootstrap_index.to_be_bytes());
                bytes.extend_from_slice(&name_and_type_index.to_be_bytes());
            }
            Constant::Module(name_index) => {
                bytes.push(CONSTANT_MODULE);
                bytes.extend_from_slice(&name_index.to_be_bytes());
            }
            Constant::Package(name_index) => {
                bytes.push(CONSTANT_PACKAGE);
                bytes.extend_from_slice(&name_index.to_be_bytes());
            }
            Constant::Unusable => {}
        }
        bytes
    }
}

/// Deduplication key for the structural constant kinds the weaver appends
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Key {
    Utf8(String),
    Integer(i32),
    Class(u16),
    String(u16),
    NameAndType(u16, u16),
    FieldRef(u16, u16),
    MethodRef(u16, u16),
    InterfaceMethodRef(u16, u16),
    MethodHandle(u8, u16),
    MethodType(u16),
    InvokeDynamic(u16, u16),
}

fn key_of(constant: &Constant) -> Option<Key> {
    match constant {
        Constant::Utf8(v) => Some(Key::Utf8(v.clone())),
        Constant::Integer(v) => Some(Key::Integer(*v)),
        Constant::Class(n) => Some(Key::Class(*n)),
        Constant::String(s) => Some(Key::String(*s)),
        Constant::NameAndType(n, d) => Some(Key::NameAndType(*n, *d)),
        Constant::FieldRef(c, nt) => Some(Key::FieldRef(*c, *nt)),
        Constant::MethodRef(c, nt) => Some(Key::MethodRef(*c, *nt)),
        Constant::InterfaceMethodRef(c, nt) => Some(Key::InterfaceMethodRef(*c, *nt)),
        Constant::MethodHandle(k, r) => Some(Key::MethodHandle(*k, *r)),
        Constant::MethodType(d) => Some(Key::MethodType(*d)),
        Constant::InvokeDynamic(b, nt) => Some(Key::InvokeDynamic(*b, *nt)),
        _ => None,
    }
}

#[derive(Debug)]
pub struct ConstantPool {
    /// Index 0 holds an `Unusable` placeholder so vector position equals
    /// constant pool index
    entries: Vec<Constant>,
    lookup: HashMap<Key, u16>,
}

impl ConstantPool {
    pub fn new() -> Self {
        Self {
            entries: vec![Constant::Unusable],
            lookup: HashMap::new(),
        }
    }

    /// Rebuild a pool from parsed entries, seeding the dedup index.
    ///
    /// `entries` must already contain the index-0 placeholder and the
    /// phantom slots after Long/Double entries. When two parsed entries
    /// are structurally equal the first one wins; both indices stay valid.
    pub fn from_entries(entries: Vec<Constant>) -> Self {
        let mut lookup = HashMap::new();
        for (index, constant) in entries.iter().enumerate() {
            if let Some(key) = key_of(constant) {
                lookup.entry(key).or_insert(index as u16);
            }
        }
        Self { entries, lookup }
    }

    /// Number of pool slots including the index-0 placeholder; this is the
    /// `constant_pool_count` value of the class file
    pub fn count(&self) -> u16 {
        self.entries.len() as u16
    }

    pub fn get(&self, index: u16) -> Option<&Constant> {
        self.entries.get(index as usize)
    }

    /// Resolve a Utf8 entry
    pub fn utf8(&self, index: u16) -> Option<&str> {
        match self.get(index)? {
            Constant::Utf8(value) => Some(value),
            _ => None,
        }
    }

    /// Resolve the name of a Class entry
    pub fn class_name(&self, index: u16) -> Option<&str> {
        match self.get(index)? {
            Constant::Class(name_index) => self.utf8(*name_index),
            _ => None,
        }
    }

    fn push(&mut self, constant: Constant) -> Result<u16, ConstPoolError> {
        if let Some(key) = key_of(&constant) {
            if let Some(&index) = self.lookup.get(&key) {
                return Ok(index);
            }
            let index = self.reserve(constant.slots())?;
            self.lookup.insert(key, index);
            self.entries[index as usize] = constant;
            Ok(index)
        } else {
            let index = self.reserve(constant.slots())?;
            self.entries[index as usize] = constant;
            Ok(index)
        }
    }

    fn reserve(&mut self, slots: u16) -> Result<u16, ConstPoolError> {
        let index = self.entries.len();
        if index + slots as usize > u16::MAX as usize {
            return Err(ConstPoolError::OutOfSpace);
        }
        for _ in 0..slots {
            self.entries.push(Constant::Unusable);
        }
        Ok(index as u16)
    }

    pub fn add_utf8(&mut self, value: &str) -> Result<u16, ConstPoolError> {
        self.push(Constant::Utf8(value.to_string()))
    }

    pub fn add_class(&mut self, name: &str) -> Result<u16, ConstPoolError> {
        let name_index = self.add_utf8(name)?;
        self.push(Constant::Class(name_index))
    }

    pub fn add_string(&mut self, value: &str) -> Result<u16, ConstPoolError> {
        let utf8_index = self.add_utf8(value)?;
        self.push(Constant::String(utf8_index))
    }

    pub fn add_name_and_type(&mut self, name: &str, descriptor: &str) -> Result<u16, ConstPoolError> {
        let name_index = self.add_utf8(name)?;
        let descriptor_index = self.add_utf8(descriptor)?;
        self.push(Constant::NameAndType(name_index, descriptor_index))
    }

    pub fn add_field_ref(&mut self, class: &str, name: &str, descriptor: &str) -> Result<u16, ConstPoolError> {
        let class_index = self.add_class(class)?;
        let name_and_type_index = self.add_name_and_type(name, descriptor)?;
        self.push(Constant::FieldRef(class_index, name_and_type_index))
    }

    pub fn add_method_ref(&mut self, class: &str, name: &str, descriptor: &str) -> Result<u16, ConstPoolError> {
        let class_index = self.add_class(class)?;
        let name_and_type_index = self.add_name_and_type(name, descriptor)?;
        self.push(Constant::MethodRef(class_index, name_and_type_index))
    }

    pub fn add_interface_method_ref(&mut self, class: &str, name: &str, descriptor: &str) -> Result<u16, ConstPoolError> {
        let class_index = self.add_class(class)?;
        let name_and_type_index = self.add_name_and_type(name, descriptor)?;
        self.push(Constant::InterfaceMethodRef(class_index, name_and_type_index))
    }

    pub fn add_method_type(&mut self, descriptor: &str) -> Result<u16, ConstPoolError> {
        let descriptor_index = self.add_utf8(descriptor)?;
        self.push(Constant::MethodType(descriptor_index))
    }

    pub fn add_method_handle(&mut self, reference_kind: u8, reference_index: u16) -> Result<u16, ConstPoolError> {
        self.push(Constant::MethodHandle(reference_kind, reference_index))
    }

    pub fn add_invoke_dynamic(
        &mut self,
        bootstrap_index: u16,
        name: &str,
        descriptor: &str,
    ) -> Result<u16, ConstPoolError> {
        let name_and_type_index = self.add_name_and_type(name, descriptor)?;
        self.push(Constant::InvokeDynamic(bootstrap_index, name_and_type_index))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&self.count().to_be_bytes());
        for constant in &self.entries {
            bytes.extend_from_slice(&constant.to_bytes());
        }
        bytes
    }
}

impl Default for ConstantPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_one_based() {
        let mut pool = ConstantPool::new();
        let first = pool.add_utf8("Hello").expect("pool full");
        assert_eq!(first, 1);
        assert_eq!(pool.count(), 2);
    }

    #[test]
    fn duplicate_entries_are_merged() {
        let mut pool = ConstantPool::new();
        let a = pool.add_class("java/lang/Object").expect("pool full");
        let b = pool.add_class("java/lang/Object").expect("pool full");
        assert_eq!(a, b);
        // one Utf8 plus one Class
        assert_eq!(pool.count(), 3);
    }

    #[test]
    fn long_occupies_two_slots() {
        let mut pool = ConstantPool::new();
        let index = pool.push(Constant::Long(7)).expect("pool full");
        assert_eq!(index, 1);
        let next = pool.add_utf8("after").expect("pool full");
        assert_eq!(next, 3);
    }

    #[test]
    fn parsed_entries_seed_the_dedup_index() {
        let entries = vec![
            Constant::Unusable,
            Constant::Utf8("java/lang/Object".to_string()),
            Constant::Class(1),
        ];
        let mut pool = ConstantPool::from_entries(entries);
        let class = pool.add_class("java/lang/Object").expect("pool full");
        assert_eq!(class, 2);
        assert_eq!(pool.count(), 3);
    }
}
