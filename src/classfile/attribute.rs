//! Attribute structures for Java class files
//!
//! Attributes the weaver does not touch are carried as raw bytes and
//! re-emitted verbatim; only the attributes it has to create or extend
//! (`Code`, `BootstrapMethods`, `InnerClasses`, `RuntimeVisibleAnnotations`)
//! get structured forms.

use crate::classfile::constpool::{ConstPoolError, ConstantPool};
use crate::classfile::defs::attribute_names;
use crate::classfile::reader::Cursor;
use crate::error::Result;

/// An attribute carried as-is: name index plus uninterpreted payload
#[derive(Debug, Clone)]
pub struct RawAttribute {
    pub name_index: u16,
    pub info: Vec<u8>,
}

impl RawAttribute {
    pub fn new(name_index: u16, info: Vec<u8>) -> Self {
        Self { name_index, info }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&self.name_index.to_be_bytes());
        bytes.extend_from_slice(&(self.info.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&self.info);
        bytes
    }
}

#[derive(Debug, Clone)]
pub struct ExceptionTableEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    pub catch_type: u16,
}

impl ExceptionTableEntry {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&self.start_pc.to_be_bytes());
        bytes.extend_from_slice(&self.end_pc.to_be_bytes());
        bytes.extend_from_slice(&self.handler_pc.to_be_bytes());
        bytes.extend_from_slice(&self.catch_type.to_be_bytes());
        bytes
    }
}

/// A Code attribute the weaver synthesized. Bodies are branch-free, so no
/// StackMapTable entries are required; max_stack/max_locals come from the
/// code builder.
#[derive(Debug)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub exception_table: Vec<ExceptionTableEntry>,
    pub attributes: Vec<RawAttribute>,
}

impl CodeAttribute {
    pub fn new(max_stack: u16, max_locals: u16, code: Vec<u8>) -> Self {
        Self {
            max_stack,
            max_locals,
            code,
            exception_table: Vec::new(),
            attributes: Vec::new(),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&self.max_stack.to_be_bytes());
        bytes.extend_from_slice(&self.max_locals.to_be_bytes());
        bytes.extend_from_slice(&(self.code.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&self.code);
        bytes.extend_from_slice(&(self.exception_table.len() as u16).to_be_bytes());
        for entry in &self.exception_table {
            bytes.extend_from_slice(&entry.to_bytes());
        }
        bytes.extend_from_slice(&(self.attributes.len() as u16).to_be_bytes());
        for attribute in &self.attributes {
            bytes.extend_from_slice(&attribute.to_bytes());
        }
        bytes
    }

    pub fn into_raw(self, pool: &mut ConstantPool) -> std::result::Result<RawAttribute, ConstPoolError> {
        let name_index = pool.add_utf8(attribute_names::CODE)?;
        Ok(RawAttribute::new(name_index, self.to_bytes()))
    }
}

/// One bootstrap method entry: a method handle plus its static arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapMethodEntry {
    pub method_ref: u16,
    pub arguments: Vec<u16>,
}

/// The BootstrapMethods attribute (JVMS 4.7.23); present exactly once per
/// class, created on demand when the original class has none
#[derive(Debug, Default)]
pub struct BootstrapMethodsAttribute {
    pub entries: Vec<BootstrapMethodEntry>,
}

impl BootstrapMethodsAttribute {
    pub fn parse(info: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(info);
        let count = cursor.read_u16()?;
        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let method_ref = cursor.read_u16()?;
            let argument_count = cursor.read_u16()?;
            let mut arguments = Vec::with_capacity(argument_count as usize);
            for _ in 0..argument_count {
                arguments.push(cursor.read_u16()?);
            }
            entries.push(BootstrapMethodEntry { method_ref, arguments });
        }
        Ok(Self { entries })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(self.entries.len() as u16).to_be_bytes());
        for entry in &self.entries {
            bytes.extend_from_slice(&entry.method_ref.to_be_bytes());
            bytes.extend_from_slice(&(entry.arguments.len() as u16).to_be_bytes());
            for argument in &entry.arguments {
                bytes.extend_from_slice(&argument.to_be_bytes());
            }
        }
        bytes
    }
}

#[derive(Debug, Clone)]
pub struct InnerClassEntry {
    pub inner_class_index: u16,
    pub outer_class_index: u16,
    pub inner_name_index: u16,
    pub access_flags: u16,
}

/// The InnerClasses attribute (JVMS 4.7.6); the weaver only ever appends
/// the `MethodHandles$Lookup` entry the lambda bootstrap requires
#[derive(Debug, Default)]
pub struct InnerClassesAttribute {
    pub entries: Vec<InnerClassEntry>,
}

impl InnerClassesAttribute {
    pub fn parse(info: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(info);
        let count = cursor.read_u16()?;
        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            entries.push(InnerClassEntry {
                inner_class_index: cursor.read_u16()?,
                outer_class_index: cursor.read_u16()?,
                inner_name_index: cursor.read_u16()?,
                access_flags: cursor.read_u16()?,
            });
        }
        Ok(Self { entries })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(self.entries.len() as u16).to_be_bytes());
        for entry in &self.entries {
            bytes.extend_from_slice(&entry.inner_class_index.to_be_bytes());
            bytes.extend_from_slice(&entry.outer_class_index.to_be_bytes());
            bytes.extend_from_slice(&entry.inner_name_index.to_be_bytes());
            bytes.extend_from_slice(&entry.access_flags.to_be_bytes());
        }
        bytes
    }
}

/// Build a RuntimeVisibleAnnotations attribute holding a single marker
/// annotation, optionally with one string element (JVMS 4.7.16).
///
/// This is how synthetic fields expose their injection metadata: the
/// external container recognizes the annotation and, for by-name fields,
/// reads the resolution key from the element value.
pub fn make_annotation_attribute(
    pool: &mut ConstantPool,
    annotation_descriptor: &str,
    element: Option<(&str, &str)>,
) -> std::result::Result<RawAttribute, ConstPoolError> {
    let name_index = pool.add_utf8(attribute_names::RUNTIME_VISIBLE_ANNOTATIONS)?;
    let type_index = pool.add_utf8(annotation_descriptor)?;

    let mut info = Vec::new();
    info.extend_from_slice(&1u16.to_be_bytes()); // num_annotations
    info.extend_from_slice(&type_index.to_be_bytes());
    match element {
        Some((element_name, value)) => {
            let element_name_index = pool.add_utf8(element_name)?;
            let value_index = pool.add_utf8(value)?;
            info.extend_from_slice(&1u16.to_be_bytes()); // num_element_value_pairs
            info.extend_from_slice(&element_name_index.to_be_bytes());
            info.push(b's'); // element_value tag: String constant
            info.extend_from_slice(&value_index.to_be_bytes());
        }
        None => {
            info.extend_from_slice(&0u16.to_be_bytes());
        }
    }
    Ok(RawAttribute::new(name_index, info))
}
