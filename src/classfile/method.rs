//! MethodInfo structure and serialization

use super::attribute::RawAttribute;
use super::defs::access_flags::{ACC_ABSTRACT, ACC_NATIVE, ACC_STATIC};

#[derive(Debug)]
pub struct MethodInfo {
    pub access_flags: u16,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Vec<RawAttribute>,
}

impl MethodInfo {
    pub fn new(access_flags: u16, name_index: u16, descriptor_index: u16) -> Self {
        Self {
            access_flags,
            name_index,
            descriptor_index,
            attributes: Vec::new(),
        }
    }

    pub fn is_static(&self) -> bool {
        self.access_flags & ACC_STATIC != 0
    }

    /// Abstract and native methods carry no Code attribute
    pub fn has_body(&self) -> bool {
        self.access_flags & (ACC_ABSTRACT | ACC_NATIVE) == 0
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&self.access_flags.to_be_bytes());
        bytes.extend_from_slice(&self.name_index.to_be_bytes());
        bytes.extend_from_slice(&self.descriptor_index.to_be_bytes());
        bytes.extend_from_slice(&(self.attributes.len() as u16).to_be_bytes());
        for attribute in &self.attributes {
            bytes.extend_from_slice(&attribute.to_bytes());
        }
        bytes
    }
}
