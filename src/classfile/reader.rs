//! Class file parser
//!
//! Parses raw class bytes into the [`ClassFile`] model. The constant pool
//! is fully decoded (the weaver needs name resolution and an appendable,
//! deduplicating pool); member and class attributes are kept as raw bytes
//! since the weaver re-emits everything it does not touch verbatim.

use super::attribute::RawAttribute;
use super::class::ClassFile;
use super::constpool::{constant_tags::*, Constant, ConstantPool};
use super::defs::MAGIC;
use super::field::FieldInfo;
use super::method::MethodInfo;
use crate::error::{Error, Result};

/// Bounds-checked big-endian byte cursor
pub(crate) struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn truncated(&self) -> Error {
        Error::class_format(format!("unexpected end of class file at offset {}", self.pos))
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8> {
        let value = *self.bytes.get(self.pos).ok_or_else(|| self.truncated())?;
        self.pos += 1;
        Ok(value)
    }

    pub(crate) fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub(crate) fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(len).ok_or_else(|| self.truncated())?;
        let slice = self.bytes.get(self.pos..end).ok_or_else(|| self.truncated())?;
        self.pos = end;
        Ok(slice)
    }
}

pub struct ClassReader<'a> {
    cursor: Cursor<'a>,
}

impl<'a> ClassReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(bytes),
        }
    }

    pub fn read(mut self) -> Result<ClassFile> {
        let magic = self.cursor.read_u32()?;
        if magic != MAGIC {
            return Err(Error::class_format(format!(
                "bad magic number 0x{:08X}",
                magic
            )));
        }
        let minor_version = self.cursor.read_u16()?;
        let major_version = self.cursor.read_u16()?;
        let constant_pool = self.read_constant_pool()?;

        let access_flags = self.cursor.read_u16()?;
        let this_class = self.cursor.read_u16()?;
        let super_class = self.cursor.read_u16()?;

        let interface_count = self.cursor.read_u16()?;
        let mut interfaces = Vec::with_capacity(interface_count as usize);
        for _ in 0..interface_count {
            interfaces.push(self.cursor.read_u16()?);
        }

        let field_count = self.cursor.read_u16()?;
        let mut fields = Vec::with_capacity(field_count as usize);
        for _ in 0..field_count {
            fields.push(self.read_field()?);
        }

        let method_count = self.cursor.read_u16()?;
        let mut methods = Vec::with_capacity(method_count as usize);
        for _ in 0..method_count {
            methods.push(self.read_method()?);
        }

        let attributes = self.read_attributes()?;

        Ok(ClassFile {
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    fn read_constant_pool(&mut self) -> Result<ConstantPool> {
        let count = self.cursor.read_u16()?;
        let mut entries = Vec::with_capacity(count as usize);
        entries.push(Constant::Unusable);
        let mut index = 1u16;
        while index < count {
            let constant = self.read_constant()?;
            let slots = constant.slots();
            entries.push(constant);
            if slots == 2 {
                entries.push(Constant::Unusable);
            }
            index += slots;
        }
        Ok(ConstantPool::from_entries(entries))
    }

    fn read_constant(&mut self) -> Result<Constant> {
        let tag = self.cursor.read_u8()?;
        let constant = match tag {
            CONSTANT_UTF8 => {
                let len = self.cursor.read_u16()? as usize;
                let bytes = self.cursor.read_bytes(len)?;
                let value = String::from_utf8(bytes.to_vec()).map_err(|_| {
                    Error::class_format("constant pool Utf8 entry is not valid UTF-8")
                })?;
                Constant::Utf8(value)
            }
            CONSTANT_INTEGER => Constant::Integer(self.cursor.read_u32()? as i32),
            CONSTANT_FLOAT => Constant::Float(f32::from_bits(self.cursor.read_u32()?)),
            CONSTANT_LONG => {
                let high = self.cursor.read_u32()? as u64;
                let low = self.cursor.read_u32()? as u64;
                Constant::Long(((high << 32) | low) as i64)
            }
            CONSTANT_DOUBLE => {
                let high = self.cursor.read_u32()? as u64;
                let low = self.cursor.read_u32()? as u64;
                Constant::Double(f64::from_bits((high << 32) | low))
            }
            CONSTANT_CLASS => Constant::Class(self.cursor.read_u16()?),
            CONSTANT_STRING => Constant::String(self.cursor.read_u16()?),
            CONSTANT_FIELDREF => {
                Constant::FieldRef(self.cursor.read_u16()?, self.cursor.read_u16()?)
            }
            CONSTANT_METHODREF => {
                Constant::MethodRef(self.cursor.read_u16()?, self.cursor.read_u16()?)
            }
            CONSTANT_INTERFACEMETHODREF => {
                Constant::InterfaceMethodRef(self.cursor.read_u16()?, self.cursor.read_u16()?)
            }
            CONSTANT_NAMEANDTYPE => {
                Constant::NameAndType(self.cursor.read_u16()?, self.cursor.read_u16()?)
            }
            CONSTANT_METHODHANDLE => {
                Constant::MethodHandle(self.cursor.read_u8()?, self.cursor.read_u16()?)
            }
            CONSTANT_METHODTYPE => Constant::MethodType(self.cursor.read_u16()?),
            CONSTANT_DYNAMIC => {
                Constant::Dynamic(self.cursor.read_u16()?, self.cursor.read_u16()?)
            }
            CONSTANT_INVOKEDYNAMIC => {
                Constant::InvokeDynamic(self.cursor.read_u16()?, self.cursor.read_u16()?)
            }
            CONSTANT_MODULE => Constant::Module(self.cursor.read_u16()?),
            CONSTANT_PACKAGE => Constant::Package(self.cursor.read_u16()?),
            _ => {
                return Err(Error::class_format(format!(
                    "unknown constant pool tag {}",
                    tag
                )))
            }
        };
        Ok(constant)
    }

    fn read_field(&mut self) -> Result<FieldInfo> {
        let access_flags = self.cursor.read_u16()?;
        let name_index = self.cursor.read_u16()?;
        let descriptor_index = self.cursor.read_u16()?;
        let attributes = self.read_attributes()?;
        Ok(FieldInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn read_method(&mut self) -> Result<MethodInfo> {
        let access_flags = self.cursor.read_u16()?;
        let name_index = self.cursor.read_u16()?;
        let descriptor_index = self.cursor.read_u16()?;
        let attributes = self.read_attributes()?;
        Ok(MethodInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn read_attributes(&mut self) -> Result<Vec<RawAttribute>> {
        let count = self.cursor.read_u16()?;
        let mut attributes = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let name_index = self.cursor.read_u16()?;
            let len = self.cursor.read_u32()? as usize;
            let info = self.cursor.read_bytes(len)?.to_vec();
            attributes.push(RawAttribute::new(name_index, info));
        }
        Ok(attributes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_magic() {
        let err = ClassReader::new(&[0x00, 0x01, 0x02, 0x03, 0, 0, 0, 0]).read();
        assert!(matches!(err, Err(Error::ClassFormat { .. })));
    }

    #[test]
    fn rejects_truncated_input() {
        let err = ClassReader::new(&[0xCA, 0xFE, 0xBA]).read();
        assert!(matches!(err, Err(Error::ClassFormat { .. })));
    }
}
