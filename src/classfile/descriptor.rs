//! Field and method descriptor parsing (JVMS 4.3)

use crate::classfile::opcodes;
use crate::error::{Error, Result};

/// A parsed field or parameter type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JvmType {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    /// Internal name, e.g. `java/lang/String`
    Object(String),
    /// Full array descriptor, e.g. `[I` or `[Ljava/lang/String;`
    Array(String),
}

/// Boxing information for a primitive type: wrapper class internal name,
/// `valueOf` descriptor, unboxing method name, unboxing descriptor
pub struct BoxInfo {
    pub wrapper: &'static str,
    pub value_of_descriptor: &'static str,
    pub unbox_method: &'static str,
    pub unbox_descriptor: &'static str,
}

impl JvmType {
    /// Width in operand stack slots and local variable slots
    pub fn width(&self) -> u16 {
        match self {
            JvmType::Long | JvmType::Double => 2,
            _ => 1,
        }
    }

    pub fn descriptor(&self) -> String {
        match self {
            JvmType::Boolean => "Z".to_string(),
            JvmType::Byte => "B".to_string(),
            JvmType::Char => "C".to_string(),
            JvmType::Short => "S".to_string(),
            JvmType::Int => "I".to_string(),
            JvmType::Long => "J".to_string(),
            JvmType::Float => "F".to_string(),
            JvmType::Double => "D".to_string(),
            JvmType::Object(name) => format!("L{};", name),
            JvmType::Array(descriptor) => descriptor.clone(),
        }
    }

    /// The name a CONSTANT_Class entry uses for this type: the internal
    /// name for objects, the full descriptor for arrays (JVMS 4.4.1)
    pub fn class_constant_name(&self) -> Option<&str> {
        match self {
            JvmType::Object(name) => Some(name),
            JvmType::Array(descriptor) => Some(descriptor),
            _ => None,
        }
    }

    pub fn load_opcode(&self) -> u8 {
        match self {
            JvmType::Boolean | JvmType::Byte | JvmType::Char | JvmType::Short | JvmType::Int => {
                opcodes::ILOAD
            }
            JvmType::Long => opcodes::LLOAD,
            JvmType::Float => opcodes::FLOAD,
            JvmType::Double => opcodes::DLOAD,
            JvmType::Object(_) | JvmType::Array(_) => opcodes::ALOAD,
        }
    }

    pub fn return_opcode(&self) -> u8 {
        match self {
            JvmType::Boolean | JvmType::Byte | JvmType::Char | JvmType::Short | JvmType::Int => {
                opcodes::IRETURN
            }
            JvmType::Long => opcodes::LRETURN,
            JvmType::Float => opcodes::FRETURN,
            JvmType::Double => opcodes::DRETURN,
            JvmType::Object(_) | JvmType::Array(_) => opcodes::ARETURN,
        }
    }

    /// Boxing/unboxing info; `None` for reference types
    pub fn box_info(&self) -> Option<BoxInfo> {
        let info = match self {
            JvmType::Boolean => BoxInfo {
                wrapper: "java/lang/Boolean",
                value_of_descriptor: "(Z)Ljava/lang/Boolean;",
                unbox_method: "booleanValue",
                unbox_descriptor: "()Z",
            },
            JvmType::Byte => BoxInfo {
                wrapper: "java/lang/Byte",
                value_of_descriptor: "(B)Ljava/lang/Byte;",
                unbox_method: "byteValue",
                unbox_descriptor: "()B",
            },
            JvmType::Char => BoxInfo {
                wrapper: "java/lang/Character",
                value_of_descriptor: "(C)Ljava/lang/Character;",
                unbox_method: "charValue",
                unbox_descriptor: "()C",
            },
            JvmType::Short => BoxInfo {
                wrapper: "java/lang/Short",
                value_of_descriptor: "(S)Ljava/lang/Short;",
                unbox_method: "shortValue",
                unbox_descriptor: "()S",
            },
            JvmType::Int => BoxInfo {
                wrapper: "java/lang/Integer",
                value_of_descriptor: "(I)Ljava/lang/Integer;",
                unbox_method: "intValue",
                unbox_descriptor: "()I",
            },
            JvmType::Long => BoxInfo {
                wrapper: "java/lang/Long",
                value_of_descriptor: "(J)Ljava/lang/Long;",
                unbox_method: "longValue",
                unbox_descriptor: "()J",
            },
            JvmType::Float => BoxInfo {
                wrapper: "java/lang/Float",
                value_of_descriptor: "(F)Ljava/lang/Float;",
                unbox_method: "floatValue",
                unbox_descriptor: "()F",
            },
            JvmType::Double => BoxInfo {
                wrapper: "java/lang/Double",
                value_of_descriptor: "(D)Ljava/lang/Double;",
                unbox_method: "doubleValue",
                unbox_descriptor: "()D",
            },
            JvmType::Object(_) | JvmType::Array(_) => return None,
        };
        Some(info)
    }
}

/// A parsed method descriptor: ordered parameter types plus return type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub params: Vec<JvmType>,
    /// `None` for void methods
    pub ret: Option<JvmType>,
}

impl MethodDescriptor {
    pub fn parse(descriptor: &str) -> Result<Self> {
        let mut chars = descriptor.char_indices().peekable();
        match chars.next() {
            Some((_, '(')) => {}
            _ => return Err(bad_descriptor(descriptor)),
        }

        let mut params = Vec::new();
        loop {
            match chars.peek() {
                Some((_, ')')) => {
                    chars.next();
                    break;
                }
                Some(_) => params.push(parse_type(descriptor, &mut chars)?),
                None => return Err(bad_descriptor(descriptor)),
            }
        }

        let ret = match chars.peek() {
            Some((_, 'V')) => {
                chars.next();
                None
            }
            Some(_) => Some(parse_type(descriptor, &mut chars)?),
            None => return Err(bad_descriptor(descriptor)),
        };

        if chars.next().is_some() {
            return Err(bad_descriptor(descriptor));
        }
        Ok(Self { params, ret })
    }

    /// Local variable slots taken by the parameters (receiver excluded)
    pub fn arg_slots(&self) -> u16 {
        self.params.iter().map(|p| p.width()).sum()
    }

    pub fn return_width(&self) -> u16 {
        self.ret.as_ref().map(|r| r.width()).unwrap_or(0)
    }
}

fn parse_type(
    descriptor: &str,
    chars: &mut std::iter::Peekable<std::str::CharIndices>,
) -> Result<JvmType> {
    let (start, c) = chars.next().ok_or_else(|| bad_descriptor(descriptor))?;
    match c {
        'Z' => Ok(JvmType::Boolean),
        'B' => Ok(JvmType::Byte),
        'C' => Ok(JvmType::Char),
        'S' => Ok(JvmType::Short),
        'I' => Ok(JvmType::Int),
        'J' => Ok(JvmType::Long),
        'F' => Ok(JvmType::Float),
        'D' => Ok(JvmType::Double),
        'L' => {
            for (end, c) in chars.by_ref() {
                if c == ';' {
                    return Ok(JvmType::Object(descriptor[start + 1..end].to_string()));
                }
            }
            Err(bad_descriptor(descriptor))
        }
        '[' => {
            // consume the element type, then slice out the whole dimension
            let element = parse_type(descriptor, chars)?;
            let end = start + 1 + element.descriptor().len();
            Ok(JvmType::Array(descriptor[start..end].to_string()))
        }
        _ => Err(bad_descriptor(descriptor)),
    }
}

fn bad_descriptor(descriptor: &str) -> Error {
    Error::class_format(format!("invalid method descriptor '{}'", descriptor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_primitives_and_void() {
        let d = MethodDescriptor::parse("(IJ)V").expect("parse");
        assert_eq!(d.params, vec![JvmType::Int, JvmType::Long]);
        assert!(d.ret.is_none());
        assert_eq!(d.arg_slots(), 3);
    }

    #[test]
    fn parses_objects_and_arrays() {
        let d = MethodDescriptor::parse("(Ljava/lang/String;[I)[Ljava/lang/Object;").expect("parse");
        assert_eq!(
            d.params,
            vec![
                JvmType::Object("java/lang/String".to_string()),
                JvmType::Array("[I".to_string()),
            ]
        );
        assert_eq!(
            d.ret,
            Some(JvmType::Array("[Ljava/lang/Object;".to_string()))
        );
    }

    #[test]
    fn parses_nested_arrays() {
        let d = MethodDescriptor::parse("([[Ljava/lang/String;)V").expect("parse");
        assert_eq!(
            d.params,
            vec![JvmType::Array("[[Ljava/lang/String;".to_string())]
        );
    }

    #[test]
    fn rejects_truncated_descriptors() {
        assert!(MethodDescriptor::parse("(I").is_err());
        assert!(MethodDescriptor::parse("()").is_err());
        assert!(MethodDescriptor::parse("(Ljava/lang/String)V").is_err());
        assert!(MethodDescriptor::parse("(I)VX").is_err());
    }
}
