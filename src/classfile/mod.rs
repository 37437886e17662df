//! JVM class file layer: parsing, in-memory model, and serialization
//!
//! The weaver patches classes at the structural level: the input's
//! constant pool is preserved verbatim and appended to, so untouched
//! method bodies and attributes survive byte-for-byte.

pub mod attribute;
pub mod class;
pub mod code;
pub mod constpool;
pub mod defs;
pub mod descriptor;
pub mod field;
pub mod method;
pub mod opcodes;
pub mod reader;

pub use class::ClassFile;
pub use code::CodeBuilder;
pub use constpool::{ConstPoolError, Constant, ConstantPool};
pub use descriptor::{JvmType, MethodDescriptor};
pub use field::FieldInfo;
pub use method::MethodInfo;
pub use reader::ClassReader;
