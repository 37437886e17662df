//! Java bytecode instruction opcodes
//!
//! Only the subset the weaver emits or decodes; values per the JVM
//! specification, ordered by opcode value.

// 0x02 - 0x11: integer constants
pub const ICONST_M1: u8 = 0x02;
pub const ICONST_0: u8 = 0x03;
pub const BIPUSH: u8 = 0x10;
pub const SIPUSH: u8 = 0x11;

// 0x12 - 0x13: constant pool loads
pub const LDC: u8 = 0x12;
pub const LDC_W: u8 = 0x13;

// 0x15 - 0x2d: local variable loads
pub const ILOAD: u8 = 0x15;
pub const LLOAD: u8 = 0x16;
pub const FLOAD: u8 = 0x17;
pub const DLOAD: u8 = 0x18;
pub const ALOAD: u8 = 0x19;
pub const ILOAD_0: u8 = 0x1a;
pub const LLOAD_0: u8 = 0x1e;
pub const FLOAD_0: u8 = 0x22;
pub const DLOAD_0: u8 = 0x26;
pub const ALOAD_0: u8 = 0x2a;

// 0x3a - 0x4e: local variable stores
pub const ASTORE: u8 = 0x3a;
pub const ASTORE_0: u8 = 0x4b;

// 0x53: array stores
pub const AASTORE: u8 = 0x53;

// 0x59: stack management
pub const DUP: u8 = 0x59;

// 0xac - 0xb1: returns
pub const IRETURN: u8 = 0xac;
pub const LRETURN: u8 = 0xad;
pub const FRETURN: u8 = 0xae;
pub const DRETURN: u8 = 0xaf;
pub const ARETURN: u8 = 0xb0;
pub const RETURN: u8 = 0xb1;

// 0xb4 - 0xbd: field access, invocations, allocation
pub const GETFIELD: u8 = 0xb4;
pub const INVOKEVIRTUAL: u8 = 0xb6;
pub const INVOKESPECIAL: u8 = 0xb7;
pub const INVOKESTATIC: u8 = 0xb8;
pub const INVOKEINTERFACE: u8 = 0xb9;
pub const INVOKEDYNAMIC: u8 = 0xba;
pub const NEW: u8 = 0xbb;
pub const ANEWARRAY: u8 = 0xbd;

// 0xc0: type checks
pub const CHECKCAST: u8 = 0xc0;
