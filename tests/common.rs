//! Shared fixtures for the weaver integration tests
//!
//! Builds a small but realistic class through the crate's own classfile
//! layer and provides a minimal linear decoder for the instruction subset
//! the weaver emits, so tests can assert on synthesized bodies.

#![allow(dead_code)]

use classweave::classfile::attribute::{CodeAttribute, RawAttribute};
use classweave::classfile::defs::access_flags::{ACC_PUBLIC, ACC_STATIC, ACC_SUPER};
use classweave::classfile::defs::major_versions::JAVA_8;
use classweave::classfile::opcodes;
use classweave::classfile::{ClassFile, ClassReader, Constant, ConstantPool, MethodInfo};

pub const SAMPLE_CLASS: &str = "com/example/Sample";

/// Builds `com.example.Sample` with one method per interception shape,
/// plus a constructor and a static helper:
///
/// - `ping()V` - niladic void
/// - `answer()I` - niladic valued
/// - `record(JLjava/lang/String;)V` - args void
/// - `greet(Ljava/lang/String;I)Ljava/lang/String;` - args valued,
///   declares `throws Exception`
/// - `helper()V` - static, never eligible
pub fn sample_class_bytes() -> Vec<u8> {
    build_sample(&[])
}

/// Like [`sample_class_bytes`], with extra niladic void methods appended;
/// used to provoke name collisions with synthesized members
pub fn sample_class_bytes_with_methods(extra: &[&str]) -> Vec<u8> {
    build_sample(extra)
}

fn build_sample(extra: &[&str]) -> Vec<u8> {
    let mut pool = ConstantPool::new();
    let this_class = pool.add_class(SAMPLE_CLASS).expect("pool");
    let super_class = pool.add_class("java/lang/Object").expect("pool");
    let object_init = pool
        .add_method_ref("java/lang/Object", "<init>", "()V")
        .expect("pool");
    let code_name = pool.add_utf8("Code").expect("pool");
    let exceptions_name = pool.add_utf8("Exceptions").expect("pool");
    let exception_class = pool.add_class("java/lang/Exception").expect("pool");

    let mut methods = Vec::new();

    // <init>()V: aload_0; invokespecial Object.<init>; return
    let mut init_code = vec![opcodes::ALOAD_0, opcodes::INVOKESPECIAL];
    init_code.extend_from_slice(&object_init.to_be_bytes());
    init_code.push(opcodes::RETURN);
    methods.push(plain_method(
        &mut pool,
        code_name,
        ACC_PUBLIC,
        "<init>",
        "()V",
        CodeAttribute::new(1, 1, init_code),
    ));

    methods.push(plain_method(
        &mut pool,
        code_name,
        ACC_PUBLIC,
        "ping",
        "()V",
        CodeAttribute::new(0, 1, vec![opcodes::RETURN]),
    ));

    methods.push(plain_method(
        &mut pool,
        code_name,
        ACC_PUBLIC,
        "answer",
        "()I",
        CodeAttribute::new(1, 1, vec![opcodes::BIPUSH, 42, opcodes::IRETURN]),
    ));

    methods.push(plain_method(
        &mut pool,
        code_name,
        ACC_PUBLIC,
        "record",
        "(JLjava/lang/String;)V",
        CodeAttribute::new(0, 4, vec![opcodes::RETURN]),
    ));

    // greet returns its first argument and declares a checked exception
    let mut greet = plain_method(
        &mut pool,
        code_name,
        ACC_PUBLIC,
        "greet",
        "(Ljava/lang/String;I)Ljava/lang/String;",
        CodeAttribute::new(1, 3, vec![opcodes::ALOAD_0 + 1, opcodes::ARETURN]),
    );
    let mut throws = Vec::new();
    throws.extend_from_slice(&1u16.to_be_bytes());
    throws.extend_from_slice(&exception_class.to_be_bytes());
    greet.attributes.push(RawAttribute::new(exceptions_name, throws));
    methods.push(greet);

    methods.push(plain_method(
        &mut pool,
        code_name,
        ACC_PUBLIC | ACC_STATIC,
        "helper",
        "()V",
        CodeAttribute::new(0, 0, vec![opcodes::RETURN]),
    ));

    for name in extra {
        methods.push(plain_method(
            &mut pool,
            code_name,
            ACC_PUBLIC,
            name,
            "()V",
            CodeAttribute::new(0, 1, vec![opcodes::RETURN]),
        ));
    }

    let class = ClassFile {
        minor_version: 0,
        major_version: JAVA_8,
        constant_pool: pool,
        access_flags: ACC_PUBLIC | ACC_SUPER,
        this_class,
        super_class,
        interfaces: Vec::new(),
        fields: Vec::new(),
        methods,
        attributes: Vec::new(),
    };
    class.to_bytes()
}

fn plain_method(
    pool: &mut ConstantPool,
    code_name: u16,
    access_flags: u16,
    name: &str,
    descriptor: &str,
    code: CodeAttribute,
) -> MethodInfo {
    let name_index = pool.add_utf8(name).expect("pool");
    let descriptor_index = pool.add_utf8(descriptor).expect("pool");
    let mut method = MethodInfo::new(access_flags, name_index, descriptor_index);
    method
        .attributes
        .push(RawAttribute::new(code_name, code.to_bytes()));
    method
}

pub fn parse(bytes: &[u8]) -> ClassFile {
    ClassReader::new(bytes).read().expect("output class must parse")
}

pub fn find_method<'a>(class: &'a ClassFile, name: &str) -> &'a MethodInfo {
    let index = class
        .methods
        .iter()
        .position(|m| class.method_name(m) == Some(name))
        .unwrap_or_else(|| panic!("method {} not found", name));
    &class.methods[index]
}

pub fn method_names(class: &ClassFile) -> Vec<String> {
    class
        .methods
        .iter()
        .filter_map(|m| class.method_name(m).map(str::to_string))
        .collect()
}

pub fn field_names(class: &ClassFile) -> Vec<String> {
    class
        .fields
        .iter()
        .filter_map(|f| class.field_name(f).map(str::to_string))
        .collect()
}

/// Extract the raw instruction bytes of a method's Code attribute
pub fn code_of(class: &ClassFile, method: &MethodInfo) -> Vec<u8> {
    let attr = method
        .attributes
        .iter()
        .find(|a| class.constant_pool.utf8(a.name_index) == Some("Code"))
        .expect("method has a Code attribute");
    let len = u32::from_be_bytes([attr.info[4], attr.info[5], attr.info[6], attr.info[7]]) as usize;
    attr.info[8..8 + len].to_vec()
}

pub fn max_stack_of(method_code_attr: &[u8]) -> u16 {
    u16::from_be_bytes([method_code_attr[0], method_code_attr[1]])
}

/// One decoded instruction: opcode plus operand bytes
pub type Instruction = (u8, Vec<u8>);

/// Linear decoder for the instruction subset the weaver emits; panics on
/// anything it does not know so tests fail loudly on unexpected output
pub fn decode(code: &[u8]) -> Vec<Instruction> {
    let mut instructions = Vec::new();
    let mut pos = 0;
    while pos < code.len() {
        let op = code[pos];
        let operand_len = match op {
            0x02..=0x0f => 0,                                  // iconst and friends
            opcodes::BIPUSH | opcodes::LDC => 1,
            opcodes::SIPUSH | opcodes::LDC_W => 2,
            0x15..=0x19 => 1,                                  // iload..aload
            0x1a..=0x2d => 0,                                  // short-form loads
            opcodes::ASTORE => 1,
            0x4b..=0x4e => 0,                                  // astore_0..3
            opcodes::AASTORE | opcodes::DUP => 0,
            0xac..=0xb1 => 0,                                  // returns
            opcodes::GETFIELD
            | opcodes::INVOKEVIRTUAL
            | opcodes::INVOKESPECIAL
            | opcodes::INVOKESTATIC
            | opcodes::NEW
            | opcodes::ANEWARRAY
            | opcodes::CHECKCAST => 2,
            opcodes::INVOKEINTERFACE | opcodes::INVOKEDYNAMIC => 4,
            other => panic!("decoder does not know opcode 0x{:02x}", other),
        };
        let operands = code[pos + 1..pos + 1 + operand_len].to_vec();
        instructions.push((op, operands));
        pos += 1 + operand_len;
    }
    instructions
}

/// Resolve the member name behind a two-byte field/method ref operand
pub fn ref_name(class: &ClassFile, operands: &[u8]) -> String {
    let index = u16::from_be_bytes([operands[0], operands[1]]);
    let nat = match class.constant_pool.get(index) {
        Some(Constant::FieldRef(_, nat))
        | Some(Constant::MethodRef(_, nat))
        | Some(Constant::InterfaceMethodRef(_, nat)) => *nat,
        other => panic!("operand {} is not a member ref: {:?}", index, other),
    };
    match class.constant_pool.get(nat) {
        Some(Constant::NameAndType(name, _)) => class
            .constant_pool
            .utf8(*name)
            .expect("name resolves")
            .to_string(),
        other => panic!("bad NameAndType: {:?}", other),
    }
}

/// Resolve the class name behind a two-byte class operand
pub fn class_operand_name(class: &ClassFile, operands: &[u8]) -> String {
    let index = u16::from_be_bytes([operands[0], operands[1]]);
    class
        .constant_pool
        .class_name(index)
        .expect("class operand resolves")
        .to_string()
}
