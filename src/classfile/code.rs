//! Straight-line bytecode assembler with operand stack accounting
//!
//! The weaver only ever synthesizes branch-free bodies, so this builder
//! tracks a single running stack depth and derives `max_stack` from it;
//! `max_locals` grows as locals are reserved. Both are derived artifacts,
//! never hand-maintained by callers.

use super::attribute::CodeAttribute;
use super::descriptor::JvmType;
use super::opcodes::*;

pub struct CodeBuilder {
    code: Vec<u8>,
    stacksize: u16,
    max_stacksize: u16,
    max_locals: u16,
}

impl CodeBuilder {
    /// `initial_locals` covers the receiver and the declared parameters
    pub fn new(initial_locals: u16) -> Self {
        Self {
            code: Vec::new(),
            stacksize: 0,
            max_stacksize: 0,
            max_locals: initial_locals,
        }
    }

    /// Reserve a fresh local variable slot
    pub fn reserve_local(&mut self, width: u16) -> u16 {
        let slot = self.max_locals;
        self.max_locals += width;
        slot
    }

    fn push(&mut self, width: u16) {
        self.stacksize += width;
        self.max_stacksize = self.max_stacksize.max(self.stacksize);
    }

    fn pop(&mut self, width: u16) {
        self.stacksize = self.stacksize.saturating_sub(width);
    }

    fn emit_local_op(&mut self, op: u8, short_base: u8, slot: u16) {
        if slot <= 3 {
            self.code.push(short_base + slot as u8);
        } else if slot <= u8::MAX as u16 {
            self.code.push(op);
            self.code.push(slot as u8);
        } else {
            self.code.push(WIDE);
            self.code.push(op);
            self.code.extend_from_slice(&slot.to_be_bytes());
        }
    }

    /// Load a local variable with the type-appropriate instruction
    pub fn load(&mut self, ty: &JvmType, slot: u16) {
        let (op, short_base) = match ty.load_opcode() {
            ILOAD => (ILOAD, ILOAD_0),
            LLOAD => (LLOAD, LLOAD_0),
            FLOAD => (FLOAD, FLOAD_0),
            DLOAD => (DLOAD, DLOAD_0),
            _ => (ALOAD, ALOAD_0),
        };
        self.emit_local_op(op, short_base, slot);
        self.push(ty.width());
    }

    /// Load a reference local (`aload`)
    pub fn aload(&mut self, slot: u16) {
        self.emit_local_op(ALOAD, ALOAD_0, slot);
        self.push(1);
    }

    /// Store a reference into a local (`astore`)
    pub fn astore(&mut self, slot: u16) {
        self.emit_local_op(ASTORE, ASTORE_0, slot);
        self.pop(1);
    }

    /// Push a single-slot constant pool entry (`ldc`/`ldc_w`)
    pub fn ldc(&mut self, index: u16) {
        if index <= u8::MAX as u16 {
            self.code.push(LDC);
            self.code.push(index as u8);
        } else {
            self.code.push(LDC_W);
            self.code.extend_from_slice(&index.to_be_bytes());
        }
        self.push(1);
    }

    /// Push a small int constant with the shortest encoding
    pub fn push_int(&mut self, value: i16) {
        if (-1..=5).contains(&value) {
            self.code.push((ICONST_0 as i16 + value) as u8);
        } else if let Ok(byte) = i8::try_from(value) {
            self.code.push(BIPUSH);
            self.code.push(byte as u8);
        } else {
            self.code.push(SIPUSH);
            self.code.extend_from_slice(&value.to_be_bytes());
        }
        self.push(1);
    }

    pub fn new_object(&mut self, class_index: u16) {
        self.code.push(NEW);
        self.code.extend_from_slice(&class_index.to_be_bytes());
        self.push(1);
    }

    pub fn dup(&mut self) {
        self.code.push(DUP);
        self.push(1);
    }

    pub fn anewarray(&mut self, class_index: u16) {
        self.code.push(ANEWARRAY);
        self.code.extend_from_slice(&class_index.to_be_bytes());
        // pops the count, pushes the array
    }

    pub fn aastore(&mut self) {
        self.code.push(AASTORE);
        self.pop(3);
    }

    pub fn getfield(&mut self, field_index: u16, value_width: u16) {
        self.code.push(GETFIELD);
        self.code.extend_from_slice(&field_index.to_be_bytes());
        self.pop(1);
        self.push(value_width);
    }

    pub fn checkcast(&mut self, class_index: u16) {
        self.code.push(CHECKCAST);
        self.code.extend_from_slice(&class_index.to_be_bytes());
    }

    pub fn invokespecial(&mut self, method_index: u16, arg_slots: u16, return_width: u16) {
        self.code.push(INVOKESPECIAL);
        self.code.extend_from_slice(&method_index.to_be_bytes());
        self.pop(1 + arg_slots);
        self.push(return_width);
    }

    pub fn invokevirtual(&mut self, method_index: u16, arg_slots: u16, return_width: u16) {
        self.code.push(INVOKEVIRTUAL);
        self.code.extend_from_slice(&method_index.to_be_bytes());
        self.pop(1 + arg_slots);
        self.push(return_width);
    }

    pub fn invokestatic(&mut self, method_index: u16, arg_slots: u16, return_width: u16) {
        self.code.push(INVOKESTATIC);
        self.code.extend_from_slice(&method_index.to_be_bytes());
        self.pop(arg_slots);
        self.push(return_width);
    }

    pub fn invokeinterface(&mut self, method_index: u16, arg_slots: u16, return_width: u16) {
        self.code.push(INVOKEINTERFACE);
        self.code.extend_from_slice(&method_index.to_be_bytes());
        // historical count operand: receiver plus argument slots, then zero
        self.code.push(1 + arg_slots as u8);
        self.code.push(0);
        self.pop(1 + arg_slots);
        self.push(return_width);
    }

    pub fn invokedynamic(&mut self, invoke_dynamic_index: u16, arg_slots: u16, return_width: u16) {
        self.code.push(INVOKEDYNAMIC);
        self.code.extend_from_slice(&invoke_dynamic_index.to_be_bytes());
        self.code.push(0);
        self.code.push(0);
        self.pop(arg_slots);
        self.push(return_width);
    }

    /// Emit the return instruction matching the method's return type
    pub fn return_value(&mut self, return_type: Option<&JvmType>) {
        match return_type {
            Some(ty) => {
                self.code.push(ty.return_opcode());
                self.pop(ty.width());
            }
            None => self.code.push(RETURN),
        }
    }

    pub fn into_code_attribute(self) -> CodeAttribute {
        CodeAttribute::new(self.max_stacksize, self.max_locals, self.code)
    }
}

/// `wide` instruction prefix for locals beyond slot 255
const WIDE: u8 = 0xc4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_max_stack_over_the_body() {
        let mut b = CodeBuilder::new(1);
        b.aload(0);
        b.dup();
        b.dup();
        b.astore(1);
        b.astore(2);
        b.astore(3);
        assert_eq!(b.stacksize, 0);
        assert_eq!(b.max_stacksize, 3);
    }

    #[test]
    fn category_two_values_take_two_slots() {
        let mut b = CodeBuilder::new(3);
        b.load(&JvmType::Long, 1);
        assert_eq!(b.max_stacksize, 2);
        b.return_value(Some(&JvmType::Long));
        assert_eq!(b.stacksize, 0);
    }

    #[test]
    fn short_form_loads_for_low_slots() {
        let mut b = CodeBuilder::new(6);
        b.aload(0);
        b.aload(5);
        assert_eq!(b.code, vec![ALOAD_0, ALOAD, 5]);
    }

    #[test]
    fn reserve_local_grows_frame() {
        let mut b = CodeBuilder::new(2);
        assert_eq!(b.reserve_local(1), 2);
        assert_eq!(b.reserve_local(2), 3);
        let attr = b.into_code_attribute();
        assert_eq!(attr.max_locals, 5);
    }
}
