//! The two 256-entry instruction tables and their mnemonic strings.
//!
//! Regular blocks (the load/ALU quadrants of the primary table, the whole
//! CB table) are loop-filled; the irregular quarters are written out row by
//! row. Either way the result is plain data: a handler pointer and an
//! operand descriptor per opcode.

use once_cell::sync::Lazy;

use crate::instructions as instr;
use crate::instructions::{Cond, Handler, Instruction, Operand};
use crate::registers::{ByteReg, WordReg};

/// Opcodes that decode to forbidden entries.
pub const ILLEGAL_OPCODES: [u8; 11] = [
    0xD3, 0xDB, 0xDD, 0xE3, 0xE4, 0xEB, 0xEC, 0xED, 0xF4, 0xFC, 0xFD,
];

// Register slots 0..7 as encoded in the regular opcode blocks; slot 6 is
// the (HL) column and never reads the byte selector.
const R8: [ByteReg; 8] = [
    ByteReg::B,
    ByteReg::C,
    ByteReg::D,
    ByteReg::E,
    ByteReg::H,
    ByteReg::L,
    ByteReg::Unused,
    ByteReg::A,
];

const R8_NAMES: [&str; 8] = ["b", "c", "d", "e", "h", "l", "(hl)", "a"];

fn nil() -> Operand {
    Operand {
        dst: ByteReg::Unused,
        src: ByteReg::Unused,
        dst16: WordReg::Unused,
        src16: WordReg::Unused,
        data: 0,
        cond: Cond::Always,
        cycles: 4,
    }
}

fn e(handler: Handler, operand: Operand) -> Instruction {
    Instruction { handler, operand }
}

pub static PRIMARY: Lazy<[Instruction; 256]> = Lazy::new(build_primary);
pub static EXTENDED: Lazy<[Instruction; 256]> = Lazy::new(build_extended);

/// Table for the given instruction set selector (0 = primary, 1 = CB).
pub fn table(set: usize) -> &'static [Instruction; 256] {
    if set == 0 {
        &PRIMARY
    } else {
        &EXTENDED
    }
}

#[rustfmt::skip]
fn build_primary() -> [Instruction; 256] {
    use crate::registers::ByteReg::{A, B, C, D, E, F, H, L};
    use crate::registers::WordReg::{AF, BC, DE, HL, SP};

    let nil = nil();
    let mut t = [e(instr::ill, nil); 256];

    t[0x00] = e(instr::nop,     nil);
    t[0x01] = e(instr::let16,   Operand { dst16: BC, cycles: 12, ..nil });
    t[0x02] = e(instr::st,      Operand { src: A, dst16: BC, cycles: 8, ..nil });
    t[0x03] = e(instr::inc16,   Operand { dst16: BC, cycles: 8, ..nil });
    t[0x04] = e(instr::inc,     Operand { dst: B, ..nil });
    t[0x05] = e(instr::dec,     Operand { dst: B, ..nil });
    t[0x06] = e(instr::let_imm, Operand { dst: B, cycles: 8, ..nil });
    t[0x07] = e(instr::rlca,    Operand { dst: A, ..nil });

    t[0x08] = e(instr::stsp,    Operand { cycles: 20, ..nil });
    t[0x09] = e(instr::add16,   Operand { dst16: HL, src16: BC, cycles: 12, ..nil });
    t[0x0A] = e(instr::ld,      Operand { dst: A, src16: BC, cycles: 8, ..nil });
    t[0x0B] = e(instr::dec16,   Operand { dst16: BC, cycles: 8, ..nil });
    t[0x0C] = e(instr::inc,     Operand { dst: C, ..nil });
    t[0x0D] = e(instr::dec,     Operand { dst: C, ..nil });
    t[0x0E] = e(instr::let_imm, Operand { dst: C, cycles: 8, ..nil });
    t[0x0F] = e(instr::rrca,    Operand { dst: A, ..nil });

    t[0x10] = e(instr::stop,    nil);
    t[0x11] = e(instr::let16,   Operand { dst16: DE, cycles: 12, ..nil });
    t[0x12] = e(instr::st,      Operand { src: A, dst16: DE, cycles: 8, ..nil });
    t[0x13] = e(instr::inc16,   Operand { dst16: DE, cycles: 8, ..nil });
    t[0x14] = e(instr::inc,     Operand { dst: D, ..nil });
    t[0x15] = e(instr::dec,     Operand { dst: D, ..nil });
    t[0x16] = e(instr::let_imm, Operand { dst: D, cycles: 8, ..nil });
    t[0x17] = e(instr::rla,     Operand { dst: A, ..nil });

    t[0x18] = e(instr::jr,      Operand { cycles: 12, ..nil });
    t[0x19] = e(instr::add16,   Operand { dst16: HL, src16: DE, cycles: 12, ..nil });
    t[0x1A] = e(instr::ld,      Operand { dst: A, src16: DE, cycles: 8, ..nil });
    t[0x1B] = e(instr::dec16,   Operand { dst16: DE, cycles: 8, ..nil });
    t[0x1C] = e(instr::inc,     Operand { dst: E, ..nil });
    t[0x1D] = e(instr::dec,     Operand { dst: E, ..nil });
    t[0x1E] = e(instr::let_imm, Operand { dst: E, cycles: 8, ..nil });
    t[0x1F] = e(instr::rra,     Operand { dst: A, ..nil });

    t[0x20] = e(instr::jr,      Operand { cond: Cond::NonZero, cycles: 8, ..nil });
    t[0x21] = e(instr::let16,   Operand { dst16: HL, cycles: 12, ..nil });
    t[0x22] = e(instr::st_inc,  Operand { src: A, dst16: HL, cycles: 8, ..nil });
    t[0x23] = e(instr::inc16,   Operand { dst16: HL, cycles: 8, ..nil });
    t[0x24] = e(instr::inc,     Operand { dst: H, ..nil });
    t[0x25] = e(instr::dec,     Operand { dst: H, ..nil });
    t[0x26] = e(instr::let_imm, Operand { dst: H, cycles: 8, ..nil });
    t[0x27] = e(instr::daa,     Operand { dst: A, ..nil });

    t[0x28] = e(instr::jr,      Operand { cond: Cond::Zero, cycles: 8, ..nil });
    t[0x29] = e(instr::add16,   Operand { dst16: HL, src16: HL, cycles: 12, ..nil });
    t[0x2A] = e(instr::ld_inc,  Operand { dst: A, src16: HL, cycles: 8, ..nil });
    t[0x2B] = e(instr::dec16,   Operand { dst16: HL, cycles: 8, ..nil });
    t[0x2C] = e(instr::inc,     Operand { dst: L, ..nil });
    t[0x2D] = e(instr::dec,     Operand { dst: L, ..nil });
    t[0x2E] = e(instr::let_imm, Operand { dst: L, cycles: 8, ..nil });
    t[0x2F] = e(instr::cpl,     Operand { dst: A, ..nil });

    t[0x30] = e(instr::jr,      Operand { cond: Cond::NoCarry, cycles: 8, ..nil });
    t[0x31] = e(instr::let16,   Operand { dst16: SP, cycles: 12, ..nil });
    t[0x32] = e(instr::st_dec,  Operand { src: A, dst16: HL, cycles: 8, ..nil });
    t[0x33] = e(instr::inc16,   Operand { dst16: SP, cycles: 8, ..nil });
    t[0x34] = e(instr::inc_ind, Operand { src16: HL, cycles: 12, ..nil });
    t[0x35] = e(instr::dec_ind, Operand { src16: HL, cycles: 12, ..nil });
    t[0x36] = e(instr::let_ind, Operand { dst16: HL, cycles: 12, ..nil });
    // scf: set the carry bit of F through the bit-op handler
    t[0x37] = e(instr::set,     Operand { dst: F, data: 4, ..nil });

    t[0x38] = e(instr::jr,      Operand { cond: Cond::Carry, cycles: 8, ..nil });
    t[0x39] = e(instr::add16,   Operand { dst16: HL, src16: SP, cycles: 12, ..nil });
    t[0x3A] = e(instr::ld_dec,  Operand { dst: A, src16: HL, cycles: 8, ..nil });
    t[0x3B] = e(instr::dec16,   Operand { dst16: SP, cycles: 8, ..nil });
    t[0x3C] = e(instr::inc,     Operand { dst: A, ..nil });
    t[0x3D] = e(instr::dec,     Operand { dst: A, ..nil });
    t[0x3E] = e(instr::let_imm, Operand { dst: A, cycles: 8, ..nil });
    // ccf: clear the carry bit of F through the bit-op handler
    t[0x3F] = e(instr::res,     Operand { dst: F, data: 4, ..nil });

    // 0x40..0x7F: register moves, with the (HL) column as loads/stores and
    // the (HL),(HL) cell as HALT.
    for d in 0..8 {
        for s in 0..8 {
            let opcode = 0x40 + d * 8 + s;
            t[opcode] = if d == 6 && s == 6 {
                e(instr::halt, nil)
            } else if d == 6 {
                e(instr::st, Operand { src: R8[s], dst16: HL, cycles: 8, ..nil })
            } else if s == 6 {
                e(instr::ld, Operand { dst: R8[d], src16: HL, cycles: 8, ..nil })
            } else {
                e(instr::mv, Operand { dst: R8[d], src: R8[s], ..nil })
            };
        }
    }

    // 0x80..0xBF: accumulator arithmetic over the same register columns.
    let alu: [(Handler, Handler); 8] = [
        (instr::add, instr::add_hl),
        (instr::adc, instr::adc_hl),
        (instr::sub, instr::sub_hl),
        (instr::sbc, instr::sbc_hl),
        (instr::and, instr::and_hl),
        (instr::xor, instr::xor_hl),
        (instr::or, instr::or_hl),
        (instr::cp, instr::cp_hl),
    ];
    for (i, (reg_h, hl_h)) in alu.iter().enumerate() {
        for s in 0..8 {
            let opcode = 0x80 + i * 8 + s;
            t[opcode] = if s == 6 {
                e(*hl_h, Operand { dst: A, src16: HL, cycles: 8, ..nil })
            } else {
                e(*reg_h, Operand { dst: A, src: R8[s], ..nil })
            };
        }
    }

    t[0xC0] = e(instr::ret,     Operand { cond: Cond::NonZero, cycles: 8, ..nil });
    t[0xC1] = e(instr::pop,     Operand { dst16: BC, cycles: 12, ..nil });
    t[0xC2] = e(instr::jp_imm,  Operand { cond: Cond::NonZero, cycles: 12, ..nil });
    t[0xC3] = e(instr::jp_imm,  Operand { cycles: 16, ..nil });
    t[0xC4] = e(instr::call,    Operand { cond: Cond::NonZero, cycles: 12, ..nil });
    t[0xC5] = e(instr::push,    Operand { src16: BC, cycles: 16, ..nil });
    t[0xC6] = e(instr::add_imm, Operand { dst: A, cycles: 8, ..nil });
    t[0xC7] = e(instr::rst,     Operand { data: 0x00, cycles: 16, ..nil });

    t[0xC8] = e(instr::ret,     Operand { cond: Cond::Zero, cycles: 8, ..nil });
    t[0xC9] = e(instr::ret,     Operand { cycles: 16, ..nil });
    t[0xCA] = e(instr::jp_imm,  Operand { cond: Cond::Zero, cycles: 12, ..nil });
    t[0xCB] = e(instr::cb,      Operand { cycles: 0, ..nil });
    t[0xCC] = e(instr::call,    Operand { cond: Cond::Zero, cycles: 12, ..nil });
    t[0xCD] = e(instr::call,    Operand { cycles: 24, ..nil });
    t[0xCE] = e(instr::adc_imm, Operand { dst: A, cycles: 8, ..nil });
    t[0xCF] = e(instr::rst,     Operand { data: 0x08, cycles: 16, ..nil });

    t[0xD0] = e(instr::ret,     Operand { cond: Cond::NoCarry, cycles: 8, ..nil });
    t[0xD1] = e(instr::pop,     Operand { dst16: DE, cycles: 12, ..nil });
    t[0xD2] = e(instr::jp_imm,  Operand { cond: Cond::NoCarry, cycles: 12, ..nil });
    t[0xD4] = e(instr::call,    Operand { cond: Cond::NoCarry, cycles: 12, ..nil });
    t[0xD5] = e(instr::push,    Operand { src16: DE, cycles: 16, ..nil });
    t[0xD6] = e(instr::sub_imm, Operand { dst: A, cycles: 8, ..nil });
    t[0xD7] = e(instr::rst,     Operand { data: 0x10, cycles: 16, ..nil });

    t[0xD8] = e(instr::ret,     Operand { cond: Cond::Carry, cycles: 8, ..nil });
    t[0xD9] = e(instr::reti,    Operand { cycles: 16, ..nil });
    t[0xDA] = e(instr::jp_imm,  Operand { cond: Cond::Carry, cycles: 12, ..nil });
    t[0xDC] = e(instr::call,    Operand { cond: Cond::Carry, cycles: 12, ..nil });
    t[0xDE] = e(instr::sbc_imm, Operand { dst: A, cycles: 8, ..nil });
    t[0xDF] = e(instr::rst,     Operand { data: 0x18, cycles: 16, ..nil });

    t[0xE0] = e(instr::sth_imm, Operand { src: A, cycles: 12, ..nil });
    t[0xE1] = e(instr::pop,     Operand { dst16: HL, cycles: 12, ..nil });
    t[0xE2] = e(instr::sth_c,   Operand { dst: C, src: A, cycles: 8, ..nil });
    t[0xE5] = e(instr::push,    Operand { src16: HL, cycles: 16, ..nil });
    t[0xE6] = e(instr::and_imm, Operand { dst: A, cycles: 8, ..nil });
    t[0xE7] = e(instr::rst,     Operand { data: 0x20, cycles: 16, ..nil });

    t[0xE8] = e(instr::adds,    Operand { dst16: SP, cycles: 16, ..nil });
    t[0xE9] = e(instr::jp_hl,   Operand { src16: HL, cycles: 12, ..nil });
    t[0xEA] = e(instr::st_a16,  Operand { src: A, cycles: 16, ..nil });
    t[0xEE] = e(instr::xor_imm, Operand { dst: A, cycles: 8, ..nil });
    t[0xEF] = e(instr::rst,     Operand { data: 0x28, cycles: 16, ..nil });

    t[0xF0] = e(instr::ldh_imm, Operand { dst: A, cycles: 12, ..nil });
    t[0xF1] = e(instr::pop,     Operand { dst16: AF, cycles: 12, ..nil });
    t[0xF2] = e(instr::ldh_c,   Operand { dst: A, src: C, cycles: 8, ..nil });
    t[0xF3] = e(instr::di,      nil);
    t[0xF5] = e(instr::push,    Operand { src16: AF, cycles: 16, ..nil });
    t[0xF6] = e(instr::or_imm,  Operand { dst: A, cycles: 8, ..nil });
    t[0xF7] = e(instr::rst,     Operand { data: 0x30, cycles: 16, ..nil });

    t[0xF8] = e(instr::mvsp,    Operand { dst16: SP, cycles: 12, ..nil });
    t[0xF9] = e(instr::mv16,    Operand { dst16: SP, src16: HL, cycles: 8, ..nil });
    t[0xFA] = e(instr::ld_a16,  Operand { dst: A, cycles: 16, ..nil });
    t[0xFB] = e(instr::ei,      nil);
    t[0xFE] = e(instr::cp_imm,  Operand { dst: A, cycles: 8, ..nil });
    t[0xFF] = e(instr::rst,     Operand { data: 0x38, cycles: 16, ..nil });

    // Forbidden entries carry their own opcode for the error report.
    for opcode in ILLEGAL_OPCODES {
        t[opcode as usize] = e(instr::ill, Operand { data: opcode, ..nil });
    }

    t
}

fn build_extended() -> [Instruction; 256] {
    use crate::registers::WordReg::HL;

    let nil = nil();
    let mut t = [e(instr::ill, nil); 256];

    let shifts: [(Handler, Handler); 8] = [
        (instr::rlc, instr::rlc_hl),
        (instr::rrc, instr::rrc_hl),
        (instr::rl, instr::rl_hl),
        (instr::rr, instr::rr_hl),
        (instr::sla, instr::sla_hl),
        (instr::sra, instr::sra_hl),
        (instr::swap, instr::swap_hl),
        (instr::srl, instr::srl_hl),
    ];
    for (i, (reg_h, hl_h)) in shifts.iter().enumerate() {
        for s in 0..8 {
            let opcode = i * 8 + s;
            t[opcode] = if s == 6 {
                e(*hl_h, Operand { src16: HL, cycles: 16, ..nil })
            } else {
                e(*reg_h, Operand { dst: R8[s], cycles: 8, ..nil })
            };
        }
    }

    let bitops: [(Handler, Handler); 3] = [
        (instr::bit, instr::bit_hl),
        (instr::res, instr::res_hl),
        (instr::set, instr::set_hl),
    ];
    for (group, (reg_h, hl_h)) in bitops.iter().enumerate() {
        for index in 0..8u8 {
            for s in 0..8 {
                let opcode = 0x40 + group * 0x40 + index as usize * 8 + s;
                t[opcode] = if s == 6 {
                    e(*hl_h, Operand { src16: HL, data: index, cycles: 16, ..nil })
                } else {
                    e(*reg_h, Operand { dst: R8[s], data: index, cycles: 8, ..nil })
                };
            }
        }
    }

    t
}

// ---------------------------------------------------------------------------
// Mnemonics for the execution trace.

#[rustfmt::skip]
const PRIMARY_TOP: [&str; 64] = [
    "nop",        "ld bc, xxxx", "ld (bc), a",  "inc bc", "inc b",    "dec b",    "ld b, xx",    "rlca",
    "ld (xxxx), sp", "add hl, bc", "ld a, (bc)", "dec bc", "inc c",   "dec c",    "ld c, xx",    "rrca",
    "stop",       "ld de, xxxx", "ld (de), a",  "inc de", "inc d",    "dec d",    "ld d, xx",    "rla",
    "jr xx",      "add hl, de",  "ld a, (de)",  "dec de", "inc e",    "dec e",    "ld e, xx",    "rra",
    "jr nz, xx",  "ld hl, xxxx", "ld (hl+), a", "inc hl", "inc h",    "dec h",    "ld h, xx",    "daa",
    "jr z, xx",   "add hl, hl",  "ld a, (hl+)", "dec hl", "inc l",    "dec l",    "ld l, xx",    "cpl",
    "jr nc, xx",  "ld sp, xxxx", "ld (hl-), a", "inc sp", "inc (hl)", "dec (hl)", "ld (hl), xx", "scf",
    "jr c, xx",   "add hl, sp",  "ld a, (hl-)", "dec sp", "inc a",    "dec a",    "ld a, xx",    "ccf",
];

#[rustfmt::skip]
const PRIMARY_BOTTOM: [&str; 64] = [
    "ret nz",      "pop bc", "jp nz, xxxx", "jp xxxx",  "call nz, xxxx", "push bc", "add a, xx", "rst 00h",
    "ret z",       "ret",    "jp z, xxxx",  "cb",       "call z, xxxx",  "call xxxx", "adc a, xx", "rst 08h",
    "ret nc",      "pop de", "jp nc, xxxx", "nop d3",   "call nc, xxxx", "push de", "sub xx",    "rst 10h",
    "ret c",       "reti",   "jp c, xxxx",  "nop db",   "call c, xxxx",  "nop dd",  "sbc a, xx", "rst 18h",
    "ldh (xx), a", "pop hl", "ld (c), a",   "nop e3",   "nop e4",        "push hl", "and xx",    "rst 20h",
    "add sp, xx",  "jp (hl)", "ld (xxxx), a", "nop eb", "nop ec",        "nop ed",  "xor xx",    "rst 28h",
    "ldh a, (xx)", "pop af", "ld a, (c)",   "di",       "nop f4",        "push af", "or xx",     "rst 30h",
    "ld hl, sp+xx", "ld sp, hl", "ld a, (xxxx)", "ei",  "nop fc",        "nop fd",  "cp xx",     "rst 38h",
];

static MNEMONICS: Lazy<[Vec<String>; 2]> = Lazy::new(build_mnemonics);

fn build_mnemonics() -> [Vec<String>; 2] {
    let mut primary: Vec<String> = PRIMARY_TOP.iter().map(|s| s.to_string()).collect();

    for d in 0..8 {
        for s in 0..8 {
            if d == 6 && s == 6 {
                primary.push("halt".to_string());
            } else {
                primary.push(format!("ld {}, {}", R8_NAMES[d], R8_NAMES[s]));
            }
        }
    }
    for alu in ["add a", "adc a", "sub a", "sbc a", "and a", "xor a", "or a", "cp a"] {
        for name in R8_NAMES {
            primary.push(format!("{alu}, {name}"));
        }
    }
    primary.extend(PRIMARY_BOTTOM.iter().map(|s| s.to_string()));

    let mut extended = Vec::with_capacity(256);
    for shift in ["rlc", "rrc", "rl", "rr", "sla", "sra", "swap", "srl"] {
        for name in R8_NAMES {
            extended.push(format!("{shift} {name}"));
        }
    }
    for group in ["bit", "res", "set"] {
        for index in 0..8 {
            for name in R8_NAMES {
                extended.push(format!("{group} {index}, {name}"));
            }
        }
    }

    [primary, extended]
}

/// Mnemonic for an opcode in the given instruction set.
pub fn mnemonic(set: usize, opcode: u8) -> &'static str {
    MNEMONICS[set.min(1)][opcode as usize].as_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_fully_populated() {
        assert_eq!(PRIMARY.len(), 256);
        assert_eq!(EXTENDED.len(), 256);
    }

    #[test]
    fn mnemonics_line_up_with_the_layout() {
        assert_eq!(mnemonic(0, 0x00), "nop");
        assert_eq!(mnemonic(0, 0x41), "ld b, c");
        assert_eq!(mnemonic(0, 0x76), "halt");
        assert_eq!(mnemonic(0, 0x96), "sub a, (hl)");
        assert_eq!(mnemonic(0, 0xC3), "jp xxxx");
        assert_eq!(mnemonic(0, 0xFF), "rst 38h");
        assert_eq!(mnemonic(1, 0x00), "rlc b");
        assert_eq!(mnemonic(1, 0x46), "bit 0, (hl)");
        assert_eq!(mnemonic(1, 0xFF), "set 7, a");
    }

    #[test]
    fn illegal_entries_carry_their_opcode() {
        for opcode in ILLEGAL_OPCODES {
            let entry = PRIMARY[opcode as usize];
            assert_eq!(entry.operand.data, opcode);
        }
    }

    #[test]
    fn conditional_branch_rows_encode_their_conditions() {
        assert_eq!(PRIMARY[0x20].operand.cond, Cond::NonZero);
        assert_eq!(PRIMARY[0x28].operand.cond, Cond::Zero);
        assert_eq!(PRIMARY[0x30].operand.cond, Cond::NoCarry);
        assert_eq!(PRIMARY[0x38].operand.cond, Cond::Carry);
        assert_eq!(PRIMARY[0xC3].operand.cond, Cond::Always);
        assert_eq!(PRIMARY[0xC3].operand.cycles, 16);
        assert_eq!(PRIMARY[0x20].operand.cycles, 8);
    }
}
