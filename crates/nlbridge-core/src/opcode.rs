//! External opcode numbering and its translation to operation tags.
//!
//! Numeric codes follow the AMPL solver library operation table. Codes
//! with no operation (holes in the numbering, or anything at or beyond
//! [`N_OPS`]) are rejected by [`OpcodeTable::translate`].

use crate::error::TranslateError;
use std::sync::OnceLock;

/// Size of the external operation table.
pub const N_OPS: usize = 83;

pub const PLUS: u32 = 0;
pub const MINUS: u32 = 1;
pub const MULT: u32 = 2;
pub const DIV: u32 = 3;
pub const REM: u32 = 4;
pub const POW: u32 = 5;
pub const LESS: u32 = 6;
pub const MINLIST: u32 = 11;
pub const MAXLIST: u32 = 12;
pub const FLOOR: u32 = 13;
pub const CEIL: u32 = 14;
pub const ABS: u32 = 15;
pub const UMINUS: u32 = 16;
pub const OR: u32 = 20;
pub const AND: u32 = 21;
pub const LT: u32 = 22;
pub const LE: u32 = 23;
pub const EQ: u32 = 24;
pub const GE: u32 = 28;
pub const GT: u32 = 29;
pub const NE: u32 = 30;
pub const NOT: u32 = 34;
pub const IFNL: u32 = 35;
pub const TANH: u32 = 37;
pub const TAN: u32 = 38;
pub const SQRT: u32 = 39;
pub const SINH: u32 = 40;
pub const SIN: u32 = 41;
pub const LOG10: u32 = 42;
pub const LOG: u32 = 43;
pub const EXP: u32 = 44;
pub const COSH: u32 = 45;
pub const COS: u32 = 46;
pub const ATANH: u32 = 47;
pub const ATAN2: u32 = 48;
pub const ATAN: u32 = 49;
pub const ASINH: u32 = 50;
pub const ASIN: u32 = 51;
pub const ACOSH: u32 = 52;
pub const ACOS: u32 = 53;
pub const SUMLIST: u32 = 54;
pub const INTDIV: u32 = 55;
pub const PRECISION: u32 = 56;
pub const ROUND: u32 = 57;
pub const TRUNC: u32 = 58;
pub const COUNT: u32 = 59;
pub const NUMBEROF: u32 = 60;
pub const NUMBEROFS: u32 = 61;
pub const ATLEAST: u32 = 62;
pub const ATMOST: u32 = 63;
pub const PLTERM: u32 = 64;
pub const IFSYM: u32 = 65;
pub const EXACTLY: u32 = 66;
pub const NOTATLEAST: u32 = 67;
pub const NOTATMOST: u32 = 68;
pub const NOTEXACTLY: u32 = 69;
pub const ANDLIST: u32 = 70;
pub const ORLIST: u32 = 71;
pub const IMPELSE: u32 = 72;
pub const IFF: u32 = 73;
pub const ALLDIFF: u32 = 74;
pub const SOMESAME: u32 = 75;
pub const POW_CONST_EXPONENT: u32 = 76;
pub const POW2: u32 = 77;
pub const POW_CONST_BASE: u32 = 78;
pub const FUNCALL: u32 = 79;
pub const NUM: u32 = 80;
pub const HOL: u32 = 81;
pub const VARVAL: u32 = 82;

/// Internal operation tag of an external opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpTag {
    Plus,
    Minus,
    Mult,
    Div,
    Rem,
    Pow,
    Less,
    MinList,
    MaxList,
    Floor,
    Ceil,
    Abs,
    UMinus,
    Or,
    And,
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
    Ne,
    Not,
    IfNl,
    Tanh,
    Tan,
    Sqrt,
    Sinh,
    Sin,
    Log10,
    Log,
    Exp,
    Cosh,
    Cos,
    Atanh,
    Atan2,
    Atan,
    Asinh,
    Asin,
    Acosh,
    Acos,
    SumList,
    IntDiv,
    Precision,
    Round,
    Trunc,
    Count,
    NumberOf,
    NumberOfSym,
    AtLeast,
    AtMost,
    PlTerm,
    IfSym,
    Exactly,
    NotAtLeast,
    NotAtMost,
    NotExactly,
    AndList,
    OrList,
    ImpElse,
    Iff,
    AllDiff,
    SomeSame,
    /// Power with a literal exponent.
    PowConstExponent,
    /// Square.
    Pow2,
    /// Power with a literal base.
    PowConstBase,
    FunCall,
    Num,
    Hol,
    VarVal,
}

impl OpTag {
    pub fn as_str(self) -> &'static str {
        match self {
            OpTag::Plus => "plus",
            OpTag::Minus => "minus",
            OpTag::Mult => "mult",
            OpTag::Div => "div",
            OpTag::Rem => "rem",
            OpTag::Pow => "pow",
            OpTag::Less => "less",
            OpTag::MinList => "minlist",
            OpTag::MaxList => "maxlist",
            OpTag::Floor => "floor",
            OpTag::Ceil => "ceil",
            OpTag::Abs => "abs",
            OpTag::UMinus => "uminus",
            OpTag::Or => "or",
            OpTag::And => "and",
            OpTag::Lt => "lt",
            OpTag::Le => "le",
            OpTag::Eq => "eq",
            OpTag::Ge => "ge",
            OpTag::Gt => "gt",
            OpTag::Ne => "ne",
            OpTag::Not => "not",
            OpTag::IfNl => "if",
            OpTag::Tanh => "tanh",
            OpTag::Tan => "tan",
            OpTag::Sqrt => "sqrt",
            OpTag::Sinh => "sinh",
            OpTag::Sin => "sin",
            OpTag::Log10 => "log10",
            OpTag::Log => "log",
            OpTag::Exp => "exp",
            OpTag::Cosh => "cosh",
            OpTag::Cos => "cos",
            OpTag::Atanh => "atanh",
            OpTag::Atan2 => "atan2",
            OpTag::Atan => "atan",
            OpTag::Asinh => "asinh",
            OpTag::Asin => "asin",
            OpTag::Acosh => "acosh",
            OpTag::Acos => "acos",
            OpTag::SumList => "sumlist",
            OpTag::IntDiv => "intdiv",
            OpTag::Precision => "precision",
            OpTag::Round => "round",
            OpTag::Trunc => "trunc",
            OpTag::Count => "count",
            OpTag::NumberOf => "numberof",
            OpTag::NumberOfSym => "numberofs",
            OpTag::AtLeast => "atleast",
            OpTag::AtMost => "atmost",
            OpTag::PlTerm => "plterm",
            OpTag::IfSym => "ifsym",
            OpTag::Exactly => "exactly",
            OpTag::NotAtLeast => "!atleast",
            OpTag::NotAtMost => "!atmost",
            OpTag::NotExactly => "!exactly",
            OpTag::AndList => "andlist",
            OpTag::OrList => "orlist",
            OpTag::ImpElse => "implies",
            OpTag::Iff => "iff",
            OpTag::AllDiff => "alldiff",
            OpTag::SomeSame => "somesame",
            OpTag::PowConstExponent => "1pow",
            OpTag::Pow2 => "2pow",
            OpTag::PowConstBase => "cpow",
            OpTag::FunCall => "funcall",
            OpTag::Num => "number",
            OpTag::Hol => "string",
            OpTag::VarVal => "variable",
        }
    }
}

const OPCODES: &[(u32, OpTag)] = &[
    (PLUS, OpTag::Plus),
    (MINUS, OpTag::Minus),
    (MULT, OpTag::Mult),
    (DIV, OpTag::Div),
    (REM, OpTag::Rem),
    (POW, OpTag::Pow),
    (LESS, OpTag::Less),
    (MINLIST, OpTag::MinList),
    (MAXLIST, OpTag::MaxList),
    (FLOOR, OpTag::Floor),
    (CEIL, OpTag::Ceil),
    (ABS, OpTag::Abs),
    (UMINUS, OpTag::UMinus),
    (OR, OpTag::Or),
    (AND, OpTag::And),
    (LT, OpTag::Lt),
    (LE, OpTag::Le),
    (EQ, OpTag::Eq),
    (GE, OpTag::Ge),
    (GT, OpTag::Gt),
    (NE, OpTag::Ne),
    (NOT, OpTag::Not),
    (IFNL, OpTag::IfNl),
    (TANH, OpTag::Tanh),
    (TAN, OpTag::Tan),
    (SQRT, OpTag::Sqrt),
    (SINH, OpTag::Sinh),
    (SIN, OpTag::Sin),
    (LOG10, OpTag::Log10),
    (LOG, OpTag::Log),
    (EXP, OpTag::Exp),
    (COSH, OpTag::Cosh),
    (COS, OpTag::Cos),
    (ATANH, OpTag::Atanh),
    (ATAN2, OpTag::Atan2),
    (ATAN, OpTag::Atan),
    (ASINH, OpTag::Asinh),
    (ASIN, OpTag::Asin),
    (ACOSH, OpTag::Acosh),
    (ACOS, OpTag::Acos),
    (SUMLIST, OpTag::SumList),
    (INTDIV, OpTag::IntDiv),
    (PRECISION, OpTag::Precision),
    (ROUND, OpTag::Round),
    (TRUNC, OpTag::Trunc),
    (COUNT, OpTag::Count),
    (NUMBEROF, OpTag::NumberOf),
    (NUMBEROFS, OpTag::NumberOfSym),
    (ATLEAST, OpTag::AtLeast),
    (ATMOST, OpTag::AtMost),
    (PLTERM, OpTag::PlTerm),
    (IFSYM, OpTag::IfSym),
    (EXACTLY, OpTag::Exactly),
    (NOTATLEAST, OpTag::NotAtLeast),
    (NOTATMOST, OpTag::NotAtMost),
    (NOTEXACTLY, OpTag::NotExactly),
    (ANDLIST, OpTag::AndList),
    (ORLIST, OpTag::OrList),
    (IMPELSE, OpTag::ImpElse),
    (IFF, OpTag::Iff),
    (ALLDIFF, OpTag::AllDiff),
    (SOMESAME, OpTag::SomeSame),
    (POW_CONST_EXPONENT, OpTag::PowConstExponent),
    (POW2, OpTag::Pow2),
    (POW_CONST_BASE, OpTag::PowConstBase),
    (FUNCALL, OpTag::FunCall),
    (NUM, OpTag::Num),
    (HOL, OpTag::Hol),
    (VARVAL, OpTag::VarVal),
];

/// Dense opcode → tag lookup.
#[derive(Debug, Clone)]
pub struct OpcodeTable {
    slots: Vec<Option<OpTag>>,
}

impl OpcodeTable {
    /// Populate every slot of the external operation table.
    pub fn build() -> Self {
        let mut slots = vec![None; N_OPS];
        for &(code, tag) in OPCODES {
            slots[code as usize] = Some(tag);
        }
        tracing::debug!(
            component = "opcode_table",
            operation = "build",
            status = "success",
            slots = N_OPS,
            mapped = OPCODES.len(),
            "Built opcode table"
        );
        Self { slots }
    }

    /// Process-wide table, built on first use.
    pub fn shared() -> &'static OpcodeTable {
        static TABLE: OnceLock<OpcodeTable> = OnceLock::new();
        TABLE.get_or_init(OpcodeTable::build)
    }

    pub fn translate(&self, opcode: u32) -> Result<OpTag, TranslateError> {
        self.slots
            .get(opcode as usize)
            .copied()
            .flatten()
            .ok_or(TranslateError::UnsupportedOperator { opcode, tag: None })
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_opcode_translates() {
        let table = OpcodeTable::build();
        for &(code, tag) in OPCODES {
            assert_eq!(table.translate(code).unwrap(), tag);
        }
        assert_eq!(table.len(), OPCODES.len());
    }

    #[test]
    fn codes_are_unique_and_in_range() {
        let mut seen = std::collections::HashSet::new();
        for &(code, _) in OPCODES {
            assert!((code as usize) < N_OPS);
            assert!(seen.insert(code), "duplicate opcode {code}");
        }
    }

    #[test]
    fn holes_and_out_of_range_are_unsupported() {
        let table = OpcodeTable::shared();
        for code in [7, 10, 17, 36, N_OPS as u32, u32::MAX] {
            assert_eq!(
                table.translate(code),
                Err(TranslateError::UnsupportedOperator {
                    opcode: code,
                    tag: None
                })
            );
        }
    }

    #[test]
    fn well_known_codes() {
        let table = OpcodeTable::shared();
        assert_eq!(table.translate(0).unwrap(), OpTag::Plus);
        assert_eq!(table.translate(16).unwrap(), OpTag::UMinus);
        assert_eq!(table.translate(54).unwrap(), OpTag::SumList);
        assert_eq!(table.translate(80).unwrap(), OpTag::Num);
        assert_eq!(table.translate(82).unwrap(), OpTag::VarVal);
        assert_eq!(OpTag::PowConstBase.as_str(), "cpow");
    }
}
