//! Expression tree: an immutable algebraic AST owned by the gate that
//! references it (Combinational output expressions, Assert predicates).
//! Grounded in `original_source/src/gateExpression.{h,cpp}`.

use crate::error::{Error, Result};
use crate::sigconst::{mix, seed};

/// `enum ExpressionBinOperator` in the original, same enumeration order
/// (AND, OR, XOR, ADD, SUB, MUL, DIV, MOD, LSR, LSL, ASR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BinOp {
    And = 0,
    Or = 1,
    Xor = 2,
    Add = 3,
    Sub = 4,
    Mul = 5,
    Div = 6,
    Mod = 7,
    Lsr = 8,
    Lsl = 9,
    Asr = 10,
}

impl BinOp {
    /// AND, OR, XOR, ADD, MUL are associative-commutative: their signature
    /// combines operands with `+`; the rest use `-` so
    /// operand order is reflected in the signature.
    fn is_commutative(self) -> bool {
        matches!(self, BinOp::And | BinOp::Or | BinOp::Xor | BinOp::Add | BinOp::Mul)
    }

    fn seed(self) -> u64 {
        match self {
            BinOp::And => seed::BAND,
            BinOp::Or => seed::BOR,
            BinOp::Xor => seed::BXOR,
            BinOp::Add => seed::BADD,
            BinOp::Sub => seed::BSUB,
            BinOp::Mul => seed::BMUL,
            BinOp::Div => seed::BDIV,
            BinOp::Mod => seed::BMOD,
            BinOp::Lsr => seed::BLSR,
            BinOp::Lsl => seed::BLSL,
            BinOp::Asr => seed::BASR,
        }
    }
}

/// `enum ExpressionUnOperator` in the original.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum UnOp {
    Not = 0,
}

impl UnOp {
    fn seed(self) -> u64 {
        match self {
            UnOp::Not => seed::UNOT,
        }
    }
}

/// `enum ExpressionUnOperatorCst` in the original.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum UnConstOp {
    CLsr = 0,
    CLsl = 1,
    CAsr = 2,
}

impl UnConstOp {
    fn seed(self) -> u64 {
        match self {
            UnConstOp::CLsr => seed::UCLSR,
            UnConstOp::CLsl => seed::UCLSL,
            UnConstOp::CAsr => seed::UCASR,
        }
    }
}

/// `sliceMulInner` in the original: the fixed per-index multiplier mixed
/// into `Slice`'s signature as `end * K - begin`.
const SLICE_MUL_INNER: u64 = 0x1_0000_0001;

/// The expression AST. Owned recursively by the gate that references it;
/// destroying a gate destroys its expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Constant(u64),
    /// Input-pin index of the enclosing gate.
    Variable(usize),
    BinaryOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    UnaryOp {
        op: UnOp,
        expr: Box<Expr>,
    },
    UnaryConstOp {
        op: UnConstOp,
        param: i64,
        expr: Box<Expr>,
    },
    Slice {
        expr: Box<Expr>,
        begin: u32,
        end: u32,
    },
    Merge {
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    pub fn constant(value: u64) -> Self {
        Expr::Constant(value)
    }

    pub fn variable(input_pin: usize) -> Self {
        Expr::Variable(input_pin)
    }

    pub fn binop(op: BinOp, left: Expr, right: Expr) -> Self {
        Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unop(op: UnOp, expr: Expr) -> Self {
        Expr::UnaryOp {
            op,
            expr: Box::new(expr),
        }
    }

    pub fn unop_const(op: UnConstOp, param: i64, expr: Expr) -> Self {
        Expr::UnaryConstOp {
            op,
            param,
            expr: Box::new(expr),
        }
    }

    pub fn slice(expr: Expr, begin: u32, end: u32) -> Self {
        Expr::Slice {
            expr: Box::new(expr),
            begin,
            end,
        }
    }

    pub fn merge(left: Expr, right: Expr) -> Self {
        Expr::Merge {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// 64-bit signature, computed with wrapping arithmetic (the original's
    /// `sig_t` is an unsigned 64-bit integer in C++, where overflow silently
    /// wraps).
    pub fn sign(&self) -> Result<u64> {
        match self {
            Expr::Constant(val) => Ok(mix(seed::NUMCONST, *val)),
            Expr::Variable(id) => Ok(mix(seed::WIREID, *id as u64)),
            Expr::BinaryOp { op, left, right } => {
                let l = left.sign()?;
                let r = right.sign()?;
                let combined = if op.is_commutative() {
                    l.wrapping_add(r)
                } else {
                    l.wrapping_sub(r)
                };
                Ok(mix(op.seed(), combined))
            }
            Expr::UnaryOp { op, expr } => Ok(mix(op.seed(), expr.sign()?)),
            Expr::UnaryConstOp { op, param, expr } => {
                let cst = mix(seed::CSTINT, *param as u64);
                Ok(mix(op.seed(), expr.sign()?.wrapping_sub(cst)))
            }
            Expr::Slice { expr, begin, end } => {
                let bounds = (*end as u64)
                    .wrapping_mul(SLICE_MUL_INNER)
                    .wrapping_sub(*begin as u64);
                let boundsig = mix(seed::SLICEBOUNDS, bounds);
                Ok(mix(seed::SLICE, expr.sign()?.wrapping_sub(boundsig)))
            }
            Expr::Merge { left, right } => {
                let combined = left.sign()?.wrapping_sub(right.sign()?);
                Ok(mix(seed::MERGE, combined))
            }
        }
    }

    /// Structural, total equality -- no algebraic normalization.
    pub fn equals(&self, other: &Expr) -> bool {
        match (self, other) {
            (Expr::Constant(a), Expr::Constant(b)) => a == b,
            (Expr::Variable(a), Expr::Variable(b)) => a == b,
            (
                Expr::BinaryOp { op: oa, left: la, right: ra },
                Expr::BinaryOp { op: ob, left: lb, right: rb },
            ) => oa == ob && la.equals(lb) && ra.equals(rb),
            (Expr::UnaryOp { op: oa, expr: ea }, Expr::UnaryOp { op: ob, expr: eb }) => {
                oa == ob && ea.equals(eb)
            }
            (
                Expr::UnaryConstOp { op: oa, param: pa, expr: ea },
                Expr::UnaryConstOp { op: ob, param: pb, expr: eb },
            ) => oa == ob && pa == pb && ea.equals(eb),
            (
                Expr::Slice { expr: ea, begin: ba, end: na },
                Expr::Slice { expr: eb, begin: bb, end: nb },
            ) => ba == bb && na == nb && ea.equals(eb),
            (Expr::Merge { left: la, right: ra }, Expr::Merge { left: lb, right: rb }) => {
                la.equals(lb) && ra.equals(rb)
            }
            _ => false,
        }
    }
}

/// Raised only if expression dispatch ever falls through an exhaustively
/// enumerated match -- unreachable with Rust's closed enums, kept as a
/// defensive marker of the invariant the original's `switch` relied upon.
#[allow(dead_code)]
fn unimplemented_operator() -> Error {
    Error::UnimplementedOperator
}
