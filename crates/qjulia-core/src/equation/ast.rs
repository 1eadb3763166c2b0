//! Expression tree and quaternion evaluator for compiled equations.

use crate::quaternion::Quaternion;

/// A unary transcendental recognised by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Sinh,
    Cosh,
    Tanh,
    Exp,
    Log,
    Sqrt,
}

impl Func {
    /// Looks a function up by its (lower-case) name. `ln` aliases `log`.
    pub(super) fn from_name(name: &str) -> Option<Self> {
        match name {
            "sin" => Some(Self::Sin),
            "cos" => Some(Self::Cos),
            "tan" => Some(Self::Tan),
            "sinh" => Some(Self::Sinh),
            "cosh" => Some(Self::Cosh),
            "tanh" => Some(Self::Tanh),
            "exp" => Some(Self::Exp),
            "log" | "ln" => Some(Self::Log),
            "sqrt" => Some(Self::Sqrt),
            _ => None,
        }
    }
}

/// A binary arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// An immutable expression tree over `Z`, `C`, and numeric literals.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// The iterated variable.
    Z,
    /// The configured constant.
    C,
    /// A numeric literal, lifted onto the real axis.
    Literal(f32),
    /// Unary negation.
    Neg(Box<Expr>),
    /// A binary operation.
    Binary(BinOp, Box<Expr>, Box<Expr>),
    /// A unary transcendental application.
    Call(Func, Box<Expr>),
}

impl Expr {
    /// Evaluates the expression at `z` with constant `c`.
    ///
    /// Returns `None` when a division hits a zero-norm divisor; the caller
    /// treats the sample as escaped.
    pub(crate) fn eval(&self, z: Quaternion, c: Quaternion) -> Option<Quaternion> {
        match self {
            Self::Z => Some(z),
            Self::C => Some(c),
            Self::Literal(value) => Some(Quaternion::from_real(*value)),
            Self::Neg(inner) => Some(-inner.eval(z, c)?),
            Self::Binary(op, lhs, rhs) => {
                let a = lhs.eval(z, c)?;
                let b = rhs.eval(z, c)?;
                match op {
                    BinOp::Add => Some(a + b),
                    BinOp::Sub => Some(a - b),
                    BinOp::Mul => Some(a * b),
                    BinOp::Div => {
                        if b.norm_sqr() == 0.0 {
                            None
                        } else {
                            Some(a / b)
                        }
                    }
                }
            }
            Self::Call(func, inner) => {
                let q = inner.eval(z, c)?;
                Some(match func {
                    Func::Sin => q.sin(),
                    Func::Cos => q.cos(),
                    Func::Tan => q.tan(),
                    Func::Sinh => q.sinh(),
                    Func::Cosh => q.cosh(),
                    Func::Tanh => q.tanh(),
                    Func::Exp => q.exp(),
                    Func::Log => q.log(),
                    Func::Sqrt => q.sqrt(),
                })
            }
        }
    }
}
