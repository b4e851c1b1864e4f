//! Expression nodes for shader genomes.
//!
//! Every node reports the ordered types of its input slots, the type of the
//! value it produces, and renders an expression from one operand expression
//! per slot. The set of node kinds is closed; concrete operators (which
//! functions, members or swizzles exist) are supplied by the caller.

use serde::{Deserialize, Serialize};

/// An expression builder in the shader graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// Leaf expression such as a constant or a uniform: `uResolution`.
    Input {
        /// Expression text emitted verbatim.
        expression: String,
        /// Type of the expression.
        output_type: String,
    },
    /// Final value of the program, passes its single operand through.
    Output {
        /// Type received and produced.
        value_type: String,
    },
    /// Member access with dot notation: `(x).member`.
    Member {
        /// Member name or swizzle.
        member: String,
        output_type: String,
        input_type: String,
    },
    /// Infix binary operator: `(a)op(b)`.
    BinaryOperator {
        operator: String,
        output_type: String,
        input_types: [String; 2],
    },
    /// Prefix unary operator: `(op(a))`.
    UnaryOperator {
        operator: String,
        output_type: String,
        input_type: String,
    },
    /// Function call: `name(a,b,...)`.
    FunctionCall {
        name: String,
        output_type: String,
        input_types: Vec<String>,
    },
    /// Constant array index: `(a)[index]`.
    ArrayIndex {
        index: usize,
        output_type: String,
        input_type: String,
    },
}

impl Node {
    /// Leaf expression of the given type.
    #[must_use]
    pub fn input(expression: impl Into<String>, output_type: impl Into<String>) -> Self {
        Self::Input {
            expression: expression.into(),
            output_type: output_type.into(),
        }
    }

    /// Program output of the given type.
    #[must_use]
    pub fn output(value_type: impl Into<String>) -> Self {
        Self::Output {
            value_type: value_type.into(),
        }
    }

    #[must_use]
    pub fn member(
        member: impl Into<String>,
        output_type: impl Into<String>,
        input_type: impl Into<String>,
    ) -> Self {
        Self::Member {
            member: member.into(),
            output_type: output_type.into(),
            input_type: input_type.into(),
        }
    }

    #[must_use]
    pub fn binary_operator(
        operator: impl Into<String>,
        output_type: impl Into<String>,
        left_type: impl Into<String>,
        right_type: impl Into<String>,
    ) -> Self {
        Self::BinaryOperator {
            operator: operator.into(),
            output_type: output_type.into(),
            input_types: [left_type.into(), right_type.into()],
        }
    }

    #[must_use]
    pub fn unary_operator(
        operator: impl Into<String>,
        output_type: impl Into<String>,
        input_type: impl Into<String>,
    ) -> Self {
        Self::UnaryOperator {
            operator: operator.into(),
            output_type: output_type.into(),
            input_type: input_type.into(),
        }
    }

    #[must_use]
    pub fn function_call<I, S>(name: impl Into<String>, output_type: impl Into<String>, input_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::FunctionCall {
            name: name.into(),
            output_type: output_type.into(),
            input_types: input_types.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn array_index(index: usize, output_type: impl Into<String>, input_type: impl Into<String>) -> Self {
        Self::ArrayIndex {
            index,
            output_type: output_type.into(),
            input_type: input_type.into(),
        }
    }

    /// Ordered types of the input slots.
    #[must_use]
    pub fn input_types(&self) -> &[String] {
        match self {
            Self::Input { .. } => &[],
            Self::Output { value_type } => std::slice::from_ref(value_type),
            Self::Member { input_type, .. }
            | Self::UnaryOperator { input_type, .. }
            | Self::ArrayIndex { input_type, .. } => std::slice::from_ref(input_type),
            Self::BinaryOperator { input_types, .. } => input_types.as_slice(),
            Self::FunctionCall { input_types, .. } => input_types.as_slice(),
        }
    }

    /// Type of the produced value.
    #[must_use]
    pub fn output_type(&self) -> &str {
        match self {
            Self::Output { value_type } => value_type,
            Self::Input { output_type, .. }
            | Self::Member { output_type, .. }
            | Self::BinaryOperator { output_type, .. }
            | Self::UnaryOperator { output_type, .. }
            | Self::FunctionCall { output_type, .. }
            | Self::ArrayIndex { output_type, .. } => output_type,
        }
    }

    /// Number of input slots.
    #[inline]
    #[must_use]
    pub fn arity(&self) -> usize {
        self.input_types().len()
    }

    /// Whether this is the program sink. Sinks never feed other nodes.
    #[inline]
    #[must_use]
    pub fn is_output(&self) -> bool {
        matches!(self, Self::Output { .. })
    }

    /// Render the expression from one operand expression per input slot.
    ///
    /// Missing operands render as empty text; the downstream compiler is
    /// responsible for rejecting incomplete programs.
    #[must_use]
    pub fn render(&self, operands: &[String]) -> String {
        let operand = |i: usize| operands.get(i).map_or("", String::as_str);

        match self {
            Self::Input { expression, .. } => expression.clone(),
            Self::Output { .. } => operand(0).to_string(),
            Self::Member { member, .. } => format!("({}).{}", operand(0), member),
            Self::BinaryOperator { operator, .. } => {
                format!("({}){}({})", operand(0), operator, operand(1))
            }
            Self::UnaryOperator { operator, .. } => format!("({}({}))", operator, operand(0)),
            Self::FunctionCall { name, .. } => format!("{}({})", name, operands.join(",")),
            Self::ArrayIndex { index, .. } => format!("({})[{}]", operand(0), index),
        }
    }
}
