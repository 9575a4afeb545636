// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use chrono::{DateTime, Utc};
use std::fmt::{Display, Formatter};

/// A boolean expression over entity properties.
///
/// Trees are built by the caller and only read by [`translate`](super::translate).
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `left op right`.
    Comparison {
        /// The comparison to apply.
        op: ComparisonOperator,
        /// Left operand, usually a property.
        left: Expression,
        /// Right operand, usually a constant.
        right: Expression,
    },
    /// All children must hold.
    And(Vec<Predicate>),
    /// At least one child must hold.
    Or(Vec<Predicate>),
    /// The child must not hold.
    Not(Box<Predicate>),
    /// A predicate form that has no filter representation, named for error reporting.
    Extension(String),
}

impl Predicate {
    /// Compare a property with a constant.
    pub fn compare(property: &str, op: ComparisonOperator, value: impl Into<Value>) -> Self {
        Predicate::Comparison {
            op,
            left: Expression::Property(property.to_string()),
            right: Expression::Constant(value.into()),
        }
    }

    /// Conjunction of `children`, kept in the given order.
    pub fn and(children: Vec<Predicate>) -> Self {
        Predicate::And(children)
    }

    /// Disjunction of `children`, kept in the given order.
    pub fn or(children: Vec<Predicate>) -> Self {
        Predicate::Or(children)
    }

    /// Negation of `child`.
    #[allow(clippy::should_implement_trait)]
    pub fn not(child: Predicate) -> Self {
        Predicate::Not(Box::new(child))
    }
}

/// Operators a comparison may use.
///
/// Only the six ordering operators have a filter representation, the rest are
/// rejected during translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// Wildcard string match.
    Like,
    /// Regular expression match.
    Matches,
    /// String prefix match.
    BeginsWith,
    /// String suffix match.
    EndsWith,
    /// Membership in a collection.
    In,
    /// Substring or element match.
    Contains,
    /// Inclusive range.
    Between,
}

impl ComparisonOperator {
    /// The filter keyword for this operator, `None` if it has none.
    pub fn as_odata(&self) -> Option<&'static str> {
        match self {
            ComparisonOperator::Eq => Some("eq"),
            ComparisonOperator::Ne => Some("ne"),
            ComparisonOperator::Lt => Some("lt"),
            ComparisonOperator::Le => Some("le"),
            ComparisonOperator::Gt => Some("gt"),
            ComparisonOperator::Ge => Some("ge"),
            _ => None,
        }
    }

    /// Whether the operator can be rendered as a filter.
    pub fn is_supported(&self) -> bool {
        self.as_odata().is_some()
    }
}

impl Display for ComparisonOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ComparisonOperator::Eq => "=",
            ComparisonOperator::Ne => "!=",
            ComparisonOperator::Lt => "<",
            ComparisonOperator::Le => "<=",
            ComparisonOperator::Gt => ">",
            ComparisonOperator::Ge => ">=",
            ComparisonOperator::Like => "LIKE",
            ComparisonOperator::Matches => "MATCHES",
            ComparisonOperator::BeginsWith => "BEGINSWITH",
            ComparisonOperator::EndsWith => "ENDSWITH",
            ComparisonOperator::In => "IN",
            ComparisonOperator::Contains => "CONTAINS",
            ComparisonOperator::Between => "BETWEEN",
        };
        f.write_str(s)
    }
}

/// An operand of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// An entity property by name.
    Property(String),
    /// A literal value.
    Constant(Value),
}

/// Literal values, typed the way the table service types entity properties.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `Edm.String`
    String(String),
    /// `Edm.Int32`
    Int(i32),
    /// `Edm.Int64`
    Long(i64),
    /// `Edm.Double`
    Double(f64),
    /// `Edm.Boolean`
    Bool(bool),
    /// `Edm.DateTime`
    DateTime(DateTime<Utc>),
    /// `Edm.Guid` in its textual form.
    Guid(String),
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v)
    }
}
