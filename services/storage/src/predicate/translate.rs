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

use super::{ComparisonOperator, Expression, Predicate};
use azstore_core::{Error, Result};
use log::debug;

/// FilterVisitor receives the nodes of a predicate in depth-first order.
///
/// Compound nodes are reported before their children so a renderer knows how
/// many children will follow.
pub trait FilterVisitor {
    /// A supported comparison.
    fn on_comparison(&mut self, op: ComparisonOperator, left: &Expression, right: &Expression);

    /// An `AND` node, its children follow in order.
    fn on_and(&mut self, children: &[Predicate]);

    /// An `OR` node, its children follow in order.
    fn on_or(&mut self, children: &[Predicate]);

    /// A `NOT` node, its child follows.
    fn on_not(&mut self, child: &Predicate);

    /// Translation stopped, no further events are sent.
    fn on_error(&mut self, error: &Error);
}

/// Walk `predicate` and report every node to `visitor`.
///
/// The walk stops at the first node that has no filter representation: an
/// extension, an unsupported operator or an empty `AND`/`OR`. That node is
/// reported through [`FilterVisitor::on_error`] and returned as
/// [`ErrorKind::UnsupportedPredicate`](azstore_core::ErrorKind::UnsupportedPredicate).
pub fn translate<V: FilterVisitor + ?Sized>(predicate: &Predicate, visitor: &mut V) -> Result<()> {
    visit(predicate, visitor).inspect_err(|err| {
        debug!("predicate translation aborted: {err}");
        visitor.on_error(err)
    })
}

fn visit<V: FilterVisitor + ?Sized>(predicate: &Predicate, visitor: &mut V) -> Result<()> {
    match predicate {
        Predicate::Comparison { op, left, right } => {
            if !op.is_supported() {
                return Err(Error::unsupported_predicate(format!(
                    "operator {op} has no filter representation"
                )));
            }
            visitor.on_comparison(*op, left, right);
        }
        Predicate::And(children) => {
            if children.is_empty() {
                return Err(Error::unsupported_predicate("AND without operands"));
            }
            visitor.on_and(children);
            for child in children {
                visit(child, visitor)?;
            }
        }
        Predicate::Or(children) => {
            if children.is_empty() {
                return Err(Error::unsupported_predicate("OR without operands"));
            }
            visitor.on_or(children);
            for child in children {
                visit(child, visitor)?;
            }
        }
        Predicate::Not(child) => {
            visitor.on_not(child);
            visit(child, visitor)?;
        }
        Predicate::Extension(name) => {
            return Err(Error::unsupported_predicate(format!(
                "predicate {name} has no filter representation"
            )));
        }
    }

    Ok(())
}
