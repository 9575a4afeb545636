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

use super::{translate, ComparisonOperator, Expression, FilterVisitor, Predicate, Value};
use azstore_core::{Error, Result};
use chrono::SecondsFormat;
use std::fmt::Write;

/// ODataFilter renders translation events into a `$filter` expression.
///
/// Every compound is wrapped in parentheses, so the output never depends on
/// operator precedence.
#[derive(Debug, Default)]
pub struct ODataFilter {
    out: String,
    frames: Vec<Frame>,
    error: Option<String>,
}

#[derive(Debug)]
struct Frame {
    separator: &'static str,
    remaining: usize,
    started: bool,
}

impl ODataFilter {
    /// Create an empty renderer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the rendered filter.
    ///
    /// Fails if translation reported an error or the event stream was incomplete.
    pub fn finish(self) -> Result<String> {
        if let Some(msg) = self.error {
            return Err(Error::unsupported_predicate(msg));
        }
        if !self.frames.is_empty() || self.out.is_empty() {
            return Err(Error::unsupported_predicate("incomplete predicate"));
        }
        Ok(self.out)
    }

    fn begin_node(&mut self) {
        if let Some(top) = self.frames.last_mut() {
            if top.started {
                self.out.push_str(top.separator);
            }
            top.started = true;
        }
    }

    fn end_node(&mut self) {
        while let Some(top) = self.frames.last_mut() {
            top.remaining = top.remaining.saturating_sub(1);
            if top.remaining > 0 {
                break;
            }
            self.out.push(')');
            self.frames.pop();
        }
    }

    fn open(&mut self, prefix: &str, separator: &'static str, children: usize) {
        if children == 0 {
            self.error = Some("compound predicate has no children".to_string());
        }
        self.begin_node();
        self.out.push_str(prefix);
        self.out.push('(');
        self.frames.push(Frame {
            separator,
            remaining: children,
            started: false,
        });
    }

    fn write_expression(&mut self, expr: &Expression) {
        match expr {
            Expression::Property(name) => self.out.push_str(name),
            Expression::Constant(Value::Double(v)) if !v.is_finite() => {
                self.error = Some(format!("double {v} has no filter representation"));
            }
            Expression::Constant(value) => write_value(&mut self.out, value),
        }
    }
}

fn write_value(out: &mut String, value: &Value) {
    // Writing into a String cannot fail.
    let _ = match value {
        Value::String(v) => write!(out, "'{}'", v.replace('\'', "''")),
        Value::Int(v) => write!(out, "{v}"),
        Value::Long(v) => write!(out, "{v}L"),
        Value::Double(v) => write!(out, "{v:?}"),
        Value::Bool(v) => write!(out, "{v}"),
        Value::DateTime(v) => write!(
            out,
            "datetime'{}'",
            v.to_rfc3339_opts(SecondsFormat::AutoSi, true)
        ),
        Value::Guid(v) => write!(out, "guid'{v}'"),
    };
}

impl FilterVisitor for ODataFilter {
    fn on_comparison(&mut self, op: ComparisonOperator, left: &Expression, right: &Expression) {
        let Some(keyword) = op.as_odata() else {
            self.error = Some(format!("operator {op} has no filter representation"));
            return;
        };

        self.begin_node();
        self.write_expression(left);
        self.out.push(' ');
        self.out.push_str(keyword);
        self.out.push(' ');
        self.write_expression(right);
        self.end_node();
    }

    fn on_and(&mut self, children: &[Predicate]) {
        self.open("", " and ", children.len());
    }

    fn on_or(&mut self, children: &[Predicate]) {
        self.open("", " or ", children.len());
    }

    fn on_not(&mut self, _: &Predicate) {
        self.open("not ", "", 1);
    }

    fn on_error(&mut self, error: &Error) {
        self.error = Some(error.message().to_string());
    }
}

/// Render `predicate` as a `$filter` expression.
pub fn to_filter_string(predicate: &Predicate) -> Result<String> {
    let mut filter = ODataFilter::new();
    translate(predicate, &mut filter)?;
    filter.finish()
}
