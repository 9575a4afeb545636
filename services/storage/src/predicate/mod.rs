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

//! Structured filters for table queries.
//!
//! A [`Predicate`] is walked by [`translate`], which reports every node to a
//! [`FilterVisitor`]. [`ODataFilter`] is the visitor that renders the `$filter`
//! syntax understood by the table service, and [`TableQuery`] puts it into a
//! request endpoint.
//!
//! ```
//! use azstore_storage::predicate::{to_filter_string, ComparisonOperator, Predicate};
//!
//! let p = Predicate::and(vec![
//!     Predicate::compare("Age", ComparisonOperator::Gt, 30),
//!     Predicate::compare("Name", ComparisonOperator::Eq, "Bob"),
//! ]);
//! assert_eq!(to_filter_string(&p).unwrap(), "(Age gt 30 and Name eq 'Bob')");
//! ```

mod model;
pub use model::{ComparisonOperator, Expression, Predicate, Value};

mod translate;
pub use translate::{translate, FilterVisitor};

mod odata;
pub use odata::{to_filter_string, ODataFilter};

mod query;
pub use query::TableQuery;
