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

use super::{to_filter_string, Predicate};
use crate::{StorageRequest, StorageType};
use azstore_core::{Result, QUERY_ENCODE_SET};
use percent_encoding::utf8_percent_encode;

/// TableQuery addresses the entities of a table, optionally filtered.
///
/// ```
/// use azstore_storage::predicate::{ComparisonOperator, Predicate, TableQuery};
///
/// let query = TableQuery::new("People")
///     .filter(Predicate::compare("Age", ComparisonOperator::Gt, 30))
///     .top(10);
/// assert_eq!(query.endpoint().unwrap(), "People()?$filter=Age%20gt%2030&$top=10");
/// ```
#[derive(Debug, Clone)]
pub struct TableQuery {
    table: String,
    filter: Option<Predicate>,
    top: Option<u32>,
}

impl TableQuery {
    /// Query all entities of `table`.
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            filter: None,
            top: None,
        }
    }

    /// Only return entities matching `predicate`.
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.filter = Some(predicate);
        self
    }

    /// Return at most `n` entities.
    pub fn top(mut self, n: u32) -> Self {
        self.top = Some(n);
        self
    }

    /// Render the endpoint relative to the table service url.
    pub fn endpoint(&self) -> Result<String> {
        let mut endpoint = format!("{}()", self.table);
        let mut sep = '?';

        if let Some(p) = &self.filter {
            let filter = to_filter_string(p)?;
            endpoint.push(sep);
            endpoint.push_str("$filter=");
            endpoint.extend(utf8_percent_encode(&filter, &QUERY_ENCODE_SET));
            sep = '&';
        }
        if let Some(n) = self.top {
            endpoint.push(sep);
            endpoint.push_str(&format!("$top={n}"));
        }

        Ok(endpoint)
    }

    /// Build a `GET` request for this query.
    pub fn to_request(&self) -> Result<StorageRequest> {
        Ok(StorageRequest::new(self.endpoint()?, StorageType::Table))
    }
}
