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

use crate::constants::ENDPOINT_SUFFIX;
use azstore_core::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The storage service a request is addressed to.
///
/// Put it into the request extensions to pick the canonical form used for signing:
///
/// ```
/// use azstore_storage::StorageType;
///
/// let mut req = http::Request::get("https://proxy.example.com/tables/People()")
///     .body(())
///     .unwrap();
/// req.extensions_mut().insert(StorageType::Table);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageType {
    /// Blob service, containers and blobs.
    Blob,
    /// Table service, tables and entities.
    Table,
    /// Queue service, queues and messages.
    Queue,
}

impl StorageType {
    /// Lower-case name, also the host label of the public endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::Blob => "blob",
            StorageType::Table => "table",
            StorageType::Queue => "queue",
        }
    }

    /// Guess the storage type from a host like `acct.table.core.windows.net`.
    ///
    /// Returns `None` for hosts that do not follow the public endpoint layout.
    pub fn from_host(host: &str) -> Option<Self> {
        let rest = host.strip_suffix(ENDPOINT_SUFFIX)?.strip_suffix('.')?;
        let (_, label) = rest.rsplit_once('.')?;
        label.parse().ok()
    }
}

impl Display for StorageType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blob" => Ok(StorageType::Blob),
            "table" => Ok(StorageType::Table),
            "queue" => Ok(StorageType::Queue),
            v => Err(Error::config_invalid(format!("unknown storage type: {v}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("acct.blob.core.windows.net", Some(StorageType::Blob))]
    #[test_case("acct.table.core.windows.net", Some(StorageType::Table))]
    #[test_case("acct.queue.core.windows.net", Some(StorageType::Queue))]
    #[test_case("acct.file.core.windows.net", None)]
    #[test_case("proxy.example.com", None)]
    #[test_case("core.windows.net", None)]
    fn test_from_host(host: &str, expected: Option<StorageType>) {
        assert_eq!(StorageType::from_host(host), expected);
    }
}
