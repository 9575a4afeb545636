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

use crate::queue::{QueueResponse, RequestInfo, ResponseKind};
use crate::Result;

/// DecodeResponse turns a raw queue response into a typed value.
///
/// Higher layers (table queries, blob listings) implement this to hand their own
/// types to callers while the queue stays ignorant of them.
pub trait DecodeResponse: Send + 'static {
    /// Value produced on success.
    type Output: Send + 'static;

    /// Which raw form the decoder wants.
    fn kind(&self) -> ResponseKind;

    /// Decode the response of `request`.
    fn decode(&self, request: &RequestInfo, response: QueueResponse) -> Result<Self::Output>;
}
