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

// Headers, lower-cased as `HeaderName::from_static` requires.
pub const X_MS_DATE: &str = "x-ms-date";
pub const X_MS_VERSION: &str = "x-ms-version";
pub const AUTH_TOKEN: &str = "authtoken";
pub const CONTENT_MD5: &str = "content-md5";
pub const DATA_SERVICE_VERSION: &str = "dataserviceversion";
pub const MAX_DATA_SERVICE_VERSION: &str = "maxdataserviceversion";

// Header values
pub const DEFAULT_SERVICE_VERSION: &str = "2013-08-15";
pub const DATA_SERVICE_VERSION_VALUE: &str = "1.0;NetFx";
pub const MAX_DATA_SERVICE_VERSION_VALUE: &str = "2.0;NetFx";

/// Service versions from this one on sign a zero Content-Length as an empty line.
pub const EMPTY_CONTENT_LENGTH_VERSION: &str = "2015-02-21";

// Env values
pub const AZURE_STORAGE_ACCOUNT_NAME: &str = "AZURE_STORAGE_ACCOUNT_NAME";
pub const AZBLOB_ACCOUNT_NAME: &str = "AZBLOB_ACCOUNT_NAME";
pub const AZURE_STORAGE_ACCOUNT_KEY: &str = "AZURE_STORAGE_ACCOUNT_KEY";
pub const AZBLOB_ACCOUNT_KEY: &str = "AZBLOB_ACCOUNT_KEY";
pub const AZSTORE_PROXY_URL: &str = "AZSTORE_PROXY_URL";
pub const AZSTORE_PROXY_USERNAME: &str = "AZSTORE_PROXY_USERNAME";
pub const AZSTORE_PROXY_PASSWORD: &str = "AZSTORE_PROXY_PASSWORD";
pub const AZSTORE_TABLE_SERVICE_URL: &str = "AZSTORE_TABLE_SERVICE_URL";
pub const AZSTORE_BLOB_SERVICE_URL: &str = "AZSTORE_BLOB_SERVICE_URL";
pub const AZSTORE_QUEUE_SERVICE_URL: &str = "AZSTORE_QUEUE_SERVICE_URL";
pub const AZSTORE_SERVICE_VERSION: &str = "AZSTORE_SERVICE_VERSION";

/// Host suffix of the public storage endpoints.
pub const ENDPOINT_SUFFIX: &str = "core.windows.net";
