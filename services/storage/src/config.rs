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

use crate::constants::*;
use azstore_core::utils::Redact;
use azstore_core::Context;
use std::fmt::{Debug, Formatter};

/// Config carries all the configuration for reaching a storage account.
///
/// Either `account_name` + `account_key` (direct access) or `proxy_url` +
/// `proxy_username` + `proxy_password` (proxy login) should be set.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// `account_name` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AZURE_STORAGE_ACCOUNT_NAME` or `AZBLOB_ACCOUNT_NAME`
    pub account_name: Option<String>,
    /// `account_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AZURE_STORAGE_ACCOUNT_KEY` or `AZBLOB_ACCOUNT_KEY`
    pub account_key: Option<String>,
    /// `proxy_url` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AZSTORE_PROXY_URL`
    pub proxy_url: Option<String>,
    /// `proxy_username` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AZSTORE_PROXY_USERNAME`
    pub proxy_username: Option<String>,
    /// `proxy_password` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AZSTORE_PROXY_PASSWORD`
    pub proxy_password: Option<String>,
    /// Table service url behind the proxy, takes precedence over the login response.
    ///
    /// - env value: `AZSTORE_TABLE_SERVICE_URL`
    pub table_service_url: Option<String>,
    /// Blob service url behind the proxy, takes precedence over the login response.
    ///
    /// - env value: `AZSTORE_BLOB_SERVICE_URL`
    pub blob_service_url: Option<String>,
    /// Queue service url behind the proxy, takes precedence over the login response.
    ///
    /// - env value: `AZSTORE_QUEUE_SERVICE_URL`
    pub queue_service_url: Option<String>,
    /// `x-ms-version` sent with requests that do not set one.
    ///
    /// - env value: `AZSTORE_SERVICE_VERSION`
    pub service_version: Option<String>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("account_name", &self.account_name)
            .field("account_key", &Redact::from(&self.account_key))
            .field("proxy_url", &self.proxy_url)
            .field("proxy_username", &self.proxy_username)
            .field("proxy_password", &Redact::from(&self.proxy_password))
            .field("table_service_url", &self.table_service_url)
            .field("blob_service_url", &self.blob_service_url)
            .field("queue_service_url", &self.queue_service_url)
            .field("service_version", &self.service_version)
            .finish()
    }
}

impl Config {
    /// Fill unset fields from env.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        let envs = ctx.env_vars();
        let fill = |field: &mut Option<String>, keys: &[&str]| {
            if field.is_none() {
                *field = keys.iter().find_map(|k| envs.get(*k)).cloned();
            }
        };

        fill(
            &mut self.account_name,
            &[AZURE_STORAGE_ACCOUNT_NAME, AZBLOB_ACCOUNT_NAME],
        );
        fill(
            &mut self.account_key,
            &[AZURE_STORAGE_ACCOUNT_KEY, AZBLOB_ACCOUNT_KEY],
        );
        fill(&mut self.proxy_url, &[AZSTORE_PROXY_URL]);
        fill(&mut self.proxy_username, &[AZSTORE_PROXY_USERNAME]);
        fill(&mut self.proxy_password, &[AZSTORE_PROXY_PASSWORD]);
        fill(&mut self.table_service_url, &[AZSTORE_TABLE_SERVICE_URL]);
        fill(&mut self.blob_service_url, &[AZSTORE_BLOB_SERVICE_URL]);
        fill(&mut self.queue_service_url, &[AZSTORE_QUEUE_SERVICE_URL]);
        fill(&mut self.service_version, &[AZSTORE_SERVICE_VERSION]);

        self
    }

    /// Whether account name and key are both set.
    pub fn has_account_key(&self) -> bool {
        non_empty(&self.account_name) && non_empty(&self.account_key)
    }

    /// Whether proxy url and user name are both set.
    pub fn has_proxy_login(&self) -> bool {
        non_empty(&self.proxy_url) && non_empty(&self.proxy_username)
    }
}

fn non_empty(v: &Option<String>) -> bool {
    v.as_deref().is_some_and(|v| !v.is_empty())
}
