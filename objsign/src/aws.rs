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

//! AWS service support with convenience APIs
//!
//! This module re-exports `objsign_aws_v4` and adds constructors that wire the
//! default context and a config loaded from the environment.

// Re-export all AWS signing types
pub use objsign_aws_v4::*;

#[cfg(feature = "default-context")]
use crate::default_context;

/// Load a [`Config`] from the process environment.
///
/// See [`Config::from_env`] for the env values read.
#[cfg(feature = "default-context")]
pub fn default_config() -> Config {
    Config::new().from_env(&default_context())
}

/// Create a presigner over [`default_config`].
///
/// # Example
///
/// ```no_run
/// let presigner = objsign::aws::default_presigner();
/// let url = presigner.presign_get("docs", "a/b c.png", presigner.default_expires());
/// ```
#[cfg(feature = "default-context")]
pub fn default_presigner() -> PresignedUrlService {
    PresignedUrlService::new(default_config())
}

/// Create an object transfer over the default context and [`default_config`].
#[cfg(feature = "default-context")]
pub fn default_transfer() -> ObjectTransfer {
    let ctx = default_context();
    let presigner = PresignedUrlService::new(Config::new().from_env(&ctx));
    ObjectTransfer::new(ctx, presigner)
}

/// Create a Rekognition `CompareFaces` client over the default context and [`default_config`].
#[cfg(feature = "default-context")]
pub fn default_compare_faces_client() -> CompareFacesClient {
    let ctx = default_context();
    let config = Config::new().from_env(&ctx);
    CompareFacesClient::new(ctx, config)
}

/// Create a SES `SendEmail` client over the default context and [`default_config`].
#[cfg(feature = "default-context")]
pub fn default_send_email_client() -> SendEmailClient {
    let ctx = default_context();
    let config = Config::new().from_env(&ctx);
    SendEmailClient::new(ctx, config)
}
