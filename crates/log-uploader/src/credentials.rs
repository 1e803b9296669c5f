// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Debug;
use std::sync::Arc;
use std::{future::Future, pin::Pin};

pub type CredentialResolverFn =
    Arc<dyn Fn() -> Pin<Box<dyn Future<Output = String> + Send>> + Send + Sync>;

/// Source of the `Authorization` header value.
///
/// Unlike an API key, upload tokens are short-lived, so a dynamic supplier is
/// asked again for every attempt and its result is never cached.
#[derive(Clone)]
pub enum CredentialSupplier {
    Static(String),
    Dynamic(CredentialResolverFn),
}

impl CredentialSupplier {
    pub fn new(value: &str) -> Self {
        Self::Static(value.to_string())
    }

    pub fn new_from_resolver(resolver_fn: CredentialResolverFn) -> Self {
        Self::Dynamic(resolver_fn)
    }

    /// Wraps a synchronous closure, e.g. one reading a token file.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Self::Dynamic(Arc::new(move || {
            let value = f();
            Box::pin(async move { value })
        }))
    }

    pub async fn get_credential(&self) -> String {
        match self {
            Self::Static(value) => value.clone(),
            Self::Dynamic(resolver_fn) => (resolver_fn)().await,
        }
    }
}

impl Debug for CredentialSupplier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CredentialSupplier")
    }
}
