//! The tracker seam the mirror writes through.
//!
//! Defined here, on the consumer side, so the mirror can be exercised
//! against a fake in tests and so another tracker backend could be slotted
//! in without touching the routing logic. [`slate::Slate`] is the
//! production implementation.

use async_trait::async_trait;
use serde_json::Value;
use slate::{Query, Slate, SlateError};
use slateproto::{Condition, Record};
use std::sync::Arc;

#[async_trait]
pub trait Tracker: Send + Sync {
    /// First record matching the filter, or `None`.
    async fn find_one(
        &self,
        module: &str,
        filter: Vec<Condition>,
    ) -> Result<Option<Record>, SlateError>;

    async fn create(&self, module: &str, data: Value) -> Result<Option<Record>, SlateError>;

    async fn update(
        &self,
        module: &str,
        id: i64,
        data: Value,
    ) -> Result<Option<Record>, SlateError>;

    async fn delete(&self, module: &str, id: i64) -> Result<Value, SlateError>;
}

#[async_trait]
impl<T: Tracker + ?Sized> Tracker for Arc<T> {
    async fn find_one(
        &self,
        module: &str,
        filter: Vec<Condition>,
    ) -> Result<Option<Record>, SlateError> {
        (**self).find_one(module, filter).await
    }

    async fn create(&self, module: &str, data: Value) -> Result<Option<Record>, SlateError> {
        (**self).create(module, data).await
    }

    async fn update(
        &self,
        module: &str,
        id: i64,
        data: Value,
    ) -> Result<Option<Record>, SlateError> {
        (**self).update(module, id, data).await
    }

    async fn delete(&self, module: &str, id: i64) -> Result<Value, SlateError> {
        (**self).delete(module, id).await
    }
}

#[async_trait]
impl Tracker for Slate {
    async fn find_one(
        &self,
        module: &str,
        filter: Vec<Condition>,
    ) -> Result<Option<Record>, SlateError> {
        Slate::find_one(self, module, Query::filtered(filter)).await
    }

    async fn create(&self, module: &str, data: Value) -> Result<Option<Record>, SlateError> {
        Slate::create(self, module, data).await
    }

    async fn update(
        &self,
        module: &str,
        id: i64,
        data: Value,
    ) -> Result<Option<Record>, SlateError> {
        Slate::update(self, module, id, data).await
    }

    async fn delete(&self, module: &str, id: i64) -> Result<Value, SlateError> {
        Slate::delete(self, module, id).await
    }
}
