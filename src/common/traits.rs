//! Common traits and interfaces
//!
//! Callers depend on [`TagChecker`] rather than on a concrete client so a
//! registry-backed checker can be swapped for another implementation.

use crate::error::Result;
use async_trait::async_trait;

/// Answers whether a tag exists for a fixed image
#[async_trait]
pub trait TagChecker: Send + Sync {
    /// `Ok(true)` if the tag exists, `Ok(false)` if the registry reports it missing
    async fn is_tag_exist(&self, tag: &str) -> Result<bool>;
}
