//! Boundary to the bundling engine.

use std::sync::Arc;

use async_trait::async_trait;
use keel_config::{BuildSettings, TransformSettings};
use keel_plugin::HookDispatcher;

use crate::Result;
use crate::result::BuildResult;

/// Frozen inputs for one engine call.
///
/// The engine routes every resolve and load request through `hooks`. Start and end
/// callbacks have already been handled by the invoker.
#[derive(Debug, Clone)]
pub struct Request<S> {
    pub source: String,
    pub settings: Arc<S>,
    pub hooks: HookDispatcher,
}

pub type BuildRequest = Request<BuildSettings>;
pub type TransformRequest = Request<TransformSettings>;

#[async_trait]
pub trait Engine: Send + Sync {
    fn name(&self) -> &str;

    async fn build(&self, request: BuildRequest) -> Result<BuildResult>;

    async fn transform(&self, request: TransformRequest) -> Result<BuildResult>;
}

#[async_trait]
impl<E: Engine + ?Sized> Engine for Arc<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn build(&self, request: BuildRequest) -> Result<BuildResult> {
        (**self).build(request).await
    }

    async fn transform(&self, request: TransformRequest) -> Result<BuildResult> {
        (**self).transform(request).await
    }
}
