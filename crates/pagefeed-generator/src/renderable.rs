//! The [`Renderable`] capability.

use std::sync::Arc;

use crate::{
    context::Context,
    error::Result,
    manipulation::ContextManipulation,
    pipeline::{Chain, Renderer},
};

/// Something that can produce a [`Context`] on demand.
///
/// Producing the context may perform I/O, such as reading a source file.
pub trait Renderable: Send + Sync {
    /// Produce the context of this item.
    fn context(&self, renderer: &Renderer) -> Result<Context>;
}

impl Renderable for Context {
    fn context(&self, _renderer: &Renderer) -> Result<Context> {
        Ok(self.clone())
    }
}

impl<R: Renderable + ?Sized> Renderable for &R {
    fn context(&self, renderer: &Renderer) -> Result<Context> {
        (**self).context(renderer)
    }
}

impl<R: Renderable + ?Sized> Renderable for Box<R> {
    fn context(&self, renderer: &Renderer) -> Result<Context> {
        (**self).context(renderer)
    }
}

impl<R: Renderable + ?Sized> Renderable for Arc<R> {
    fn context(&self, renderer: &Renderer) -> Result<Context> {
        (**self).context(renderer)
    }
}

/// A renderable whose context goes through a manipulation.
#[derive(Debug, Clone)]
pub struct Manipulated<R> {
    inner: R,
    manipulation: ContextManipulation,
}

impl<R: Renderable> Manipulated<R> {
    /// Wrap `inner`.
    pub fn new(inner: R, manipulation: ContextManipulation) -> Self {
        Self {
            inner,
            manipulation,
        }
    }

    /// The wrapped renderable.
    pub fn inner(&self) -> &R {
        &self.inner
    }
}

impl<R: Renderable> Renderable for Manipulated<R> {
    fn context(&self, renderer: &Renderer) -> Result<Context> {
        Ok(self.manipulation.apply(self.inner.context(renderer)?))
    }
}

/// Combinators available on every renderable.
pub trait RenderableExt: Renderable + Sized + 'static {
    /// Apply `manipulation` to the produced context.
    fn manipulate(self, manipulation: ContextManipulation) -> Manipulated<Self> {
        Manipulated::new(self, manipulation)
    }

    /// Start a chain applying `template` to this renderable.
    fn then_template(self, template: impl Into<String>) -> Chain {
        Chain::new(self).template(template)
    }

    /// Share this renderable, e.g. to hand it to a listing.
    fn shared(self) -> Arc<dyn Renderable> {
        Arc::new(self)
    }
}

impl<R: Renderable + Sized + 'static> RenderableExt for R {}
