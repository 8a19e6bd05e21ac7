//! Undo-transaction decorator around a [`BlendModel`].

use log::debug;

use crate::model::BlendModel;

/// Host undo system hook. One `begin` is always matched by one `end`.
pub trait TransactionScope {
    fn begin(&mut self, label: &str);
    fn end(&mut self);
}

/// Opens a host transaction on start and closes it on stop, so a whole drag
/// (or one-off jump) is a single undo step.
pub struct TransactionalBlendModel<M, T> {
    inner: M,
    scope: T,
    label: String,
    open: bool,
}

impl<M: BlendModel, T: TransactionScope> TransactionalBlendModel<M, T> {
    pub fn new(inner: M, scope: T, label: impl Into<String>) -> Self {
        Self {
            inner,
            scope,
            label: label.into(),
            open: false,
        }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut M {
        &mut self.inner
    }

    pub fn scope(&self) -> &T {
        &self.scope
    }

    pub fn into_parts(self) -> (M, T) {
        (self.inner, self.scope)
    }

    fn close(&mut self) {
        if self.open {
            self.scope.end();
            self.open = false;
        }
    }
}

impl<M: BlendModel, T: TransactionScope> BlendModel for TransactionalBlendModel<M, T> {
    fn start_blend_operation(&mut self) {
        self.close();
        self.scope.begin(&self.label);
        self.open = true;
        self.inner.start_blend_operation();
        if !self.inner.is_active() {
            debug!("inner model did not start; closing transaction '{}'", self.label);
            self.close();
        }
    }

    fn stop_blend_operation(&mut self) {
        self.inner.stop_blend_operation();
        self.close();
    }

    fn blend_values(&mut self, value: f64) -> bool {
        self.inner.blend_values(value)
    }

    fn is_active(&self) -> bool {
        self.inner.is_active()
    }
}
