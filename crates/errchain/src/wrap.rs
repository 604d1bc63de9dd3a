//! Wrapping errors in outer context.

use crate::construct::Factory;
use crate::value::{Cause, EMPTY, ErrorValue};
use std::fmt;
use tracing::debug;

impl<'m> Factory<'m> {
    /// Wrap `cause` in a new error holding a copy of `message`.
    ///
    /// Ownership of `cause` is taken. A `None` cause is recorded as the
    /// [`EMPTY`] sentinel so the chain always renders a cause. If the outer
    /// error cannot be built, `cause` is destroyed and the sentinel returned.
    ///
    /// # Example
    ///
    /// ```
    /// use errchain::Factory;
    ///
    /// let factory = Factory::system();
    /// let inner = factory.wrap(None, "inner");
    /// let outer = factory.wrap(Some(inner), "outer");
    /// assert_eq!(outer.to_string(), "outer: inner: <Empty>");
    /// ```
    pub fn wrap<'s>(
        &self,
        cause: Option<ErrorValue<'m>>,
        message: impl Into<Option<&'s str>>,
    ) -> ErrorValue<'m> {
        attach(self.copied(message), cause)
    }

    /// Wrap `cause` in a new error pointing at `message` without copying it.
    pub fn wrap_borrowed(
        &self,
        cause: Option<ErrorValue<'m>>,
        message: impl Into<Option<&'m str>>,
    ) -> ErrorValue<'m> {
        attach(self.borrowed(message), cause)
    }

    /// Wrap `cause` in a new error with a formatted message.
    pub fn wrap_formatted<'a>(
        &self,
        cause: Option<ErrorValue<'m>>,
        template: impl Into<Option<fmt::Arguments<'a>>>,
    ) -> ErrorValue<'m> {
        attach(self.formatted(template), cause)
    }
}

fn attach<'m>(mut outer: ErrorValue<'m>, cause: Option<ErrorValue<'m>>) -> ErrorValue<'m> {
    if outer.is_sentinel() {
        // The caller handed over the cause and has no way to get it back.
        if let Some(cause) = cause {
            debug!(
                out_of_memory = outer.is_out_of_memory(),
                depth = cause.depth(),
                "Outer error unavailable, destroying wrapped cause"
            );
            cause.destroy();
        }
        return outer;
    }

    if let Some(node) = outer.node_mut() {
        node.cause = match cause {
            Some(cause) => Cause::Owned(cause),
            None => Cause::Borrowed(&EMPTY),
        };
    }
    outer
}

impl<'m> ErrorValue<'m> {
    /// Wrap `cause` in a new error holding a copy of `message`, from the
    /// system allocator.
    pub fn wrap<'s>(cause: Option<Self>, message: impl Into<Option<&'s str>>) -> Self {
        Factory::system().wrap(cause, message)
    }

    /// Wrap `cause` in a new error pointing at `message`, from the system
    /// allocator.
    pub fn wrap_borrowed(cause: Option<Self>, message: impl Into<Option<&'m str>>) -> Self {
        Factory::system().wrap_borrowed(cause, message)
    }

    /// Wrap `cause` in a new error with a formatted message, from the system
    /// allocator. Usually reached through [`wrap_fmt!`](crate::wrap_fmt).
    pub fn wrap_formatted<'a>(
        cause: Option<Self>,
        template: impl Into<Option<fmt::Arguments<'a>>>,
    ) -> Self {
        Factory::system().wrap_formatted(cause, template)
    }

    /// Add outer context to this error, drawing from the same allocator as
    /// this error's outermost node.
    ///
    /// # Example
    ///
    /// ```
    /// use errchain::ErrorValue;
    ///
    /// let err = ErrorValue::new("permission denied").context("opening log");
    /// assert_eq!(err.message(), "opening log");
    /// assert_eq!(err.cause().map(|c| c.message()), Some("permission denied"));
    /// ```
    pub fn context<'s>(self, message: impl Into<Option<&'s str>>) -> Self {
        let factory = Factory::new(self.allocator());
        factory.wrap(Some(self), message)
    }
}
