//! Error values, their ownership model, and the shared sentinels.

use crate::alloc::{Allocation, Allocator};
use errchain_error::RenderError;
use std::fmt;

/// Maximum size of an owned error message in bytes, including the terminator.
///
/// Owned messages hold at most `MAX_MESSAGE_LEN - 1` bytes; longer input is
/// truncated silently.
pub const MAX_MESSAGE_LEN: usize = 1024;

/// Returned whenever an allocation needed to build an error is refused.
pub static OUT_OF_MEMORY: Node<'static> = Node::sentinel("Out of memory");

/// Returned whenever a constructor is given no message, and used as the cause
/// of wraps around nothing.
pub static EMPTY: Node<'static> = Node::sentinel("<Empty>");

#[derive(Debug)]
pub(crate) enum Message<'m> {
    /// Heap buffer of `MAX_MESSAGE_LEN` bytes, released on destroy
    Owned(String),
    /// Caller-provided text that outlives the node
    Borrowed(&'m str),
}

pub(crate) enum Cause<'m> {
    None,
    /// Destroyed together with the node holding it
    Owned(ErrorValue<'m>),
    /// Shared sentinel, never destroyed through this link
    Borrowed(&'static Node<'static>),
}

/// One link of a causal chain: a message and the error it wraps.
///
/// `Node` is the read-only view of an error. It is reached through
/// [`ErrorValue`] (which derefs to it) or through [`Node::cause`].
pub struct Node<'m> {
    pub(crate) message: Message<'m>,
    pub(crate) cause: Cause<'m>,
}

impl Node<'static> {
    const fn sentinel(message: &'static str) -> Self {
        Self {
            message: Message::Borrowed(message),
            cause: Cause::None,
        }
    }
}

impl<'m> Node<'m> {
    pub(crate) fn new(message: Message<'m>) -> Self {
        Self {
            message,
            cause: Cause::None,
        }
    }

    /// The message of this link alone.
    pub fn message(&self) -> &str {
        match &self.message {
            Message::Owned(buffer) => buffer,
            Message::Borrowed(text) => text,
        }
    }

    /// The wrapped error, if any.
    pub fn cause(&self) -> Option<&Node<'m>> {
        match &self.cause {
            Cause::None => None,
            Cause::Owned(value) => Some(value.node()),
            Cause::Borrowed(sentinel) => Some(*sentinel),
        }
    }

    /// Iterate over this link and every cause beneath it, outermost first.
    ///
    /// # Example
    ///
    /// ```
    /// use errchain::ErrorValue;
    ///
    /// let err = ErrorValue::wrap(None, "reading config");
    /// let messages: Vec<&str> = err.chain().map(|n| n.message()).collect();
    /// assert_eq!(messages, ["reading config", "<Empty>"]);
    /// ```
    pub fn chain(&self) -> Chain<'_, 'm> {
        Chain { next: Some(self) }
    }

    /// Number of links in the chain starting here.
    pub fn depth(&self) -> usize {
        self.chain().count()
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("depth", &self.depth())
            .field("links", &Links(self))
            .finish()
    }
}

/// Debug view of a chain as a flat list of `(message, owns_message)` pairs.
struct Links<'a, 'm>(&'a Node<'m>);

impl fmt::Debug for Links<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.0
                    .chain()
                    .map(|node| (node.message(), matches!(node.message, Message::Owned(_)))),
            )
            .finish()
    }
}

/// Streams the chain as `outer: inner: ...`.
///
/// Width, fill and precision flags are honoured by rendering into a buffer
/// first; without them the chain is streamed straight into the formatter.
impl fmt::Display for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.width().is_some() || f.precision().is_some() {
            let mut text = String::new();
            let mut sink = |segment: &str| -> Result<usize, RenderError> {
                text.push_str(segment);
                Ok(segment.len())
            };
            crate::render::render(None, Some(self), None, &mut sink).map_err(|_| fmt::Error)?;
            return f.pad(&text);
        }

        crate::render::render(None, Some(self), None, &mut crate::render::FmtSink::new(f))
            .map(|_| ())
            .map_err(|_| fmt::Error)
    }
}

/// Iterator over a causal chain, outermost first.
#[derive(Debug, Clone)]
pub struct Chain<'a, 'm> {
    next: Option<&'a Node<'m>>,
}

impl<'a, 'm> Iterator for Chain<'a, 'm> {
    type Item = &'a Node<'m>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.cause();
        Some(current)
    }
}

/// Which resources destroying an error value gives back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ownership {
    /// The node itself was allocated and is released on destroy
    pub node: bool,
    /// The message buffer was allocated and is released on destroy
    pub message: bool,
}

enum Repr<'m> {
    Sentinel(&'static Node<'static>),
    Heap {
        node: Box<Node<'m>>,
        allocator: &'m dyn Allocator,
    },
}

/// An error: the outermost link of a causal chain, owning everything beneath
/// it except shared sentinels and borrowed messages.
///
/// Constructors never fail. Allocation failure yields the
/// [`OUT_OF_MEMORY`] sentinel and absent input yields [`EMPTY`]; test for them
/// by identity with [`ErrorValue::is_out_of_memory`] and
/// [`ErrorValue::is_empty`].
///
/// Dropping an `ErrorValue` destroys it; [`ErrorValue::destroy`] does the same
/// explicitly.
///
/// # Example
///
/// ```
/// use errchain::ErrorValue;
///
/// let err = ErrorValue::new("connection reset");
/// let err = err.context("fetching index");
/// assert_eq!(err.to_string(), "fetching index: connection reset");
/// ```
pub struct ErrorValue<'m> {
    repr: Repr<'m>,
}

impl<'m> ErrorValue<'m> {
    /// The shared out-of-memory sentinel.
    pub fn out_of_memory() -> Self {
        Self {
            repr: Repr::Sentinel(&OUT_OF_MEMORY),
        }
    }

    /// The shared empty-message sentinel.
    pub fn empty() -> Self {
        Self {
            repr: Repr::Sentinel(&EMPTY),
        }
    }

    pub(crate) fn from_heap(node: Node<'m>, allocator: &'m dyn Allocator) -> Self {
        Self {
            repr: Repr::Heap {
                node: Box::new(node),
                allocator,
            },
        }
    }

    /// The outermost link.
    pub fn node(&self) -> &Node<'m> {
        match &self.repr {
            Repr::Sentinel(node) => *node,
            Repr::Heap { node, .. } => node,
        }
    }

    pub(crate) fn node_mut(&mut self) -> Option<&mut Node<'m>> {
        match &mut self.repr {
            Repr::Sentinel(_) => None,
            Repr::Heap { node, .. } => Some(node),
        }
    }

    pub(crate) fn heap_allocator(&self) -> Option<&'m dyn Allocator> {
        match self.repr {
            Repr::Sentinel(_) => None,
            Repr::Heap { allocator, .. } => Some(allocator),
        }
    }

    /// Is this one of the shared sentinels?
    pub fn is_sentinel(&self) -> bool {
        matches!(self.repr, Repr::Sentinel(_))
    }

    /// Is this the shared out-of-memory sentinel?
    pub fn is_out_of_memory(&self) -> bool {
        matches!(self.repr, Repr::Sentinel(node) if std::ptr::eq(node, &OUT_OF_MEMORY))
    }

    /// Is this the shared empty-message sentinel?
    pub fn is_empty(&self) -> bool {
        matches!(self.repr, Repr::Sentinel(node) if std::ptr::eq(node, &EMPTY))
    }

    /// What destroying this value gives back. Both flags are unset for sentinels.
    pub fn ownership(&self) -> Ownership {
        match &self.repr {
            Repr::Sentinel(_) => Ownership {
                node: false,
                message: false,
            },
            Repr::Heap { node, .. } => Ownership {
                node: true,
                message: matches!(node.message, Message::Owned(_)),
            },
        }
    }

    /// Destroy this value and every cause it owns.
    ///
    /// Equivalent to dropping it. Sentinels are left untouched.
    pub fn destroy(self) {
        drop(self);
    }
}

impl<'m> std::ops::Deref for ErrorValue<'m> {
    type Target = Node<'m>;

    fn deref(&self) -> &Node<'m> {
        self.node()
    }
}

impl fmt::Debug for ErrorValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorValue")
            .field("ownership", &self.ownership())
            .field("node", self.node())
            .finish()
    }
}

impl fmt::Display for ErrorValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.node(), f)
    }
}

impl Drop for ErrorValue<'_> {
    fn drop(&mut self) {
        if self.is_sentinel() {
            return;
        }
        let repr = std::mem::replace(&mut self.repr, Repr::Sentinel(&EMPTY));
        release_chain(repr);
    }
}

/// Unlink every owned node below `first`, then release them innermost first:
/// each node's cause before its message buffer, and its message buffer before
/// the node itself.
fn release_chain(first: Repr<'_>) {
    let mut owned = Vec::new();
    let mut next = Some(first);

    while let Some(Repr::Heap { mut node, allocator }) = next.take() {
        next = match std::mem::replace(&mut node.cause, Cause::None) {
            Cause::Owned(mut value) => {
                Some(std::mem::replace(&mut value.repr, Repr::Sentinel(&EMPTY)))
            }
            Cause::None | Cause::Borrowed(_) => None,
        };
        owned.push((node, allocator));
    }

    let depth = owned.len();
    let mut released = 0;
    while let Some((node, allocator)) = owned.pop() {
        if let Message::Owned(_) = node.message {
            allocator.release(Allocation::Message {
                capacity: MAX_MESSAGE_LEN,
            });
            released += 1;
        }
        drop(node);
        allocator.release(Allocation::Node);
        released += 1;
    }

    tracing::trace!(depth, released, "Destroyed error chain");
}
