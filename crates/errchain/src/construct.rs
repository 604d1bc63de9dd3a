//! Building error values.

use crate::alloc::{self, Allocation, Allocator};
use crate::value::{ErrorValue, MAX_MESSAGE_LEN, Message, Node};
use errchain_error::{AllocError, AllocErrorKind};
use std::fmt;
use tracing::{debug, trace};

/// Builds error values, drawing every allocation from one [`Allocator`].
///
/// The allocator is remembered by each node the factory creates, so a chain
/// built from several factories still releases every node to the allocator
/// that granted it.
///
/// # Example
///
/// ```
/// use errchain::{Factory, TrackingAllocator};
///
/// let pool = TrackingAllocator::failing_after(0);
/// let factory = Factory::new(&pool);
///
/// let err = factory.copied("never stored");
/// assert!(err.is_out_of_memory());
/// ```
#[derive(Clone, Copy)]
pub struct Factory<'m> {
    allocator: &'m dyn Allocator,
}

impl Default for Factory<'static> {
    fn default() -> Self {
        Self::system()
    }
}

impl fmt::Debug for Factory<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory").finish_non_exhaustive()
    }
}

impl<'m> Factory<'m> {
    /// Factory drawing from `allocator`.
    pub fn new(allocator: &'m dyn Allocator) -> Self {
        Self { allocator }
    }

    /// Factory backed by the process-wide system allocator.
    ///
    /// Any lifetime works here, so values built from borrowed text can still
    /// use the system allocator.
    pub fn system() -> Self {
        Self::new(alloc::system())
    }

    /// The allocator this factory draws from.
    pub fn allocator(&self) -> &'m dyn Allocator {
        self.allocator
    }

    /// Error holding a private copy of `message`, truncated to
    /// `MAX_MESSAGE_LEN - 1` bytes.
    ///
    /// Returns [`EMPTY`](crate::EMPTY) for `None` and
    /// [`OUT_OF_MEMORY`](crate::OUT_OF_MEMORY) if either allocation is refused.
    pub fn copied<'s>(&self, message: impl Into<Option<&'s str>>) -> ErrorValue<'m> {
        let Some(message) = message.into() else {
            return ErrorValue::empty();
        };

        if let Err(e) = self.allocator.allocate(Allocation::Node) {
            debug!(error = %e, "Node allocation refused");
            return ErrorValue::out_of_memory();
        }
        let mut buffer = match self.message_buffer() {
            Ok(buffer) => buffer,
            Err(e) => {
                debug!(error = %e, "Message buffer allocation refused");
                self.allocator.release(Allocation::Node);
                return ErrorValue::out_of_memory();
            }
        };

        fmt::Write::write_str(&mut buffer, message).ok();
        ErrorValue::from_heap(Node::new(Message::Owned(buffer.finish())), self.allocator)
    }

    /// Error pointing at `message` without copying it.
    ///
    /// Only the node is allocated. Returns [`EMPTY`](crate::EMPTY) for `None`
    /// and [`OUT_OF_MEMORY`](crate::OUT_OF_MEMORY) if the node is refused.
    pub fn borrowed(&self, message: impl Into<Option<&'m str>>) -> ErrorValue<'m> {
        let Some(message) = message.into() else {
            return ErrorValue::empty();
        };

        if let Err(e) = self.allocator.allocate(Allocation::Node) {
            debug!(error = %e, "Node allocation refused");
            return ErrorValue::out_of_memory();
        }
        ErrorValue::from_heap(Node::new(Message::Borrowed(message)), self.allocator)
    }

    /// Error whose message is `template` rendered into a private buffer,
    /// truncated to `MAX_MESSAGE_LEN - 1` bytes.
    ///
    /// Usually reached through [`error_fmt!`](crate::error_fmt).
    pub fn formatted<'a>(&self, template: impl Into<Option<fmt::Arguments<'a>>>) -> ErrorValue<'m> {
        let Some(template) = template.into() else {
            return ErrorValue::empty();
        };

        let mut buffer = match self.message_buffer() {
            Ok(buffer) => buffer,
            Err(e) => {
                debug!(error = %e, "Message buffer allocation refused");
                return ErrorValue::out_of_memory();
            }
        };
        if fmt::write(&mut buffer, template).is_err() {
            debug!("Formatting trait reported an error, keeping partial message");
        }

        if let Err(e) = self.allocator.allocate(Allocation::Node) {
            debug!(error = %e, "Node allocation refused");
            self.allocator.release(Allocation::Message {
                capacity: MAX_MESSAGE_LEN,
            });
            return ErrorValue::out_of_memory();
        }
        ErrorValue::from_heap(Node::new(Message::Owned(buffer.finish())), self.allocator)
    }

    fn message_buffer(&self) -> Result<MessageBuffer, AllocError> {
        let request = Allocation::Message {
            capacity: MAX_MESSAGE_LEN,
        };
        self.allocator.allocate(request)?;

        let mut text = String::new();
        if text.try_reserve_exact(MAX_MESSAGE_LEN - 1).is_err() {
            self.allocator.release(request);
            return Err(AllocError::new(AllocErrorKind::Exhausted(MAX_MESSAGE_LEN)));
        }
        Ok(MessageBuffer {
            text,
            truncated: false,
        })
    }
}

/// Fixed-capacity message buffer. Writes past capacity are dropped silently.
struct MessageBuffer {
    text: String,
    truncated: bool,
}

impl MessageBuffer {
    fn finish(self) -> String {
        if self.truncated {
            trace!(len = self.text.len(), "Message truncated");
        }
        self.text
    }
}

impl fmt::Write for MessageBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.truncated {
            return Ok(());
        }
        let room = MAX_MESSAGE_LEN - 1 - self.text.len();
        if s.len() <= room {
            self.text.push_str(s);
        } else {
            let mut cut = room;
            while !s.is_char_boundary(cut) {
                cut -= 1;
            }
            self.text.push_str(&s[..cut]);
            self.truncated = true;
        }
        Ok(())
    }
}

impl<'m> ErrorValue<'m> {
    /// Error holding a copy of `message`, from the system allocator.
    ///
    /// # Example
    ///
    /// ```
    /// use errchain::{ErrorValue, MAX_MESSAGE_LEN};
    ///
    /// let err = ErrorValue::new("disk full");
    /// assert_eq!(err.message(), "disk full");
    /// assert!(err.ownership().message);
    ///
    /// let long = "x".repeat(MAX_MESSAGE_LEN * 2);
    /// assert_eq!(ErrorValue::new(long.as_str()).message().len(), MAX_MESSAGE_LEN - 1);
    ///
    /// assert!(ErrorValue::new(None).is_empty());
    /// ```
    pub fn new<'s>(message: impl Into<Option<&'s str>>) -> Self {
        Factory::system().copied(message)
    }

    /// Error pointing at `message` without copying it, from the system allocator.
    pub fn new_borrowed(message: impl Into<Option<&'m str>>) -> Self {
        Factory::system().borrowed(message)
    }

    /// Error with a formatted message, from the system allocator.
    pub fn new_formatted<'a>(template: impl Into<Option<fmt::Arguments<'a>>>) -> Self {
        Factory::system().formatted(template)
    }

    /// The allocator this value's outermost node came from; the system
    /// allocator for sentinels.
    pub fn allocator(&self) -> &'m dyn Allocator {
        self.heap_allocator().unwrap_or_else(|| alloc::system())
    }
}
