//! Tests for wrapping errors in outer context.

use errchain::{EMPTY, ErrorValue, Factory, TrackingAllocator, wrap_fmt};

#[test]
fn test_wrap_absent_cause_renders_empty() {
    let err = ErrorValue::wrap(None, "outer");
    assert_eq!(err.to_string(), "outer: <Empty>");
}

#[test]
fn test_nested_wraps_render_outermost_first() {
    let inner = ErrorValue::wrap(None, "inner");
    let outer = ErrorValue::wrap(Some(inner), "outer");
    assert_eq!(outer.to_string(), "outer: inner: <Empty>");
}

#[test]
fn test_wrap_constructed_cause_has_no_empty_tail() {
    let root = ErrorValue::new("connection refused");
    let err = ErrorValue::wrap(Some(root), "connecting to db");
    assert_eq!(err.to_string(), "connecting to db: connection refused");
}

#[test]
fn test_absent_cause_links_to_shared_empty_sentinel() {
    let first = ErrorValue::wrap(None, "first");
    let second = ErrorValue::wrap_borrowed(None, "second");

    for err in [&first, &second] {
        let cause = err.cause().expect("wrap always records a cause");
        assert!(std::ptr::eq(cause, &EMPTY));
    }

    drop(first);
    assert_eq!(second.to_string(), "second: <Empty>");
}

#[test]
fn test_chain_order_and_depth() {
    let err = ErrorValue::new("root");
    let err = ErrorValue::wrap(Some(err), "middle");
    let err = ErrorValue::wrap(Some(err), "top");

    let messages: Vec<&str> = err.chain().map(|node| node.message()).collect();
    assert_eq!(messages, ["top", "middle", "root"]);
    assert_eq!(err.depth(), 3);
}

#[test]
fn test_wrap_variants_set_message_ownership() {
    let copied = ErrorValue::wrap(None, "copied");
    let borrowed = ErrorValue::wrap_borrowed(None, "borrowed");
    let formatted = wrap_fmt!(None, "formatted {}", 1);

    assert!(copied.ownership().message);
    assert!(!borrowed.ownership().message);
    assert!(formatted.ownership().message);
    assert_eq!(formatted.to_string(), "formatted 1: <Empty>");
}

#[test]
fn test_wrap_fmt_chains_context() {
    let err = ErrorValue::new_borrowed("timed out");
    let err = wrap_fmt!(Some(err), "attempt {} of {}", 2, 3);
    let err = wrap_fmt!(Some(err), "syncing {}", "mirror");
    assert_eq!(err.to_string(), "syncing mirror: attempt 2 of 3: timed out");
}

#[test]
fn test_wrap_destroys_cause_when_outer_allocation_fails() {
    // Two grants: node and buffer of the inner error.
    let pool = TrackingAllocator::failing_after(2);
    let factory = Factory::new(&pool);

    let inner = factory.copied("inner");
    assert!(!inner.is_sentinel());
    assert_eq!(*pool.stats().live(), 2);

    let outer = factory.wrap(Some(inner), "outer");
    assert!(outer.is_out_of_memory());
    assert_eq!(*pool.stats().live(), 0);
}

#[test]
fn test_wrap_with_absent_message_destroys_cause() {
    let pool = TrackingAllocator::new();
    let factory = Factory::new(&pool);

    let inner = factory.copied("inner");
    let err = factory.wrap(Some(inner), None);

    assert!(err.is_empty());
    assert_eq!(*pool.stats().live(), 0);
}

#[test]
fn test_wrap_sentinel_cause() {
    let err = ErrorValue::wrap(Some(ErrorValue::out_of_memory()), "saving draft");
    assert_eq!(err.to_string(), "saving draft: Out of memory");
    err.destroy();

    let err = ErrorValue::wrap(Some(ErrorValue::out_of_memory()), "retrying");
    assert_eq!(err.to_string(), "retrying: Out of memory");
}

#[test]
fn test_context_uses_cause_allocator() {
    let pool = TrackingAllocator::new();
    let factory = Factory::new(&pool);

    let err = factory.copied("low level").context("high level");
    assert_eq!(err.to_string(), "high level: low level");
    assert_eq!(*pool.stats().live(), 4);

    drop(err);
    assert_eq!(*pool.stats().live(), 0);
}

#[test]
fn test_wrap_takes_ownership_across_factories() {
    let inner_pool = TrackingAllocator::new();
    let outer_pool = TrackingAllocator::new();

    let inner = Factory::new(&inner_pool).borrowed("inner");
    let outer = Factory::new(&outer_pool).wrap_borrowed(Some(inner), "outer");
    assert_eq!(outer.to_string(), "outer: inner");

    outer.destroy();
    assert_eq!(*inner_pool.stats().live(), 0);
    assert_eq!(*outer_pool.stats().live(), 0);
    assert_eq!(*inner_pool.stats().released(), 1);
    assert_eq!(*outer_pool.stats().released(), 1);
}

#[test]
fn test_system_factory_accepts_borrowed_local_text() {
    let inner_text = format!("row {}", 7);
    let outer_text = String::from("importing");

    let inner = ErrorValue::new_borrowed(inner_text.as_str());
    let err = ErrorValue::wrap_borrowed(Some(inner), outer_text.as_str());
    let err = Factory::system().wrap_borrowed(Some(err), inner_text.as_str());

    assert_eq!(err.to_string(), "row 7: importing: row 7");
    assert!(!err.ownership().message);
}
