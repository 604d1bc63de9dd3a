//! Tests for streaming error chains through sinks.

use errchain::{
    ErrorValue, RenderError, RenderErrorKind, StatusSink, WriterSink, render, render_to_writer,
};
use std::io;

fn collect(
    header: Option<&str>,
    error: Option<&ErrorValue<'_>>,
    trailer: Option<&str>,
) -> (Result<usize, RenderError>, Vec<String>) {
    let mut segments = Vec::new();
    let mut sink = |segment: &str| -> Result<usize, RenderError> {
        segments.push(segment.to_string());
        Ok(segment.len())
    };
    let result = render(header, error.map(|e| e.node()), trailer, &mut sink);
    (result, segments)
}

#[test]
fn test_render_emits_segments_in_order() {
    let inner = ErrorValue::wrap(None, "inner");
    let outer = ErrorValue::wrap(Some(inner), "outer");

    let (result, segments) = collect(Some("error: "), Some(&outer), Some("\n"));

    assert!(result.is_ok());
    assert_eq!(
        segments,
        ["error: ", "outer", ": ", "inner", ": ", "<Empty>", "\n"]
    );
}

#[test]
fn test_render_omits_absent_header_and_trailer() {
    let err = ErrorValue::new("only");
    let (_, segments) = collect(None, Some(&err), None);
    assert_eq!(segments, ["only"]);
}

#[test]
fn test_render_absent_error_as_empty() {
    let (result, segments) = collect(Some("["), None, Some("]"));
    assert_eq!(segments, ["[", "<Empty>", "]"]);
    assert_eq!(result.unwrap(), 1);
}

#[test]
fn test_render_returns_last_sink_status() {
    let err = ErrorValue::wrap(Some(ErrorValue::new("innermost")), "outer");

    let (with_trailer, _) = collect(None, Some(&err), Some("\r\n"));
    assert_eq!(with_trailer.unwrap(), 2);

    let (without_trailer, _) = collect(None, Some(&err), None);
    assert_eq!(without_trailer.unwrap(), "innermost".len());
}

#[test]
fn test_render_stops_at_first_sink_failure() {
    let err = ErrorValue::wrap(Some(ErrorValue::new("inner")), "outer");
    let mut calls = 0;
    let mut sink = |_: &str| -> Result<usize, RenderError> {
        calls += 1;
        if calls == 2 {
            Err(RenderError::new(RenderErrorKind::Rejected(-3)))
        } else {
            Ok(0)
        }
    };

    let result = render(Some("header"), Some(err.node()), Some("trailer"), &mut sink);

    assert_eq!(result.unwrap_err().status(), -3);
    assert_eq!(calls, 2);
}

#[test]
fn test_status_sink_propagates_negative_status() {
    let err = ErrorValue::wrap(None, "outer");
    let mut calls = 0;
    let mut sink = StatusSink::new(|_: &str| {
        calls += 1;
        if calls == 2 { -9 } else { 1 }
    });

    let result = render(None, Some(err.node()), None, &mut sink);

    let error = result.unwrap_err();
    assert_eq!(error.kind, RenderErrorKind::Rejected(-9));
    assert_eq!(error.status(), -9);
    drop(sink);
    assert_eq!(calls, 2);
}

#[test]
fn test_status_sink_success_returns_status() {
    let err = ErrorValue::new("fine");
    let mut sink = StatusSink::new(|segment: &str| segment.len() as i32 * 10);

    let result = render(None, Some(err.node()), Some("!"), &mut sink);
    assert_eq!(result.unwrap(), 10);
}

#[test]
fn test_render_to_writer_formats_chain() {
    let err = ErrorValue::new("permission denied");
    let err = ErrorValue::wrap(Some(err), "opening /var/log/app.log");
    let mut out = Vec::new();

    render_to_writer(Some("fatal: "), Some(err.node()), Some("\n"), &mut out).unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "fatal: opening /var/log/app.log: permission denied\n"
    );
}

struct BrokenPipe;

impl io::Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_render_to_writer_reports_io_failure() {
    let err = ErrorValue::new("unwritable");
    let result = render_to_writer(None, Some(err.node()), None, BrokenPipe);

    let error = result.unwrap_err();
    assert!(matches!(error.kind, RenderErrorKind::Io(ref message) if message.contains("pipe closed")));
    assert!(error.status() < 0);
}

#[test]
fn test_writer_sink_gives_back_writer() {
    let err = ErrorValue::new_borrowed("Test!");
    let mut sink = WriterSink::new(Vec::new());

    render(None, Some(err.node()), Some("\n"), &mut sink).unwrap();

    assert_eq!(sink.into_inner(), b"Test!\n");
}

#[test]
fn test_render_does_not_consume() {
    let err = ErrorValue::wrap(Some(ErrorValue::new("b")), "a");
    let first = collect(None, Some(&err), None).1;
    let second = collect(None, Some(&err), None).1;
    assert_eq!(first, second);
    assert_eq!(err.to_string(), "a: b");
}

#[test]
fn test_display_matches_bare_render() {
    let err = errchain::wrap_fmt!(Some(ErrorValue::new("x")), "level {}", 1);
    let (_, segments) = collect(None, Some(&err), None);
    assert_eq!(err.to_string(), segments.concat());
}

#[test]
fn test_render_sentinels() {
    let oom = ErrorValue::out_of_memory();
    let empty = ErrorValue::empty();
    assert_eq!(oom.to_string(), "Out of memory");
    assert_eq!(empty.to_string(), "<Empty>");
}

#[test]
fn test_display_honours_width_and_precision() {
    let err = ErrorValue::wrap(Some(ErrorValue::new("b")), "a");
    assert_eq!(format!("{:>8}", err), "    a: b");
    assert_eq!(format!("{:-<6}|", err), "a: b--|");
    assert_eq!(format!("{:.1}", err), "a");
    assert_eq!(format!("{}", err), "a: b");
}
