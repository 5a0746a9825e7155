//! HTML head location and mutation.
//!
//! Streaming event passthrough: every event is copied to the writer
//! unchanged, and a `<script>` element is inserted immediately before the
//! first closing `</head>`. Documents without a head, or documents the
//! parser cannot make sense of, are left alone.

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;

/// Append `script` as a `<script>` child of the document's `<head>`.
///
/// Returns the re-serialized document, or `None` when the document has no
/// `<head>` or cannot be parsed; callers serve the original bytes in that
/// case.
pub(crate) fn append_head_script(document: &str, script: &str) -> Option<Vec<u8>> {
    let mut reader = Reader::from_str(document);
    reader.config_mut().trim_text(false);
    reader.config_mut().check_end_names = false;

    let mut writer = Writer::new(Vec::new());
    let mut injected = false;

    loop {
        match reader.read_event() {
            Ok(Event::End(end)) if !injected && is_head(end.name().as_ref()) => {
                writer
                    .write_event(Event::Start(BytesStart::new("script")))
                    .ok()?;
                writer
                    .write_event(Event::Text(BytesText::from_escaped(script)))
                    .ok()?;
                writer.write_event(Event::End(BytesEnd::new("script"))).ok()?;
                writer.write_event(Event::End(end)).ok()?;
                injected = true;
            }
            Ok(Event::Eof) => break,
            Ok(event) => writer.write_event(event).ok()?,
            Err(_) => return None,
        }
    }

    injected.then(|| writer.into_inner())
}

fn is_head(name: &[u8]) -> bool {
    name.eq_ignore_ascii_case(b"head")
}
