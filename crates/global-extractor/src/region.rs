//! Text surgery on marker-delimited regions.
//!
//! Every marker pair in the pipeline (scheme, remove, test scheme, README
//! table) goes through these helpers. A region runs from the first start
//! marker to the first end marker following it.

/// Byte offsets of a region: `start` is the index of the start marker,
/// `inner` the first byte after it, `end` the index of the end marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: usize,
    inner: usize,
    end: usize,
}

fn locate(text: &str, start_marker: &str, end_marker: &str) -> Option<Span> {
    let start = text.find(start_marker)?;
    let inner = start + start_marker.len();
    let end = inner + text[inner..].find(end_marker)?;
    Some(Span { start, inner, end })
}

/// Text strictly between the markers, or `None` if either is missing.
pub fn extract_region<'a>(text: &'a str, start_marker: &str, end_marker: &str) -> Option<&'a str> {
    locate(text, start_marker, end_marker).map(|span| &text[span.inner..span.end])
}

/// Delete the region including both markers. Text without a complete pair is
/// returned unchanged.
pub fn remove_region(text: &str, start_marker: &str, end_marker: &str) -> String {
    match locate(text, start_marker, end_marker) {
        Some(span) => {
            let tail = span.end + end_marker.len();
            let mut out = String::with_capacity(text.len() - (tail - span.start));
            out.push_str(&text[..span.start]);
            out.push_str(&text[tail..]);
            out
        }
        None => text.to_string(),
    }
}

/// Delete every region, repeating until no complete pair is left.
pub fn remove_all_regions(text: &str, start_marker: &str, end_marker: &str) -> String {
    let mut out = text.to_string();
    while let Some(span) = locate(&out, start_marker, end_marker) {
        let tail = span.end + end_marker.len();
        if tail == span.start {
            break;
        }
        out.replace_range(span.start..tail, "");
    }
    out
}

/// Replace whatever lies between the markers with `body`, keeping both
/// markers in place.
pub fn splice_between(
    text: &str,
    start_marker: &str,
    end_marker: &str,
    body: &str,
) -> Option<String> {
    let span = locate(text, start_marker, end_marker)?;
    let mut out = String::with_capacity(text.len() + body.len());
    out.push_str(&text[..span.inner]);
    out.push_str(body);
    out.push_str(&text[span.end..]);
    Some(out)
}
