//! Call-site attribution for log entries
//!
//! With the `stack-trace` feature the active call stack is captured and
//! walked past the logger's own frames. Without it, or when symbols are
//! unavailable, the `#[track_caller]` location of the `add` call is used and
//! function/class stay empty.

use std::panic::Location;

/// Frames `add`-style entry points spend before reaching the resolver:
/// the public method and its internal helper.
pub const FACILITY_FRAMES: usize = 2;

/// Symbol of the function that takes the stack snapshot.
const CAPTURE_MARKER: &str = "call_site::capture_call_stack";

/// Where a log call came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallSite {
    pub file: String,
    pub line: u32,
    pub function: String,
    pub class: String,
}

impl CallSite {
    pub fn from_location(location: &Location<'_>) -> Self {
        Self {
            file: location.file().to_string(),
            line: location.line(),
            function: String::new(),
            class: String::new(),
        }
    }
}

/// One symbolized stack frame. Frames are ordered innermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFrame {
    pub symbol: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
}

impl RawFrame {
    pub fn new(symbol: &str, file: &str, line: u32) -> Self {
        Self {
            symbol: Some(symbol.to_string()),
            file: Some(file.to_string()),
            line: Some(line),
        }
    }
}

pub struct CallSiteResolver;

impl CallSiteResolver {
    /// Resolve the frame `index_offset` levels above the caller of the
    /// logging entry point, after discarding `skip_frames` facility frames.
    #[inline(never)]
    pub fn resolve(
        skip_frames: usize,
        index_offset: usize,
        caller: &'static Location<'static>,
    ) -> CallSite {
        #[cfg(feature = "stack-trace")]
        {
            let frames = capture_call_stack();
            // this function sits between the capture marker and the facility frames
            if let Some(mut site) = Self::select(&frames, skip_frames + 1, index_offset) {
                if site.file.is_empty() && index_offset == 0 {
                    site.file = caller.file().to_string();
                    site.line = caller.line();
                }
                return site;
            }
        }
        #[cfg(not(feature = "stack-trace"))]
        let _ = (skip_frames, index_offset);

        CallSite::from_location(caller)
    }

    /// Pick the attributed frame out of a captured stack.
    ///
    /// Returns `None` when the capture marker is missing (stripped symbols),
    /// and an empty [`CallSite`] when the requested index runs off the stack.
    pub fn select(frames: &[RawFrame], skip_frames: usize, index_offset: usize) -> Option<CallSite> {
        let anchor = frames.iter().rposition(|frame| {
            frame
                .symbol
                .as_deref()
                .is_some_and(|symbol| symbol.contains(CAPTURE_MARKER))
        })?;

        let Some(frame) = frames.get(anchor + 1 + skip_frames + index_offset) else {
            return Some(CallSite::default());
        };

        let (function, class) = frame
            .symbol
            .as_deref()
            .map(split_symbol)
            .unwrap_or_default();

        Some(CallSite {
            file: frame.file.clone().unwrap_or_default(),
            line: frame.line.unwrap_or(0),
            function,
            class,
        })
    }
}

#[cfg(feature = "stack-trace")]
#[inline(never)]
fn capture_call_stack() -> Vec<RawFrame> {
    let trace = backtrace::Backtrace::new();

    trace
        .frames()
        .iter()
        .flat_map(|frame| frame.symbols())
        .map(|symbol| RawFrame {
            symbol: symbol.name().map(|name| format!("{:#}", name)),
            file: symbol.filename().map(|path| path.display().to_string()),
            line: symbol.lineno(),
        })
        .collect()
}

/// Split a demangled symbol into `(function, class)`.
///
/// `app::server::Handler::serve::{{closure}}` yields `("serve", "Handler")`;
/// free functions have an empty class.
pub(crate) fn split_symbol(symbol: &str) -> (String, String) {
    let mut segments = split_path(strip_hash(symbol));

    while segments.last().is_some_and(|segment| segment.starts_with('{')) {
        segments.pop();
    }

    let function = segments.pop().unwrap_or_default().to_string();
    let class = segments.pop().map(owner_type).unwrap_or_default();
    (function, class)
}

fn strip_hash(symbol: &str) -> &str {
    if let Some(idx) = symbol.rfind("::h") {
        let hash = &symbol[idx + 3..];
        if hash.len() == 16 && hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return &symbol[..idx];
        }
    }
    symbol
}

/// Split on `::` outside of generic brackets.
fn split_path(path: &str) -> Vec<&str> {
    let bytes = path.as_bytes();
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            b'>' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                segments.push(&path[start..i]);
                i += 2;
                start = i;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    segments.push(&path[start..]);
    segments.retain(|segment| !segment.is_empty());
    segments
}

fn owner_type(segment: &str) -> String {
    let inner = segment
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .unwrap_or(segment);
    let inner = inner.split(" as ").next().unwrap_or(inner);
    let last = split_path(inner).pop().unwrap_or(inner);
    let name = last.split('<').next().unwrap_or(last);

    if name.starts_with(char::is_uppercase) {
        name.to_string()
    } else {
        String::new()
    }
}
