//! Call-site capture and caller identification
//!
//! Each logging macro expands [`call_site!`] where it is invoked. The macro
//! declares a probe function in the caller's scope; the probe's type name is
//! the fully qualified path of the enclosing function followed by the probe
//! itself, e.g. `my_app::server::handle::__daylog_probe`.
//!
//! Resolving walks that path from the innermost segment outward and skips
//! segments belonging to the logger (the probe) or to anonymous frames
//! (`{{closure}}`). The first segment outside that set is the calling
//! function and is itself the call site.

use crate::error::LogError;

/// Name of the probe function declared by [`call_site!`]
pub const PROBE_NAME: &str = "__daylog_probe";

/// Path segments that never identify a caller
const INTERNAL_SEGMENTS: &[&str] = &[PROBE_NAME, "{{closure}}"];

/// Source location captured at a logging call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    /// Type name of the probe function, see module docs
    pub raw: &'static str,
    /// `module_path!()` at the call
    pub module_path: &'static str,
    /// `file!()` at the call
    pub file: &'static str,
    /// `line!()` at the call
    pub line: u32,
}

impl CallSite {
    pub const fn new(
        raw: &'static str,
        module_path: &'static str,
        file: &'static str,
        line: u32,
    ) -> Self {
        Self {
            raw,
            module_path,
            file,
            line,
        }
    }

    /// Qualified name of the function that made the logging call
    pub fn resolve(&self) -> Result<String, LogError> {
        resolve_caller(self.raw).ok_or_else(|| LogError::CallerUnresolved {
            raw: self.raw.to_string(),
        })
    }
}

/// Strip internal trailing segments from a probe path, returning `None` when
/// nothing but internal segments remain.
pub fn resolve_caller(raw: &str) -> Option<String> {
    let segments = split_path(raw);
    let mut end = segments.len();
    while end > 0 && INTERNAL_SEGMENTS.contains(&segments[end - 1]) {
        end -= 1;
    }
    if end == 0 || end == segments.len() {
        // Either only internal frames, or the probe was never there.
        return None;
    }
    Some(segments[..end].join("::"))
}

/// Split on `::` outside of `<...>` so trait-qualified paths such as
/// `<app::A as core::fmt::Display>::fmt` stay one segment.
fn split_path(path: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let bytes = path.as_bytes();
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
    segments
}

/// Type name of a value's type; used on the probe function item
pub fn type_name_of<T>(_: T) -> &'static str {
    std::any::type_name::<T>()
}

/// Capture the current [`CallSite`]
#[macro_export]
macro_rules! call_site {
    () => {{
        fn __daylog_probe() {}
        $crate::CallSite::new(
            $crate::caller::type_name_of(__daylog_probe),
            ::std::module_path!(),
            ::std::file!(),
            ::std::line!(),
        )
    }};
}
