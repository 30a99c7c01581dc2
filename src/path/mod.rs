use memchr::memchr2;

/// Drops any query string or fragment, keeping what precedes the first `?`
/// or `#`.
#[inline]
pub fn strip_query_and_fragment(path: &str) -> &str {
    match memchr2(b'?', b'#', path.as_bytes()) {
        Some(end) => &path[..end],
        None => path,
    }
}
