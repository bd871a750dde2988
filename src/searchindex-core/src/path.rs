use crate::models::IndexId;

/// Root of every index resource
pub const INDEX_ROOT: &str = "v1/index";

/// Join path segments with one `/` between them.
///
/// Each segment is trimmed of leading and trailing slashes first. Empty
/// segments are kept, so a missing id or name stays visible in the path
/// instead of shifting the request onto another resource. The result always
/// starts with `/`. Nothing is percent-encoded here; the transport does that
/// when it builds the URL.
pub fn join_path<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut path = String::new();
    for segment in segments {
        path.push('/');
        path.push_str(segment.as_ref().trim_matches('/'));
    }

    if path.is_empty() {
        path.push('/');
    }
    path
}

/// Path of `/v1/index/{index_id}` followed by `segments`
pub fn index_path(index_id: &IndexId, segments: &[&str]) -> String {
    join_path(
        [INDEX_ROOT, index_id.as_str()]
            .into_iter()
            .chain(segments.iter().copied()),
    )
}
