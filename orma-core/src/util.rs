use std::cmp::min;
use syn::Path;

/// True if the trailing segments of `path` equal the trailing items of `expect`.
///
/// `String`, `string::String` and `::std::string::String` all match
/// `&["std", "string", "String"]`.
pub fn matches_path(path: &Path, expect: &[&str]) -> bool {
    let len = min(path.segments.len(), expect.len());
    path.segments
        .iter()
        .rev()
        .take(len)
        .map(|v| &v.ident)
        .eq(expect.iter().rev().take(len))
}

pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

/// Shortens long SQL text for error messages and logs.
pub fn truncate_long(query: &str) -> String {
    let mut end = min(query.len(), 497);
    while !query.is_char_boundary(end) {
        end -= 1;
    }
    format!(
        "{}{}",
        query[..end].trim_end(),
        if end < query.len() { "..." } else { "" },
    )
}
