use once_cell::sync::Lazy;
use regex::Regex;

static POSITIONAL_INDEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\d+\]").unwrap());

/// Strip `[n]` positional indices and leading group segments from export headers,
/// leaving the leaf field name.
pub fn clean_headers<S: AsRef<str>>(header_paths: &[S]) -> Vec<String> {
    header_paths
        .iter()
        .map(|header| clean_header(header.as_ref()))
        .collect()
}

pub fn clean_header(header: &str) -> String {
    let unindexed = POSITIONAL_INDEX.replace_all(header, "");
    unindexed
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Indexed export header for a field inside a repeat, e.g. `children[1]/childs_name`.
pub fn repeat_header(repeat_path: &str, field_path: &str, iteration: usize) -> String {
    let relative = field_path
        .strip_prefix(repeat_path)
        .map(|rest| rest.trim_start_matches('/'))
        .unwrap_or(field_path);
    format!("{}[{}]/{}", repeat_path, iteration, relative)
}
