/// Strip `base_url` from the front of `target` and collapse doubled slashes.
///
/// A trailing slash on `base_url` is ignored, so `http://api/` and `http://api`
/// strip the same prefix. The prefix only matches on a path boundary:
/// `http://api:30001/x` is not under `http://api:3000`.
pub fn normalize_path(target: &str, base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let stripped = match target.strip_prefix(base) {
        Some(rest) if !base.is_empty() && is_boundary(rest) => rest,
        _ => target,
    };
    collapse_slashes(stripped)
}

fn is_boundary(rest: &str) -> bool {
    rest.is_empty() || rest.starts_with(['/', '?', '#'])
}

/// Collapse runs of `/` into one, except the `//` that follows a scheme's `:`.
pub fn collapse_slashes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev: Option<char> = None;
    let mut before_prev: Option<char> = None;

    for c in input.chars() {
        if c == '/' && prev == Some('/') && before_prev != Some(':') {
            continue;
        }
        out.push(c);
        before_prev = prev;
        prev = Some(c);
    }

    out
}
