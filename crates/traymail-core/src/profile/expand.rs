//! Platform placeholder expansion.

use std::path::PathBuf;

/// Expand `~`, `$VAR`, `${VAR}` and `%VAR%` in a profile path.
///
/// Returns the name of the first variable that has no value, or `~` when
/// the home shorthand is used without a known home directory.
pub(crate) fn expand_placeholders<H, V>(raw: &str, home: H, var: V) -> Result<PathBuf, String>
where
    H: FnOnce() -> Option<PathBuf>,
    V: Fn(&str) -> Option<String>,
{
    let normalized = windows_vars_to_shell(raw);
    let home = home().and_then(|path| path.into_os_string().into_string().ok());
    if home.is_none() && uses_home_shorthand(&normalized) {
        return Err("~".to_string());
    }

    shellexpand::full_with_context(&normalized, || home, |name: &str| {
        var(name).map(Some).ok_or(())
    })
    .map(|expanded| PathBuf::from(expanded.as_ref()))
    .map_err(|e| e.var_name)
}

/// Rewrite `%NAME%` tokens into `${NAME}`.
///
/// Anything that is not a well-formed token, such as a lone `%` or `%%`,
/// is kept as typed.
fn windows_vars_to_shell(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('%') {
            Some(end) if end > 0 && after[..end].chars().all(is_var_char) => {
                out.push_str("${");
                out.push_str(&after[..end]);
                out.push('}');
                rest = &after[end + 1..];
            }
            _ => {
                out.push('%');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// `~` alone or followed by a separator; `~user` is not expanded.
fn uses_home_shorthand(path: &str) -> bool {
    path == "~" || path.starts_with("~/") || (cfg!(windows) && path.starts_with("~\\"))
}

const fn is_var_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '(' | ')')
}
