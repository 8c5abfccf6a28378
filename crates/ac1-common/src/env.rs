//! `${VAR}` / `${VAR:-default}` substitution for YAML configuration.

use crate::error::SubstitutionError;

/// Expand environment variable references in configuration text.
///
/// `${VAR}` fails when `VAR` is unset; `${VAR:-default}` falls back to
/// `default` when `VAR` is unset or empty. Braces may nest inside the
/// default.
pub fn expand_env_vars(content: &str) -> Result<String, SubstitutionError> {
    expand_with(content, |name| std::env::var(name).ok())
}

/// [`expand_env_vars`] with an explicit variable lookup.
pub fn expand_with(
    content: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, SubstitutionError> {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' || chars.peek() != Some(&'{') {
            result.push(ch);
            continue;
        }
        chars.next(); // '{'

        let mut expr = String::new();
        let mut depth = 1;
        while depth > 0 {
            match chars.next() {
                Some('{') => {
                    depth += 1;
                    expr.push('{');
                }
                Some('}') => {
                    depth -= 1;
                    if depth > 0 {
                        expr.push('}');
                    }
                }
                Some(c) => expr.push(c),
                None => return Err(SubstitutionError::Unclosed(expr)),
            }
        }

        let value = match expr.split_once(":-") {
            Some((name, default)) => match lookup(name.trim()) {
                Some(v) if !v.is_empty() => v,
                _ => default.to_string(),
            },
            None => lookup(expr.trim()).ok_or_else(|| SubstitutionError::Unset(expr.trim().to_string()))?,
        };
        result.push_str(&value);
    }

    Ok(result)
}
