//! `${VAR}` and `${VAR:-default}` expansion of configuration strings.

use crate::ConfigError;

/// Variable referenced without a default and not set.
struct UnsetVariable(String);

/// Expand `${VAR}` / `${VAR:-default}` references in `value`.
///
/// Bare `$VAR` is kept as written. `field` names the configuration key in
/// errors.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let lookup = |name: &str| match std::env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(_) => Err(UnsetVariable(name.to_owned())),
    };

    shellexpand::env_with_context(&escape_bare_dollars(value), lookup)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.cause.0),
        })
}

/// Double every `$` outside a `${...}` reference so it is kept literally.
fn escape_bare_dollars(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(idx) = rest.find('$') {
        escaped.push_str(&rest[..idx]);
        rest = &rest[idx..];
        match rest.strip_prefix("${").and_then(|tail| tail.find('}')) {
            Some(close) => {
                let end = close + 3;
                escaped.push_str(&rest[..end]);
                rest = &rest[end..];
            }
            None => {
                escaped.push_str("$$");
                rest = &rest[1..];
            }
        }
    }
    escaped.push_str(rest);
    escaped
}
