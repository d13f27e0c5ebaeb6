//! Secret reference resolver.
//!
//! Values in `config.toml` can point at secrets stored elsewhere:
//!
//! - `pass::path/in/store` runs `pass show path/in/store` and keeps the first line
//! - `env::VAR_NAME` reads `$VAR_NAME`
//! - anything else is used verbatim

use tracing::debug;

/// Resolves a value that may carry a secret reference prefix.
pub fn resolve(value: &str) -> Result<String, String> {
    if let Some(path) = value.strip_prefix("pass::") {
        debug!(path, "resolving secret from pass");
        resolve_pass(path)
    } else if let Some(var) = value.strip_prefix("env::") {
        debug!(var, "resolving secret from environment");
        resolve_env(var)
    } else {
        Ok(value.to_string())
    }
}

fn resolve_pass(path: &str) -> Result<String, String> {
    let output = std::process::Command::new("pass")
        .arg("show")
        .arg(path)
        .output()
        .map_err(|e| format!("failed to run `pass show {}`: {}", path, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "`pass show {}` failed (exit {}): {}",
            path,
            output.status,
            stderr.trim()
        ));
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(str::to_string)
        .ok_or_else(|| format!("`pass show {}` produced no output", path))
}

fn resolve_env(var: &str) -> Result<String, String> {
    std::env::var(var).map_err(|_| format!("environment variable `{}` is not set", var))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passthrough() {
        assert_eq!(resolve("hello").unwrap(), "hello");
        assert_eq!(resolve("").unwrap(), "");
        assert_eq!(
            resolve("1//0refresh-token-value").unwrap(),
            "1//0refresh-token-value"
        );
    }

    #[test]
    fn env_prefix_resolves() {
        unsafe {
            std::env::set_var("_MEETBOOK_TEST_SECRET", "my-secret-value");
        }
        assert_eq!(resolve("env::_MEETBOOK_TEST_SECRET").unwrap(), "my-secret-value");
        unsafe {
            std::env::remove_var("_MEETBOOK_TEST_SECRET");
        }
    }

    #[test]
    fn env_prefix_missing_var_errors() {
        let err = resolve("env::_MEETBOOK_NONEXISTENT_VAR_12345").unwrap_err();
        assert!(err.contains("not set"));
    }

    #[test]
    fn pass_prefix_unknown_entry_errors() {
        // Fails whether or not `pass` is installed.
        assert!(resolve("pass::nonexistent/meetbook/entry/12345").is_err());
    }
}
