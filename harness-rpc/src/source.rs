//! Source units handed to the compiler.

use crate::error::{RpcError, RpcResult};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Includes the compiler resolves from its own standard library.
pub const STDLIB_INCLUDES: &[&str] = &[
    "List.aes",
    "Option.aes",
    "String.aes",
    "Func.aes",
    "Pair.aes",
    "Triple.aes",
    "BLS12_381.aes",
    "Frac.aes",
    "Set.aes",
    "Bitwise.aes",
    "Address.aes",
    "Bytes.aes",
];

const INCLUDE_PATTERN: &str = r#"(?m)^[ \t]*include[ \t]+"([^"]+)""#;

/// Source plus the include files the compiler needs to resolve it.
#[derive(Debug, Clone, Copy)]
pub struct SourceUnit<'a> {
    pub code: &'a str,
    /// Include path as written -> file contents.
    pub file_system: &'a BTreeMap<String, String>,
}

/// Whether `include` names a standard library file.
#[must_use]
pub fn is_stdlib_include(include: &str) -> bool {
    STDLIB_INCLUDES.contains(&include)
}

fn include_regex() -> RpcResult<&'static Regex> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    if let Some(regex) = PATTERN.get() {
        return Ok(regex);
    }
    let regex = Regex::new(INCLUDE_PATTERN)
        .map_err(|e| RpcError::invalid_params(format!("include pattern: {e}")))?;
    Ok(PATTERN.get_or_init(|| regex))
}

/// Include paths named by `source`, in order of appearance.
///
/// # Errors
///
/// Only if the include pattern fails to build.
pub fn include_directives(source: &str) -> RpcResult<Vec<String>> {
    Ok(include_regex()?
        .captures_iter(source)
        .map(|cap| cap[1].to_string())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_include_directives_at_line_start() {
        let src = "include \"List.aes\"\n  include \"lib/Util.aes\"\ncontract C =\n  // include \"no.aes\"\n";
        assert_eq!(
            include_directives(src).unwrap(),
            vec!["List.aes".to_string(), "lib/Util.aes".to_string()]
        );
    }

    #[test]
    fn stdlib_names_are_exact() {
        assert!(is_stdlib_include("List.aes"));
        assert!(!is_stdlib_include("lib/List.aes"));
        assert!(!is_stdlib_include("NFTReceiver.aes"));
    }
}
