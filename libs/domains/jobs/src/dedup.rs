//! Dedup fingerprint: `sha1_hex(nup | "|" | scope | "|" | mode | "|" | "v1")`
//! (spec.md §3, "Dedup fingerprint"). `v1` is a schema version bumped
//! whenever the pipeline's output contract changes incompatibly.

use sha1::{Digest, Sha1};

const SCHEMA_VERSION: &str = "v1";

pub fn dedup_key(nup: &str, scope: Option<&str>, mode: &str) -> String {
    let scope = scope.unwrap_or("");
    let mut hasher = Sha1::new();
    hasher.update(nup.as_bytes());
    hasher.update(b"|");
    hasher.update(scope.as_bytes());
    hasher.update(b"|");
    hasher.update(mode.as_bytes());
    hasher.update(b"|");
    hasher.update(SCHEMA_VERSION.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_40_hex_chars() {
        let key = dedup_key("0609.012097.00016/2026-69", Some("DIR-A"), "detalhar");
        assert_eq!(key.len(), 40);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn scope_none_and_empty_string_are_equivalent() {
        let with_none = dedup_key("X", None, "detalhar");
        let with_empty = dedup_key("X", Some(""), "detalhar");
        assert_eq!(with_none, with_empty);
    }

    #[test]
    fn different_scope_yields_different_fingerprint() {
        let a = dedup_key("X", Some("DIR-A"), "detalhar");
        let b = dedup_key("X", Some("DIR-B"), "detalhar");
        assert_ne!(a, b);
    }

    #[test]
    fn is_stable_and_deterministic() {
        let a = dedup_key("X", Some("DIR-A"), "detalhar");
        let b = dedup_key("X", Some("DIR-A"), "detalhar");
        assert_eq!(a, b);
    }
}
