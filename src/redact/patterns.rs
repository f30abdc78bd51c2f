//! Built-in redaction pattern sets
//!
//! `basic()` is a small, high-precision set meant to run on every record at
//! the default security mode; `full()` adds broader, occasionally
//! lower-precision coverage for deployments that can pay the extra scan
//! cost. Both are compiled once, at `Redactor` construction.

use regex::Regex;

/// A named pattern: `name` is used only for debug-mode breadcrumbs.
pub struct NamedPattern {
    pub name: &'static str,
    pub regex: Regex,
}

fn compile(name: &'static str, pattern: &str) -> NamedPattern {
    NamedPattern {
        name,
        regex: Regex::new(pattern).unwrap_or_else(|e| {
            panic!("built-in redaction pattern {name:?} failed to compile: {e}")
        }),
    }
}

/// ~25 high-precision patterns: credentials, tokens, keys, and the most
/// common PII shapes that are cheap to match with very low false-positive
/// rates. Deliberately excludes email, IP literals, JWTs, and brand-specific
/// cloud tokens — those are lower-precision or broader-recall and belong to
/// [`full`] per spec.md §4.2's basic/full split.
pub fn basic() -> Vec<NamedPattern> {
    vec![
        compile("password_field", r#"(?i)("?password"?\s*[:=]\s*)"?[^"\s,}]{3,}"?"#),
        compile("passwd_field", r#"(?i)("?passwd"?\s*[:=]\s*)"?[^"\s,}]{3,}"?"#),
        compile("secret_field", r#"(?i)("?secret"?\s*[:=]\s*)"?[^"\s,}]{3,}"?"#),
        compile("client_secret_field", r#"(?i)("?client[_-]?secret"?\s*[:=]\s*)"?[^"\s,}]{3,}"?"#),
        compile("api_key_field", r#"(?i)("?api[_-]?key"?\s*[:=]\s*)"?[A-Za-z0-9_\-]{8,}"?"#),
        compile("api_secret_field", r#"(?i)("?api[_-]?secret"?\s*[:=]\s*)"?[A-Za-z0-9_\-]{8,}"?"#),
        compile("access_key_field", r#"(?i)("?access[_-]?key"?\s*[:=]\s*)"?[A-Za-z0-9_\-]{8,}"?"#),
        compile("auth_token_field", r#"(?i)("?auth[_-]?token"?\s*[:=]\s*)"?[A-Za-z0-9_\-.]{8,}"?"#),
        compile("bearer_token", r"(?i)bearer\s+[A-Za-z0-9_\-.]{10,}"),
        compile("basic_auth_header", r"(?i)basic\s+[A-Za-z0-9+/=]{10,}"),
        compile("authorization_field", r#"(?i)("?authorization"?\s*[:=]\s*)"?[^"\s,}]{3,}"?"#),
        compile("private_key_block", r"-----BEGIN [A-Z ]*PRIVATE KEY-----"),
        compile("aws_access_key_id", r"\bAKIA[0-9A-Z]{16}\b"),
        compile("aws_secret_key_field", r#"(?i)("?aws[_-]?secret[_-]?access[_-]?key"?\s*[:=]\s*)"?[A-Za-z0-9/+=]{30,}"?"#),
        compile("credit_card_number", r"\b(?:\d[ -]*?){13,19}\b"),
        compile("ssn_us", r"\b\d{3}-\d{2}-\d{4}\b"),
        compile("pin_field", r#"(?i)("?pin"?\s*[:=]\s*)"?\d{4,8}"?"#),
        compile("cvv_field", r#"(?i)("?cvv\d?"?\s*[:=]\s*)"?\d{3,4}"?"#),
        compile("session_cookie_field", r#"(?i)("?session[_-]?id"?\s*[:=]\s*)"?[A-Za-z0-9_\-.]{8,}"?"#),
        compile("db_connection_string", r"(?i)(?:postgres|mysql|mongodb|redis)://[^:\s]+:[^@\s]+@"),
        compile("generic_token_field", r#"(?i)("?token"?\s*[:=]\s*)"?[A-Za-z0-9_\-.]{10,}"?"#),
        compile("phone_number_us", r"\b\(?\d{3}\)?[ -]?\d{3}[ -]?\d{4}\b"),
    ]
}

/// Superset of [`basic`] with broader, lower-precision coverage: email,
/// IPv4/IPv6 literals, JWT triples, brand-specific cloud-provider tokens,
/// international ID formats, and Log4j `${...}` lookup expressions (the
/// Log4Shell payload shape).
pub fn full() -> Vec<NamedPattern> {
    let mut patterns = basic();
    patterns.extend([
        compile("email_address", r"\b[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}\b"),
        compile("ipv4_address", r"\b(?:(?:25[0-5]|2[0-4]\d|[01]?\d?\d)\.){3}(?:25[0-5]|2[0-4]\d|[01]?\d?\d)\b"),
        compile(
            "ipv6_address",
            r"\b(?:[A-Fa-f0-9]{1,4}:){2,7}[A-Fa-f0-9]{1,4}\b",
        ),
        compile("jwt_token", r"\beyJ[A-Za-z0-9_\-]+\.[A-Za-z0-9_\-]+\.[A-Za-z0-9_\-]+\b"),
        compile("github_token", r"\bgh[pousr]_[A-Za-z0-9]{36}\b"),
        compile("slack_token", r"\bxox[baprs]-[A-Za-z0-9\-]{10,}\b"),
        compile("stripe_secret_key", r"\bsk_live_[A-Za-z0-9]{20,}\b"),
        compile("google_api_key", r"\bAIza[0-9A-Za-z_\-]{35}\b"),
        compile("azure_storage_key", r"\b[A-Za-z0-9+/]{86}==\b"),
        compile(
            "gcp_service_account_key",
            r#"(?i)"private_key_id"\s*:\s*"[0-9a-f]{40}""#,
        ),
        compile("iban", r"\b[A-Z]{2}\d{2}[A-Z0-9]{10,30}\b"),
        compile(
            "uk_nino",
            r"\b[A-CEGHJ-PR-TW-Z]{2}\d{6}[A-D]\b",
        ),
        compile(
            "log4j_jndi_lookup",
            r"(?i)\$\{jndi:(?:ldap|rmi|dns|ldaps)://[^}]*\}",
        ),
        compile("generic_lookup_expression", r"\$\{[a-zA-Z][\w:./\-]*\}"),
        compile(
            "mac_address",
            r"\b(?:[0-9A-Fa-f]{2}:){5}[0-9A-Fa-f]{2}\b",
        ),
    ]);
    patterns
}
