use anyhow::{bail, Result};
use regex::Regex;
use std::sync::OnceLock;

use crate::request::{CreationMode, ProjectKind};

// `\w` is ASCII-only on purpose: the token ends up in JS identifiers and URLs.
const STANDARD_DERIVED: &str = r"^yst-cloudt-web-((?-u:\w){2,10})$";
const STANDARD_EXPLICIT: &str = r"^yst-cloudt-web-.+$";
const CUSTOM_DERIVED: &str = r"^yst-.+-web-((?-u:\w){2,10})$";
const CUSTOM_EXPLICIT: &str = r"^yst-.+-web-.+$";
const PUBLIC_PATH: &str = r"^/(?-u:\w){2,10}/$";

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

struct Patterns {
    standard_derived: Regex,
    standard_explicit: Regex,
    custom_derived: Regex,
    custom_explicit: Regex,
    public_path: Regex,
}

fn patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| Patterns {
        standard_derived: Regex::new(STANDARD_DERIVED).expect("Valid regex"),
        standard_explicit: Regex::new(STANDARD_EXPLICIT).expect("Valid regex"),
        custom_derived: Regex::new(CUSTOM_DERIVED).expect("Valid regex"),
        custom_explicit: Regex::new(CUSTOM_EXPLICIT).expect("Valid regex"),
        public_path: Regex::new(PUBLIC_PATH).expect("Valid regex"),
    })
}

/// A check applied to a single text answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Any,
    ProjectName(ProjectKind, CreationMode),
    PublicPath,
    DevPort,
}

impl Rule {
    /// Checks `input`, returning the message to show the operator on rejection.
    ///
    /// # Errors
    ///
    /// Returns an [`Err`] describing the expected format when `input` does
    /// not satisfy the rule
    pub fn check(self, input: &str) -> Result<()> {
        match self {
            Rule::Any => Ok(()),
            Rule::ProjectName(kind, mode) => check_project_name(kind, mode, input),
            Rule::PublicPath => {
                if !patterns().public_path.is_match(input) {
                    bail!("The public path must start and end with '/' around a 2-10 character word, e.g. /support/");
                }
                Ok(())
            }
            Rule::DevPort => check_dev_port(input),
        }
    }
}

fn check_project_name(kind: ProjectKind, mode: CreationMode, input: &str) -> Result<()> {
    let p = patterns();
    let (regex, hint) = match (kind, mode) {
        (ProjectKind::Standard, CreationMode::Derived) => (
            &p.standard_derived,
            "The name must start with 'yst-cloudt-web-' followed by a single 2-10 character domain word, e.g. yst-cloudt-web-support",
        ),
        (ProjectKind::Standard, CreationMode::Explicit) => (
            &p.standard_explicit,
            "The name must start with 'yst-cloudt-web-' followed by the domain, e.g. yst-cloudt-web-after-sale",
        ),
        (ProjectKind::Custom, CreationMode::Derived) => (
            &p.custom_derived,
            "The name must look like 'yst-<project>-web-' followed by a single 2-10 character domain word, e.g. yst-lm-web-support",
        ),
        (ProjectKind::Custom, CreationMode::Explicit) => (
            &p.custom_explicit,
            "The name must look like 'yst-<project>-web-' followed by the domain, e.g. yst-lm-web-after-sale",
        ),
    };

    if !regex.is_match(input) {
        bail!(hint);
    }

    Ok(())
}

fn check_dev_port(input: &str) -> Result<()> {
    if parse_number(input.trim()).is_some_and(f64::is_finite) {
        Ok(())
    } else {
        bail!("Enter a number, e.g. 3020")
    }
}

/// Decimal or unsigned `0x`/`0o`/`0b` literal. Spelled-out infinities and
/// `NaN` are not numbers here.
fn parse_number(input: &str) -> Option<f64> {
    let radix = match input.get(..2) {
        Some("0x" | "0X") => 16,
        Some("0o" | "0O") => 8,
        Some("0b" | "0B") => 2,
        _ => {
            let alphabetic = input
                .trim_start_matches(['+', '-'])
                .starts_with(|c: char| c.is_ascii_alphabetic());
            return if input.is_empty() || alphabetic {
                None
            } else {
                input.parse().ok()
            };
        }
    };

    u64::from_str_radix(&input[2..], radix).ok().map(|n| n as f64)
}

/// Names computed from the project name or from operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedNames {
    pub domain: String,
    pub css_prefix: String,
    pub public_path: String,
}

/// Derives the domain token, css prefix and public path from a validated
/// project name: `yst-cloudt-web-support` gives `support`, `yst-support` and
/// `/support/`.
#[must_use]
pub fn derive_from_name(project_name: &str) -> DerivedNames {
    let domain = project_name
        .rsplit('-')
        .next()
        .unwrap_or(project_name)
        .to_string();

    DerivedNames {
        css_prefix: format!("yst-{domain}"),
        public_path: format!("/{domain}/"),
        domain,
    }
}

/// Keeps the operator's css prefix and public path and takes the domain token
/// from the public path with every `/` removed.
#[must_use]
pub fn derive_from_explicit(css_prefix: &str, public_path: &str) -> DerivedNames {
    DerivedNames {
        domain: public_path.replace('/', ""),
        css_prefix: css_prefix.to_string(),
        public_path: public_path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CreationMode::*;
    use ProjectKind::*;

    fn ok(rule: Rule, input: &str) -> bool {
        rule.check(input).is_ok()
    }

    #[test]
    fn standard_derived_names() {
        let rule = Rule::ProjectName(Standard, Derived);
        assert!(ok(rule, "yst-cloudt-web-support"));
        assert!(ok(rule, "yst-cloudt-web-mes"));
        assert!(!ok(rule, "yst-cloudt-web-after-sale"));
        assert!(!ok(rule, "yst-cloudt-web-s"));
        assert!(!ok(rule, "yst-cloudt-web-abcdefghijk"));
        assert!(!ok(rule, "yst-lm-web-support"));
        assert!(!ok(rule, "cloudt-web-support"));
    }

    #[test]
    fn standard_explicit_names() {
        let rule = Rule::ProjectName(Standard, Explicit);
        assert!(ok(rule, "yst-cloudt-web-after-sale"));
        assert!(ok(rule, "yst-cloudt-web-s"));
        assert!(!ok(rule, "yst-cloudt-web-"));
        assert!(!ok(rule, "yst-lm-web-support"));
    }

    #[test]
    fn custom_derived_names() {
        let rule = Rule::ProjectName(Custom, Derived);
        assert!(ok(rule, "yst-lm-web-support"));
        assert!(ok(rule, "yst-cloudt-web-support"));
        assert!(!ok(rule, "yst-lm-web-after-sale"));
        assert!(!ok(rule, "yst--web-support"));
        assert!(!ok(rule, "lm-web-support"));
        assert!(!ok(rule, "yst-lm-support"));
    }

    #[test]
    fn custom_explicit_names() {
        let rule = Rule::ProjectName(Custom, Explicit);
        assert!(ok(rule, "yst-lm-web-after-sale"));
        assert!(!ok(rule, "yst-lm-web-"));
        assert!(!ok(rule, "yst-web-support"));
        assert!(!ok(rule, "lm-web-support"));
    }

    #[test]
    fn non_ascii_domain_rejected_in_derived_mode() {
        assert!(!ok(Rule::ProjectName(Standard, Derived), "yst-cloudt-web-售后"));
    }

    #[test]
    fn public_path_rule() {
        assert!(ok(Rule::PublicPath, "/support/"));
        assert!(ok(Rule::PublicPath, "/su/"));
        assert!(!ok(Rule::PublicPath, "/s/"));
        assert!(!ok(Rule::PublicPath, "support/"));
        assert!(!ok(Rule::PublicPath, "/support"));
        assert!(!ok(Rule::PublicPath, "/after-sale/"));
        assert!(!ok(Rule::PublicPath, "/abcdefghijk/"));
    }

    #[test]
    fn dev_port_rule() {
        assert!(ok(Rule::DevPort, "3020"));
        assert!(ok(Rule::DevPort, "70000"));
        assert!(!ok(Rule::DevPort, ""));
        assert!(!ok(Rule::DevPort, "   "));
        assert!(!ok(Rule::DevPort, "port"));
        assert!(!ok(Rule::DevPort, "NaN"));
        assert!(!ok(Rule::DevPort, "inf"));
        assert!(!ok(Rule::DevPort, "INF"));
        assert!(!ok(Rule::DevPort, "infinity"));
        assert!(!ok(Rule::DevPort, "-inf"));
        assert!(!ok(Rule::DevPort, "1e999"));
        assert!(ok(Rule::DevPort, " 3020 "));
        assert!(ok(Rule::DevPort, "0x1A"));
        assert!(ok(Rule::DevPort, "0b11"));
        assert!(!ok(Rule::DevPort, "0x"));
        assert!(!ok(Rule::DevPort, "0xZZ"));
    }

    #[test]
    fn derives_from_name() {
        let names = derive_from_name("yst-cloudt-web-support");
        assert_eq!(names.domain, "support");
        assert_eq!(names.css_prefix, "yst-support");
        assert_eq!(names.public_path, "/support/");
    }

    #[test]
    fn derives_from_explicit_public_path() {
        let names = derive_from_explicit("anything-goes", "/billing/");
        assert_eq!(names.domain, "billing");
        assert_eq!(names.css_prefix, "anything-goes");
        assert_eq!(names.public_path, "/billing/");
    }
}
