//! Template variable scanning for compose documents.
//!
//! Compose documents reference variables in three ways:
//!
//! - `${NAME}` interpolation
//! - `$NAME` interpolation
//! - `.Values.NAME` inside a `{{- ... }}` conditional block
//!
//! `$$` escapes a literal dollar sign, so a `$` preceded by another `$` is
//! never treated as a reference.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

struct Patterns {
    braced: Regex,
    bare: Regex,
    values: Regex,
    template_block: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        braced: Regex::new(r"(?:^|[^$])\$\{(.+?)\}").expect("braced variable pattern"),
        bare: Regex::new(r"(?:^|[^$])\$([a-zA-Z0-9_]+)").expect("bare variable pattern"),
        values: Regex::new(r"\{\{-.*?\s+\.Values\.([a-zA-Z0-9_]+)\s+.*?\}\}")
            .expect("values pattern"),
        template_block: Regex::new(r"\{\{-.*?\}\}").expect("template block pattern"),
    })
}

/// Collect the names of all variables referenced by `text`.
///
/// Scanning must run on the raw document, before [`strip_template_blocks`],
/// so that variables used only inside conditionals are still reported.
pub fn scan_variables(text: &str) -> BTreeSet<String> {
    let p = patterns();
    [&p.braced, &p.bare, &p.values]
        .into_iter()
        .flat_map(|re| re.captures_iter(text).map(|caps| caps[1].to_string()))
        .collect()
}

/// Remove every `{{- ... }}` block so the remainder parses as plain YAML.
pub fn strip_template_blocks(text: &str) -> String {
    patterns().template_block.replace_all(text, "").into_owned()
}
