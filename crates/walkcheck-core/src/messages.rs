//! Message bundle: resolves message keys and positional arguments into text.
//!
//! Checks never build user-facing strings themselves. They log a key such as
//! `magic.number` plus arguments, and the bundle turns that into
//! `'42' is a magic number.` at report time. Templates follow the
//! `MessageFormat` conventions: `{0}` inserts the first argument, `''` is a
//! literal quote and text between single quotes is copied verbatim.

use std::collections::HashMap;

use crate::diagnostic::Diagnostic;

/// Key used when a file cannot be read.
pub const IO_ERROR_KEY: &str = "general.exception";

/// Key used when the parser rejects a file.
pub const PARSE_ERROR_KEY: &str = "general.parseError";

/// Key used for a check that failed while walking a file.
pub const CHECK_FAULT_KEY: &str = "general.checkFault";

const CORE_MESSAGES: &[(&str, &str)] = &[
    (IO_ERROR_KEY, "Got an exception - {0}"),
    (PARSE_ERROR_KEY, "Unable to parse file - {0}"),
    (CHECK_FAULT_KEY, "Check ''{0}'' failed - {1}"),
];

/// Lookup table from message key to template.
///
/// Engine templates are shared. Check templates are stored under the check
/// name, so two checks may use the same key with different text.
#[derive(Debug, Clone)]
pub struct MessageBundle {
    templates: HashMap<String, String>,
    check_templates: HashMap<(String, String), String>,
}

impl Default for MessageBundle {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageBundle {
    /// Creates a bundle holding the engine's own messages.
    #[must_use]
    pub fn new() -> Self {
        let mut bundle = Self {
            templates: HashMap::new(),
            check_templates: HashMap::new(),
        };
        bundle.extend(CORE_MESSAGES.iter().copied());
        bundle
    }

    /// Adds or replaces a template.
    pub fn insert(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.templates.insert(key.into(), template.into());
    }

    /// Adds templates, keeping entries that already exist.
    pub fn extend<'a, I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (key, template) in entries {
            self.templates
                .entry(key.to_string())
                .or_insert_with(|| template.to_string());
        }
    }

    /// Adds the default templates of `check`, keeping entries that already
    /// exist for that check.
    pub fn register_check<'a, I>(&mut self, check: &str, entries: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (key, template) in entries {
            self.check_templates
                .entry((check.to_string(), key.to_string()))
                .or_insert_with(|| template.to_string());
        }
    }

    /// Template `check` registered for `key`, falling back to the shared
    /// entry and then to the key itself.
    #[must_use]
    pub fn template_for<'a>(&'a self, check: &str, key: &'a str) -> &'a str {
        self.check_templates
            .get(&(check.to_string(), key.to_string()))
            .map_or_else(|| self.template(key), String::as_str)
    }

    /// Returns the template for `key`, or the key itself when unknown.
    #[must_use]
    pub fn template<'a>(&'a self, key: &'a str) -> &'a str {
        self.templates.get(key).map_or(key, String::as_str)
    }

    /// Returns true if the bundle has a template for `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.templates.contains_key(key)
            || self.check_templates.keys().any(|(_, k)| k == key)
    }

    /// Formats a diagnostic. A configured override wins over the template of
    /// the reporting check.
    #[must_use]
    pub fn format(&self, diagnostic: &Diagnostic) -> String {
        let template = diagnostic
            .custom_template
            .as_deref()
            .unwrap_or_else(|| self.template_for(&diagnostic.check.name, &diagnostic.key));
        format_message(template, &diagnostic.args)
    }
}

/// Substitutes `{n}` placeholders in `template`.
///
/// Placeholders with no matching argument are kept as written.
#[must_use]
pub fn format_message(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    let mut quoted = false;

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                if chars.peek() == Some(&'\'') {
                    chars.next();
                    out.push('\'');
                } else {
                    quoted = !quoted;
                }
            }
            '{' if !quoted => {
                let mut placeholder = String::new();
                let mut closed = false;
                for inner in chars.by_ref() {
                    if inner == '}' {
                        closed = true;
                        break;
                    }
                    placeholder.push(inner);
                }
                let arg = placeholder
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| args.get(index));
                match (closed, arg) {
                    (true, Some(arg)) => out.push_str(arg),
                    (true, None) => {
                        out.push('{');
                        out.push_str(&placeholder);
                        out.push('}');
                    }
                    (false, _) => {
                        out.push('{');
                        out.push_str(&placeholder);
                    }
                }
            }
            other => out.push(other),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn substitutes_positional_arguments() {
        assert_eq!(
            format_message("Count of {0} exceeds {1}.", &args(&["3", "2"])),
            "Count of 3 exceeds 2."
        );
        assert_eq!(format_message("{1}{0}", &args(&["a", "b"])), "ba");
    }

    #[test]
    fn handles_quotes_like_message_format() {
        assert_eq!(
            format_message("''{0}'' is a magic number.", &args(&["42"])),
            "'42' is a magic number."
        );
        assert_eq!(format_message("'{0}' stays", &args(&["x"])), "{0} stays");
    }

    #[test]
    fn keeps_unmatched_placeholders() {
        assert_eq!(format_message("{2} and {x}", &args(&["a"])), "{2} and {x}");
        assert_eq!(format_message("open {0", &args(&["a"])), "open {0");
    }

    #[test]
    fn unknown_key_is_used_as_template() {
        let bundle = MessageBundle::new();
        assert_eq!(bundle.template("no.such.key"), "no.such.key");
        assert!(bundle.contains(PARSE_ERROR_KEY));
    }

    #[test]
    fn extend_does_not_override_existing() {
        let mut bundle = MessageBundle::new();
        bundle.extend([(IO_ERROR_KEY, "replaced")]);
        assert_eq!(bundle.template(IO_ERROR_KEY), "Got an exception - {0}");
        bundle.insert(IO_ERROR_KEY, "replaced");
        assert_eq!(bundle.template(IO_ERROR_KEY), "replaced");
    }

    #[test]
    fn checks_sharing_a_key_keep_their_own_text() {
        use crate::diagnostic::{CheckIdentity, Severity};

        let mut bundle = MessageBundle::new();
        bundle.register_check("SuperClone", [("missing.super.call", "Method ''{0}'' should call ''super.{0}''.")]);
        bundle.register_check("SuperFinalize", [("missing.super.call", "Finalizer {0} skips super.")]);
        bundle.register_check("SuperClone", [("missing.super.call", "ignored")]);

        let diagnostic = |check: &str| {
            Diagnostic::new(
                3,
                4,
                "missing.super.call",
                vec!["clone".into()],
                Severity::Error,
                CheckIdentity::named(check),
            )
        };
        assert_eq!(
            bundle.format(&diagnostic("SuperClone")),
            "Method 'clone' should call 'super.clone'."
        );
        assert_eq!(bundle.format(&diagnostic("SuperFinalize")), "Finalizer clone skips super.");
        assert_eq!(bundle.format(&diagnostic("Other")), "missing.super.call");
        assert_eq!(bundle.template_for("Other", PARSE_ERROR_KEY), "Unable to parse file - {0}");
        assert!(bundle.contains("missing.super.call"));
    }
}
