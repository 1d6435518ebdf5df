//! The individual rewrite stages of the content filter
//!
//! Each stage is a pure `text -> text` function over the whole document. The
//! patterns work on raw markup rather than a parsed tree so that escaped text
//! such as `&lt;user at example.com&gt;` is matched exactly as served.

use crate::config::SearchReplace;
use crate::ConfigError;
use regex::{NoExpand, Regex, RegexBuilder, Replacer};
use std::borrow::Cow;

/// A single rewrite applied to a page
pub trait FilterStage: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Rewrites the page, borrowing the input when nothing matched
    fn apply<'t>(&self, text: &'t str) -> Cow<'t, str>;
}

/// Compiles a case-insensitive regex
fn compile(pattern: &str) -> Result<Regex, ConfigError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))
}

/// Applies one regex to text that may already have been rewritten
fn replace_cow<'t, R: Replacer>(regex: &Regex, text: Cow<'t, str>, replacement: R) -> Cow<'t, str> {
    match text {
        Cow::Borrowed(s) => regex.replace_all(s, replacement),
        Cow::Owned(s) => Cow::Owned(regex.replace_all(&s, replacement).into_owned()),
    }
}

/// User-configured search/replace rules, applied in configured order
pub struct SearchReplaceStage {
    rules: Vec<(Regex, String)>,
}

impl SearchReplaceStage {
    pub fn new(rules: &[SearchReplace]) -> Result<Self, ConfigError> {
        let rules = rules
            .iter()
            .map(|rule| Ok((compile(&rule.pattern)?, rule.replacement.clone())))
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(Self { rules })
    }
}

impl FilterStage for SearchReplaceStage {
    fn name(&self) -> &'static str {
        "search-replace"
    }

    fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.rules
            .iter()
            .fold(Cow::Borrowed(text), |page, (regex, replacement)| {
                replace_cow(regex, page, replacement.as_str())
            })
    }
}

/// Removes e-mail addresses and mailto links
pub struct AddressRedactionStage {
    email: Regex,
    obscured_email: Regex,
    mailto_link: Regex,
    mailto_label: Regex,
}

impl AddressRedactionStage {
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self {
            // billy@nomates.com or <billy@nomates.com>
            email: compile(r"\b<?[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,4}>?\b")?,
            // Pipermail's "billy at nomates.com", either linked or inside &lt; &gt;
            obscured_email: compile(
                r#"(?x)
                (?:&lt;)?
                <a\s+href="[^>]*?>
                [A-Z0-9._%+-]+ \s at \s [A-Z0-9.-]+\.[A-Z]{2,4}
                \s*?</a>
                (?:&gt;)?
                |
                &lt;[A-Z0-9._%+-]+ \s at \s [A-Z0-9.-]+\.[A-Z]{2,4}&gt;
                "#,
            )?,
            mailto_link: compile(r#"<a\s+href="mailto:[^>]*?>([^<]*?)</a>"#)?,
            mailto_label: compile(r"\[mailto:\]")?,
        })
    }
}

impl FilterStage for AddressRedactionStage {
    fn name(&self) -> &'static str {
        "address-redaction"
    }

    fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        let text = self.email.replace_all(text, "");
        let text = replace_cow(&self.obscured_email, text, "");
        let text = replace_cow(&self.mailto_link, text, "$1");
        replace_cow(&self.mailto_label, text, "")
    }
}

/// Replaces a literal URL (case-insensitively) with a fixed string
pub struct LinkRewriteStage {
    name: &'static str,
    target: Regex,
    replacement: String,
}

impl LinkRewriteStage {
    /// Neutralises leftover absolute links into the source archive, such as
    /// attachment links
    pub fn archive_links(list_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            name: "archive-links",
            target: compile(&regex::escape(list_url))?,
            replacement: "#".to_string(),
        })
    }

    /// Points links at the source list-info page to the configured page
    pub fn list_info(source_list_info: &str, replacement: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            name: "list-info",
            target: compile(&regex::escape(source_list_info))?,
            replacement: replacement.to_string(),
        })
    }
}

impl FilterStage for LinkRewriteStage {
    fn name(&self) -> &'static str {
        self.name
    }

    fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.target
            .replace_all(text, NoExpand(self.replacement.as_str()))
    }
}

/// Drops quoted lines nested deeper than the configured depth
///
/// Pipermail marks each quoted line with one `&gt;` per level between the
/// closing and reopening italic tags: `</I>&gt;&gt;<i> text`.
pub struct QuoteStripStage {
    quoted_line: Regex,
}

impl QuoteStripStage {
    pub fn new(depth: u32) -> Result<Self, ConfigError> {
        let min_level = depth + 1;
        let pattern = format!(
            r"(?m)(?:</i>|^)(?:&gt;){{{},}}<i>(?:[ \t][^\n]*)?\n",
            min_level
        );
        Ok(Self {
            quoted_line: compile(&pattern)?,
        })
    }
}

impl FilterStage for QuoteStripStage {
    fn name(&self) -> &'static str {
        "quote-strip"
    }

    fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.quoted_line.replace_all(text, "")
    }
}

/// Inserts custom markup immediately before `</head>`
pub struct HeadInjectionStage {
    head_close: Regex,
    replacement: String,
}

impl HeadInjectionStage {
    pub fn new(head_html: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            head_close: compile("</head>")?,
            replacement: format!("{}</head>", head_html),
        })
    }
}

impl FilterStage for HeadInjectionStage {
    fn name(&self) -> &'static str {
        "head-injection"
    }

    fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.head_close
            .replace_all(text, NoExpand(self.replacement.as_str()))
    }
}
