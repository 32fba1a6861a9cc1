//! Body placeholder tag construction
//!
//! A layout marks the spot where inner content goes with a placeholder tag,
//! `{% body %}` by default. This module builds the literal form of that tag
//! and a regex that also accepts variations in inner whitespace
//! (`{%body%}`, `{%   body  %}`).

use std::borrow::Cow;

use regex::{NoExpand, Regex};
use thiserror::Error;

/// Default delimiters around the body tag
pub const DEFAULT_TAG_DELIMS: (&str, &str) = ("{%", "%}");

/// Default name of the body tag
pub const DEFAULT_TAG_NAME: &str = "body";

/// Errors that can occur while building the body tag matcher
#[derive(Debug, Error)]
pub enum TagError {
    /// The generated pattern failed to compile
    #[error("invalid body tag pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A delimiter or the tag name was empty
    #[error("body tag {part} must not be empty")]
    Empty { part: &'static str },
}

/// Options describing the shape of the body tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagOptions {
    /// Opening and closing delimiters
    pub delims: (String, String),
    /// Tag name between the delimiters
    pub tag: String,
    /// Separator placed between delimiters and tag name in the literal form
    pub sep: String,
}

impl Default for TagOptions {
    fn default() -> Self {
        Self {
            delims: (
                DEFAULT_TAG_DELIMS.0.to_string(),
                DEFAULT_TAG_DELIMS.1.to_string(),
            ),
            tag: DEFAULT_TAG_NAME.to_string(),
            sep: " ".to_string(),
        }
    }
}

impl TagOptions {
    /// Create options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the delimiters
    pub fn with_delims(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.delims = (open.into(), close.into());
        self
    }

    /// Set the tag name
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Set the separator
    pub fn with_separator(mut self, sep: impl Into<String>) -> Self {
        self.sep = sep.into();
        self
    }

    fn validate(&self) -> Result<(), TagError> {
        if self.delims.0.is_empty() {
            return Err(TagError::Empty { part: "opening delimiter" });
        }
        if self.delims.1.is_empty() {
            return Err(TagError::Empty { part: "closing delimiter" });
        }
        if self.tag.is_empty() {
            return Err(TagError::Empty { part: "name" });
        }
        Ok(())
    }
}

/// Build the literal body tag, e.g. `{% body %}`
pub fn make_tag(opts: &TagOptions) -> String {
    let (open, close) = &opts.delims;
    format!("{open}{sep}{tag}{sep}{close}", sep = opts.sep, tag = opts.tag)
}

/// Build a regex matching the body tag with flexible inner whitespace
///
/// Delimiters and the tag name are escaped. A whitespace separator becomes
/// `\s*`; any other separator is kept literally and padded with `\s*`.
pub fn make_regex(opts: &TagOptions) -> Result<Regex, TagError> {
    opts.validate()?;

    let sep = if opts.sep.trim().is_empty() {
        r"\s*".to_string()
    } else {
        format!(r"\s*{}\s*", regex::escape(opts.sep.trim()))
    };
    let pattern = format!(
        "{}{sep}{}{sep}{}",
        regex::escape(&opts.delims.0),
        regex::escape(&opts.tag),
        regex::escape(&opts.delims.1),
    );

    Regex::new(&pattern).map_err(|source| TagError::InvalidPattern { pattern, source })
}

/// A compiled body tag: the literal form plus its matcher
#[derive(Debug, Clone)]
pub struct BodyTag {
    literal: String,
    regex: Regex,
}

impl BodyTag {
    /// Compile a body tag from options
    pub fn new(opts: &TagOptions) -> Result<Self, TagError> {
        Ok(Self {
            regex: make_regex(opts)?,
            literal: make_tag(opts),
        })
    }

    /// The literal tag, used to seed a fold
    pub fn literal(&self) -> &str {
        &self.literal
    }

    /// The compiled matcher
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Check whether `text` contains the tag
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Replace every occurrence of the tag in `target` with `content`
    ///
    /// Single pass: tags inside `content` are not replaced again, and `$`
    /// in `content` is taken literally.
    pub fn replace(&self, target: &str, content: &str) -> String {
        match self.regex.replace_all(target, NoExpand(content)) {
            Cow::Borrowed(unchanged) => unchanged.to_string(),
            Cow::Owned(replaced) => replaced,
        }
    }
}

impl Default for BodyTag {
    fn default() -> Self {
        Self::new(&TagOptions::default()).expect("default body tag should compile")
    }
}

/// Replace the body tag in `target` with `content`
pub fn replace_tag(content: &str, target: &str, opts: &TagOptions) -> Result<String, TagError> {
    Ok(BodyTag::new(opts)?.replace(target, content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_tag_default() {
        assert_eq!(make_tag(&TagOptions::default()), "{% body %}");
    }

    #[test]
    fn test_make_tag_custom() {
        let opts = TagOptions::new()
            .with_delims("<<", ">>")
            .with_tag("content")
            .with_separator("");
        assert_eq!(make_tag(&opts), "<<content>>");
    }

    #[test]
    fn test_regex_accepts_spacing_variants() {
        let re = make_regex(&TagOptions::default()).unwrap();
        assert!(re.is_match("{% body %}"));
        assert!(re.is_match("{%body%}"));
        assert!(re.is_match("{%   body\t%}"));
        assert!(!re.is_match("{% bodies %}"));
        assert!(!re.is_match("{{ body }}"));
    }

    #[test]
    fn test_regex_escapes_metacharacters() {
        let opts = TagOptions::new().with_delims("[(", ")]").with_tag("a.b");
        let re = make_regex(&opts).unwrap();
        assert!(re.is_match("[( a.b )]"));
        assert!(!re.is_match("[( axb )]"));
    }

    #[test]
    fn test_regex_is_deterministic() {
        let opts = TagOptions::new().with_delims("{{", "}}");
        let first = make_regex(&opts).unwrap();
        let second = make_regex(&opts).unwrap();
        assert_eq!(first.as_str(), second.as_str());
    }

    #[test]
    fn test_non_whitespace_separator() {
        let opts = TagOptions::new().with_separator("-");
        assert_eq!(make_tag(&opts), "{%-body-%}");
        let tag = BodyTag::new(&opts).unwrap();
        assert!(tag.is_match("{%-body-%}"));
        assert!(tag.is_match("{% - body - %}"));
    }

    #[test]
    fn test_empty_parts_rejected() {
        let result = make_regex(&TagOptions::new().with_tag(""));
        assert!(matches!(result, Err(TagError::Empty { part: "name" })));
        let result = make_regex(&TagOptions::new().with_delims("", "%}"));
        assert!(matches!(result, Err(TagError::Empty { .. })));
    }

    #[test]
    fn test_replace_tag() {
        let out = replace_tag("ABC", "Before {% body %} After", &TagOptions::default()).unwrap();
        assert_eq!(out, "Before ABC After");
    }

    #[test]
    fn test_replace_is_global_and_literal() {
        let tag = BodyTag::default();
        let out = tag.replace("{% body %}|{%body%}", "$1 {% body %}");
        assert_eq!(out, "$1 {% body %}|$1 {% body %}");
    }

    #[test]
    fn test_replace_without_tag_is_unchanged() {
        let tag = BodyTag::default();
        assert_eq!(tag.replace("no placeholder here", "x"), "no placeholder here");
    }
}
