//! Layout references and the falsey/default rule

use serde_json::Value;

use crate::merge::Data;

/// Words that explicitly disable a layout when used as a reference
pub const DEFAULT_FALSEY: &[&str] = &["", "false", "null", "nil", "no", "none", "undefined", "0"];

/// Where a template points for its next layout
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LayoutRef {
    /// No explicit choice: use the default layout, if one is configured
    #[default]
    Inherit,
    /// Explicitly no layout
    Disabled,
    /// A specific layout by name
    Named(String),
}

impl LayoutRef {
    /// Classify a raw reference value
    ///
    /// Returns `None` for arrays and objects, which can't name a layout.
    pub fn from_value(value: &Value, falsey: &Falsey) -> Option<Self> {
        let reference = match value {
            Value::Null | Value::Bool(true) => Self::Inherit,
            Value::Bool(false) => Self::Disabled,
            Value::Number(n) if n.as_f64() == Some(0.0) => Self::Disabled,
            Value::Number(n) => Self::Named(n.to_string()),
            Value::String(s) => Self::from_name(s, falsey),
            Value::Array(_) | Value::Object(_) => return None,
        };
        Some(reference)
    }

    /// Classify a layout name given as a string
    pub fn from_name(name: &str, falsey: &Falsey) -> Self {
        if falsey.is_falsey(name) {
            Self::Disabled
        } else {
            Self::Named(name.to_string())
        }
    }

    /// Apply the default rule: the layout name this reference selects
    pub fn resolve<'a>(&'a self, default_layout: Option<&'a str>) -> Option<&'a str> {
        match self {
            Self::Inherit => default_layout,
            Self::Disabled => None,
            Self::Named(name) => Some(name),
        }
    }

    /// Whether this reference is an explicit choice rather than [`LayoutRef::Inherit`]
    pub fn is_explicit(&self) -> bool {
        !matches!(self, Self::Inherit)
    }
}

/// The set of values treated as "explicitly no layout"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Falsey {
    words: Vec<String>,
}

impl Default for Falsey {
    fn default() -> Self {
        Self::new(DEFAULT_FALSEY.iter().copied())
    }
}

impl Falsey {
    /// Create a falsey set from words (compared case-insensitively)
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .collect(),
        }
    }

    /// Check whether `value` disables a layout
    pub fn is_falsey(&self, value: &str) -> bool {
        let value = value.trim().to_lowercase();
        self.words.iter().any(|w| *w == value)
    }

    /// The configured words
    pub fn words(&self) -> &[String] {
        &self.words
    }
}

/// Pick the value that decides a template's layout
///
/// Precedence: explicit `layout` > `options.layout` > `locals.layout` >
/// `data.layout`. A source counts when present and not `null`. Returns the
/// field label along with the value for error reporting.
pub fn locate_reference<'a>(
    explicit: Option<&'a Value>,
    options: &'a Data,
    locals: &'a Data,
    data: &'a Data,
) -> Option<(&'static str, &'a Value)> {
    let candidates = [
        ("layout", explicit),
        ("options.layout", options.get("layout")),
        ("locals.layout", locals.get("layout")),
        ("data.layout", data.get("layout")),
    ];
    candidates
        .into_iter()
        .find_map(|(field, value)| value.filter(|v| !v.is_null()).map(|v| (field, v)))
}

/// Resolve a raw reference to a layout name using the default falsey set
///
/// `true`, `null` and missing references fall back to `default_layout`;
/// falsey values give `None`. Arrays and objects are treated as disabled
/// here; `Layouts::assert_layout` uses the configured falsey words and
/// reports them as an error instead.
pub fn assert_layout(value: &Value, default_layout: Option<&str>) -> Option<String> {
    LayoutRef::from_value(value, &Falsey::default())
        .unwrap_or(LayoutRef::Disabled)
        .resolve(default_layout)
        .map(str::to_string)
}
