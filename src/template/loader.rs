//! Normalization of registration input into typed templates
//!
//! Templates can be registered in three shapes:
//!
//! - `(name, layout, content)`: a layout reference and a content string
//! - `(name, record)`: a record object such as
//!   `{"content": "...", "layout": "base", "data": {...}}`, or a bare string
//!   used as content
//! - a single object mapping many names to records
//!
//! Every shape ends up as a list of `(name, Template)` entries with the
//! layout reference already decided.

use serde_json::Value;
use thiserror::Error;

use super::reference::{locate_reference, Falsey, LayoutRef};
use super::Template;
use crate::merge::Data;

/// Errors that can occur while normalizing registration input
#[derive(Debug, Error)]
pub enum LoadError {
    /// Input of many templates that is not an object
    #[error("expected an object of templates, found {found}")]
    InvalidShape { found: &'static str },

    /// A record that is neither a string nor an object
    #[error("template '{name}' must be a string or an object, found {found}")]
    InvalidTemplate { name: String, found: &'static str },

    /// A known field with the wrong type
    #[error("template '{name}': field '{field}' must be {expected}")]
    InvalidField {
        name: String,
        field: &'static str,
        expected: &'static str,
    },

    /// A layout reference that can't name a layout
    #[error("template '{name}': {field} must be a string, boolean, number or null, found {found}")]
    InvalidLayout {
        name: String,
        field: &'static str,
        found: &'static str,
    },

    /// Template registered without a name
    #[error("template name must not be empty")]
    EmptyName,
}

/// Registration input accepted by the store
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateInput {
    /// `(name, layout, content)`
    Layout {
        name: String,
        layout: Value,
        content: String,
    },
    /// `(name, record)`
    Record { name: String, record: Value },
    /// An object of `name -> record`
    Many(Value),
}

/// Normalize registration input into `(name, Template)` entries
pub fn normalize(input: TemplateInput, falsey: &Falsey) -> Result<Vec<(String, Template)>, LoadError> {
    match input {
        TemplateInput::Layout {
            name,
            layout,
            content,
        } => {
            let record = Value::Object(Data::from_iter([
                ("content".to_string(), Value::String(content)),
                ("layout".to_string(), layout),
            ]));
            Ok(vec![load_record(name, &record, falsey)?])
        }
        TemplateInput::Record { name, record } => Ok(vec![load_record(name, &record, falsey)?]),
        TemplateInput::Many(Value::Object(map)) => map
            .into_iter()
            .map(|(name, record)| load_record(name, &record, falsey))
            .collect(),
        TemplateInput::Many(other) => Err(LoadError::InvalidShape {
            found: kind(&other),
        }),
    }
}

/// Load a single record into a template
fn load_record(name: String, record: &Value, falsey: &Falsey) -> Result<(String, Template), LoadError> {
    if name.is_empty() {
        return Err(LoadError::EmptyName);
    }

    let fields = match record {
        Value::String(content) => return Ok((name, Template::new(content.clone()))),
        Value::Object(fields) => fields,
        other => {
            return Err(LoadError::InvalidTemplate {
                name,
                found: kind(other),
            })
        }
    };

    let content = match fields.get("content") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(invalid_field(&name, "content", "a string")),
    };
    let data = object_field(&name, fields, "data")?;
    let locals = object_field(&name, fields, "locals")?;
    let options = object_field(&name, fields, "options")?;

    let layout = effective_layout(&name, fields.get("layout"), &options, &locals, &data, falsey)?;

    let extra = fields
        .iter()
        .filter(|(key, _)| !matches!(key.as_str(), "content" | "layout" | "data" | "locals" | "options"))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    let template = Template {
        content,
        layout,
        data,
        locals,
        options,
        extra,
    };
    Ok((name, template))
}

/// Classify the reference that decides a template's layout, following the
/// `layout` > `options` > `locals` > `data` precedence
pub(crate) fn effective_layout(
    name: &str,
    explicit: Option<&Value>,
    options: &Data,
    locals: &Data,
    data: &Data,
    falsey: &Falsey,
) -> Result<LayoutRef, LoadError> {
    match locate_reference(explicit, options, locals, data) {
        None => Ok(LayoutRef::Inherit),
        Some((field, value)) => {
            LayoutRef::from_value(value, falsey).ok_or_else(|| LoadError::InvalidLayout {
                name: name.to_string(),
                field,
                found: kind(value),
            })
        }
    }
}

fn object_field(name: &str, fields: &Data, field: &'static str) -> Result<Data, LoadError> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(Data::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(_) => Err(invalid_field(name, field, "an object")),
    }
}

fn invalid_field(name: &str, field: &'static str, expected: &'static str) -> LoadError {
    LoadError::InvalidField {
        name: name.to_string(),
        field,
        expected,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
