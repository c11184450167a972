use serde_json::Value;

use crate::error::{Error, Result};
use crate::schema::Schema;

/// Display sentinel for records whose title value is missing or empty.
/// Downstream formatting can always assume a non-empty title.
pub const UNTITLED: &str = "Untitled";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Page,
    Database,
}

impl ObjectKind {
    pub fn parse(value: &str) -> Result<Self> {
        if value.eq_ignore_ascii_case("page") {
            return Ok(Self::Page);
        }
        if value.eq_ignore_ascii_case("database") {
            return Ok(Self::Database);
        }
        Err(Error::Validation(format!(
            "unsupported object type: {value} (expected page|database)"
        )))
    }

    /// Value for the search endpoint's object filter. The API filters
    /// databases under the `data_source` tag.
    pub fn api_filter_value(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Database => "data_source",
        }
    }

    pub fn from_object_tag(tag: &str) -> Option<Self> {
        match tag {
            "page" => Some(Self::Page),
            "database" | "data_source" => Some(Self::Database),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Database => "database",
        }
    }
}

/// Closed set of shapes a property value reduces to. Unrecognized
/// property types become `Opaque` rather than failing, so new remote
/// types degrade to a visible marker.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Label(String),
    Labels(Vec<String>),
    Number(f64),
    Timestamp(String),
    Checkbox(bool),
    Relation(Vec<String>),
    Empty,
    Opaque(String),
}

impl FieldValue {
    pub fn display(&self) -> String {
        match self {
            Self::Text(value) | Self::Label(value) | Self::Timestamp(value) => value.clone(),
            Self::Labels(values) => values.join(", "),
            Self::Number(value) => value.to_string(),
            Self::Checkbox(true) => "yes".to_string(),
            Self::Checkbox(false) => "no".to_string(),
            Self::Relation(ids) => ids.join(", "),
            Self::Empty => String::new(),
            Self::Opaque(kind) => format!("[{kind}]"),
        }
    }
}

/// One normalized row: field values keyed by name, in schema order.
#[derive(Debug, Clone)]
pub struct Record {
    pub id: String,
    pub title: String,
    pub last_edited: Option<String>,
    pub values: Vec<(String, FieldValue)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub id: String,
    pub kind: ObjectKind,
    pub title: String,
    pub last_edited: Option<String>,
}

/// Concatenate the plain text of a rich-text array.
pub fn flatten_rich_text(value: &Value) -> String {
    value
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("plain_text").and_then(Value::as_str))
                .collect::<String>()
        })
        .unwrap_or_default()
}

/// Reduce one raw property payload to a FieldValue.
pub fn extract_field(property: &Value) -> FieldValue {
    let kind = property.get("type").and_then(Value::as_str).unwrap_or("");
    match kind {
        "title" | "rich_text" => {
            let text = flatten_rich_text(&property[kind]);
            if text.is_empty() {
                FieldValue::Empty
            } else {
                FieldValue::Text(text)
            }
        }
        "number" => property
            .get("number")
            .and_then(Value::as_f64)
            .map(FieldValue::Number)
            .unwrap_or(FieldValue::Empty),
        "select" | "status" => property
            .get(kind)
            .and_then(|value| value.get("name"))
            .and_then(Value::as_str)
            .map(|name| FieldValue::Label(name.to_string()))
            .unwrap_or(FieldValue::Empty),
        "multi_select" => {
            let labels = property
                .get("multi_select")
                .and_then(Value::as_array)
                .map(|options| {
                    options
                        .iter()
                        .filter_map(|option| option.get("name").and_then(Value::as_str))
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();
            if labels.is_empty() {
                FieldValue::Empty
            } else {
                FieldValue::Labels(labels)
            }
        }
        "date" => property
            .get("date")
            .and_then(|value| value.get("start"))
            .and_then(Value::as_str)
            .map(|start| FieldValue::Timestamp(start.to_string()))
            .unwrap_or(FieldValue::Empty),
        "checkbox" => property
            .get("checkbox")
            .and_then(Value::as_bool)
            .map(FieldValue::Checkbox)
            .unwrap_or(FieldValue::Empty),
        "url" | "email" | "phone_number" => property
            .get(kind)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
            .map(|value| FieldValue::Text(value.to_string()))
            .unwrap_or(FieldValue::Empty),
        "relation" => {
            let ids = property
                .get("relation")
                .and_then(Value::as_array)
                .map(|related| {
                    related
                        .iter()
                        .filter_map(|entry| entry.get("id").and_then(Value::as_str))
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();
            if ids.is_empty() {
                FieldValue::Empty
            } else {
                FieldValue::Relation(ids)
            }
        }
        "" => FieldValue::Empty,
        other => FieldValue::Opaque(other.to_string()),
    }
}

/// Normalize one raw row against its database schema. Pure; the title
/// always comes from the schema's detected title field.
pub fn normalize_record(raw: &Value, schema: &Schema) -> Record {
    let id = raw
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let last_edited = raw
        .get("last_edited_time")
        .and_then(Value::as_str)
        .map(ToString::to_string);
    let properties = raw.get("properties");

    let mut values = Vec::with_capacity(schema.fields.len());
    for field in &schema.fields {
        let value = properties
            .and_then(|props| props.get(&field.name))
            .map(extract_field)
            .unwrap_or(FieldValue::Empty);
        values.push((field.name.clone(), value));
    }

    let title = values
        .iter()
        .find(|(name, _)| *name == schema.title_field)
        .and_then(|(_, value)| match value {
            FieldValue::Text(text) if !text.is_empty() => Some(text.clone()),
            _ => None,
        })
        .unwrap_or_else(|| UNTITLED.to_string());

    Record {
        id,
        title,
        last_edited,
        values,
    }
}

/// Normalize one search hit. Returns None for object tags outside the
/// page/database pair (the search surface only promises those two).
pub fn normalize_search_result(raw: &Value) -> Option<SearchResult> {
    let tag = raw.get("object").and_then(Value::as_str)?;
    let kind = ObjectKind::from_object_tag(tag)?;
    let id = raw.get("id").and_then(Value::as_str)?.to_string();
    let last_edited = raw
        .get("last_edited_time")
        .and_then(Value::as_str)
        .map(ToString::to_string);

    let title = match kind {
        ObjectKind::Database => {
            let from_title = flatten_rich_text(&raw["title"]);
            if !from_title.is_empty() {
                from_title
            } else {
                raw.get("name")
                    .and_then(Value::as_str)
                    .filter(|name| !name.is_empty())
                    .unwrap_or(UNTITLED)
                    .to_string()
            }
        }
        ObjectKind::Page => page_title(raw),
    };

    Some(SearchResult {
        id,
        kind,
        title,
        last_edited,
    })
}

/// Title of a page payload, found by scanning its own properties for
/// the title-typed one. Pages carry property types inline, so no
/// database schema fetch is needed.
pub fn page_title(raw: &Value) -> String {
    let title = raw
        .get("properties")
        .and_then(Value::as_object)
        .and_then(|properties| {
            properties.values().find(|property| {
                property.get("type").and_then(Value::as_str) == Some("title")
            })
        })
        .map(|property| flatten_rich_text(&property["title"]))
        .unwrap_or_default();
    if title.is_empty() {
        UNTITLED.to_string()
    } else {
        title
    }
}

/// Flatten one content block to a display line. Unknown block types
/// render as a bracketed marker, mirroring opaque field handling.
pub fn flatten_block(block: &Value) -> Option<String> {
    let kind = block.get("type").and_then(Value::as_str)?;
    let text = |slot: &str| flatten_rich_text(&block[slot]["rich_text"]);
    let line = match kind {
        "paragraph" => text("paragraph"),
        "heading_1" => format!("# {}", text("heading_1")),
        "heading_2" => format!("## {}", text("heading_2")),
        "heading_3" => format!("### {}", text("heading_3")),
        "bulleted_list_item" => format!("* {}", text("bulleted_list_item")),
        "numbered_list_item" => format!("1. {}", text("numbered_list_item")),
        "to_do" => {
            let checked = block["to_do"]
                .get("checked")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            let marker = if checked { "[x]" } else { "[ ]" };
            format!("{marker} {}", text("to_do"))
        }
        "code" => {
            let language = block["code"]
                .get("language")
                .and_then(Value::as_str)
                .unwrap_or("");
            format!("```{language}\n{}\n```", text("code"))
        }
        "divider" => "---".to_string(),
        other => format!("[{other}]"),
    };
    Some(line)
}
