use serde_json::Value;

use crate::client::WorkspaceApi;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub kind: String,
}

/// Field definitions for one database, with the detected title field.
/// Resolved per command invocation and never cached across invocations.
#[derive(Debug, Clone)]
pub struct Schema {
    pub database_id: String,
    pub title_field: String,
    pub fields: Vec<FieldDef>,
}

impl Schema {
    pub fn field_kind(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.kind.as_str())
    }

    /// First field carrying the given type tag, e.g. `"status"`.
    pub fn field_of_kind(&self, kind: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.kind == kind)
            .map(|field| field.name.as_str())
    }
}

pub fn resolve(api: &mut dyn WorkspaceApi, database_id: &str) -> Result<Schema> {
    let payload = api.retrieve_database(database_id)?;
    schema_from_payload(database_id, &payload)
}

/// Build a Schema from a database (or page) payload's `properties`
/// object. The title field is the unique property whose type tag is
/// `"title"`; zero or several such properties is an error, never a
/// guess at a conventional name.
pub fn schema_from_payload(identifier: &str, payload: &Value) -> Result<Schema> {
    let properties = payload
        .get("properties")
        .and_then(Value::as_object)
        .ok_or_else(|| Error::Schema {
            identifier: identifier.to_string(),
            message: "response carries no properties object".to_string(),
        })?;

    let mut fields = Vec::with_capacity(properties.len());
    let mut title_fields = Vec::new();
    for (name, property) in properties {
        let kind = property
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        if kind == "title" {
            title_fields.push(name.clone());
        }
        fields.push(FieldDef {
            name: name.clone(),
            kind,
        });
    }

    let title_field = match title_fields.len() {
        1 => title_fields.remove(0),
        0 => {
            return Err(Error::Schema {
                identifier: identifier.to_string(),
                message: "no title-typed field found".to_string(),
            });
        }
        count => {
            return Err(Error::Schema {
                identifier: identifier.to_string(),
                message: format!("{count} title-typed fields found, expected exactly one"),
            });
        }
    };

    Ok(Schema {
        database_id: identifier.to_string(),
        title_field,
        fields,
    })
}
