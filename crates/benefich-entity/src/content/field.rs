//! Compile-time mapping from template placeholders to content fields.

use serde_json::{Map, Value};

use super::model::{Content, ContentDetails};

/// A content field exposed to message templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentField {
    /// `{{id}}`
    Id,
    /// `{{kind}}`
    Kind,
    /// `{{title}}`
    Title,
    /// `{{body}}`, stored HTML.
    Body,
    /// `{{image_path}}`
    ImagePath,
    /// `{{publish_at}}`, RFC 3339.
    PublishAt,
    /// `{{start}}`: event start or benefit first day.
    Start,
    /// `{{end}}`: event end or benefit last day.
    End,
    /// `{{place_id}}`
    PlaceId,
    /// `{{place_name}}`
    PlaceName,
    /// `{{place_address}}`
    PlaceAddress,
}

impl ContentField {
    /// Every field, in template-context order.
    pub const ALL: [Self; 11] = [
        Self::Id,
        Self::Kind,
        Self::Title,
        Self::Body,
        Self::ImagePath,
        Self::PublishAt,
        Self::Start,
        Self::End,
        Self::PlaceId,
        Self::PlaceName,
        Self::PlaceAddress,
    ];

    /// Placeholder name used in templates.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Kind => "kind",
            Self::Title => "title",
            Self::Body => "body",
            Self::ImagePath => "image_path",
            Self::PublishAt => "publish_at",
            Self::Start => "start",
            Self::End => "end",
            Self::PlaceId => "place_id",
            Self::PlaceName => "place_name",
            Self::PlaceAddress => "place_address",
        }
    }

    /// Read the field from `content`. Missing values are `Null`.
    pub fn value(&self, content: &Content) -> Value {
        match self {
            Self::Id => Value::from(content.id.get()),
            Self::Kind => Value::from(content.kind().as_str()),
            Self::Title => Value::from(content.title.as_str()),
            Self::Body => Value::from(content.body.as_str()),
            Self::ImagePath => content
                .image_path
                .as_deref()
                .map(Value::from)
                .unwrap_or(Value::Null),
            Self::PublishAt => Value::from(content.publish_at.to_rfc3339()),
            Self::Start => match &content.details {
                ContentDetails::Event { start, .. } => Value::from(start.to_rfc3339()),
                ContentDetails::Benefit { start: Some(day), .. } => Value::from(day.to_string()),
                _ => Value::Null,
            },
            Self::End => match &content.details {
                ContentDetails::Event { end: Some(end), .. } => Value::from(end.to_rfc3339()),
                ContentDetails::Benefit { end: Some(day), .. } => Value::from(day.to_string()),
                _ => Value::Null,
            },
            Self::PlaceId => content
                .place()
                .map(|p| Value::from(p.id.get()))
                .unwrap_or(Value::Null),
            Self::PlaceName => content
                .place()
                .map(|p| Value::from(p.name.as_str()))
                .unwrap_or(Value::Null),
            Self::PlaceAddress => content
                .place()
                .map(|p| Value::from(p.address.as_str()))
                .unwrap_or(Value::Null),
        }
    }

    /// Build the template context of `content`.
    pub fn context(content: &Content) -> Map<String, Value> {
        Self::ALL
            .iter()
            .map(|field| (field.name().to_string(), field.value(content)))
            .collect()
    }
}
