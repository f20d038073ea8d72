//! Content entity model.

use benefich_core::types::{ContentId, PlaceId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

use super::kind::ContentKind;
use super::publication::PublicationState;

/// An event venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Place identifier.
    pub id: PlaceId,
    /// Venue name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

/// Kind-specific fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ContentDetails {
    /// Event schedule and venue.
    Event {
        /// Start of the event.
        start: DateTime<Utc>,
        /// End of the event, if known.
        end: Option<DateTime<Utc>>,
        /// Venue, if any.
        place: Option<Place>,
    },
    /// News carry no extra fields.
    New,
    /// Benefit validity window.
    Benefit {
        /// First valid day.
        start: Option<NaiveDate>,
        /// Last valid day.
        end: Option<NaiveDate>,
    },
}

impl ContentDetails {
    /// The kind tag of these details.
    pub fn kind(&self) -> ContentKind {
        match self {
            Self::Event { .. } => ContentKind::Event,
            Self::New => ContentKind::New,
            Self::Benefit { .. } => ContentKind::Benefit,
        }
    }
}

/// A published content item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Content identifier.
    pub id: ContentId,
    /// Headline.
    pub title: String,
    /// Stored HTML body.
    pub body: String,
    /// Author, if still registered.
    pub author_id: Option<UserId>,
    /// Path of the main image, relative to the media root.
    pub image_path: Option<String>,
    /// When the item becomes visible.
    pub publish_at: DateTime<Utc>,
    /// When the item stops being visible.
    pub unpublish_at: Option<DateTime<Utc>>,
    /// Pinned items are listed first.
    pub pinned: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub modified_at: DateTime<Utc>,
    /// Kind-specific fields.
    #[serde(flatten)]
    pub details: ContentDetails,
}

impl Content {
    /// The kind of this item.
    pub fn kind(&self) -> ContentKind {
        self.details.kind()
    }

    /// The venue of an event.
    pub fn place(&self) -> Option<&Place> {
        match &self.details {
            ContentDetails::Event { place, .. } => place.as_ref(),
            _ => None,
        }
    }

    /// Whether the item was unpublished at `now`.
    pub fn was_unpublished(&self, now: DateTime<Utc>) -> bool {
        self.unpublish_at.is_some_and(|at| at <= now)
    }

    /// Whether the item is visible at `now`.
    pub fn is_published(&self, now: DateTime<Utc>) -> bool {
        self.publish_at <= now && !self.was_unpublished(now)
    }

    /// Publication state at `now`.
    pub fn publication_state(&self, now: DateTime<Utc>) -> PublicationState {
        if self.was_unpublished(now) {
            PublicationState::Finished
        } else if self.is_published(now) {
            PublicationState::Published
        } else {
            PublicationState::Scheduled {
                days_left: (self.publish_at - now).num_days(),
            }
        }
    }
}

impl<'r> FromRow<'r, PgRow> for Content {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let kind: ContentKind = row.try_get("kind")?;
        let details = match kind {
            ContentKind::Event => {
                let start: Option<DateTime<Utc>> = row.try_get("event_start")?;
                let start = start.ok_or_else(|| {
                    sqlx::Error::Decode("event row without event_start".into())
                })?;
                let place_id: Option<PlaceId> = row.try_get("place_id")?;
                let place = match place_id {
                    Some(id) => Some(Place {
                        id,
                        name: row.try_get("place_name")?,
                        address: row.try_get("place_address")?,
                        lat: row.try_get("place_lat")?,
                        lng: row.try_get("place_lng")?,
                    }),
                    None => None,
                };
                ContentDetails::Event {
                    start,
                    end: row.try_get("event_end")?,
                    place,
                }
            }
            ContentKind::New => ContentDetails::New,
            ContentKind::Benefit => ContentDetails::Benefit {
                start: row.try_get("benefit_start")?,
                end: row.try_get("benefit_end")?,
            },
        };

        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            body: row.try_get("body")?,
            author_id: row.try_get("author_id")?,
            image_path: row.try_get("image_path")?,
            publish_at: row.try_get("publish_at")?,
            unpublish_at: row.try_get("unpublish_at")?,
            pinned: row.try_get("pinned")?,
            created_at: row.try_get("created_at")?,
            modified_at: row.try_get("modified_at")?,
            details,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn news(publish_at: DateTime<Utc>, unpublish_at: Option<DateTime<Utc>>) -> Content {
        let created = Utc.with_ymd_and_hms(2019, 10, 1, 12, 0, 0).unwrap();
        Content {
            id: ContentId(1),
            title: "Paro de profesores".to_string(),
            body: "<p>Detalles</p>".to_string(),
            author_id: None,
            image_path: None,
            publish_at,
            unpublish_at,
            pinned: false,
            created_at: created,
            modified_at: created,
            details: ContentDetails::New,
        }
    }

    #[test]
    fn test_publication_state_transitions() {
        let now = Utc.with_ymd_and_hms(2019, 10, 10, 18, 0, 0).unwrap();

        let future = news(now + Duration::days(3) + Duration::hours(2), None);
        assert_eq!(
            future.publication_state(now),
            PublicationState::Scheduled { days_left: 3 }
        );

        let live = news(now - Duration::days(1), Some(now + Duration::days(1)));
        assert!(live.is_published(now));
        assert_eq!(live.publication_state(now), PublicationState::Published);

        let over = news(now - Duration::days(5), Some(now - Duration::hours(1)));
        assert!(!over.is_published(now));
        assert_eq!(over.publication_state(now), PublicationState::Finished);
    }

    #[test]
    fn test_place_only_for_events() {
        let now = Utc::now();
        let mut item = news(now, None);
        assert!(item.place().is_none());

        item.details = ContentDetails::Event {
            start: now,
            end: None,
            place: Some(Place {
                id: PlaceId(42),
                name: "Casa Central".to_string(),
                address: "Av. Libertador Bernardo O'Higgins 1058".to_string(),
                lat: -33.4446,
                lng: -70.6504,
            }),
        };
        assert_eq!(item.kind(), ContentKind::Event);
        assert_eq!(item.place().map(|p| p.id), Some(PlaceId(42)));
    }
}
