//! Fixtures shared by the sender tests.

use benefich_core::types::{ContentId, NotificationId, PlaceId, SharingId};
use benefich_entity::{
    Content, ContentDetails, ContentKind, Notification, NotificationChannel, Place, Sharing,
    SocialChannel,
};
use chrono::{TimeZone, Utc};

use crate::sender::DueItem;

pub(crate) fn event(id: i64, title: &str, place_id: i64) -> Content {
    let at = Utc.with_ymd_and_hms(2019, 10, 3, 19, 8, 0).unwrap();
    Content {
        id: ContentId(id),
        title: title.to_string(),
        body: "<p>Inscripciones abiertas</p>".to_string(),
        author_id: None,
        image_path: Some("images/feria.png".to_string()),
        publish_at: at,
        unpublish_at: None,
        pinned: false,
        created_at: at,
        modified_at: at,
        details: ContentDetails::Event {
            start: at,
            end: None,
            place: Some(Place {
                id: PlaceId(place_id),
                name: "Patio Central".to_string(),
                address: "Beauchef 850".to_string(),
                lat: -33.457,
                lng: -70.663,
            }),
        },
    }
}

pub(crate) fn notification(
    id: i64,
    content: &Content,
    channel: NotificationChannel,
) -> DueItem<Notification> {
    let record = Notification::new(
        NotificationId(id),
        content.kind(),
        content.id,
        content.publish_at,
        channel,
    );
    DueItem::new(record, content.clone())
}

pub(crate) fn sharing(
    id: i64,
    content: &Content,
    channel: SocialChannel,
    description: Option<&str>,
) -> DueItem<Sharing> {
    let record = Sharing::new(
        SharingId(id),
        ContentKind::Event,
        content.id,
        content.publish_at,
        channel,
        description.map(str::to_string),
    );
    DueItem::new(record, content.clone())
}
