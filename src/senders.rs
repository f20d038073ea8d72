//! Channel senders for the enabled channels.

use std::sync::Arc;

use benefich_channel::email::{EmailSender, SmtpMailTransport};
use benefich_channel::push::{FcmClient, PushSender};
use benefich_channel::social::{InstagramClient, MediaNormalizer, SocialSender, TwitterClient};
use benefich_core::config::AppConfig;
use benefich_core::error::{AppError, ErrorKind};
use benefich_entity::SocialChannel;
use benefich_worker::Senders;

/// Build a sender for every channel switched on in `config`.
pub fn build(config: &AppConfig) -> Result<Senders, AppError> {
    let timeout = config.dispatch.attempt_timeout();
    let mut senders = Senders::default();

    if config.email.enabled {
        let transport = SmtpMailTransport::new(&config.email).map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Cannot build SMTP transport", e)
        })?;
        senders.email = Some(Arc::new(EmailSender::new(
            &config.email,
            Arc::new(transport),
            timeout,
        )?));
    }

    if config.push.enabled {
        let client = FcmClient::new(&config.push)?;
        senders.push = Some(Arc::new(PushSender::new(
            &config.push,
            Arc::new(client),
            timeout,
        )?));
    }

    if config.social.twitter.enabled {
        senders.twitter = Some(Arc::new(SocialSender::new(
            SocialChannel::Twitter,
            Arc::new(TwitterClient::new(&config.social.twitter)),
            MediaNormalizer::new(&config.social),
            timeout,
        )));
    }

    if config.social.instagram.enabled {
        senders.instagram = Some(Arc::new(SocialSender::new(
            SocialChannel::Instagram,
            Arc::new(InstagramClient::new(&config.social.instagram)),
            MediaNormalizer::new(&config.social),
            timeout,
        )));
    }

    tracing::info!(
        email = senders.email.is_some(),
        push = senders.push.is_some(),
        twitter = senders.twitter.is_some(),
        instagram = senders.instagram.is_some(),
        "Channel senders ready"
    );
    Ok(senders)
}
