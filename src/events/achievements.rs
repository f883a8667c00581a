//! The achievement event pack.
//!
//! Registered through [`Extensions`](crate::registry::Extensions) when
//! `extensions.achievements` is set. The message is a single space so that
//! Slack renders only the attachment.

use crate::core::{Attachment, TriggerArgs};
use crate::events::host::{Achievement, User};
use crate::formatting::escape_slack;
use crate::registry::{EventDefinition, EventMap, Formatter};

/// Fired as `(user, achievement, trigger)` when an award is granted.
pub const AWARD_ACHIEVEMENT: &str = "badgeos_award_achievement";

pub const EXTENSION_NAME: &str = "achievements";

/// Adds the `award_achievement` event.
pub fn register(mut events: EventMap) -> EventMap {
    events.insert("award_achievement".to_string(), award_achievement());
    events
}

fn award_achievement() -> EventDefinition {
    let message = Formatter::dynamic(|args: &TriggerArgs| {
        let achievement = achievement(args)?;
        // Steps are intermediate progress, not awards.
        if achievement.post_type == "step" {
            return Ok(None);
        }
        Ok(Some(" ".to_string()))
    });

    let attachments = Formatter::dynamic(|args: &TriggerArgs| {
        let user: User = args.decode::<Option<User>>(0)?.unwrap_or_default();
        let achievement = achievement(args)?;

        let text = format!(
            "_{}_ earned the {} <{}|{}>",
            user.display_name,
            award_type(&achievement.post_type),
            escape_slack(&achievement.permalink),
            escape_slack(&achievement.title)
        );

        Ok(Some(vec![Attachment {
            fallback: "Badge award".to_string(),
            color: "#36a64f".to_string(),
            title: "New achievement awarded !".to_string(),
            text,
            mrkdwn_in: vec!["text".to_string()],
            thumb_url: achievement.thumbnail_url,
            ..Attachment::default()
        }]))
    });

    EventDefinition::new(AWARD_ACHIEVEMENT, "When user earns an achievement")
        .with_arity(3)
        .enabled_by_default(true)
        .with_message(message)
        .with_attachments(attachments)
        .with_icon(Formatter::Static(String::new()))
}

/// Missing arguments fall back to an empty achievement.
fn achievement(args: &TriggerArgs) -> anyhow::Result<Achievement> {
    Ok(args.decode::<Option<Achievement>>(1)?.unwrap_or_default())
}

fn award_type(post_type: &str) -> &str {
    match post_type {
        "nomination" | "submission" | "badges" => "badge",
        other => other,
    }
}
