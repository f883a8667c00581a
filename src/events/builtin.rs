//! The events every registry is seeded with.

use crate::config::EventsConfig;
use crate::core::TriggerArgs;
use crate::events::host::{Comment, Post};
use crate::formatting::{admin_link, excerpt_from_content, quote_lines};
use crate::registry::{EventDefinition, EventMap, Formatter};

/// Fired as `(new_status, old_status, post)` whenever a post changes status.
pub const TRANSITION_POST_STATUS: &str = "transition_post_status";

/// Fired as `(comment_id, comment)` after a comment is stored.
pub const INSERT_COMMENT: &str = "wp_insert_comment";

/// Returns the built-in events, keyed by id.
pub fn events(options: &EventsConfig) -> EventMap {
    let mut events = EventMap::new();
    events.insert("post_published".to_string(), post_published(options));
    events.insert("post_pending_review".to_string(), post_pending_review(options));
    events.insert("new_comment".to_string(), new_comment(options));
    events
}

fn post_published(options: &EventsConfig) -> EventDefinition {
    let message = status_message(options.post_types.clone(), "publish", |post| {
        format!(
            "New post published: *<{}|{}>* by *{}*\n> {}",
            post.permalink,
            post.title,
            post.author,
            excerpt(post)
        )
    });

    EventDefinition::new(TRANSITION_POST_STATUS, "When a post is published")
        .with_arity(3)
        .enabled_by_default(true)
        .with_message(message)
}

fn post_pending_review(options: &EventsConfig) -> EventDefinition {
    let admin_url = options.admin_url.clone();
    let message = status_message(options.post_types.clone(), "pending", move |post| {
        let edit_link = admin_link(&admin_url, &format!("post.php?post={}&action=edit", post.id));
        format!(
            "New post needs review: *<{}|{}>* by *{}*\n> {}",
            edit_link,
            post.title,
            post.author,
            excerpt(post)
        )
    });

    EventDefinition::new(TRANSITION_POST_STATUS, "When a post needs review")
        .with_arity(3)
        .with_message(message)
}

fn new_comment(options: &EventsConfig) -> EventDefinition {
    let post_types = options.comment_post_types.clone();
    let admin_url = options.admin_url.clone();

    let message = Formatter::dynamic(move |args: &TriggerArgs| {
        let comment_id: u64 = args.decode(0)?;
        let comment: Comment = args.decode(1)?;

        if !post_types.contains(&comment.post_type) || comment.is_spam() {
            return Ok(None);
        }

        let edit_link = admin_link(
            &admin_url,
            &format!("comment.php?c={}&action=editcomment", comment_id),
        );
        Ok(Some(format!(
            "<{}|New comment> by *{}* on *<{}|{}>* (_{}_)\n>{}",
            edit_link,
            comment.author,
            comment.post_permalink,
            comment.post_title,
            comment.status,
            quote_lines(&comment.text)
        )))
    });

    EventDefinition::new(INSERT_COMMENT, "When there is a new comment")
        .with_priority(999)
        .with_arity(2)
        .with_message(message)
}

/// Builds a message formatter for a post entering `target` status.
///
/// Transitions that stay in `target`, or posts of other types, say nothing.
fn status_message<F>(post_types: Vec<String>, target: &'static str, render: F) -> Formatter<String>
where
    F: Fn(&Post) -> String + Send + Sync + 'static,
{
    Formatter::dynamic(move |args: &TriggerArgs| {
        let (new_status, old_status) = (args.str(0), args.str(1));
        if old_status == target || new_status != target {
            return Ok(None);
        }

        let post: Post = args.decode(2)?;
        if !post_types.contains(&post.post_type) {
            return Ok(None);
        }

        Ok(Some(render(&post)))
    })
}

fn excerpt(post: &Post) -> String {
    if post.excerpt.is_empty() {
        excerpt_from_content(&post.content)
    } else {
        post.excerpt.clone()
    }
}
