//! Typed views of the host objects forwarded as trigger arguments.
//!
//! The host serializes its objects to JSON before firing a trigger; these
//! structs pick out the fields the built-in formatters need. Unknown fields
//! are ignored and missing ones fall back to their defaults.

use serde::Deserialize;

fn default_post_type() -> String {
    "post".to_string()
}

fn default_comment_status() -> String {
    "approved".to_string()
}

/// A piece of content whose status changed.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Post {
    pub id: u64,
    #[serde(default = "default_post_type")]
    pub post_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub permalink: String,
    /// Display name of the author.
    #[serde(default)]
    pub author: String,
    /// The explicit excerpt, if the author wrote one.
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: String,
}

/// A freshly inserted comment, with the post it belongs to.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Comment {
    pub post_id: u64,
    #[serde(default = "default_post_type")]
    pub post_type: String,
    #[serde(default)]
    pub post_title: String,
    #[serde(default)]
    pub post_permalink: String,
    #[serde(default)]
    pub author: String,
    /// Moderation status: `approved`, `unapproved`, `spam` or `trash`.
    #[serde(default = "default_comment_status")]
    pub status: String,
    #[serde(default)]
    pub text: String,
}

impl Comment {
    pub fn is_spam(&self) -> bool {
        self.status == "spam"
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct User {
    pub id: u64,
    pub display_name: String,
}

/// An award (badge, step, nomination...) earned by a user.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Achievement {
    pub id: u64,
    pub post_type: String,
    pub title: String,
    pub permalink: String,
    pub thumbnail_url: String,
}
