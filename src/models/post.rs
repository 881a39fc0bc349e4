//! Post data structure.

use crate::utils::truncate;

/// A post extracted from a thread page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// Identifier attribute of the post container
    pub id: String,

    /// Author display name
    pub author: String,

    /// Message body text
    pub content: String,

    /// URL of the thread the post belongs to
    pub thread_url: String,

    /// Title of the thread the post belongs to
    pub thread_title: String,
}

impl Post {
    /// Link that jumps straight to the post within its thread.
    pub fn deep_link(&self) -> String {
        format!("{}#{}", self.thread_url, self.id)
    }

    /// Content cut to at most `limit` grapheme clusters, with an ellipsis when cut.
    pub fn preview(&self, limit: usize) -> String {
        truncate(&self.content, limit)
    }

    /// Format post for a notification using a template.
    ///
    /// Supported placeholders:
    /// - `{author}`, `{thread_title}`, `{post_id}`, `{link}`
    /// - `{content}` (truncated to `content_limit`)
    pub fn format(&self, template: &str, content_limit: usize) -> String {
        template
            .replace("{author}", &self.author)
            .replace("{thread_title}", &self.thread_title)
            .replace("{post_id}", &self.id)
            .replace("{link}", &self.deep_link())
            .replace("{content}", &self.preview(content_limit))
    }
}
