use crate::api::{Comment, Post};

/// Local mirror of one post and its comment thread. Both fields are caches
/// of the latest snapshot received, replaced wholesale on every delivery;
/// the store remains the authority.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Thread {
    pub post: Option<Post>,
    pub comments: Vec<Comment>,
}

impl Thread {
    pub fn empty() -> Thread {
        Thread {
            post: None,
            comments: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.post = None;
        self.comments.clear();
    }

    pub fn apply_post(&mut self, post: Option<Post>) {
        self.post = post;
    }

    /// Comments are kept in exactly the order the snapshot delivered them:
    /// the store orders by timestamp descending and that ordering is
    /// load-bearing.
    pub fn apply_comments(&mut self, comments: Vec<Comment>) {
        self.comments = comments;
    }
}
