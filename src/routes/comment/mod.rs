mod handler;
mod model;

pub use handler::{create_comment, get_comment, list_comments};
pub use model::{CommentsQuery, CreateCommentRequest};
