mod handler;
mod model;

pub use handler::{create_post, get_post, list_posts};
pub use model::{CreatePostRequest, PostsQuery};
