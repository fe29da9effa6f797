mod handler;
mod model;

pub use handler::{create_group, get_group, list_groups};
pub use model::CreateGroupRequest;
