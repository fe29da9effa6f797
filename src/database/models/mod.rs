/// 数据库实体定义
pub mod comment;
pub mod group;
pub mod post;

pub use comment::{Comment, NewComment};
pub use group::{Group, GroupAdmin, GroupMember, NewGroup};
pub use post::{NewPost, Post};
