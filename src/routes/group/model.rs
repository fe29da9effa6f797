use serde::Deserialize;

use crate::database::models::NewGroup;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub private: bool,
}

impl CreateGroupRequest {
    pub fn validate(self) -> Result<NewGroup, AppError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("Group name must not be empty".into()));
        }

        Ok(NewGroup {
            name: name.to_string(),
            private: self.private,
        })
    }
}
