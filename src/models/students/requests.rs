use serde::Deserialize;

use crate::errors::{Result, ReviewSystemError};
use crate::utils::validate::validate_email;

// 学生创建请求
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStudentRequest {
    pub email: String,
    pub name: Option<String>,
}

impl CreateStudentRequest {
    pub fn validate(&self) -> Result<()> {
        validate_email(&self.email).map_err(ReviewSystemError::validation)
    }
}
