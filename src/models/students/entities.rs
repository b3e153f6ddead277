use serde::{Deserialize, Serialize};

use crate::models::keys::EntityKey;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    // 唯一 ID
    pub id: i64,
    // 形如 Student:<id> 的引用
    pub key: EntityKey,
    // 邮箱，全局唯一
    pub email: String,
    // 显示名称
    pub name: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
