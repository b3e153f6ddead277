use serde::{Deserialize, Serialize};

use crate::models::keys::EntityKey;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    // 唯一 ID
    pub id: i64,
    // 形如 Submission:<id> 的引用
    pub key: EntityKey,
    // 所属单元
    pub unit_id: String,
    // 作者（Student key）
    pub author_key: EntityKey,
    // 提交内容
    pub contents: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
