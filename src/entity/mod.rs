//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! Storage 层使用这些实体进行 CRUD 操作，然后转换为 models 中的业务实体。
//! 所有引用其它记录的列都以 `<Kind>:<id>` 字符串保存，不声明外键关系，
//! 解析引用必须由调用方显式发起。

pub mod prelude;

pub mod review_steps;
pub mod review_summaries;
pub mod reviews;
pub mod students;
pub mod submissions;

use crate::errors::{Result, ReviewSystemError};
use crate::models::keys::{EntityKey, EntityKind};

/// 数据库中的 i64 时间戳转为 UTC 时间
pub(crate) fn timestamp_to_datetime(ts: i64) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::<chrono::Utc>::from_timestamp(ts, 0).unwrap_or_default()
}

/// 读取存储的 key 列，并校验其类型
pub(crate) fn stored_key(raw: &str, kind: EntityKind) -> Result<EntityKey> {
    EntityKey::with_kind(raw, Some(kind)).map_err(|e| {
        ReviewSystemError::database_operation(format!("Stored key '{raw}' is corrupt: {e}"))
    })
}
