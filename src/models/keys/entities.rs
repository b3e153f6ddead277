use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ReviewSystemError};
use crate::models::review::entities::{Review, ReviewStep, ReviewSummary};
use crate::models::students::entities::Student;
use crate::models::submissions::entities::Submission;

// <Kind>:<id>，kind 以大写字母开头
static KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Z][A-Za-z0-9]*):([A-Za-z0-9_-]{1,64})$").expect("Invalid entity key regex")
});

/// 系统内已知的实体类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Student,
    Submission,
    Review,
    ReviewSummary,
    ReviewStep,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Student => "Student",
            EntityKind::Submission => "Submission",
            EntityKind::Review => "Review",
            EntityKind::ReviewSummary => "ReviewSummary",
            EntityKind::ReviewStep => "ReviewStep",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Student" => Ok(EntityKind::Student),
            "Submission" => Ok(EntityKind::Submission),
            "Review" => Ok(EntityKind::Review),
            "ReviewSummary" => Ok(EntityKind::ReviewSummary),
            "ReviewStep" => Ok(EntityKind::ReviewStep),
            _ => Err(format!("Unknown entity kind: {s}")),
        }
    }
}

/// 指向另一条持久化记录的引用，形如 `Student:42`
///
/// 只保存字符串本身（数据库中以带索引的字符串列存储），
/// 访问它永远不会触发查询。需要目标实体时必须显式调用
/// `Storage::resolve_key`。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityKey {
    raw: String,
    kind_len: usize,
}

impl EntityKey {
    /// 解析任意类型的 key，只校验格式
    pub fn parse(raw: &str) -> Result<Self> {
        let captures = KEY_RE.captures(raw).ok_or_else(|| {
            ReviewSystemError::validation(format!(
                "Malformed key '{raw}', expected <Kind>:<id>"
            ))
        })?;
        let kind_len = captures.get(1).map(|m| m.len()).unwrap_or_default();

        Ok(Self {
            raw: raw.to_string(),
            kind_len,
        })
    }

    /// 解析并校验 key 的类型标签。`declared` 为 None 时任何类型都合法
    ///
    /// 纯本地校验，不访问存储。
    pub fn with_kind(raw: &str, declared: Option<EntityKind>) -> Result<Self> {
        let key = Self::parse(raw)?;
        if let Some(kind) = declared {
            key.expect_kind(kind)?;
        }
        Ok(key)
    }

    /// 由实体类型和自增 ID 构造
    pub fn new(kind: EntityKind, id: i64) -> Self {
        let kind = kind.as_str();
        Self {
            raw: format!("{kind}:{id}"),
            kind_len: kind.len(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// key 自带的类型标签
    pub fn kind(&self) -> &str {
        &self.raw[..self.kind_len]
    }

    /// 类型标签之后的标识部分
    pub fn id(&self) -> &str {
        &self.raw[self.kind_len + 1..]
    }

    pub fn entity_kind(&self) -> Option<EntityKind> {
        self.kind().parse().ok()
    }

    /// 类型不匹配时返回校验错误
    pub fn expect_kind(&self, kind: EntityKind) -> Result<&Self> {
        if self.kind() != kind.as_str() {
            return Err(ReviewSystemError::validation(format!(
                "Key must be of kind {}; was {}",
                kind,
                self.kind()
            )));
        }
        Ok(self)
    }

    /// 本系统生成的 key 的标识部分都是数字 ID
    pub fn numeric_id(&self) -> Result<i64> {
        self.id().parse::<i64>().map_err(|_| {
            ReviewSystemError::validation(format!("Key '{}' does not carry a numeric id", self.raw))
        })
    }
}

impl std::fmt::Display for EntityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

impl TryFrom<String> for EntityKey {
    type Error = ReviewSystemError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<EntityKey> for String {
    fn from(key: EntityKey) -> Self {
        key.raw
    }
}

/// 显式解析 key 得到的实体
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "entity")]
pub enum ResolvedEntity {
    Student(Student),
    Submission(Submission),
    Review(Review),
    ReviewSummary(ReviewSummary),
    ReviewStep(ReviewStep),
}

impl ResolvedEntity {
    pub fn kind(&self) -> EntityKind {
        match self {
            ResolvedEntity::Student(_) => EntityKind::Student,
            ResolvedEntity::Submission(_) => EntityKind::Submission,
            ResolvedEntity::Review(_) => EntityKind::Review,
            ResolvedEntity::ReviewSummary(_) => EntityKind::ReviewSummary,
            ResolvedEntity::ReviewStep(_) => EntityKind::ReviewStep,
        }
    }
}
