use serde::Deserialize;

use super::EntityKind;

// 引用解析查询参数，key 本身在路径中
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolveKeyQuery {
    /// 可选的声明类型，与 key 中的类型不一致时拒绝
    pub kind: Option<EntityKind>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_is_optional() {
        let query: ResolveKeyQuery = serde_json::from_str("{}").unwrap();
        assert!(query.kind.is_none());

        let query: ResolveKeyQuery = serde_json::from_str(r#"{"kind":"Review"}"#).unwrap();
        assert_eq!(query.kind, Some(EntityKind::Review));
    }
}
