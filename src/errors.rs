//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。
//! 评审状态机相关的错误（校验、非法迁移、重复分配）都在这里定义，
//! 由 services 层映射到 HTTP 状态码。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_review_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum ReviewSystemError {
            $($variant(String),)*
        }

        impl ReviewSystemError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(ReviewSystemError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(ReviewSystemError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(ReviewSystemError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl ReviewSystemError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        ReviewSystemError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_review_errors! {
    DatabaseConfig("E001", "Database Configuration Error"),
    DatabaseConnection("E002", "Database Connection Error"),
    DatabaseOperation("E003", "Database Operation Error"),
    Validation("E004", "Validation Error"),
    IllegalTransition("E005", "Illegal State Transition"),
    DuplicateAssignment("E006", "Duplicate Assignment"),
    NotFound("E007", "Resource Not Found"),
    ConcurrencyConflict("E008", "Concurrency Conflict"),
    Serialization("E009", "Serialization Error"),
    DateParse("E010", "Date Parse Error"),
    Internal("E011", "Internal Error"),
}

impl ReviewSystemError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// 调用方的错误（请求本身不合法），区别于存储层故障
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            ReviewSystemError::Validation(_)
                | ReviewSystemError::IllegalTransition(_)
                | ReviewSystemError::DuplicateAssignment(_)
                | ReviewSystemError::NotFound(_)
        )
    }
}

impl fmt::Display for ReviewSystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ReviewSystemError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for ReviewSystemError {
    fn from(err: sea_orm::DbErr) -> Self {
        ReviewSystemError::DatabaseOperation(err.to_string())
    }
}

impl From<serde_json::Error> for ReviewSystemError {
    fn from(err: serde_json::Error) -> Self {
        ReviewSystemError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for ReviewSystemError {
    fn from(err: chrono::ParseError) -> Self {
        ReviewSystemError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReviewSystemError>;
