//! 错误类型
//!
//! | 错误类型 | 触发条件 | 处理策略 |
//! |---------|---------|---------|
//! | `MissingKeys` | 未配置密钥却请求签名读写 | 编程错误，立即返回 |
//! | `EmptyKeyRing` | 用空列表构造 `KeyRing` | 构造失败 |
//! | `InvalidKey` | 密钥无法初始化 MAC | 构造失败 |
//! | `InvalidName` | Cookie 名称不是合法 token | 写入前拒绝，不产生任何输出 |
//! | `InvalidValue` | Cookie 值含无法原样写入的字节 | 写入前拒绝，不产生任何输出 |
//! | `Transport` | ReadWriter 自身出错 | 原样向上传播 |
//! | `Config` | 配置文件/环境变量解析失败 | 立即返回 |
//!
//! Cookie 缺失、签名不匹配都不是错误，由 `Option::None` 表示。

use thiserror::Error;

/// 签名 Cookie 操作的结果类型
pub type CookieResult<T> = Result<T, CookieError>;

/// 签名 Cookie 错误
#[derive(Debug, Error)]
pub enum CookieError {
    /// 请求签名操作，但签名器没有配置任何密钥
    #[error("signed cookie operation requested but no keys are configured")]
    MissingKeys,

    /// 密钥列表为空
    #[error("key ring requires at least one key")]
    EmptyKeyRing,

    /// 第 `index` 个密钥不可用
    #[error("invalid signing key at index {index}")]
    InvalidKey { index: usize },

    /// Cookie 名称非法
    #[error("invalid cookie name {name:?}")]
    InvalidName { name: String },

    /// Cookie 值含非法字节，值本身不写入错误信息
    #[error("cookie {name} has a value that cannot be written verbatim")]
    InvalidValue { name: String },

    /// 传输层错误
    #[error("cookie transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// 配置错误
    #[error("cookie config error: {0}")]
    Config(#[from] config::ConfigError),
}

impl CookieError {
    /// 包装任意传输层错误
    pub fn transport<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Transport(err.into())
    }

    /// 是否为配置缺失导致的编程错误
    pub fn is_misconfiguration(&self) -> bool {
        matches!(self, Self::MissingKeys | Self::EmptyKeyRing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_is_misconfiguration() {
        assert!(CookieError::MissingKeys.is_misconfiguration());
        assert!(CookieError::EmptyKeyRing.is_misconfiguration());
        assert!(!CookieError::transport("socket closed").is_misconfiguration());
    }

    #[test]
    fn test_invalid_cookie_messages_omit_value() {
        let err = CookieError::InvalidValue {
            name: "jt".to_string(),
        };
        assert_eq!(err.to_string(), "cookie jt has a value that cannot be written verbatim");
        assert!(!err.is_misconfiguration());

        let err = CookieError::InvalidName {
            name: "a b".to_string(),
        };
        assert_eq!(err.to_string(), "invalid cookie name \"a b\"");
    }

    #[test]
    fn test_transport_error_keeps_source() {
        let err = CookieError::transport("socket closed");
        assert_eq!(err.to_string(), "cookie transport error: socket closed");
        assert!(std::error::Error::source(&err).is_some());
    }
}
