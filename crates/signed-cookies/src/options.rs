//! 签名器配置
//!
//! `CookieOptions` 是构造期配置：密钥列表（新密钥在前）加上所有 Cookie
//! 共享的属性模板。编译为 [`SignerConfig`] 后可在多个请求间共享。
//!
//! 配置可以来自代码、TOML 文件或 `COOKIE_SIG_*` 环境变量：
//!
//! ```toml
//! keys = ["new-key", "old-key"]
//! algorithm = "sha1"
//! path = "/"
//! domain = "aslant.site"
//! max_age = 3600
//! secure = true
//! http_only = true
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::cookie::Cookie;
use crate::error::CookieResult;
use crate::keyring::{KeyRing, SignatureAlgorithm};
use crate::signer::CookieSigner;
use crate::transport::ReadWriter;

/// 环境变量前缀
pub const ENV_PREFIX: &str = "COOKIE_SIG";

/// Cookie 属性模板
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieTemplate {
    pub path: Option<String>,
    pub domain: Option<String>,
    pub expires: Option<DateTime<Utc>>,
    pub max_age: Option<i64>,
    pub secure: bool,
    pub http_only: bool,
}

impl CookieTemplate {
    /// 按模板创建 Cookie
    pub fn apply(&self, name: impl Into<String>, value: impl Into<String>) -> Cookie {
        Cookie {
            name: name.into(),
            value: value.into(),
            path: self.path.clone(),
            domain: self.domain.clone(),
            expires: self.expires,
            max_age: self.max_age,
            secure: self.secure,
            http_only: self.http_only,
        }
    }
}

/// 构造期配置
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieOptions {
    /// 密钥列表，索引 0 为主密钥；为空时禁用签名操作
    pub keys: Vec<String>,
    /// 签名算法
    pub algorithm: SignatureAlgorithm,
    pub path: Option<String>,
    pub domain: Option<String>,
    /// RFC 3339 时间
    pub expires: Option<DateTime<Utc>>,
    pub max_age: Option<i64>,
    pub secure: bool,
    pub http_only: bool,
}

impl CookieOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从可选的 TOML 文件加载，再叠加 `COOKIE_SIG_*` 环境变量
    ///
    /// `COOKIE_SIG_KEYS` 使用逗号分隔多个密钥。
    pub fn load(path: Option<&Path>) -> CookieResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("keys"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn with_keys<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_algorithm(mut self, algorithm: SignatureAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    pub fn with_max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    /// 属性模板
    pub fn template(&self) -> CookieTemplate {
        CookieTemplate {
            path: self.path.clone(),
            domain: self.domain.clone(),
            expires: self.expires,
            max_age: self.max_age,
            secure: self.secure,
            http_only: self.http_only,
        }
    }

    /// 编译为可共享的签名器配置
    pub fn into_config(self) -> CookieResult<SignerConfig> {
        SignerConfig::new(&self)
    }
}

impl std::fmt::Debug for CookieOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieOptions")
            .field("keys", &format_args!("[{} redacted]", self.keys.len()))
            .field("algorithm", &self.algorithm)
            .field("path", &self.path)
            .field("domain", &self.domain)
            .field("expires", &self.expires)
            .field("max_age", &self.max_age)
            .field("secure", &self.secure)
            .field("http_only", &self.http_only)
            .finish()
    }
}

/// 编译后的签名器配置
///
/// 密钥环与属性模板只读，克隆只增加引用计数。
#[derive(Debug, Clone)]
pub struct SignerConfig {
    keyring: Option<Arc<KeyRing>>,
    template: Arc<CookieTemplate>,
}

impl SignerConfig {
    pub fn new(options: &CookieOptions) -> CookieResult<Self> {
        let keyring = if options.keys.is_empty() {
            tracing::debug!("no cookie keys configured, signed operations disabled");
            None
        } else {
            Some(Arc::new(KeyRing::with_algorithm(
                &options.keys,
                options.algorithm,
            )?))
        };

        Ok(Self {
            keyring,
            template: Arc::new(options.template()),
        })
    }

    pub fn from_parts(keyring: Option<Arc<KeyRing>>, template: CookieTemplate) -> Self {
        Self {
            keyring,
            template: Arc::new(template),
        }
    }

    /// 为一次请求绑定传输层
    pub fn signer<RW: ReadWriter>(&self, transport: RW) -> CookieSigner<RW> {
        CookieSigner::new(transport, self.keyring.clone(), Arc::clone(&self.template))
    }

    pub fn keyring(&self) -> Option<&Arc<KeyRing>> {
        self.keyring.as_ref()
    }

    pub fn template(&self) -> &CookieTemplate {
        &self.template
    }
}
