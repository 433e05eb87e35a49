//! Cookie 模型
//!
//! 提供 Cookie 结构、`Set-Cookie` 序列化以及请求 `Cookie` 头解析。
//! 解析交给 `cookie` crate；序列化自行实现，属性顺序固定为下面的格式。
//!
//! 序列化格式：
//!
//! ```text
//! name=value; Path=P; Domain=D; Expires=<IMF-fixdate>; Max-Age=N; HttpOnly; Secure
//! ```
//!
//! 各属性仅在设置时输出。

use ::cookie::Cookie as RawCookie;
use chrono::{DateTime, Datelike, Utc};
use std::fmt::{self, Write as _};

use crate::error::{CookieError, CookieResult};

/// IMF-fixdate 格式（RFC 7231）
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// 单个 Cookie
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cookie {
    /// 名称
    pub name: String,
    /// 值
    pub value: String,
    /// 路径
    pub path: Option<String>,
    /// 域名
    pub domain: Option<String>,
    /// 绝对过期时间
    pub expires: Option<DateTime<Utc>>,
    /// 存活秒数，`<= 0` 表示立即删除
    pub max_age: Option<i64>,
    /// 仅 HTTPS 传输
    pub secure: bool,
    /// 禁止脚本访问
    pub http_only: bool,
}

impl Cookie {
    /// 创建不带属性的 Cookie
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Default::default()
        }
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

    /// 签名消息 `name=value`
    pub fn signing_message(&self) -> String {
        format!("{}={}", self.name, self.value)
    }

    /// 检查名称与值能否原样写入 `Set-Cookie`
    ///
    /// 序列化会丢弃非法字节，签名写入前必须先检查，否则签名永远无法验证。
    pub fn validate(&self) -> CookieResult<()> {
        if !is_token(&self.name) {
            return Err(CookieError::InvalidName {
                name: self.name.clone(),
            });
        }
        if !is_cookie_value(&self.value) {
            return Err(CookieError::InvalidValue {
                name: self.name.clone(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::with_capacity(self.name.len() + self.value.len() + 64);
        out.push_str(&self.name);
        out.push('=');
        out.push_str(&sanitize_value(&self.value));

        if let Some(path) = self.path.as_deref().filter(|p| !p.is_empty()) {
            write!(out, "; Path={}", sanitize_path(path))?;
        }
        if let Some(domain) = self.domain.as_deref() {
            let domain = domain.strip_prefix('.').unwrap_or(domain);
            if !domain.is_empty() {
                write!(out, "; Domain={}", domain)?;
            }
        }
        // 1601 年之前的时间无法用 Expires 表达
        if let Some(expires) = self.expires.filter(|e| e.year() >= 1601) {
            write!(out, "; Expires={}", expires.format(HTTP_DATE_FORMAT))?;
        }
        match self.max_age {
            Some(seconds) if seconds > 0 => write!(out, "; Max-Age={}", seconds)?,
            Some(_) => out.push_str("; Max-Age=0"),
            None => {}
        }
        if self.http_only {
            out.push_str("; HttpOnly");
        }
        if self.secure {
            out.push_str("; Secure");
        }

        f.write_str(&out)
    }
}

/// 解析请求 `Cookie` 头
///
/// 返回 `(name, value)` 列表，保留出现顺序。跳过缺少 `=`、名称非法或值含非法
/// 字节的条目，并去掉值两侧的双引号。
pub fn parse_cookie_header(header: &str) -> Vec<(String, String)> {
    RawCookie::split_parse(header)
        .filter_map(Result::ok)
        .filter_map(|raw| pair(&raw))
        .collect()
}

/// 解析单个 `Set-Cookie` 头，只取 `name=value`，忽略属性
pub fn parse_set_cookie(header: &str) -> Option<(String, String)> {
    RawCookie::parse(header).ok().and_then(|raw| pair(&raw))
}

fn pair(raw: &RawCookie<'_>) -> Option<(String, String)> {
    let value = raw.value_trimmed();
    (is_token(raw.name()) && is_cookie_value(value))
        .then(|| (raw.name().to_string(), value.to_string()))
}

/// 名称是否为合法 token
pub fn is_token(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
        })
}

/// 值能否原样写入 `Set-Cookie`
///
/// 空格与逗号合法，序列化时加双引号。
pub fn is_cookie_value(value: &str) -> bool {
    value.bytes().all(is_cookie_octet)
}

fn is_cookie_octet(b: u8) -> bool {
    (0x20..0x7f).contains(&b) && b != b'"' && b != b';' && b != b'\\'
}

fn sanitize_value(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .filter(|c| c.is_ascii() && is_cookie_octet(*c as u8))
        .collect();
    if cleaned.contains(' ') || cleaned.contains(',') {
        format!("\"{}\"", cleaned)
    } else {
        cleaned
    }
}

fn sanitize_path(path: &str) -> String {
    path.chars()
        .filter(|c| (' '..='~').contains(c) && *c != ';')
        .collect()
}
