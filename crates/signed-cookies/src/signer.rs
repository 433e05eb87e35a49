//! 签名 Cookie 读写
//!
//! 值 Cookie `name` 与签名 Cookie `name.sig` 成对出现，签名内容为 `name=value`。
//!
//! 读取流程：
//!
//! 1. 值 Cookie 缺失，返回 `None`
//! 2. 非签名读取，直接返回原值
//! 3. 签名 Cookie 缺失，返回 `None`
//! 4. 没有密钥匹配，返回 `None` 并清空签名 Cookie
//! 5. 匹配旧密钥，用主密钥重新签名后返回原值
//! 6. 匹配主密钥，直接返回原值
//!
//! 未配置密钥时任何签名读写都返回 [`CookieError::MissingKeys`]。
//! 写入前检查名称与值，无法原样序列化的 Cookie 返回
//! [`CookieError::InvalidName`] 或 [`CookieError::InvalidValue`]，不产生任何输出。

use std::sync::Arc;

use crate::cookie::Cookie;
use crate::error::{CookieError, CookieResult};
use crate::keyring::KeyRing;
use crate::options::CookieTemplate;
use crate::transport::ReadWriter;

/// 签名 Cookie 名后缀
pub const SIG_SUFFIX: &str = ".sig";

/// 签名 Cookie 名
pub fn signature_name(name: &str) -> String {
    format!("{}{}", name, SIG_SUFFIX)
}

/// 签名 Cookie 读写器
///
/// 每个请求绑定一个传输层；密钥环与属性模板在实例间共享。
#[derive(Debug)]
pub struct CookieSigner<RW> {
    transport: RW,
    keyring: Option<Arc<KeyRing>>,
    template: Arc<CookieTemplate>,
}

impl<RW: ReadWriter> CookieSigner<RW> {
    pub fn new(transport: RW, keyring: Option<Arc<KeyRing>>, template: Arc<CookieTemplate>) -> Self {
        Self {
            transport,
            keyring,
            template,
        }
    }

    /// 按属性模板创建 Cookie，不做任何 I/O
    pub fn create_cookie(&self, name: impl Into<String>, value: impl Into<String>) -> Cookie {
        self.template.apply(name, value)
    }

    /// 读取 Cookie 值
    ///
    /// 签名读取时，未通过验证的值一律视为缺失。
    pub fn get(&mut self, name: &str, signed: bool) -> CookieResult<Option<String>> {
        let keyring = if signed {
            Some(self.require_keyring()?)
        } else {
            None
        };

        let Some(cookie) = self.transport.cookie(name)? else {
            tracing::trace!(cookie = name, "cookie not present");
            return Ok(None);
        };

        let Some(keyring) = keyring else {
            return Ok(Some(cookie.value));
        };

        let sig_name = signature_name(name);
        let Some(sig_cookie) = self.transport.cookie(&sig_name)? else {
            tracing::trace!(cookie = name, "signature cookie not present");
            return Ok(None);
        };

        let message = cookie.signing_message();
        match keyring.index(&message, &sig_cookie.value) {
            None => {
                tracing::warn!(cookie = name, "cookie signature mismatch, clearing signature");
                let cleared = self.create_cookie(sig_name, "");
                self.set(&cleared, false)?;
                Ok(None)
            }
            Some(0) => Ok(Some(cookie.value)),
            Some(index) => {
                tracing::debug!(cookie = name, key_index = index, "re-signing cookie with primary key");
                let resigned = self.create_cookie(sig_name, keyring.sign(&message));
                self.set(&resigned, false)?;
                Ok(Some(cookie.value))
            }
        }
    }

    /// 写入 Cookie
    ///
    /// 签名写入时额外写入按模板创建的 `name.sig`。
    pub fn set(&mut self, cookie: &Cookie, signed: bool) -> CookieResult<()> {
        let keyring = if signed {
            Some(self.require_keyring()?)
        } else {
            None
        };
        cookie.validate()?;

        self.transport.set_cookie(cookie)?;

        if let Some(keyring) = keyring {
            let signature = keyring.sign(&cookie.signing_message());
            let sig_cookie = self.create_cookie(signature_name(&cookie.name), signature);
            self.set(&sig_cookie, false)?;
        }
        Ok(())
    }

    /// 按模板创建并签名写入
    pub fn set_signed(&mut self, name: &str, value: &str) -> CookieResult<()> {
        let cookie = self.create_cookie(name, value);
        self.set(&cookie, true)
    }

    /// 密钥环，未配置密钥时为 `None`
    pub fn keyring(&self) -> Option<&KeyRing> {
        self.keyring.as_deref()
    }

    pub fn template(&self) -> &CookieTemplate {
        &self.template
    }

    pub fn transport(&self) -> &RW {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut RW {
        &mut self.transport
    }

    /// 取回传输层
    pub fn into_inner(self) -> RW {
        self.transport
    }

    fn require_keyring(&self) -> CookieResult<Arc<KeyRing>> {
        self.keyring.clone().ok_or(CookieError::MissingKeys)
    }
}
