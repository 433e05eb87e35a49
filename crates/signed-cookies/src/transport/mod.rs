//! 传输层抽象
//!
//! 签名器只依赖 [`ReadWriter`]：读取请求中的 Cookie、向响应追加 `Set-Cookie`。
//! 具体 HTTP 框架通过实现该 trait 接入。
//!
//! - [`MemoryReadWriter`]: 内存实现，用于测试和命令行工具
//! - [`HeaderReadWriter`]: 基于 `http::HeaderMap` 的适配器（`http` feature）

mod memory;

#[cfg(feature = "http")]
mod header;

pub use memory::MemoryReadWriter;

#[cfg(feature = "http")]
pub use header::HeaderReadWriter;

use crate::cookie::Cookie;
use crate::error::CookieResult;

/// Cookie 读写能力
///
/// 通常代表一次请求/响应交换，不要求线程安全。
pub trait ReadWriter {
    /// 按名称精确读取请求中的 Cookie，缺失时返回 `Ok(None)`
    fn cookie(&self, name: &str) -> CookieResult<Option<Cookie>>;

    /// 向响应追加一个 Cookie
    ///
    /// 追加语义：多次调用（包括同名 Cookie）都必须保留。
    fn set_cookie(&mut self, cookie: &Cookie) -> CookieResult<()>;
}

impl<T: ReadWriter + ?Sized> ReadWriter for &mut T {
    fn cookie(&self, name: &str) -> CookieResult<Option<Cookie>> {
        (**self).cookie(name)
    }

    fn set_cookie(&mut self, cookie: &Cookie) -> CookieResult<()> {
        (**self).set_cookie(cookie)
    }
}

impl<T: ReadWriter + ?Sized> ReadWriter for Box<T> {
    fn cookie(&self, name: &str) -> CookieResult<Option<Cookie>> {
        (**self).cookie(name)
    }

    fn set_cookie(&mut self, cookie: &Cookie) -> CookieResult<()> {
        (**self).set_cookie(cookie)
    }
}
