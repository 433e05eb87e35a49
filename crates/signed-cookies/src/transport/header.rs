//! `http::HeaderMap` 适配器

use http::header::{COOKIE, SET_COOKIE};
use http::{HeaderMap, HeaderValue};

use super::ReadWriter;
use crate::cookie::{parse_cookie_header, Cookie};
use crate::error::{CookieError, CookieResult};

/// 基于请求头/响应头的传输层
///
/// 读取所有 `Cookie` 请求头，向响应头追加 `Set-Cookie`。非 UTF-8 的
/// `Cookie` 头会被忽略。
#[derive(Debug)]
pub struct HeaderReadWriter<'a> {
    request: &'a HeaderMap,
    response: &'a mut HeaderMap,
}

impl<'a> HeaderReadWriter<'a> {
    pub fn new(request: &'a HeaderMap, response: &'a mut HeaderMap) -> Self {
        Self { request, response }
    }
}

impl ReadWriter for HeaderReadWriter<'_> {
    fn cookie(&self, name: &str) -> CookieResult<Option<Cookie>> {
        let found = self
            .request
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(parse_cookie_header)
            .find(|(n, _)| n == name)
            .map(|(n, v)| Cookie::new(n, v));
        Ok(found)
    }

    fn set_cookie(&mut self, cookie: &Cookie) -> CookieResult<()> {
        let value = HeaderValue::from_str(&cookie.to_string()).map_err(CookieError::transport)?;
        self.response.append(SET_COOKIE, value);
        Ok(())
    }
}
