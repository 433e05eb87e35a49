//! 内存传输层

use super::ReadWriter;
use crate::cookie::{parse_cookie_header, parse_set_cookie, Cookie};
use crate::error::CookieResult;

/// 内存中的请求/响应 Cookie
///
/// 请求侧只保存 `name=value`（与浏览器发送的内容一致），响应侧按写入顺序
/// 保存完整的 Cookie。
#[derive(Debug, Clone, Default)]
pub struct MemoryReadWriter {
    incoming: Vec<(String, String)>,
    outgoing: Vec<Cookie>,
}

impl MemoryReadWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从请求 `Cookie` 头构造
    pub fn from_cookie_header(header: &str) -> Self {
        Self {
            incoming: parse_cookie_header(header),
            outgoing: Vec::new(),
        }
    }

    /// 添加一个请求 Cookie
    pub fn add_cookie(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.incoming.push((name.into(), value.into()));
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_cookie(name, value);
        self
    }

    /// 已写入响应的 Cookie
    pub fn set_cookies(&self) -> &[Cookie] {
        &self.outgoing
    }

    /// 已写入响应的 `Set-Cookie` 头
    pub fn set_cookie_headers(&self) -> Vec<String> {
        self.outgoing.iter().map(ToString::to_string).collect()
    }

    /// 取出并清空响应 Cookie
    pub fn take_set_cookies(&mut self) -> Vec<Cookie> {
        std::mem::take(&mut self.outgoing)
    }

    /// 模拟浏览器：把响应中的 Cookie 带入下一次请求
    ///
    /// 同名 Cookie 以响应为准，`Max-Age <= 0` 的 Cookie 视为删除。带入的是
    /// 序列化后的 `Set-Cookie` 文本重新解析的结果，与浏览器实际收到的一致。
    pub fn carry_over(&mut self) {
        for cookie in std::mem::take(&mut self.outgoing) {
            self.incoming.retain(|(name, _)| *name != cookie.name);
            if matches!(cookie.max_age, Some(seconds) if seconds <= 0) {
                continue;
            }
            if let Some(pair) = parse_set_cookie(&cookie.to_string()) {
                self.incoming.push(pair);
            }
        }
    }
}

impl ReadWriter for MemoryReadWriter {
    fn cookie(&self, name: &str) -> CookieResult<Option<Cookie>> {
        Ok(self
            .incoming
            .iter()
            .find(|(n, _)| n == name)
            .map(|(n, v)| Cookie::new(n.as_str(), v.as_str())))
    }

    fn set_cookie(&mut self, cookie: &Cookie) -> CookieResult<()> {
        self.outgoing.push(cookie.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cookie_lookup_is_exact() {
        let rw = MemoryReadWriter::from_cookie_header("jt=myCookie; jt.sig=abc");
        assert_eq!(rw.cookie("jt").unwrap().unwrap().value, "myCookie");
        assert_eq!(rw.cookie("jt.sig").unwrap().unwrap().value, "abc");
        assert!(rw.cookie("j").unwrap().is_none());
    }

    #[test]
    fn test_first_duplicate_wins() {
        let rw = MemoryReadWriter::new()
            .with_cookie("jt", "first")
            .with_cookie("jt", "second");
        assert_eq!(rw.cookie("jt").unwrap().unwrap().value, "first");
    }

    #[test]
    fn test_set_cookie_appends() {
        let mut rw = MemoryReadWriter::new();
        rw.set_cookie(&Cookie::new("jt", "a")).unwrap();
        rw.set_cookie(&Cookie::new("jt", "b")).unwrap();
        assert_eq!(rw.set_cookie_headers(), vec!["jt=a", "jt=b"]);
    }

    #[test]
    fn test_carry_over() {
        let mut rw = MemoryReadWriter::new()
            .with_cookie("jt", "old")
            .with_cookie("gone", "x");
        rw.set_cookie(&Cookie::new("jt", "new")).unwrap();
        rw.set_cookie(&Cookie::new("gone", "").with_max_age(-1)).unwrap();
        rw.carry_over();

        assert!(rw.set_cookies().is_empty());
        assert_eq!(rw.cookie("jt").unwrap().unwrap().value, "new");
        assert!(rw.cookie("gone").unwrap().is_none());
    }

    #[test]
    fn test_carry_over_uses_serialized_text() {
        let mut rw = MemoryReadWriter::new();
        rw.set_cookie(&Cookie::new("quoted", "hello world").with_path("/"))
            .unwrap();
        rw.set_cookie(&Cookie::new("dropped", "a;b\"c")).unwrap();
        rw.carry_over();

        assert_eq!(rw.cookie("quoted").unwrap().unwrap().value, "hello world");
        // 浏览器收到的是去掉非法字节后的值
        assert_eq!(rw.cookie("dropped").unwrap().unwrap().value, "abc");
    }
}
