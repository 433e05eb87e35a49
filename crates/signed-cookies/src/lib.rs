//! # signed-cookies
//!
//! 防篡改的 HTTP Cookie：每个值 Cookie 都附带一个同名 `.sig` 签名 Cookie，
//! 服务端无需保存会话即可发现客户端篡改。
//!
//! - 多密钥并存，支持无停机轮换密钥
//! - 旧密钥验证通过时自动用主密钥重新签名
//! - 传输层通过 [`ReadWriter`] 抽象，可接入任意 HTTP 框架
//!
//! ## 快速开始
//!
//! ```rust
//! use signed_cookies::{CookieOptions, MemoryReadWriter};
//!
//! let config = CookieOptions::new()
//!     .with_keys(["A", "B"])
//!     .with_path("/")
//!     .into_config()
//!     .unwrap();
//!
//! let mut signer = config.signer(MemoryReadWriter::new());
//! signer.set_signed("jt", "myCookie").unwrap();
//!
//! let mut rw = signer.into_inner();
//! rw.carry_over();
//!
//! let mut signer = config.signer(rw);
//! assert_eq!(signer.get("jt", true).unwrap().as_deref(), Some("myCookie"));
//! ```

pub mod cookie;
pub mod error;
pub mod keyring;
pub mod options;
pub mod signer;
pub mod transport;

pub use crate::cookie::{parse_cookie_header, parse_set_cookie, Cookie};
pub use error::{CookieError, CookieResult};
pub use keyring::{KeyRing, SignatureAlgorithm};
pub use options::{CookieOptions, CookieTemplate, SignerConfig};
pub use signer::{signature_name, CookieSigner, SIG_SUFFIX};
pub use transport::{MemoryReadWriter, ReadWriter};

#[cfg(feature = "http")]
pub use transport::HeaderReadWriter;
