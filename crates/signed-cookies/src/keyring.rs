//! 密钥环
//!
//! 持有按新旧排序的共享密钥列表（索引 0 为主密钥），提供签名与验证：
//!
//! - `sign` 只使用主密钥
//! - `index` 按顺序用每个密钥验证，返回第一个匹配的位置
//!
//! 签名为 HMAC 摘要的 URL-safe base64（无填充）编码，默认 SHA-1，
//! 与 keygrip 生成的签名兼容。

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::Sha256;

use crate::error::{CookieError, CookieResult};

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;

/// 签名摘要算法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureAlgorithm {
    /// HMAC-SHA1（keygrip 默认）
    #[default]
    Sha1,
    /// HMAC-SHA256
    Sha256,
}

impl SignatureAlgorithm {
    /// 算法名称
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
        }
    }
}

impl std::fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 预先初始化好的单个密钥 MAC 状态
#[derive(Clone)]
enum KeyMac {
    Sha1(HmacSha1),
    Sha256(HmacSha256),
}

impl KeyMac {
    fn new(algorithm: SignatureAlgorithm, key: &[u8]) -> Option<Self> {
        match algorithm {
            SignatureAlgorithm::Sha1 => HmacSha1::new_from_slice(key).ok().map(Self::Sha1),
            SignatureAlgorithm::Sha256 => HmacSha256::new_from_slice(key).ok().map(Self::Sha256),
        }
    }

    fn digest(&self, message: &[u8]) -> Vec<u8> {
        match self.clone() {
            Self::Sha1(mut mac) => {
                mac.update(message);
                mac.finalize().into_bytes().to_vec()
            }
            Self::Sha256(mut mac) => {
                mac.update(message);
                mac.finalize().into_bytes().to_vec()
            }
        }
    }

    /// 常量时间比较
    fn verify(&self, message: &[u8], tag: &[u8]) -> bool {
        match self.clone() {
            Self::Sha1(mut mac) => {
                mac.update(message);
                mac.verify_slice(tag).is_ok()
            }
            Self::Sha256(mut mac) => {
                mac.update(message);
                mac.verify_slice(tag).is_ok()
            }
        }
    }
}

/// 密钥环
///
/// 构造后不可变，可通过 `Arc` 在多个签名器之间无锁共享。
#[derive(Clone)]
pub struct KeyRing {
    keys: Vec<KeyMac>,
    algorithm: SignatureAlgorithm,
}

impl KeyRing {
    /// 使用默认算法（SHA-1）创建密钥环
    ///
    /// 密钥列表为空时返回 [`CookieError::EmptyKeyRing`]。
    ///
    /// ```rust
    /// use signed_cookies::KeyRing;
    ///
    /// let ring = KeyRing::new(["A", "B"]).unwrap();
    /// assert_eq!(ring.sign("jt=myCookie"), "kb_bqGBtcVmP5oU8CU7lTqQCRwY");
    /// ```
    pub fn new<I, K>(keys: I) -> CookieResult<Self>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<[u8]>,
    {
        Self::with_algorithm(keys, SignatureAlgorithm::default())
    }

    /// 使用指定算法创建密钥环
    pub fn with_algorithm<I, K>(keys: I, algorithm: SignatureAlgorithm) -> CookieResult<Self>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<[u8]>,
    {
        let keys = keys
            .into_iter()
            .enumerate()
            .map(|(index, key)| {
                KeyMac::new(algorithm, key.as_ref()).ok_or(CookieError::InvalidKey { index })
            })
            .collect::<CookieResult<Vec<_>>>()?;

        if keys.is_empty() {
            return Err(CookieError::EmptyKeyRing);
        }

        Ok(Self { keys, algorithm })
    }

    /// 使用主密钥签名
    pub fn sign(&self, message: &str) -> String {
        URL_SAFE_NO_PAD.encode(self.keys[0].digest(message.as_bytes()))
    }

    /// 查找能验证该签名的第一个密钥索引
    ///
    /// 无法解码的签名或没有任何密钥匹配时返回 `None`。
    pub fn index(&self, message: &str, signature: &str) -> Option<usize> {
        let tag = URL_SAFE_NO_PAD.decode(signature).ok()?;
        self.keys
            .iter()
            .position(|key| key.verify(message.as_bytes(), &tag))
    }

    /// 签名是否可被任一密钥验证
    pub fn verify(&self, message: &str, signature: &str) -> bool {
        self.index(message, signature).is_some()
    }

    /// 密钥数量
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// 签名算法
    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }
}

impl std::fmt::Debug for KeyRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRing")
            .field("keys", &format_args!("[{} redacted]", self.keys.len()))
            .field("algorithm", &self.algorithm)
            .finish()
    }
}
