//! 命令行定义与执行

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use clap::{Parser, Subcommand, ValueEnum};
use rand::RngCore;
use signed_cookies::{CookieOptions, MemoryReadWriter, SignatureAlgorithm};
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "cookie-sig", version, about = "Sign and verify tamper-evident cookies")]
pub struct Cli {
    /// TOML 配置文件
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// 签名密钥，可重复，第一个为主密钥（覆盖配置文件）
    #[arg(short = 'k', long = "key", global = true)]
    pub keys: Vec<String>,

    #[arg(long, value_enum, global = true)]
    pub algorithm: Option<AlgorithmArg>,

    #[arg(long, global = true)]
    pub path: Option<String>,

    #[arg(long, global = true)]
    pub domain: Option<String>,

    #[arg(long, global = true, allow_negative_numbers = true)]
    pub max_age: Option<i64>,

    #[arg(long, global = true)]
    pub secure: bool,

    #[arg(long, global = true)]
    pub http_only: bool,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlgorithmArg {
    Sha1,
    Sha256,
}

impl From<AlgorithmArg> for SignatureAlgorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Sha1 => SignatureAlgorithm::Sha1,
            AlgorithmArg::Sha256 => SignatureAlgorithm::Sha256,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 生成 Set-Cookie 头
    Sign {
        #[arg(long)]
        name: String,
        #[arg(long)]
        value: String,
        /// 不附带签名 Cookie
        #[arg(long)]
        unsigned: bool,
    },
    /// 按请求 Cookie 头验证签名
    Verify {
        #[arg(long)]
        name: String,
        /// 请求中的 Cookie 头，如 "jt=myCookie; jt.sig=..."
        #[arg(long)]
        cookie_header: String,
        #[arg(long)]
        unsigned: bool,
    },
    /// 生成新的随机密钥，用于轮换时放在密钥列表最前面
    Keygen {
        #[arg(long, default_value_t = 32)]
        bytes: usize,
    },
}

impl Cli {
    /// 合并配置文件、环境变量与命令行参数，命令行优先
    pub fn options(&self) -> Result<CookieOptions> {
        let mut options = CookieOptions::load(self.config.as_deref())
            .context("failed to load cookie configuration")?;

        if !self.keys.is_empty() {
            options.keys = self.keys.clone();
        }
        if let Some(algorithm) = self.algorithm {
            options.algorithm = algorithm.into();
        }
        if let Some(path) = &self.path {
            options.path = Some(path.clone());
        }
        if let Some(domain) = &self.domain {
            options.domain = Some(domain.clone());
        }
        if let Some(max_age) = self.max_age {
            options.max_age = Some(max_age);
        }
        options.secure |= self.secure;
        options.http_only |= self.http_only;

        tracing::debug!(?options, "resolved cookie options");
        Ok(options)
    }
}

pub fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    match &cli.command {
        Command::Sign {
            name,
            value,
            unsigned,
        } => {
            let config = cli.options()?.into_config()?;
            let mut signer = config.signer(MemoryReadWriter::new());
            let cookie = signer.create_cookie(name.as_str(), value.as_str());
            signer
                .set(&cookie, !unsigned)
                .context("failed to sign cookie")?;
            for header in signer.transport().set_cookie_headers() {
                writeln!(out, "Set-Cookie: {}", header)?;
            }
        }
        Command::Verify {
            name,
            cookie_header,
            unsigned,
        } => {
            let config = cli.options()?.into_config()?;
            let mut signer = config.signer(MemoryReadWriter::from_cookie_header(cookie_header));
            let value = signer
                .get(name, !unsigned)
                .context("failed to verify cookie")?;
            for header in signer.transport().set_cookie_headers() {
                writeln!(out, "Set-Cookie: {}", header)?;
            }
            match value {
                Some(value) => writeln!(out, "{}", value)?,
                None => bail!("cookie {} is missing or failed verification", name),
            }
        }
        Command::Keygen { bytes } => {
            if *bytes == 0 {
                bail!("key length must be positive");
            }
            let mut key = vec![0u8; *bytes];
            rand::thread_rng().fill_bytes(&mut key);
            writeln!(out, "{}", URL_SAFE_NO_PAD.encode(&key))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ATTRS: &str = "; Path=/; Domain=aslant.site; Max-Age=3600; HttpOnly; Secure";

    fn run_args(args: &[&str]) -> Result<String> {
        let cli = Cli::try_parse_from(args)?;
        let mut out = Vec::new();
        run(cli, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    fn fixture_args<'a>(tail: &[&'a str]) -> Vec<&'a str> {
        let mut args = vec![
            "cookie-sig",
            "-k",
            "A",
            "-k",
            "B",
            "--path",
            "/",
            "--domain",
            "aslant.site",
            "--max-age",
            "3600",
            "--secure",
            "--http-only",
        ];
        args.extend_from_slice(tail);
        args
    }

    #[test]
    fn test_sign_prints_pair() {
        let output = run_args(&fixture_args(&["sign", "--name", "jt", "--value", "myCookie"])).unwrap();
        assert_eq!(
            output,
            format!(
                "Set-Cookie: jt=myCookie{a}\nSet-Cookie: jt.sig=kb_bqGBtcVmP5oU8CU7lTqQCRwY{a}\n",
                a = ATTRS
            )
        );
    }

    #[test]
    fn test_verify_rotated_signature() {
        let old = signed_cookies::KeyRing::new(["B"]).unwrap().sign("jt=myCookie");
        let header = format!("jt=myCookie; jt.sig={}", old);
        let output = run_args(&fixture_args(&[
            "verify",
            "--name",
            "jt",
            "--cookie-header",
            header.as_str(),
        ]))
        .unwrap();
        assert_eq!(
            output,
            format!("Set-Cookie: jt.sig=kb_bqGBtcVmP5oU8CU7lTqQCRwY{}\nmyCookie\n", ATTRS)
        );
    }

    #[test]
    fn test_verify_forged_signature_fails() {
        let err = run_args(&fixture_args(&[
            "verify",
            "--name",
            "jt",
            "--cookie-header",
            "jt=myCookie; jt.sig=ABCD",
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("failed verification"));
    }

    #[test]
    fn test_sign_without_keys_fails() {
        let cli = Cli::try_parse_from(["cookie-sig", "sign", "--name", "jt", "--value", "x"]).unwrap();
        let err = run(cli, &mut Vec::new()).unwrap_err();
        assert!(err
            .chain()
            .any(|cause| cause.to_string().contains("no keys are configured")));
    }

    #[test]
    fn test_config_file_and_flag_override() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "keys = [\"old\"]\npath = \"/app\"\nhttp_only = true").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = Cli::try_parse_from([
            "cookie-sig",
            "--config",
            path.as_str(),
            "-k",
            "new",
            "--domain",
            "example.com",
            "keygen",
        ])
        .unwrap();
        let options = cli.options().unwrap();

        assert_eq!(options.keys, vec!["new".to_string()]);
        assert_eq!(options.path.as_deref(), Some("/app"));
        assert_eq!(options.domain.as_deref(), Some("example.com"));
        assert!(options.http_only);
        assert!(!options.secure);
    }

    #[test]
    fn test_keygen_length() {
        let output = run_args(&["cookie-sig", "keygen", "--bytes", "30"]).unwrap();
        let key = output.trim_end();
        assert_eq!(key.len(), 40);
        assert_eq!(URL_SAFE_NO_PAD.decode(key).unwrap().len(), 30);
    }

    #[test]
    fn test_keygen_zero_bytes_fails() {
        assert!(run_args(&["cookie-sig", "keygen", "--bytes", "0"]).is_err());
    }

    #[test]
    fn test_algorithm_flag() {
        let cli = Cli::try_parse_from(["cookie-sig", "--algorithm", "sha256", "keygen"]).unwrap();
        assert_eq!(cli.algorithm, Some(AlgorithmArg::Sha256));
        assert_eq!(
            SignatureAlgorithm::from(AlgorithmArg::Sha256),
            SignatureAlgorithm::Sha256
        );
    }
}
