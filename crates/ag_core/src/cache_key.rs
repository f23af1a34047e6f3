//! 缓存键派生
//!
//! 将 (命名空间, 有序字段) 转换为稳定、可用于文件名/URL 的字母数字字符串。
//! 字段顺序由调用方决定，派生器从不排序。

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// 字段归一化方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// 仅转义分隔符与反斜杠，字段边界保持无歧义
    #[default]
    Escape,
    /// 转义 + 去除首尾空白 + 小写
    CaseFold,
}

/// 键编码方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyEncoding {
    /// 标准 base64 后剔除非字母数字字符
    #[default]
    Base64,
    /// 命名空间前缀 + SHA-256 十六进制摘要 (定长)
    Sha256,
}

/// 缓存键派生器
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheKeyDeriver {
    /// 字段分隔符
    pub separator: char,
    /// 归一化方式
    pub normalization: Normalization,
    /// 编码方式
    pub encoding: KeyEncoding,
}

impl Default for CacheKeyDeriver {
    fn default() -> Self {
        Self {
            separator: '|',
            normalization: Normalization::Escape,
            encoding: KeyEncoding::Base64,
        }
    }
}

impl CacheKeyDeriver {
    pub fn new(normalization: Normalization, encoding: KeyEncoding) -> Self {
        Self {
            normalization,
            encoding,
            ..Default::default()
        }
    }

    /// 派生缓存键
    pub fn derive<S: AsRef<str>>(&self, namespace: &str, fields: &[S]) -> String {
        let canonical = self.canonical(namespace, fields);
        match self.encoding {
            KeyEncoding::Base64 => STANDARD
                .encode(canonical.as_bytes())
                .chars()
                .filter(char::is_ascii_alphanumeric)
                .collect(),
            KeyEncoding::Sha256 => {
                let digest = Sha256::digest(canonical.as_bytes());
                let prefix: String = namespace
                    .chars()
                    .filter(char::is_ascii_alphanumeric)
                    .collect();
                let hex: String = digest.iter().map(|byte| format!("{byte:02x}")).collect();
                format!("{prefix}{hex}")
            }
        }
    }

    /// 编码前的规范串: 命名空间与字段依次归一化后以分隔符连接
    pub fn canonical<S: AsRef<str>>(&self, namespace: &str, fields: &[S]) -> String {
        let mut canonical = self.normalize(namespace);
        for field in fields {
            canonical.push(self.separator);
            canonical.push_str(&self.normalize(field.as_ref()));
        }
        canonical
    }

    fn normalize(&self, value: &str) -> String {
        let value = match self.normalization {
            Normalization::Escape => value.to_string(),
            Normalization::CaseFold => value.trim().to_lowercase(),
        };

        let mut escaped = String::with_capacity(value.len());
        for c in value.chars() {
            if c == '\\' || c == self.separator {
                escaped.push('\\');
            }
            escaped.push(c);
        }
        escaped
    }
}

/// 使用默认派生器 (转义归一化 + base64 编码)
pub fn derive_key<S: AsRef<str>>(namespace: &str, fields: &[S]) -> String {
    CacheKeyDeriver::default().derive(namespace, fields)
}
