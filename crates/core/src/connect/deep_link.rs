//! Deep Link URL 解析模块
//!
//! 负责解析 Stepler 合作方 Deep Link，提取并校验归因参数。
//!
//! ## 功能
//!
//! - 解析 URL 并校验 host 必须为 `stepler`
//! - 按顺序提取查询参数，同名参数后者覆盖前者
//! - 验证必填参数（userId, partnerAppCampaignId, language）
//!
//! ## 使用示例
//!
//! ```rust
//! use stepler_core::connect::deep_link::parse_deep_link;
//!
//! let url = "https://stepler?userId=2&partnerAppCampaignId=12&language=en";
//! let params = parse_deep_link(url).unwrap();
//! assert_eq!(params.get("userId"), Some("2"));
//! ```

use crate::errors::DeepLinkHandlerError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use url::Url;

/// Stepler Deep Link 的 host
pub const STEPLER_HOST: &str = "stepler";

/// 用户 ID 参数名
pub const USER_ID_KEY: &str = "userId";
/// 合作方活动 ID 参数名
pub const CAMPAIGN_KEY: &str = "partnerAppCampaignId";
/// 语言参数名
pub const LANGUAGE_KEY: &str = "language";

/// 必填参数（按校验顺序）
pub const REQUIRED_FIELDS: [&str; 3] = [USER_ID_KEY, CAMPAIGN_KEY, LANGUAGE_KEY];

/// 单个查询参数
///
/// `?userId` 这类没有 `=` 的参数值为 `None`，`?userId=` 的值为空字符串。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryItem {
    pub name: String,
    pub value: Option<String>,
}

/// 解析后的查询参数
///
/// 保持首次出现的顺序，序列化为扁平 JSON 对象。
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParsedParameters(IndexMap<String, String>);

impl ParsedParameters {
    /// 按顺序折叠查询参数
    ///
    /// 有值的参数覆盖同名旧值；无值的参数移除同名旧值。
    pub fn from_items(items: impl IntoIterator<Item = QueryItem>) -> Self {
        let mut params = IndexMap::new();
        for item in items {
            match item.value {
                Some(value) => {
                    params.insert(item.name, value);
                }
                None => {
                    params.shift_remove(&item.name);
                }
            }
        }
        Self(params)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// 缺失的必填参数
    pub fn missing_required(&self) -> Vec<&'static str> {
        REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|key| !self.contains(key))
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParsedParameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_items(iter.into_iter().map(|(name, value)| QueryItem {
            name: name.into(),
            value: Some(value.into()),
        }))
    }
}

/// 提取查询参数
///
/// URL 没有查询字符串时返回 `None`；有查询字符串时返回按出现顺序解码后的参数，
/// 空片段（`a=1&&b=2`）被跳过。名称和值只做百分号解码，`+` 保持原样。
pub fn query_items(url: &Url) -> Option<Vec<QueryItem>> {
    let query = url.query()?;
    let items = query
        .split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment.split_once('=') {
            Some((name, value)) => QueryItem {
                name: percent_decode(name),
                value: Some(percent_decode(value)),
            },
            None => QueryItem {
                name: percent_decode(segment),
                value: None,
            },
        })
        .collect();
    Some(items)
}

fn percent_decode(raw: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(raw.as_bytes())).into_owned()
}

/// 解析 Deep Link URL
///
/// # 返回值
///
/// * `Ok(ParsedParameters)` - 全部查询参数（不仅是必填参数）
/// * `Err(DeepLinkHandlerError)` - `MalformedUrl`、`WrongHost` 或 `MissingParameters`
///
/// # 示例
///
/// ```rust
/// use stepler_core::connect::deep_link::parse_deep_link;
/// use stepler_core::errors::DeepLinkHandlerError;
///
/// // host 不对时，即使没有查询参数也报告 WrongHost
/// let result = parse_deep_link("http://google.com");
/// assert!(matches!(result, Err(DeepLinkHandlerError::WrongHost(_))));
///
/// // 没有查询字符串
/// let result = parse_deep_link("http://stepler");
/// assert!(matches!(result, Err(DeepLinkHandlerError::MissingParameters(_))));
/// ```
pub fn parse_deep_link(url: &str) -> Result<ParsedParameters, DeepLinkHandlerError> {
    let parsed = Url::parse(url).map_err(|e| DeepLinkHandlerError::MalformedUrl(e.to_string()))?;
    parse_url(&parsed)
}

/// 解析已经构造好的 URL
pub fn parse_url(url: &Url) -> Result<ParsedParameters, DeepLinkHandlerError> {
    // host 检查先于参数检查；host 不区分大小写
    let is_stepler = url
        .host_str()
        .is_some_and(|host| host.eq_ignore_ascii_case(STEPLER_HOST));
    if !is_stepler {
        return Err(DeepLinkHandlerError::WrongHost(
            url.host_str().map(ToString::to_string),
        ));
    }

    let items = query_items(url)
        .ok_or_else(|| DeepLinkHandlerError::MissingParameters(REQUIRED_FIELDS.to_vec()))?;
    tracing::debug!("[DeepLink] 查询参数: {:?}", items);

    let params = ParsedParameters::from_items(items);

    let missing = params.missing_required();
    if !missing.is_empty() {
        return Err(DeepLinkHandlerError::MissingParameters(missing));
    }

    tracing::debug!(
        "[DeepLink] {}={:?}, {}={:?}, {}={:?}",
        USER_ID_KEY,
        params.get(USER_ID_KEY),
        CAMPAIGN_KEY,
        params.get(CAMPAIGN_KEY),
        LANGUAGE_KEY,
        params.get(LANGUAGE_KEY)
    );

    Ok(params)
}
