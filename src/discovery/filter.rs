//! 容器过滤器定义与解析

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, de};

use crate::error::{DiscoveryError, Result};

/// 可过滤字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterField {
    /// 容器 / 任务 ID
    Id,
    /// 镜像引用
    Image,
    /// 镜像摘要
    ImageId,
    /// 生命周期状态
    State,
    /// 名称
    Names,
    /// 标签（`key:value` 形式）
    Labels,
}

impl FilterField {
    /// 所有已知字段
    pub const ALL: [FilterField; 6] = [
        FilterField::Id,
        FilterField::Image,
        FilterField::ImageId,
        FilterField::State,
        FilterField::Names,
        FilterField::Labels,
    ];

    /// 序列化名称（小写）
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterField::Id => "id",
            FilterField::Image => "image",
            FilterField::ImageId => "imageid",
            FilterField::State => "state",
            FilterField::Names => "names",
            FilterField::Labels => "labels",
        }
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterField {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self> {
        FilterField::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DiscoveryError::unknown_filter_field(s))
    }
}

/// 容器过滤器
///
/// `name` 保留配置中的原始写法，匹配时大小写不敏感。
/// `values` 在构造后永不为空。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Filter {
    name: String,
    values: Vec<String>,
}

impl Filter {
    /// 创建过滤器，空白值会被丢弃；丢弃后没有剩余值则报配置错误
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DiscoveryError::invalid_config(
                "Container filter name cannot be empty",
            ));
        }

        let values: Vec<String> = values
            .into_iter()
            .map(Into::into)
            .filter(|value: &String| !value.trim().is_empty())
            .collect();
        if values.is_empty() {
            return Err(DiscoveryError::invalid_config(format!(
                "Container filter '{}' has no values",
                name
            )));
        }

        Ok(Self { name, values })
    }

    /// 单值过滤器
    pub fn single(name: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        Self::new(name, [value.into()])
    }

    /// 过滤器名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 过滤值
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// 反序列化的中间形态，统一经过 `Filter::new` 校验
#[derive(Deserialize)]
struct RawFilter {
    name: String,
    #[serde(default)]
    values: Vec<String>,
}

impl<'de> Deserialize<'de> for Filter {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawFilter::deserialize(deserializer)?;
        Filter::new(raw.name, raw.values).map_err(de::Error::custom)
    }
}

/// 解析序列化的过滤器列表
///
/// 格式：`name=v1,v2;name2=v3`，空段跳过。
/// 某段不是恰好一个 `=` 时返回指明该段的配置错误。
pub fn parse_filters(filters: &str) -> Result<Vec<Filter>> {
    let mut parsed = Vec::new();

    for segment in filters.split(';') {
        if segment.is_empty() {
            continue;
        }

        let pair: Vec<&str> = segment.split('=').collect();
        if pair.len() != 2 {
            return Err(DiscoveryError::malformed_filter(segment));
        }

        let filter = Filter::new(pair[0].trim(), pair[1].split(',').map(str::trim))
            .map_err(|_| DiscoveryError::malformed_filter(segment))?;
        parsed.push(filter);
    }

    Ok(parsed)
}
