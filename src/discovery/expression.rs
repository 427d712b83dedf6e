//! 过滤表达式缓存
//!
//! 启动时把六个已知字段映射到统一签名的谓词函数，
//! 配置的过滤器在构造时一次性解析到谓词，之后每条记录只做函数调用。

use std::collections::HashMap;

use tracing::debug;

use crate::discovery::filter::{Filter, FilterField};
use crate::discovery::record::DiscoveredRecord;
use crate::error::{DiscoveryError, Result};

/// 过滤谓词
pub type Predicate = fn(&Filter, &DiscoveredRecord) -> bool;

fn contains_any(filter: &Filter, field: &str) -> bool {
    filter.values().iter().any(|value| field.contains(value.as_str()))
}

fn match_id(filter: &Filter, record: &DiscoveredRecord) -> bool {
    contains_any(filter, &record.id)
}

fn match_image(filter: &Filter, record: &DiscoveredRecord) -> bool {
    contains_any(filter, &record.image)
}

fn match_image_id(filter: &Filter, record: &DiscoveredRecord) -> bool {
    contains_any(filter, &record.image_id)
}

fn match_state(filter: &Filter, record: &DiscoveredRecord) -> bool {
    contains_any(filter, &record.state)
}

fn match_names(filter: &Filter, record: &DiscoveredRecord) -> bool {
    filter.values().iter().any(|value| {
        record
            .names
            .iter()
            .any(|name| name.contains(value.as_str()))
    })
}

/// 每个 `key:value` 都必须命中；形状不对的值忽略
fn match_labels(filter: &Filter, record: &DiscoveredRecord) -> bool {
    filter.values().iter().all(|value| {
        let parts: Vec<&str> = value.split(':').filter(|part| !part.is_empty()).collect();
        match parts.as_slice() {
            [key, expected] => record
                .labels
                .get(*key)
                .is_some_and(|actual| actual.contains(*expected)),
            _ => true,
        }
    })
}

fn predicate_for(field: FilterField) -> Predicate {
    match field {
        FilterField::Id => match_id,
        FilterField::Image => match_image,
        FilterField::ImageId => match_image_id,
        FilterField::State => match_state,
        FilterField::Names => match_names,
        FilterField::Labels => match_labels,
    }
}

struct CompiledFilter {
    filter: Filter,
    predicate: Option<Predicate>,
}

/// 过滤引擎
///
/// 只读，可在并发的 lookup 之间共享。
pub struct FilterEngine {
    table: HashMap<&'static str, Predicate>,
    compiled: Vec<CompiledFilter>,
}

impl FilterEngine {
    /// 构建谓词表并解析过滤器
    pub fn new(filters: Vec<Filter>) -> Self {
        let table: HashMap<&'static str, Predicate> = FilterField::ALL
            .into_iter()
            .map(|field| (field.as_str(), predicate_for(field)))
            .collect();

        let compiled = filters
            .into_iter()
            .map(|filter| {
                let key = filter.name().trim().to_ascii_lowercase();
                let predicate = table.get(key.as_str()).copied();
                CompiledFilter { filter, predicate }
            })
            .collect();

        debug!(fields = table.len(), "Simple expression cache successfully built");

        Self { table, compiled }
    }

    /// 已注册的字段数量
    pub fn registered_fields(&self) -> usize {
        self.table.len()
    }

    /// 是否没有配置任何过滤器
    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    /// 检查所有过滤器都引用了已注册字段
    pub fn validate(&self) -> Result<()> {
        match self.compiled.iter().find(|compiled| compiled.predicate.is_none()) {
            Some(unknown) => Err(DiscoveryError::unknown_filter_field(unknown.filter.name())),
            None => Ok(()),
        }
    }

    /// 记录是否满足全部过滤器
    pub fn matches(&self, record: &DiscoveredRecord) -> Result<bool> {
        for compiled in &self.compiled {
            let predicate = compiled
                .predicate
                .ok_or_else(|| DiscoveryError::unknown_filter_field(compiled.filter.name()))?;
            if !predicate(&compiled.filter, record) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// 保留满足全部过滤器的记录，顺序不变
    pub fn apply(&self, records: Vec<DiscoveredRecord>) -> Result<Vec<DiscoveredRecord>> {
        let mut matched = Vec::with_capacity(records.len());
        for record in records {
            if self.matches(&record)? {
                matched.push(record);
            }
        }
        Ok(matched)
    }
}
