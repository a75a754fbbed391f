use crate::core::sanitizer::sanitize_text;
use crate::domain::model::{Pool, PoolId};
use crate::utils::error::{MixerError, Result};

/// 預設的裝置池，依序建立
pub const DEFAULT_POOL_NAMES: [&str; 3] = ["iPhone", "Samsung", "Motorola"];

/// Owns the named pools of one session, in insertion order.
///
/// Every mutation either succeeds completely or leaves the registry as it was.
#[derive(Debug, Clone, Default)]
pub struct PoolRegistry {
    pools: Vec<Pool>,
    next_id: u64,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_pools() -> Self {
        let mut registry = Self::new();
        for name in DEFAULT_POOL_NAMES {
            registry.push_pool(name.to_string());
        }
        registry
    }

    pub fn add_pool(&mut self, name: &str) -> Result<PoolId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(MixerError::InvalidPoolName {
                name: name.to_string(),
            });
        }
        if self.find_by_name(name).is_some() {
            return Err(MixerError::DuplicateName {
                name: name.to_string(),
            });
        }

        let id = self.push_pool(name.to_string());
        tracing::debug!("Added pool '{}' ({})", name, id);
        Ok(id)
    }

    pub fn remove_pool(&mut self, id: PoolId) -> Result<Pool> {
        let index = self.position(id)?;
        let removed = self.pools.remove(index);
        tracing::debug!(
            "Removed pool '{}' ({} records)",
            removed.name,
            removed.records.len()
        );
        Ok(removed)
    }

    /// 以清洗後的結果取代池內容，回傳保留的筆數
    pub fn set_records(&mut self, id: PoolId, raw_text: &str) -> Result<usize> {
        let index = self.position(id)?;
        let records = sanitize_text(raw_text);
        let kept = records.len();
        self.pools[index].records = records;
        Ok(kept)
    }

    /// Appends raw text after the existing records and re-sanitizes the whole
    /// block, so records already in the pool win duplicate ties.
    pub fn append_records(&mut self, id: PoolId, raw_text: &str) -> Result<usize> {
        let index = self.position(id)?;
        let existing = self.pools[index].records.join("\n");
        let combined = if existing.is_empty() {
            raw_text.to_string()
        } else {
            format!("{}\n{}", existing, raw_text)
        };
        self.set_records(id, &combined)
    }

    pub fn list_pools(&self) -> &[Pool] {
        &self.pools
    }

    pub fn get(&self, id: PoolId) -> Option<&Pool> {
        self.pools.iter().find(|pool| pool.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Pool> {
        self.pools.iter().find(|pool| pool.is_named(name))
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    pub fn total_records(&self) -> usize {
        self.pools.iter().map(Pool::len).sum()
    }

    fn push_pool(&mut self, name: String) -> PoolId {
        self.next_id += 1;
        let id = PoolId(self.next_id);
        self.pools.push(Pool {
            id,
            name,
            records: Vec::new(),
        });
        id
    }

    fn position(&self, id: PoolId) -> Result<usize> {
        self.pools
            .iter()
            .position(|pool| pool.id == id)
            .ok_or(MixerError::NotFound { id })
    }
}
