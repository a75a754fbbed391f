use crate::domain::model::{Pool, PoolRole, PoolSummary};
use crate::utils::error::{MixerError, Result};

/// 未被輸出的次要池剩餘記錄
struct SecondaryQueue<'a> {
    records: &'a [String],
    next: usize,
}

impl<'a> SecondaryQueue<'a> {
    fn pop(&mut self) -> Option<&'a String> {
        let record = self.records.get(self.next)?;
        self.next += 1;
        Some(record)
    }
}

/// Weighted round-robin merge of one primary pool against every other
/// nonempty pool.
///
/// Each round emits `ceil(remaining_primary / (remaining_secondary + 1))`
/// primary records followed by one record from the next secondary pool in
/// cyclic order. The cursor survives across rounds and skips exhausted pools.
#[derive(Debug, Clone)]
pub struct Interleaver<'a> {
    primary: &'a str,
    start_cursor: usize,
}

impl<'a> Interleaver<'a> {
    pub fn new(primary: &'a str) -> Self {
        Self {
            primary,
            start_cursor: 0,
        }
    }

    /// 指定輪詢起點（對次要池數量取餘數）
    pub fn starting_at(mut self, cursor: usize) -> Self {
        self.start_cursor = cursor;
        self
    }

    pub fn run(&self, pools: &[Pool]) -> Result<Vec<String>> {
        let primary = pools
            .iter()
            .find(|pool| pool.is_named(self.primary))
            .filter(|pool| !pool.is_empty())
            .ok_or_else(|| MixerError::EmptyPrimary {
                primary: self.primary.to_string(),
            })?;

        let mut secondaries: Vec<SecondaryQueue> = pools
            .iter()
            .filter(|pool| !pool.is_named(self.primary) && !pool.is_empty())
            .map(|pool| SecondaryQueue {
                records: &pool.records,
                next: 0,
            })
            .collect();

        if secondaries.is_empty() {
            return Ok(primary.records.clone());
        }

        let mut remaining_secondary: usize = secondaries.iter().map(|q| q.records.len()).sum();
        let mut mixed = Vec::with_capacity(primary.len() + remaining_secondary);
        let mut primary_next = 0;
        let pool_count = secondaries.len();
        let mut cursor = self.start_cursor % pool_count;
        let mut rounds = 0usize;

        while primary_next < primary.len() || remaining_secondary > 0 {
            rounds += 1;
            let remaining_primary = primary.len() - primary_next;
            let quota = remaining_primary.div_ceil(remaining_secondary + 1);

            let end = (primary_next + quota).min(primary.len());
            mixed.extend(primary.records[primary_next..end].iter().cloned());
            primary_next = end;

            if remaining_secondary > 0 {
                for _ in 0..pool_count {
                    let queue = &mut secondaries[cursor];
                    cursor = (cursor + 1) % pool_count;
                    if let Some(record) = queue.pop() {
                        mixed.push(record.clone());
                        remaining_secondary -= 1;
                        break;
                    }
                }
            }
        }

        tracing::debug!(
            "Interleaved {} records from {} secondary pools against '{}' in {} rounds",
            mixed.len(),
            pool_count,
            primary.name,
            rounds
        );

        Ok(mixed)
    }
}

/// 以第一個次要池為輪詢起點進行合併
pub fn interleave(pools: &[Pool], primary: &str) -> Result<Vec<String>> {
    Interleaver::new(primary).run(pools)
}

/// 標示每個池在合併中的角色
pub fn summarize_pools(pools: &[Pool], primary: &str) -> Vec<PoolSummary> {
    pools
        .iter()
        .map(|pool| {
            let role = if pool.is_named(primary) {
                PoolRole::Primary
            } else if pool.is_empty() {
                PoolRole::Skipped
            } else {
                PoolRole::Secondary
            };
            PoolSummary {
                name: pool.name.clone(),
                records: pool.len(),
                role,
            }
        })
        .collect()
}
