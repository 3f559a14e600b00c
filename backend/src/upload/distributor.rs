// src/upload/distributor.rs

/// Records handed to one agent from one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionAssignment<A, T> {
    pub agent: A,
    pub items: Vec<T>,
}

/// Per-agent share sizes for `n` records over `k` agents.
///
/// The first `n % k` agents get one extra record. Returns an empty vec when
/// `k == 0`.
pub fn share_sizes(n: usize, k: usize) -> Vec<usize> {
    if k == 0 {
        return Vec::new();
    }
    let base = n / k;
    let remainder = n % k;
    (0..k).map(|i| base + usize::from(i < remainder)).collect()
}

/// Split `records` into contiguous, order-preserving chunks, one per agent.
///
/// Concatenating the returned `items` in agent order gives back `records`
/// exactly. Every agent appears once, even when its share is empty. With no
/// agents nothing is returned and the records are dropped; callers must check
/// the roster first.
pub fn distribute<A, T>(records: Vec<T>, agents: &[A]) -> Vec<DistributionAssignment<A, T>>
where
    A: Clone,
{
    let sizes = share_sizes(records.len(), agents.len());
    let mut remaining = records.into_iter();

    agents
        .iter()
        .zip(sizes)
        .map(|(agent, size)| DistributionAssignment {
            agent: agent.clone(),
            items: remaining.by_ref().take(size).collect(),
        })
        .collect()
}
