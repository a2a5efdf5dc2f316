use alloc::collections::BTreeMap;

/// Maps a messaging-protocol domain number to an EVM chain id.
pub trait DomainLookup {
    fn chain_id(&self, domain: u32) -> Option<u64>;
}

/// Fixed `(domain, chain_id)` table.
#[derive(Clone, Copy, Debug)]
pub struct StaticDomains(pub &'static [(u32, u64)]);

impl DomainLookup for StaticDomains {
    fn chain_id(&self, domain: u32) -> Option<u64> {
        self.0
            .iter()
            .find(|(d, _)| *d == domain)
            .map(|(_, chain_id)| *chain_id)
    }
}

impl DomainLookup for BTreeMap<u32, u64> {
    fn chain_id(&self, domain: u32) -> Option<u64> {
        self.get(&domain).copied()
    }
}

impl<T: DomainLookup + ?Sized> DomainLookup for &T {
    fn chain_id(&self, domain: u32) -> Option<u64> {
        (**self).chain_id(domain)
    }
}
