#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RegistryMetrics {
    pub rules_registered: usize,
    pub entries_registered: usize,
    pub merged_registrations: usize,
}

impl RegistryMetrics {
    pub fn record_rule(&mut self, entries: usize) {
        self.rules_registered += 1;
        self.entries_registered += entries;
    }

    pub fn record_merge(&mut self, entries: usize) {
        self.merged_registrations += 1;
        self.entries_registered += entries;
    }
}
