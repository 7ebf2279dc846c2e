//! Schema descriptor: the names of tables and columns the engine reads and
//! writes. A pure value, immutable after construction, so query-building
//! code can interpolate names without ever hard-coding them twice.

/// Names of the two tables and their columns.
///
/// `Default` matches the names given in the external interfaces section:
/// `domain_event_entry` and `snapshot_event_entry`, both with the same
/// column layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventStoreSchema {
    /// Name of the append-only domain event table.
    pub domain_event_table: String,
    /// Name of the snapshot table.
    pub snapshot_event_table: String,
}

impl Default for EventStoreSchema {
    fn default() -> Self {
        Self {
            domain_event_table: "domain_event_entry".to_string(),
            snapshot_event_table: "snapshot_event_entry".to_string(),
        }
    }
}

impl EventStoreSchema {
    /// Use the given table names, keeping the rest at their defaults.
    pub fn with_tables(domain_event_table: impl Into<String>, snapshot_event_table: impl Into<String>) -> Self {
        Self {
            domain_event_table: domain_event_table.into(),
            snapshot_event_table: snapshot_event_table.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_external_interface_names() {
        let schema = EventStoreSchema::default();
        assert_eq!(schema.domain_event_table, "domain_event_entry");
        assert_eq!(schema.snapshot_event_table, "snapshot_event_entry");
    }
}
