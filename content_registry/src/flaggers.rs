//! Bounded flagger sets.

use content_registry_integrity::{AgentId, RegistryError, MAX_FLAGGERS};
use serde::{Deserialize, Serialize};

/// Ordered set of identities that flagged one record.
///
/// Insertion order is preserved. The set never grows past its capacity: a
/// full set refuses new members with [`RegistryError::FlaggerOverflow`]
/// instead of dropping old ones. Members are never removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlaggerSet {
    members: Vec<AgentId>,
    /// Not persisted; a deserialized set always gets the default cap.
    #[serde(skip, default = "default_capacity")]
    capacity: usize,
}

fn default_capacity() -> usize {
    MAX_FLAGGERS
}

impl FlaggerSet {
    pub fn new() -> Self {
        Self::with_capacity(MAX_FLAGGERS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            members: Vec::new(),
            capacity,
        }
    }

    pub fn contains(&self, agent: &AgentId) -> bool {
        self.members.contains(agent)
    }

    /// Check that `agent` could be inserted, without inserting it.
    pub fn check_insert(&self, agent: &AgentId) -> Result<(), RegistryError> {
        if self.contains(agent) {
            return Err(RegistryError::AlreadyFlagged);
        }
        if self.is_full() {
            return Err(RegistryError::FlaggerOverflow);
        }
        Ok(())
    }

    /// Append `agent`, returning the new size.
    pub fn try_insert(&mut self, agent: AgentId) -> Result<usize, RegistryError> {
        self.check_insert(&agent)?;
        self.members.push(agent);
        Ok(self.members.len())
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &AgentId> {
        self.members.iter()
    }

    pub fn to_vec(&self) -> Vec<AgentId> {
        self.members.clone()
    }
}

impl Default for FlaggerSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_duplicates() {
        let mut set = FlaggerSet::new();
        assert_eq!(set.try_insert(AgentId::new("a")), Ok(1));
        assert_eq!(
            set.try_insert(AgentId::new("a")),
            Err(RegistryError::AlreadyFlagged)
        );
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_preserves_insertion_order() {
        let mut set = FlaggerSet::new();
        for name in ["carol", "alice", "bob"] {
            set.try_insert(AgentId::new(name)).unwrap();
        }
        let names: Vec<&str> = set.iter().map(AgentId::as_str).collect();
        assert_eq!(names, vec!["carol", "alice", "bob"]);
    }

    #[test]
    fn test_overflow_fails_closed() {
        let mut set = FlaggerSet::with_capacity(2);
        set.try_insert(AgentId::new("a")).unwrap();
        set.try_insert(AgentId::new("b")).unwrap();
        assert!(set.is_full());
        assert_eq!(
            set.try_insert(AgentId::new("c")),
            Err(RegistryError::FlaggerOverflow)
        );
        assert_eq!(set.len(), 2);
        assert!(!set.contains(&AgentId::new("c")));
    }

    #[test]
    fn test_duplicate_reported_before_overflow() {
        let mut set = FlaggerSet::with_capacity(1);
        set.try_insert(AgentId::new("a")).unwrap();
        assert_eq!(
            set.check_insert(&AgentId::new("a")),
            Err(RegistryError::AlreadyFlagged)
        );
    }

    #[test]
    fn test_deserialized_set_ignores_stored_capacity() {
        let json = r#"{"members":["a","b"],"capacity":1000}"#;
        let set: FlaggerSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.capacity(), MAX_FLAGGERS);

        let encoded = serde_json::to_value(&set).unwrap();
        assert!(encoded.get("capacity").is_none());
    }

    #[test]
    fn test_default_capacity_is_one_hundred() {
        let mut set = FlaggerSet::default();
        for i in 0..MAX_FLAGGERS {
            set.try_insert(AgentId::new(format!("agent-{i}"))).unwrap();
        }
        assert_eq!(
            set.try_insert(AgentId::new("one-too-many")),
            Err(RegistryError::FlaggerOverflow)
        );
    }
}
