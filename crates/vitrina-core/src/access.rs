//! Admin allow-list check.

use std::collections::HashSet;

/// Flat allow-list of admin user ids, fixed at startup.
#[derive(Debug, Clone, Default)]
pub struct AccessGate {
    admins: HashSet<i64>,
}

impl AccessGate {
    pub fn new(admins: impl IntoIterator<Item = i64>) -> Self {
        Self {
            admins: admins.into_iter().collect(),
        }
    }

    pub fn authorize(&self, user_id: i64) -> bool {
        self.admins.contains(&user_id)
    }

    pub fn admin_count(&self) -> usize {
        self.admins.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_membership() {
        let gate = AccessGate::new([111, 222]);
        assert!(gate.authorize(111));
        assert!(!gate.authorize(333));
        assert_eq!(gate.admin_count(), 2);
    }

    #[test]
    fn test_empty_gate_denies_everyone() {
        assert!(!AccessGate::default().authorize(0));
    }
}
