//! Room Table Storage
//!
//! Pure storage behind the [`Registry`](super::Registry); rooms are never
//! addressed from outside a single registry operation. A room tracks its
//! member set and the subset that has signaled readiness, and maintains
//! `ready ⊆ members` at all times.

use std::collections::BTreeSet;

use super::ConnId;

/// One named room: the connections in it and the ones marked ready.
#[derive(Debug, Default)]
pub struct Room {
    members: BTreeSet<ConnId>,
    ready: BTreeSet<ConnId>,
}

impl Room {
    /// Create an empty room.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to the member set.
    pub fn insert(&mut self, conn: ConnId) {
        self.members.insert(conn);
    }

    /// Remove a connection from both the member and ready sets.
    pub fn remove(&mut self, conn: &ConnId) {
        self.members.remove(conn);
        self.ready.remove(conn);
    }

    /// Mark a member ready. Ignored for non-members, which keeps the
    /// ready set a subset of the member set.
    pub fn mark_ready(&mut self, conn: ConnId) {
        if self.members.contains(&conn) {
            self.ready.insert(conn);
        }
    }

    /// Whether the room has no members left.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether every member has signaled readiness.
    pub fn all_ready(&self) -> bool {
        !self.members.is_empty() && self.ready.len() == self.members.len()
    }

    /// Whether this connection has signaled readiness.
    pub fn is_ready(&self, conn: &ConnId) -> bool {
        self.ready.contains(conn)
    }

    /// Whether this connection is a member.
    pub fn contains(&self, conn: &ConnId) -> bool {
        self.members.contains(conn)
    }

    /// Iterate over the member set.
    pub fn members(&self) -> impl Iterator<Item = &ConnId> {
        self.members.iter()
    }

    /// Number of members.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Number of ready members.
    pub fn ready_count(&self) -> usize {
        self.ready.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_requires_membership() {
        let mut room = Room::new();
        let outsider = ConnId::new();

        room.mark_ready(outsider);
        assert_eq!(room.ready_count(), 0);
        assert!(!room.is_ready(&outsider));
    }

    #[test]
    fn test_remove_clears_both_sets() {
        let mut room = Room::new();
        let conn = ConnId::new();

        room.insert(conn);
        room.mark_ready(conn);
        assert!(room.all_ready());

        room.remove(&conn);
        assert!(room.is_empty());
        assert_eq!(room.ready_count(), 0);
    }

    #[test]
    fn test_all_ready_false_for_empty_room() {
        let room = Room::new();
        assert!(!room.all_ready());
    }

    #[test]
    fn test_all_ready_tracks_each_member() {
        let mut room = Room::new();
        let a = ConnId::new();
        let b = ConnId::new();

        room.insert(a);
        room.insert(b);
        assert!(!room.all_ready());

        room.mark_ready(a);
        assert!(!room.all_ready());

        room.mark_ready(b);
        assert!(room.all_ready());
    }
}
