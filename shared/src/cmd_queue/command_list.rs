use std::collections::VecDeque;

use crate::{cmd_queue::error::CmdQueueError, types::PacketId};

/// The in-flight entries of one command type, newest at the front.
/// Entries are addressed by the packet id stamped at enqueue time.
pub struct CommandList<T> {
    list: VecDeque<(PacketId, T)>,
}

impl<T> Default for CommandList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CommandList<T> {
    pub fn new() -> Self {
        Self {
            list: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn contains(&self, id: &PacketId) -> bool {
        self.list.iter().any(|(old_id, _)| old_id == id)
    }

    /// Links `item` at the head of the list.
    /// Returns an error if the ID already exists.
    pub fn try_push_front(&mut self, id: PacketId, item: T) -> Result<(), CmdQueueError> {
        if self.contains(&id) {
            return Err(CmdQueueError::DuplicateId { id });
        }
        self.list.push_front((id, item));
        Ok(())
    }

    /// Links `item` at the head of the list.
    ///
    /// # Panics
    ///
    /// Panics if a duplicate ID already exists in the list.
    pub fn push_front(&mut self, id: PacketId, item: T) {
        self.try_push_front(id, item)
            .expect("duplicates are not allowed in CommandList")
    }

    pub fn get(&self, id: &PacketId) -> Option<&T> {
        self.list
            .iter()
            .find(|(old_id, _)| old_id == id)
            .map(|(_, item)| item)
    }

    pub fn get_mut(&mut self, id: &PacketId) -> Option<&mut T> {
        self.list
            .iter_mut()
            .find(|(old_id, _)| old_id == id)
            .map(|(_, item)| item)
    }

    /// Unlinks the first entry carrying `id`.
    pub fn remove(&mut self, id: &PacketId) -> Option<T> {
        let index = self.list.iter().position(|(old_id, _)| old_id == id)?;
        self.list.remove(index).map(|(_, item)| item)
    }

    /// Id of the oldest entry matching `predicate`.
    pub fn oldest_where(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<PacketId> {
        self.list
            .iter()
            .rev()
            .find(|(_, item)| predicate(item))
            .map(|(id, _)| *id)
    }

    /// Iterates newest first.
    pub fn iter(&self) -> impl Iterator<Item = &(PacketId, T)> {
        self.list.iter()
    }

    /// Unlinks every entry, oldest first.
    pub fn drain_oldest_first(&mut self) -> Vec<(PacketId, T)> {
        let mut drained: Vec<(PacketId, T)> = self.list.drain(..).collect();
        drained.reverse();
        drained
    }
}
