use std::collections::HashMap;

use crate::editor::id::EntityId;

#[derive(Debug, Clone, PartialEq)]
pub struct Node<T> {
    pub item: T,
    pub is_open: bool,
}

/// Ordered collection of expandable nodes addressed by stable id.
///
/// Shared by the create, edit and read flows: the arena holds the entities,
/// `order` holds display order, and every node carries its own open flag.
#[derive(Debug, Clone)]
pub struct Expandable<T> {
    order: Vec<EntityId>,
    nodes: HashMap<EntityId, Node<T>>,
}

impl<T> Default for Expandable<T> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            nodes: HashMap::new(),
        }
    }
}

impl<T: PartialEq> PartialEq for Expandable<T> {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order && self.nodes == other.nodes
    }
}

impl<T> Expandable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends at the end. An id already present is replaced in place and
    /// keeps its position.
    pub fn push(&mut self, id: EntityId, item: T, is_open: bool) {
        if !self.nodes.contains_key(&id) {
            self.order.push(id.clone());
        }
        self.nodes.insert(id, Node { item, is_open });
    }

    pub fn remove(&mut self, id: &EntityId) -> Option<T> {
        let node = self.nodes.remove(id)?;
        self.order.retain(|existing| existing != id);
        Some(node.item)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: &EntityId) -> Option<&T> {
        self.nodes.get(id).map(|node| &node.item)
    }

    pub fn get_mut(&mut self, id: &EntityId) -> Option<&mut T> {
        self.nodes.get_mut(id).map(|node| &mut node.item)
    }

    pub fn is_open(&self, id: &EntityId) -> Option<bool> {
        self.nodes.get(id).map(|node| node.is_open)
    }

    pub fn set_open(&mut self, id: &EntityId, is_open: bool) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.is_open = is_open;
                true
            }
            None => false,
        }
    }

    /// Flips one node; returns the new state.
    pub fn toggle(&mut self, id: &EntityId) -> Option<bool> {
        let node = self.nodes.get_mut(id)?;
        node.is_open = !node.is_open;
        Some(node.is_open)
    }

    pub fn set_all_open(&mut self, is_open: bool) {
        for node in self.nodes.values_mut() {
            node.is_open = is_open;
        }
    }

    pub fn position(&self, id: &EntityId) -> Option<usize> {
        self.order.iter().position(|existing| existing == id)
    }

    pub fn id_at(&self, index: usize) -> Option<&EntityId> {
        self.order.get(index)
    }

    pub fn ids(&self) -> &[EntityId] {
        &self.order
    }

    /// Nodes in display order.
    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &Node<T>)> {
        self.order
            .iter()
            .filter_map(move |id| self.nodes.get(id).map(|node| (id, node)))
    }

    /// Items in display order.
    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.iter().map(|(_, node)| &node.item)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.nodes.values_mut().map(|node| &mut node.item)
    }
}

impl<T> FromIterator<(EntityId, T, bool)> for Expandable<T> {
    fn from_iter<I: IntoIterator<Item = (EntityId, T, bool)>>(iter: I) -> Self {
        let mut collection = Expandable::new();
        for (id, item, is_open) in iter {
            collection.push(id, item, is_open);
        }
        collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Expandable<&'static str> {
        vec![
            (EntityId::persisted("a"), "alpha", false),
            (EntityId::persisted("b"), "beta", true),
            (EntityId::persisted("c"), "gamma", false),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn keeps_display_order_across_removals() {
        let mut list = sample();
        assert_eq!(list.remove(&EntityId::persisted("b")), Some("beta"));
        list.push(EntityId::persisted("d"), "delta", true);
        let items: Vec<_> = list.items().copied().collect();
        assert_eq!(items, vec!["alpha", "gamma", "delta"]);
        assert_eq!(list.position(&EntityId::persisted("d")), Some(2));
    }

    #[test]
    fn push_with_existing_id_replaces_in_place() {
        let mut list = sample();
        list.push(EntityId::persisted("a"), "ALPHA", true);
        assert_eq!(list.len(), 3);
        assert_eq!(list.id_at(0), Some(&EntityId::persisted("a")));
        assert_eq!(list.get(&EntityId::persisted("a")), Some(&"ALPHA"));
    }

    #[test]
    fn toggle_touches_only_the_addressed_node() {
        let mut list = sample();
        assert_eq!(list.toggle(&EntityId::persisted("a")), Some(true));
        assert_eq!(list.is_open(&EntityId::persisted("b")), Some(true));
        assert_eq!(list.is_open(&EntityId::persisted("c")), Some(false));
        assert_eq!(list.toggle(&EntityId::persisted("zzz")), None);
    }

    #[test]
    fn set_all_open_reaches_every_node() {
        let mut list = sample();
        list.set_all_open(true);
        assert!(list.iter().all(|(_, node)| node.is_open));
    }
}
