//! The node table.
//!
//! A [`Stage`] owns every presentable known to a navigator and records the
//! logical navigation state between them:
//!
//! - **Ownership**: each node has at most one owner; removing a node removes
//!   everything it owns.
//! - **Parent links**: non-owning back-references set when a node is shown by
//!   another. Last registration wins. Links to removed nodes simply go stale.
//! - **Display state**: each node can host a navigation stack (whose first
//!   entry is its root content) and present at most one node modally.
//!
//! Nothing here calls presentable hooks; the navigator does that around the
//! mutations.

use wayfinder_core::{NodeId, Presentable};

struct Node {
    presentable: Box<dyn Presentable>,
    owner: Option<NodeId>,
    owned: Vec<NodeId>,
    parent: Option<NodeId>,
    /// Entries displayed by this node; `stack[0]` is its root content.
    stack: Vec<NodeId>,
    /// Node this one presents modally.
    modal: Option<NodeId>,
    /// Node presenting this one modally.
    presenter: Option<NodeId>,
    /// Node whose stack contains this one.
    host: Option<NodeId>,
    visible: bool,
    /// Built from a factory; released once no longer displayed.
    transient: bool,
}

impl Node {
    fn new(presentable: Box<dyn Presentable>, owner: Option<NodeId>) -> Self {
        Self {
            presentable,
            owner,
            owned: Vec::new(),
            parent: None,
            stack: Vec::new(),
            modal: None,
            presenter: None,
            host: None,
            visible: false,
            transient: false,
        }
    }
}

/// Generational table of presentables plus their navigation state.
#[derive(Default)]
pub struct Stage {
    nodes: Vec<Option<Node>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    live: usize,
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("live", &self.live)
            .field("slots", &self.nodes.len())
            .finish()
    }
}

impl Stage {
    /// Create an empty stage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether no node is live.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Whether `id` refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Borrow the presentable at `id`.
    pub fn get(&self, id: NodeId) -> Option<&dyn Presentable> {
        self.node(id).map(|node| &*node.presentable)
    }

    /// Mutably borrow the presentable at `id`.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut dyn Presentable> {
        self.node_mut(id).map(|node| &mut *node.presentable)
    }

    /// Borrow the presentable at `id` as a `T`.
    pub fn downcast_ref<T: Presentable>(&self, id: NodeId) -> Option<&T> {
        self.get(id)?.downcast_ref::<T>()
    }

    /// Mutably borrow the presentable at `id` as a `T`.
    pub fn downcast_mut<T: Presentable>(&mut self, id: NodeId) -> Option<&mut T> {
        self.get_mut(id)?.downcast_mut::<T>()
    }

    /// Registered parent of `id`, if any.
    ///
    /// The parent may have been removed since; check with [`Stage::contains`].
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    /// Owner of `id`; `None` for top-level nodes.
    pub fn owner(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.owner
    }

    /// Nodes owned by `id`.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |node| node.owned.as_slice())
    }

    /// Navigation stack displayed by `id`.
    pub fn stack(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |node| node.stack.as_slice())
    }

    /// Node presented modally by `id`.
    pub fn modal(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.modal
    }

    /// Node presenting `id` modally.
    pub fn presenter(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.presenter
    }

    /// Node whose stack contains `id`.
    pub fn host(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.host
    }

    /// Whether `id` has been activated as a visible container.
    pub fn is_visible(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|node| node.visible)
    }

    /// Whether `id` was instantiated from a unit factory.
    pub fn is_transient(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|node| node.transient)
    }

    /// Whether `id` sits in some stack or is presented by some node.
    pub fn is_displayed(&self, id: NodeId) -> bool {
        self.node(id)
            .is_some_and(|node| node.host.is_some() || node.presenter.is_some())
    }

    /// Resolve the unit that is actually displayed for `id`.
    ///
    /// Follows [`Presentable::root_unit`] until a node displays itself. Stale or
    /// cyclic indirections stop at the last live node.
    pub fn root_unit(&self, id: NodeId) -> NodeId {
        let mut current = id;
        for _ in 0..self.live.max(1) {
            match self.get(current).and_then(|p| p.root_unit()) {
                Some(next) if next != current && self.contains(next) => current = next,
                _ => break,
            }
        }
        current
    }

    /// The child currently on top of `id`'s display: its modal if any, else
    /// the top of its stack.
    pub fn active_child(&self, id: NodeId) -> Option<NodeId> {
        let unit = self.root_unit(id);
        self.modal(unit)
            .or_else(|| self.stack(unit).last().copied())
            .filter(|&child| child != id && child != unit)
    }

    // ------------------------------------------------------------------------
    // Mutation (navigator only)
    // ------------------------------------------------------------------------

    pub(crate) fn insert(
        &mut self,
        owner: Option<NodeId>,
        presentable: Box<dyn Presentable>,
    ) -> NodeId {
        let owner = owner.filter(|&owner| self.contains(owner));
        let node = Node::new(presentable, owner);
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(node);
            (idx, generation)
        } else {
            self.nodes.push(Some(node));
            self.generations.push(1);
            (self.nodes.len() - 1, 1)
        };
        self.live += 1;
        let id = NodeId::from_parts(idx as u32, generation);
        if let Some(owner) = owner {
            if let Some(owner) = self.node_mut(owner) {
                owner.owned.push(id);
            }
        }
        id
    }

    /// Move ownership of `child` to `owner`. Returns the previous owner.
    pub(crate) fn adopt(&mut self, owner: Option<NodeId>, child: NodeId) -> Option<NodeId> {
        let previous = self.owner(child);
        if let Some(previous) = previous {
            if let Some(node) = self.node_mut(previous) {
                node.owned.retain(|&id| id != child);
            }
        }
        if let Some(owner) = owner {
            if let Some(node) = self.node_mut(owner) {
                node.owned.push(child);
            }
        }
        if let Some(node) = self.node_mut(child) {
            node.owner = owner;
            node.transient = false;
        }
        previous
    }

    pub(crate) fn set_parent(&mut self, id: NodeId, parent: NodeId) {
        if let Some(node) = self.node_mut(id) {
            node.parent = Some(parent);
        }
    }

    pub(crate) fn set_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(node) = self.node_mut(id) {
            node.visible = visible;
        }
    }

    pub(crate) fn mark_transient(&mut self, id: NodeId) {
        if let Some(node) = self.node_mut(id) {
            node.transient = true;
        }
    }

    /// Remove `id` and everything it owns. Returns the removed nodes, `id` first.
    pub(crate) fn remove(&mut self, id: NodeId) -> Vec<(NodeId, Box<dyn Presentable>)> {
        if !self.contains(id) {
            return Vec::new();
        }
        if let Some(owner) = self.owner(id) {
            if let Some(node) = self.node_mut(owner) {
                node.owned.retain(|&child| child != id);
            }
        }

        let mut order = vec![id];
        let mut cursor = 0;
        while cursor < order.len() {
            order.extend_from_slice(self.children(order[cursor]));
            cursor += 1;
        }

        let mut removed = Vec::with_capacity(order.len());
        for victim in order {
            self.detach(victim);
            let idx = victim.index();
            if let Some(node) = self.nodes[idx].take() {
                for &entry in &node.stack {
                    if let Some(entry) = self.node_mut(entry) {
                        entry.host = None;
                    }
                }
                if let Some(modal) = node.modal {
                    if let Some(modal) = self.node_mut(modal) {
                        modal.presenter = None;
                    }
                }
                self.free_list.push(idx);
                self.live -= 1;
                removed.push((victim, node.presentable));
            }
        }
        removed
    }

    /// Take `id` out of whatever stack or modal slot displays it.
    pub(crate) fn detach(&mut self, id: NodeId) {
        let (host, presenter) = match self.node_mut(id) {
            Some(node) => (node.host.take(), node.presenter.take()),
            None => return,
        };
        if let Some(host) = host.and_then(|host| self.node_mut(host)) {
            host.stack.retain(|&entry| entry != id);
        }
        if let Some(presenter) = presenter.and_then(|presenter| self.node_mut(presenter)) {
            presenter.modal = None;
        }
    }

    pub(crate) fn push(&mut self, container: NodeId, id: NodeId) {
        if let Some(node) = self.node_mut(container) {
            node.stack.push(id);
        }
        if let Some(node) = self.node_mut(id) {
            node.host = Some(container);
        }
    }

    /// Pop the top entry, keeping the root content.
    pub(crate) fn pop(&mut self, container: NodeId) -> Option<NodeId> {
        let node = self.node_mut(container)?;
        if node.stack.len() < 2 {
            return None;
        }
        let popped = node.stack.pop()?;
        if let Some(popped) = self.node_mut(popped) {
            popped.host = None;
        }
        Some(popped)
    }

    /// Pop every entry above the root content, top first.
    pub(crate) fn pop_to_root(&mut self, container: NodeId) -> Vec<NodeId> {
        let Some(node) = self.node_mut(container) else {
            return Vec::new();
        };
        if node.stack.len() < 2 {
            return Vec::new();
        }
        let mut popped = node.stack.split_off(1);
        popped.reverse();
        for &id in &popped {
            if let Some(entry) = self.node_mut(id) {
                entry.host = None;
            }
        }
        popped
    }

    /// Make `id` the only entry of `container`'s stack. Returns the previous
    /// entries other than `id`.
    pub(crate) fn replace_stack(&mut self, container: NodeId, id: NodeId) -> Vec<NodeId> {
        self.detach(id);
        let Some(node) = self.node_mut(container) else {
            return Vec::new();
        };
        let previous = std::mem::replace(&mut node.stack, vec![id]);
        for &old in &previous {
            if let Some(entry) = self.node_mut(old) {
                entry.host = None;
            }
        }
        if let Some(entry) = self.node_mut(id) {
            entry.host = Some(container);
        }
        previous
    }

    pub(crate) fn present(&mut self, presenter: NodeId, id: NodeId) {
        if let Some(node) = self.node_mut(presenter) {
            node.modal = Some(id);
        }
        if let Some(node) = self.node_mut(id) {
            node.presenter = Some(presenter);
        }
    }

    /// Dismiss what `presenter` presents together with everything presented on
    /// top of it. Returns the dismissed nodes, bottom first.
    pub(crate) fn dismiss_from(&mut self, presenter: NodeId) -> Vec<NodeId> {
        let mut dismissed = Vec::new();
        let mut current = presenter;
        while let Some(modal) = self.modal(current) {
            if dismissed.contains(&modal) {
                break;
            }
            if let Some(node) = self.node_mut(current) {
                node.modal = None;
            }
            if let Some(node) = self.node_mut(modal) {
                node.presenter = None;
            }
            dismissed.push(modal);
            current = self.root_unit(modal);
        }
        dismissed
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        let idx = id.index();
        if self.generations.get(idx).copied() != Some(id.generation()) {
            return None;
        }
        self.nodes.get(idx)?.as_ref()
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let idx = id.index();
        if self.generations.get(idx).copied() != Some(id.generation()) {
            return None;
        }
        self.nodes.get_mut(idx)?.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Leaf;

    impl Presentable for Leaf {}

    struct Wrapper(NodeId);

    impl Presentable for Wrapper {
        fn root_unit(&self) -> Option<NodeId> {
            Some(self.0)
        }
    }

    #[test]
    fn test_stale_ids_never_alias() {
        let mut stage = Stage::new();
        let a = stage.insert(None, Box::new(Leaf));
        stage.remove(a);
        let b = stage.insert(None, Box::new(Leaf));
        assert_eq!(a.index(), b.index());
        assert!(!stage.contains(a));
        assert!(stage.contains(b));
        assert_eq!(stage.len(), 1);
    }

    #[test]
    fn test_remove_takes_owned_subtree() {
        let mut stage = Stage::new();
        let root = stage.insert(None, Box::new(Leaf));
        let child = stage.insert(Some(root), Box::new(Leaf));
        let grandchild = stage.insert(Some(child), Box::new(Leaf));
        let other = stage.insert(None, Box::new(Leaf));

        let removed: Vec<NodeId> = stage.remove(child).into_iter().map(|(id, _)| id).collect();
        assert_eq!(removed, vec![child, grandchild]);
        assert!(stage.children(root).is_empty());
        assert!(stage.contains(root));
        assert!(stage.contains(other));
    }

    #[test]
    fn test_stack_keeps_root_content() {
        let mut stage = Stage::new();
        let nav = stage.insert(None, Box::new(Leaf));
        let first = stage.insert(None, Box::new(Leaf));
        let second = stage.insert(None, Box::new(Leaf));
        stage.push(nav, first);

        assert_eq!(stage.pop(nav), None);
        stage.push(nav, second);
        assert_eq!(stage.pop(nav), Some(second));
        assert!(!stage.is_displayed(second));
        assert!(stage.is_displayed(first));
        assert_eq!(stage.host(first), Some(nav));
    }

    #[test]
    fn test_root_unit_follows_indirection() {
        let mut stage = Stage::new();
        let unit = stage.insert(None, Box::new(Leaf));
        let wrapper = stage.insert(None, Box::new(Wrapper(unit)));
        let outer = stage.insert(None, Box::new(Wrapper(wrapper)));
        assert_eq!(stage.root_unit(outer), unit);
        assert_eq!(stage.root_unit(unit), unit);
    }

    #[test]
    fn test_dismiss_takes_the_modal_chain() {
        let mut stage = Stage::new();
        let base = stage.insert(None, Box::new(Leaf));
        let sheet = stage.insert(None, Box::new(Leaf));
        let alert = stage.insert(None, Box::new(Leaf));
        stage.present(base, sheet);
        stage.present(sheet, alert);

        assert_eq!(stage.active_child(base), Some(sheet));
        assert_eq!(stage.dismiss_from(base), vec![sheet, alert]);
        assert_eq!(stage.modal(base), None);
        assert_eq!(stage.presenter(alert), None);
        assert!(stage.dismiss_from(base).is_empty());
    }

    #[test]
    fn test_replace_stack_returns_previous_entries() {
        let mut stage = Stage::new();
        let window = stage.insert(None, Box::new(Leaf));
        let old = stage.insert(None, Box::new(Leaf));
        let new = stage.insert(None, Box::new(Leaf));
        stage.push(window, old);

        assert_eq!(stage.replace_stack(window, new), vec![old]);
        assert_eq!(stage.stack(window), &[new]);
        assert!(!stage.is_displayed(old));
    }

    #[test]
    fn test_transient_flag() {
        let mut stage = Stage::new();
        let owner = stage.insert(None, Box::new(Leaf));
        let built = stage.insert(Some(owner), Box::new(Leaf));
        stage.mark_transient(built);

        assert!(stage.is_transient(built));
        assert!(!stage.is_transient(owner));
        stage.remove(owner);
        assert!(!stage.is_transient(built));
    }
}
