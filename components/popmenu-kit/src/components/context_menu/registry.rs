use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::debug;

/// What the registry needs from a live menu
pub trait RegisteredMenu {
    fn close(&self);
    fn is_open(&self) -> bool;
}

/// Identifies one registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistryKey(u64);

struct RegistryInner {
    next_key: Cell<u64>,
    members: RefCell<Vec<(RegistryKey, Weak<dyn RegisteredMenu>)>>,
}

/// Menus sharing a page
///
/// Opening any member first closes every member, so at most one of them is
/// open at a time. The host owns the registry and hands it to each menu it
/// constructs; clones share the same member list. Members are held weakly,
/// a menu dropped without being destroyed simply disappears from it.
#[derive(Clone)]
pub struct MenuRegistry {
    inner: Rc<RegistryInner>,
}

impl Default for MenuRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MenuRegistry {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RegistryInner {
                next_key: Cell::new(1),
                members: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn register(&self, menu: Weak<dyn RegisteredMenu>) -> RegistryKey {
        let key = RegistryKey(self.inner.next_key.get());
        self.inner.next_key.set(key.0 + 1);

        let mut members = self.inner.members.borrow_mut();
        members.retain(|(_, member)| member.strong_count() > 0);
        members.push((key, menu));
        debug!(key = key.0, members = members.len(), "menu registered");
        key
    }

    /// Returns whether `key` was registered
    pub fn unregister(&self, key: RegistryKey) -> bool {
        let mut members = self.inner.members.borrow_mut();
        let before = members.len();
        members.retain(|(k, _)| *k != key);
        let removed = members.len() != before;
        if removed {
            debug!(key = key.0, members = members.len(), "menu unregistered");
        }
        removed
    }

    /// Close every live member
    ///
    /// Iterates a snapshot: members may unregister, or register new menus,
    /// while being closed.
    pub fn close_all(&self) {
        let snapshot: Vec<Rc<dyn RegisteredMenu>> = self
            .inner
            .members
            .borrow()
            .iter()
            .filter_map(|(_, member)| member.upgrade())
            .collect();
        for member in snapshot {
            member.close();
        }
    }

    /// Number of live members
    pub fn len(&self) -> usize {
        self.inner
            .members
            .borrow()
            .iter()
            .filter(|(_, member)| member.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of members currently open; never more than one
    pub fn open_count(&self) -> usize {
        let snapshot: Vec<Rc<dyn RegisteredMenu>> = self
            .inner
            .members
            .borrow()
            .iter()
            .filter_map(|(_, member)| member.upgrade())
            .collect();
        snapshot.iter().filter(|member| member.is_open()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeMenu {
        open: Cell<bool>,
        closes: Cell<usize>,
    }

    impl RegisteredMenu for FakeMenu {
        fn close(&self) {
            self.open.set(false);
            self.closes.set(self.closes.get() + 1);
        }

        fn is_open(&self) -> bool {
            self.open.get()
        }
    }

    fn register(registry: &MenuRegistry, menu: &Rc<FakeMenu>) -> RegistryKey {
        let weak = Rc::downgrade(menu);
        let weak: Weak<dyn RegisteredMenu> = weak;
        registry.register(weak)
    }

    #[test]
    fn test_close_all_reaches_every_member() {
        let registry = MenuRegistry::new();
        let a = Rc::new(FakeMenu::default());
        let b = Rc::new(FakeMenu::default());
        register(&registry, &a);
        register(&registry, &b);
        a.open.set(true);
        assert_eq!(registry.open_count(), 1);

        registry.close_all();

        assert_eq!(registry.open_count(), 0);
        assert_eq!(a.closes.get(), 1);
        assert_eq!(b.closes.get(), 1);
    }

    #[test]
    fn test_unregister() {
        let registry = MenuRegistry::new();
        let a = Rc::new(FakeMenu::default());
        let key = register(&registry, &a);

        assert!(registry.unregister(key));
        assert!(!registry.unregister(key));
        registry.close_all();

        assert!(registry.is_empty());
        assert_eq!(a.closes.get(), 0);
    }

    #[test]
    fn test_dropped_members_are_skipped() {
        let registry = MenuRegistry::new();
        let a = Rc::new(FakeMenu::default());
        register(&registry, &a);
        drop(a);

        assert_eq!(registry.len(), 0);
        registry.close_all();
    }

    #[test]
    fn test_registries_are_isolated() {
        let first = MenuRegistry::new();
        let second = MenuRegistry::new();
        let a = Rc::new(FakeMenu::default());
        register(&first, &a);
        a.open.set(true);

        second.close_all();

        assert!(a.is_open());
        assert_eq!(first.clone().len(), 1);
    }
}
