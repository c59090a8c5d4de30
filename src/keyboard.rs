use log::debug;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Other(String),
}

impl Key {
    pub fn from_name(name: &str) -> Self {
        match name {
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            other => Key::Other(other.to_string()),
        }
    }

    fn navigates(&self) -> bool {
        matches!(self, Key::ArrowLeft | Key::ArrowRight)
    }
}

type Listeners = RefCell<BTreeSet<u64>>;

/// Window-level key listeners. Each listener is owned by a [`KeyBinding`]
/// and removed when that binding is dropped.
#[derive(Debug, Default)]
pub struct KeyboardHub {
    listeners: Rc<Listeners>,
    next_id: u64,
}

/// A live key listener. Detaches on drop.
#[derive(Debug)]
pub struct KeyBinding {
    id: u64,
    listeners: Weak<Listeners>,
}

impl KeyboardHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self) -> KeyBinding {
        self.next_id += 1;
        self.listeners.borrow_mut().insert(self.next_id);
        debug!("Key listener {} attached", self.next_id);
        KeyBinding {
            id: self.next_id,
            listeners: Rc::downgrade(&self.listeners),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Whether a listener is attached to hear `key`.
    pub fn dispatch(&self, key: &Key) -> bool {
        key.navigates() && !self.listeners.borrow().is_empty()
    }
}

impl Drop for KeyBinding {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.borrow_mut().remove(&self.id);
            debug!("Key listener {} detached", self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_names() {
        assert_eq!(Key::ArrowLeft, Key::from_name("ArrowLeft"));
        assert_eq!(Key::ArrowRight, Key::from_name("ArrowRight"));
        assert_eq!(Key::Other("Enter".into()), Key::from_name("Enter"));
    }

    #[test]
    fn dropping_binding_detaches() {
        let mut hub = KeyboardHub::new();
        let binding = hub.attach();
        assert!(hub.dispatch(&Key::ArrowRight));

        drop(binding);
        assert_eq!(0, hub.listener_count());
        assert!(!hub.dispatch(&Key::ArrowRight));
    }

    #[test]
    fn replacing_binding_keeps_one_listener() {
        let mut hub = KeyboardHub::new();
        let mut current = hub.attach();
        for _ in 1..5 {
            current = hub.attach();
            assert_eq!(1, hub.listener_count());
        }
        assert!(hub.dispatch(&Key::ArrowLeft));
        drop(current);
        assert_eq!(0, hub.listener_count());
    }

    #[test]
    fn other_keys_are_ignored() {
        let mut hub = KeyboardHub::new();
        let _binding = hub.attach();
        assert!(!hub.dispatch(&Key::Other("Enter".into())));
    }

    #[test]
    fn binding_outliving_hub() {
        let mut hub = KeyboardHub::new();
        let binding = hub.attach();
        drop(hub);
        drop(binding);
    }
}
