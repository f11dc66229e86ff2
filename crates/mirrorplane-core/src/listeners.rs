//! Post-render listener registry.

use crate::ids::{ListenerId, TextureHandle};

type Listener = Box<dyn FnMut(Option<TextureHandle>)>;

/// Callbacks invoked synchronously once the reflection pass has rendered.
///
/// Listeners run on the thread that drives the frame, in registration order,
/// before the notifying call returns.
#[derive(Default)]
pub struct PostRenderListeners {
    next_id: u64,
    listeners: Vec<(ListenerId, Listener)>,
}

impl PostRenderListeners {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener and returns the id needed to remove it.
    pub fn register(
        &mut self,
        listener: impl FnMut(Option<TextureHandle>) + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns false if the id was unknown.
    pub fn unregister(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Invokes every listener with the given texture.
    pub fn notify(&mut self, texture: Option<TextureHandle>) {
        for (_, listener) in &mut self.listeners {
            listener(texture);
        }
    }

    /// Removes every listener.
    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    /// Moves every listener out of `other` into this registry.
    pub fn absorb(&mut self, other: &mut Self) {
        for (_, listener) in other.listeners.drain(..) {
            let id = ListenerId(self.next_id);
            self.next_id += 1;
            self.listeners.push((id, listener));
        }
    }

    /// Returns the number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Returns true if no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for PostRenderListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostRenderListeners")
            .field("count", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn handle(id: u64) -> TextureHandle {
        TextureHandle {
            id,
            width: 4,
            height: 4,
        }
    }

    #[test]
    fn test_notify_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = PostRenderListeners::new();
        let a = Rc::clone(&log);
        listeners.register(move |t| a.borrow_mut().push(("a", t.map(|h| h.id))));
        let b = Rc::clone(&log);
        listeners.register(move |t| b.borrow_mut().push(("b", t.map(|h| h.id))));

        listeners.notify(Some(handle(7)));
        assert_eq!(*log.borrow(), vec![("a", Some(7)), ("b", Some(7))]);
    }

    #[test]
    fn test_unregister() {
        let count = Rc::new(RefCell::new(0));
        let mut listeners = PostRenderListeners::new();
        let c = Rc::clone(&count);
        let id = listeners.register(move |_| *c.borrow_mut() += 1);

        assert!(listeners.unregister(id));
        assert!(!listeners.unregister(id));
        listeners.notify(None);
        assert_eq!(*count.borrow(), 0);
        assert!(listeners.is_empty());
    }

    #[test]
    fn test_absorb_moves_listeners() {
        let count = Rc::new(RefCell::new(0));
        let mut old = PostRenderListeners::new();
        let c = Rc::clone(&count);
        old.register(move |_| *c.borrow_mut() += 1);

        let mut new = PostRenderListeners::new();
        new.absorb(&mut old);
        assert!(old.is_empty());
        assert_eq!(new.len(), 1);
        new.notify(Some(handle(1)));
        assert_eq!(*count.borrow(), 1);
    }
}
