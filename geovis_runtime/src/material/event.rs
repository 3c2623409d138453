/// Listener list raised when a material definition changes.

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle returned by `Event::add_listener`
    pub struct ListenerKey;
}

type Listener<A> = Box<dyn Fn(&A) + Send + Sync>;

pub struct Event<A> {
    listeners: SlotMap<ListenerKey, Listener<A>>,
}

impl<A> Event<A> {
    pub fn new() -> Self {
        Self { listeners: SlotMap::with_key() }
    }

    pub fn add_listener<F>(&mut self, listener: F) -> ListenerKey
    where
        F: Fn(&A) + Send + Sync + 'static,
    {
        self.listeners.insert(Box::new(listener))
    }

    pub fn remove_listener(&mut self, key: ListenerKey) -> bool {
        self.listeners.remove(key).is_some()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn raise(&self, args: &A) {
        for listener in self.listeners.values() {
            listener(args);
        }
    }
}

impl<A> Default for Event<A> {
    fn default() -> Self {
        Self::new()
    }
}
