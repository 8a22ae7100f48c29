//! Object pooling for allocation reduction
//!
//! Hot paths fetch instances from a pool instead of allocating fresh ones
//! every cycle. `fetch` hands out a recycled instance when one is available,
//! falling back to the supplier closure; `free` clears identity-sensitive
//! state through the on-free hook and returns the instance to the free list.
//! Callers must not retain references to freed instances.

/// A free-list object pool keyed by a supplier closure
pub struct Pool<T> {
    supplier: Box<dyn FnMut() -> T>,
    on_free: Option<Box<dyn FnMut(&mut T)>>,
    free_list: Vec<T>,
}

impl<T> Pool<T> {
    /// Create a pool that constructs new instances with the given supplier
    pub fn new(supplier: impl FnMut() -> T + 'static) -> Self {
        Self {
            supplier: Box::new(supplier),
            on_free: None,
            free_list: Vec::new(),
        }
    }

    /// Set a hook that runs on every freed instance before it is recycled
    pub fn with_on_free(mut self, on_free: impl FnMut(&mut T) + 'static) -> Self {
        self.on_free = Some(Box::new(on_free));
        self
    }

    /// Take an instance from the pool, constructing a new one if empty
    pub fn fetch(&mut self) -> T {
        self.free_list.pop().unwrap_or_else(|| (self.supplier)())
    }

    /// Return an instance to the pool
    pub fn free(&mut self, mut instance: T) {
        if let Some(on_free) = &mut self.on_free {
            on_free(&mut instance);
        }
        self.free_list.push(instance);
    }

    /// Number of instances currently available for reuse
    pub fn available(&self) -> usize {
        self.free_list.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::Contact;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn fetch_after_free_reuses_instances() {
        let allocations = Rc::new(Cell::new(0));
        let counter = Rc::clone(&allocations);
        let mut pool: Pool<Contact> = Pool::new(move || {
            counter.set(counter.get() + 1);
            Contact::default()
        });

        let n = 8;
        let contacts: Vec<Contact> = (0..n).map(|_| pool.fetch()).collect();
        assert_eq!(allocations.get(), n);

        for contact in contacts {
            pool.free(contact);
        }
        assert_eq!(pool.available(), n);

        for _ in 0..n {
            pool.fetch();
        }
        // No new allocations beyond the initial batch
        assert_eq!(allocations.get(), n);
        assert_eq!(pool.available(), 0);
    }

    #[test]
    fn on_free_clears_state_before_recycling() {
        let mut pool: Pool<Vec<u32>> = Pool::new(Vec::new).with_on_free(Vec::clear);
        let mut buffer = pool.fetch();
        buffer.extend([1, 2, 3]);
        pool.free(buffer);

        let recycled = pool.fetch();
        assert!(recycled.is_empty());
    }

    #[test]
    fn empty_pool_falls_back_to_supplier() {
        let mut pool: Pool<u32> = Pool::new(|| 7);
        assert_eq!(pool.fetch(), 7);
        assert_eq!(pool.available(), 0);
    }
}
