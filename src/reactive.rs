//! Signal - Observable Value
//!
//! `Signal<T>` holds a value that the rendering layer reads and observes.
//! The router writes the current location into a signal; consumers subscribe
//! to be told when it changes.
//!
//! ## Example
//!
//! ```
//! use reinhardt_spa_router::reactive::Signal;
//!
//! let count = Signal::new(0);
//! assert_eq!(count.get(), 0);
//!
//! count.set(42);
//! assert_eq!(count.get(), 42);
//!
//! count.update(|n| *n += 1);
//! assert_eq!(count.get(), 43);
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

type Subscriber<T> = Rc<dyn Fn(&T)>;

/// Handle identifying a subscription on a [`Signal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscribers<T> {
	next_id: Cell<u64>,
	entries: RefCell<Vec<(SubscriptionId, Subscriber<T>)>>,
}

/// A shared, observable value.
///
/// `Signal<T>` implements `Clone`; all clones share the same value and the
/// same subscriber list.
pub struct Signal<T: 'static> {
	value: Rc<RefCell<T>>,
	subscribers: Rc<Subscribers<T>>,
}

impl<T: 'static> Clone for Signal<T> {
	fn clone(&self) -> Self {
		Self {
			value: Rc::clone(&self.value),
			subscribers: Rc::clone(&self.subscribers),
		}
	}
}

impl<T: 'static> Signal<T> {
	/// Create a new Signal with the given initial value
	pub fn new(value: T) -> Self {
		Self {
			value: Rc::new(RefCell::new(value)),
			subscribers: Rc::new(Subscribers {
				next_id: Cell::new(0),
				entries: RefCell::new(Vec::new()),
			}),
		}
	}

	/// Get a clone of the current value
	pub fn get(&self) -> T
	where
		T: Clone,
	{
		self.value.borrow().clone()
	}

	/// Borrow the current value for the duration of `f`
	pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
		f(&self.value.borrow())
	}

	/// Set the signal to a new value and notify every subscriber
	pub fn set(&self, value: T)
	where
		T: Clone,
	{
		*self.value.borrow_mut() = value;
		self.notify();
	}

	/// Set the signal only if `value` differs from the current one.
	///
	/// Returns `true` when the value changed and subscribers were notified.
	pub fn set_if_changed(&self, value: T) -> bool
	where
		T: Clone + PartialEq,
	{
		if *self.value.borrow() == value {
			return false;
		}
		self.set(value);
		true
	}

	/// Update the signal's value in place and notify subscribers once
	pub fn update<F>(&self, f: F)
	where
		T: Clone,
		F: FnOnce(&mut T),
	{
		f(&mut *self.value.borrow_mut());
		self.notify();
	}

	/// Register a callback invoked with the new value after every change.
	///
	/// The callback receives a snapshot of the new value and may read or
	/// write this signal, including from nested notifications.
	pub fn subscribe<F>(&self, f: F) -> SubscriptionId
	where
		F: Fn(&T) + 'static,
	{
		let id = SubscriptionId(self.subscribers.next_id.get());
		self.subscribers.next_id.set(id.0 + 1);
		let subscriber: Subscriber<T> = Rc::new(f);
		self.subscribers
			.entries
			.borrow_mut()
			.push((id, subscriber));
		id
	}

	/// Remove a subscription. Returns `false` if it was already gone.
	pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
		let mut entries = self.subscribers.entries.borrow_mut();
		let before = entries.len();
		entries.retain(|(entry_id, _)| *entry_id != id);
		entries.len() != before
	}

	/// Returns the number of active subscriptions.
	pub fn subscriber_count(&self) -> usize {
		self.subscribers.entries.borrow().len()
	}

	fn notify(&self)
	where
		T: Clone,
	{
		// Snapshot so callbacks may subscribe, unsubscribe or write the value.
		let callbacks: Vec<Subscriber<T>> = self
			.subscribers
			.entries
			.borrow()
			.iter()
			.map(|(_, cb)| Rc::clone(cb))
			.collect();
		let value = self.value.borrow().clone();
		for cb in callbacks {
			cb(&value);
		}
	}
}

impl<T: fmt::Debug + 'static> fmt::Debug for Signal<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Signal")
			.field("value", &*self.value.borrow())
			.field("subscribers", &self.subscriber_count())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_signal_set() {
		let signal = Signal::new(0);
		signal.set(100);
		assert_eq!(signal.get(), 100);
	}

	#[rstest]
	fn test_signal_clone_shares_value() {
		let signal1 = Signal::new(42);
		let signal2 = signal1.clone();

		signal1.set(100);
		assert_eq!(signal2.get(), 100);
	}

	#[rstest]
	fn test_subscribers_see_new_value() {
		let signal = Signal::new(String::from("/"));
		let seen = Rc::new(RefCell::new(Vec::new()));
		let sink = Rc::clone(&seen);
		signal.subscribe(move |v: &String| sink.borrow_mut().push(v.clone()));

		signal.set("/a".to_string());
		signal.update(|v| v.push('b'));

		assert_eq!(*seen.borrow(), vec!["/a".to_string(), "/ab".to_string()]);
	}

	#[rstest]
	fn test_set_if_changed_skips_equal_value() {
		let signal = Signal::new(1);
		let hits = Rc::new(Cell::new(0));
		let counter = Rc::clone(&hits);
		signal.subscribe(move |_| counter.set(counter.get() + 1));

		assert!(!signal.set_if_changed(1));
		assert!(signal.set_if_changed(2));
		assert_eq!(hits.get(), 1);
	}

	#[rstest]
	fn test_subscriber_may_write_signal() {
		let signal = Signal::new(0);
		let writer = signal.clone();
		signal.subscribe(move |v: &i32| {
			if *v > 10 {
				writer.set(10);
			}
		});

		signal.set(42);
		assert_eq!(signal.get(), 10);
	}

	#[rstest]
	fn test_unsubscribe() {
		let signal = Signal::new(0);
		let hits = Rc::new(Cell::new(0));
		let counter = Rc::clone(&hits);
		let id = signal.subscribe(move |_| counter.set(counter.get() + 1));

		assert!(signal.unsubscribe(id));
		assert!(!signal.unsubscribe(id));
		signal.set(5);
		assert_eq!(hits.get(), 0);
		assert_eq!(signal.subscriber_count(), 0);
	}
}
