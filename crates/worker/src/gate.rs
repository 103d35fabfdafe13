use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::GenerationToken;

/// Single-slot gate serializing one critical section across tasks.
///
/// Acquisition races the caller's [`GenerationToken`], so a cancelled waiter
/// leaves without ever holding the slot. Closing the gate wakes every waiter
/// with [`GateAcquire::Closed`] and rejects all later acquisitions.
#[derive(Debug, Clone)]
pub struct ExclusiveGate {
	slot: Arc<Semaphore>,
}

/// Held slot of an [`ExclusiveGate`]; dropping it releases the slot.
#[derive(Debug)]
pub struct GatePermit {
	_permit: OwnedSemaphorePermit,
}

/// Outcome of [`ExclusiveGate::acquire`].
#[derive(Debug)]
pub enum GateAcquire {
	/// The slot is held until the permit is dropped.
	Acquired(GatePermit),
	/// Cancellation was requested before the slot became free.
	Cancelled,
	/// The gate was closed.
	Closed,
}

impl Default for ExclusiveGate {
	fn default() -> Self {
		Self::new()
	}
}

impl ExclusiveGate {
	/// Creates an open gate with one free slot.
	pub fn new() -> Self {
		Self {
			slot: Arc::new(Semaphore::new(1)),
		}
	}

	/// Waits for the slot unless `token` is cancelled or the gate closes first.
	pub async fn acquire(&self, token: &GenerationToken) -> GateAcquire {
		if token.is_cancelled() {
			return GateAcquire::Cancelled;
		}
		let slot = Arc::clone(&self.slot);
		tokio::select! {
			biased;
			_ = token.cancelled() => GateAcquire::Cancelled,
			permit = slot.acquire_owned() => match permit {
				Ok(permit) => GateAcquire::Acquired(GatePermit { _permit: permit }),
				Err(_) => GateAcquire::Closed,
			},
		}
	}

	/// Returns true while no task holds the slot.
	pub fn is_free(&self) -> bool {
		self.slot.available_permits() == 1
	}

	/// Closes the gate. Held permits stay valid until dropped.
	pub fn close(&self) {
		self.slot.close();
	}

	/// Returns true once [`Self::close`] has been called.
	pub fn is_closed(&self) -> bool {
		self.slot.is_closed()
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use super::*;
	use crate::GenerationClock;

	#[tokio::test]
	async fn second_acquire_waits_for_release() {
		let gate = ExclusiveGate::new();
		let clock = GenerationClock::new();
		let first = gate.acquire(&clock.issue()).await;
		assert!(matches!(first, GateAcquire::Acquired(_)));
		assert!(!gate.is_free());

		let waiter = {
			let gate = gate.clone();
			let token = clock.issue();
			tokio::spawn(async move { matches!(gate.acquire(&token).await, GateAcquire::Acquired(_)) })
		};
		tokio::time::sleep(Duration::from_millis(20)).await;
		assert!(!waiter.is_finished());

		drop(first);
		assert_eq!(waiter.await.ok(), Some(true));
	}

	#[tokio::test]
	async fn cancelled_waiter_never_holds_slot() {
		let gate = ExclusiveGate::new();
		let clock = GenerationClock::new();
		let held = gate.acquire(&clock.issue()).await;

		let token = clock.issue();
		let waiter = {
			let gate = gate.clone();
			let token = token.clone();
			tokio::spawn(async move { matches!(gate.acquire(&token).await, GateAcquire::Cancelled) })
		};
		tokio::time::sleep(Duration::from_millis(10)).await;
		token.cancel();
		assert_eq!(waiter.await.ok(), Some(true));

		drop(held);
		assert!(gate.is_free());
	}

	#[tokio::test]
	async fn closed_gate_rejects_acquire() {
		let gate = ExclusiveGate::new();
		gate.close();
		assert!(gate.is_closed());
		let token = GenerationClock::new().issue();
		assert!(matches!(gate.acquire(&token).await, GateAcquire::Closed));
	}
}
