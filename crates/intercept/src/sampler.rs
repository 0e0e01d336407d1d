//! Occurrence sampling for hooks on hot paths.

use parking_lot::Mutex;

/// Counts occurrences and picks which ones get the expensive treatment.
///
/// The first `warmup` occurrences are always sampled, then every `every`th
/// one. An `every` of zero samples nothing past the warmup.
#[derive(Debug)]
pub struct Sampler {
	warmup: u64,
	every: u64,
	count: Mutex<u64>,
}

impl Sampler {
	pub fn new(warmup: u64, every: u64) -> Self {
		Self {
			warmup,
			every,
			count: Mutex::new(0),
		}
	}

	/// Records one occurrence and returns its 1-based ordinal if sampled.
	pub fn tick(&self) -> Option<u64> {
		let n = {
			let mut count = self.count.lock();
			*count += 1;
			*count
		};
		let sampled = n <= self.warmup || (self.every != 0 && n % self.every == 0);
		sampled.then_some(n)
	}

	/// Records one occurrence and runs `f` with its ordinal if sampled.
	///
	/// `f` runs after the counter lock is released.
	pub fn sample<R>(&self, f: impl FnOnce(u64) -> R) -> Option<R> {
		self.tick().map(f)
	}

	/// Occurrences seen so far.
	pub fn count(&self) -> u64 {
		*self.count.lock()
	}

	pub fn reset(&self) {
		*self.count.lock() = 0;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn warmup_then_every_nth() {
		let sampler = Sampler::new(3, 10);
		let sampled: Vec<u64> = (0..35).filter_map(|_| sampler.tick()).collect();
		assert_eq!(sampled, vec![1, 2, 3, 10, 20, 30]);
		assert_eq!(sampler.count(), 35);
	}

	#[test]
	fn zero_interval_only_samples_warmup() {
		let sampler = Sampler::new(2, 0);
		let sampled: Vec<u64> = (0..50).filter_map(|_| sampler.tick()).collect();
		assert_eq!(sampled, vec![1, 2]);
	}

	#[test]
	fn concurrent_ticks_hand_out_unique_ordinals() {
		let sampler = Sampler::new(0, 1);
		let mut seen: Vec<u64> = std::thread::scope(|s| {
			let handles: Vec<_> = (0..4).map(|_| s.spawn(|| (0..250).filter_map(|_| sampler.tick()).collect::<Vec<_>>())).collect();
			handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
		});
		seen.sort_unstable();
		assert_eq!(seen, (1..=1000).collect::<Vec<_>>());
	}

	#[test]
	fn reset_restarts_warmup() {
		let sampler = Sampler::new(1, 0);
		assert_eq!(sampler.sample(|n| n * 2), Some(2));
		assert_eq!(sampler.sample(|n| n), None);
		sampler.reset();
		assert_eq!(sampler.tick(), Some(1));
	}
}
