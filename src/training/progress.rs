use std::time::Duration;

/// Time left if the remaining work proceeds at the throughput observed so far.
pub fn estimate_remaining(done: usize, total: usize, elapsed: Duration) -> Option<Duration> {
	if done == 0 || done > total {
		return None;
	}
	let per_item = elapsed.as_secs_f64() / done as f64;
	Some(Duration::from_secs_f64(per_item * (total - done) as f64))
}

pub fn percent(done: usize, total: usize) -> f64 {
	if total == 0 {
		100.0
	} else {
		done as f64 * 100.0 / total as f64
	}
}

/// `HH:MM:SS`, or `--:--:--` when unknown.
pub fn format_duration(duration: Option<Duration>) -> String {
	match duration {
		Some(d) => {
			let secs = d.as_secs();
			format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
		},
		None => "--:--:--".to_string(),
	}
}
