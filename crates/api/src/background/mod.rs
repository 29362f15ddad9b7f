//! Long-running tasks spawned by the binary. Each takes a
//! [`CancellationToken`](tokio_util::sync::CancellationToken) and returns
//! once it is cancelled.

pub mod housekeeping;
