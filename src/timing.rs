use std::future::Future;
use std::time::Instant;

/// Result of a timed operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Timed<T> {
    /// Elapsed wall time in seconds
    pub operation_time: f64,
    pub data: T,
}

/// Await `future` and report how long it took.
pub async fn run_with_timer<F, T>(future: F) -> Timed<T>
where
    F: Future<Output = T>,
{
    let started = Instant::now();
    let data = future.await;
    Timed {
        operation_time: started.elapsed().as_secs_f64(),
        data,
    }
}
