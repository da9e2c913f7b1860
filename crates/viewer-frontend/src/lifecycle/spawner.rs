//! Background task spawning

use std::future::Future;
use std::pin::Pin;

/// A unit of background work
pub type Task = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Runs tasks off the UI thread
pub trait TaskSpawner: Send + Sync {
    fn spawn(&self, name: &str, task: Task) -> std::io::Result<()>;
}

/// Runs each task to completion on its own named thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSpawner;

impl TaskSpawner for ThreadSpawner {
    fn spawn(&self, name: &str, task: Task) -> std::io::Result<()> {
        std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || pollster::block_on(task))
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_thread_spawner_runs_task() {
        let (tx, rx) = mpsc::channel();
        ThreadSpawner
            .spawn(
                "test-task",
                Box::pin(async move {
                    let name = std::thread::current().name().map(str::to_string);
                    tx.send(name).unwrap();
                }),
            )
            .unwrap();

        let name = rx.recv_timeout(std::time::Duration::from_secs(5)).unwrap();
        assert_eq!(name.as_deref(), Some("test-task"));
    }
}
