use std::any::Any;
use std::collections::HashMap;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};
use crossbeam_channel::{unbounded, RecvTimeoutError};

/// 尚無任務開始時的等待間隔
const IDLE_WAIT: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub enum TaskOutcome<R> {
    Completed(R),
    TimedOut,
    Panicked(String),
}

#[derive(Debug)]
pub struct TaskReport<R> {
    pub index: usize,
    pub outcome: TaskOutcome<R>,
}

enum PoolEvent<R> {
    Started(usize, Instant),
    Finished(usize, Result<R, String>),
}

/// 固定大小的工作池，每個任務從開始執行起有各自的期限
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    deadline: Duration,
}

impl WorkerPool {
    pub fn new(workers: usize, deadline: Duration) -> io::Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("png-to-svg-worker-{}", i))
            .build()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("無法建立工作池: {}", e)))?;
        Ok(WorkerPool { pool, deadline })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// 提交所有任務，並依完成順序對每個結束（含逾時）的任務呼叫 `on_settled`。
    /// 逾時任務的晚到結果會被忽略；逾時不會取消其他任務。
    ///
    /// 逾時只是不再等待該任務，執行緒無法被中止：任務實際結束前仍佔用一個工作執行緒，
    /// 排在後面的任務要等到有空閒的執行緒才會開始。因此 `task` 本身必須有上限
    /// （轉換任務由追蹤工具的逾時保證），整批的完成時間才有上限。
    pub fn run<J, R, F, C>(&self, jobs: Vec<J>, task: F, mut on_settled: C)
    where
        J: Send + 'static,
        R: Send + 'static,
        F: Fn(J) -> R + Send + Sync + 'static,
        C: FnMut(TaskReport<R>),
    {
        let total = jobs.len();
        let task = Arc::new(task);
        let (event_tx, event_rx) = unbounded::<PoolEvent<R>>();

        for (index, job) in jobs.into_iter().enumerate() {
            let tx = event_tx.clone();
            let task = Arc::clone(&task);
            self.pool.spawn(move || {
                let _ = tx.send(PoolEvent::Started(index, Instant::now()));
                let result = panic::catch_unwind(AssertUnwindSafe(|| (*task)(job)))
                    .map_err(panic_message);
                let _ = tx.send(PoolEvent::Finished(index, result));
            });
        }
        drop(event_tx);

        let mut deadlines: HashMap<usize, Instant> = HashMap::new();
        let mut settled = vec![false; total];
        let mut remaining = total;

        while remaining > 0 {
            let wait = deadlines
                .values()
                .min()
                .map(|d| d.saturating_duration_since(Instant::now()))
                .unwrap_or(IDLE_WAIT);

            match event_rx.recv_timeout(wait) {
                Ok(PoolEvent::Started(index, at)) => {
                    if !settled[index] {
                        deadlines.insert(index, at + self.deadline);
                    }
                }
                Ok(PoolEvent::Finished(index, result)) => {
                    if !settled[index] {
                        settled[index] = true;
                        remaining -= 1;
                        deadlines.remove(&index);
                        let outcome = match result {
                            Ok(value) => TaskOutcome::Completed(value),
                            Err(message) => TaskOutcome::Panicked(message),
                        };
                        on_settled(TaskReport { index, outcome });
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            let now = Instant::now();
            let mut expired: Vec<usize> = deadlines
                .iter()
                .filter(|(_, deadline)| **deadline <= now)
                .map(|(index, _)| *index)
                .collect();
            expired.sort_unstable();
            for index in expired {
                deadlines.remove(&index);
                settled[index] = true;
                remaining -= 1;
                on_settled(TaskReport { index, outcome: TaskOutcome::TimedOut });
            }
        }

        // 通道提前關閉時，未回報的任務視為異常終止
        for (index, done) in settled.iter().enumerate() {
            if !done {
                on_settled(TaskReport {
                    index,
                    outcome: TaskOutcome::Panicked("任務未回報結果".to_string()),
                });
            }
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "未知的 panic".to_string()
    }
}
