use super::{
    context::RunContext,
    errors::RunError,
    model::RunMetrics,
    result::RunResult,
    source::Source,
};
use std::{
    any::Any,
    future::Future,
    panic::AssertUnwindSafe,
    sync::Arc,
};
use futures::FutureExt;
use tokio::{
    sync::{mpsc, Mutex},
    task::JoinSet,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};


/// Конфигурация исполнителя
#[derive(Debug, Clone)]
pub struct Config {
    /// Максимум одновременно обрабатываемых элементов. `0` - по числу ядер.
    pub num_workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_workers: num_cpus::get(),
        }
    }
}

impl Config {
    pub fn new(num_workers: usize) -> Self {
        if num_workers == 0 {
            return Self::default();
        }
        Self { num_workers }
    }

    pub fn cpu_bound() -> Self {
        Self::default()
    }

    pub fn io_bound() -> Self {
        Self {
            num_workers: num_cpus::get() * 2,
        }
    }

    #[inline]
    fn limit(&self) -> usize {
        if self.num_workers == 0 {
            num_cpus::get()
        } else {
            self.num_workers
        }
    }
}


enum Completion<R, E> {
    Solved(Result<R, E>),
    Panicked(String),
}

/// Исполнитель с ограничением параллелизма.
///
/// Один экземпляр - один запуск: [`BoundedExecutor::run`] потребляет `self`.
/// Элементы из источника раздаются фиксированному пулу воркеров, результаты
/// собираются в управляющем цикле по одному, в порядке завершения.
/// Одновременно в работе не больше `limit` элементов.
#[derive(Debug, Clone, Default)]
pub struct BoundedExecutor {
    config: Config,
}

impl BoundedExecutor {
    pub fn new(num_workers: usize) -> Self {
        Self::with_config(Config::new(num_workers))
    }

    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    #[inline]
    pub fn limit(&self) -> usize {
        self.config.limit()
    }

    /// Прогоняет все элементы `source` через `solve` и отдает результаты в `collect`.
    ///
    /// Завершается первой из ошибок источника, воркера или коллектора, либо
    /// отменой `ctx`. Перед возвратом всегда дожидается всех воркеров;
    /// результаты, пришедшие после терминального события, отбрасываются.
    pub async fn run<Src, S, Fut, C, R, E>(
        self,
        ctx: &RunContext,
        mut source: Src,
        solve: S,
        mut collect: C,
    ) -> RunResult<RunMetrics, E>
    where
        Src: Source<E>,
        Src::Item: Send + 'static,
        S: Fn(Src::Item) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        C: FnMut(R) -> Result<(), E>,
        R: Send + 'static,
        E: Send + 'static,
    {
        if let Some(reason) = ctx.reason() {
            return Err(RunError::Cancelled(reason));
        }

        let limit = self.config.limit();
        let workers = source.remaining().map_or(limit, |left| left.min(limit));
        debug!(limit, workers, "bounded run started");

        let (queue_tx, queue_rx) = mpsc::channel(limit);
        let (done_tx, mut done_rx) = mpsc::channel(limit);
        let queue_rx = Arc::new(Mutex::new(queue_rx));
        let solve = Arc::new(solve);
        let halt = ctx.token().child_token();

        let mut pool = JoinSet::new();
        for id in 0..workers {
            pool.spawn(worker_loop(
                id,
                queue_rx.clone(),
                done_tx.clone(),
                solve.clone(),
                halt.clone(),
            ));
        }
        drop(queue_rx);
        drop(done_tx);

        let mut dispatch = Dispatch::new(queue_tx, limit);
        let outcome = dispatch
            .drive(ctx, &mut source, &mut done_rx, &mut collect)
            .await;

        // Уже поставленные в очередь, но не начатые элементы пропускаются
        halt.cancel();
        let metrics = dispatch.finish(workers);
        let discarded = shutdown(&mut pool, &mut done_rx).await;

        match outcome {
            Ok(()) => {
                debug!(
                    dispatched = metrics.dispatched,
                    collected = metrics.collected,
                    peak_in_flight = metrics.peak_in_flight,
                    "bounded run finished"
                );
                Ok(metrics)
            }
            Err(err) => {
                debug!(
                    kind = err.kind(),
                    dispatched = metrics.dispatched,
                    collected = metrics.collected,
                    discarded,
                    "bounded run aborted"
                );
                Err(err)
            }
        }
    }
}


/// Состояние управляющего цикла. Принадлежит только ему, поэтому без атомиков.
struct Dispatch<T> {
    queue: mpsc::Sender<T>,
    limit: usize,
    dispatched: usize,
    completed: usize,
    peak_in_flight: usize,
    exhausted: bool,
}

impl<T> Dispatch<T> {
    fn new(queue: mpsc::Sender<T>, limit: usize) -> Self {
        Self {
            queue,
            limit,
            dispatched: 0,
            completed: 0,
            peak_in_flight: 0,
            exhausted: false,
        }
    }

    #[inline]
    fn is_drained(&self) -> bool {
        self.exhausted && self.completed == self.dispatched
    }

    /// `Ok(false)`, если источник исчерпан
    async fn dispatch_next<Src, E>(&mut self, source: &mut Src) -> RunResult<bool, E>
    where
        Src: Source<E, Item = T>,
    {
        let Some(item) = source.fetch().map_err(RunError::Source)? else {
            self.exhausted = true;
            return Ok(false);
        };

        self.queue
            .send(item)
            .await
            .map_err(|_| RunError::ChannelClosed)?;
        self.dispatched += 1;
        self.peak_in_flight = self.peak_in_flight.max(self.dispatched - self.completed);
        Ok(true)
    }

    async fn prime<Src, E>(&mut self, source: &mut Src) -> RunResult<(), E>
    where
        Src: Source<E, Item = T>,
    {
        while self.dispatched < self.limit && self.dispatch_next(source).await? {}
        Ok(())
    }

    async fn drive<Src, C, R, E>(
        &mut self,
        ctx: &RunContext,
        source: &mut Src,
        completions: &mut mpsc::Receiver<Completion<R, E>>,
        collect: &mut C,
    ) -> RunResult<(), E>
    where
        Src: Source<E, Item = T>,
        C: FnMut(R) -> Result<(), E>,
    {
        self.prime(source).await?;

        let cancelled = ctx.cancelled();
        tokio::pin!(cancelled);

        while !self.is_drained() {
            tokio::select! {
                biased;
                reason = &mut cancelled => return Err(RunError::Cancelled(reason)),
                completion = completions.recv() => {
                    let value = match completion {
                        Some(Completion::Solved(result)) => result.map_err(RunError::Worker)?,
                        Some(Completion::Panicked(message)) => return Err(RunError::Panic(message)),
                        None => return Err(RunError::ChannelClosed),
                    };
                    collect(value).map_err(RunError::Collect)?;
                    self.completed += 1;

                    if !self.exhausted {
                        self.dispatch_next(source).await?;
                    }
                }
            }
        }
        Ok(())
    }

    fn finish(self, workers: usize) -> RunMetrics {
        RunMetrics {
            limit: self.limit,
            workers,
            dispatched: self.dispatched,
            collected: self.completed,
            peak_in_flight: self.peak_in_flight,
        }
    }
}


async fn worker_loop<T, S, Fut, R, E>(
    id: usize,
    queue: Arc<Mutex<mpsc::Receiver<T>>>,
    done: mpsc::Sender<Completion<R, E>>,
    solve: Arc<S>,
    halt: CancellationToken,
)
where
    S: Fn(T) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    trace!(worker = id, "worker started");
    let solve: &S = &solve;

    loop {
        let next = queue.lock().await.recv().await;
        let Some(item) = next else {
            break;
        };

        if halt.is_cancelled() {
            trace!(worker = id, "skipping queued item after halt");
            continue;
        }

        let completion = match AssertUnwindSafe(async move { solve(item).await })
            .catch_unwind()
            .await
        {
            Ok(result) => Completion::Solved(result),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(worker = id, %message, "solve panicked");
                Completion::Panicked(message)
            }
        };

        if done.send(completion).await.is_err() {
            break;
        }
    }
    trace!(worker = id, "worker stopped");
}

/// Закрывает раздачу и дожидается всех воркеров, отбрасывая их результаты
async fn shutdown<R, E>(
    pool: &mut JoinSet<()>,
    completions: &mut mpsc::Receiver<Completion<R, E>>,
) -> usize {
    let mut discarded = 0;
    loop {
        tokio::select! {
            Some(_) = completions.recv() => discarded += 1,
            joined = pool.join_next() => match joined {
                Some(Ok(())) => {}
                Some(Err(join_err)) => warn!(error = %join_err, "worker task failed"),
                None => break,
            },
        }
    }
    discarded
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic in solve".to_string()
    }
}
