//! Готовые точки входа поверх [`BoundedExecutor`].
//!
//! `*_collect` варианты передают результаты в коллектор, остальные их
//! отбрасывают. `num_workers == 0` означает число ядер.

use super::{
    context::RunContext,
    pool::BoundedExecutor,
    result::RunResult,
    source::{Pull, Sequence},
};
use std::{future::Future, sync::Arc};
use futures::future::BoxFuture;


/// Обработка конечной последовательности без сбора результатов
pub async fn run_sequence<T, S, Fut, E>(
    ctx: &RunContext,
    num_workers: usize,
    items: impl IntoIterator<Item = T>,
    solve: S,
) -> RunResult<(), E>
where
    T: Send + 'static,
    S: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Send + 'static,
{
    run_sequence_collect(ctx, num_workers, items, solve, discard).await
}

pub async fn run_sequence_collect<T, S, Fut, C, R, E>(
    ctx: &RunContext,
    num_workers: usize,
    items: impl IntoIterator<Item = T>,
    solve: S,
    collect: C,
) -> RunResult<(), E>
where
    T: Send + 'static,
    S: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    C: FnMut(R) -> Result<(), E>,
    R: Send + 'static,
    E: Send + 'static,
{
    BoundedExecutor::new(num_workers)
        .run(ctx, Sequence::new(items), solve, collect)
        .await
        .map(drop)
}

/// Обработка элементов из `fetch` без сбора результатов
pub async fn run_pull<T, F, S, Fut, E>(
    ctx: &RunContext,
    num_workers: usize,
    fetch: F,
    solve: S,
) -> RunResult<(), E>
where
    T: Send + 'static,
    F: FnMut() -> Result<Option<T>, E>,
    S: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Send + 'static,
{
    run_pull_collect(ctx, num_workers, fetch, solve, discard).await
}

/// `fetch` вызывается только из управляющего цикла, никогда конкурентно
pub async fn run_pull_collect<T, F, S, Fut, C, R, E>(
    ctx: &RunContext,
    num_workers: usize,
    fetch: F,
    solve: S,
    collect: C,
) -> RunResult<(), E>
where
    T: Send + 'static,
    F: FnMut() -> Result<Option<T>, E>,
    S: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    C: FnMut(R) -> Result<(), E>,
    R: Send + 'static,
    E: Send + 'static,
{
    BoundedExecutor::new(num_workers)
        .run(ctx, Pull::new(fetch), solve, collect)
        .await
        .map(drop)
}

#[inline]
fn discard<E>(_: ()) -> Result<(), E> {
    Ok(())
}

/// Оборачивает синхронную функцию в `solve`, выполняемый через `spawn_blocking`.
///
/// Паника внутри `f` пробрасывается дальше и превращается в `RunError::Panic`.
pub fn blocking<T, R, E, F>(f: F) -> impl Fn(T) -> BoxFuture<'static, Result<R, E>> + Send + Sync + 'static
where
    T: Send + 'static,
    R: Send + 'static,
    E: Send + 'static,
    F: Fn(T) -> Result<R, E> + Send + Sync + 'static,
{
    let f = Arc::new(f);
    move |item: T| -> BoxFuture<'static, Result<R, E>> {
        let f = Arc::clone(&f);
        Box::pin(async move {
            match tokio::task::spawn_blocking(move || f(item)).await {
                Ok(result) => result,
                Err(join_err) => match join_err.try_into_panic() {
                    Ok(payload) => std::panic::resume_unwind(payload),
                    Err(join_err) => std::panic::panic_any(join_err.to_string()),
                },
            }
        })
    }
}
