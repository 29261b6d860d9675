//! Исполнитель задач с ограниченным параллелизмом
//!
//! # Features
//! - Не больше N элементов в работе одновременно
//! - Два источника входа: конечная последовательность и pull-функция
//! - Сбор результатов в одном управляющем цикле, в порядке завершения
//! - Первая ошибка источника, воркера или коллектора завершает запуск
//! - Отмена и дедлайны через `CancellationToken`
//! - Все воркеры дожидаются перед возвратом, даже при ошибке

pub mod context;
pub mod errors;
pub mod model;
pub mod pool;
pub mod result;
pub mod run;
pub mod source;

pub use context::RunContext;
pub use errors::{CancelReason, RunError};
pub use model::RunMetrics;
pub use pool::{BoundedExecutor, Config};
pub use result::RunResult;
pub use run::{blocking, run_pull, run_pull_collect, run_sequence, run_sequence_collect};
pub use source::{Pull, Sequence, Source};
