use thiserror::Error;

/// Причина, по которой контекст запуска был отменен
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum CancelReason {
    #[error("run cancelled")]
    Cancelled,
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

/// Терминальная ошибка запуска.
///
/// Ошибки вызывающей стороны (`Source`, `Worker`, `Collect`) возвращаются как есть,
/// `Display` совпадает с `Display` исходной ошибки.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError<E> {
    #[error("{0}")]
    Source(E),
    #[error("{0}")]
    Worker(E),
    #[error("{0}")]
    Collect(E),
    #[error("{0}")]
    Cancelled(CancelReason),
    #[error("worker panicked: {0}")]
    Panic(String),
    #[error("worker channel closed")]
    ChannelClosed,
}

impl<E> RunError<E> {
    pub fn kind(&self) -> &'static str {
        match self {
            RunError::Source(_) => "source",
            RunError::Worker(_) => "worker",
            RunError::Collect(_) => "collect",
            RunError::Cancelled(_) => "cancelled",
            RunError::Panic(_) => "panic",
            RunError::ChannelClosed => "channel_closed",
        }
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunError::Cancelled(_))
    }

    pub fn cancel_reason(&self) -> Option<CancelReason> {
        match self {
            RunError::Cancelled(reason) => Some(*reason),
            _ => None,
        }
    }

    /// Ошибка, которую вернул `fetch`, `solve` или `collect`
    pub fn into_inner(self) -> Option<E> {
        match self {
            RunError::Source(e) | RunError::Worker(e) | RunError::Collect(e) => Some(e),
            _ => None,
        }
    }
}
