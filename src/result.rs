use super::errors::RunError;

pub type RunResult<T, E> = Result<T, RunError<E>>;
