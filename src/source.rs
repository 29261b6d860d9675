//! Источники входных данных для [`BoundedExecutor`](crate::pool::BoundedExecutor).
//!
//! Оба варианта вызываются только из управляющего цикла и никогда конкурентно,
//! поэтому `fetch` принимает `&mut self`.

/// Поставщик элементов.
///
/// `Ok(Some(item))` - очередной элемент, `Ok(None)` - источник исчерпан,
/// `Err(e)` - терминальная ошибка источника.
pub trait Source<E> {
    type Item;

    fn fetch(&mut self) -> Result<Option<Self::Item>, E>;

    /// Точное количество оставшихся элементов, если оно известно заранее
    fn remaining(&self) -> Option<usize> {
        None
    }
}

/// Конечная упорядоченная последовательность с внутренним курсором
#[derive(Debug, Clone)]
pub struct Sequence<T> {
    items: std::vec::IntoIter<T>,
}

impl<T> Sequence<T> {
    pub fn new<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self {
            items: items.into_iter().collect::<Vec<_>>().into_iter(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.len() == 0
    }
}

impl<T> FromIterator<T> for Sequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<T, E> Source<E> for Sequence<T> {
    type Item = T;

    #[inline]
    fn fetch(&mut self) -> Result<Option<T>, E> {
        Ok(self.items.next())
    }

    fn remaining(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

/// Источник поверх пользовательской функции `fetch`.
///
/// Состояние курсора целиком принадлежит функции, исполнитель его не трогает.
pub struct Pull<F> {
    fetch: F,
}

impl<F> Pull<F> {
    pub fn new(fetch: F) -> Self {
        Self { fetch }
    }
}

impl<F, T, E> Source<E> for Pull<F>
where
    F: FnMut() -> Result<Option<T>, E>,
{
    type Item = T;

    #[inline]
    fn fetch(&mut self) -> Result<Option<T>, E> {
        (self.fetch)()
    }
}
