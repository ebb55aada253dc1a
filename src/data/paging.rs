use std::num::NonZeroUsize;

use serde::Serialize;

use crate::error::{StoreError, StoreResult};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PageLength {
    Limited(NonZeroUsize),
    /// Everything fits on page 1. Used by exports.
    Unbounded,
}

/// 1-indexed page request.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PageState {
    pub page: usize,
    pub page_length: PageLength,
}

impl PageState {
    pub fn new(page: usize, page_length: usize) -> StoreResult<PageState> {
        let length = NonZeroUsize::new(page_length)
            .ok_or_else(|| StoreError::validation("page length", "must be at least 1"))?;

        Ok(PageState {
            page,
            page_length: PageLength::Limited(length),
        })
    }

    pub fn unbounded() -> PageState {
        PageState {
            page: 1,
            page_length: PageLength::Unbounded,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub total_pages: usize,
}

/// Slices an already ordered sequence. Pages outside `1..=total_pages`
/// produce an empty slice, never an error.
pub fn paginate<T>(items: Vec<T>, state: PageState) -> Paged<T> {
    let total = items.len();

    let (total_pages, skip, take) = match state.page_length {
        PageLength::Limited(length) => {
            let length = length.get();
            let skip = state.page.saturating_sub(1).saturating_mul(length);
            (total.div_ceil(length), skip, length)
        }
        PageLength::Unbounded => {
            let skip = if state.page == 1 { 0 } else { total };
            (usize::from(total > 0), skip, total)
        }
    };

    let items = if state.page == 0 || skip >= total {
        Vec::new()
    } else {
        items.into_iter().skip(skip).take(take).collect()
    };

    Paged {
        items,
        total,
        total_pages,
    }
}
