use anyhow::Result;
use serde::Serialize;

/// Page number as requested by a caller, before it is resolved against a result count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageRequest {
    /// No page given, or a value that is not an integer.
    #[default]
    First,
    Number(i64),
}

impl PageRequest {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim) else {
            return PageRequest::First;
        };
        if let Ok(n) = raw.parse::<i64>() {
            return PageRequest::Number(n);
        }
        // Integers too large for i64 still count as page numbers.
        let (negative, digits) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw.strip_prefix('+').unwrap_or(raw)),
        };
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            return PageRequest::Number(if negative { i64::MIN } else { i64::MAX });
        }
        PageRequest::First
    }
}

impl From<usize> for PageRequest {
    fn from(value: usize) -> Self {
        PageRequest::Number(value as i64)
    }
}

/// A concrete, in-range page of a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: usize,
    pub total_pages: usize,
    pub offset: usize,
    pub limit: usize,
}

impl PageWindow {
    /// Resolves a requested page against `total` results.
    ///
    /// There is always at least one page, even for an empty result set. Pages past the end
    /// and pages below 1 both resolve to the last page; a missing or non-numeric page
    /// resolves to the first one.
    pub fn resolve(total: usize, page_size: usize, request: PageRequest) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total.div_ceil(page_size).max(1);
        let page = match request {
            PageRequest::First => 1,
            PageRequest::Number(n) if n < 1 => total_pages,
            PageRequest::Number(n) => (n as u64).min(total_pages as u64) as usize,
        };
        PageWindow {
            page,
            total_pages,
            offset: (page - 1) * page_size,
            limit: page_size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
    pub page_size: usize,
}

impl<T> Page<T> {
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            total_pages: self.total_pages,
            page_size: self.page_size,
        }
    }
}

/// Counts, resolves the requested page, then fetches just that window.
pub fn paginate<T, C, F>(
    page_size: usize,
    request: PageRequest,
    count: C,
    fetch: F,
) -> Result<Page<T>>
where
    C: FnOnce() -> Result<usize>,
    F: FnOnce(usize, usize) -> Result<Vec<T>>,
{
    let total = count()?;
    let window = PageWindow::resolve(total, page_size, request);
    let items = if total == 0 {
        Vec::new()
    } else {
        fetch(window.offset, window.limit)?
    };
    Ok(Page {
        items,
        total,
        page: window.page,
        total_pages: window.total_pages,
        page_size: window.limit,
    })
}
