use serde::Serialize;

use crate::params::QueryParams;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 25;

/// Requested page, read from the `page` and `limit` query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pageable {
    pub page: u64,
    pub limit: u64,
}

impl Default for Pageable {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pageable {
    /// Both values are clamped to at least 1.
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Absent, non-numeric or zero values fall back to the defaults;
    /// negative values are clamped to 1.
    pub fn from_params(params: &QueryParams) -> Self {
        Self {
            page: read_positive(params.get("page"), DEFAULT_PAGE),
            limit: read_positive(params.get("limit"), DEFAULT_LIMIT),
        }
    }

    /// Number of documents before this page: `(page - 1) * limit`.
    pub fn start_index(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// `page * limit`.
    pub fn end_index(&self) -> u64 {
        self.page.saturating_mul(self.limit)
    }

    pub fn window(&self, total: u64) -> PageWindow {
        PageWindow {
            page: self.page,
            limit: self.limit,
            start_index: self.start_index(),
            end_index: self.end_index(),
            total,
        }
    }
}

/// The pagination state of one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageWindow {
    pub page: u64,
    pub limit: u64,
    pub start_index: u64,
    pub end_index: u64,
    pub total: u64,
}

impl PageWindow {
    pub fn links(&self) -> PaginationLinks {
        let next = (self.end_index < self.total).then(|| PageLink {
            page: self.page + 1,
            limit: self.limit,
        });
        let prev = (self.start_index > 0).then(|| PageLink {
            page: self.page - 1,
            limit: self.limit,
        });
        PaginationLinks { next, prev }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageLink {
    pub page: u64,
    pub limit: u64,
}

/// Cursors to the neighbouring pages. Absent cursors are omitted from JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PaginationLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageLink>,
}

fn read_positive(raw: Option<&str>, default: u64) -> u64 {
    match raw.and_then(parse_int_prefix) {
        None | Some(0) => default,
        Some(n) if n < 0 => 1,
        Some(n) => n as u64,
    }
}

/// Parse the leading integer of a string the way lenient query parsers do:
/// `"3abc"` is 3, `"2.5"` is 2, `"abc"` is nothing.
fn parse_int_prefix(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let len = digits.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return None;
    }
    let magnitude = digits[..len].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pageable(raw: &str) -> Pageable {
        Pageable::from_params(&QueryParams::parse(raw))
    }

    #[test]
    fn defaults_apply_when_absent() {
        assert_eq!(pageable(""), Pageable { page: 1, limit: 25 });
        assert_eq!(pageable("page=1&limit=25"), Pageable::default());
    }

    #[test]
    fn lenient_integer_parsing() {
        assert_eq!(pageable("page=3abc&limit=2.5"), Pageable { page: 3, limit: 2 });
        assert_eq!(pageable("page=abc&limit=ten"), Pageable::default());
        assert_eq!(pageable("page=0&limit=0"), Pageable::default());
        assert_eq!(pageable("page=-4&limit=-1"), Pageable { page: 1, limit: 1 });
        assert_eq!(pageable("page=%202"), Pageable { page: 2, limit: 25 });
    }

    #[test]
    fn first_page_of_120() {
        let window = Pageable::new(1, 25).window(120);
        assert_eq!((window.start_index, window.end_index), (0, 25));
        let links = window.links();
        assert_eq!(links.prev, None);
        assert_eq!(links.next, Some(PageLink { page: 2, limit: 25 }));
    }

    #[test]
    fn last_page_of_120() {
        let window = Pageable::new(5, 25).window(120);
        assert_eq!((window.start_index, window.end_index), (100, 125));
        let links = window.links();
        assert_eq!(links.prev, Some(PageLink { page: 4, limit: 25 }));
        assert_eq!(links.next, None);
    }

    #[test]
    fn exact_boundary_has_no_next() {
        let links = Pageable::new(2, 10).window(20).links();
        assert_eq!(links.next, None);
        assert_eq!(links.prev, Some(PageLink { page: 1, limit: 10 }));
    }

    #[test]
    fn absent_links_are_omitted_not_null() {
        let only_page = Pageable::default().window(3).links();
        assert_eq!(serde_json::to_value(only_page).unwrap(), json!({}));

        let middle = Pageable::new(2, 1).window(3).links();
        assert_eq!(
            serde_json::to_value(middle).unwrap(),
            json!({"next": {"page": 3, "limit": 1}, "prev": {"page": 1, "limit": 1}})
        );
    }

    #[test]
    fn huge_pages_do_not_overflow() {
        let window = Pageable::new(u64::MAX, u64::MAX).window(10);
        assert_eq!(window.end_index, u64::MAX);
        assert_eq!(window.links().next, None);
    }
}
