use chrono::{DateTime, Utc};

use crate::error::SearchParamsError;

/// Validated filter and pagination for a product search.
///
/// Both bounds are inclusive. Pages are zero-based and only allowed together
/// with a limit: the search skips `page * limit` rows and returns at most
/// `limit`. Results are ordered by creation time, oldest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductSearch {
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
    page: Option<i64>,
    limit: Option<i64>,
}

impl ProductSearch {
    /// Builds a search, rejecting inconsistent parameters.
    pub fn new(
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Self, SearchParamsError> {
        if let (Some(from), Some(to)) = (from, to)
            && to < from
        {
            return Err(SearchParamsError::FromAfterTo);
        }
        if let Some(page) = page
            && page < 0
        {
            return Err(SearchParamsError::InvalidPage(page));
        }
        if let Some(limit) = limit
            && limit <= 0
        {
            return Err(SearchParamsError::InvalidLimit(limit));
        }
        match (page, limit) {
            (Some(_), None) => return Err(SearchParamsError::PageWithoutLimit),
            (Some(page), Some(limit)) if page.checked_mul(limit).is_none() => {
                return Err(SearchParamsError::InvalidPage(page));
            }
            _ => {}
        }

        Ok(Self {
            from,
            to,
            page,
            limit,
        })
    }

    /// A search without filters or pagination.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn from(&self) -> Option<DateTime<Utc>> {
        self.from
    }

    pub fn to(&self) -> Option<DateTime<Utc>> {
        self.to
    }

    pub fn page(&self) -> Option<i64> {
        self.page
    }

    pub fn limit(&self) -> Option<i64> {
        self.limit
    }

    /// Number of rows to skip; present only when both page and limit are set.
    pub fn offset(&self) -> Option<i64> {
        match (self.page, self.limit) {
            (Some(page), Some(limit)) => Some(page * limit),
            _ => None,
        }
    }

    /// Returns true if a product created at `created_at` falls within the time range.
    pub fn matches(&self, created_at: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| from <= created_at) && self.to.is_none_or(|to| created_at <= to)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn rejects_to_before_from() {
        let now = Utc::now();
        let err = ProductSearch::new(Some(now), Some(now - Duration::hours(1)), None, None)
            .unwrap_err();
        assert_eq!(err, SearchParamsError::FromAfterTo);
        assert_eq!(err.to_string(), "from must be less than to");
    }

    #[test]
    fn accepts_equal_bounds() {
        let now = Utc::now();
        assert!(ProductSearch::new(Some(now), Some(now), None, None).is_ok());
    }

    #[test]
    fn rejects_negative_page() {
        let err = ProductSearch::new(None, None, Some(-1), Some(1)).unwrap_err();
        assert!(err.to_string().contains("invalid page"));
    }

    #[test]
    fn rejects_non_positive_limit() {
        let err = ProductSearch::new(None, None, Some(1), Some(0)).unwrap_err();
        assert!(err.to_string().contains("invalid limit"));
    }

    #[test]
    fn rejects_page_without_limit() {
        let err = ProductSearch::new(None, None, Some(1), None).unwrap_err();
        assert_eq!(err, SearchParamsError::PageWithoutLimit);
    }

    #[test]
    fn rejects_overflowing_offset() {
        assert!(ProductSearch::new(None, None, Some(i64::MAX), Some(2)).is_err());
    }

    #[test]
    fn limit_alone_has_no_offset() {
        let search = ProductSearch::new(None, None, None, Some(5)).unwrap();
        assert_eq!(search.offset(), None);
        assert_eq!(search.limit(), Some(5));
    }

    #[test]
    fn offset_is_page_times_limit() {
        let search = ProductSearch::new(None, None, Some(3), Some(10)).unwrap();
        assert_eq!(search.offset(), Some(30));
    }

    #[test]
    fn matches_is_inclusive() {
        let now = Utc::now();
        let search = ProductSearch::new(Some(now), Some(now), None, None).unwrap();
        assert!(search.matches(now));
        assert!(!search.matches(now + Duration::seconds(1)));
        assert!(!search.matches(now - Duration::seconds(1)));
        assert!(ProductSearch::all().matches(now));
    }
}
