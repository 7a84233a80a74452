use super::error::FilterError;
use super::types::PageWindow;

/// A resolved page of a collection of `count` records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u64,
    pub num_pages: u64,
    pub page_size: u32,
    pub count: u64,
}

impl Page {
    /// Resolve the raw `page` parameter; absent or empty means page 1.
    /// Page 1 of an empty collection is valid; anything past the last page
    /// is not.
    pub fn resolve(raw: Option<&str>, count: u64, page_size: u32) -> Result<Self, FilterError> {
        let page_size = page_size.max(1);
        let num_pages = count.div_ceil(page_size as u64).max(1);

        let number = match raw.filter(|s| !s.is_empty()).map(str::trim) {
            None => 1,
            Some("last") => num_pages,
            Some(s) => {
                let n: i64 = s
                    .parse()
                    .map_err(|_| FilterError::InvalidPage(format!("'{}' is not an integer", s)))?;
                if n < 1 {
                    return Err(FilterError::InvalidPage(format!("{} is less than 1", n)));
                }
                n as u64
            }
        };

        if number > num_pages {
            return Err(FilterError::InvalidPage(format!("page {} contains no results", number)));
        }

        Ok(Self {
            number,
            num_pages,
            page_size,
            count,
        })
    }

    pub fn window(&self) -> PageWindow {
        PageWindow {
            limit: self.page_size as i64,
            offset: ((self.number - 1) * self.page_size as u64) as i64,
        }
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_collection_has_first_page() {
        let page = Page::resolve(None, 0, 20).unwrap();
        assert_eq!(page.number, 1);
        assert_eq!(page.num_pages, 1);
        assert!(!page.has_next());
        assert!(!page.has_previous());
        assert!(Page::resolve(Some("2"), 0, 20).is_err());
        assert_eq!(Page::resolve(Some(""), 0, 20).unwrap().number, 1);
    }

    #[test]
    fn resolves_numbers_and_last() {
        let page = Page::resolve(Some("2"), 45, 20).unwrap();
        assert_eq!(page.window(), PageWindow { limit: 20, offset: 20 });
        assert!(page.has_next());
        assert!(page.has_previous());

        let last = Page::resolve(Some("last"), 45, 20).unwrap();
        assert_eq!(last.number, 3);
        assert!(!last.has_next());
    }

    #[test]
    fn rejects_invalid_pages() {
        for raw in ["0", "-1", "abc", " ", "4", "1.5"] {
            assert!(
                matches!(Page::resolve(Some(raw), 45, 20), Err(FilterError::InvalidPage(_))),
                "page {:?} should be invalid",
                raw
            );
        }
    }
}
