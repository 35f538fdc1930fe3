/// Page size requested from the photo feed; the feed caps `max-results` here.
pub const MAX_PAGE_SIZE: u32 = 500;

/// A remote album.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Album {
    pub id: String,
    pub title: String,
}

/// A photo entry inside an album.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub title: String,
    /// Full-resolution content URI. Empty when the feed omitted it.
    pub source_uri: String,
}

/// One pagination step: 1-based start index and the page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub start_index: u32,
    pub page_size: u32,
}

impl PageCursor {
    pub fn first(page_size: u32) -> Self {
        Self {
            start_index: 1,
            page_size,
        }
    }

    /// Cursor for the page after one that returned `returned` entries.
    pub fn advance(self, returned: usize) -> Self {
        let returned = u32::try_from(returned).unwrap_or(u32::MAX);
        Self {
            start_index: self.start_index.saturating_add(returned),
            page_size: self.page_size,
        }
    }

    /// Only a page of exactly the requested size may have a successor.
    pub fn is_last_page(&self, returned: usize) -> bool {
        returned != self.page_size as usize
    }
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::first(MAX_PAGE_SIZE)
    }
}
