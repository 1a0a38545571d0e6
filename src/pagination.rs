/// Pagination structure for long keyboard lists (sources).
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct Paginated<T> {
    /// Every item.
    pub items: Vec<T>,
    /// Current page, 1-based.
    pub page: usize,
    /// Items per page.
    pub page_size: usize,
    /// Number of items.
    pub total_items: usize,
    /// Number of pages.
    pub total_pages: usize,
}

impl<T> Paginated<T> {
    /// Items per page.
    pub const DEFAULT_PAGE_SIZE: usize = 10;

    /// Paginate `items` and select `page` (1-based). Out of range pages are
    /// clamped.
    pub fn new(items: Vec<T>, page: usize) -> Self {
        let page_size = Self::DEFAULT_PAGE_SIZE;
        let total_items = items.len();
        let total_pages = total_items.div_ceil(page_size);
        let page = page.clamp(1, total_pages.max(1));

        Paginated { items, page, page_size, total_items, total_pages }
    }

    /// Whether a next page exists.
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Whether a previous page exists.
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Items of the current page.
    pub fn get_page_items(&self) -> &[T] {
        let start = ((self.page - 1) * self.page_size).min(self.total_items);
        let end = (start + self.page_size).min(self.total_items);
        &self.items[start..end]
    }
}
