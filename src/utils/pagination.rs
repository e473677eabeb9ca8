/// One slot in the page-number strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

/// Page numbers to show around `page`: all of them up to seven pages,
/// otherwise first, last and the neighbours of `page` with gaps elided.
pub fn page_window(page: u32, total_pages: u32) -> Vec<PageItem> {
    if total_pages <= 7 {
        return (1..=total_pages).map(PageItem::Page).collect();
    }

    let mut items = vec![PageItem::Page(1)];
    if page > 3 {
        items.push(PageItem::Ellipsis);
    }
    let start = page.saturating_sub(1).max(2);
    let end = (page + 1).min(total_pages - 1);
    items.extend((start..=end).map(PageItem::Page));
    if page + 2 < total_pages {
        items.push(PageItem::Ellipsis);
    }
    items.push(PageItem::Page(total_pages));
    items
}

/// 1-based inclusive row range shown on `page`, clamped to `total`.
pub fn visible_range(page: u32, limit: u32, total: usize) -> (usize, usize) {
    let page = page.max(1) as usize;
    let limit = limit as usize;
    let from = ((page - 1) * limit + 1).min(total);
    let to = (page * limit).min(total);
    (from, to)
}

pub fn summary(page: u32, limit: u32, total: usize) -> String {
    let (from, to) = visible_range(page, limit, total);
    format!("Showing {}–{} of {} users", from, to, total)
}

#[cfg(test)]
mod tests {
    use super::PageItem::{Ellipsis, Page};
    use super::*;

    #[test]
    fn small_page_counts_list_everything() {
        assert_eq!(page_window(1, 3), vec![Page(1), Page(2), Page(3)]);
        assert!(page_window(1, 0).is_empty());
    }

    #[test]
    fn large_page_counts_elide_gaps() {
        assert_eq!(
            page_window(1, 10),
            vec![Page(1), Page(2), Ellipsis, Page(10)]
        );
        assert_eq!(
            page_window(5, 10),
            vec![Page(1), Ellipsis, Page(4), Page(5), Page(6), Ellipsis, Page(10)]
        );
        assert_eq!(
            page_window(10, 10),
            vec![Page(1), Ellipsis, Page(9), Page(10)]
        );
    }

    #[test]
    fn summary_clamps_to_total() {
        assert_eq!(summary(3, 8, 20), "Showing 17–20 of 20 users");
        assert_eq!(summary(1, 8, 0), "Showing 0–0 of 0 users");
        assert_eq!(visible_range(5, 8, 20), (20, 20));
    }
}
