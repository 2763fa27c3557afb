use serde::{Deserialize, Serialize};

use crate::normalization::SearchResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDescriptor {
    pub page_number: u32,
    pub is_current: bool,
}

/// The slice of `items` shown on 1-based `page`. Empty when the page is out of range,
/// `page` is 0 or `page_size` is 0.
pub fn paginate<T>(items: &[T], page: u32, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let lower = (page as usize - 1).saturating_mul(page_size);
    if lower >= items.len() {
        return &[];
    }
    let upper = lower.saturating_add(page_size).min(items.len());
    &items[lower..upper]
}

/// Number of pages needed for `total` items.
pub fn page_count(total: usize, page_size: usize) -> u32 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size).try_into().unwrap_or(u32::MAX)
}

/// One descriptor per page of the full (unsliced) result list.
pub fn page_descriptors(total: usize, page_size: usize, page: u32) -> Vec<PageDescriptor> {
    (1..=page_count(total, page_size))
        .map(|page_number| PageDescriptor {
            page_number,
            is_current: page_number == page,
        })
        .collect()
}

/// One rendered page of a search, as handed to the API and the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPage {
    pub query: String,
    pub scope: String,
    pub page: u32,
    /// Size of the merged list before slicing.
    pub total: usize,
    pub results: Vec<SearchResult>,
    pub pages: Vec<PageDescriptor>,
}

impl SearchPage {
    pub fn build(
        query: &str,
        scope: &str,
        results: &[SearchResult],
        page: u32,
        page_size: usize,
    ) -> Self {
        Self {
            query: query.to_string(),
            scope: scope.to_string(),
            page,
            total: results.len(),
            results: paginate(results, page, page_size).to_vec(),
            pages: page_descriptors(results.len(), page_size, page),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_twelve_items_into_pages_of_five() {
        let items: Vec<u32> = (0..12).collect();
        assert_eq!(paginate(&items, 1, 5), &items[0..5]);
        assert_eq!(paginate(&items, 2, 5), &items[5..10]);
        assert_eq!(paginate(&items, 3, 5), &items[10..12]);
        assert!(paginate(&items, 4, 5).is_empty());
    }

    #[test]
    fn degenerate_inputs_give_empty_pages() {
        let items = [1, 2, 3];
        assert!(paginate(&items, 0, 5).is_empty());
        assert!(paginate(&items, 1, 0).is_empty());
        assert!(paginate::<u8>(&[], 1, 5).is_empty());
        assert!(paginate(&items, u32::MAX, usize::MAX).is_empty());
    }

    #[test]
    fn descriptors_cover_the_full_list_and_mark_current() {
        let pages = page_descriptors(12, 5, 2);
        assert_eq!(pages.len(), 3);
        assert_eq!(
            pages.iter().map(|p| p.page_number).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(
            pages.iter().filter(|p| p.is_current).map(|p| p.page_number).collect::<Vec<_>>(),
            vec![2]
        );
    }

    #[test]
    fn descriptor_edge_counts() {
        assert!(page_descriptors(0, 5, 1).is_empty());
        assert_eq!(page_descriptors(5, 5, 1).len(), 1);
        assert_eq!(page_descriptors(6, 5, 1).len(), 2);
        assert!(page_descriptors(6, 0, 1).is_empty());
        // requested page past the end: nothing is current
        assert!(page_descriptors(6, 5, 9).iter().all(|p| !p.is_current));
    }

    #[test]
    fn search_page_keeps_pre_slice_total() {
        use crate::normalization::{ResultKind, SearchResult};
        let results: Vec<SearchResult> = (0..7)
            .map(|i| SearchResult {
                kind: ResultKind::Game,
                name: format!("g{i}"),
                image: "i".into(),
                description: String::new(),
            })
            .collect();
        let page = SearchPage::build("ggg", "games", &results, 2, 5);
        assert_eq!(page.total, 7);
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.pages.len(), 2);
    }
}
