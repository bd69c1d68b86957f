/*!
 * Packing of pages into request-sized chunks.
 *
 * Chunks are built greedily in page order. A page is added to the current
 * chunk unless that would push the chunk over the character budget, in which
 * case the chunk is closed first. A page whose own cost exceeds the budget
 * is sent alone and is never split.
 */

use log::debug;

use super::page::PageText;

/// Split `pages` into ordered, non-empty chunks whose summed cost stays within `budget`
pub fn chunk_pages(pages: &[PageText], budget: usize) -> Vec<Vec<PageText>> {
    let mut chunks: Vec<Vec<PageText>> = Vec::new();
    let mut current: Vec<PageText> = Vec::new();
    let mut current_cost = 0usize;

    for page in pages {
        let cost = page.estimated_cost();
        if !current.is_empty() && current_cost + cost > budget {
            chunks.push(std::mem::take(&mut current));
            current_cost = 0;
        }
        if cost > budget {
            debug!(
                "Page {} costs {} which exceeds the chunk budget of {}; sending it alone",
                page.page_number(),
                cost,
                budget
            );
        }
        current.push(page.clone());
        current_cost += cost;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    debug!("Packed {} pages into {} chunks (budget {})", pages.len(), chunks.len(), budget);
    chunks
}
