use catalog_client::{total_pages, QueryState};
use shared::protocol::ResponseEnvelope;

pub fn page_summary(state: &QueryState, response: &ResponseEnvelope) -> String {
    let pages = total_pages(response.data.total, state.page_size);
    let filter = if state.search.is_empty() {
        "all heroes".to_string()
    } else {
        format!("names starting with '{}'", state.search)
    };
    format!(
        "{filter}: page {}/{pages}, {} per page, {} total",
        state.display_page(),
        state.page_size,
        response.data.total
    )
}

pub fn hero_lines(response: &ResponseEnvelope) -> Vec<String> {
    response
        .data
        .results
        .iter()
        .map(|hero| match hero.thumbnail.url() {
            Some(url) => format!("  #{:<8} {}  ({url})", hero.id.0, hero.name),
            None => format!("  #{:<8} {}", hero.id.0, hero.name),
        })
        .collect()
}
