//! Basic place search functionality
//!
//! This example demonstrates the fundamental search operations:
//! - Creating a gazetteer instance using embedded data
//! - Scoped and global searches
//! - Typo-tolerant matching
//! - Working with search results and configurations

use gazetteer::{Gazetteer, Scope, SearchConfigBuilder, SearchResult};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Create a gazetteer instance using embedded data (no downloads needed)
    let gazetteer = Gazetteer::new_embedded()?;

    // Search within one country
    println!("Searching for 'beirut' in Lebanon:");
    let results = gazetteer.search("beirut", "en", &Scope::country("LB"))?;
    print_search_results(&results, 3);

    // Search across every country
    println!("\nSearching for 'paris' globally:");
    let results = gazetteer.search("paris", "en", &Scope::Global)?;
    print_search_results(&results, 3);

    // Misspellings still match
    println!("\nSearching for the typo 'marseill' in France:");
    let results = gazetteer.search("marseill", "en", &Scope::country("FR"))?;
    print_search_results(&results, 3);

    // Search with a one-off configuration
    println!("\nComprehensive search for 'north' in Lebanon:");
    let config = SearchConfigBuilder::comprehensive().limit(5).build();
    let results = gazetteer.search_with_config("north", "en", &Scope::country("LB"), &config)?;
    print_search_results(&results, 5);

    Ok(())
}

fn print_search_results(results: &SearchResult, limit: usize) {
    for (i, place) in results.places.iter().take(limit).enumerate() {
        println!(
            "  {}. {} ({}, {}) - {}",
            i + 1,
            place.name,
            place.state_name,
            place.country_code,
            place.kind
        );
    }

    if results.len() > limit {
        println!("  ... and {} more results", results.len() - limit);
    }
    if results.from_cache {
        println!("  (served from cache)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_test_env() {
        let _ = gazetteer::init_logging(tracing::Level::WARN);
    }

    #[test]
    fn test_basic_search_example() {
        setup_test_env();
        assert!(main().is_ok(), "Basic search example should run successfully");
    }
}
