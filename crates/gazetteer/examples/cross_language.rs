//! Cross-language search and display translation
//!
//! This example demonstrates the multilingual features:
//! - Wiring a translation provider into the gazetteer
//! - Query-translation fallback for non-Latin scripts
//! - Localized display names with the original preserved
//! - Cache invalidation after dataset or translation changes
//!
//! It uses a [`StaticTranslator`] so it runs offline; swap in
//! [`HttpTranslator`](gazetteer::HttpTranslator) (with the
//! `GOOGLE_TRANSLATE_API_KEY` environment variable set) for real
//! translations.

use std::sync::Arc;

use gazetteer::{Gazetteer, Scope, StaticTranslator};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let translator = StaticTranslator::new()
        .with_entry("en", "بيروت", "Beirut")
        .with_entry("ar", "Beirut", "بيروت")
        .with_entry("fr", "Beirut", "Beyrouth")
        .with_entry("fr", "Tripoli", "Tripoli");

    let gazetteer = Gazetteer::builder()
        .translation_provider(Arc::new(translator))
        .build()?;

    // An Arabic query finds nothing directly, so it is translated to
    // English and retried.
    println!("Searching for 'بيروت' in Arabic:");
    let results = gazetteer.search("بيروت", "ar", &Scope::country("LB"))?;
    println!("  resolved query: {}", results.resolved_query);
    if let Some(alternate) = &results.alternate_query {
        println!("  original query: {alternate}");
    }
    for place in &results.places {
        println!("  {} (canonical: {})", place.name, place.canonical_name());
    }

    // French requests get French display names where the provider knows
    // them; the canonical English name stays available.
    println!("\nSearching for 'beirut' in French:");
    let results = gazetteer.search("beirut", "fr", &Scope::country("LB"))?;
    for place in &results.places {
        println!(
            "  {} (canonical: {}, translation: {:?})",
            place.name,
            place.canonical_name(),
            place.translation
        );
    }

    // The translation is now cached, so the French name itself matches.
    println!("\nSearching for 'beyrouth' in French:");
    let results = gazetteer.search("beyrouth", "fr", &Scope::country("LB"))?;
    for place in &results.places {
        println!("  {} (canonical: {})", place.name, place.canonical_name());
    }

    // Dropping one country's cache forces fresh searches there.
    let invalidated = gazetteer.invalidate_scope("LB");
    println!("\nInvalidated Lebanon cache: {invalidated}");
    let results = gazetteer.search("beirut", "fr", &Scope::country("LB"))?;
    println!("  fresh search, from_cache: {}", results.from_cache);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_test_env() {
        let _ = gazetteer::init_logging(tracing::Level::WARN);
    }

    #[test]
    fn test_cross_language_example() {
        setup_test_env();
        assert!(main().is_ok(), "Cross-language example should run successfully");
    }
}
