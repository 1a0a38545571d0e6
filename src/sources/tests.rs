use std::collections::HashSet;

use super::{catalog::*, *};

#[test]
fn test_catalog_keys_are_unique() {
    let builtin: HashSet<_> = BUILTIN_SOURCES.iter().map(|e| e.key).collect();
    assert_eq!(builtin.len(), BUILTIN_SOURCES.len());

    let popular: HashSet<_> = POPULAR_SOURCES.iter().map(|e| e.key).collect();
    assert_eq!(popular.len(), POPULAR_SOURCES.len());
    assert_eq!(POPULAR_SOURCES.len(), 33);
}

#[test]
fn test_popular_groups_cover_catalog() {
    let grouped: usize = SourceGroup::ALL.iter().map(|g| popular_in(*g).count()).sum();
    assert_eq!(grouped, POPULAR_SOURCES.len());
    assert!(popular_in(SourceGroup::Exchanges).any(|e| e.key == "kraken_blog"));
}

#[test]
fn test_resolve_enabled_default_settings() {
    let settings = BotSettings::default();

    let sources = resolve_enabled(&settings);

    // whaletracker and lookonchain are disabled and not in any catalog.
    assert_eq!(sources.len(), 9);
    let coindesk = sources.iter().find(|s| s.key == "coindesk").unwrap();
    assert_eq!(coindesk.name, "CoinDesk");
    assert_eq!(coindesk.language.as_deref(), Some("en"));
}

#[test]
fn test_resolve_enabled_precedence_and_unknown() {
    let mut settings = BotSettings::default();
    settings.sources_enabled.clear();
    settings.quick_add_source("theblock");
    settings.quick_add_source("does_not_exist");
    let (key, mut spec) = parse_source_input("CoinDesk|https://mirror.example/").unwrap();
    spec.name = "Mirror".to_string();
    settings.add_custom_source(&key, spec);
    settings.sources_enabled.insert("decrypt".to_string(), false);

    let sources = resolve_enabled(&settings);

    let keys: Vec<_> = sources.iter().map(|s| s.key.as_str()).collect();
    assert_eq!(keys, vec!["coindesk", "theblock"]);
    // Built-in definitions win over custom ones with the same key.
    assert_eq!(sources[0].name, "CoinDesk");
    assert_eq!(sources[1].name, "The Block");
}

#[test]
fn test_source_key() {
    assert_eq!(source_key("My Crypto-News!"), "mycryptonews");
    assert_eq!(source_key("A Very Long Source Name Indeed"), "averylongsourcenamei");
    assert_eq!(source_key("!!!"), "");
}

#[test]
fn test_parse_source_input_defaults() {
    let (key, spec) = parse_source_input(" Crypto Site | https://crypto.example/news ").unwrap();

    assert_eq!(key, "cryptosite");
    assert_eq!(spec.name, "Crypto Site");
    assert_eq!(spec.url, "https://crypto.example/news");
    assert_eq!(spec.list_selector, "h2 a, h3 a, article a");
    assert_eq!(spec.title_selector, "h1");
    assert_eq!(spec.content_selector, "div.content, div.post-content, div.entry-content, article");
}

#[test]
fn test_parse_source_input_custom_selectors() {
    let (_, spec) =
        parse_source_input("Site|https://s.example/|ul.news a|h1.title|div.body").unwrap();

    assert_eq!(spec.list_selector, "ul.news a");
    assert_eq!(spec.title_selector, "h1.title");
    assert_eq!(spec.content_selector, "div.body");
}

#[test]
fn test_parse_source_input_errors() {
    assert_eq!(parse_source_input("only-name"), Err(SourceInputError::Format));
    assert_eq!(parse_source_input("!!|https://x.example/"), Err(SourceInputError::EmptyName));
    assert!(matches!(
        parse_source_input("Site|not a url"),
        Err(SourceInputError::InvalidUrl(_))
    ));
    assert!(matches!(
        parse_source_input("Site|ftp://x.example/"),
        Err(SourceInputError::InvalidUrl(_))
    ));
}

#[test]
fn test_display_name() {
    let settings = BotSettings::default();
    assert_eq!(display_name(&settings, "cointelegraph"), "CoinTelegraph");
    assert_eq!(display_name(&settings, "whaletracker"), "whaletracker");
}

#[test]
fn test_entries_include_disabled_sources() {
    let settings = BotSettings::default();

    let entries = entries(&settings);

    assert_eq!(entries.len(), settings.sources_enabled.len());
    let lookonchain = entries.iter().find(|e| e.key == "lookonchain").unwrap();
    assert!(!lookonchain.enabled);
    let coindesk = entries.iter().find(|e| e.key == "coindesk").unwrap();
    assert_eq!(coindesk.name, "CoinDesk");
    assert!(coindesk.enabled);
}
