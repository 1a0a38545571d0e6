/// Section of the popular sources menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceGroup {
    /// English language outlets.
    International,
    /// Portuguese language outlets.
    Brazilian,
    /// Exchange blogs.
    Exchanges,
}

impl SourceGroup {
    /// Every group, in menu order.
    pub const ALL: [SourceGroup; 3] = [Self::International, Self::Brazilian, Self::Exchanges];

    /// Menu header.
    pub fn label(&self) -> &'static str {
        match self {
            Self::International => "🌍 International",
            Self::Brazilian => "🇧🇷 Brazilian",
            Self::Exchanges => "🏦 Exchanges",
        }
    }
}

/// A source shipped with the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Settings key.
    pub key: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Listing page.
    pub url: &'static str,
    /// Selects article links on the listing page.
    pub list_selector: &'static str,
    /// Selects the title on an article page.
    pub title_selector: &'static str,
    /// Selects the body on an article page.
    pub content_selector: &'static str,
    /// ISO 639-1 code.
    pub language: &'static str,
    /// Popular sources menu section.
    pub group: SourceGroup,
}

const fn entry(
    key: &'static str,
    name: &'static str,
    url: &'static str,
    selectors: [&'static str; 3],
    language: &'static str,
    group: SourceGroup,
) -> CatalogEntry {
    CatalogEntry {
        key,
        name,
        url,
        list_selector: selectors[0],
        title_selector: selectors[1],
        content_selector: selectors[2],
        language,
        group,
    }
}

use SourceGroup::{Brazilian, Exchanges, International};

/// Sources enabled out of the box.
pub const BUILTIN_SOURCES: &[CatalogEntry] = &[
    entry(
        "coindesk",
        "CoinDesk",
        "https://www.coindesk.com/",
        ["div.article-card, a.card-title", "h1", "div.at-text, div.content, article"],
        "en",
        International,
    ),
    entry(
        "cointelegraph",
        "CoinTelegraph",
        "https://cointelegraph.com/",
        ["li.posts-listing__item, article.post-card-inline", "h1", "div.post-content, article"],
        "en",
        International,
    ),
    entry(
        "decrypt",
        "Decrypt",
        "https://decrypt.co/",
        ["h3 a", "h1", "div.post-content"],
        "en",
        International,
    ),
    entry(
        "bitcoinmagazine",
        "BitcoinMagazine",
        "https://bitcoinmagazine.com/",
        ["h3 a", "h1", "div.m-detail--body, div.c-content, article"],
        "en",
        International,
    ),
    entry(
        "cryptoslate",
        "CryptoSlate",
        "https://cryptoslate.com/",
        ["div.list-post a, div.slate-post a", "h1", "div.post-content, article"],
        "en",
        International,
    ),
    entry(
        "utoday",
        "UToday",
        "https://u.today/news",
        ["div.news-item a, div.story-item a", "h1", "div.article-content, section.article_body"],
        "en",
        International,
    ),
    entry(
        "portaldobitcoin",
        "PortalDoBitcoin",
        "https://portaldobitcoin.uol.com.br/",
        ["h3 a, div.post-title a", "h1", "div.entry-content, div.post-content"],
        "pt",
        Brazilian,
    ),
    entry(
        "cointelegraphbr",
        "CoinTelegraphBR",
        "https://br.cointelegraph.com/",
        ["li.posts-listing__item", "h1", "div.post-content"],
        "pt",
        Brazilian,
    ),
    entry(
        "criptofacil",
        "CriptoFacil",
        "https://www.criptofacil.com/",
        ["div.posts-layout article", "h1", "div.entry-content"],
        "pt",
        Brazilian,
    ),
];

const WP: [&str; 3] = ["h2 a, h3 a", "h1", "div.entry-content"];

/// Well known sources that can be enabled with one tap.
pub const POPULAR_SOURCES: &[CatalogEntry] = &[
    entry(
        "coindesk_pt",
        "CoinDesk BR",
        "https://www.coindesk.com.br/",
        ["div.article-card a, h3 a", "h1", "div.at-text, div.content, article"],
        "pt",
        Brazilian,
    ),
    entry(
        "binance_square",
        "Binance Square",
        "https://www.binance.com/en/square",
        ["div.css-1wr4jig a, article a", "h1", "div.content, article"],
        "en",
        Exchanges,
    ),
    entry(
        "binance_news",
        "Binance News",
        "https://www.binance.com/en/news",
        ["a.css-1ej4hfo", "h1", "div.css-1wr4jig"],
        "en",
        Exchanges,
    ),
    entry(
        "livecoins",
        "Livecoins BR",
        "https://livecoins.com.br/",
        ["h2.entry-title a, h3 a", "h1.entry-title", "div.entry-content"],
        "pt",
        Brazilian,
    ),
    entry(
        "infomoney",
        "InfoMoney Cripto",
        "https://www.infomoney.com.br/tudo-sobre/criptomoedas/",
        ["a.hl-title, h2 a", "h1", "div.article-content, div.im-article-body"],
        "pt",
        Brazilian,
    ),
    entry(
        "ccnbrasil",
        "CCN Brasil",
        "https://www.ccn.com/pt/",
        ["h3 a, article a", "h1", "div.entry-content, article"],
        "pt",
        Brazilian,
    ),
    entry(
        "whalealert",
        "Whale Alert",
        "https://whale-alert.io/",
        ["div.transaction-item a", "h1", "div.content"],
        "en",
        International,
    ),
    entry(
        "glassnode",
        "Glassnode Insights",
        "https://insights.glassnode.com/",
        ["article a, div.post-item a", "h1", "div.post-content"],
        "en",
        International,
    ),
    entry(
        "tradingview",
        "TradingView News",
        "https://www.tradingview.com/news/",
        ["div.news-item a", "h1", "div.body"],
        "en",
        International,
    ),
    entry(
        "binance_blog",
        "Binance Blog",
        "https://www.binance.com/en/blog",
        ["a.article-item", "h1", "div.article-content"],
        "en",
        Exchanges,
    ),
    entry(
        "beincrypto",
        "BeInCrypto",
        "https://beincrypto.com/",
        ["article a, h3 a", "h1", "div.entry-content"],
        "en",
        International,
    ),
    entry(
        "beincrypto_br",
        "BeInCrypto BR",
        "https://br.beincrypto.com/",
        ["article a, h3 a", "h1", "div.entry-content"],
        "pt",
        Brazilian,
    ),
    entry(
        "theblock",
        "The Block",
        "https://www.theblock.co/",
        ["a.title, h3 a", "h1", "div.article-content"],
        "en",
        International,
    ),
    entry(
        "blockworks",
        "Blockworks",
        "https://blockworks.co/news",
        ["article a, h3 a", "h1", "div.article-body"],
        "en",
        International,
    ),
    entry("coinpedia", "CoinPedia", "https://coinpedia.org/news/", WP, "en", International),
    entry("ambcrypto", "AMBCrypto", "https://ambcrypto.com/", WP, "en", International),
    entry("newsbtc", "NewsBTC", "https://www.newsbtc.com/", WP, "en", International),
    entry("dailyhodl", "Daily Hodl", "https://dailyhodl.com/", WP, "en", International),
    entry(
        "cryptopotato",
        "CryptoPotato",
        "https://cryptopotato.com/",
        ["h3 a, article a", "h1", "div.entry-content"],
        "en",
        International,
    ),
    entry("coingape", "CoinGape", "https://coingape.com/", WP, "en", International),
    entry("bitcoinist", "Bitcoinist", "https://bitcoinist.com/", WP, "en", International),
    entry(
        "cryptobriefing",
        "Crypto Briefing",
        "https://cryptobriefing.com/",
        WP,
        "en",
        International,
    ),
    entry(
        "messari",
        "Messari",
        "https://messari.io/news",
        ["a.headline, h3 a", "h1", "div.post-body"],
        "en",
        International,
    ),
    entry(
        "defiant",
        "The Defiant",
        "https://thedefiant.io/",
        ["h3 a, article a", "h1", "div.post-content"],
        "en",
        International,
    ),
    entry(
        "portaldobitcoin",
        "Portal do Bitcoin",
        "https://portaldobitcoin.uol.com.br/",
        ["h3 a, div.post-title a", "h1", "div.entry-content"],
        "pt",
        Brazilian,
    ),
    entry(
        "criptofacil",
        "CriptoFácil",
        "https://www.criptofacil.com/",
        ["div.posts-layout article a", "h1", "div.entry-content"],
        "pt",
        Brazilian,
    ),
    entry(
        "cointelegraph_br",
        "CoinTelegraph BR",
        "https://br.cointelegraph.com/",
        ["li.posts-listing__item a", "h1", "div.post-content"],
        "pt",
        Brazilian,
    ),
    entry(
        "moneytimes",
        "Money Times Cripto",
        "https://www.moneytimes.com.br/criptomoedas/",
        ["h2 a, h3 a", "h1", "div.content"],
        "pt",
        Brazilian,
    ),
    entry(
        "exame_future",
        "Exame Future of Money",
        "https://exame.com/future-of-money/",
        ["h2 a, h3 a", "h1", "div.article-body"],
        "pt",
        Brazilian,
    ),
    entry("btcbrasil", "BTC Brasil", "https://www.btcbrasil.com.br/", WP, "pt", Brazilian),
    entry(
        "coinbase_blog",
        "Coinbase Blog",
        "https://www.coinbase.com/blog",
        ["h3 a, article a", "h1", "div.content"],
        "en",
        Exchanges,
    ),
    entry(
        "kraken_blog",
        "Kraken Blog",
        "https://blog.kraken.com/",
        ["h2 a, article a", "h1", "div.post-content"],
        "en",
        Exchanges,
    ),
    entry(
        "mercadobitcoin",
        "Mercado Bitcoin",
        "https://blog.mercadobitcoin.com.br/",
        ["h2 a, h3 a", "h1", "div.post-content"],
        "pt",
        Exchanges,
    ),
];

/// A source enabled by default.
pub fn builtin(key: &str) -> Option<&'static CatalogEntry> {
    BUILTIN_SOURCES.iter().find(|e| e.key == key)
}

/// A source of the quick add menu.
pub fn popular(key: &str) -> Option<&'static CatalogEntry> {
    POPULAR_SOURCES.iter().find(|e| e.key == key)
}

/// Popular entries of one menu section.
pub fn popular_in(group: SourceGroup) -> impl Iterator<Item = &'static CatalogEntry> {
    POPULAR_SOURCES.iter().filter(move |e| e.group == group)
}
