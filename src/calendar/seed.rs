use chrono::{NaiveDate, NaiveTime};

use crate::storage::{EventCategory, EventOrigin, NewEvent};

/// A well known event shipped with the bot.
#[derive(Debug, Clone, Copy)]
pub struct SeedEvent {
    /// Event title.
    pub title: &'static str,
    /// `YYYY-MM-DD`
    pub date: &'static str,
    /// Last day of multi-day events, `YYYY-MM-DD`.
    pub end: Option<&'static str>,
    /// Event category.
    pub category: EventCategory,
    /// City and country.
    pub location: Option<&'static str>,
    /// Related coin.
    pub coin: Option<&'static str>,
    /// 1..=10
    pub importance: u8,
    /// Official page.
    pub url: &'static str,
}

const FOMC_URL: &str = "https://www.federalreserve.gov/monetarypolicy/fomccalendars.htm";

const fn conference(
    title: &'static str,
    date: &'static str,
    end: &'static str,
    location: &'static str,
    importance: u8,
    url: &'static str,
) -> SeedEvent {
    SeedEvent {
        title,
        date,
        end: Some(end),
        category: EventCategory::Conference,
        location: Some(location),
        coin: None,
        importance,
        url,
    }
}

const fn fomc(title: &'static str, date: &'static str) -> SeedEvent {
    SeedEvent {
        title,
        date,
        end: None,
        category: EventCategory::Speech,
        location: Some("Washington, USA"),
        coin: Some("BTC"),
        importance: 10,
        url: FOMC_URL,
    }
}

/// Conferences, FOMC meetings and halvings known in advance.
pub const SEED_EVENTS: &[SeedEvent] = &[
    conference(
        "ETHDenver 2026",
        "2026-02-24",
        "2026-03-02",
        "Denver, USA",
        9,
        "https://www.ethdenver.com/",
    ),
    conference(
        "Bitcoin 2026 Conference",
        "2026-05-15",
        "2026-05-17",
        "Nashville, USA",
        10,
        "https://b.tc/conference",
    ),
    conference(
        "Consensus 2026 (CoinDesk)",
        "2026-05-26",
        "2026-05-28",
        "Miami, USA",
        10,
        "https://consensus.coindesk.com/",
    ),
    conference(
        "Web Summit Rio 2026",
        "2026-06-15",
        "2026-06-18",
        "Rio de Janeiro, Brazil",
        8,
        "https://rio.websummit.com/",
    ),
    conference(
        "Paris Blockchain Week 2026",
        "2026-04-07",
        "2026-04-11",
        "Paris, France",
        9,
        "https://www.parisblockchainweek.com/",
    ),
    conference(
        "Token2049 Singapore",
        "2026-09-14",
        "2026-09-15",
        "Singapore",
        9,
        "https://www.token2049.com/",
    ),
    conference(
        "Token2049 Dubai",
        "2026-04-28",
        "2026-04-29",
        "Dubai, UAE",
        9,
        "https://www.token2049.com/",
    ),
    conference(
        "Blockchain Rio 2026",
        "2026-08-10",
        "2026-08-12",
        "Rio de Janeiro, Brazil",
        8,
        "https://www.blockchainrio.com.br/",
    ),
    conference(
        "Gramado Summit 2026",
        "2026-09-20",
        "2026-09-22",
        "Gramado, Brazil",
        7,
        "https://gramadosummit.com/",
    ),
    conference(
        "Blockchain Life 2026",
        "2026-12-08",
        "2026-12-10",
        "Dubai, UAE",
        9,
        "https://blockchain-life.com/",
    ),
    conference(
        "Consensus Hong Kong 2026",
        "2026-11-10",
        "2026-11-12",
        "Hong Kong",
        9,
        "https://consensus-hongkong.coindesk.com/",
    ),
    conference(
        "NFT.NYC 2026",
        "2026-04-15",
        "2026-04-17",
        "New York, USA",
        8,
        "https://www.nft.nyc/",
    ),
    conference("Devcon 2026", "2026-10-20", "2026-10-23", "TBA", 10, "https://devcon.org/"),
    fomc("FOMC Meeting - Fed (January)", "2026-01-28"),
    fomc("FOMC Meeting - Fed (March)", "2026-03-18"),
    fomc("FOMC Meeting - Fed (May)", "2026-05-06"),
    fomc("FOMC Meeting - Fed (June)", "2026-06-17"),
    fomc("FOMC Meeting - Fed (July)", "2026-07-29"),
    fomc("FOMC Meeting - Fed (September)", "2026-09-16"),
    fomc("FOMC Meeting - Fed (November)", "2026-11-04"),
    fomc("FOMC Meeting - Fed (December)", "2026-12-16"),
    SeedEvent {
        title: "Jackson Hole Symposium",
        date: "2026-08-27",
        end: Some("2026-08-29"),
        category: EventCategory::Speech,
        location: Some("Wyoming, USA"),
        coin: Some("BTC"),
        importance: 10,
        url: "https://www.kansascityfed.org/research/jackson-hole-economic-symposium/",
    },
    SeedEvent {
        title: "World Economic Forum Davos",
        date: "2026-01-19",
        end: Some("2026-01-23"),
        category: EventCategory::Speech,
        location: Some("Davos, Switzerland"),
        coin: None,
        importance: 9,
        url: "https://www.weforum.org/events/world-economic-forum-annual-meeting-2026/",
    },
    SeedEvent {
        title: "G20 Summit 2026",
        date: "2026-11-21",
        end: Some("2026-11-22"),
        category: EventCategory::Speech,
        location: Some("South Africa"),
        coin: None,
        importance: 9,
        url: "https://www.g20.org/",
    },
    SeedEvent {
        title: "Ethereum Pectra Upgrade",
        date: "2026-03-15",
        end: None,
        category: EventCategory::Launch,
        location: None,
        coin: Some("ETH"),
        importance: 10,
        url: "https://ethereum.org/en/roadmap/",
    },
    SeedEvent {
        title: "Bitcoin Halving Cycle Analysis",
        date: "2026-04-15",
        end: None,
        category: EventCategory::Launch,
        location: None,
        coin: Some("BTC"),
        importance: 8,
        url: "https://www.bitcoinblockhalf.com/",
    },
];

impl SeedEvent {
    /// Start day, `None` if `date` is malformed.
    pub fn day(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date, "%Y-%m-%d").ok()
    }

    /// The event as a new row, starting at midnight UTC. `None` when a date
    /// of the entry is malformed.
    pub fn to_new_event(&self) -> Option<NewEvent> {
        let starts_at = self.day()?.and_time(NaiveTime::MIN).and_utc();
        let ends_at = match self.end {
            Some(end) => Some(
                NaiveDate::parse_from_str(end, "%Y-%m-%d").ok()?.and_time(NaiveTime::MIN).and_utc(),
            ),
            None => None,
        };

        Some(NewEvent {
            title: self.title.to_string(),
            description: None,
            starts_at,
            ends_at,
            category: self.category,
            coin: self.coin.map(String::from),
            origin: EventOrigin::Catalog,
            source_url: Some(self.url.to_string()),
            location: self.location.map(String::from),
            importance: self.importance,
        })
    }
}
