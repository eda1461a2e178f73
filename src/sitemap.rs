//! Sitemap generation.
//!
//! Four static routes come first, then one entry per portfolio piece in
//! listing order (newest first):
//!
//! | Path | Change frequency | Priority | Last modified |
//! |------|------------------|----------|---------------|
//! | `/` | daily | 1.0 | now |
//! | `/portfolio` | weekly | 0.8 | now |
//! | `/artists` | monthly | 0.7 | now |
//! | `/booking` | monthly | 0.9 | now |
//! | `/portfolio/<slug>` | monthly | 0.6 | piece date |
//!
//! Artist profiles are not listed.

use chrono::{DateTime, NaiveTime, SecondsFormat, Utc};
use maud::{PreEscaped, html};

use crate::entity::PortfolioPiece;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFrequency {
    Daily,
    Weekly,
    Monthly,
}

impl ChangeFrequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub url: String,
    pub last_modified: DateTime<Utc>,
    pub change_frequency: ChangeFrequency,
    pub priority: f32,
}

const STATIC_ROUTES: &[(&str, ChangeFrequency, f32)] = &[
    ("", ChangeFrequency::Daily, 1.0),
    ("/portfolio", ChangeFrequency::Weekly, 0.8),
    ("/artists", ChangeFrequency::Monthly, 0.7),
    ("/booking", ChangeFrequency::Monthly, 0.9),
];

/// Build the entry list for `base_url` (any trailing slash is dropped).
pub fn entries(base_url: &str, pieces: &[PortfolioPiece], now: DateTime<Utc>) -> Vec<SitemapEntry> {
    let base = base_url.trim_end_matches('/');

    let statics = STATIC_ROUTES
        .iter()
        .map(|&(path, change_frequency, priority)| SitemapEntry {
            url: format!("{base}{path}"),
            last_modified: now,
            change_frequency,
            priority,
        });

    let pieces = pieces.iter().map(|piece| SitemapEntry {
        url: format!("{base}/portfolio/{}", piece.slug),
        last_modified: piece.date.and_time(NaiveTime::MIN).and_utc(),
        change_frequency: ChangeFrequency::Monthly,
        priority: 0.6,
    });

    statics.chain(pieces).collect()
}

/// Serialize entries as a sitemap XML document.
pub fn render(entries: &[SitemapEntry]) -> String {
    let body = html! {
        urlset xmlns=(SITEMAP_NS) {
            @for entry in entries {
                url {
                    loc { (entry.url) }
                    lastmod { (entry.last_modified.to_rfc3339_opts(SecondsFormat::Secs, true)) }
                    changefreq { (entry.change_frequency.as_str()) }
                    priority { (format!("{:.1}", entry.priority)) }
                }
            }
        }
    };
    html! {
        (PreEscaped(XML_DECLARATION))
        "\n"
        (body)
    }
    .into_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::frontmatter;
    use chrono::TimeZone;

    fn piece(slug: &str, date: &str) -> PortfolioPiece {
        let raw = format!(
            "---\ntitle: T\nartist: a\nbodyArea: Brazo\ndurationHours: 2\ndate: {date}\n\
             cover: /c.jpg\ndescription: d\n---\n"
        );
        PortfolioPiece::from_front_matter(slug, frontmatter::parse(&raw).unwrap()).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn static_routes_first() {
        let entries = entries("https://inklab.example", &[], now());

        let urls: Vec<&str> = entries.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://inklab.example",
                "https://inklab.example/portfolio",
                "https://inklab.example/artists",
                "https://inklab.example/booking",
            ]
        );
        assert_eq!(entries[0].change_frequency, ChangeFrequency::Daily);
        assert_eq!(entries[0].priority, 1.0);
        assert_eq!(entries[3].priority, 0.9);
        assert!(entries.iter().all(|e| e.last_modified == now()));
    }

    #[test]
    fn pieces_follow_with_their_dates() {
        let pieces = vec![piece("rose", "2024-06-21"), piece("koi", "2024-05-10")];
        let entries = entries("https://inklab.example", &pieces, now());

        assert_eq!(entries.len(), 6);
        assert_eq!(entries[4].url, "https://inklab.example/portfolio/rose");
        assert_eq!(entries[4].change_frequency, ChangeFrequency::Monthly);
        assert_eq!(entries[4].priority, 0.6);
        assert_eq!(
            entries[5].last_modified,
            Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn trailing_slash_dropped() {
        let entries = entries("https://inklab.example/", &[piece("koi", "2024-05-10")], now());
        assert_eq!(entries[0].url, "https://inklab.example");
        assert_eq!(entries[4].url, "https://inklab.example/portfolio/koi");
    }

    #[test]
    fn render_produces_sitemap_xml() {
        let xml = render(&entries("https://inklab.example", &[piece("koi", "2024-05-10")], now()));

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#));
        assert!(xml.contains("<loc>https://inklab.example/portfolio/koi</loc>"));
        assert!(xml.contains("<lastmod>2024-05-10T00:00:00Z</lastmod>"));
        assert!(xml.contains("<lastmod>2024-07-01T12:30:00Z</lastmod>"));
        assert!(xml.contains("<changefreq>daily</changefreq>"));
        assert!(xml.contains("<priority>1.0</priority>"));
        assert!(xml.contains("<priority>0.6</priority>"));
        assert_eq!(xml.matches("<url>").count(), 5);
    }

    #[test]
    fn urls_escaped() {
        let mut koi = piece("koi", "2024-05-10");
        koi.slug = "a&b".into();
        let xml = render(&entries("https://inklab.example", &[koi], now()));
        assert!(xml.contains("/portfolio/a&amp;b"));
    }
}
