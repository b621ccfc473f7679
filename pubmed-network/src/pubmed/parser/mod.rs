//! Tolerant EFetch XML record parser
//!
//! Turns one batched `PubmedArticleSet` response into zero or more
//! [`ArticleRecord`]s. Parsing never fails as a whole: fragments without a
//! PMID or title, and `<PubmedArticle>` elements that do not deserialize, are
//! dropped and the rest of the batch is kept.
//!
//! - `preprocessing` - inline tag stripping and date helpers
//! - `deserializers` - mixed-content text handling
//! - `xml_types` - serde mapping of the EFetch schema

mod deserializers;
mod preprocessing;
mod xml_types;

use quick_xml::de::from_str;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, instrument, warn};

use crate::pubmed::models::ArticleRecord;
use preprocessing::strip_inline_html_tags;
use xml_types::{PubmedArticleSet, PubmedArticleXml};

/// Default cap on authors kept per record
pub const DEFAULT_AUTHOR_CAP: usize = 10;

/// Parse every usable record out of an EFetch XML response
///
/// Returns an empty list for empty or wholly unusable input.
///
/// # Example
///
/// ```
/// use pubmed_network::pubmed::parser::parse_records;
///
/// let xml = r#"<PubmedArticleSet>
///   <PubmedArticle>
///     <MedlineCitation>
///       <PMID>29622564</PMID>
///       <Article>
///         <ArticleTitle>Example</ArticleTitle>
///         <Journal><Title>Example Journal</Title></Journal>
///       </Article>
///     </MedlineCitation>
///   </PubmedArticle>
/// </PubmedArticleSet>"#;
///
/// let records = parse_records(xml, 10);
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].pmid, "29622564");
/// assert!(parse_records("", 10).is_empty());
/// ```
#[instrument(skip(xml), fields(xml_size = xml.len()))]
pub fn parse_records(xml: &str, author_cap: usize) -> Vec<ArticleRecord> {
    if xml.trim().is_empty() {
        return Vec::new();
    }

    let cleaned = strip_inline_html_tags(xml);

    let articles = match from_str::<PubmedArticleSet>(&cleaned) {
        Ok(set) => set.articles,
        Err(e) => {
            warn!(error = %e, "Whole-set deserialization failed, parsing articles one by one");
            parse_articles_individually(&cleaned)
        }
    };

    let total = articles.len();
    let records: Vec<ArticleRecord> = articles
        .into_iter()
        .filter_map(|article| {
            let pmid = article.pmid();
            let record = article.into_record(author_cap);
            if record.is_none() {
                warn!(pmid = ?pmid, "Dropping incomplete record");
            }
            record
        })
        .collect();

    debug!(articles = total, records = records.len(), "Parsed EFetch batch");
    records
}

/// Segment the document at `<PubmedArticle>` boundaries and deserialize each
/// element on its own, skipping the ones that fail
fn parse_articles_individually(xml: &str) -> Vec<PubmedArticleXml> {
    let mut reader = Reader::from_str(xml);
    let mut articles = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) if start.name().as_ref() == b"PubmedArticle" => {
                let span = match reader.read_to_end(start.name()) {
                    Ok(span) => span,
                    Err(e) => {
                        warn!(error = %e, "Unterminated PubmedArticle, stopping");
                        break;
                    }
                };
                let inner = &xml[span.start as usize..span.end as usize];
                let wrapped = format!(
                    "<PubmedArticleSet><PubmedArticle>{inner}</PubmedArticle></PubmedArticleSet>"
                );
                match from_str::<PubmedArticleSet>(&wrapped) {
                    Ok(set) => articles.extend(set.articles),
                    Err(e) => warn!(error = %e, "Skipping malformed PubmedArticle"),
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "XML reader error, keeping articles parsed so far");
                break;
            }
        }
    }

    articles
}
