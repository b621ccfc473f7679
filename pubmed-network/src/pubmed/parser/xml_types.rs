//! Internal serde mapping of the EFetch `PubmedArticleSet` schema
//!
//! Only the elements that feed [`ArticleRecord`] are mapped; quick-xml skips
//! everything else.

use serde::Deserialize;
use tracing::debug;

use super::deserializers::TextContent;
use super::preprocessing::first_year_in;
use crate::pubmed::models::ArticleRecord;

#[derive(Debug, Deserialize)]
#[serde(rename = "PubmedArticleSet")]
pub(super) struct PubmedArticleSet {
    #[serde(rename = "PubmedArticle", default)]
    pub articles: Vec<PubmedArticleXml>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PubmedArticleXml {
    #[serde(rename = "MedlineCitation")]
    pub medline_citation: MedlineCitation,
    #[serde(rename = "PubmedData")]
    pub pubmed_data: Option<PubmedData>,
}

#[derive(Debug, Deserialize)]
pub(super) struct MedlineCitation {
    #[serde(rename = "PMID")]
    pub pmid: Option<PmidXml>,
    #[serde(rename = "Article")]
    pub article: Article,
    #[serde(rename = "MeshHeadingList")]
    pub mesh_heading_list: Option<MeshHeadingList>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PmidXml {
    #[serde(rename = "$text")]
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct Article {
    #[serde(rename = "Journal")]
    journal: Option<Journal>,
    #[serde(rename = "ArticleTitle")]
    article_title: Option<TextContent>,
    #[serde(rename = "ELocationID", default)]
    elocation_ids: Vec<ELocationId>,
    #[serde(rename = "Abstract")]
    abstract_section: Option<AbstractSection>,
    #[serde(rename = "AuthorList")]
    author_list: Option<AuthorList>,
    #[serde(rename = "ArticleDate", default)]
    article_dates: Vec<ArticleDate>,
}

#[derive(Debug, Deserialize)]
struct Journal {
    #[serde(rename = "JournalIssue")]
    journal_issue: Option<JournalIssue>,
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "ISOAbbreviation")]
    iso_abbreviation: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JournalIssue {
    #[serde(rename = "PubDate")]
    pub_date: Option<PubDate>,
}

#[derive(Debug, Deserialize)]
struct PubDate {
    #[serde(rename = "Year")]
    year: Option<String>,
    #[serde(rename = "MedlineDate")]
    medline_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArticleDate {
    #[serde(rename = "Year")]
    year: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ELocationId {
    #[serde(rename = "$text", default)]
    value: String,
    #[serde(rename = "@EIdType")]
    eid_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AbstractSection {
    #[serde(rename = "AbstractText", default)]
    abstract_texts: Vec<TextContent>,
}

#[derive(Debug, Deserialize)]
struct AuthorList {
    #[serde(rename = "Author", default)]
    authors: Vec<AuthorXml>,
}

#[derive(Debug, Deserialize)]
struct AuthorXml {
    #[serde(rename = "LastName")]
    last_name: Option<String>,
    #[serde(rename = "ForeName")]
    fore_name: Option<String>,
    #[serde(rename = "CollectiveName")]
    collective_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct MeshHeadingList {
    #[serde(rename = "MeshHeading", default)]
    mesh_headings: Vec<MeshHeadingXml>,
}

#[derive(Debug, Deserialize)]
struct MeshHeadingXml {
    #[serde(rename = "DescriptorName")]
    descriptor_name: Option<TextContent>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PubmedData {
    #[serde(rename = "ArticleIdList")]
    article_id_list: Option<ArticleIdList>,
}

#[derive(Debug, Deserialize)]
struct ArticleIdList {
    #[serde(rename = "ArticleId", default)]
    article_ids: Vec<ArticleIdXml>,
}

#[derive(Debug, Deserialize)]
struct ArticleIdXml {
    #[serde(rename = "$text", default)]
    value: String,
    #[serde(rename = "@IdType")]
    id_type: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl AuthorXml {
    fn display_name(&self) -> Option<String> {
        let last = non_blank(self.last_name.as_deref());
        let fore = non_blank(self.fore_name.as_deref());
        match (fore, last) {
            (Some(fore), Some(last)) => Some(format!("{fore} {last}")),
            (None, Some(last)) => Some(last),
            _ => non_blank(self.collective_name.as_deref()),
        }
    }
}

impl PubmedArticleXml {
    /// The PMID as written in the record, if any
    pub fn pmid(&self) -> Option<String> {
        non_blank(
            self.medline_citation
                .pmid
                .as_ref()
                .map(|p| p.value.as_str()),
        )
    }

    /// Convert to an [`ArticleRecord`], or `None` when PMID or title is missing
    pub fn into_record(self, author_cap: usize) -> Option<ArticleRecord> {
        let pmid = self.pmid()?;
        let medline = self.medline_citation;
        let article = medline.article;

        let Some(title) = article
            .article_title
            .as_ref()
            .and_then(TextContent::non_empty)
            .map(str::to_string)
        else {
            debug!(pmid = %pmid, "Record has no title, dropping");
            return None;
        };

        let authors: Vec<String> = article
            .author_list
            .map(|list| {
                list.authors
                    .iter()
                    .filter_map(AuthorXml::display_name)
                    .take(author_cap)
                    .collect()
            })
            .unwrap_or_default();

        let journal = article
            .journal
            .as_ref()
            .and_then(|j| {
                non_blank(j.title.as_deref()).or_else(|| non_blank(j.iso_abbreviation.as_deref()))
            })
            .unwrap_or_default();

        let pub_date = article
            .journal
            .as_ref()
            .and_then(|j| j.journal_issue.as_ref())
            .and_then(|ji| ji.pub_date.as_ref());
        let year = pub_date
            .and_then(|d| d.year.as_deref())
            .and_then(|y| y.trim().parse::<i32>().ok())
            .or_else(|| {
                pub_date
                    .and_then(|d| d.medline_date.as_deref())
                    .and_then(first_year_in)
            })
            .or_else(|| {
                article
                    .article_dates
                    .iter()
                    .find_map(|d| d.year.as_deref().and_then(|y| y.trim().parse().ok()))
            });

        let abstract_text = article.abstract_section.and_then(|section| {
            let parts: Vec<&str> = section
                .abstract_texts
                .iter()
                .filter_map(TextContent::non_empty)
                .collect();
            (!parts.is_empty()).then(|| parts.join(" "))
        });

        let doi = article
            .elocation_ids
            .iter()
            .find(|id| id.eid_type.as_deref() == Some("doi"))
            .and_then(|id| non_blank(Some(&id.value)))
            .or_else(|| {
                self.pubmed_data
                    .as_ref()
                    .and_then(|d| d.article_id_list.as_ref())
                    .and_then(|list| {
                        list.article_ids
                            .iter()
                            .find(|id| id.id_type.as_deref() == Some("doi"))
                    })
                    .and_then(|id| non_blank(Some(&id.value)))
            });

        let mut mesh_terms: Vec<String> = Vec::new();
        for heading in medline
            .mesh_heading_list
            .map(|list| list.mesh_headings)
            .unwrap_or_default()
        {
            let Some(name) = heading.descriptor_name.as_ref().and_then(TextContent::non_empty)
            else {
                continue;
            };
            if !mesh_terms.iter().any(|t| t == name) {
                mesh_terms.push(name.to_string());
            }
        }

        Some(ArticleRecord {
            pmid,
            title,
            authors,
            journal,
            year,
            abstract_text,
            doi,
            mesh_terms,
        })
    }
}
