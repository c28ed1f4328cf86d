use std::collections::HashSet;

use crate::{Category, Origin};

/// Known tabular/statistical data-source URLs.
///
/// An internal citation whose link matches one of these exactly is backed
/// by a table (SQL); anything else internal is unstructured (Vector).
pub const DEFAULT_SQL_URLS: &[&str] = &[
    "https://dashboard.msme.gov.in/Udyam_Statewise.aspx",
    "https://data.adb.org/dataset/2023-asia-small-and-medium-sized-enterprise-monitor",
    "https://data.adb.org/media/10421/download",
    "https://data.rbi.org.in/#/dbie/indicators",
    "https://eaindustry.nic.in/download_data_1112.asp",
    "https://esankhyiki.mospi.gov.in/",
    "https://esankhyiki.mospi.gov.in/catalogue-main/catalogue?index=&page=0&product=NAS",
    "https://esankhyiki.mospi.gov.in/catalogue-main/catalogue?page=0&search=&product=NAS&q=NSDP",
    "https://esankhyiki.mospi.gov.in/macroindicators-main/macroindicators?product=asi",
    "https://esankhyiki.mospi.gov.in/macroindicators-main/macroindicators?product=asuse",
    "https://esankhyiki.mospi.gov.in/macroindicators-main/macroindicators?product=nss77&tab=table",
    "https://esankhyiki.mospi.gov.in/macroindicators-main/macroindicators?product=nss78",
    "https://esankhyiki.mospi.gov.in/macroindicators-main/macroindicators?product=plfs",
    "https://esankhyiki.mospi.gov.in/macroindicators?product=cpi",
    "https://labourbureau.gov.in/uploads/public/notice/MIL-07-2024pdf-bd246163a1b7f2b4515a6eedd5df650d.pdf",
    "https://mospi.gov.in/GSVA-NSVA",
    "https://niryat.gov.in/india",
    "https://residex.nhbonline.org.in/",
    "https://www.data.gov.in/resource/kisan-call-centre-kcc-transcripts-farmers-queries-answers",
    "https://www.gst.gov.in/download/gststatistics",
    "https://www.indiabudget.gov.in/budget2022-23/economicsurvey/doc/stat/tab43.pdf",
    "https://www.indiabudget.gov.in/economicsurvey/doc/Statistical-Appendix-in-English.pdf",
    "https://www.niftyindices.com/indices/equity/thematic-indices/nifty-sme-emerge",
    "https://www.rbi.org.in/scripts/Data_Sectoral_Deployment.aspx",
];

/// Labels citations as SQL/Vector/N-A against a frozen allow-list.
///
/// The set is fixed when the classifier is built and never mutated, so a
/// single instance can be shared by any number of concurrent extractions.
#[derive(Debug, Clone)]
pub struct Classifier {
    sql_urls: HashSet<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::with_urls(DEFAULT_SQL_URLS.iter().map(|u| u.to_string()))
    }
}

impl Classifier {
    /// Classifier over the built-in allow-list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifier over a custom allow-list.
    pub fn with_urls<I>(urls: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            sql_urls: urls.into_iter().collect(),
        }
    }

    /// Exact-match lookup; an empty link is never a SQL source.
    pub fn is_sql_source(&self, link: &str) -> bool {
        !link.is_empty() && self.sql_urls.contains(link)
    }

    /// Category for a record with the given origin and link.
    pub fn classify(&self, origin: Origin, link: &str) -> Category {
        match origin {
            Origin::Web => Category::NotApplicable,
            Origin::Internal if self.is_sql_source(link) => Category::Sql,
            Origin::Internal => Category::Vector,
        }
    }

    pub fn len(&self) -> usize {
        self.sql_urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sql_urls.is_empty()
    }
}
