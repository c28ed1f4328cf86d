use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Category, CitationRecord, Origin};

/// Aggregate counts over an assembled record set.
///
/// Vector/SQL splits only count Internal records; N/A counts every record
/// whose category is `NotApplicable`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationMetrics {
    pub total_citations: usize,
    pub web_citations: usize,
    pub internal_citations: usize,
    pub vector_citations: usize,
    pub sql_citations: usize,
    pub na_citations: usize,
    pub total_occurrences: usize,
    pub web_occurrences: usize,
    pub internal_occurrences: usize,
    pub vector_occurrences: usize,
    pub sql_occurrences: usize,
    pub na_occurrences: usize,
}

/// A consistency problem between the Internal totals and the SQL + Vector split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationWarning {
    OccurrenceMismatch {
        internal: usize,
        sql: usize,
        vector: usize,
    },
    CountMismatch {
        internal: usize,
        sql: usize,
        vector: usize,
    },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::OccurrenceMismatch {
                internal,
                sql,
                vector,
            } => write!(
                f,
                "Internal occurrences ({internal}) do not match SQL + Vector occurrences ({sql} + {vector})"
            ),
            ValidationWarning::CountMismatch {
                internal,
                sql,
                vector,
            } => write!(
                f,
                "Internal citations ({internal}) do not match SQL + Vector citations ({sql} + {vector})"
            ),
        }
    }
}

impl CitationMetrics {
    pub fn from_records(records: &[CitationRecord]) -> Self {
        let mut m = CitationMetrics {
            total_citations: records.len(),
            ..Default::default()
        };

        for r in records {
            m.total_occurrences += r.occurrences;
            match r.origin {
                Origin::Web => {
                    m.web_citations += 1;
                    m.web_occurrences += r.occurrences;
                }
                Origin::Internal => {
                    m.internal_citations += 1;
                    m.internal_occurrences += r.occurrences;
                }
            }
            match (r.origin, r.category) {
                (Origin::Internal, Category::Vector) => {
                    m.vector_citations += 1;
                    m.vector_occurrences += r.occurrences;
                }
                (Origin::Internal, Category::Sql) => {
                    m.sql_citations += 1;
                    m.sql_occurrences += r.occurrences;
                }
                _ => {}
            }
            if r.category == Category::NotApplicable {
                m.na_citations += 1;
                m.na_occurrences += r.occurrences;
            }
        }
        m
    }

    fn pct(&self, part: usize) -> f64 {
        if self.total_occurrences == 0 {
            0.0
        } else {
            part as f64 / self.total_occurrences as f64 * 100.0
        }
    }

    pub fn internal_pct(&self) -> f64 {
        self.pct(self.internal_occurrences)
    }

    pub fn web_pct(&self) -> f64 {
        self.pct(self.web_occurrences)
    }

    pub fn vector_pct(&self) -> f64 {
        self.pct(self.vector_occurrences)
    }

    pub fn sql_pct(&self) -> f64 {
        self.pct(self.sql_occurrences)
    }

    pub fn na_pct(&self) -> f64 {
        self.pct(self.na_occurrences)
    }

    /// Check that Internal totals equal the SQL + Vector split.
    pub fn validation_warnings(&self) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        if self.internal_occurrences != self.sql_occurrences + self.vector_occurrences {
            warnings.push(ValidationWarning::OccurrenceMismatch {
                internal: self.internal_occurrences,
                sql: self.sql_occurrences,
                vector: self.vector_occurrences,
            });
        }
        if self.internal_citations != self.sql_citations + self.vector_citations {
            warnings.push(ValidationWarning::CountMismatch {
                internal: self.internal_citations,
                sql: self.sql_citations,
                vector: self.vector_citations,
            });
        }
        warnings
    }

    /// The fixed metric rows of the analytics block, in export order.
    pub fn analytics_rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Total Citations", self.total_citations.to_string()),
            ("Web Citations", self.web_citations.to_string()),
            ("Internal Citations", self.internal_citations.to_string()),
            ("Vector Citations", self.vector_citations.to_string()),
            ("SQL Citations", self.sql_citations.to_string()),
            ("N/A Citations", self.na_citations.to_string()),
            ("Total Occurrences", self.total_occurrences.to_string()),
            ("Web Occurrences", self.web_occurrences.to_string()),
            ("Internal Occurrences", self.internal_occurrences.to_string()),
            ("Vector Occurrences", self.vector_occurrences.to_string()),
            ("SQL Occurrences", self.sql_occurrences.to_string()),
            ("N/A Occurrences", self.na_occurrences.to_string()),
            ("Internal %", format_pct(self.internal_pct())),
            ("Web %", format_pct(self.web_pct())),
            ("Vector %", format_pct(self.vector_pct())),
            ("SQL %", format_pct(self.sql_pct())),
            ("N/A %", format_pct(self.na_pct())),
        ]
    }
}

/// One decimal place with a trailing percent sign, e.g. `"42.9%"`.
pub fn format_pct(value: f64) -> String {
    format!("{:.1}%", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecordSource;

    fn rec(number: u32, origin: Origin, category: Category, occurrences: usize) -> CitationRecord {
        CitationRecord {
            number,
            headline: format!("Citation {number}"),
            link: String::new(),
            origin,
            occurrences,
            category,
            source: RecordSource::Parsed,
        }
    }

    #[test]
    fn test_from_records_partitions() {
        let records = vec![
            rec(1, Origin::Web, Category::NotApplicable, 3),
            rec(2, Origin::Internal, Category::Sql, 2),
            rec(3, Origin::Internal, Category::Vector, 1),
            rec(4, Origin::Internal, Category::Vector, 1),
        ];
        let m = CitationMetrics::from_records(&records);
        assert_eq!(m.total_citations, 4);
        assert_eq!(m.web_citations, 1);
        assert_eq!(m.internal_citations, 3);
        assert_eq!(m.sql_citations, 1);
        assert_eq!(m.vector_citations, 2);
        assert_eq!(m.na_citations, 1);
        assert_eq!(m.total_occurrences, 7);
        assert_eq!(m.web_occurrences, 3);
        assert_eq!(m.internal_occurrences, 4);
        assert_eq!(m.sql_occurrences, 2);
        assert_eq!(m.vector_occurrences, 2);
        assert_eq!(m.na_occurrences, 3);
        assert!(m.validation_warnings().is_empty());
    }

    #[test]
    fn test_percentages() {
        let records = vec![
            rec(1, Origin::Web, Category::NotApplicable, 3),
            rec(2, Origin::Internal, Category::Sql, 4),
        ];
        let m = CitationMetrics::from_records(&records);
        assert_eq!(format_pct(m.web_pct()), "42.9%");
        assert_eq!(format_pct(m.internal_pct()), "57.1%");
        assert_eq!(format_pct(m.vector_pct()), "0.0%");
        assert_eq!(format_pct(m.sql_pct()), "57.1%");
    }

    #[test]
    fn test_percentages_zero_total() {
        let m = CitationMetrics::from_records(&[rec(1, Origin::Web, Category::NotApplicable, 0)]);
        assert_eq!(m.web_pct(), 0.0);
        assert_eq!(format_pct(m.na_pct()), "0.0%");
    }

    #[test]
    fn test_mismatch_is_reported() {
        // An internal record that escaped classification breaks the split
        let records = vec![rec(1, Origin::Internal, Category::NotApplicable, 2)];
        let m = CitationMetrics::from_records(&records);
        let warnings = m.validation_warnings();
        assert_eq!(warnings.len(), 2);
        assert!(matches!(
            warnings[0],
            ValidationWarning::OccurrenceMismatch { internal: 2, sql: 0, vector: 0 }
        ));
        assert!(warnings[1].to_string().contains("Internal citations (1)"));
    }

    #[test]
    fn test_analytics_rows_fixed_shape() {
        let rows = CitationMetrics::default().analytics_rows();
        assert_eq!(rows.len(), 17);
        assert_eq!(rows[0], ("Total Citations", "0".to_string()));
        assert_eq!(rows[12].0, "Internal %");
        assert_eq!(rows[16], ("N/A %", "0.0%".to_string()));
    }
}
