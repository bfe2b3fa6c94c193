//! CSV rendering of an analysis, one row per recommended keyword.
//!
//! Fields holding a comma, a double quote or a line break are wrapped in
//! double quotes with inner quotes doubled; everything else is written bare.

use serde::Serialize;

use crate::error::Result;
use crate::models::AnalyzeResponse;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub keyword: String,
    pub trend_score: u32,
    pub estimated_monthly_searches: u64,
    pub domain: String,
    pub source: String,
}

impl ExportRow {
    pub fn from_response(response: &AnalyzeResponse) -> Vec<ExportRow> {
        response
            .recommended_keywords
            .iter()
            .map(|keyword| ExportRow {
                keyword: keyword.clone(),
                trend_score: response.trend_score,
                estimated_monthly_searches: response.search_volume_estimate,
                domain: response.domain.clone(),
                source: response.source.clone(),
            })
            .collect()
    }
}

/// Header line from the row's field names, then one line per row. No rows,
/// empty document.
pub fn to_csv<R: Serialize>(rows: &[R]) -> Result<String> {
    if rows.is_empty() {
        return Ok(String::new());
    }

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    // every field came from a String
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(keyword: &str, source: &str) -> ExportRow {
        ExportRow {
            keyword: keyword.to_string(),
            trend_score: 16,
            estimated_monthly_searches: 1280,
            domain: "openai.com".to_string(),
            source: source.to_string(),
        }
    }

    #[test]
    fn empty_rows_give_empty_document() {
        assert_eq!(to_csv::<ExportRow>(&[]).unwrap(), "");
    }

    #[test]
    fn writes_header_from_field_names() {
        let out = to_csv(&[row("chatgpt", "suggest")]).unwrap();
        assert_eq!(
            out,
            "keyword,trendScore,estimatedMonthlySearches,domain,source\nchatgpt,16,1280,openai.com,suggest\n"
        );
    }

    #[test]
    fn quotes_fields_with_commas_quotes_and_newlines() {
        let out = to_csv(&[
            row("a,b", "plain"),
            row("say \"hi\"", "plain"),
            row("two\nlines", "plain"),
        ])
        .unwrap();
        let lines: Vec<&str> = out.split_terminator('\n').collect();
        assert_eq!(lines[1], "\"a,b\",16,1280,openai.com,plain");
        assert_eq!(lines[2], "\"say \"\"hi\"\"\",16,1280,openai.com,plain");
        assert_eq!(lines[3], "\"two");
        assert_eq!(lines[4], "lines\",16,1280,openai.com,plain");
    }

    #[test]
    fn source_labels_with_parentheses_stay_bare() {
        let out = to_csv(&[row("kw", "dataforseo (google_ads/keywords_for_keywords)")]).unwrap();
        assert!(out.ends_with(",dataforseo (google_ads/keywords_for_keywords)\n"));
    }
}
