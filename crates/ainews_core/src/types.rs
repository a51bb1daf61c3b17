use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Strips quote characters from a title. Quoted titles break downstream
/// escaping in SQL predicates and spreadsheet formulas.
pub fn normalize_title(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '\'' | '"' | '\u{2018}' | '\u{2019}' | '\u{201C}' | '\u{201D}'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// One normalized news item as it comes out of a feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: String,
    pub news_link: String,
    pub image_link: Option<String>,
    pub publish_date: DateTime<Utc>,
}

impl ArticleRecord {
    /// Builds a record, normalizing the title and validating the links.
    /// `news_link` is the natural dedup key and must be an absolute https URL.
    pub fn new(
        title: &str,
        news_link: &str,
        image_link: Option<String>,
        publish_date: DateTime<Utc>,
    ) -> Result<Self> {
        let title = normalize_title(title);
        if title.is_empty() {
            return Err(Error::Validation(
                "Article title must not be empty".to_string(),
            ));
        }

        let news_link = news_link.trim().to_string();
        if !news_link.starts_with("https://") {
            return Err(Error::Validation(format!(
                "news_link must start with 'https://', got {:?}",
                news_link
            )));
        }

        let image_link = match image_link {
            Some(link) => {
                let link = link.trim().to_string();
                if !link.starts_with("https://") {
                    return Err(Error::Validation(format!(
                        "image_link must start with 'https://', got {:?}",
                        link
                    )));
                }
                Some(link)
            }
            None => None,
        };

        Ok(Self {
            title,
            news_link,
            image_link,
            publish_date,
        })
    }
}

/// Row shape of the persisted news table. `news_id` is derived from
/// `news_link` by the sink; `extracted_at` is stamped at insertion time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsRecord {
    pub news_id: String,
    pub title: String,
    pub published_at: DateTime<Utc>,
    pub extracted_at: Option<DateTime<Utc>>,
    pub news_link: String,
    pub image_link: Option<String>,
}

impl NewsRecord {
    pub fn from_article(article: &ArticleRecord, news_id: String) -> Self {
        Self {
            news_id,
            title: article.title.clone(),
            published_at: article.publish_date,
            extracted_at: None,
            news_link: article.news_link.clone(),
            image_link: article.image_link.clone(),
        }
    }
}

fn default_case_sen_kw() -> Vec<String> {
    [" AI ", "AI ", "A.I.", " AI-", "AI-"]
        .iter()
        .map(|kw| kw.to_string())
        .collect()
}

fn default_case_insen_kw() -> Vec<String> {
    [
        "Artificial Intelligence",
        "Machine Learning",
        "Deep Learning",
        "Neural Networks",
        "NLP",
        "Computer Vision",
        "Data Science",
        "Gemini",
        "Bard",
        "ChatGPT",
        "GPT-4",
        "DALL-E",
        "MidJourney",
        "Stable Diffusion",
        "Claude",
        "LLaMA",
        "Whisper",
    ]
    .iter()
    .map(|kw| kw.to_string())
    .collect()
}

fn default_max_days_old() -> u32 {
    2
}

/// Filtering parameters of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineArgs {
    #[serde(default = "default_case_sen_kw")]
    pub case_sen_search_kw: Vec<String>,
    #[serde(default = "default_case_insen_kw")]
    pub case_insen_search_kw: Vec<String>,
    #[serde(default = "default_max_days_old")]
    pub max_days_old: u32,
}

impl Default for PipelineArgs {
    fn default() -> Self {
        Self {
            case_sen_search_kw: default_case_sen_kw(),
            case_insen_search_kw: default_case_insen_kw(),
            max_days_old: default_max_days_old(),
        }
    }
}

impl PipelineArgs {
    /// Drops blank keywords. Kept entries are left untouched: surrounding
    /// whitespace is significant for case-sensitive keywords like " AI ".
    /// Each list must keep at least one entry, otherwise the title filter
    /// would match nothing.
    pub fn validated(self) -> Result<Self> {
        let case_sen_search_kw = trim_keywords(self.case_sen_search_kw);
        let case_insen_search_kw = trim_keywords(self.case_insen_search_kw);

        if case_sen_search_kw.is_empty() || case_insen_search_kw.is_empty() {
            return Err(Error::Validation(
                "Both case_sen_search_kw and case_insen_search_kw must \
                 contain at least one non-empty string value"
                    .to_string(),
            ));
        }

        Ok(Self {
            case_sen_search_kw,
            case_insen_search_kw,
            max_days_old: self.max_days_old,
        })
    }
}

fn trim_keywords(keywords: Vec<String>) -> Vec<String> {
    keywords
        .into_iter()
        .filter(|kw| !kw.trim().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("OpenAI's 'new' model"), "OpenAIs new model");
        assert_eq!(normalize_title("  \"Quoted\" headline "), "Quoted headline");
        assert_eq!(normalize_title("Plain headline"), "Plain headline");
    }

    #[test]
    fn test_article_record_validation() {
        let now = Utc::now();

        let record = ArticleRecord::new("A title", "https://news.example.com/a", None, now);
        assert!(record.is_ok());

        let record = ArticleRecord::new("''", "https://news.example.com/a", None, now);
        assert!(record.is_err());

        let record = ArticleRecord::new("A title", "http://news.example.com/a", None, now);
        assert!(record.is_err());

        let record = ArticleRecord::new(
            "A title",
            "https://news.example.com/a",
            Some("ftp://img.example.com/a.png".to_string()),
            now,
        );
        assert!(record.is_err());
    }

    #[test]
    fn test_pipeline_args_validation() {
        let args = PipelineArgs::default().validated().unwrap();
        assert!(!args.case_sen_search_kw.is_empty());
        assert!(!args.case_insen_search_kw.is_empty());

        let args = PipelineArgs {
            case_sen_search_kw: vec!["  ".to_string(), "".to_string()],
            ..PipelineArgs::default()
        };
        assert!(args.validated().is_err());
    }

    #[test]
    fn test_pipeline_args_drops_blank_keywords() {
        let args = PipelineArgs {
            case_sen_search_kw: vec![" AI ".to_string(), "  ".to_string()],
            case_insen_search_kw: vec![" Gemini ".to_string()],
            max_days_old: 2,
        };
        let args = args.validated().unwrap();
        assert_eq!(args.case_sen_search_kw, vec![" AI "]);
        assert_eq!(args.case_insen_search_kw, vec![" Gemini "]);
    }
}
