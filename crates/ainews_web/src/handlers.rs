use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use tracing::error;

use ainews_core::types::{ArticleRecord, PipelineArgs};
use ainews_core::Error;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ExtractionResponse {
    pub total_articles: usize,
    pub data: Vec<ExtractedArticle>,
}

/// One article in the response body, dates rendered as strings.
#[derive(Debug, Serialize)]
pub struct ExtractedArticle {
    pub title: String,
    pub news_link: String,
    pub image_link: Option<String>,
    pub publish_date: String,
}

impl ExtractedArticle {
    fn from_record(record: &ArticleRecord, date_format: &str) -> Self {
        Self {
            title: record.title.clone(),
            news_link: record.news_link.clone(),
            image_link: record.image_link.clone(),
            publish_date: record.publish_date.format(date_format).to_string(),
        }
    }
}

pub async fn extract_articles(
    State(state): State<Arc<AppState>>,
    Json(args): Json<PipelineArgs>,
) -> impl IntoResponse {
    match state.pipeline.run(&args).await {
        Ok(articles) => {
            let date_format = &state.pipeline.config().date_string_format;
            let data: Vec<ExtractedArticle> = articles
                .iter()
                .map(|record| ExtractedArticle::from_record(record, date_format))
                .collect();

            let response = ExtractionResponse {
                total_articles: data.len(),
                data,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(Error::Validation(message)) => {
            (StatusCode::BAD_REQUEST, message).into_response()
        }
        Err(e) => {
            error!("Extraction pipeline failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_extracted_article_renders_dates_as_strings() {
        let record = ArticleRecord::new(
            "A title",
            "https://example.com/a",
            None,
            Utc.with_ymd_and_hms(2020, 10, 9, 14, 19, 0).unwrap(),
        )
        .unwrap();

        let article = ExtractedArticle::from_record(&record, "%Y-%m-%dT%H:%M:%SZ");
        assert_eq!(article.publish_date, "2020-10-09T14:19:00Z");

        let body = serde_json::to_value(&article).unwrap();
        assert_eq!(body["publish_date"], "2020-10-09T14:19:00Z");
        assert_eq!(body["image_link"], serde_json::Value::Null);
    }
}
