use async_trait::async_trait;
use tracing::warn;

use super::Tool;
use crate::services::{NewsClient, NewsSearchRequest, NewsSearchResponse};

const MAX_RESULTS: usize = 5;
const SHOWN: usize = 3;

/// Searches recent news articles about a topic
#[derive(Debug, Clone, Default)]
pub struct NewsSearchTool {
    client: NewsClient,
}

impl NewsSearchTool {
    pub fn new(client: NewsClient) -> Self {
        Self { client }
    }
}

/// Summary of the top articles
pub fn format_top_articles(data: &NewsSearchResponse) -> String {
    if !data.success {
        return "No articles found".to_string();
    }

    let mut result = format!("Found {} articles. Top {}:\n\n", data.count, SHOWN);
    for (i, article) in data.articles.iter().take(SHOWN).enumerate() {
        result.push_str(&format!(
            "{}. {}\n   {}\n\n",
            i + 1,
            article.title.as_deref().unwrap_or("None"),
            article.url.as_deref().unwrap_or("None"),
        ));
    }
    result
}

#[async_trait]
impl Tool for NewsSearchTool {
    fn name(&self) -> &str {
        "gdelt_news_search"
    }

    fn description(&self) -> &str {
        "Search GDELT for news articles about a topic"
    }

    async fn call(&self, input: &str) -> String {
        let request = NewsSearchRequest::recent(input, MAX_RESULTS);
        match self.client.search(&request).await {
            Ok(data) => format_top_articles(&data),
            Err(e) => {
                warn!("News search failed: {}", e);
                format!("Error: {}", e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::Article;

    fn article(title: &str, url: &str) -> Article {
        Article {
            title: Some(title.to_string()),
            url: Some(url.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_format_top_three() {
        let data = NewsSearchResponse {
            success: true,
            count: 4,
            articles: vec![
                article("One", "http://1"),
                article("Two", "http://2"),
                article("Three", "http://3"),
                article("Four", "http://4"),
            ],
        };

        let text = format_top_articles(&data);
        assert!(text.starts_with("Found 4 articles. Top 3:\n\n1. One\n   http://1\n\n"));
        assert!(text.contains("3. Three"));
        assert!(!text.contains("Four"));
    }

    #[test]
    fn test_unsuccessful_search() {
        let data = NewsSearchResponse::default();
        assert_eq!(format_top_articles(&data), "No articles found");
    }
}
