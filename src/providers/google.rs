use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use super::TranslationBackend;

/// Public Google Translate endpoint, source language auto-detected
pub struct GoogleTranslateBackend {
    endpoint: String,
    client: reqwest::Client,
}

impl GoogleTranslateBackend {
    pub fn new(endpoint: impl Into<String>, request_timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    async fn translate_one(&self, text: &str, target_lang: &str) -> anyhow::Result<String> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target_lang),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .context("Translation request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("Translation request failed: HTTP {}", response.status());
        }

        let body: Value = response.json().await.context("Failed to parse translation response")?;
        parse_translation(&body)
    }
}

#[async_trait]
impl TranslationBackend for GoogleTranslateBackend {
    async fn translate_batch(&self, texts: &[String], target_lang: &str) -> anyhow::Result<Vec<String>> {
        let mut translated = Vec::with_capacity(texts.len());
        for text in texts {
            translated.push(self.translate_one(text, target_lang).await?);
        }
        Ok(translated)
    }
}

/// Join the sentence chunks of a `translate_a/single` response
fn parse_translation(body: &Value) -> anyhow::Result<String> {
    let sentences = body
        .get(0)
        .and_then(Value::as_array)
        .context("Unexpected translation response shape")?;

    Ok(sentences
        .iter()
        .filter_map(|sentence| sentence.get(0).and_then(Value::as_str))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_translation_joins_sentences() {
        let body = json!([
            [["Bonjour. ", "Hello. ", null, null, 10], ["Comment ça va ?", "How are you?", null, null, 10]],
            null,
            "en"
        ]);
        assert_eq!(parse_translation(&body).unwrap(), "Bonjour. Comment ça va ?");
    }

    #[test]
    fn test_parse_translation_rejects_unknown_shape() {
        assert!(parse_translation(&json!({"error": "quota"})).is_err());
    }

    #[tokio::test]
    async fn test_blank_text_is_not_sent() {
        let backend = GoogleTranslateBackend::new("http://127.0.0.1:9/unused", Duration::from_secs(1)).unwrap();
        let result = backend.translate_batch(&["  ".to_string()], "fr").await.unwrap();
        assert_eq!(result, vec!["  ".to_string()]);
    }
}
