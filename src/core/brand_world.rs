use crate::domain::model::{WordList, WordListMetadata};
use crate::domain::ports::{Pipeline, Storage};
use crate::utils::error::Result;
use crate::utils::text::{extract_words, TextSplitter};
use std::collections::BTreeSet;
use std::path::Path;

/// 從 brand world 文件抽取獨立單字表
pub struct BrandWorldPipeline<S: Storage> {
    pub(crate) storage: S,
    source_name: String,
    content: String,
    splitter: TextSplitter,
    output_name: Option<String>,
}

impl<S: Storage> BrandWorldPipeline<S> {
    pub fn new(storage: S, source_name: String, content: String) -> Self {
        Self {
            storage,
            source_name,
            content,
            splitter: TextSplitter::default(),
            output_name: None,
        }
    }

    pub fn with_output_name(mut self, output_name: String) -> Self {
        self.output_name = Some(output_name);
        self
    }

    fn default_output_name(&self) -> String {
        let stem = Path::new(&self.source_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("document");
        format!("{}_distinct_words.json", stem)
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for BrandWorldPipeline<S> {
    type Raw = Vec<String>;
    type Output = WordList;

    async fn extract(&self) -> Result<Vec<String>> {
        tracing::info!(
            "Extracted {} characters from {}",
            self.content.len(),
            self.source_name
        );

        let chunks = self.splitter.split(&self.content);
        tracing::info!("Split into {} chunks for processing", chunks.len());
        Ok(chunks)
    }

    async fn transform(&self, chunks: Vec<String>) -> Result<WordList> {
        let mut all_words: BTreeSet<String> = BTreeSet::new();

        for (i, chunk) in chunks.iter().enumerate() {
            all_words.extend(extract_words(chunk));

            if (i + 1) % 10 == 0 {
                tracing::debug!(
                    "Processed {}/{} chunks - Found {} unique words so far",
                    i + 1,
                    chunks.len(),
                    all_words.len()
                );
            }
        }

        tracing::info!(
            "Completed processing all chunks - Total unique words: {}",
            all_words.len()
        );

        // BTreeSet 迭代本身就是排序的
        let word_list: Vec<String> = all_words.into_iter().collect();

        Ok(WordList {
            metadata: WordListMetadata {
                source_file: self.source_name.clone(),
                total_distinct_words: word_list.len(),
                extraction_timestamp: chrono::Local::now().to_rfc3339(),
                description:
                    "Distinct words extracted from document (stop words removed, min 3 characters)"
                        .to_string(),
            },
            distinct_words: word_list,
        })
    }

    async fn load(&self, result: WordList) -> Result<String> {
        let output_name = self
            .output_name
            .clone()
            .unwrap_or_else(|| self.default_output_name());

        let json_data = serde_json::to_string_pretty(&result)?;
        self.storage
            .write_file(&output_name, json_data.as_bytes())
            .await?;

        tracing::info!("💾 Distinct words saved to: {}", output_name);
        Ok(output_name)
    }
}
