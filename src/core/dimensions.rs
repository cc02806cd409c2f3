use crate::core::prompts::DIMENSION_EXTRACTION_PROMPT;
use crate::domain::model::{BriefDimensions, CampaignMetadata, CampaignReport, CampaignSummary};
use crate::domain::ports::{ChatModel, Pipeline, Storage};
use crate::utils::error::{BriefError, Result};
use std::collections::BTreeMap;

/// 對多份 brief 做維度抽取並彙總成比較表
pub struct DimensionPipeline<S: Storage, M: ChatModel> {
    pub(crate) storage: S,
    pub(crate) chat: M,
    briefs: Vec<(String, String)>,
}

impl<S: Storage, M: ChatModel> DimensionPipeline<S, M> {
    pub fn new(storage: S, chat: M, briefs: Vec<(String, String)>) -> Self {
        Self {
            storage,
            chat,
            briefs,
        }
    }

    async fn extract_brief_dimensions(&self, brief_name: &str, brief_content: &str) -> Vec<String> {
        tracing::info!("Extracting dimensions from: {}", brief_name);

        let message = format!(
            "{}\n\nBrief content:\n{}",
            DIMENSION_EXTRACTION_PROMPT, brief_content
        );

        match self.chat.chat(&message).await {
            Ok(response) => {
                let dimensions = parse_dimension_list(&response);
                tracing::info!(
                    "Extracted {} dimensions from {}",
                    dimensions.len(),
                    brief_name
                );
                dimensions
            }
            Err(e) => {
                // 單份 brief 失敗時以空清單繼續，不中斷整批處理
                tracing::warn!("❌ Error extracting dimensions from {}: {}", brief_name, e);
                Vec::new()
            }
        }
    }

    fn output_stem(&self) -> String {
        let names: Vec<&str> = self.briefs.iter().map(|(name, _)| name.as_str()).collect();
        format!("dimensions_{}", names.join("_"))
    }

    fn comparison_csv(&self, report: &CampaignReport) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        let mut header = vec!["dimension".to_string()];
        header.extend(report.metadata.brief_names.iter().cloned());
        writer.write_record(&header)?;

        for dimension in &report.all_dimensions {
            let mut row = vec![dimension.clone()];
            for brief_name in &report.metadata.brief_names {
                let present = report
                    .briefs
                    .get(brief_name)
                    .map(|b| b.dimensions.contains(dimension))
                    .unwrap_or(false);
                row.push(if present { "x".to_string() } else { String::new() });
            }
            writer.write_record(&row)?;
        }

        writer
            .into_inner()
            .map_err(|e| BriefError::ProcessingError {
                message: format!("Failed to finalize comparison CSV: {}", e),
            })
    }
}

/// 模型以 CSV 格式回傳維度清單；逗號切開並去除前後雜訊
pub fn parse_dimension_list(response: &str) -> Vec<String> {
    response
        .split(',')
        .map(|dim| dim.trim().trim_start_matches('-').trim())
        .filter(|dim| !dim.is_empty())
        .map(|dim| dim.to_string())
        .collect()
}

#[async_trait::async_trait]
impl<S: Storage, M: ChatModel> Pipeline for DimensionPipeline<S, M> {
    type Raw = Vec<(String, BriefDimensions)>;
    type Output = CampaignReport;

    async fn extract(&self) -> Result<Self::Raw> {
        if self.briefs.is_empty() {
            return Err(BriefError::ProcessingError {
                message: "Brief list cannot be empty".to_string(),
            });
        }

        tracing::info!("Processing {} briefs", self.briefs.len());

        let mut extracted = Vec::new();
        for (brief_name, brief_content) in &self.briefs {
            let dimensions = self
                .extract_brief_dimensions(brief_name, brief_content)
                .await;

            extracted.push((
                brief_name.clone(),
                BriefDimensions {
                    dimension_count: dimensions.len(),
                    brief_content_length: brief_content.len(),
                    dimensions,
                },
            ));
        }

        Ok(extracted)
    }

    async fn transform(&self, data: Self::Raw) -> Result<CampaignReport> {
        let brief_names: Vec<String> = data.iter().map(|(name, _)| name.clone()).collect();
        let total_briefs = data.len();

        let mut briefs = BTreeMap::new();
        let mut dimension_frequency: BTreeMap<String, usize> = BTreeMap::new();

        for (name, brief) in data {
            for dimension in &brief.dimensions {
                *dimension_frequency.entry(dimension.clone()).or_insert(0) += 1;
            }
            briefs.insert(name, brief);
        }

        let all_dimensions: Vec<String> = dimension_frequency.keys().cloned().collect();

        // 出現次數由高到低，同次數依名稱排序
        let mut most_common: Vec<(String, usize)> = dimension_frequency
            .iter()
            .map(|(dim, count)| (dim.clone(), *count))
            .collect();
        most_common.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        most_common.truncate(10);

        let dimensions_appearing_in_all_briefs: Vec<String> = dimension_frequency
            .iter()
            .filter(|(_, count)| **count == total_briefs)
            .map(|(dim, _)| dim.clone())
            .collect();

        let total_dimension_count: usize = briefs.values().map(|b| b.dimension_count).sum();
        let average_dimensions_per_brief = total_dimension_count as f64 / total_briefs as f64;

        Ok(CampaignReport {
            metadata: CampaignMetadata {
                total_briefs_processed: total_briefs,
                brief_names,
                analysis_timestamp: chrono::Local::now().to_rfc3339(),
            },
            summary: CampaignSummary {
                total_unique_dimensions: all_dimensions.len(),
                average_dimensions_per_brief,
                most_common_dimensions: most_common,
                dimensions_appearing_in_all_briefs,
            },
            briefs,
            all_dimensions,
            dimension_frequency,
        })
    }

    async fn load(&self, result: CampaignReport) -> Result<String> {
        let stem = self.output_stem();

        let json_name = format!("{}.json", stem);
        let json_data = serde_json::to_string_pretty(&result)?;
        self.storage
            .write_file(&json_name, json_data.as_bytes())
            .await?;

        // 比較表輸出成 CSV，方便丟進資料表工具
        let csv_name = format!("{}.csv", stem);
        let csv_data = self.comparison_csv(&result)?;
        self.storage.write_file(&csv_name, &csv_data).await?;

        tracing::info!("💾 Results saved to: {} and {}", json_name, csv_name);
        Ok(json_name)
    }
}
