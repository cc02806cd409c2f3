use crate::core::gap_fill::GapFillPipeline;
use crate::core::prompts::EVALUATION_PROMPT;
use crate::domain::model::{
    DimensionEvaluation, EvaluatedVersion, EvaluationMetadata, EvaluationReport,
    EvaluationSummary, FilledTable, ScoreSummary,
};
use crate::domain::ports::{ChatModel, Pipeline, Storage};
use crate::utils::error::{BriefError, Result};
use crate::utils::text::strip_code_fences;
use std::collections::BTreeMap;

/// 每個版本取樣 seed 的間隔
const VERSION_SEED_STRIDE: u64 = 42;

/// 排名後保留的版本數
const TOP_N: usize = 3;

/// 產生 N 個填補版本、逐維度評分、排名並保留前三名
pub struct EvaluationPipeline<S: Storage, M: ChatModel> {
    pub(crate) gap: GapFillPipeline<S, M>,
    n_versions: usize,
}

impl<S: Storage, M: ChatModel> EvaluationPipeline<S, M> {
    pub fn new(gap: GapFillPipeline<S, M>, n_versions: usize) -> Self {
        Self { gap, n_versions }
    }

    /// 請模型為單一維度值打兩個 1-5 分。
    /// 回應缺漏或無法解析時回傳零分記錄，不讓整個評估中斷。
    async fn evaluate_dimension(
        &self,
        dimension: &str,
        fill_value: &str,
        all_values: &BTreeMap<String, String>,
    ) -> DimensionEvaluation {
        let other_values_str = all_values
            .iter()
            .filter(|(dim, value)| dim.as_str() != dimension && !value.trim().is_empty())
            .map(|(dim, value)| format!("- {}: {}", dim, value))
            .collect::<Vec<_>>()
            .join("\n");

        let message = format!(
            "{prompt}\n\nDIMENSION TO EVALUATE:\nDimension Name: {dimension}\nFill-in Value: {value}\n\nOTHER DIMENSION VALUES IN THE SAME ROW:\n{others}\n",
            prompt = EVALUATION_PROMPT,
            dimension = dimension,
            value = fill_value,
            others = other_values_str
        );

        let failure = match self.gap.chat.chat(&message).await {
            Ok(raw) => {
                match serde_json::from_str::<DimensionEvaluation>(strip_code_fences(&raw)) {
                    Ok(evaluation) => return evaluation,
                    Err(e) => format!("could not parse evaluation response: {}", e),
                }
            }
            Err(e) => e.to_string(),
        };

        tracing::warn!("Error evaluating dimension {}: {}", dimension, failure);
        DimensionEvaluation {
            dimension_value_match_reasoning: format!("Evaluation error: {}", failure),
            context_coherence_reasoning: format!("Evaluation error: {}", failure),
            ..DimensionEvaluation::default()
        }
    }

    async fn evaluate_version(&self, version_id: usize, table: FilledTable) -> EvaluatedVersion {
        tracing::info!("  Evaluating version {}...", version_id);

        let mut dimension_evaluations = BTreeMap::new();
        for (dim_name, dim_value) in &table.filled_table {
            // 只評估有值的維度
            if dim_value.trim().is_empty() {
                continue;
            }
            let evaluation = self
                .evaluate_dimension(dim_name, dim_value, &table.filled_table)
                .await;
            dimension_evaluations.insert(dim_name.clone(), evaluation);
        }

        let summary_scores = score_evaluations(&dimension_evaluations);
        tracing::info!(
            "    Version {} - Total Score: {:.2}",
            version_id,
            summary_scores.total_score
        );

        EvaluatedVersion {
            version_id,
            table,
            dimension_evaluations,
            summary_scores,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 兩項評分各取平均，總分為兩平均之和
pub fn score_evaluations(evaluations: &BTreeMap<String, DimensionEvaluation>) -> ScoreSummary {
    let evaluated = evaluations.len();
    let divisor = evaluated.max(1) as f64;

    let match_total: u32 = evaluations
        .values()
        .map(|e| e.dimension_value_match_score as u32)
        .sum();
    let coherence_total: u32 = evaluations
        .values()
        .map(|e| e.context_coherence_score as u32)
        .sum();

    let average_match = match_total as f64 / divisor;
    let average_coherence = coherence_total as f64 / divisor;

    ScoreSummary {
        average_dimension_match_score: round2(average_match),
        average_coherence_score: round2(average_coherence),
        total_score: round2(average_match + average_coherence),
        dimensions_evaluated: evaluated,
    }
}

/// 依 total_score 由高到低排序
pub fn rank_versions(mut versions: Vec<EvaluatedVersion>) -> Vec<EvaluatedVersion> {
    versions.sort_by(|a, b| {
        b.summary_scores
            .total_score
            .total_cmp(&a.summary_scores.total_score)
    });
    versions
}

#[async_trait::async_trait]
impl<S: Storage, M: ChatModel> Pipeline for EvaluationPipeline<S, M> {
    type Raw = Vec<(usize, FilledTable)>;
    type Output = EvaluationReport;

    async fn extract(&self) -> Result<Self::Raw> {
        tracing::info!("🔄 Creating {} gap-filled versions for evaluation...", self.n_versions);

        let mut versions = Vec::new();
        for version_id in 1..=self.n_versions {
            tracing::info!("  Generating version {}/{}...", version_id, self.n_versions);

            // 每個版本用不同 seed 取樣，讓結果有差異
            let seed = version_id as u64 * VERSION_SEED_STRIDE;
            match self.gap.build_version(seed).await {
                Ok(table) => versions.push((version_id, table)),
                Err(e) => {
                    tracing::warn!("    ❌ Error creating version {}: {}", version_id, e);
                    continue;
                }
            }
        }

        if versions.is_empty() {
            return Err(BriefError::ProcessingError {
                message: "No gap-filled versions were successfully created".to_string(),
            });
        }

        tracing::info!("✅ Successfully created {} versions", versions.len());
        Ok(versions)
    }

    async fn transform(&self, data: Self::Raw) -> Result<EvaluationReport> {
        tracing::info!("📊 Evaluating {} gap-filled versions...", data.len());

        let versions_generated = data.len();
        let mut evaluated = Vec::new();
        for (version_id, table) in data {
            evaluated.push(self.evaluate_version(version_id, table).await);
        }

        let ranked = rank_versions(evaluated);

        tracing::info!("🏆 Evaluation complete! Top scores:");
        for (i, version) in ranked.iter().take(TOP_N).enumerate() {
            tracing::info!(
                "  {}. Version {}: {:.2}",
                i + 1,
                version.version_id,
                version.summary_scores.total_score
            );
        }

        let best_score = ranked
            .first()
            .map(|v| v.summary_scores.total_score)
            .unwrap_or(0.0);
        let worst_score = ranked
            .last()
            .map(|v| v.summary_scores.total_score)
            .unwrap_or(0.0);
        let average_score = if ranked.is_empty() {
            0.0
        } else {
            round2(
                ranked
                    .iter()
                    .map(|v| v.summary_scores.total_score)
                    .sum::<f64>()
                    / ranked.len() as f64,
            )
        };

        let top_versions: Vec<EvaluatedVersion> = ranked.iter().take(TOP_N).cloned().collect();

        Ok(EvaluationReport {
            metadata: EvaluationMetadata {
                timestamp: chrono::Local::now().to_rfc3339(),
                brief_name: self.gap.brief_name.clone(),
                brief_length: self.gap.brief_text.len(),
                total_dimensions: self.gap.dimensions.len(),
                versions_generated,
                word_source: self.gap.word_source.clone(),
            },
            versions: ranked,
            top_versions,
            saved_files: Vec::new(),
            evaluation_summary: EvaluationSummary {
                best_score,
                worst_score,
                average_score,
            },
        })
    }

    async fn load(&self, result: EvaluationReport) -> Result<String> {
        let mut report = result;
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();

        tracing::info!("💾 Saving top {} evaluated results...", report.top_versions.len());

        for (i, version) in report.top_versions.iter().enumerate() {
            let rank = i + 1;
            let filename = format!(
                "top_{}_{}_v{}_score{:.1}_{}.json",
                rank,
                self.gap.brief_name,
                version.version_id,
                version.summary_scores.total_score,
                timestamp
            );

            let json_data = serde_json::to_string_pretty(version)?;
            self.gap
                .storage
                .write_file(&filename, json_data.as_bytes())
                .await?;

            tracing::info!(
                "  {}. Saved version {} (score: {:.2}) to: {}",
                rank,
                version.version_id,
                version.summary_scores.total_score,
                filename
            );
            report.saved_files.push(filename);
        }

        let report_name = format!("evaluation_{}_{}.json", self.gap.brief_name, timestamp);
        let json_data = serde_json::to_string_pretty(&report)?;
        self.gap
            .storage
            .write_file(&report_name, json_data.as_bytes())
            .await?;

        tracing::info!(
            "🏆 Best score: {:.2}",
            report.evaluation_summary.best_score
        );
        Ok(report_name)
    }
}
