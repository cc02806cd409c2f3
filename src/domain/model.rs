use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Brand world 單字抽取

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordListMetadata {
    pub source_file: String,
    pub total_distinct_words: usize,
    pub extraction_timestamp: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordList {
    pub metadata: WordListMetadata,
    pub distinct_words: Vec<String>,
}

// ---------------------------------------------------------------------------
// 維度抽取

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BriefDimensions {
    pub dimensions: Vec<String>,
    pub dimension_count: usize,
    pub brief_content_length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignMetadata {
    pub total_briefs_processed: usize,
    pub brief_names: Vec<String>,
    pub analysis_timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignSummary {
    pub total_unique_dimensions: usize,
    pub average_dimensions_per_brief: f64,
    pub most_common_dimensions: Vec<(String, usize)>,
    pub dimensions_appearing_in_all_briefs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignReport {
    pub metadata: CampaignMetadata,
    pub briefs: BTreeMap<String, BriefDimensions>,
    pub all_dimensions: Vec<String>,
    pub dimension_frequency: BTreeMap<String, usize>,
    pub summary: CampaignSummary,
}

// ---------------------------------------------------------------------------
// 缺口填補

/// 每個維度值的來源標記
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillSource {
    LlmExtraction,
    BrandworldWords,
    FillFailed,
    NoData,
}

/// 模型回傳的單一維度填補建議
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillSuggestion {
    pub filled_value: String,
    #[serde(default)]
    pub words_used_from_list: Vec<String>,
    #[serde(default)]
    pub reasoning: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapFillMetadata {
    pub brief_excerpt: String,
    pub dimension_count: usize,
    pub filled_count: usize,
    pub extraction_timestamp: String,
    pub word_source: String,
    pub method: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilledTable {
    pub filled_table: BTreeMap<String, String>,
    pub sources: BTreeMap<String, FillSource>,
    pub metadata: GapFillMetadata,
}

// ---------------------------------------------------------------------------
// 評估與排名

/// 模型對單一維度值的兩項 1-5 評分。
/// 解析失敗時以預設值（零分）代替，不讓流程中斷。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DimensionEvaluation {
    #[serde(default)]
    pub dimension_value_match_score: u8,
    #[serde(default)]
    pub context_coherence_score: u8,
    #[serde(default)]
    pub dimension_value_match_reasoning: String,
    #[serde(default)]
    pub context_coherence_reasoning: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub average_dimension_match_score: f64,
    pub average_coherence_score: f64,
    pub total_score: f64,
    pub dimensions_evaluated: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatedVersion {
    pub version_id: usize,
    pub table: FilledTable,
    pub dimension_evaluations: BTreeMap<String, DimensionEvaluation>,
    pub summary_scores: ScoreSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationMetadata {
    pub timestamp: String,
    pub brief_name: String,
    pub brief_length: usize,
    pub total_dimensions: usize,
    pub versions_generated: usize,
    pub word_source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub best_score: f64,
    pub worst_score: f64,
    pub average_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub metadata: EvaluationMetadata,
    /// 依 total_score 由高到低排序
    pub versions: Vec<EvaluatedVersion>,
    pub top_versions: Vec<EvaluatedVersion>,
    pub saved_files: Vec<String>,
    pub evaluation_summary: EvaluationSummary,
}
