use crate::core::prompts::GAP_FILLING_PROMPT;
use crate::domain::model::{FillSource, FillSuggestion, FilledTable, GapFillMetadata};
use crate::domain::ports::{ChatModel, Pipeline, Storage};
use crate::utils::error::{BriefError, Result};
use crate::utils::text::{excerpt, strip_code_fences};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand::rngs::StdRng;
use std::collections::BTreeMap;

/// 預設的 15 個標準行銷維度
pub const STANDARD_DIMENSIONS: [&str; 15] = [
    "Campaign Theme",
    "Marketing Objectives",
    "Universal Consumer Challenge",
    "Local Consumer Challenge (Market-Specific)",
    "Brand Context/Heritage",
    "Campaign Ambition/Scope",
    "Target Audience (Strategic Segment)",
    "Audience Demographics/Behavior",
    "Single-Minded Message",
    "Tone of Voice",
    "Key Deliverables/Assets",
    "Success Metrics (KPIs)",
    "Mandatory Channels/Formats",
    "Representation/Inclusivity Guidelines",
    "Cultural Adaptation Requirements",
];

pub fn standard_dimensions() -> Vec<String> {
    STANDARD_DIMENSIONS.iter().map(|s| s.to_string()).collect()
}

/// 每次送給模型的品牌單字樣本上限
const WORD_SAMPLE_SIZE: usize = 30;

/// 加權取樣時選出的單字數
const WEIGHTED_WORD_COUNT: usize = 5;

/// 品牌單字來源：獨立單字表，或舊版逐維度的機率分布
#[derive(Debug, Clone)]
pub enum Vocabulary {
    DistinctWords(Vec<String>),
    WeightedByDimension(BTreeMap<String, Vec<(String, f64)>>),
}

impl Vocabulary {
    /// 依 JSON 形狀判斷來源類型
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        if let Some(words) = value.get("distinct_words") {
            let words: Vec<String> = serde_json::from_value(words.clone())?;
            return Ok(Self::DistinctWords(words));
        }

        let analysis = value
            .get("tfidf_analysis")
            .or_else(|| value.get("frequency_analysis"));

        if let Some(serde_json::Value::Object(map)) = analysis {
            let mut by_dimension = BTreeMap::new();
            for (dimension, entry) in map {
                let mut weights = Vec::new();
                if let Some(dist) = entry
                    .get("probability_distribution")
                    .and_then(|d| d.as_object())
                {
                    for (word, weight) in dist {
                        if let Some(w) = weight.as_f64() {
                            if w > 0.0 {
                                weights.push((word.clone(), w));
                            }
                        }
                    }
                }
                by_dimension.insert(dimension.clone(), weights);
            }
            return Ok(Self::WeightedByDimension(by_dimension));
        }

        Err(BriefError::ProcessingError {
            message: "Word source has neither distinct_words nor a frequency analysis section"
                .to_string(),
        })
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(content)?;
        Self::from_json(&value)
    }

    pub fn method_name(&self) -> &'static str {
        match self {
            Self::DistinctWords(_) => "distinct_words",
            Self::WeightedByDimension(_) => "weighted_frequency",
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::DistinctWords(words) => words.is_empty(),
            Self::WeightedByDimension(map) => map.values().all(|w| w.is_empty()),
        }
    }
}

/// 單份 brief 的維度值抽取 + 缺口填補
pub struct GapFillPipeline<S: Storage, M: ChatModel> {
    pub(crate) storage: S,
    pub(crate) chat: M,
    pub(crate) brief_name: String,
    pub(crate) brief_text: String,
    pub(crate) dimensions: Vec<String>,
    pub(crate) vocabulary: Vocabulary,
    pub(crate) word_source: String,
    seed: u64,
    output_name: Option<String>,
}

impl<S: Storage, M: ChatModel> GapFillPipeline<S, M> {
    pub fn new(
        storage: S,
        chat: M,
        brief_name: String,
        brief_text: String,
        dimensions: Vec<String>,
        vocabulary: Vocabulary,
        word_source: String,
    ) -> Self {
        Self {
            storage,
            chat,
            brief_name,
            brief_text,
            dimensions,
            vocabulary,
            word_source,
            seed: 0,
            output_name: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_output_name(mut self, output_name: String) -> Self {
        self.output_name = Some(output_name);
        self
    }

    fn extraction_prompt(&self) -> String {
        let dimensions_str = self
            .dimensions
            .iter()
            .map(|dim| format!("- {}", dim))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"You are an expert marketing brief analyzer. Extract specific information for each dimension from the provided brief text.

For each of the following dimensions, provide the relevant information found in the brief. If a dimension is not explicitly mentioned or cannot be inferred from the brief, leave it empty.

Dimensions to extract:
{dimensions}

Return your response as a valid JSON object with dimension names as keys and extracted values as strings. Use empty string "" for dimensions that cannot be filled from the brief.

Brief text:
{brief}"#,
            dimensions = dimensions_str,
            brief = self.brief_text
        )
    }

    /// 以模型從 brief 抽取各維度值；失敗時退回全空表
    pub(crate) async fn extract_values(&self) -> Result<BTreeMap<String, String>> {
        tracing::info!("Extracting dimension values from brief...");

        let empty_table = || {
            self.dimensions
                .iter()
                .map(|dim| (dim.clone(), String::new()))
                .collect::<BTreeMap<String, String>>()
        };

        let raw = match self.chat.chat(&self.extraction_prompt()).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("❌ Error extracting dimension values: {}", e);
                return Ok(empty_table());
            }
        };

        let parsed: BTreeMap<String, serde_json::Value> =
            match serde_json::from_str(strip_code_fences(&raw)) {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::warn!("❌ Could not parse extraction response as JSON: {}", e);
                    return Ok(empty_table());
                }
            };

        // 保證每個維度都有對應鍵
        let mut values = BTreeMap::new();
        for dim in &self.dimensions {
            let value = parsed
                .get(dim)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .trim()
                .to_string();
            values.insert(dim.clone(), value);
        }

        let filled = values.values().filter(|v| !v.trim().is_empty()).count();
        tracing::info!("Successfully extracted data for {} dimensions", filled);
        Ok(values)
    }

    /// 請模型用品牌單字填補單一維度；任何失敗都退回隨機單字組合
    async fn fill_gap(
        &self,
        dimension: &str,
        sampled_words: &[String],
        context: &BTreeMap<String, String>,
        rng: &mut StdRng,
    ) -> FillSuggestion {
        let context_str = context
            .iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .map(|(dim, value)| format!("- {}: {}", dim, value))
            .collect::<Vec<_>>()
            .join("\n");

        let message = format!(
            "{prompt}\n\nDIMENSION TO FILL: {dimension}\n\nAVAILABLE BRAND WORDS: {words}\n\nCONTEXT FROM OTHER DIMENSIONS:\n{context}\n\nPlease provide a meaningful fill-in for the dimension \"{dimension}\" using words from the brand vocabulary list.",
            prompt = GAP_FILLING_PROMPT,
            dimension = dimension,
            words = sampled_words.join(", "),
            context = context_str
        );

        let failure = match self.chat.chat(&message).await {
            Ok(raw) => match serde_json::from_str::<FillSuggestion>(strip_code_fences(&raw)) {
                Ok(suggestion) if !suggestion.filled_value.trim().is_empty() => {
                    return suggestion;
                }
                Ok(_) => "response contained an empty filled_value".to_string(),
                Err(e) => format!("could not parse fill response: {}", e),
            },
            Err(e) => e.to_string(),
        };

        tracing::warn!(
            "Error filling gap for dimension '{}': {}",
            dimension,
            failure
        );

        let fallback_words: Vec<String> = sampled_words
            .choose_multiple(rng, 3.min(sampled_words.len()))
            .cloned()
            .collect();

        FillSuggestion {
            filled_value: fallback_words.join(" "),
            words_used_from_list: fallback_words,
            reasoning: format!("Fallback fill due to API error: {}", failure),
        }
    }

    /// 依已抽取的值補齊缺口並組出結果表
    pub(crate) async fn build_table(
        &self,
        extracted: BTreeMap<String, String>,
        seed: u64,
    ) -> Result<FilledTable> {
        let mut rng = StdRng::seed_from_u64(seed);

        let mut filled: BTreeMap<String, String> = BTreeMap::new();
        let mut sources: BTreeMap<String, FillSource> = BTreeMap::new();
        let mut missing: Vec<String> = Vec::new();

        for dim in &self.dimensions {
            let value = extracted.get(dim).cloned().unwrap_or_default();
            if value.trim().is_empty() {
                missing.push(dim.clone());
            } else {
                filled.insert(dim.clone(), value);
                sources.insert(dim.clone(), FillSource::LlmExtraction);
            }
        }

        tracing::info!("Found {} missing dimensions to fill", missing.len());

        if !missing.is_empty() && self.vocabulary.is_empty() {
            tracing::warn!("⚠️ Word source is empty, missing dimensions stay unfilled");
        }

        for dim in missing {
            let (value, source) = match &self.vocabulary {
                Vocabulary::DistinctWords(words) if words.is_empty() => {
                    (String::new(), FillSource::NoData)
                }
                Vocabulary::DistinctWords(words) => {
                    tracing::info!("Filling dimension: {}", dim);

                    let sampled: Vec<String> = words
                        .choose_multiple(&mut rng, WORD_SAMPLE_SIZE.min(words.len()))
                        .cloned()
                        .collect();

                    if sampled.is_empty() {
                        (String::new(), FillSource::FillFailed)
                    } else {
                        let suggestion = self.fill_gap(&dim, &sampled, &filled, &mut rng).await;
                        tracing::info!("  ✅ Filled '{}' with: '{}'", dim, suggestion.filled_value);
                        tracing::debug!("  📝 Used words: {:?}", suggestion.words_used_from_list);
                        (suggestion.filled_value, FillSource::BrandworldWords)
                    }
                }
                Vocabulary::WeightedByDimension(map) => match map.get(&dim) {
                    Some(weights) if !weights.is_empty() => {
                        let selected = select_weighted_words(weights, WEIGHTED_WORD_COUNT, &mut rng);
                        (selected.join(", "), FillSource::BrandworldWords)
                    }
                    _ => (String::new(), FillSource::NoData),
                },
            };

            filled.insert(dim.clone(), value);
            sources.insert(dim, source);
        }

        let filled_count = filled.values().filter(|v| !v.trim().is_empty()).count();
        let llm_count = sources
            .values()
            .filter(|s| **s == FillSource::LlmExtraction)
            .count();
        let brandworld_count = sources
            .values()
            .filter(|s| **s == FillSource::BrandworldWords)
            .count();

        tracing::info!("📊 Gap Filling Results:");
        tracing::info!(
            "  ✅ Total filled: {}/{} dimensions",
            filled_count,
            self.dimensions.len()
        );
        tracing::info!("  🤖 From model extraction: {}", llm_count);
        tracing::info!("  📚 From brand world: {}", brandworld_count);

        Ok(FilledTable {
            metadata: GapFillMetadata {
                brief_excerpt: excerpt(&self.brief_text, 200),
                dimension_count: self.dimensions.len(),
                filled_count,
                extraction_timestamp: chrono::Local::now().to_rfc3339(),
                word_source: self.word_source.clone(),
                method: self.vocabulary.method_name().to_string(),
            },
            filled_table: filled,
            sources,
        })
    }

    /// 產生一個完整版本（抽取 + 填補），評估流程用不同 seed 重複呼叫
    pub(crate) async fn build_version(&self, seed: u64) -> Result<FilledTable> {
        let extracted = self.extract_values().await?;
        self.build_table(extracted, seed).await
    }
}

fn select_weighted_words(
    weights: &[(String, f64)],
    count: usize,
    rng: &mut StdRng,
) -> Vec<String> {
    let k = count.min(weights.len());

    match WeightedIndex::new(weights.iter().map(|(_, w)| *w)) {
        Ok(dist) => (0..k).map(|_| weights[dist.sample(rng)].0.clone()).collect(),
        Err(e) => {
            // 權重異常時退回均勻取樣
            tracing::warn!("Error selecting words by probability: {}", e);
            weights
                .choose_multiple(rng, k)
                .map(|(word, _)| word.clone())
                .collect()
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, M: ChatModel> Pipeline for GapFillPipeline<S, M> {
    type Raw = BTreeMap<String, String>;
    type Output = FilledTable;

    async fn extract(&self) -> Result<Self::Raw> {
        self.extract_values().await
    }

    async fn transform(&self, data: Self::Raw) -> Result<FilledTable> {
        self.build_table(data, self.seed).await
    }

    async fn load(&self, result: FilledTable) -> Result<String> {
        let output_name = self
            .output_name
            .clone()
            .unwrap_or_else(|| format!("gap_filled_{}.json", self.brief_name));

        let json_data = serde_json::to_string_pretty(&result)?;
        self.storage
            .write_file(&output_name, json_data.as_bytes())
            .await?;

        tracing::info!("💾 Gap filling results saved to: {}", output_name);
        Ok(output_name)
    }
}
