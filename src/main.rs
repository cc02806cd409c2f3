use anyhow::Context;
use briefcraft::config::cli::{brief_name_from_path, load_dimension_list, load_document};
use briefcraft::domain::model::WordList;
use briefcraft::domain::ports::Storage;
use briefcraft::utils::validation::Validate;
use briefcraft::utils::{logger, validation};
use briefcraft::{
    standard_dimensions, AnalysisEngine, BrandWorldPipeline, BriefError, ChatClient, Cli, Command,
    DimensionPipeline, EvaluationPipeline, GapFillPipeline, LocalStorage, Settings, Vocabulary,
};
use clap::Parser;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 只在本機開發時存在，讀不到就算了
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting briefcraft CLI");
    if cli.verbose {
        tracing::debug!("CLI args: {:?}", cli);
    }

    let mut settings = match &cli.config {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("failed to load config from {}", path))?,
        None => Settings::default(),
    };

    if let Some(output_path) = &cli.output_path {
        settings.output.path = output_path.clone();
    }

    // 驗證配置
    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    if cli.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(settings.output.path.clone());

    match run_command(&cli, &settings, storage).await {
        Ok(output_path) => {
            tracing::info!("✅ Analysis completed successfully!");
            println!("✅ Analysis completed successfully!");
            println!("📁 Output saved to: {}/{}", settings.output.path, output_path);
        }
        Err(e) => {
            tracing::error!("❌ Analysis failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

async fn run_command(
    cli: &Cli,
    settings: &Settings,
    storage: LocalStorage,
) -> briefcraft::Result<String> {
    match &cli.command {
        Command::BrandWorld { input } => run_brand_world(cli, storage, input).await,
        Command::Dimensions { briefs } => {
            validation::validate_file_extensions("briefs", briefs, &["txt", "md"])?;

            let mut loaded = Vec::new();
            for path in briefs {
                loaded.push((brief_name_from_path(path), load_document(path)?));
            }

            let chat = ChatClient::new(settings)?;
            let pipeline = DimensionPipeline::new(storage, chat, loaded);
            AnalysisEngine::new_with_monitoring(pipeline, cli.monitor)
                .run()
                .await
        }
        Command::GapFill {
            brief,
            words,
            dimensions,
        } => {
            let chat = ChatClient::new(settings)?;
            let pipeline = build_gap_fill(storage, chat, brief, words, dimensions.as_deref())?;
            AnalysisEngine::new_with_monitoring(pipeline, cli.monitor)
                .run()
                .await
        }
        Command::Evaluate {
            brief,
            words,
            versions,
            dimensions,
        } => {
            validation::validate_positive_number("versions", *versions, 1)?;

            let chat = ChatClient::new(settings)?;
            let gap = build_gap_fill(storage, chat, brief, words, dimensions.as_deref())?;

            tracing::info!("🔢 Versions to generate: {}", versions);
            let pipeline = EvaluationPipeline::new(gap, *versions);
            AnalysisEngine::new_with_monitoring(pipeline, cli.monitor)
                .run()
                .await
        }
    }
}

fn build_gap_fill(
    storage: LocalStorage,
    chat: ChatClient,
    brief: &str,
    words: &str,
    dimensions: Option<&str>,
) -> briefcraft::Result<GapFillPipeline<LocalStorage, ChatClient>> {
    let brief_name = brief_name_from_path(brief);
    let brief_text = load_document(brief)?;

    let words_content = std::fs::read_to_string(words)?;
    let vocabulary = Vocabulary::from_json_str(&words_content)?;

    let dimension_list = match dimensions {
        Some(path) => load_dimension_list(path)?,
        None => standard_dimensions(),
    };

    tracing::info!("🔄 Gap Filling Brief: {}", brief_name);
    tracing::info!("📋 Brief length: {} characters", brief_text.len());
    tracing::info!("📊 Dimensions: {}", dimension_list.len());
    tracing::info!("🎯 Word source: {}", words);

    Ok(GapFillPipeline::new(
        storage,
        chat,
        brief_name,
        brief_text,
        dimension_list,
        vocabulary,
        words.to_string(),
    ))
}

async fn run_brand_world(
    cli: &Cli,
    storage: LocalStorage,
    input: &str,
) -> briefcraft::Result<String> {
    let input_path = Path::new(input);

    if !input_path.is_dir() {
        return run_brand_world_single(cli, storage, input_path).await;
    }

    // 批次模式：處理資料夾內所有純文字文件並寫出彙總
    let mut documents: Vec<PathBuf> = std::fs::read_dir(input_path)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext == "txt" || ext == "md")
                .unwrap_or(false)
        })
        .collect();
    documents.sort();

    if documents.is_empty() {
        return Err(BriefError::ProcessingError {
            message: format!("No .txt or .md documents found in {}", input),
        });
    }

    tracing::info!("Found {} documents to process", documents.len());

    let mut individual_results: BTreeMap<String, serde_json::Value> = BTreeMap::new();
    let mut all_unique_words: BTreeSet<String> = BTreeSet::new();

    for (i, document) in documents.iter().enumerate() {
        let display_name = document.display().to_string();
        tracing::info!(
            "Processing document {}/{}: {}",
            i + 1,
            documents.len(),
            display_name
        );

        match run_brand_world_single(cli, storage.clone(), document).await {
            Ok(artifact) => {
                // 讀回剛寫出的單字表，併入跨文件統計
                let data = storage.read_file(&artifact).await?;
                let word_list: WordList = serde_json::from_slice(&data)?;

                all_unique_words.extend(word_list.distinct_words.iter().cloned());
                individual_results.insert(
                    word_list.metadata.source_file.clone(),
                    serde_json::json!({
                        "word_count": word_list.distinct_words.len(),
                        "artifact": artifact,
                    }),
                );
                tracing::info!("✅ Successfully processed {}", display_name);
            }
            Err(e) => {
                tracing::warn!("❌ Error processing {}: {}", display_name, e);
            }
        }
    }

    if individual_results.is_empty() {
        return Err(BriefError::ProcessingError {
            message: "All documents failed to process".to_string(),
        });
    }

    let documents_processed = individual_results.len();
    let unique_word_count = all_unique_words.len();

    let summary = serde_json::json!({
        "summary": {
            "total_documents_processed": documents_processed,
            "total_unique_words_across_all_documents": unique_word_count,
            "processing_timestamp": chrono::Local::now().to_rfc3339(),
        },
        "individual_results": individual_results,
        "all_unique_words": all_unique_words.iter().collect::<Vec<_>>(),
    });

    let summary_name = "all_documents_word_extraction_summary.json";
    storage
        .write_file(summary_name, serde_json::to_string_pretty(&summary)?.as_bytes())
        .await?;

    tracing::info!(
        "Batch processing complete: {} documents, {} unique words",
        documents_processed,
        unique_word_count
    );
    Ok(summary_name.to_string())
}

async fn run_brand_world_single(
    cli: &Cli,
    storage: LocalStorage,
    document: &Path,
) -> briefcraft::Result<String> {
    let source_name = document
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("document")
        .to_string();

    let content = load_document(&document.to_string_lossy())?;

    let pipeline = BrandWorldPipeline::new(storage, source_name, content);
    AnalysisEngine::new_with_monitoring(pipeline, cli.monitor)
        .run()
        .await
}
