use briefcraft::domain::model::CampaignReport;
use briefcraft::{AnalysisEngine, ChatClient, DimensionPipeline, LocalStorage, Settings};
use httpmock::prelude::*;
use tempfile::TempDir;

fn test_settings(endpoint: String) -> Settings {
    let mut settings = Settings::default();
    settings.api.endpoint = endpoint;
    settings.api.api_key = Some("sk-test".to_string());
    settings
}

fn chat_response(content: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [
            {"message": {"role": "assistant", "content": content}}
        ]
    })
}

#[tokio::test]
async fn test_end_to_end_dimension_extraction_with_mock_api() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/chat/completions")
            .body_contains("Brief content:");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(chat_response(
                "Campaign Theme, Target Audience, Tone of Voice, Key Visual Style",
            ));
    });

    let briefs = vec![
        (
            "abs_china".to_string(),
            "Campaign brief for the Chinese market.".to_string(),
        ),
        (
            "ballantine_poland".to_string(),
            "Campaign brief for the Polish market.".to_string(),
        ),
    ];

    let settings = test_settings(server.url("/v1/chat/completions"));
    let chat = ChatClient::new(&settings).unwrap();
    let storage = LocalStorage::new(output_path);

    let pipeline = DimensionPipeline::new(storage, chat, briefs);
    let engine = AnalysisEngine::new(pipeline);
    let output_name = engine.run().await.unwrap();

    // 每份 brief 各一次 API 呼叫
    api_mock.assert_hits(2);

    assert_eq!(output_name, "dimensions_abs_china_ballantine_poland.json");

    let json_path = temp_dir.path().join(&output_name);
    assert!(json_path.exists());

    let report: CampaignReport =
        serde_json::from_slice(&std::fs::read(&json_path).unwrap()).unwrap();

    assert_eq!(report.metadata.total_briefs_processed, 2);
    assert_eq!(report.summary.total_unique_dimensions, 4);
    assert_eq!(report.summary.average_dimensions_per_brief, 4.0);
    assert_eq!(report.dimension_frequency["Campaign Theme"], 2);
    assert_eq!(
        report.summary.dimensions_appearing_in_all_briefs.len(),
        4
    );

    // 比較表 CSV 也要落地
    let csv_path = temp_dir
        .path()
        .join("dimensions_abs_china_ballantine_poland.csv");
    assert!(csv_path.exists());

    let csv_text = std::fs::read_to_string(&csv_path).unwrap();
    assert!(csv_text.starts_with("dimension,abs_china,ballantine_poland"));
    assert!(csv_text.contains("Campaign Theme,x,x"));
}

#[tokio::test]
async fn test_api_failure_degrades_to_empty_dimension_lists() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(500).body("upstream exploded");
    });

    let briefs = vec![(
        "abs_china".to_string(),
        "Campaign brief for the Chinese market.".to_string(),
    )];

    let settings = test_settings(server.url("/v1/chat/completions"));
    let chat = ChatClient::new(&settings).unwrap();
    let storage = LocalStorage::new(output_path);

    let pipeline = DimensionPipeline::new(storage, chat, briefs);
    let engine = AnalysisEngine::new(pipeline);

    // 模型失敗時照樣產出報告，只是維度是空的
    let output_name = engine.run().await.unwrap();
    api_mock.assert();

    let report: CampaignReport =
        serde_json::from_slice(&std::fs::read(temp_dir.path().join(&output_name)).unwrap())
            .unwrap();

    assert_eq!(report.summary.total_unique_dimensions, 0);
    assert!(report.briefs["abs_china"].dimensions.is_empty());
}
