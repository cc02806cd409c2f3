use briefcraft::domain::model::WordList;
use briefcraft::{AnalysisEngine, BrandWorldPipeline, LocalStorage};
use tempfile::TempDir;

#[tokio::test]
async fn test_end_to_end_word_extraction() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let content = "\
Skrewball is a playful, mischievous peanut butter whiskey.\n\n\
The brand celebrates rebellious spirits and unique adventures.\n\n\
Bold flavors for those who dare to try something different.";

    let storage = LocalStorage::new(output_path.clone());
    let pipeline = BrandWorldPipeline::new(
        storage,
        "Skrewball Brand World.txt".to_string(),
        content.to_string(),
    );

    let engine = AnalysisEngine::new(pipeline);
    let output_name = engine.run().await.unwrap();

    assert_eq!(output_name, "Skrewball Brand World_distinct_words.json");

    let artifact_path = temp_dir.path().join(&output_name);
    assert!(artifact_path.exists());

    let data = std::fs::read(&artifact_path).unwrap();
    let word_list: WordList = serde_json::from_slice(&data).unwrap();

    assert_eq!(word_list.metadata.source_file, "Skrewball Brand World.txt");
    assert_eq!(
        word_list.metadata.total_distinct_words,
        word_list.distinct_words.len()
    );

    // Distinct, sorted, filtered vocabulary
    let mut sorted = word_list.distinct_words.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted, word_list.distinct_words);

    assert!(word_list.distinct_words.contains(&"whiskey".to_string()));
    assert!(word_list.distinct_words.contains(&"rebellious".to_string()));
    assert!(word_list.distinct_words.contains(&"peanut".to_string()));
    assert!(!word_list.distinct_words.contains(&"the".to_string()));
    assert!(!word_list.distinct_words.contains(&"who".to_string()));
}

#[tokio::test]
async fn test_long_document_is_chunked_and_deduplicated() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    // 重複內容遠超過單一塊的大小
    let content = "Adventure seekers love bold peanut whiskey flavors.\n\n".repeat(150);

    let storage = LocalStorage::new(output_path);
    let pipeline = BrandWorldPipeline::new(storage, "repeated.txt".to_string(), content)
        .with_output_name("repeated_words.json".to_string());

    let engine = AnalysisEngine::new(pipeline);
    let output_name = engine.run().await.unwrap();

    let data = std::fs::read(temp_dir.path().join(&output_name)).unwrap();
    let word_list: WordList = serde_json::from_slice(&data).unwrap();

    // 不管重複幾次，獨立單字就那幾個
    assert_eq!(
        word_list.distinct_words,
        vec!["adventure", "bold", "flavors", "love", "peanut", "seekers", "whiskey"]
    );
}
