use crate::utils::error::{BriefError, Result};
use clap::{Parser, Subcommand};
use std::path::Path;

#[derive(Debug, Parser)]
#[command(name = "briefcraft")]
#[command(about = "Marketing brief analysis pipelines backed by a chat-completion API")]
pub struct Cli {
    /// TOML 配置檔路徑
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// 覆寫配置檔的輸出目錄
    #[arg(long, global = true)]
    pub output_path: Option<String>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[arg(long, global = true, help = "Log per-phase system stats")]
    pub monitor: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 從 brand world 純文字文件抽取獨立單字表
    BrandWorld {
        /// 純文字文件，或含多份文件的資料夾
        #[arg(long)]
        input: String,
    },
    /// 從多份 brief 抽取維度並彙總成比較表
    Dimensions {
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        briefs: Vec<String>,
    },
    /// 對單份 brief 抽取維度值並以品牌單字填補缺口
    GapFill {
        #[arg(long)]
        brief: String,
        /// 品牌單字 JSON（distinct words 或 legacy frequency analysis）
        #[arg(long)]
        words: String,
        /// 自訂維度清單檔，每行一個維度
        #[arg(long)]
        dimensions: Option<String>,
    },
    /// 產生 N 個填補版本、逐項評分並保留前三名
    Evaluate {
        #[arg(long)]
        brief: String,
        #[arg(long)]
        words: String,
        #[arg(long, default_value = "5")]
        versions: usize,
        #[arg(long)]
        dimensions: Option<String>,
    },
}

/// 檔名轉 brief 名稱：小寫、空白與連字號換成底線
pub fn brief_name_from_path(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("unknown")
        .to_lowercase()
        .replace([' ', '-'], "_")
}

pub fn load_document(path: &str) -> Result<String> {
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Err(BriefError::ProcessingError {
            message: format!("No content extracted from {}", path),
        });
    }
    Ok(content)
}

/// 讀取維度清單檔：每行一個維度，忽略空行
pub fn load_dimension_list(path: &str) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    let dimensions: Vec<String> = content
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
        .collect();

    if dimensions.is_empty() {
        return Err(BriefError::ProcessingError {
            message: format!("Dimension list file {} is empty", path),
        });
    }
    Ok(dimensions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_brief_name_from_path() {
        assert_eq!(
            brief_name_from_path("files/brief/Ballantine Poland-2024.txt"),
            "ballantine_poland_2024"
        );
        assert_eq!(brief_name_from_path("abs_china.md"), "abs_china");
    }

    #[test]
    fn test_load_document_rejects_empty_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"  \n ").unwrap();

        let result = load_document(temp_file.path().to_str().unwrap());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_dimension_list() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"Campaign Theme\n\n  Tone of Voice  \n")
            .unwrap();

        let dimensions = load_dimension_list(temp_file.path().to_str().unwrap()).unwrap();
        assert_eq!(dimensions, vec!["Campaign Theme", "Tone of Voice"]);
    }
}
