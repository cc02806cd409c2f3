use regex::Regex;
use std::collections::BTreeSet;

/// 切分長文本時依序嘗試的分隔符，最後才做硬切
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

/// 基本停用詞（只做簡單過濾）
const STOP_WORDS: [&str; 93] = [
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it",
    "its", "of", "on", "that", "the", "to", "was", "will", "with", "would", "can", "could",
    "should", "may", "might", "must", "shall", "this", "these", "those", "they", "them", "their",
    "there", "where", "when", "why", "how", "what", "who", "which", "i", "you", "we", "our",
    "your", "my", "me", "him", "her", "us", "or", "but", "if", "then", "than", "so", "very",
    "just", "now", "only", "also", "not", "no", "yes", "do", "does", "did", "have", "had", "get",
    "got", "go", "went", "come", "came", "take", "took", "make", "made", "see", "saw", "know",
    "knew", "think", "thought", "say", "said",
];

#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap: chunk_overlap.min(chunk_size.saturating_sub(1)),
        }
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        self.split_at_level(text, 0, &mut chunks);
        chunks
    }

    fn split_at_level(&self, text: &str, level: usize, out: &mut Vec<String>) {
        if text.len() <= self.chunk_size {
            if !text.trim().is_empty() {
                out.push(text.to_string());
            }
            return;
        }

        if level >= SEPARATORS.len() {
            self.hard_split(text, out);
            return;
        }

        let separator = SEPARATORS[level];
        if !text.contains(separator) {
            self.split_at_level(text, level + 1, out);
            return;
        }

        // 依分隔符切開後再合併成不超過 chunk_size 的片段
        let mut current = String::new();
        for piece in text.split(separator) {
            if piece.len() > self.chunk_size {
                if !current.trim().is_empty() {
                    out.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
                self.split_at_level(piece, level + 1, out);
                continue;
            }

            let projected = current.len() + separator.len() + piece.len();
            if !current.is_empty() && projected > self.chunk_size {
                let finished = std::mem::take(&mut current);
                // 保留尾端字元作為下一塊的重疊區
                current = tail_chars(&finished, self.chunk_overlap).trim_start().to_string();
                if !finished.trim().is_empty() {
                    out.push(finished);
                }
            }

            if !current.is_empty() {
                current.push_str(separator);
            }
            current.push_str(piece);
        }

        if !current.trim().is_empty() {
            out.push(current);
        }
    }

    fn hard_split(&self, text: &str, out: &mut Vec<String>) {
        let chars: Vec<char> = text.chars().collect();
        let step = self
            .chunk_size
            .saturating_sub(self.chunk_overlap)
            .max(1);

        let mut start = 0;
        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());
            let piece: String = chars[start..end].iter().collect();
            if !piece.trim().is_empty() {
                out.push(piece);
            }
            if end == chars.len() {
                break;
            }
            start += step;
        }
    }
}

impl Default for TextSplitter {
    fn default() -> Self {
        // 只是抽取單字，所以用較大的塊
        Self::new(2000, 100)
    }
}

fn tail_chars(text: &str, max_chars: usize) -> &str {
    if max_chars == 0 {
        return "";
    }
    let count = text.chars().count();
    if count <= max_chars {
        return text;
    }
    let skip = count - max_chars;
    let idx = text
        .char_indices()
        .nth(skip)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &text[idx..]
}

/// 從文字中抽取乾淨的獨立單字（小寫、長度 > 2、排除停用詞）
pub fn extract_words(text: &str) -> BTreeSet<String> {
    if text.trim().is_empty() {
        return BTreeSet::new();
    }

    let pattern = Regex::new(r"\b[a-z]+\b").unwrap();
    let lowered = text.to_lowercase();

    let mut words = BTreeSet::new();
    for found in pattern.find_iter(&lowered) {
        let word = found.as_str();
        if word.len() > 2 && !STOP_WORDS.contains(&word) {
            words.insert(word.to_string());
        }
    }
    words
}

/// 模型常把 JSON 包在 ```json 圍欄裡，解析前先剝掉
pub fn strip_code_fences(response: &str) -> &str {
    let mut cleaned = response.trim();
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest;
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest;
    }
    cleaned.trim()
}

/// 取字串前 max_chars 個字元做摘要，過長時加上省略號
pub fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{}...", head)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_single_chunk() {
        let splitter = TextSplitter::new(100, 10);
        let chunks = splitter.split("a short paragraph");
        assert_eq!(chunks, vec!["a short paragraph".to_string()]);
    }

    #[test]
    fn test_split_prefers_paragraph_breaks() {
        let splitter = TextSplitter::new(30, 0);
        let text = "first paragraph here\n\nsecond paragraph here\n\nthird one";
        let chunks = splitter.split(text);

        assert!(chunks.len() >= 2);
        for chunk in &chunks {
            assert!(chunk.len() <= 30, "chunk too long: {:?}", chunk);
        }
        assert!(chunks[0].contains("first paragraph"));
    }

    #[test]
    fn test_chunks_overlap() {
        let splitter = TextSplitter::new(20, 8);
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa";
        let chunks = splitter.split(text);

        assert!(chunks.len() >= 2);
        // 相鄰塊之間應共享尾端文字
        let first_tail: String = chunks[0].chars().rev().take(4).collect();
        let tail: String = first_tail.chars().rev().collect();
        assert!(
            chunks[1].contains(tail.trim()),
            "expected {:?} to appear in {:?}",
            tail,
            chunks[1]
        );
    }

    #[test]
    fn test_hard_split_handles_unbroken_text() {
        let splitter = TextSplitter::new(10, 2);
        let text = "abcdefghijklmnopqrstuvwxyz";
        let chunks = splitter.split(text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 10);
        }
        assert!(chunks[0].starts_with("abcdefghij"));
    }

    #[test]
    fn test_extract_words_filters_noise() {
        let words = extract_words("The Whiskey is BOLD and bold, it has 12 peanut flavors!");
        assert!(words.contains("whiskey"));
        assert!(words.contains("bold"));
        assert!(words.contains("peanut"));
        assert!(words.contains("flavors"));
        // 停用詞與短字被過濾
        assert!(!words.contains("the"));
        assert!(!words.contains("is"));
        assert!(!words.contains("and"));
        assert!(!words.contains("it"));
    }

    #[test]
    fn test_extract_words_empty_input() {
        assert!(extract_words("").is_empty());
        assert!(extract_words("   \n  ").is_empty());
    }

    #[test]
    fn test_extract_words_ignores_digit_runs() {
        let words = extract_words("abc123 mixes digits");
        assert!(!words.contains("abc"));
        assert!(words.contains("mixes"));
        assert!(words.contains("digits"));
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("{\"a\": 1}"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn test_excerpt_truncates_on_char_boundary() {
        assert_eq!(excerpt("short", 200), "short");
        let long = "x".repeat(300);
        let cut = excerpt(&long, 200);
        assert_eq!(cut.chars().count(), 203);
        assert!(cut.ends_with("..."));
        // 多位元組字元不會讓截斷出錯
        let unicode = "café ".repeat(100);
        let cut = excerpt(&unicode, 200);
        assert!(cut.ends_with("..."));
    }
}
