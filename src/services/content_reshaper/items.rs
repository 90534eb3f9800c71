//! 列表条目切分策略
//!
//! 每个策略独立可测，返回 `None` 表示不适用，由调用方继续尝试下一个

use std::sync::OnceLock;

use regex::Regex;

use crate::utils::text::split_sentences;

/// 切分策略：(原文, 目标条数, 每块最少词数) -> 条目
pub type SplitStrategy = fn(&str, usize, usize) -> Option<Vec<String>>;

/// 按优先级排列的策略链
pub const STRATEGIES: [(&str, SplitStrategy); 5] = [
    ("bullet_marker", split_on_bullet_marker as SplitStrategy),
    ("dash_marker", split_on_dash_markers as SplitStrategy),
    ("lines", split_on_lines as SplitStrategy),
    ("sentences", split_on_sentences as SplitStrategy),
    ("word_chunks", split_into_word_chunks as SplitStrategy),
];

/// 依次尝试策略链，返回命中的策略名和切分结果（未补齐）
pub fn split_items(raw: &str, target: usize, min_chunk_words: usize) -> (Option<&'static str>, Vec<String>) {
    for (name, strategy) in STRATEGIES {
        if let Some(items) = strategy(raw, target, min_chunk_words) {
            return (Some(name), items);
        }
    }
    (None, Vec::new())
}

fn leading_marker() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(?:[•\-–—*]+|\d+[.)])\s*").ok())
        .as_ref()
}

fn dash_marker() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^[ \t]*[-–—][ \t]+").ok())
        .as_ref()
}

/// 去掉条目开头的项目符号或编号
pub fn clean_item(item: &str) -> String {
    let stripped = match leading_marker() {
        Some(re) => re.replace(item, "").into_owned(),
        None => item.to_string(),
    };
    stripped.trim().to_string()
}

fn collect_items<'a>(parts: impl Iterator<Item = &'a str>) -> Option<Vec<String>> {
    let items: Vec<String> = parts
        .map(clean_item)
        .filter(|item| !item.is_empty())
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

/// 1. 显式项目符号 `•`
pub fn split_on_bullet_marker(raw: &str, _target: usize, _min: usize) -> Option<Vec<String>> {
    if !raw.contains('•') {
        return None;
    }
    collect_items(raw.split('•'))
}

/// 2. 行首短横线
pub fn split_on_dash_markers(raw: &str, _target: usize, _min: usize) -> Option<Vec<String>> {
    let re = dash_marker()?;
    if !re.is_match(raw) {
        return None;
    }
    collect_items(re.split(raw))
}

/// 3. 至少三行非空文本
pub fn split_on_lines(raw: &str, _target: usize, _min: usize) -> Option<Vec<String>> {
    let lines: Vec<&str> = raw.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.len() < 3 {
        return None;
    }
    collect_items(lines.into_iter())
}

/// 4. 句子数不少于目标条数时取前 `target` 句
pub fn split_on_sentences(raw: &str, target: usize, _min: usize) -> Option<Vec<String>> {
    let sentences = split_sentences(raw);
    if sentences.len() < target.max(1) {
        return None;
    }
    collect_items(sentences.iter().take(target).map(String::as_str))
}

/// 5. 按词均分为连续块，每块至少 `min_chunk_words` 词
pub fn split_into_word_chunks(raw: &str, target: usize, min_chunk_words: usize) -> Option<Vec<String>> {
    let words: Vec<&str> = raw.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }
    let even = words.len().div_ceil(target.max(1));
    let chunk_size = even.max(min_chunk_words).max(1);
    let chunks: Vec<String> = words.chunks(chunk_size).map(|c| c.join(" ")).collect();
    collect_items(chunks.iter().map(String::as_str))
}
