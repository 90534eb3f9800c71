/// 文本处理工具

/// 按空白统计词数
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// 取前 `n` 个词
pub fn first_words(text: &str, n: usize) -> String {
    text.split_whitespace().take(n).collect::<Vec<_>>().join(" ")
}

/// 合并连续空白（含换行）为单个空格
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 按句末标点切分句子，保留标点
///
/// 句末标点后必须紧跟空白或文本结束，`3.5` 这类数字不会被切开
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') {
            let at_boundary = chars.peek().map_or(true, |next| next.is_whitespace());
            if at_boundary {
                let sentence = current.trim();
                if !sentence.is_empty() {
                    sentences.push(sentence.to_string());
                }
                current.clear();
            }
        }
    }

    let rest = current.trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }
    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sentences() {
        let s = split_sentences("Birinchi gap. Ikkinchi gap! Narx 3.5 dollar? Oxiri");
        assert_eq!(
            s,
            vec!["Birinchi gap.", "Ikkinchi gap!", "Narx 3.5 dollar?", "Oxiri"]
        );
        assert!(split_sentences("   ").is_empty());
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("a\n\n b\t c "), "a b c");
        assert_eq!(first_words("a b c d", 2), "a b");
        assert_eq!(word_count(""), 0);
    }
}
