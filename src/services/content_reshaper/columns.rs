//! 三栏解析

use std::sync::OnceLock;

use regex::Regex;

use crate::models::{Column, Language};
use crate::utils::text::{split_sentences, word_count};

/// 栏目分隔符：`标题1|||正文1|||标题2|||正文2|||标题3|||正文3`
pub const COLUMN_SEPARATOR: &str = "|||";

/// 标题关键词 -> 三个栏目标题（乌兹别克语、俄语、英语）
struct HeaderRule {
    keywords: &'static [&'static str],
    headers: [[&'static str; 3]; 3],
}

const HEADER_RULES: &[HeaderRule] = &[
    // 经济
    HeaderRule {
        keywords: &[
            "iqtisod", "biznes", "moliya", "bozor", "savdo", "экономи", "бизнес", "финанс",
            "рынок", "торгов", "econom", "business", "financ", "market", "trade",
        ],
        headers: [
            ["Sabablari", "Ta'siri", "Yechimlar"],
            ["Причины", "Последствия", "Решения"],
            ["Causes", "Effects", "Solutions"],
        ],
    },
    // 问题
    HeaderRule {
        keywords: &[
            "muammo", "masala", "yechim", "проблем", "вопрос", "решени", "problem", "issue",
            "solution", "challenge",
        ],
        headers: [
            ["Muammolar", "Sabablar", "Yechimlar"],
            ["Проблемы", "Причины", "Решения"],
            ["Problems", "Causes", "Solutions"],
        ],
    },
    // 历史
    HeaderRule {
        keywords: &[
            "tarix", "rivojlanish", "o'sish", "davr", "истори", "развити", "эпох", "период",
            "history", "historical", "development", "growth",
        ],
        headers: [
            ["Boshlang'ich", "Rivojlanish", "Natijalar"],
            ["Начало", "Развитие", "Результаты"],
            ["Beginning", "Development", "Results"],
        ],
    },
    // 分析
    HeaderRule {
        keywords: &[
            "tahlil", "tadqiqot", "o'rganish", "анализ", "исследовани", "изучени", "analysis",
            "research", "study",
        ],
        headers: [
            ["Ma'lumotlar", "Tahlil", "Xulosalar"],
            ["Данные", "Анализ", "Выводы"],
            ["Data", "Analysis", "Conclusions"],
        ],
    },
    // 技术
    HeaderRule {
        keywords: &[
            "texnologiya", "innovatsiya", "raqamli", "технолог", "инновац", "цифров", "technolog",
            "innovation", "digital",
        ],
        headers: [
            ["Texnologiya", "Qo'llanish", "Kelajak"],
            ["Технология", "Применение", "Будущее"],
            ["Technology", "Application", "Future"],
        ],
    },
];

const DEFAULT_HEADERS: [[&str; 3]; 3] = [
    ["Asosiy Jihat", "Muhim Omil", "Yakuniy Natija"],
    ["Ключевой аспект", "Важный фактор", "Итоговый результат"],
    ["Key Aspect", "Important Factor", "Final Outcome"],
];

fn language_slot(language: Language) -> usize {
    match language {
        Language::Uzbek => 0,
        Language::Russian => 1,
        Language::English => 2,
    }
}

/// 根据单元标题推导三个栏目标题
pub fn derive_headers(title: &str, language: Language) -> [String; 3] {
    let lower = title.to_lowercase();
    let table = HEADER_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| lower.contains(k)))
        .map(|rule| &rule.headers)
        .unwrap_or(&DEFAULT_HEADERS);
    table[language_slot(language)].map(str::to_string)
}

/// 解析分隔符格式，偶数位为标题、奇数位为正文，最多三栏
///
/// 最后一段没有对应正文时，该段作为正文并使用默认标题
pub fn parse_separated(raw: &str, language: Language) -> Vec<Column> {
    let segments: Vec<&str> = raw.split(COLUMN_SEPARATOR).map(str::trim).collect();
    let defaults = language.separator_headers();

    segments
        .chunks(2)
        .take(3)
        .enumerate()
        .map(|(position, pair)| match pair {
            [header, body] => {
                let header = if header.is_empty() {
                    defaults[position].to_string()
                } else {
                    header.to_string()
                };
                Column::new(header, *body)
            }
            [body] => Column::new(defaults[position], *body),
            _ => language.filler_column(position),
        })
        .collect()
}

fn marker_patterns() -> &'static [Regex] {
    static RE: OnceLock<Vec<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        [r"[•*]", r"(?m)^[ \t]*[-–—]+[ \t]*", r"(?m)^[ \t]*\d+[.)][ \t]*"]
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect()
    })
}

/// 去掉项目符号和行首编号
pub fn strip_markers(raw: &str) -> String {
    let mut text = raw.to_string();
    for re in marker_patterns() {
        text = re.replace_all(&text, "").into_owned();
    }
    text.trim().to_string()
}

/// 把清理后的正文切成三段
///
/// 词数足够时按词均分，其次按句子分组，最后按字符三等分
pub fn split_three(clean: &str, min_column_words: usize) -> [String; 3] {
    let words: Vec<&str> = clean.split_whitespace().collect();
    if !words.is_empty() && words.len() >= 3 * min_column_words {
        let per = words.len() / 3;
        return [
            words[..per].join(" "),
            words[per..2 * per].join(" "),
            words[2 * per..].join(" "),
        ];
    }

    let sentences = split_sentences(clean);
    if sentences.len() >= 3 {
        let per = sentences.len() / 3;
        return [
            sentences[..per].join(" "),
            sentences[per..2 * per].join(" "),
            sentences[2 * per..].join(" "),
        ];
    }

    let chars: Vec<char> = clean.chars().collect();
    let third = chars.len() / 3;
    [
        chars[..third].iter().collect::<String>().trim().to_string(),
        chars[third..2 * third].iter().collect::<String>().trim().to_string(),
        chars[2 * third..].iter().collect::<String>().trim().to_string(),
    ]
}

/// 正文不足最少词数时追加说明句
pub fn pad_body(body: &str, min_words: usize, language: Language) -> String {
    let mut body = body.trim().to_string();
    let elaboration = language.elaboration();
    while word_count(&body) < min_words.max(1) {
        if !body.is_empty() {
            body.push(' ');
        }
        body.push_str(elaboration);
    }
    body
}
