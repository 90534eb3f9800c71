use serde::{Deserialize, Serialize};

/// 单元渲染布局
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutType {
    /// 标题页
    Title,
    /// 五条要点
    #[serde(alias = "bullet_points")]
    BulletList,
    /// 文字 + 配图
    TextWithImage,
    /// 三栏
    ThreeColumn,
    /// 三条要点
    ThreeBullets,
    /// 四条编号
    FourNumbered,
}

impl LayoutType {
    pub fn as_str(self) -> &'static str {
        match self {
            LayoutType::Title => "title",
            LayoutType::BulletList => "bullet_list",
            LayoutType::TextWithImage => "text_with_image",
            LayoutType::ThreeColumn => "three_column",
            LayoutType::ThreeBullets => "three_bullets",
            LayoutType::FourNumbered => "four_numbered",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "title" => Some(LayoutType::Title),
            "bullet_list" | "bullet_points" => Some(LayoutType::BulletList),
            "text_with_image" => Some(LayoutType::TextWithImage),
            "three_column" => Some(LayoutType::ThreeColumn),
            "three_bullets" => Some(LayoutType::ThreeBullets),
            "four_numbered" => Some(LayoutType::FourNumbered),
            _ => None,
        }
    }

    /// 列表类布局要求的条目数
    pub fn item_count(self) -> Option<usize> {
        match self {
            LayoutType::BulletList => Some(5),
            LayoutType::ThreeBullets => Some(3),
            LayoutType::FourNumbered => Some(4),
            _ => None,
        }
    }

    /// 是否需要配图
    pub fn needs_image(self) -> bool {
        matches!(self, LayoutType::TextWithImage)
    }
}

impl std::fmt::Display for LayoutType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&LayoutType::FourNumbered).unwrap();
        assert_eq!(json, "\"four_numbered\"");

        let parsed: LayoutType = serde_json::from_str("\"bullet_points\"").unwrap();
        assert_eq!(parsed, LayoutType::BulletList);
    }

    #[test]
    fn test_item_count() {
        assert_eq!(LayoutType::BulletList.item_count(), Some(5));
        assert_eq!(LayoutType::ThreeBullets.item_count(), Some(3));
        assert_eq!(LayoutType::FourNumbered.item_count(), Some(4));
        assert_eq!(LayoutType::ThreeColumn.item_count(), None);
    }
}
