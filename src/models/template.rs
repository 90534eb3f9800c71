use serde::{Deserialize, Serialize};

/// RGB 颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// 十六进制表示，如 `003366`
    pub fn hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// 配色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub title_color: Rgb,
    pub text_color: Rgb,
}

/// 视觉模板：背景 + 配色
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub background_asset: Option<String>,
    pub palette: Palette,
}

impl Template {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        background_asset: Option<&str>,
        title_color: Rgb,
        text_color: Rgb,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            background_asset: background_asset.map(str::to_string),
            palette: Palette {
                title_color,
                text_color,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex() {
        assert_eq!(Rgb(0, 51, 102).hex(), "003366");
        assert_eq!(Rgb(255, 255, 255).hex(), "FFFFFF");
    }

    #[test]
    fn test_template_from_toml() {
        let template: Template = toml::from_str(
            r#"
            id = "custom"
            name = "Custom"
            background_asset = "bg.png"
            palette = { title_color = [0, 51, 102], text_color = [51, 51, 51] }
            "#,
        )
        .unwrap();
        assert_eq!(template.background_asset.as_deref(), Some("bg.png"));
        assert_eq!(template.palette.text_color, Rgb(51, 51, 51));
    }
}
