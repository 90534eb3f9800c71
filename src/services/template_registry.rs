//! 模板目录 - 业务能力层
//!
//! 进程启动时加载一次，之后只读，可被多个组装任务并发读取

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use crate::models::{Rgb, Template};

/// 默认模板：无背景、中性配色
pub const DEFAULT_TEMPLATE_ID: &str = "template_20";

/// 内置目录：(id, 名称, 背景文件, 标题色, 正文色)
const BUILTIN: [(&str, &str, Option<&str>, Rgb, Rgb); 20] = [
    ("template_1", "Ta'lim Anjumani", Some("template_1.png"), Rgb(0, 51, 102), Rgb(51, 51, 51)),
    ("template_2", "Ko'k Geometrik", Some("template_2.jpg"), Rgb(0, 102, 204), Rgb(0, 51, 102)),
    ("template_3", "Texnologiya", Some("template_3.jpg"), Rgb(0, 153, 255), Rgb(0, 102, 153)),
    ("template_4", "Lola Gullari", Some("template_4.jpg"), Rgb(153, 0, 51), Rgb(102, 51, 51)),
    ("template_5", "Gul Naqshli", Some("template_5.jpg"), Rgb(153, 51, 153), Rgb(102, 51, 102)),
    ("template_6", "Rangli Olti Burchak", Some("template_6.jpg"), Rgb(255, 102, 0), Rgb(51, 51, 51)),
    ("template_7", "Minimalist", Some("template_7.jpg"), Rgb(0, 102, 153), Rgb(51, 51, 51)),
    ("template_8", "Yashil Gradient", Some("template_8.jpg"), Rgb(0, 153, 51), Rgb(0, 102, 51)),
    ("template_9", "Ko'k To'lqin", Some("template_9.jpg"), Rgb(0, 102, 204), Rgb(0, 51, 102)),
    ("template_10", "Biznes Professional", Some("template_10.jpg"), Rgb(0, 51, 153), Rgb(0, 51, 102)),
    ("template_11", "Zamonaviy Ko'k", Some("template_11.jpg"), Rgb(0, 102, 255), Rgb(0, 51, 153)),
    ("template_12", "Piksel Ko'k", Some("template_12.jpg"), Rgb(51, 153, 255), Rgb(0, 102, 204)),
    ("template_13", "Klassik Vintage", Some("template_13.jpg"), Rgb(102, 51, 0), Rgb(51, 51, 51)),
    ("template_14", "Yashil-Sariq", Some("template_14.jpg"), Rgb(0, 102, 102), Rgb(0, 51, 51)),
    ("template_15", "Ish Stoli", Some("template_15.jpg"), Rgb(51, 51, 51), Rgb(102, 102, 102)),
    ("template_16", "Ta'lim Elementlari", Some("template_16.png"), Rgb(0, 153, 255), Rgb(0, 102, 153)),
    ("template_17", "Texno Ko'k", Some("template_17.jpg"), Rgb(0, 102, 255), Rgb(0, 51, 153)),
    ("template_18", "Yashil To'lqin", Some("template_18.jpg"), Rgb(0, 153, 102), Rgb(0, 102, 51)),
    ("template_19", "Bahor Ranglar", Some("template_19.jpg"), Rgb(255, 51, 102), Rgb(102, 51, 51)),
    (DEFAULT_TEMPLATE_ID, "Klassik Oq", None, Rgb(0, 51, 102), Rgb(51, 51, 51)),
];

/// TOML 目录文件格式
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    default: Option<String>,
    templates: Vec<Template>,
}

/// 模板目录
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: Vec<Template>,
    default_index: usize,
}

impl TemplateRegistry {
    /// 内置的 20 个模板
    pub fn builtin() -> Self {
        let templates: Vec<Template> = BUILTIN
            .iter()
            .map(|(id, name, bg, title, text)| Template::new(*id, *name, *bg, *title, *text))
            .collect();
        let default_index = templates.len() - 1;
        Self {
            templates,
            default_index,
        }
    }

    /// 从 TOML 文本加载目录
    ///
    /// 未指定 `default` 时取第一个无背景模板，没有则取第一个
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let catalog: CatalogFile = toml::from_str(content).context("模板目录格式错误")?;
        if catalog.templates.is_empty() {
            bail!("模板目录为空");
        }

        let default_index = match &catalog.default {
            Some(id) => catalog
                .templates
                .iter()
                .position(|t| &t.id == id)
                .with_context(|| format!("默认模板 {} 不在目录中", id))?,
            None => catalog
                .templates
                .iter()
                .position(|t| t.background_asset.is_none())
                .unwrap_or(0),
        };

        Ok(Self {
            templates: catalog.templates,
            default_index,
        })
    }

    /// 加载目录：配置了目录文件时读取文件，否则使用内置目录
    pub fn load(catalog_path: Option<&Path>) -> Result<Self> {
        let Some(path) = catalog_path else {
            return Ok(Self::builtin());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("读取模板目录失败: {}", path.display()))?;
        let registry = Self::from_toml_str(&content)?;
        info!(
            "✓ 已加载模板目录 {} ({} 个模板)",
            path.display(),
            registry.templates.len()
        );
        Ok(registry)
    }

    /// 按 id 取模板，未知 id 返回默认模板
    pub fn get(&self, template_id: &str) -> &Template {
        match self.templates.iter().find(|t| t.id == template_id) {
            Some(template) => template,
            None => {
                warn!("⚠️ 未知模板 {}，使用默认模板", template_id);
                self.default_template()
            }
        }
    }

    pub fn contains(&self, template_id: &str) -> bool {
        self.templates.iter().any(|t| t.id == template_id)
    }

    pub fn default_template(&self) -> &Template {
        &self.templates[self.default_index]
    }

    pub fn all(&self) -> &[Template] {
        &self.templates
    }

    /// 按每组 `size` 个分组，供外部选择菜单使用
    pub fn groups(&self, size: usize) -> Vec<&[Template]> {
        self.templates.chunks(size.max(1)).collect()
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
