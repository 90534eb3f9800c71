use anyhow::{bail, Context, Result};
use slide_forge::models::{sections_for_pages, DocumentKind, GenerationJob, Language};
use slide_forge::services::template_registry::DEFAULT_TEMPLATE_ID;
use slide_forge::utils::logging;
use slide_forge::{App, Config, JobRequest};

const USAGE: &str =
    "用法: slide_forge <topic> [unit_count | <页数>p] [kind: deck|long-form-a|long-form-b] [language: uz|ru|en] [template_id] [author]";

/// 数量参数：单元数，或长文的页数上限（如 `15p`）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Size {
    Units(usize),
    Pages(usize),
}

fn parse_size(s: &str) -> Result<Size> {
    let s = s.trim();
    match s.strip_suffix('p') {
        Some(pages) => pages
            .parse()
            .map(Size::Pages)
            .with_context(|| format!("无效的页数: {}", s)),
        None => s
            .parse()
            .map(Size::Units)
            .with_context(|| format!("无效的单元数量: {}", s)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);

    let request = parse_args(std::env::args().skip(1).collect())?;

    // 初始化并运行应用
    let app = App::initialize(config)?;
    let document = app.run(request).await?;

    println!("{}", document.path.display());
    Ok(())
}

fn parse_args(args: Vec<String>) -> Result<JobRequest> {
    let mut args = args.into_iter();
    let Some(topic) = args.next() else {
        bail!("{}", USAGE);
    };

    let size = match args.next() {
        Some(s) => parse_size(&s)?,
        None => Size::Units(10),
    };
    let kind = match args.next() {
        Some(s) => DocumentKind::from_str(&s).with_context(|| format!("无效的文档类型: {}\n{}", s, USAGE))?,
        None => DocumentKind::Deck,
    };
    let language = match args.next() {
        Some(s) => Language::from_code(&s).with_context(|| format!("无效的语言: {}\n{}", s, USAGE))?,
        None => Language::default(),
    };
    let unit_count = match size {
        Size::Units(n) => n,
        Size::Pages(_) if !kind.is_long_form() => bail!("页数只适用于长文\n{}", USAGE),
        Size::Pages(pages) => sections_for_pages(kind, pages),
    };
    let template_id = args.next().unwrap_or_else(|| DEFAULT_TEMPLATE_ID.to_string());
    let author = args.next().unwrap_or_default();

    Ok(JobRequest::new(
        GenerationJob::new(topic, unit_count, language, kind),
        template_id,
        author,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let request = parse_args(args(&["Quyosh tizimi"])).unwrap();
        assert_eq!(request.job.unit_count, 10);
        assert_eq!(request.job.document_kind, DocumentKind::Deck);
        assert_eq!(request.template_id, DEFAULT_TEMPLATE_ID);
    }

    #[test]
    fn test_page_limit_sets_section_count() {
        let request = parse_args(args(&["Hujayra", "20p", "long-form-a", "uz"])).unwrap();
        assert_eq!(request.job.document_kind, DocumentKind::IndependentWork);
        assert_eq!(request.job.unit_count, 9);

        let request = parse_args(args(&["Hujayra", "12p", "referat"])).unwrap();
        assert_eq!(request.job.unit_count, 5);
    }

    #[test]
    fn test_page_limit_rejected_for_deck() {
        assert!(parse_args(args(&["Hujayra", "15p"])).is_err());
        assert!(parse_args(args(&["Hujayra", "many"])).is_err());
        assert!(parse_args(Vec::new()).is_err());
    }
}
