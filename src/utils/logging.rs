/// 日志工具模块
///
/// 提供日志初始化和格式化输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化全局日志
///
/// 优先使用 `RUST_LOG`；未设置时按 `verbose` 选择 debug 或 info
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `max_concurrent`: 最大并发任务数
/// - `batch_size`: 每批单元数
pub fn log_startup(max_concurrent: usize, batch_size: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 文档生成模式");
    info!("📊 最大并发任务数: {}", max_concurrent);
    info!("📦 每批生成单元数: {}", batch_size);
    info!("{}", "=".repeat(60));
}

/// 记录任务开始信息
pub fn log_job_start(ctx: &impl std::fmt::Display, topic: &str, unit_count: usize) {
    info!("\n{}", "=".repeat(60));
    info!("{} 🎬 开始生成: {}", ctx, truncate_text(topic, 60));
    info!("{} 📄 单元数量: {}", ctx, unit_count);
    info!("{}", "=".repeat(60));
}

/// 记录批次开始信息
///
/// # 参数
/// - `batch_num`: 批次编号
/// - `total_batches`: 批次总数
/// - `first`: 起始单元序号
/// - `last`: 结束单元序号
pub fn log_batch_start(
    ctx: &impl std::fmt::Display,
    batch_num: usize,
    total_batches: usize,
    first: usize,
    last: usize,
) {
    info!(
        "{} 📦 开始生成第 {}/{} 批 (单元 {}-{})",
        ctx, batch_num, total_batches, first, last
    );
}

/// 记录任务完成信息
pub fn log_job_complete(ctx: &impl std::fmt::Display, slide_count: usize, path: &std::path::Path) {
    info!("\n{}", "─".repeat(60));
    info!("{} ✅ 生成完成: {} 页", ctx, slide_count);
    info!("{} 📁 输出文件: {}", ctx, path.display());
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
