use thiserror::Error;

/// 任务参数校验错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// 主题过短
    #[error("主题过短: {len} 个字符 (最少 {min})")]
    TopicTooShort { len: usize, min: usize },
    /// 主题过长
    #[error("主题过长: {len} 个字符 (最多 {max})")]
    TopicTooLong { len: usize, max: usize },
    /// 单元数量超出范围
    #[error("单元数量 {count} 超出范围 [1, {max}]")]
    UnitCountOutOfRange { count: usize, max: usize },
}

/// 文本生成失败（协作方重试耗尽或返回结构无法解析）
#[derive(Debug, Error)]
pub enum GenerationFailure {
    /// 协作方调用失败
    #[error("第 {first}-{last} 单元生成请求失败: {source}")]
    RequestFailed {
        first: usize,
        last: usize,
        #[source]
        source: anyhow::Error,
    },
    /// 整批返回不可用
    #[error("第 {first}-{last} 单元返回结构无法解析: {reason}")]
    Unparsable {
        first: usize,
        last: usize,
        reason: String,
    },
    /// 长文大纲生成失败
    #[error("大纲生成失败: {0}")]
    Outline(#[source] anyhow::Error),
    /// 长文章节生成失败
    #[error("第 {index} 章节生成失败: {source}")]
    Section {
        index: usize,
        #[source]
        source: anyhow::Error,
    },
}

/// 单元配图不可用（非致命）
#[derive(Debug, Error)]
pub enum ImageUnavailable {
    /// 生成请求超时
    #[error("图片生成超时 ({0} 秒)")]
    Timeout(u64),
    /// 生成请求失败
    #[error("图片生成失败: {0}")]
    GenerationFailed(#[source] anyhow::Error),
    /// 下载失败
    #[error("图片下载失败: {0}")]
    DownloadFailed(#[source] anyhow::Error),
    /// 下载内容不是可识别的图片
    #[error("不支持的图片格式")]
    UnsupportedFormat,
    /// 写入临时目录失败
    #[error("图片保存失败: {0}")]
    Storage(#[source] anyhow::Error),
}

/// 文档渲染错误（致命）
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// 单元缺少对应布局所需的结构化内容
    #[error("第 {index} 单元缺少 {layout} 布局所需的结构")]
    MissingStructure { index: usize, layout: String },
    /// 单元序号不连续
    #[error("单元序号不连续: 期望 {expected}, 实际 {found}")]
    IndexGap { expected: usize, found: usize },
    /// 没有任何单元
    #[error("没有可渲染的单元")]
    Empty,
    /// 资源文件损坏
    #[error("资源文件损坏: {0}")]
    CorruptAsset(String),
    /// 读取资源失败
    #[error("读取资源失败 ({path}): {source}")]
    AssetRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 打包失败
    #[error("文档打包失败: {0}")]
    Package(#[from] zip::result::ZipError),
    /// 写入失败
    #[error("文档写入失败: {0}")]
    Io(#[from] std::io::Error),
}

/// 任务级错误
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("参数错误: {0}")]
    Validation(#[from] ValidationError),
    #[error("生成错误: {0}")]
    Generation(#[from] GenerationFailure),
    #[error("渲染错误: {0}")]
    Assembly(#[from] AssemblyError),
    /// 任务被取消
    #[error("任务已取消")]
    Cancelled,
    /// 任务执行体异常退出
    #[error("任务执行失败: {0}")]
    Join(String),
}

/// 任务结果类型
pub type PipelineResult<T> = Result<T, PipelineError>;
