//! 诊断入口：对一个文本文件跑完整的分割+分类流程，输出 JSON

use anyhow::{Context, Result};
use exam_question_engine::utils::logging;
use exam_question_engine::{Config, PageFlow, RecognizedPage};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env();
    logging::log_startup(&config);

    let path = std::env::args()
        .nth(1)
        .context("用法: exam_question_engine <识别文本文件>")?;
    let text = std::fs::read_to_string(&path).with_context(|| format!("无法读取文件: {}", path))?;

    let flow = PageFlow::new(&config);
    let page = RecognizedPage::ok(text, 0.85);
    let analysis = flow.analyze_page(&page).await;

    println!("{}", serde_json::to_string_pretty(&analysis)?);

    Ok(())
}
