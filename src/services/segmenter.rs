//! 题目分割 - 业务能力层
//!
//! 把一整页识别文本切成按序排列的题目记录。策略链按优先级逐个尝试，
//! 第一个产出非空结果的策略胜出；每条策略都是独立的纯函数，互相之间
//! 不共享状态，便于单独测试：
//!
//! 1. AI 辅助分割（未配置 LLM 时跳过）
//! 2. 全文数字题号搜索（严格模式 + 宽松模式）
//! 3. 逐行模式匹配（行首题号 / 行中题号 / 括号小题 / 关键词题号）
//! 4. 基于内容特征的兜底分割
//!
//! 分割永远不会失败：即使所有策略都一无所获，也会返回覆盖全文的
//! 单个题目，调用方始终拿到至少一条记录。

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::models::question::{QuestionSegment, QuestionSpan, SegmentStrategy};
use crate::services::bounds::BoundsEstimator;
use crate::services::llm_service::{ChatOptions, LlmService};
use crate::services::scorer::ConfidenceScorer;
use crate::utils::{extract_json_object, truncate_text};

/// 题目内容的最大显示长度（字符）
const MAX_CONTENT_CHARS: usize = 197;

/// 宽松题号匹配允许的题号范围
const MIN_QUESTION_NUMBER: u32 = 1;
const MAX_QUESTION_NUMBER: u32 = 100;

/// 某条策略识别出的题目起点
#[derive(Debug, Clone, Copy)]
struct QuestionStart {
    number: u32,
    line: usize,
    strategy: SegmentStrategy,
}

/// AI 分割响应的形态：`{"questions":[{"questionNumber":20,"startPosition":0}]}`
#[derive(Debug, Deserialize)]
struct AiSegmentation {
    #[serde(default)]
    questions: Vec<AiSegmentationItem>,
}

#[derive(Debug, Deserialize)]
struct AiSegmentationItem {
    #[serde(rename = "questionNumber")]
    question_number: u32,
    #[serde(rename = "startPosition", default)]
    start_position: usize,
}

/// 题目分割器
pub struct QuestionSegmenter {
    llm: Option<LlmService>,
    bounds: BoundsEstimator,
    scorer: ConfidenceScorer,
    // 全文搜索
    strict_label_re: Regex,
    loose_label_re: Regex,
    // 逐行匹配
    line_numbered_re: Regex,
    mid_line_label_re: Regex,
    parenthetical_re: Regex,
    keyword_re: Regex,
    // 内容兜底
    sub_item_re: Regex,
    option_re: Regex,
}

impl QuestionSegmenter {
    pub fn new(config: &Config) -> Self {
        let llm = if config.is_llm_configured() {
            Some(LlmService::new(config))
        } else {
            None
        };
        Self::build(llm, ConfidenceScorer::new())
    }

    /// 使用固定随机种子构造（置信度抖动可复现），测试用
    pub fn with_rng_seed(config: &Config, seed: u64) -> Self {
        let llm = if config.is_llm_configured() {
            Some(LlmService::new(config))
        } else {
            None
        };
        Self::build(llm, ConfidenceScorer::with_seed(seed))
    }

    fn build(llm: Option<LlmService>, scorer: ConfidenceScorer) -> Self {
        Self {
            llm,
            bounds: BoundsEstimator::new(),
            scorer,
            strict_label_re: Regex::new(r"(\d+)\. 第\d+小题").expect("内置正则编译失败"),
            loose_label_re: Regex::new(r"(\d{1,2})\.").expect("内置正则编译失败"),
            line_numbered_re: Regex::new(r"^(\d+)\.").expect("内置正则编译失败"),
            mid_line_label_re: Regex::new(r"\s(\d+)\.\s*第\d+小题").expect("内置正则编译失败"),
            parenthetical_re: Regex::new(r"^\((\d+)\)").expect("内置正则编译失败"),
            keyword_re: Regex::new(r"^(?:第(\d+)题|题目(\d+)|第(\d+)小题)").expect("内置正则编译失败"),
            sub_item_re: Regex::new(r"^\([1-3]\)").expect("内置正则编译失败"),
            option_re: Regex::new(r"^[ABCD]\.").expect("内置正则编译失败"),
        }
    }

    /// 分割识别文本为题目列表
    ///
    /// 永远返回非空列表；找不到任何结构时退化为覆盖全文的单个题目。
    pub async fn segment(&self, raw_text: &str) -> Vec<QuestionSegment> {
        let spans = self.segment_spans(raw_text).await;
        let total_lines = raw_text.split('\n').count();

        spans
            .iter()
            .map(|span| {
                let bounds = self.bounds.estimate(span, total_lines);
                let (confidence, is_difficult) = self.scorer.score(&span.content);
                QuestionSegment {
                    ordinal: span.ordinal,
                    content: span.content.clone(),
                    bounds,
                    confidence,
                    is_difficult,
                }
            })
            .collect()
    }

    /// 分割识别文本为题目跨度（不含边界与评分）
    pub async fn segment_spans(&self, raw_text: &str) -> Vec<QuestionSpan> {
        debug!("开始分割题目，完整文本长度：{}", raw_text.chars().count());

        let lines: Vec<&str> = raw_text.split('\n').collect();

        // 优先使用 AI 分割，失败则沿策略链降级
        let mut starts = self.segment_with_ai(raw_text).await;

        if starts.is_empty() {
            starts = self.find_labels_in_text(raw_text);
        }
        if starts.is_empty() {
            starts = self.match_line_patterns(&lines);
        }
        if starts.is_empty() {
            starts = self.content_based_segmentation(&lines);
        }

        // 按起始行排序并去重，保证跨度单调递增
        starts.sort_by_key(|s| s.line);
        starts.dedup_by_key(|s| s.line);

        if starts.is_empty() {
            // 兜底：整页当作一道题
            debug!("所有策略均未找到题目结构，整页作为单个题目");
            starts.push(QuestionStart {
                number: 1,
                line: 0,
                strategy: SegmentStrategy::ContentHeuristic,
            });
        }

        info!("题目分割完成，共 {} 道题目", starts.len());
        self.build_spans(&lines, &starts)
    }

    // ========== 策略 1: AI 辅助分割 ==========

    /// 用 LLM 分割题目，任何失败都静默降级到下一条策略
    async fn segment_with_ai(&self, raw_text: &str) -> Vec<QuestionStart> {
        let Some(llm) = &self.llm else {
            debug!("LLM 未配置，跳过 AI 分割");
            return Vec::new();
        };
        if raw_text.trim().is_empty() {
            return Vec::new();
        }

        info!("开始使用 AI 服务分割题目");

        let prompt = build_segmentation_prompt(raw_text);
        let opts = ChatOptions {
            temperature: 0.1,
            max_tokens: 2000,
            json_only: false,
        };

        let response = match llm.send_to_llm(&prompt, None, &opts).await {
            Ok(r) => r,
            Err(e) => {
                warn!("AI 题目分割失败，使用传统方法: {}", e);
                return Vec::new();
            }
        };

        let starts = self.parse_ai_segmentation(&response, raw_text);
        info!("AI 分割完成，识别到 {} 道题目", starts.len());
        starts
    }

    /// 解析 AI 分割响应，把字符偏移换算为行号
    fn parse_ai_segmentation(&self, response: &str, raw_text: &str) -> Vec<QuestionStart> {
        let Some(json_part) = extract_json_object(response) else {
            warn!("AI 响应中没有 JSON 内容");
            return Vec::new();
        };

        let payload: AiSegmentation = match serde_json::from_str(json_part) {
            Ok(p) => p,
            Err(e) => {
                warn!("解析 AI 分割响应失败: {}", e);
                return Vec::new();
            }
        };

        payload
            .questions
            .iter()
            .map(|item| {
                let line = char_offset_to_line(raw_text, item.start_position);
                debug!(
                    "AI 识别到题目{}，位置{}，估算行号{}",
                    item.question_number, item.start_position, line
                );
                QuestionStart {
                    number: item.question_number,
                    line,
                    strategy: SegmentStrategy::Ai,
                }
            })
            .collect()
    }

    // ========== 策略 2: 全文题号搜索 ==========

    /// 直接在全文中查找题目标号
    ///
    /// 先用严格模式（题号后紧跟小题标记），一无所获时退回宽松模式
    /// （任意 1-2 位数字加点号，要求后面还有内容，避免匹配小数点）。
    fn find_labels_in_text(&self, raw_text: &str) -> Vec<QuestionStart> {
        let mut starts = Vec::new();

        for caps in self.strict_label_re.captures_iter(raw_text) {
            let Ok(number) = caps[1].parse::<u32>() else {
                continue;
            };
            let offset = caps.get(0).map(|m| m.start()).unwrap_or(0);
            let line = byte_offset_to_line(raw_text, offset);
            debug!("在文本位置{}找到题目{}，估算行号{}", offset, number, line);
            starts.push(QuestionStart {
                number,
                line,
                strategy: SegmentStrategy::Numbered,
            });
        }

        if starts.is_empty() {
            for caps in self.loose_label_re.captures_iter(raw_text) {
                let Ok(number) = caps[1].parse::<u32>() else {
                    continue;
                };
                if !(MIN_QUESTION_NUMBER..=MAX_QUESTION_NUMBER).contains(&number) {
                    continue;
                }
                let offset = caps.get(0).map(|m| m.start()).unwrap_or(0);
                // 确保题号后面还有内容，不是孤立的数字
                if raw_text[offset..].chars().take(6).count() <= 5 {
                    continue;
                }
                let line = byte_offset_to_line(raw_text, offset);
                starts.push(QuestionStart {
                    number,
                    line,
                    strategy: SegmentStrategy::Numbered,
                });
            }
        }

        debug!("文本搜索找到{}道题目", starts.len());
        starts
    }

    // ========== 策略 3: 逐行模式匹配 ==========

    fn match_line_patterns(&self, lines: &[&str]) -> Vec<QuestionStart> {
        let mut starts = Vec::new();
        for (i, line) in lines.iter().enumerate() {
            if let Some(start) = self.detect_question_start(line.trim(), i) {
                debug!(
                    "检测到题目开始：第{}行，题号{}，策略{}",
                    i,
                    start.number,
                    start.strategy.as_str()
                );
                starts.push(start);
            }
        }
        starts
    }

    /// 检测单行是否是题目开始，按优先级尝试多种模式
    fn detect_question_start(&self, line: &str, line_index: usize) -> Option<QuestionStart> {
        // 模式1: 数字+点号开头（如 "20."、"21."）
        if let Some(caps) = self.line_numbered_re.captures(line) {
            if let Ok(number) = caps[1].parse::<u32>() {
                return Some(QuestionStart {
                    number,
                    line: line_index,
                    strategy: SegmentStrategy::Numbered,
                });
            }
        }

        // 模式2: 行中间的题目标号（如 "某些文字 20. 第1小题"）
        if let Some(caps) = self.mid_line_label_re.captures(line) {
            if let Ok(number) = caps[1].parse::<u32>() {
                return Some(QuestionStart {
                    number,
                    line: line_index,
                    strategy: SegmentStrategy::Numbered,
                });
            }
        }

        // 模式3: 括号数字（如 "(1)"、"(2)"）
        if let Some(caps) = self.parenthetical_re.captures(line) {
            if let Ok(number) = caps[1].parse::<u32>() {
                return Some(QuestionStart {
                    number,
                    line: line_index,
                    strategy: SegmentStrategy::Parenthetical,
                });
            }
        }

        // 模式4: 关键词题号（如 "第1题"、"题目1"、"第1小题"）
        if let Some(caps) = self.keyword_re.captures(line) {
            let number = caps
                .get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))
                .and_then(|m| m.as_str().parse::<u32>().ok());
            if let Some(number) = number {
                return Some(QuestionStart {
                    number,
                    line: line_index,
                    strategy: SegmentStrategy::Keyword,
                });
            }
        }

        None
    }

    // ========== 策略 4: 基于内容的兜底分割 ==========

    /// 没有任何题号时，把内容较长的行当作题目开始，顺序编号
    fn content_based_segmentation(&self, lines: &[&str]) -> Vec<QuestionStart> {
        let mut starts = Vec::new();
        let mut counter = 1;

        for (i, line) in lines.iter().enumerate() {
            let trimmed = line.trim();
            if trimmed.chars().count() < 10 {
                continue;
            }
            if self.is_potential_question_start(trimmed, i, lines) {
                starts.push(QuestionStart {
                    number: counter,
                    line: i,
                    strategy: SegmentStrategy::ContentHeuristic,
                });
                counter += 1;
            }
        }

        starts
    }

    /// 判断是否是潜在的题目开始
    fn is_potential_question_start(&self, line: &str, line_index: usize, lines: &[&str]) -> bool {
        // 题目通常比较长
        if line.chars().count() < 20 {
            return false;
        }

        // 前一行也是长内容时，更可能是同一题目的延续
        if line_index > 0 {
            let prev = lines[line_index - 1].trim();
            if !prev.is_empty() && prev.chars().count() > 30 {
                return false;
            }
        }

        // 题目后面通常紧跟小题或选项
        let lookahead_end = (line_index + 5).min(lines.len());
        let has_following_marker = lines[line_index + 1..lookahead_end]
            .iter()
            .any(|next| {
                let next = next.trim();
                self.sub_item_re.is_match(next) || self.option_re.is_match(next)
            });

        has_following_marker || line.contains('分') || line.contains('题')
    }

    // ========== 跨度构建 ==========

    /// 由题目起点切出各题的行范围并拼接内容
    fn build_spans(&self, lines: &[&str], starts: &[QuestionStart]) -> Vec<QuestionSpan> {
        let last_line = lines.len().saturating_sub(1);

        starts
            .iter()
            .enumerate()
            .map(|(i, start)| {
                let end_line = if i + 1 < starts.len() {
                    starts[i + 1].line.saturating_sub(1).max(start.line)
                } else {
                    last_line.max(start.line)
                };
                let (content, source_chars) = extract_content(lines, start.line, end_line);
                QuestionSpan {
                    ordinal: start.number,
                    start_line: start.line,
                    end_line,
                    content,
                    source_chars,
                    strategy: start.strategy,
                }
            })
            .collect()
    }
}

/// 拼接行范围内的题目内容
///
/// 非空行去掉首尾空白后以空格连接，超过最大显示长度时截断并加省略号。
/// 返回（截断后内容, 截断前字符数）。
fn extract_content(lines: &[&str], start_line: usize, end_line: usize) -> (String, usize) {
    let mut content = String::new();
    for line in lines
        .iter()
        .take(end_line + 1)
        .skip(start_line)
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
    {
        if !content.is_empty() {
            content.push(' ');
        }
        content.push_str(line);
    }

    let source_chars = content.chars().count();
    (truncate_text(&content, MAX_CONTENT_CHARS), source_chars)
}

/// 把字符偏移换算为行号（统计之前出现的换行数）
fn char_offset_to_line(text: &str, char_offset: usize) -> usize {
    text.chars()
        .take(char_offset)
        .filter(|c| *c == '\n')
        .count()
}

/// 把字节偏移换算为行号
fn byte_offset_to_line(text: &str, byte_offset: usize) -> usize {
    text[..byte_offset].matches('\n').count()
}

/// 构建题目分割提示词
fn build_segmentation_prompt(ocr_text: &str) -> String {
    format!(
        r#"请分析以下OCR识别的文本，识别并分割出其中的题目。

要求：
1. 识别文本中所有的题目（通常以数字+点号开始，如"20."、"21."）
2. 每道题目可能包含多个小题（如"(1)"、"(2)"、"(3)"）
3. 返回JSON格式，包含每道题目的题号和在文本中的大致位置
4. 如果无法准确确定位置，请根据题目在文本中的顺序估算

返回格式：
{{
  "questions": [
    {{
      "questionNumber": 20,
      "startPosition": 0,
      "content": "题目内容摘要"
    }},
    {{
      "questionNumber": 21,
      "startPosition": 300,
      "content": "题目内容摘要"
    }}
  ]
}}

OCR文本：
{}"#,
        ocr_text
    )
}
