//! 关键词分类 - 业务能力层
//!
//! LLM 不可用时的确定性兜底：对固定的几个学科逐个累计整数得分，
//! 得分最高者胜出。纯本地计算，不会失败。
//!
//! 数学标签的优先级链（圆锥曲线 → 三角函数 → 数列 → 导数 → 概率 →
//! 立体几何 → 平面几何 → 方程/不等式 → 函数 → 通用）是手工调校的
//! 行为契约：命中更具体的知识点后不再追加低优先级标签。不要重排。

use regex::Regex;
use tracing::info;

use crate::models::classification::{ClassificationResult, Difficulty};
use crate::models::subject::Subject;

/// 数学关键词
const MATH_KEYWORDS: [&str; 16] = [
    "方程", "函数", "计算", "求解", "不等式", "几何", "代数", "微积分",
    "导数", "积分", "极限", "概率", "统计", "三角", "向量", "矩阵",
];

/// 语文关键词
const CHINESE_KEYWORDS: [&str; 22] = [
    "阅读理解", "作文", "古诗", "文言文", "语法", "词语", "句子", "段落",
    "修辞", "比喻", "拟人", "夸张", "排比", "对偶", "设问", "反问",
    "主旨", "中心思想", "表达效果", "写作手法", "情感", "意境",
];

/// 英语关键词（小写匹配）
const ENGLISH_KEYWORDS: [&str; 16] = [
    "what", "how", "where", "when", "why", "who", "which",
    "reading", "grammar", "vocabulary", "passage", "comprehension",
    "choose", "complete", "translate", "writing",
];

/// 物理关键词
const PHYSICS_KEYWORDS: [&str; 24] = [
    "力", "速度", "加速度", "电", "磁", "光", "声", "热", "能量", "功率",
    "电流", "电压", "电阻", "电场", "磁场", "波", "频率", "振动",
    "牛顿", "欧姆", "焦耳", "瓦特", "实验", "测量",
];

/// 化学关键词
const CHEMISTRY_KEYWORDS: [&str; 16] = [
    "反应", "元素", "化合物", "分子", "原子", "离子", "酸", "碱", "盐",
    "氧化", "还原", "催化", "平衡", "浓度", "溶液", "实验",
];

/// 疑难关键词（难度 +2）
const HARD_KEYWORDS: [&str; 9] = [
    "微积分", "导数", "积分", "复杂", "综合", "证明", "推导", "高级", "深入",
];

/// 基础关键词（难度 -1）
const EASY_KEYWORDS: [&str; 5] = ["基础", "简单", "入门", "基本", "初级"];

/// 关键词分类器
pub struct KeywordClassifier {
    math_variable_re: Regex,
    math_coefficient_re: Regex,
    math_comparison_re: Regex,
    math_superscript_re: Regex,
    math_conic_xy_re: Regex,
    math_conic_yx_re: Regex,
    chinese_quote_re: Regex,
    chinese_punct_re: Regex,
    english_choice_re: Regex,
    english_word_re: Regex,
    english_abcd_re: Regex,
    physics_unit_re: Regex,
    chemistry_formula_re: Regex,
}

impl KeywordClassifier {
    pub fn new() -> Self {
        Self {
            math_variable_re: Regex::new(r"[x-z]\s*[=<>+*/-]").expect("内置正则编译失败"),
            math_coefficient_re: Regex::new(r"\d+\s*[x-z]").expect("内置正则编译失败"),
            math_comparison_re: Regex::new(r"[=<>]").expect("内置正则编译失败"),
            math_superscript_re: Regex::new(r"[²³⁴⁵⁶⁷⁸⁹]").expect("内置正则编译失败"),
            math_conic_xy_re: Regex::new(r"x\^?2.*y\^?2").expect("内置正则编译失败"),
            math_conic_yx_re: Regex::new(r"y\^?2.*x").expect("内置正则编译失败"),
            chinese_quote_re: Regex::new(r#"[“”‘’《》]"#).expect("内置正则编译失败"),
            chinese_punct_re: Regex::new(r"[，。；！？]").expect("内置正则编译失败"),
            english_choice_re: Regex::new(r"[A-Z]\).*[A-Z]\)").expect("内置正则编译失败"),
            english_word_re: Regex::new(r"\b[A-Za-z]{3,}\b").expect("内置正则编译失败"),
            english_abcd_re: Regex::new(r"a\).*b\).*c\).*d\)").expect("内置正则编译失败"),
            physics_unit_re: Regex::new(r"[mskgAV]\b").expect("内置正则编译失败"),
            chemistry_formula_re: Regex::new(r"[A-Z][a-z]?\d*").expect("内置正则编译失败"),
        }
    }

    /// 基于关键词的分类
    ///
    /// 最高分学科胜出；全部得零分时默认语文（特异性最低的学科）。
    pub fn classify(&self, text: &str) -> ClassificationResult {
        let lower_text = text.to_lowercase();

        let scores = [
            (Subject::Math, self.math_score(text)),
            (Subject::Chinese, self.chinese_score(text)),
            (Subject::English, self.english_score(text, &lower_text)),
            (Subject::Physics, self.physics_score(text)),
            (Subject::Chemistry, self.chemistry_score(text)),
        ];

        let (mut best_subject, top_score) = scores
            .iter()
            .copied()
            .max_by_key(|(_, score)| *score)
            .unwrap_or((Subject::Chinese, 0));
        if top_score == 0 {
            best_subject = Subject::Chinese; // 默认分类
        }

        let difficulty = Self::derive_difficulty(text);
        let tags = self.extract_tags(text, &lower_text, best_subject);
        let total_score: i32 = scores.iter().map(|(_, score)| score).sum();
        let confidence = Self::derive_confidence(top_score, total_score);

        info!(
            "关键词分类完成，分类：{}，难度：{}，置信度：{:.2}",
            best_subject,
            difficulty.as_str(),
            confidence
        );

        ClassificationResult::ok(best_subject, tags, difficulty, confidence)
    }

    // ========== 各学科得分 ==========

    fn math_score(&self, text: &str) -> i32 {
        let mut score = 0;
        for keyword in MATH_KEYWORDS {
            if text.contains(keyword) {
                score += 2;
            }
        }
        // 数学符号和模式
        if self.math_variable_re.is_match(text) {
            score += 3; // 变量和运算符
        }
        if self.math_coefficient_re.is_match(text) {
            score += 2; // 系数和变量
        }
        if text.contains("f(x)") || text.contains("f(") {
            score += 3; // 函数表示
        }
        if self.math_comparison_re.is_match(text) {
            score += 1;
        }
        if self.math_superscript_re.is_match(text) {
            score += 2; // 上标
        }
        if text.contains('√') {
            score += 2; // 根号
        }
        score
    }

    fn chinese_score(&self, text: &str) -> i32 {
        let mut score = 0;
        for keyword in CHINESE_KEYWORDS {
            if text.contains(keyword) {
                score += 2;
            }
        }
        if self.chinese_quote_re.is_match(text) {
            score += 2; // 中文引号或书名号
        }
        if self.chinese_punct_re.is_match(text) {
            score += 1;
        }
        if text.contains("请分析") || text.contains("谈谈你的理解") {
            score += 2;
        }
        if text.chars().count() > 100 {
            score += 1; // 语文题目通常较长
        }
        score
    }

    fn english_score(&self, text: &str, lower_text: &str) -> i32 {
        let mut score = 0;
        for keyword in ENGLISH_KEYWORDS {
            if lower_text.contains(keyword) {
                score += 2;
            }
        }
        if self.english_choice_re.is_match(text) {
            score += 3; // 选择题格式
        }
        if self.english_word_re.is_match(text) {
            score += 1;
        }
        if self.english_abcd_re.is_match(lower_text) {
            score += 3; // ABCD 选项
        }
        score
    }

    fn physics_score(&self, text: &str) -> i32 {
        let mut score = 0;
        for keyword in PHYSICS_KEYWORDS {
            if text.contains(keyword) {
                score += 2;
            }
        }
        if self.physics_unit_re.is_match(text) {
            score += 1; // 物理单位
        }
        if text.contains("m/s") || text.contains("km/h") {
            score += 2;
        }
        score
    }

    fn chemistry_score(&self, text: &str) -> i32 {
        let mut score = 0;
        for keyword in CHEMISTRY_KEYWORDS {
            if text.contains(keyword) {
                score += 2;
            }
        }
        if self.chemistry_formula_re.is_match(text) {
            score += 2; // 可能包含化学式
        }
        if text.contains("H₂O") || text.contains("CO₂") || text.contains("NaCl") {
            score += 3;
        }
        if text.contains('→') || text.contains('=') {
            score += 1; // 化学反应箭头
        }
        score
    }

    // ========== 难度与置信度 ==========

    fn derive_difficulty(text: &str) -> Difficulty {
        let mut score = 0;
        let mut easy_hits = 0;
        for keyword in HARD_KEYWORDS {
            if text.contains(keyword) {
                score += 2;
            }
        }
        for keyword in EASY_KEYWORDS {
            if text.contains(keyword) {
                score -= 1;
                easy_hits += 1;
            }
        }
        let char_count = text.chars().count();
        if char_count > 200 {
            score += 1;
        }
        if char_count < 50 {
            score -= 1;
        }

        // 单凭"文本短"不足以判为简单，必须出现明确的基础类词汇
        if score >= 3 {
            Difficulty::Hard
        } else if score <= -1 && easy_hits > 0 {
            Difficulty::Easy
        } else {
            Difficulty::Medium
        }
    }

    fn derive_confidence(top_score: i32, total_score: i32) -> f64 {
        if top_score == 0 || total_score == 0 {
            return 0.5; // 没有明确特征，置信度较低
        }
        let ratio = top_score as f64 / total_score as f64;
        (0.7 + ratio * 0.25).min(0.95)
    }

    // ========== 标签提取 ==========

    fn extract_tags(&self, text: &str, lower_text: &str, subject: Subject) -> Vec<String> {
        let mut tags = Vec::new();

        match subject {
            Subject::Math => self.extract_math_tags(text, &mut tags),
            Subject::English => {
                if lower_text.contains("reading") {
                    tags.push("阅读理解".to_string());
                }
                if lower_text.contains("grammar") {
                    tags.push("语法".to_string());
                }
                if lower_text.contains("vocabulary") {
                    tags.push("词汇".to_string());
                }
                if lower_text.contains("writing") {
                    tags.push("写作".to_string());
                }
            }
            Subject::Physics => {
                if text.contains('力') {
                    tags.push("力学".to_string());
                }
                if text.contains('电') {
                    tags.push("电学".to_string());
                }
                if text.contains('光') {
                    tags.push("光学".to_string());
                }
                if text.contains('热') {
                    tags.push("热学".to_string());
                }
            }
            Subject::Chemistry => {
                if text.contains("反应") {
                    tags.push("化学反应".to_string());
                }
                if text.contains("元素") {
                    tags.push("元素周期表".to_string());
                }
                if text.contains('酸') || text.contains('碱') {
                    tags.push("酸碱反应".to_string());
                }
            }
            Subject::Chinese => {
                if text.contains("古诗") {
                    tags.push("古诗词".to_string());
                }
                if text.contains("文言文") {
                    tags.push("文言文".to_string());
                }
                if text.contains("阅读理解") {
                    tags.push("现代文阅读".to_string());
                }
            }
            _ => {}
        }

        tags
    }

    /// 数学标签：按优先级检查，具体知识点优先于通用概念
    fn extract_math_tags(&self, text: &str, tags: &mut Vec<String>) {
        // 圆锥曲线相关 - 最高优先级
        if text.contains("抛物线")
            || text.contains("椭圆")
            || text.contains("双曲线")
            || text.contains("焦点")
            || text.contains("顶点坐标")
            || text.contains("圆锥")
            || text.contains("准线")
            || text.contains("离心率")
            || text.contains("长轴")
            || text.contains("短轴")
            || text.contains("渐近线")
            || self.math_conic_xy_re.is_match(text)
            || self.math_conic_yx_re.is_match(text)
            || text.contains("圆心")
            || text.contains("半径")
            || text.contains("弦长")
        {
            tags.push("圆锥曲线".to_string());
            return;
        }

        // 三角函数相关
        if text.contains("sin")
            || text.contains("cos")
            || text.contains("tan")
            || text.contains("正弦")
            || text.contains("余弦")
            || text.contains("正切")
        {
            tags.push("三角函数".to_string());
            return;
        }

        // 数列相关
        if text.contains("数列")
            || text.contains("等差")
            || text.contains("等比")
            || text.contains("a_")
            || text.contains("an")
        {
            tags.push("数列".to_string());
            return;
        }

        // 导数相关
        if text.contains("导数")
            || text.contains("导函数")
            || text.contains("切线")
            || text.contains("极值")
            || text.contains("最值")
        {
            tags.push("导数".to_string());
            return;
        }

        // 概率相关
        if text.contains("概率")
            || text.contains("随机")
            || text.contains("分布")
            || text.contains("期望")
            || text.contains("方差")
        {
            tags.push("概率".to_string());
            return;
        }

        // 立体几何相关
        if text.contains("立体")
            || text.contains("几何体")
            || text.contains("体积")
            || text.contains("表面积")
            || text.contains("空间")
        {
            tags.push("立体几何".to_string());
            return;
        }

        // 平面几何相关
        if text.contains("三角形")
            || text.contains("四边形")
            || text.contains("圆形")
            || text.contains("角度")
            || text.contains("面积")
        {
            tags.push("平面几何".to_string());
            return;
        }

        // 方程和不等式
        if text.contains("方程") {
            tags.push("方程".to_string());
            return;
        }
        if text.contains("不等式") {
            tags.push("不等式".to_string());
            return;
        }

        // 函数相关 - 优先级较低，只有在没有更具体分类时才使用
        if text.contains("函数") || text.contains("f(x)") || text.contains("y=") {
            tags.push("函数".to_string());
            return;
        }

        // 没有命中任何具体知识点时，按题型给一个通用标签
        if text.contains("计算") || text.contains("求解") {
            tags.push("计算题".to_string());
        } else if text.contains("证明") {
            tags.push("证明题".to_string());
        } else {
            tags.push("综合题".to_string());
        }
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_math_equation_classified() {
        let classifier = KeywordClassifier::new();
        let result = classifier.classify("解方程 2x+3=7");

        assert!(result.success);
        assert_eq!(result.category, Subject::Math);
        assert_eq!(result.difficulty, Difficulty::Medium);
        assert!(result.tags.contains(&"方程".to_string()));
        assert!(result.confidence >= 0.5 && result.confidence <= 0.95);
    }

    #[test]
    fn test_english_multiple_choice() {
        let classifier = KeywordClassifier::new();
        let result = classifier.classify(
            "What is the main idea of the passage? A) Love B) War C) Peace D) Hope",
        );

        assert!(result.success);
        assert_eq!(result.category, Subject::English);
        assert!(result.confidence > 0.5);
    }

    #[test]
    fn test_conic_section_takes_priority_over_function() {
        let classifier = KeywordClassifier::new();
        // 同时包含"抛物线"和"函数"时，必须标记更具体的圆锥曲线
        let result = classifier.classify("已知抛物线的函数解析式，求其焦点坐标");

        assert_eq!(result.category, Subject::Math);
        assert_eq!(result.tags, vec!["圆锥曲线".to_string()]);
    }

    #[test]
    fn test_trig_priority_over_sequence() {
        let classifier = KeywordClassifier::new();
        let result = classifier.classify("求 sin 函数在数列中的应用");
        // 三角函数优先于数列
        assert_eq!(result.tags, vec!["三角函数".to_string()]);
    }

    #[test]
    fn test_math_generic_tag_fallback() {
        let classifier = KeywordClassifier::new();
        let result = classifier.classify("计算 3x 的取值");
        assert_eq!(result.category, Subject::Math);
        assert_eq!(result.tags, vec!["计算题".to_string()]);
    }

    #[test]
    fn test_zero_score_defaults_to_chinese() {
        let classifier = KeywordClassifier::new();
        // 不含任何学科特征、标点或英文单词的短文本
        let result = classifier.classify("啊");

        assert!(result.success);
        assert_eq!(result.category, Subject::Chinese);
        assert!((result.confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_physics_units() {
        let classifier = KeywordClassifier::new();
        let result = classifier.classify("小车以 5m/s 的速度匀速行驶，求 10s 内通过的路程");
        assert_eq!(result.category, Subject::Physics);
        // 不含"力/电/光/热"字样时物理没有可提取的标签
        assert!(result.tags.is_empty());
    }

    #[test]
    fn test_chemistry_compounds() {
        let classifier = KeywordClassifier::new();
        let result = classifier.classify("写出 NaCl 溶液与硝酸银反应的化学方程式，并说明沉淀现象");
        assert_eq!(result.category, Subject::Chemistry);
        assert!(result.tags.contains(&"化学反应".to_string()));
    }

    #[test]
    fn test_chinese_literature() {
        let classifier = KeywordClassifier::new();
        let result = classifier.classify("阅读理解：请分析《红楼梦》选段中作者的写作手法，谈谈你的理解。");
        assert_eq!(result.category, Subject::Chinese);
        assert!(result.tags.contains(&"现代文阅读".to_string()));
    }

    #[test]
    fn test_hard_difficulty() {
        let classifier = KeywordClassifier::new();
        let result = classifier.classify("证明：函数 f(x) 的导数在区间上恒为正，并推导其单调性");
        assert_eq!(result.difficulty, Difficulty::Hard);
    }

    #[test]
    fn test_easy_difficulty() {
        let classifier = KeywordClassifier::new();
        // 基础(-1) + 简单(-1) + 长度<50(-1) = -3
        let result = classifier.classify("基础的简单计算");
        assert_eq!(result.difficulty, Difficulty::Easy);
    }

    #[test]
    fn test_confidence_formula() {
        assert!((KeywordClassifier::derive_confidence(0, 10) - 0.5).abs() < 1e-9);
        assert!((KeywordClassifier::derive_confidence(5, 0) - 0.5).abs() < 1e-9);
        assert!((KeywordClassifier::derive_confidence(5, 10) - 0.825).abs() < 1e-9);
        // 占比 100% 时仍封顶 0.95
        assert!((KeywordClassifier::derive_confidence(10, 10) - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_in_documented_range() {
        let classifier = KeywordClassifier::new();
        for text in ["解方程 2x+3=7", "What is this?", "阅读理解题", "啊"] {
            let result = classifier.classify(text);
            assert!(
                result.confidence >= 0.5 && result.confidence <= 0.95,
                "文本 {:?} 的置信度 {} 超出范围",
                text,
                result.confidence
            );
        }
    }
}
