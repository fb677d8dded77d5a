/// 学科分类枚举
///
/// 分类结果只落在这个封闭集合内，无法识别的输入归入 `General`（综合）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Subject {
    /// 数学
    Math,
    /// 语文
    Chinese,
    /// 英语
    English,
    /// 物理
    Physics,
    /// 化学
    Chemistry,
    /// 生物
    Biology,
    /// 地理
    Geography,
    /// 政治
    Politics,
    /// 历史
    History,
    /// 计算机/编程
    ComputerScience,
    /// 综合
    General,
}

/// 类别归一化表：按序匹配子串，命中即返回
///
/// 同时覆盖中文名和英文拼写。顺序是行为契约的一部分："生物"必须先于
/// 单字"物"，否则会被吞进物理，不要重新排序。
const NORMALIZE_TABLE: &[(&str, Subject)] = &[
    ("数", Subject::Math),
    ("math", Subject::Math),
    ("语文", Subject::Chinese),
    ("chinese", Subject::Chinese),
    ("英", Subject::English),
    ("english", Subject::English),
    ("生物", Subject::Biology),
    ("物", Subject::Physics),
    ("physics", Subject::Physics),
    ("化", Subject::Chemistry),
    ("chem", Subject::Chemistry),
    ("生", Subject::Biology),
    ("bio", Subject::Biology),
    ("地", Subject::Geography),
    ("geo", Subject::Geography),
    ("政", Subject::Politics),
    ("polit", Subject::Politics),
    ("历", Subject::History),
    ("histor", Subject::History),
    ("计算", Subject::ComputerScience),
    ("编程", Subject::ComputerScience),
    ("computer", Subject::ComputerScience),
    ("program", Subject::ComputerScience),
];

impl Subject {
    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            Subject::Math => "数学",
            Subject::Chinese => "语文",
            Subject::English => "英语",
            Subject::Physics => "物理",
            Subject::Chemistry => "化学",
            Subject::Biology => "生物",
            Subject::Geography => "地理",
            Subject::Politics => "政治",
            Subject::History => "历史",
            Subject::ComputerScience => "计算机/编程",
            Subject::General => "综合",
        }
    }

    /// 将模型返回的类别字符串归一化到封闭学科集合
    ///
    /// 大小写不敏感，空白或无法识别的输入返回 `General`。
    pub fn normalize(raw: &str) -> Self {
        let target = raw.trim().to_lowercase();
        if target.is_empty() {
            return Subject::General;
        }
        for (pattern, subject) in NORMALIZE_TABLE {
            if target.contains(pattern) {
                return *subject;
            }
        }
        Subject::General
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
