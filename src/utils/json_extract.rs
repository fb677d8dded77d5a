//! 从自由文本中提取 JSON 对象
//!
//! LLM 经常把 JSON 包裹在说明文字或代码块标记里，分割和分类两条链路
//! 都依赖这里的防御性提取：取第一个 `{` 到最后一个 `}` 之间的子串。

/// 提取文本中的 JSON 对象部分
///
/// 返回第一个 `{` 到最后一个 `}`（含）之间的切片；找不到成对花括号时返回 `None`。
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bare_json() {
        assert_eq!(extract_json_object(r#"{"a":1}"#), Some(r#"{"a":1}"#));
    }

    #[test]
    fn test_extract_json_wrapped_in_prose() {
        let response = "好的，以下是结果：\n{\"questions\":[]}\n希望对你有帮助。";
        assert_eq!(extract_json_object(response), Some("{\"questions\":[]}"));
    }

    #[test]
    fn test_extract_json_in_code_fence() {
        let response = "```json\n{\"category\": \"数学\"}\n```";
        assert_eq!(extract_json_object(response), Some("{\"category\": \"数学\"}"));
    }

    #[test]
    fn test_extract_nested_object() {
        let response = r#"前缀 {"bounds":{"top":0.1}} 后缀"#;
        assert_eq!(extract_json_object(response), Some(r#"{"bounds":{"top":0.1}}"#));
    }

    #[test]
    fn test_no_json_returns_none() {
        assert_eq!(extract_json_object("没有任何JSON"), None);
        assert_eq!(extract_json_object(""), None);
    }

    #[test]
    fn test_reversed_braces_returns_none() {
        assert_eq!(extract_json_object("} 反向 {"), None);
    }
}
