//! The fixed persona and prompt template sent to every provider.
//!
//! Output is meant for Xiaohongshu (RedNote) readers, so the instructions
//! and the fallback text are in Chinese.

/// System instruction: copywriting persona plus formatting requirements.
pub const SYSTEM_INSTRUCTION: &str = "你是小红书文案专家，擅长将内容转换成受欢迎的小红书风格。使用亲切语气，添加表情符号和话题标签。使用中文回复。";

/// Returned as the converted text when the provider answers without content.
pub const FALLBACK_TEXT: &str = "转换失败，未获得有效回复。";

/// Interpolate the user's text and style into the conversion prompt.
pub fn build_user_prompt(text: &str, style: &str) -> String {
    format!(
        "请将以下内容转换成小红书风格（{style}），要求：\n\
         1. 使用亲切自然的语气\n\
         2. 添加合适的表情符号\n\
         3. 在结尾添加相关话题标签\n\
         4. 保持原意但优化表达\n\n\
         原文：\n{text}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_style_and_text() {
        let prompt = build_user_prompt("今天去了海边", "trendy");
        assert!(prompt.contains("小红书风格（trendy）"));
        assert!(prompt.ends_with("原文：\n今天去了海边"));
    }

    #[test]
    fn test_prompt_keeps_numbered_requirements_on_own_lines() {
        let prompt = build_user_prompt("x", "cute");
        let lines: Vec<&str> = prompt.lines().collect();
        assert_eq!(lines[1], "1. 使用亲切自然的语气");
        assert_eq!(lines[4], "4. 保持原意但优化表达");
        assert_eq!(lines[5], "");
    }
}
