//! Prompt construction for sentence generation
//!
//! Builds the chat prompt that turns a list of recognised sign words into a
//! single polite Korean sentence, and cleans up the model's answer.

/// System prompt sent with every request
pub const SYSTEM_PROMPT: &str =
    "당신은 한국어 수어를 자연스러운 문장으로 변환하는 전문가입니다.";

const RULES: &str = "\
규칙:
1. 자연스러운 한국어 문장으로 변환
2. 문법적으로 올바르게 작성
3. 조사와 어미를 적절히 추가
4. 한 문장으로 완성
5. 마침표 포함
6. 가능한 주어진 단어로만 자연스럽게 만들 것
7. 자연스러움을 위해 억지로 길게 만들지 말 것
8. 가능한 존댓말로 변환

예시:
수어 단어: 구급차 → 구급차입니다.
수어 단어: 나 → 저입니다.
수어 단어: 나, 아프다 → 저는 아픕니다.
수어 단어: 나, 학교, 가다 → 저는 학교에 갑니다.
수어 단어: 엄마, 밥, 먹다 → 엄마가 밥을 드신다.

변환된 문장:";

/// Build the user prompt for a list of sign words
pub fn build_prompt(words: &[String], context: Option<&str>) -> String {
    let mut prompt = format!(
        "다음 한국어 수어 단어들을 자연스럽고 문법적으로 올바른 한국어 문장으로 변환해주세요.\n\n수어 단어: {}",
        words.join(" + ")
    );

    if let Some(context) = context.filter(|c| !c.is_empty()) {
        prompt.push_str("\n추가 맥락: ");
        prompt.push_str(context);
    }

    prompt.push_str("\n\n");
    prompt.push_str(RULES);
    prompt
}

/// Clean up a generated sentence
///
/// Strips surrounding quotes, collapses whitespace and makes sure the
/// sentence ends with terminal punctuation.
pub fn post_process(sentence: &str) -> String {
    let trimmed = sentence.trim().trim_matches(|c| c == '"' || c == '\'');
    let mut result = trimmed.split_whitespace().collect::<Vec<_>>().join(" ");

    if result.is_empty() {
        return result;
    }

    if !result.ends_with(['.', '!', '?']) {
        result.push('.');
    }
    result
}
