//! Fixed prompt texts sent to the model and the Vietnamese strings shown in the chat.

pub const TRANSLATION_SYSTEM_INSTRUCTION: &str = r#"You are a highly specialized AI assistant for translating English IT terminology into Vietnamese.
Your primary function is to provide the most precise, contextually accurate, and professional Vietnamese translation.

Follow these rules strictly:
1.  **Direct Translation:** Provide only the Vietnamese translation of the term. Do not add any extra text, explanations, examples, or greetings like "Bản dịch là:".
2.  **Clarity and Precision:** Choose the Vietnamese word or phrase that is most commonly used and understood in the Vietnamese IT community.
3.  **Ambiguity Handling:** If a term has multiple meanings in different IT contexts (e.g., 'key' can mean a cryptographic key or a dictionary key), provide the most common translations separated by a semicolon, with a brief context in parentheses. For example: "Khóa (mã hóa); Chìa khóa (trong cặp key-value)".
4.  **No Translation Case:** If the term is commonly used in its original English form in Vietnam (e.g., 'API', 'CPU'), return the original term.
5.  **Conciseness:** Be as concise as possible while maintaining accuracy."#;

/// Returned by the model when the image holds no IT text. A successful result.
pub const NO_TERM_IN_IMAGE: &str = "Không tìm thấy thuật ngữ IT nào trong ảnh.";

pub const OCR_TRANSLATE_PROMPT: &str = r#"Your task is to act as an OCR and a specialized IT translator.
First, identify and extract the most prominent English IT-related term or phrase from the provided image.
Then, translate that single term/phrase into precise, professional Vietnamese.
Follow the exact same translation rules as a text-only request. If no discernible IT text is found in the image, respond with: "Không tìm thấy thuật ngữ IT nào trong ảnh.""#;

pub const GREETING: &str = "Xin chào! Tôi là chatbot dịch thuật chuyên ngành IT. Hãy nhập một thuật ngữ tiếng Anh, tải ảnh hoặc dán ảnh chứa thuật ngữ để tôi dịch sang tiếng Việt.";

pub const IMAGE_REQUEST_TEXT: &str = "Dịch thuật ngữ từ ảnh này:";

pub const TEXT_FAILURE_REPLY: &str =
    "Rất tiếc, tôi không thể xử lý yêu cầu của bạn lúc này. Vui lòng thử lại sau.";
pub const IMAGE_FAILURE_REPLY: &str =
    "Rất tiếc, tôi không thể xử lý ảnh của bạn lúc này. Vui lòng thử lại sau.";

pub const INVALID_FILE_BANNER: &str = "Tệp không hợp lệ. Vui lòng chỉ chọn tệp hình ảnh.";
pub const READ_FAILURE_BANNER: &str = "Không thể đọc tệp ảnh. Vui lòng thử lại.";

pub fn text_failure_banner(message: &str) -> String {
    format!("Rất tiếc, đã có lỗi xảy ra: {}", message)
}

pub fn image_failure_banner(message: &str) -> String {
    format!("Rất tiếc, đã có lỗi xảy ra khi xử lý ảnh: {}", message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_instruction_has_five_rules() {
        for rule in ["1.", "2.", "3.", "4.", "5."] {
            assert!(TRANSLATION_SYSTEM_INSTRUCTION.contains(rule));
        }
    }

    #[test]
    fn ocr_prompt_embeds_sentinel() {
        assert!(OCR_TRANSLATE_PROMPT.contains(NO_TERM_IN_IMAGE));
    }

    #[test]
    fn banners_embed_error_message() {
        assert!(text_failure_banner("boom").ends_with("boom"));
        assert!(image_failure_banner("boom").contains("khi xử lý ảnh"));
    }
}
