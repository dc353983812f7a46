//! Report assembly from raw model output.
//!
//! Price figures and trend lines are pulled out with plain text heuristics
//! rather than by trusting the model's JSON promise — answers regularly
//! arrive as loose prose. The surrounding report shell is a template under
//! the prompts directory.

use std::path::Path;
use std::sync::LazyLock;

use chrono::{Datelike, Utc};
use regex::Regex;

use super::prompt::ParsedAddress;
use super::providers::ProviderKind;
use super::templates;

/// Compiled-in copy of `config/prompts/market_report.md`.
const REPORT_TEMPLATE_FALLBACK: &str = r#"**Dữ liệu search được từ AI{{provider_info}} về {{location}}:**

**Thông tin chính:**
{{content}}

**Thông tin giá trích xuất:**
{{price_info}}

**Xu hướng thị trường:**
{{trend_info}}

**Tóm tắt:** Thông tin về bất động sản tại {{location}} được cập nhật từ các nguồn tin tức và dữ liệu thị trường mới nhất năm {{year}}{{provider_info}}."#;

/// Price mentions like `8.5 tỷ`, `85 triệu`, `120 tr`.
static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(triệu|tỷ|tr)").expect("price pattern must compile")
});

const TREND_KEYWORDS: [&str; 5] = ["tăng", "giảm", "ổn định", "biến động", "xu hướng"];

const NO_PRICE_LINE: &str = "- Chưa tìm thấy thông tin giá cụ thể trong kết quả.";
const NO_TREND_LINE: &str = "- Thông tin xu hướng sẽ được cập nhật dựa trên dữ liệu thị trường.";

/// First three price mentions, or a fixed "none found" line.
pub fn extract_price_info(content: &str) -> String {
    let prices: Vec<&str> = PRICE_RE
        .find_iter(content)
        .take(3)
        .map(|m| m.as_str())
        .collect();
    if prices.is_empty() {
        NO_PRICE_LINE.to_string()
    } else {
        format!("- Giá tham khảo: {}", prices.join(", "))
    }
}

/// First two lines mentioning a trend keyword, or a fixed placeholder.
pub fn extract_trend_info(content: &str) -> String {
    let lines: Vec<String> = content
        .lines()
        .filter(|line| {
            let lower = line.to_lowercase();
            TREND_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
        })
        .take(2)
        .map(|line| format!("- {}", line.trim()))
        .collect();
    if lines.is_empty() {
        NO_TREND_LINE.to_string()
    } else {
        lines.join("\n")
    }
}

/// Ward, district and city joined with commas; falls back to the free-text
/// location when no parts are present.
pub fn location_context(location: &str, parsed_address: Option<&ParsedAddress>) -> String {
    let Some(addr) = parsed_address else {
        return location.to_string();
    };
    let parts: Vec<&str> = [
        addr.ward.as_deref(),
        addr.district.as_deref(),
        addr.city.as_deref(),
    ]
    .into_iter()
    .flatten()
    .filter(|part| !part.is_empty())
    .collect();
    if parts.is_empty() {
        location.to_string()
    } else {
        parts.join(", ")
    }
}

/// Render the full market report around the model's answer.
pub fn render(
    content: &str,
    location: &str,
    parsed_address: Option<&ParsedAddress>,
    provider: ProviderKind,
    prompts_dir: &Path,
) -> String {
    let location_context = location_context(location, parsed_address);
    let provider_info = format!(" (via {})", provider.label());
    let year = Utc::now().year().to_string();
    let template = templates::load_or(prompts_dir, "market_report.md", REPORT_TEMPLATE_FALLBACK);
    templates::substitute(
        &template,
        &[
            ("provider_info", &provider_info),
            ("location", &location_context),
            ("content", content),
            ("price_info", &extract_price_info(content)),
            ("trend_info", &extract_trend_info(content)),
            ("year", &year),
        ],
    )
}
