//! Search query types and prompt construction.
//!
//! The query mirrors the JSON the web front-end posts (camelCase field
//! names). Prompt wording is Vietnamese throughout — it targets domestic
//! listing sites and the models are told to answer in strict JSON.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use super::templates;

/// Compiled-in copy of `config/prompts/market_search_system.txt`.
const SYSTEM_PROMPT_FALLBACK: &str = r#"Bạn là chuyên gia thẩm định giá bất động sản, output ngắn gọn, tập trung vào giá trị thực tế. Kết quả trả về phải là một object JSON với các trường: - "giá trung bình": Giá trung bình khu vực theo đường, đơn vị VND/m2. - "các tin rao bán": Danh sách các tin rao bán bất động sản tương tự (cùng đường, diện tích tương tự, vị trí nhà phố/hẻm) từ các website bất động sản uy tín, mỗi tin gồm: tiêu đề, giá, diện tích, địa chỉ, link. Các dữ liệu cần được xem xét về yếu tố thời gian trong năm 2025 tháng 7. Không trả về bất kỳ link url ngoài trường "link" trong từng tin rao, không trả về text ngoài JSON."#;

// ── Query types ───────────────────────────────────────────────────────────────

/// Address split into administrative parts. Every part is optional —
/// geocoding regularly leaves gaps.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParsedAddress {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub ward: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

/// Numeric-or-text field — the front-end sends areas and widths both ways.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AreaValue {
    Number(f64),
    Text(String),
}

impl AreaValue {
    /// Mirrors the front-end truthiness check: zero and blank don't count.
    fn has_value(&self) -> bool {
        match self {
            AreaValue::Number(n) => *n != 0.0,
            AreaValue::Text(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for AreaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AreaValue::Number(n) if n.fract() == 0.0 => write!(f, "{}", *n as i64),
            AreaValue::Number(n) => write!(f, "{n}"),
            AreaValue::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDetails {
    /// Front-end property type key (e.g. `town_house`, `land`).
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Plot area in m².
    #[serde(default)]
    pub land_area: Option<AreaValue>,
    #[serde(default)]
    pub alley_type: Option<String>,
    #[serde(default)]
    pub lane_width: Option<AreaValue>,
}

/// Body of `POST /api/search`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    /// Free-text location exactly as shown to the user.
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub parsed_address: Option<ParsedAddress>,
    #[serde(default)]
    pub property_details: Option<PropertyDetails>,
    /// Street picked on the map — takes priority over the parsed street.
    #[serde(default)]
    pub street_name: Option<String>,
}

// ── Prompt construction ───────────────────────────────────────────────────────

/// Map a front-end property type to the slug wording used on the listing
/// sites the models index. Unknown types pass through unchanged.
pub fn property_type_slug(kind: &str) -> &str {
    match kind {
        "apartment" => "chung_cu",
        "lane_house" => "nha_hem_ngo",
        "town_house" => "nha_mat_pho",
        "land" => "ban_dat",
        "villa" => "biet_thu_lien_ke",
        "NORMAL" => "nha_mat_pho",
        other => other,
    }
}

/// Assemble the user prompt for a search query.
///
/// Word order matters to the models: street first, then ward, district and
/// city, then the property-type slug and the approximate area, closed by a
/// fixed ranking instruction.
pub fn build_user_prompt(query: &SearchQuery) -> String {
    let addr = query.parsed_address.as_ref();
    let street = query
        .street_name
        .as_deref()
        .filter(|s| !s.is_empty())
        .or_else(|| addr.and_then(|a| a.street.as_deref()).filter(|s| !s.is_empty()));
    let slug = query
        .property_details
        .as_ref()
        .and_then(|d| d.kind.as_deref())
        .filter(|k| !k.is_empty())
        .map(property_type_slug);
    let area = query
        .property_details
        .as_ref()
        .and_then(|d| d.land_area.as_ref())
        .filter(|a| a.has_value());

    let mut prompt = String::from("Tìm kiếm các bất động sản ");
    if let Some(street) = street {
        prompt.push_str(street);
        prompt.push(' ');
    }
    for part in [
        addr.and_then(|a| a.ward.as_deref()),
        addr.and_then(|a| a.district.as_deref()),
        addr.and_then(|a| a.city.as_deref()),
    ] {
        if let Some(part) = part.filter(|p| !p.is_empty()) {
            prompt.push_str(part);
            prompt.push(' ');
        }
    }
    if let Some(slug) = slug {
        prompt.push_str(slug);
    }
    if let Some(area) = area {
        prompt.push_str(&format!(" diện tích khoảng {area} m2"));
    }
    prompt.push_str(&format!(
        ". Tìm kiếm ưu tiên thứ tự các tin cùng đường, cùng loại bất động sản ({}), diện tích tương tự (±10%). Trả về đúng định dạng JSON như hướng dẫn.",
        slug.unwrap_or("")
    ));
    prompt
}

/// System prompt for the market-search completion, loaded from
/// `market_search_system.txt` with a compiled-in fallback.
pub fn system_prompt(prompts_dir: &Path) -> String {
    templates::load_or(prompts_dir, "market_search_system.txt", SYSTEM_PROMPT_FALLBACK)
}
