//! Tests for the prompt and report template files under config/prompts

use std::fs;

#[test]
fn test_search_system_prompt_file_exists() {
    let path = "config/prompts/market_search_system.txt";
    assert!(
        fs::metadata(path).is_ok(),
        "market_search_system.txt prompt file missing"
    );
}

#[test]
fn test_report_template_file_exists() {
    let path = "config/prompts/market_report.md";
    assert!(
        fs::metadata(path).is_ok(),
        "market_report.md template file missing"
    );
}

#[test]
fn test_search_system_prompt_demands_json() {
    let text = fs::read_to_string("config/prompts/market_search_system.txt").unwrap();
    assert!(
        text.contains("JSON"),
        "system prompt should instruct the model to answer in JSON"
    );
    assert!(
        text.contains("giá trung bình"),
        "system prompt should name the average-price field"
    );
}

#[test]
fn test_report_template_vars() {
    let text = fs::read_to_string("config/prompts/market_report.md").unwrap();
    for var in [
        "{{provider_info}}",
        "{{location}}",
        "{{content}}",
        "{{price_info}}",
        "{{trend_info}}",
        "{{year}}",
    ] {
        assert!(text.contains(var), "market_report.md should contain {var} variable");
    }
}
