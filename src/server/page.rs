//! Browser form page

use crate::pipeline::AnalysisReport;

const TEMPLATE: &str = include_str!("page.html");

/// Empty form
pub fn render_form() -> String {
    render("", "")
}

/// Form followed by an analysis result
pub fn render_report(video_url: &str, report: &AnalysisReport) -> String {
    let result = &report.result;
    let width = result.confidence.clamp(0.0, 100.0);
    let content = format!(
        r#"    <div class="panel">
        <h2>Detected accent: {accent}</h2>
        <p><strong>Confidence Score:</strong> {confidence:.1}%</p>
        <div class="confidence-bar">
            <div class="confidence-fill" style="width: {width:.1}%"></div>
        </div>
        <p>{explanation}</p>
        <p class="muted">{duration:.1}s of audio analyzed with {extractor}.</p>
    </div>"#,
        accent = escape(result.accent.name()),
        confidence = result.confidence,
        width = width,
        explanation = escape(&result.explanation),
        duration = report.duration_secs,
        extractor = escape(report.extractor),
    );
    render(video_url, &content)
}

/// Form followed by an error message
pub fn render_error(video_url: &str, message: &str) -> String {
    let content = format!(
        "    <div class=\"error\"><strong>Error:</strong> {}</div>",
        escape(message)
    );
    render(video_url, &content)
}

fn render(video_url: &str, content: &str) -> String {
    TEMPLATE
        .replace("{{VIDEO_URL}}", &escape(video_url))
        .replace("{{CONTENT}}", content)
}

/// Minimal HTML escaping for text and attribute values
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<a href="x">&'"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;"
        );
    }

    #[test]
    fn test_error_page_escapes_input() {
        let html = render_error("https://x/\"><script>", "bad <url>");
        assert!(html.contains("bad &lt;url&gt;"));
        assert!(!html.contains("<script>"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn test_form_has_no_placeholders() {
        let html = render_form();
        assert!(html.contains("name=\"video_url\""));
        assert!(!html.contains("{{"));
    }
}
