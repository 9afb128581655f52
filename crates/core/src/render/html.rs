use crate::models::{SummaryBody, SummaryResult};
use html_escape::encode_text;

/// HTML fragment for the result page. All summary text is escaped.
pub fn render_html(result: &SummaryResult) -> String {
    let mut html = String::new();
    match &result.body {
        SummaryBody::Bullets { items } => {
            html.push_str(&list("ul", "summary-bullets", items));
        }
        SummaryBody::Abstract { paragraph } => {
            html.push_str(&format!(
                "<p class=\"summary-abstract\">{}</p>",
                encode_text(paragraph)
            ));
        }
        SummaryBody::StudyNotes(notes) => {
            html.push_str("<section class=\"summary-study\">");
            html.push_str("<h3>Overview</h3>");
            html.push_str(&format!("<p>{}</p>", encode_text(&notes.overview.join(" "))));
            html.push_str("<h3>Key Points</h3>");
            html.push_str(&list("ul", "key-points", &notes.key_points));
            html.push_str("<h3>Recall Questions</h3>");
            html.push_str(&list("ol", "recall-questions", &notes.questions));
            html.push_str("</section>");
        }
    }
    html.push_str(&format!(
        "<p class=\"word-count\"><strong>Word count:</strong> {}</p>",
        result.word_count
    ));
    html
}

fn list(tag: &str, class: &str, items: &[String]) -> String {
    let entries: String = items
        .iter()
        .map(|item| format!("<li>{}</li>", encode_text(item)))
        .collect();
    format!("<{tag} class=\"{class}\">{entries}</{tag}>")
}
