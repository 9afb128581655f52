use html_escape::{encode_double_quoted_attribute, encode_text};
use summarize_core::{render_html, render_plain_text, Style, SummaryResult};

const STYLE_SHEET: &str = r#"
:root { --bg: #f7f7f5; --fg: #1d1d1f; --card: #ffffff; --accent: #2f6fde; --muted: #6b6b6b; --error: #b3261e; }
[data-theme="dark"] { --bg: #16171a; --fg: #e8e8ea; --card: #212227; --accent: #7aa7ff; --muted: #9a9aa0; --error: #ff8a80; }
body { margin: 0; font-family: system-ui, sans-serif; background: var(--bg); color: var(--fg); }
main { max-width: 760px; margin: 0 auto; padding: 2rem 1rem; }
header { display: flex; justify-content: space-between; align-items: center; }
a { color: var(--accent); }
.card { background: var(--card); border-radius: 10px; padding: 1.5rem; margin-top: 1rem; }
textarea { width: 100%; min-height: 14rem; box-sizing: border-box; font: inherit; }
.counter, .word-count { color: var(--muted); font-size: 0.9rem; }
.error { color: var(--error); font-weight: 600; }
.notice { border-left: 4px solid var(--accent); padding-left: 0.75rem; }
button { background: var(--accent); color: #fff; border: 0; border-radius: 6px; padding: 0.5rem 1rem; cursor: pointer; }
"#;

const THEME_SCRIPT: &str = r#"
(function () {
  var saved = localStorage.getItem("theme");
  if (saved) { document.documentElement.dataset.theme = saved; }
  document.addEventListener("DOMContentLoaded", function () {
    var toggle = document.getElementById("theme-toggle");
    if (!toggle) { return; }
    toggle.addEventListener("click", function () {
      var next = document.documentElement.dataset.theme === "dark" ? "light" : "dark";
      document.documentElement.dataset.theme = next;
      localStorage.setItem("theme", next);
    });
  });
})();
"#;

const COUNTER_SCRIPT: &str = r#"
document.addEventListener("DOMContentLoaded", function () {
  var area = document.getElementById("text");
  var counter = document.getElementById("char-count");
  if (!area || !counter) { return; }
  var update = function () { counter.textContent = area.value.length + " characters"; };
  area.addEventListener("input", update);
  update();
});
"#;

const COPY_SCRIPT: &str = r#"
document.addEventListener("DOMContentLoaded", function () {
  var button = document.getElementById("copy");
  var source = document.getElementById("plain-summary");
  if (!button || !source) { return; }
  button.addEventListener("click", function () {
    navigator.clipboard.writeText(source.value).then(function () {
      button.textContent = "Copied";
    });
  });
});
"#;

fn layout(title: &str, body: &str, script: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n<style>{STYLE_SHEET}</style>\n<script>{THEME_SCRIPT}</script>\n\
         </head>\n<body>\n<main>\n<header><h1><a href=\"/\">Summarize</a></h1>\
         <button id=\"theme-toggle\" type=\"button\">Toggle theme</button></header>\n\
         {body}\n</main>\n<script>{script}</script>\n</body>\n</html>\n",
        title = encode_text(title),
    )
}

pub fn landing() -> String {
    layout(
        "Summarize",
        "<section class=\"card\">\
         <p>Upload a PDF or paste text and get bullet points, an abstract or study notes.</p>\
         <p>Summaries are produced offline by default; an OpenAI-compatible model can be used \
         when one is configured.</p>\
         <p><a href=\"/app\">Start summarizing</a></p>\
         </section>",
        "",
    )
}

/// The submission form. `error` and the previous text are shown again when
/// a submission is rejected.
pub fn form(error: Option<&str>, text: &str, style: Style) -> String {
    let error_html = error
        .map(|message| format!("<p class=\"error\" role=\"alert\">{}</p>", encode_text(message)))
        .unwrap_or_default();

    let options: String = [Style::Bullets, Style::Abstract, Style::StudyNotes]
        .iter()
        .map(|option| {
            let selected = if *option == style { " selected" } else { "" };
            let label = match option {
                Style::Bullets => "Bullet points",
                Style::Abstract => "Abstract",
                Style::StudyNotes => "Study notes",
            };
            format!("<option value=\"{}\"{selected}>{label}</option>", option.as_str())
        })
        .collect();

    let body = format!(
        "<section class=\"card\">{error_html}\
         <form method=\"post\" action=\"/summarize\" enctype=\"multipart/form-data\">\
         <label for=\"text\">Paste text</label>\
         <textarea id=\"text\" name=\"text\">{text}</textarea>\
         <p class=\"counter\" id=\"char-count\"></p>\
         <label for=\"file\">or upload a PDF or .txt file</label> \
         <input id=\"file\" name=\"file\" type=\"file\" accept=\".pdf,.txt\">\
         <p><label for=\"format\">Format</label> <select id=\"format\" name=\"format\">{options}</select> \
         <label for=\"mode\">Summarizer</label> <select id=\"mode\" name=\"mode\">\
         <option value=\"\">Default</option><option value=\"local\">Offline</option>\
         <option value=\"remote\">Remote model</option></select></p>\
         <button type=\"submit\">Summarize</button>\
         </form></section>",
        text = encode_text(text),
    );
    layout("Summarize", &body, COUNTER_SCRIPT)
}

pub fn result(result: &SummaryResult) -> Result<String, serde_json::Error> {
    let notice = result
        .fallback
        .as_ref()
        .map(|notice| format!("<p class=\"notice\">{}</p>", encode_text(notice.message())))
        .unwrap_or_default();
    let serialized = serde_json::to_string(result)?;

    let body = format!(
        "<section class=\"card\">{notice}<h2>Summary</h2>{summary}\
         <textarea id=\"plain-summary\" hidden readonly>{plain}</textarea>\
         <p><button id=\"copy\" type=\"button\">Copy to clipboard</button></p>\
         <form method=\"post\" action=\"/download\">\
         <input type=\"hidden\" name=\"summary\" value=\"{serialized}\">\
         <button type=\"submit\">Download PDF</button></form>\
         <p><a href=\"/app\">Summarize something else</a></p></section>",
        summary = render_html(result),
        plain = encode_text(&render_plain_text(result)),
        serialized = encode_double_quoted_attribute(&serialized),
    );
    Ok(layout("Summary", &body, COPY_SCRIPT))
}

pub fn server_error() -> String {
    layout(
        "Something went wrong",
        "<section class=\"card\"><p class=\"error\">Something went wrong while handling the \
         request. Please try again.</p><p><a href=\"/app\">Back</a></p></section>",
        "",
    )
}
