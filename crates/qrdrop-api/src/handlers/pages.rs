//! HTML pages. The play page loads its data from `/api/media/{file_id}`.

use axum::{extract::Path, response::Html};

const INDEX_HTML: &str = include_str!("../../templates/index.html");
const PLAY_HTML: &str = include_str!("../../templates/play.html");

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn play(Path(file_id): Path<String>) -> Html<String> {
    Html(PLAY_HTML.replace("{{file_id}}", &escape_html(&file_id)))
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
