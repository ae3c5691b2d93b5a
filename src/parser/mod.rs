pub mod answer;
pub mod error;
pub mod game;
pub mod position;
pub mod round;

use scraper::ElementRef;

pub use game::{extract_game, GameReport, RoundCascade};

/// Concatenated text of `el` and all its descendants.
fn text_of(el: ElementRef) -> String {
    el.text().collect()
}

/// Builders for archive-shaped markup used across the parser tests.
#[cfg(test)]
pub(crate) mod testutil {
    pub fn clue_cell(value: &str, text: &str, answer: &str) -> String {
        let value_class = if value.trim().starts_with("DD:") {
            "clue_value_daily_double"
        } else {
            "clue_value"
        };
        format!(
            r#"<td class="clue">
  <table><tr><td>
    <div onmouseover="toggle('clue_x', 'clue_x_stuck', '&lt;em class=&quot;correct_response&quot;&gt;{answer}&lt;/em&gt;&lt;br /&gt;&lt;table width=&quot;100%&quot;&gt;&lt;tr&gt;&lt;td class=&quot;right&quot;&gt;Ken&lt;/td&gt;&lt;/tr&gt;&lt;/table&gt;')" onmouseout="toggle('clue_x', 'clue_x_stuck', '{text}')">
      <table class="clue_header"><tr>
        <td class="{value_class}">{value}</td>
        <td class="clue_order_number"><a href="suggestcorrection.php?clue_id=1">1</a></td>
      </tr></table>
    </div>
  </td></tr></table>
  <table><tr><td id="clue_x" class="clue_text">{text}</td></tr></table>
</td>"#
        )
    }

    pub fn unrevealed_cell() -> String {
        "<td class=\"clue\">\n</td>".to_string()
    }

    /// A revealed cell whose answer marker is missing.
    pub fn cell_without_answer(value: &str, text: &str) -> String {
        format!(
            r#"<td class="clue"><table><tr><td class="clue_value">{value}</td></tr></table>
  <table><tr><td class="clue_text">{text}</td></tr></table></td>"#
        )
    }

    pub fn round_div(id: &str, categories: &[&str], cells: &[String]) -> String {
        let header: String = categories
            .iter()
            .map(|c| {
                format!(
                    r#"<td class="category"><table><tr><td class="category_name">{c}</td></tr><tr><td class="category_comments"></td></tr></table></td>"#
                )
            })
            .collect();
        let rows: String = cells
            .chunks(6)
            .map(|row| format!("<tr>{}</tr>\n", row.concat()))
            .collect();
        format!(r#"<div id="{id}"><table class="round"><tr>{header}</tr>{rows}</table></div>"#)
    }

    pub fn final_div(category: Option<&str>, text: Option<&str>, answer: Option<&str>) -> String {
        let marker_open = match answer {
            Some(a) => format!(
                r#"<div onmouseover="toggle('clue_FJ', 'clue_FJ_stuck', '&lt;table class=&quot;final_round&quot;&gt;&lt;tr&gt;&lt;td class=&quot;right&quot;&gt;Ken&lt;/td&gt;&lt;/tr&gt;&lt;/table&gt;&lt;em class=\&quot;correct_response\&quot;&gt;{a}&lt;/em&gt;')">"#
            ),
            None => "<div>".to_string(),
        };
        let category = category
            .map(|c| format!(r#"<td class="category_name">{c}</td>"#))
            .unwrap_or_else(|| "<td></td>".to_string());
        let text = text
            .map(|t| format!(r#"<td id="clue_FJ" class="clue_text">{t}</td>"#))
            .unwrap_or_else(|| "<td></td>".to_string());
        format!(
            r#"<div id="final_jeopardy_round"><table class="final_round"><tr><td class="category">{marker_open}<table><tr>{category}</tr></table></div></td></tr>
<tr><td class="clue"><table><tr>{text}</tr></table></td></tr></table></div>"#
        )
    }

    pub fn page(title: &str, body: &str) -> String {
        format!(
            "<html><head><title>{title}</title></head><body><div id=\"content\">{body}</div></body></html>"
        )
    }

    pub fn standard_cells(n: usize, value: &str) -> Vec<String> {
        (0..n)
            .map(|i| clue_cell(value, &format!("clue {}", i), &format!("answer {}", i)))
            .collect()
    }

    pub const CATEGORIES: [&str; 6] = ["A", "B", "C", "D", "E", "F"];
}
