//! HTML rendering of result panels.
//!
//! Every piece of text and every attribute value taken from user input or a
//! server response goes through [`escape_html`] or [`escape_attribute`].

use std::fmt::Write;

use crate::{AppViewModel, PanelContent, PanelView};

pub fn escape_html(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

pub fn escape_attribute(value: &str) -> String {
    html_escape::encode_double_quoted_attribute(value).into_owned()
}

/// Renders the inner markup of one results container.
pub fn render_panel(content: &PanelContent) -> String {
    match content {
        PanelContent::Empty => String::new(),
        PanelContent::Loading(text) => {
            format!("<p class=\"loading\">{}</p>", escape_html(text))
        }
        PanelContent::Comparison {
            original, enhanced, ..
        } => format!(
            "<p><strong>Original:</strong></p>\n<p class=\"original\">{}</p>\n\
             <p><strong>Enhanced:</strong></p>\n<p class=\"enhanced\">{}</p>",
            escape_html(original),
            escape_html(enhanced)
        ),
        PanelContent::Images(images) => {
            let mut out = String::new();
            for image in images {
                let _ = writeln!(
                    out,
                    "<div class=\"image\"><img src=\"{src}\" alt=\"{alt}\" loading=\"lazy\">\
                     <a href=\"{src}\" download>{label}</a></div>",
                    src = escape_attribute(&image.url),
                    alt = escape_attribute(&image.alt),
                    label = escape_html(&image.download.label),
                );
            }
            out.trim_end().to_string()
        }
        PanelContent::Info(text) => format!("<p class=\"info\">{}</p>", escape_html(text)),
        PanelContent::Error(text) => format!("<p class=\"error\">{}</p>", escape_html(text)),
    }
}

/// Renders a standalone document with every visible results container.
pub fn render_report(view: &AppViewModel) -> String {
    let mut body = String::new();
    let sections = [
        ("Prompt Enhancement", &view.enhance),
        ("Image Generation", &view.images),
        ("Background Removal", &view.removal),
    ];
    for (title, panel) in sections {
        if let Some(section) = render_section(title, panel) {
            body.push_str(&section);
        }
    }
    if body.is_empty() {
        body.push_str("<p class=\"info\">No results yet.</p>\n");
    }
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Image Studio results</title>\n</head>\n<body>\n{body}</body>\n</html>\n"
    )
}

fn render_section(title: &str, panel: &PanelView) -> Option<String> {
    if !panel.visible {
        return None;
    }
    let inner = render_panel(&panel.content);
    if inner.is_empty() {
        return None;
    }
    Some(format!(
        "<section>\n<h2>{}</h2>\n{inner}\n</section>\n",
        escape_html(title)
    ))
}
