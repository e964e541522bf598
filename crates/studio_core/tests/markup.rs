use studio_core::markup::{escape_html, render_panel, render_report};
use studio_core::{update, AppState, AppViewModel, EnhancedPrompt, Msg, PanelContent};

#[test]
fn escaping_neutralises_markup() {
    assert_eq!(
        escape_html("<script>alert('x')</script> & more"),
        "&lt;script&gt;alert('x')&lt;/script&gt; &amp; more"
    );
}

#[test]
fn comparison_escapes_both_texts() {
    let html = render_panel(&PanelContent::Comparison {
        original: "a <b>cat</b>".to_string(),
        enhanced: "a \"fluffy\" cat & dog".to_string(),
        copy_label: "Copy enhanced prompt".to_string(),
    });

    assert!(html.contains("<strong>Original:</strong>"));
    assert!(html.contains("<strong>Enhanced:</strong>"));
    assert!(html.contains("a &lt;b&gt;cat&lt;/b&gt;"));
    assert!(html.contains("a \"fluffy\" cat &amp; dog"));
    assert!(!html.contains("<b>"));
}

#[test]
fn error_text_is_escaped() {
    let html = render_panel(&PanelContent::Error("Error: <img src=x onerror=1>".to_string()));
    assert_eq!(
        html,
        "<p class=\"error\">Error: &lt;img src=x onerror=1&gt;</p>"
    );
}

#[test]
fn image_attributes_cannot_break_out() {
    let (state, _) = update(AppState::new(), Msg::ImagePromptChanged("sunset".to_string()));
    let (state, _) = update(state, Msg::GenerateClicked);
    let (state, _) = update(
        state,
        Msg::ImagesFinished {
            request_id: 1,
            result: Ok(vec!["https://x/1.png\" onload=\"steal()".to_string()]),
        },
    );

    let html = render_panel(&state.view().images.content);
    assert!(html.contains("src=\"https://x/1.png&quot; onload=&quot;steal()\""));
    assert!(html.contains("alt=\"Generated image 1\""));
    assert!(html.contains(">Download Image</a>"));
}

#[test]
fn report_contains_only_visible_sections() {
    let (state, _) = update(AppState::new(), Msg::PromptChanged("a cat".to_string()));
    let (state, _) = update(state, Msg::EnhanceClicked);
    let (state, _) = update(
        state,
        Msg::EnhanceFinished {
            request_id: 1,
            result: Ok(EnhancedPrompt {
                original_prompt: Some("a cat".to_string()),
                enhanced_prompt: Some("a fluffy orange cat sitting in sunlight".to_string()),
            }),
        },
    );

    let html = render_report(&state.view());
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<h2>Prompt Enhancement</h2>"));
    assert!(html.contains("a fluffy orange cat sitting in sunlight"));
    assert!(!html.contains("Image Generation"));
    assert!(!html.contains("Background Removal"));
}

#[test]
fn empty_report_says_so() {
    let html = render_report(&AppViewModel::default());
    assert!(html.contains("No results yet."));
}

#[test]
fn export_click_carries_rendered_report() {
    let (_, effects) = update(AppState::new(), Msg::ExportClicked);
    match effects.as_slice() {
        [studio_core::Effect::ExportReport { html }] => assert!(html.contains("No results yet.")),
        other => panic!("unexpected effects {other:?}"),
    }
}
