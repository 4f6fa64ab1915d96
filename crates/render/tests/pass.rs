use fenceline_core::{ConversionContext, ParseWarning};
use fenceline_render::highlight::SyntectEngine;
use fenceline_render::{Converter, Highlighter, Options, process_document};

fn syntect() -> Highlighter {
    Highlighter::new(SyntectEngine::bundled().expect("bundled engine"))
}

#[test]
fn highlights_javascript_block() {
    let highlighter = syntect();
    let mut ctx = ConversionContext::new();
    let text = "Intro\n\n```js\nconst x = 1;\n```\n";
    let out = process_document(text, &Options::default(), &highlighter, &mut ctx);

    // Placeholder replaces the fence
    assert_eq!(out, "Intro\n\n\n¨G0G\n\n\n");
    assert_eq!(ctx.tokens.len(), 1);

    let entry = ctx.tokens.get(0).expect("token 0");
    assert_eq!(entry.original_text, "```js\nconst x = 1;\n```");
    assert!(entry.rendered_html.starts_with(r#"<div class="code-block"><pre class="syntect""#));
    assert!(entry.rendered_html.contains(r#"data-language="js""#));
    assert!(entry.rendered_html.ends_with("</code></pre>\n</div>"));
    assert!(!ctx.diagnostics.has_any());
}

#[test]
fn filename_block_with_syntect() {
    let highlighter = syntect();
    let mut ctx = ConversionContext::new();
    let text = "```js {data-filename=\"app.js\"}\nexport default 1;\n```";
    process_document(text, &Options::default(), &highlighter, &mut ctx);

    let html = &ctx.tokens.get(0).expect("token 0").rendered_html;
    assert!(html.starts_with(
        r#"<div class="filename js"><div class="ribbon"></div><span>app.js</span><div class="code-block">"#
    ));
}

#[test]
fn unknown_language_still_renders() {
    let highlighter = syntect();
    let mut ctx = ConversionContext::new();
    process_document(
        "```klingon\nqapla' <&>\n```",
        &Options::default(),
        &highlighter,
        &mut ctx,
    );

    let html = &ctx.tokens.get(0).expect("token 0").rendered_html;
    assert!(html.contains("&lt;&amp;&gt;"));
    assert!(!ctx.diagnostics.has_errors());
}

#[test]
fn nested_longer_fence_keeps_inner_fence_as_code() {
    let highlighter = syntect();
    let mut ctx = ConversionContext::new();
    let text = "````md\n```js\nlet a;\n```\n````\n\n```\nsecond\n```";
    let out = process_document(text, &Options::default(), &highlighter, &mut ctx);

    assert_eq!(ctx.tokens.len(), 2);
    assert!(out.contains("¨G0G") && out.contains("¨G1G"));
    assert!(ctx.tokens.get(0).expect("token 0").original_text.ends_with("```\n````"));
}

#[test]
fn converter_restores_highlighted_blocks() {
    let converter = Converter::new(syntect(), Options::default());
    let conversion = converter
        .convert("Cost: $3\n\n```css\na { color: red; }\n```\n\n```js\nlet b;\n")
        .expect("convert");

    // Fenced block restored, paragraph wrapper removed
    assert!(conversion.html.starts_with("<p>Cost: $3</p>\n<div class=\"code-block\">"));
    assert!(!conversion.html.contains("¨G"));
    assert!(!conversion.html.contains("<p><div"));

    // Unclosed fence is left to the markdown converter and reported
    assert_eq!(conversion.tokens.len(), 1);
    assert!(matches!(
        conversion.diagnostics.warnings.as_slice(),
        [ParseWarning::UnclosedCodeFence { .. }]
    ));
}

#[test]
fn token_table_serializes_for_inspection() {
    let options = Options {
        omit_extra_wl_in_code_blocks: true,
        ..Options::default()
    };
    let converter = Converter::new(Highlighter::plain(), options);
    let conversion = converter.convert("```\nx\n```").expect("convert");
    let json = serde_json::to_value(&conversion.tokens).expect("serialize");

    insta::assert_snapshot!(
        json["entries"][0]["renderedHtml"].as_str().expect("html"),
        @r#"<div class="code-block"><pre class="plain"><code>x</code></pre></div>"#
    );
}
