//! HTML reader: walks the DOM once and writes both views.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashMap;

use super::style::{analyse, parse_declarations, Rgb, StyleHint, StylingTechnique};
use super::{normalize_view, Views};

lazy_static! {
    /// `.class { declarations }` rules inside `<style>` blocks.
    static ref CLASS_RULE: Regex = Regex::new(r"\.([A-Za-z0-9_-]+)\s*\{([^}]*)\}").unwrap();

    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Elements whose text is never part of the document body.
const SKIPPED: &[&str] = &["script", "style", "head", "noscript", "template", "title"];

/// Elements that start a new line.
const BLOCKS: &[&str] = &[
    "p", "div", "br", "li", "ul", "ol", "tr", "table", "section", "article", "header",
    "footer", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "blockquote", "pre", "dd", "dt",
];

const PREVIEW_CHARS: usize = 60;

struct Walk {
    class_rules: HashMap<String, Vec<(String, String)>>,
    rendered: String,
    full: String,
    hints: Vec<StyleHint>,
}

/// Read an HTML document into its rendered and full views plus style hints.
pub fn read(source: &str) -> Views {
    let document = Html::parse_document(source);

    let mut walk = Walk {
        class_rules: collect_class_rules(&document),
        rendered: String::new(),
        full: String::new(),
        hints: Vec::new(),
    };

    visit(&mut walk, document.root_element(), false, Rgb::WHITE);

    Views {
        rendered: normalize_view(&walk.rendered),
        full: normalize_view(&walk.full),
        style_layer: Some(walk.hints),
    }
}

fn collect_class_rules(document: &Html) -> HashMap<String, Vec<(String, String)>> {
    let mut rules: HashMap<String, Vec<(String, String)>> = HashMap::new();
    let Ok(selector) = Selector::parse("style") else {
        return rules;
    };

    for style in document.select(&selector) {
        let css: String = style.text().collect();
        for cap in CLASS_RULE.captures_iter(&css) {
            rules
                .entry(cap[1].to_string())
                .or_default()
                .extend(parse_declarations(&cap[2]));
        }
    }

    rules
}

fn visit(walk: &mut Walk, element: ElementRef<'_>, hidden: bool, background: Rgb) {
    let el = element.value();
    let name = el.name().to_ascii_lowercase();

    if SKIPPED.contains(&name.as_str()) {
        return;
    }

    // Class rules first so inline declarations win when both are present.
    let mut declarations: Vec<(String, String)> = Vec::new();
    for class in el.classes() {
        if let Some(rules) = walk.class_rules.get(class) {
            declarations.extend(rules.iter().cloned());
        }
    }
    if let Some(style) = el.attr("style") {
        declarations.extend(parse_declarations(style));
    }

    let mut suppression = analyse(&declarations, background);
    if el.attr("hidden").is_some() {
        suppression
            .techniques
            .push((StylingTechnique::HiddenAttribute, "hidden".to_string()));
    }

    if suppression.hides() {
        let preview = element_preview(element);
        for (technique, declaration) in &suppression.techniques {
            walk.hints.push(StyleHint {
                technique: *technique,
                declaration: declaration.clone(),
                element: name.clone(),
                text_preview: preview.clone(),
            });
        }
    }

    let hidden_here = hidden || suppression.hides();
    let child_background = suppression.background.unwrap_or(background);
    let is_block = BLOCKS.contains(&name.as_str());

    if is_block {
        push_break(walk, hidden_here);
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let chunk = WHITESPACE.replace_all(text, " ");
                walk.full.push_str(&chunk);
                if !hidden_here {
                    walk.rendered.push_str(&chunk);
                }
            }
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    visit(walk, child_el, hidden_here, child_background);
                }
            }
            _ => {}
        }
    }

    if is_block {
        push_break(walk, hidden_here);
    }
}

fn push_break(walk: &mut Walk, hidden: bool) {
    walk.full.push('\n');
    if !hidden {
        walk.rendered.push('\n');
    }
}

fn element_preview(element: ElementRef<'_>) -> String {
    let text: String = element.text().collect::<Vec<_>>().join(" ");
    let collapsed = WHITESPACE.replace_all(text.trim(), " ");
    collapsed.chars().take(PREVIEW_CHARS).collect()
}
