use serde_json::{Value, json};

fn text_part(content: &str) -> Value {
    json!({ "type": "text", "text": { "content": content } })
}

fn styled_part(content: &str, annotation: &str) -> Value {
    json!({
        "type": "text",
        "text": { "content": content },
        "annotations": { annotation: true },
    })
}

fn link_part(label: &str, url: &str) -> Value {
    json!({
        "type": "text",
        "text": { "content": label, "link": { "url": url } },
    })
}

fn find_double(chars: &[char], from: usize, marker: char) -> Option<usize> {
    let mut cursor = from;
    while cursor + 1 < chars.len() {
        if chars[cursor] == marker && chars[cursor + 1] == marker {
            return Some(cursor);
        }
        cursor += 1;
    }
    None
}

fn find_single(chars: &[char], from: usize, marker: char) -> Option<usize> {
    (from..chars.len()).find(|&index| chars[index] == marker)
}

/// Parse inline markdown (`**bold**`, `*italic*`, `_italic_`,
/// `[label](url)`) into a rich-text array.
pub fn parse_inline(text: &str) -> Vec<Value> {
    let chars: Vec<char> = text.chars().collect();
    let mut parts = Vec::new();
    let mut plain = String::new();
    let mut index = 0usize;

    let flush = |plain: &mut String, parts: &mut Vec<Value>| {
        if !plain.is_empty() {
            parts.push(text_part(plain));
            plain.clear();
        }
    };

    while index < chars.len() {
        if chars[index] == '*' && index + 1 < chars.len() && chars[index + 1] == '*' {
            if let Some(end) = find_double(&chars, index + 2, '*') {
                let content: String = chars[index + 2..end].iter().collect();
                if !content.is_empty() {
                    flush(&mut plain, &mut parts);
                    parts.push(styled_part(&content, "bold"));
                    index = end + 2;
                    continue;
                }
            }
        }
        if chars[index] == '*' || chars[index] == '_' {
            let marker = chars[index];
            if let Some(end) = find_single(&chars, index + 1, marker) {
                let content: String = chars[index + 1..end].iter().collect();
                if !content.is_empty() {
                    flush(&mut plain, &mut parts);
                    parts.push(styled_part(&content, "italic"));
                    index = end + 1;
                    continue;
                }
            }
        }
        if chars[index] == '[' {
            if let Some(close_bracket) = find_single(&chars, index + 1, ']')
                && close_bracket + 1 < chars.len()
                && chars[close_bracket + 1] == '('
                && let Some(close_paren) = find_single(&chars, close_bracket + 2, ')')
            {
                let label: String = chars[index + 1..close_bracket].iter().collect();
                let url: String = chars[close_bracket + 2..close_paren].iter().collect();
                if !label.is_empty() && !url.is_empty() {
                    flush(&mut plain, &mut parts);
                    parts.push(link_part(&label, &url));
                    index = close_paren + 1;
                    continue;
                }
            }
        }
        plain.push(chars[index]);
        index += 1;
    }

    flush(&mut plain, &mut parts);
    if parts.is_empty() {
        parts.push(text_part(text));
    }
    parts
}

fn block(kind: &str, rich_text: Vec<Value>) -> Value {
    json!({
        "object": "block",
        "type": kind,
        kind: { "rich_text": rich_text },
    })
}

/// Convert markdown to block payloads: headings 1-3, dividers, to-dos,
/// bulleted/numbered lists, table rows flattened to paragraphs, and
/// paragraphs with inline formatting.
pub fn markdown_to_blocks(markdown: &str) -> Vec<Value> {
    let mut blocks = Vec::new();

    for line in markdown.trim().lines() {
        if line.trim().is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix("# ") {
            blocks.push(block("heading_1", parse_inline(rest)));
        } else if let Some(rest) = line.strip_prefix("## ") {
            blocks.push(block("heading_2", parse_inline(rest)));
        } else if let Some(rest) = line.strip_prefix("### ") {
            blocks.push(block("heading_3", parse_inline(rest)));
        } else if line.trim() == "---" {
            blocks.push(json!({ "object": "block", "type": "divider", "divider": {} }));
        } else if let Some(rest) = line.strip_prefix("- [ ] ") {
            blocks.push(todo_block(rest, false));
        } else if let Some(rest) = line
            .strip_prefix("- [x] ")
            .or_else(|| line.strip_prefix("- [X] "))
        {
            blocks.push(todo_block(rest, true));
        } else if let Some(rest) = line.strip_prefix("- ") {
            blocks.push(block("bulleted_list_item", parse_inline(rest)));
        } else if is_numbered_item(line) {
            let content = line.split_once(". ").map(|(_, rest)| rest).unwrap_or(line);
            blocks.push(block("numbered_list_item", parse_inline(content)));
        } else if line.starts_with('|') {
            // Table rows flatten to paragraphs; separator rows are dropped.
            if line.contains("---") {
                continue;
            }
            let cells: Vec<&str> = line
                .split('|')
                .map(str::trim)
                .filter(|cell| !cell.is_empty())
                .collect();
            blocks.push(block("paragraph", vec![text_part(&cells.join(" | "))]));
        } else {
            blocks.push(block("paragraph", parse_inline(line)));
        }
    }

    blocks
}

fn todo_block(content: &str, checked: bool) -> Value {
    json!({
        "object": "block",
        "type": "to_do",
        "to_do": { "rich_text": parse_inline(content), "checked": checked },
    })
}

fn is_numbered_item(line: &str) -> bool {
    let head: String = line.chars().take(4).collect();
    line.chars().next().is_some_and(|ch| ch.is_ascii_digit()) && head.contains(". ")
}
