use quick_xml::escape::{escape, partial_escape};

use crate::model::catalog::Catalog;
use crate::model::entry::Message;

const INDENT: &str = "    ";

/// Serialize a catalog in the layout `lupdate` writes.
pub fn rebuild(catalog: &Catalog) -> String {
    let mut out = String::with_capacity(catalog.len() * 160);

    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    out.push_str("<!DOCTYPE TS>\n");

    out.push_str(&format!("<TS version=\"{}\"", escape(&catalog.version)));
    if !catalog.language.is_empty() {
        out.push_str(&format!(" language=\"{}\"", escape(&catalog.language)));
    }
    if let Some(src) = &catalog.source_language {
        out.push_str(&format!(" sourcelanguage=\"{}\"", escape(src)));
    }
    out.push_str(">\n");

    for context in &catalog.contexts {
        out.push_str("<context>\n");
        out.push_str(&format!("{INDENT}<name>{}</name>\n", partial_escape(&context.name)));
        for message in &context.messages {
            write_message(&mut out, message);
        }
        out.push_str("</context>\n");
    }

    out.push_str("</TS>\n");
    out
}

fn write_message(out: &mut String, m: &Message) {
    let pad = INDENT.repeat(2);

    out.push_str(INDENT);
    out.push_str("<message");
    if let Some(id) = &m.id {
        out.push_str(&format!(" id=\"{}\"", escape(id)));
    }
    if m.numerus {
        out.push_str(" numerus=\"yes\"");
    }
    out.push_str(">\n");

    for loc in &m.locations {
        out.push_str(&format!("{pad}<location filename=\"{}\"", escape(&loc.filename)));
        if let Some(line) = loc.line {
            out.push_str(&format!(" line=\"{line}\""));
        }
        out.push_str("/>\n");
    }

    write_text(out, &pad, "source", &m.source);
    if let Some(c) = &m.comment {
        write_text(out, &pad, "comment", c);
    }
    if let Some(c) = &m.extra_comment {
        write_text(out, &pad, "extracomment", c);
    }
    if let Some(c) = &m.translator_comment {
        write_text(out, &pad, "translatorcomment", c);
    }

    out.push_str(&pad);
    out.push_str("<translation");
    if let Some(ty) = m.status.type_attr() {
        out.push_str(&format!(" type=\"{ty}\""));
    }
    out.push('>');

    if m.numerus {
        out.push('\n');
        for form in &m.numerus_forms {
            out.push_str(&format!(
                "{pad}{INDENT}<numerusform>{}</numerusform>\n",
                partial_escape(form)
            ));
        }
        out.push_str(&pad);
    } else {
        out.push_str(&partial_escape(&m.translation));
    }
    out.push_str("</translation>\n");

    out.push_str(INDENT);
    out.push_str("</message>\n");
}

fn write_text(out: &mut String, pad: &str, tag: &str, text: &str) {
    out.push_str(&format!("{pad}<{tag}>{}</{tag}>\n", partial_escape(text)));
}
