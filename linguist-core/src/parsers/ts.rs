//! Reader for the Qt Linguist `.ts` XML format.
//!
//! Text inside `<source>`, `<translation>` and `<numerusform>` is kept
//! verbatim (entities decoded, whitespace and newlines untouched). Elements
//! the model has no place for are skipped.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::catalog::{Catalog, Context};
use crate::model::entry::{Location, Message, TranslationStatus};
use crate::services::encoding;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Source,
    OldSource,
    Comment,
    ExtraComment,
    TranslatorComment,
    Translation,
    NumerusForm,
}

impl Field {
    fn for_tag(tag: &[u8]) -> Option<Field> {
        match tag {
            b"name" => Some(Field::Name),
            b"source" => Some(Field::Source),
            b"oldsource" => Some(Field::OldSource),
            b"comment" => Some(Field::Comment),
            b"extracomment" => Some(Field::ExtraComment),
            b"translatorcomment" => Some(Field::TranslatorComment),
            b"translation" => Some(Field::Translation),
            b"numerusform" => Some(Field::NumerusForm),
            _ => None,
        }
    }
}

#[derive(Default)]
struct ParseState {
    catalog: Option<Catalog>,
    context: Option<Context>,
    message: Option<Message>,
    field: Option<Field>,
    text: String,
    saw_source: bool,
    closed: bool,
    /// Filename inherited by a `<location>` without one.
    last_file: String,
    /// Last resolved line per file in the current context.
    last_lines: HashMap<String, u32>,
}

pub fn parse(text: &str) -> Result<Catalog> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(false);

    let mut state = ParseState::default();

    loop {
        let pos = reader.buffer_position() as u64;
        match reader.read_event() {
            Ok(Event::Start(e)) => state.start(&e, pos)?,
            Ok(Event::Empty(e)) => {
                state.start(&e, pos)?;
                state.end(e.name().as_ref(), pos)?;
            }
            Ok(Event::End(e)) => state.end(e.name().as_ref(), pos)?,
            Ok(Event::Text(t)) => {
                if state.field.is_some() {
                    let s = t.unescape().map_err(|e| Error::parse(pos, e.to_string()))?;
                    state.text.push_str(&s);
                }
            }
            Ok(Event::CData(c)) => {
                if state.field.is_some() {
                    state.text.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Ok(Event::Eof) => return state.finish(pos),
            Ok(_) => {}
            Err(e) => {
                return Err(Error::parse(reader.error_position() as u64, e.to_string()));
            }
        }
    }
}

/// Read, decode and parse a catalog file.
pub fn load(path: &Path) -> Result<Catalog> {
    let bytes = fs::read(path)?;
    let text = encoding::decode(&bytes)?;
    let catalog = parse(&text)?;

    info!(
        path = %path.display(),
        language = %catalog.language,
        contexts = catalog.contexts.len(),
        messages = catalog.len(),
        "catalog loaded"
    );

    Ok(catalog)
}

impl ParseState {
    fn start(&mut self, e: &BytesStart, pos: u64) -> Result<()> {
        let tag = e.name();

        match tag.as_ref() {
            b"TS" => {
                let mut catalog = Catalog::default();
                if let Some(v) = attr(e, b"version", pos)? {
                    catalog.version = v;
                }
                catalog.language = attr(e, b"language", pos)?.unwrap_or_default();
                catalog.source_language = attr(e, b"sourcelanguage", pos)?;
                self.catalog = Some(catalog);
            }

            b"context" => {
                if self.catalog.is_none() {
                    return Err(Error::parse(pos, "<context> outside of <TS>"));
                }
                self.context = Some(Context::new(""));
                self.last_file.clear();
                self.last_lines.clear();
            }

            b"message" => {
                if self.context.is_none() {
                    return Err(Error::parse(pos, "<message> outside of <context>"));
                }
                let mut message = Message::new("");
                message.id = attr(e, b"id", pos)?;
                message.numerus = attr(e, b"numerus", pos)?.as_deref() == Some("yes");
                self.message = Some(message);
                self.saw_source = false;
            }

            b"location" => {
                let filename = attr(e, b"filename", pos)?;
                let raw_line = attr(e, b"line", pos)?;

                let Some(message) = self.message.as_mut() else {
                    return Ok(());
                };

                let filename = filename.unwrap_or_else(|| self.last_file.clone());

                let line = match raw_line {
                    Some(raw) => {
                        let previous = self.last_lines.get(&filename).copied().unwrap_or(0);
                        let line = parse_line(&raw, previous, pos)?;
                        self.last_lines.insert(filename.clone(), line);
                        Some(line)
                    }
                    None => None,
                };

                self.last_file = filename.clone();
                message.locations.push(Location { filename, line });
            }

            b"translation" => {
                if let Some(message) = self.message.as_mut() {
                    let ty = attr(e, b"type", pos)?;
                    message.status = TranslationStatus::from_type_attr(ty.as_deref())
                        .ok_or_else(|| {
                            Error::parse(
                                pos,
                                format!("unknown translation type {:?}", ty.unwrap_or_default()),
                            )
                        })?;
                    self.begin(Field::Translation);
                }
            }

            b"numerusform" => {
                if self.field == Some(Field::Translation) {
                    self.begin(Field::NumerusForm);
                }
            }

            b"name" => {
                if self.context.is_some() && self.message.is_none() {
                    self.begin(Field::Name);
                }
            }

            other => {
                if self.message.is_some() {
                    if let Some(field) = Field::for_tag(other) {
                        self.begin(field);
                    }
                }
            }
        }

        Ok(())
    }

    fn end(&mut self, tag: &[u8], pos: u64) -> Result<()> {
        if let (Some(field), Some(closing)) = (self.field, Field::for_tag(tag)) {
            if field == closing {
                self.finish_field(field);
                return Ok(());
            }
        }

        match tag {
            b"TS" => self.closed = true,
            b"message" => {
                let Some(message) = self.message.take() else {
                    return Ok(());
                };
                if !self.saw_source {
                    return Err(Error::parse(pos, "<message> without <source>"));
                }
                if let Some(context) = self.context.as_mut() {
                    context.messages.push(message);
                }
            }
            b"context" => {
                if let (Some(context), Some(catalog)) = (self.context.take(), self.catalog.as_mut())
                {
                    debug!(
                        context = %context.name,
                        messages = context.messages.len(),
                        "context parsed"
                    );
                    catalog.contexts.push(context);
                }
            }
            _ => {}
        }

        Ok(())
    }

    fn begin(&mut self, field: Field) {
        self.field = Some(field);
        self.text.clear();
    }

    fn finish_field(&mut self, field: Field) {
        let text = std::mem::take(&mut self.text);
        self.field = None;

        if field == Field::Name {
            if let Some(context) = self.context.as_mut() {
                context.name = text;
            }
            return;
        }

        let Some(message) = self.message.as_mut() else {
            return;
        };

        match field {
            Field::Source => {
                message.source = text;
                self.saw_source = true;
            }
            Field::Comment => message.comment = Some(text),
            Field::ExtraComment => message.extra_comment = Some(text),
            Field::TranslatorComment => message.translator_comment = Some(text),
            Field::Translation => {
                if !message.numerus {
                    message.translation = text;
                }
            }
            Field::NumerusForm => {
                message.numerus_forms.push(text);
                // back inside the enclosing <translation>
                self.field = Some(Field::Translation);
            }
            Field::OldSource | Field::Name => {}
        }
    }

    /// `end` is the byte offset where the input ran out.
    fn finish(self, end: u64) -> Result<Catalog> {
        if self.context.is_some() || self.message.is_some() {
            return Err(Error::parse(end, "unterminated <context>"));
        }
        match self.catalog {
            None => Err(Error::parse(end, "missing <TS> root element")),
            Some(_) if !self.closed => Err(Error::parse(end, "unterminated <TS>")),
            Some(catalog) => Ok(catalog),
        }
    }
}

fn attr(e: &BytesStart, key: &[u8], pos: u64) -> Result<Option<String>> {
    for a in e.attributes() {
        let a = a.map_err(|err| Error::parse(pos, err.to_string()))?;
        if a.key.as_ref() == key {
            let v = a
                .unescape_value()
                .map_err(|err| Error::parse(pos, err.to_string()))?;
            return Ok(Some(v.into_owned()));
        }
    }
    Ok(None)
}

/// Absolute (`"35"`) or relative to the previous citation of the same file (`"+3"`, `"-2"`).
fn parse_line(raw: &str, previous: u32, pos: u64) -> Result<u32> {
    let raw = raw.trim();
    let invalid = || Error::parse(pos, format!("invalid line number {raw:?}"));

    if raw.starts_with('+') || raw.starts_with('-') {
        let offset: i64 = raw.parse().map_err(|_| invalid())?;
        let line = i64::from(previous) + offset;
        return u32::try_from(line).map_err(|_| invalid());
    }

    raw.parse().map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.0" language="es_ES">
<context>
    <name>QHiMDAboutDialog</name>
    <message>
        <location filename="qhimdaboutdialog.ui" line="166"/>
        <location filename="ui_qhimdaboutdialog.h" line="187"/>
        <source>&amp;Close</source>
        <translation>&amp;Cerrar</translation>
    </message>
    <message>
        <location filename="qhimdaboutdialog.ui" line="204"/>
        <source>Version:</source>
        <translation type="unfinished"></translation>
    </message>
</context>
</TS>
"#;

    #[test]
    fn parses_contexts_and_messages() {
        let catalog = parse(SMALL).unwrap();
        assert_eq!(catalog.version, "2.0");
        assert_eq!(catalog.language, "es_ES");
        assert_eq!(catalog.contexts.len(), 1);

        let ctx = &catalog.contexts[0];
        assert_eq!(ctx.name, "QHiMDAboutDialog");
        assert_eq!(ctx.messages.len(), 2);

        let close = &ctx.messages[0];
        assert_eq!(close.source, "&Close");
        assert_eq!(close.translation, "&Cerrar");
        assert_eq!(close.status, TranslationStatus::Finished);
        assert_eq!(
            close.locations,
            vec![
                Location::new("qhimdaboutdialog.ui", 166),
                Location::new("ui_qhimdaboutdialog.h", 187),
            ]
        );

        let version = &ctx.messages[1];
        assert_eq!(version.status, TranslationStatus::Unfinished);
        assert!(version.translation.is_empty());
    }

    #[test]
    fn keeps_multiline_and_trailing_whitespace() {
        let text = "<TS version=\"2.0\" language=\"es_ES\"><context><name>C</name>\
            <message><source>first\nsecond </source>\
            <translation>primero\nsegundo</translation></message></context></TS>";
        let catalog = parse(text).unwrap();
        let m = &catalog.contexts[0].messages[0];
        assert_eq!(m.source, "first\nsecond ");
        assert_eq!(m.translation, "primero\nsegundo");
    }

    #[test]
    fn reads_numerus_forms_and_comments() {
        let text = r#"<TS version="2.1" language="ru_RU" sourcelanguage="en_US">
<context>
    <name>QHiMDUploadDialog</name>
    <message numerus="yes" id="upload.count">
        <source>%n track(s) uploaded</source>
        <comment>status line</comment>
        <extracomment>shown after upload</extracomment>
        <translatorcomment>check forms</translatorcomment>
        <translation>
            <numerusform>%n трек</numerusform>
            <numerusform>%n трека</numerusform>
            <numerusform>%n треков</numerusform>
        </translation>
    </message>
</context>
</TS>"#;
        let catalog = parse(text).unwrap();
        assert_eq!(catalog.source_language.as_deref(), Some("en_US"));

        let m = &catalog.contexts[0].messages[0];
        assert!(m.numerus);
        assert_eq!(m.id.as_deref(), Some("upload.count"));
        assert_eq!(m.comment.as_deref(), Some("status line"));
        assert_eq!(m.extra_comment.as_deref(), Some("shown after upload"));
        assert_eq!(m.translator_comment.as_deref(), Some("check forms"));
        assert_eq!(m.numerus_forms, vec!["%n трек", "%n трека", "%n треков"]);
        assert!(m.translation.is_empty());
    }

    #[test]
    fn resolves_relative_locations() {
        let text = r#"<TS version="2.0" language="es_ES"><context><name>C</name>
<message>
    <location filename="qhimdmainwindow.cpp" line="27"/>
    <location line="+64"/>
    <source>Error opening track: </source>
    <translation>Error de apertura de pista:</translation>
</message>
</context></TS>"#;
        let catalog = parse(text).unwrap();
        let m = &catalog.contexts[0].messages[0];
        assert_eq!(
            m.locations,
            vec![
                Location::new("qhimdmainwindow.cpp", 27),
                Location::new("qhimdmainwindow.cpp", 91),
            ]
        );
    }

    #[test]
    fn relative_lines_follow_each_file() {
        let text = r#"<TS version="2.0" language="es_ES"><context><name>QHiMDAboutDialog</name>
<message>
    <location filename="qhimdaboutdialog.ui" line="+166"/>
    <location filename="ui_qhimdaboutdialog.h" line="+187"/>
    <source>&amp;Close</source>
    <translation>&amp;Cerrar</translation>
</message>
<message>
    <location filename="qhimdaboutdialog.ui" line="+38"/>
    <location filename="ui_qhimdaboutdialog.h" line="+1"/>
    <source>Version:</source>
    <translation type="unfinished"></translation>
</message>
</context>
<context><name>QHiMDDetection</name>
<message>
    <location filename="qhimdaboutdialog.ui" line="+5"/>
    <source>Detect</source>
    <translation type="unfinished"></translation>
</message>
</context></TS>"#;
        let catalog = parse(text).unwrap();
        let about = &catalog.contexts[0].messages;
        assert_eq!(
            about[0].locations,
            vec![
                Location::new("qhimdaboutdialog.ui", 166),
                Location::new("ui_qhimdaboutdialog.h", 187),
            ]
        );
        assert_eq!(
            about[1].locations,
            vec![
                Location::new("qhimdaboutdialog.ui", 204),
                Location::new("ui_qhimdaboutdialog.h", 188),
            ]
        );

        // a new context starts counting from zero again
        assert_eq!(
            catalog.contexts[1].messages[0].locations,
            vec![Location::new("qhimdaboutdialog.ui", 5)]
        );
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(parse("<context></context>"), Err(Error::Parse { .. })));
        assert!(matches!(parse(""), Err(Error::Parse { .. })));

        let no_source = r#"<TS><context><name>C</name><message>
            <translation>x</translation></message></context></TS>"#;
        assert!(matches!(parse(no_source), Err(Error::Parse { .. })));

        let bad_type = r#"<TS><context><name>C</name><message><source>a</source>
            <translation type="done">b</translation></message></context></TS>"#;
        assert!(matches!(parse(bad_type), Err(Error::Parse { .. })));

        let bad_line = r#"<TS><context><name>C</name><message>
            <location filename="a.cpp" line="x"/><source>a</source>
            <translation>b</translation></message></context></TS>"#;
        assert!(matches!(parse(bad_line), Err(Error::Parse { .. })));

        assert!(matches!(
            parse("<TS><context><name>C</name></TS>"),
            Err(Error::Parse { .. })
        ));

        let truncated = "<TS version=\"2.0\" language=\"es_ES\"><context><name>C</name>\
            <message><source>a</source><translation>b</translation></message></context>";
        match parse(truncated) {
            Err(Error::Parse { position, message }) => {
                assert!(position > 0);
                assert!(message.contains("<TS>"));
            }
            other => panic!("truncated catalog accepted: {other:?}"),
        }
    }
}
