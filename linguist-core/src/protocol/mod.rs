use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::catalog::Catalog;
use crate::model::settings::Settings;
use crate::parsers::ts;
use crate::services::lookup::{self, Translator};
use crate::services::translation_memory::{self as tm, store};
use crate::services::{encoding, pipeline, qa, rebuild, settings, stats};

mod command;
use command::Command;

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload(req: &Value) -> &Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

fn get_str<'a>(payload: &'a Value, key: &str) -> Option<&'a str> {
    payload
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
}

fn ok(id: Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

fn err(id: Value, message: impl Into<String>) -> String {
    json!({
        "id": id,
        "status": "error",
        "message": message.into()
    })
    .to_string()
}

/// `payload.catalog` (already parsed), `payload.text` (`.ts` source) or `payload.path`.
fn catalog_from_payload(payload: &Value) -> Result<Catalog> {
    if let Some(v) = payload.get("catalog").filter(|v| !v.is_null()) {
        return Ok(serde_json::from_value(v.clone())?);
    }
    if let Some(text) = payload.get("text").and_then(|v| v.as_str()) {
        return ts::parse(text);
    }
    if let Some(path) = get_str(payload, "path") {
        return ts::load(Path::new(path));
    }
    Err(Error::invalid(
        "payload.catalog, payload.text or payload.path is required",
    ))
}

fn data_dir_from_payload(payload: &Value) -> PathBuf {
    get_str(payload, "data_dir")
        .map(PathBuf::from)
        .unwrap_or_else(settings::data_dir)
}

/// Language pair from the payload, falling back to the catalog header and then to settings.
fn languages(payload: &Value, catalog: &Catalog, cfg: &Settings) -> Result<(String, String)> {
    let source = get_str(payload, "source_lang")
        .map(str::to_string)
        .or_else(|| catalog.source_language.clone().filter(|s| !s.is_empty()))
        .unwrap_or_else(|| cfg.source_language.clone());

    let target = get_str(payload, "target_lang")
        .map(str::to_string)
        .or_else(|| Some(catalog.language.clone()).filter(|s| !s.is_empty()))
        .or_else(|| Some(cfg.target_language.clone()).filter(|s| !s.is_empty()))
        .ok_or_else(|| Error::invalid("payload.target_lang is required"))?;

    Ok((source, target))
}

pub fn handle(input: &str) -> String {
    let req: Value = match serde_json::from_str(input) {
        Ok(v) => v,
        Err(_) => {
            return json!({
                "status": "error",
                "message": "invalid json"
            })
            .to_string();
        }
    };

    let id = get_id(&req);
    let cmd_str = get_cmd(&req);
    let payload = get_payload(&req);

    debug!(cmd = cmd_str, "request");

    let cmd = Command::from(cmd_str);
    if cmd == Command::Unknown {
        return err(id, "unknown command");
    }

    match dispatch(cmd, payload) {
        Ok(v) => ok(id, v),
        Err(e) => err(id, e.to_string()),
    }
}

fn dispatch(cmd: Command, payload: &Value) -> Result<Value> {
    match cmd {
        Command::Ping => Ok(json!({ "message": "linguist-core alive" })),

        Command::CatalogParse => {
            let catalog = catalog_from_payload(payload)?;
            Ok(json!({ "catalog": catalog }))
        }

        Command::CatalogRebuild => {
            let catalog = catalog_from_payload(payload)?;
            Ok(json!({ "text": rebuild::rebuild(&catalog) }))
        }

        Command::CatalogLookup => {
            let catalog = catalog_from_payload(payload)?;
            let context = payload
                .get("context")
                .and_then(|v| v.as_str())
                .ok_or_else(|| Error::invalid("payload.context is required"))?;
            let source = payload
                .get("source")
                .and_then(|v| v.as_str())
                .ok_or_else(|| Error::invalid("payload.source is required"))?;
            let comment = get_str(payload, "comment");

            let translator = Translator::new(&catalog);
            let mut text = match payload.get("n").and_then(|v| v.as_i64()) {
                Some(n) => translator.translate_plural(context, source, comment, n),
                None => translator.translate(context, source, comment).to_string(),
            };

            if let Some(args) = payload.get("args").and_then(|v| v.as_array()) {
                for a in args {
                    text = match a {
                        Value::String(s) => lookup::arg(&text, s),
                        other => lookup::arg(&text, other),
                    };
                }
            }

            Ok(json!({ "translation": text }))
        }

        Command::CatalogValidate => {
            let catalog = catalog_from_payload(payload)?;
            let issues = qa::run(&catalog);
            Ok(json!({ "valid": qa::is_valid(&issues), "issues": issues }))
        }

        Command::CatalogStats => {
            let catalog = catalog_from_payload(payload)?;
            Ok(serde_json::to_value(stats::compute(&catalog))?)
        }

        Command::DetectEncoding => {
            let path = get_str(payload, "path")
                .ok_or_else(|| Error::invalid("payload.path is required"))?;
            let result = encoding::detect_from_file(Path::new(path))?;
            Ok(serde_json::to_value(result)?)
        }

        Command::TmHarvest => {
            let catalog = catalog_from_payload(payload)?;
            let dir = data_dir_from_payload(payload);
            let cfg = settings::load_from(&dir)?;
            let (source, target) = languages(payload, &catalog, &cfg)?;

            let path = settings::tm_file(&dir, &cfg);
            let harvested = tm::harvest(&catalog, &source, &target);
            let harvested_count = harvested.len();
            let merged = store::merge(store::load(&path), harvested);
            store::save(&path, &merged)?;

            Ok(json!({ "harvested": harvested_count, "total": merged.len() }))
        }

        Command::TmPretranslate => {
            let mut catalog = catalog_from_payload(payload)?;
            let dir = data_dir_from_payload(payload);
            let cfg = settings::load_from(&dir)?;
            let (source, target) = languages(payload, &catalog, &cfg)?;

            let mark_finished = payload
                .get("mark_finished")
                .and_then(|v| v.as_bool())
                .unwrap_or(cfg.mark_pretranslated_finished);

            let memory = store::load(&settings::tm_file(&dir, &cfg));
            let report = pipeline::pretranslate(
                &mut catalog,
                &memory,
                &pipeline::PipelineConfig {
                    source_lang: &source,
                    target_lang: &target,
                    mark_finished,
                },
            );

            Ok(json!({
                "catalog": catalog,
                "text": rebuild::rebuild(&catalog),
                "report": report
            }))
        }

        Command::SettingsLoad => {
            let dir = data_dir_from_payload(payload);
            Ok(json!({ "settings": settings::load_from(&dir)? }))
        }

        Command::SettingsSave => {
            let value = payload.get("settings").cloned().unwrap_or(Value::Null);
            if value.is_null() {
                return Err(Error::invalid("payload.settings is required"));
            }
            let s: Settings = serde_json::from_value(value)
                .map_err(|e| Error::invalid(format!("invalid payload.settings: {e}")))?;
            let dir = data_dir_from_payload(payload);
            Ok(json!({ "settings": settings::save_to(&dir, s)? }))
        }

        Command::Unknown => Err(Error::invalid("unknown command")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = r#"<TS version="2.0" language="es_ES">
<context>
    <name>QHiMDUploadDialog</name>
    <message>
        <location filename="qhimduploaddialog.cpp" line="48"/>
        <source>current track: %1 - %2</source>
        <translation>Pista actual: %1 - %2</translation>
    </message>
    <message>
        <source>Cancel</source>
        <translation type="unfinished"></translation>
    </message>
</context>
</TS>"#;

    fn call(cmd: &str, payload: Value) -> Value {
        let req = json!({ "id": 7, "cmd": cmd, "payload": payload }).to_string();
        serde_json::from_str(&handle(&req)).unwrap()
    }

    #[test]
    fn rejects_bad_requests() {
        let resp: Value = serde_json::from_str(&handle("not json")).unwrap();
        assert_eq!(resp["status"], "error");
        assert_eq!(resp["message"], "invalid json");

        let resp = call("catalog.frobnicate", json!({}));
        assert_eq!(resp["message"], "unknown command");
        assert_eq!(resp["id"], 7);

        let resp = call("catalog.parse", json!({}));
        assert_eq!(resp["status"], "error");
    }

    #[test]
    fn ping() {
        let resp = call("ping", Value::Null);
        assert_eq!(resp["status"], "ok");
        assert_eq!(resp["payload"]["message"], "linguist-core alive");
    }

    #[test]
    fn lookup_with_args() {
        let resp = call(
            "catalog.lookup",
            json!({
                "text": TEXT,
                "context": "QHiMDUploadDialog",
                "source": "current track: %1 - %2",
                "args": [3, "intro.oma"]
            }),
        );
        assert_eq!(resp["payload"]["translation"], "Pista actual: 3 - intro.oma");

        let resp = call(
            "catalog.lookup",
            json!({ "text": TEXT, "context": "QHiMDUploadDialog", "source": "Cancel" }),
        );
        assert_eq!(resp["payload"]["translation"], "Cancel");
    }

    #[test]
    fn lookup_plural_substitutes_count() {
        let text = r#"<TS version="2.0" language="es_ES"><context><name>QHiMDUploadDialog</name>
<message numerus="yes">
    <source>%n track(s) uploaded</source>
    <translation>
        <numerusform>%n pista subida</numerusform>
        <numerusform>%n pistas subidas</numerusform>
    </translation>
</message>
</context></TS>"#;
        let lookup = |n: i64| {
            call(
                "catalog.lookup",
                json!({
                    "text": text,
                    "context": "QHiMDUploadDialog",
                    "source": "%n track(s) uploaded",
                    "n": n
                }),
            )
        };

        assert_eq!(lookup(1)["payload"]["translation"], "1 pista subida");
        assert_eq!(lookup(5)["payload"]["translation"], "5 pistas subidas");

        let resp = call(
            "catalog.lookup",
            json!({
                "text": text,
                "context": "QHiMDUploadDialog",
                "source": "%n track(s) skipped",
                "n": 2
            }),
        );
        assert_eq!(resp["payload"]["translation"], "2 track(s) skipped");
    }

    #[test]
    fn lookup_by_comment_falls_back_to_plain_entry() {
        let text = r#"<TS version="2.0" language="es_ES"><context><name>QHiMDMainWindow</name>
<message>
    <source>Format</source>
    <translation>Formato</translation>
</message>
<message>
    <source>Format</source>
    <comment>menu</comment>
    <translation>Formatear</translation>
</message>
</context></TS>"#;
        let lookup = |comment: &str| {
            call(
                "catalog.lookup",
                json!({
                    "text": text,
                    "context": "QHiMDMainWindow",
                    "source": "Format",
                    "comment": comment
                }),
            )
        };

        assert_eq!(lookup("menu")["payload"]["translation"], "Formatear");
        assert_eq!(lookup("toolbar")["payload"]["translation"], "Formato");
    }

    #[test]
    fn parse_then_rebuild_through_json() {
        let parsed = call("catalog.parse", json!({ "text": TEXT }));
        let catalog = parsed["payload"]["catalog"].clone();
        assert_eq!(catalog["contexts"][0]["messages"][1]["status"], "unfinished");

        let rebuilt = call("catalog.rebuild", json!({ "catalog": catalog }));
        let text = rebuilt["payload"]["text"].as_str().unwrap();
        assert!(text.contains("<translation type=\"unfinished\"></translation>"));
    }

    #[test]
    fn validate_and_stats() {
        let resp = call("catalog.validate", json!({ "text": TEXT }));
        assert_eq!(resp["payload"]["valid"], true);

        let resp = call("catalog.stats", json!({ "text": TEXT }));
        assert_eq!(resp["payload"]["totals"]["finished"], 1);
        assert_eq!(resp["payload"]["totals"]["unfinished"], 1);
    }

    #[test]
    fn harvest_then_pretranslate() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_str().unwrap();

        let donor = r#"<TS version="2.0" language="es_ES"><context><name>QHiMDMainWindow</name>
<message><source>Cancel</source><translation>Cancelar</translation></message>
</context></TS>"#;
        let resp = call(
            "tm.harvest",
            json!({ "text": donor, "source_lang": "en", "data_dir": data_dir }),
        );
        assert_eq!(resp["payload"]["harvested"], 1);

        let resp = call(
            "tm.pretranslate",
            json!({ "text": TEXT, "source_lang": "en", "data_dir": data_dir }),
        );
        assert_eq!(resp["payload"]["report"]["used_tm"], 1);
        let text = resp["payload"]["text"].as_str().unwrap();
        assert!(text.contains("<translation type=\"unfinished\">Cancelar</translation>"));
    }

    #[test]
    fn settings_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_str().unwrap();

        let resp = call(
            "settings.save",
            json!({ "data_dir": data_dir, "settings": { "target_language": "es_ES" } }),
        );
        assert_eq!(resp["status"], "ok");

        let resp = call("settings.load", json!({ "data_dir": data_dir }));
        assert_eq!(resp["payload"]["settings"]["target_language"], "es_ES");
        assert_eq!(resp["payload"]["settings"]["source_language"], "en");

        let resp = call("settings.save", json!({ "data_dir": data_dir }));
        assert_eq!(resp["status"], "error");
    }
}
