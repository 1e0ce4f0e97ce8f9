#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    CatalogParse,
    CatalogRebuild,
    CatalogLookup,
    CatalogValidate,
    CatalogStats,
    DetectEncoding,
    TmHarvest,
    TmPretranslate,
    SettingsLoad,
    SettingsSave,
    Unknown,
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "catalog.parse" => Command::CatalogParse,
            "catalog.rebuild" => Command::CatalogRebuild,
            "catalog.lookup" => Command::CatalogLookup,
            "catalog.validate" => Command::CatalogValidate,
            "catalog.stats" => Command::CatalogStats,
            "encoding.detect" => Command::DetectEncoding,
            "tm.harvest" => Command::TmHarvest,
            "tm.pretranslate" => Command::TmPretranslate,
            "settings.load" => Command::SettingsLoad,
            "settings.save" => Command::SettingsSave,
            _ => Command::Unknown,
        }
    }
}
