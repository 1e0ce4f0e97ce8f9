use serde::Serialize;

/// Numerus form selection for a catalog language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PluralRule {
    /// `n == 1` singular, everything else plural (en, es, de, it, nl, sv …).
    OneOther,
    /// 0 and 1 are singular (fr, pt_BR).
    ZeroOneOther,
    /// No plural distinction (ja, zh, ko, vi, th).
    Single,
    /// ru, uk, be.
    EastSlavic,
    /// pl.
    Polish,
}

impl PluralRule {
    /// Rule for a language tag such as `es_ES`, `pt-BR` or `ja`.
    pub fn for_language(tag: &str) -> Self {
        let normalized = tag.trim().replace('-', "_").to_lowercase();
        let lang = normalized.split('_').next().unwrap_or("");

        match lang {
            "ja" | "zh" | "ko" | "vi" | "th" | "id" | "ms" => PluralRule::Single,
            "fr" => PluralRule::ZeroOneOther,
            "pt" if normalized == "pt_br" => PluralRule::ZeroOneOther,
            "ru" | "uk" | "be" => PluralRule::EastSlavic,
            "pl" => PluralRule::Polish,
            _ => PluralRule::OneOther,
        }
    }

    pub fn form_count(self) -> usize {
        match self {
            PluralRule::Single => 1,
            PluralRule::OneOther | PluralRule::ZeroOneOther => 2,
            PluralRule::EastSlavic | PluralRule::Polish => 3,
        }
    }

    /// Index of the numerus form to use for `n`.
    pub fn index(self, n: i64) -> usize {
        let n = n.unsigned_abs();
        let (n10, n100) = (n % 10, n % 100);
        let few = (2..=4).contains(&n10) && !(12..=14).contains(&n100);

        match self {
            PluralRule::Single => 0,
            PluralRule::OneOther => usize::from(n != 1),
            PluralRule::ZeroOneOther => usize::from(n > 1),
            PluralRule::EastSlavic => {
                if n10 == 1 && n100 != 11 {
                    0
                } else if few {
                    1
                } else {
                    2
                }
            }
            PluralRule::Polish => {
                if n == 1 {
                    0
                } else if few {
                    1
                } else {
                    2
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spanish_has_two_forms() {
        let rule = PluralRule::for_language("es_ES");
        assert_eq!(rule, PluralRule::OneOther);
        assert_eq!(rule.form_count(), 2);
        assert_eq!(rule.index(0), 1);
        assert_eq!(rule.index(1), 0);
        assert_eq!(rule.index(2), 1);
    }

    #[test]
    fn language_tag_variants() {
        assert_eq!(PluralRule::for_language("pt-BR"), PluralRule::ZeroOneOther);
        assert_eq!(PluralRule::for_language("pt_PT"), PluralRule::OneOther);
        assert_eq!(PluralRule::for_language("ja"), PluralRule::Single);
        assert_eq!(PluralRule::for_language("RU_ru"), PluralRule::EastSlavic);
        assert_eq!(PluralRule::for_language(""), PluralRule::OneOther);
    }

    #[test]
    fn east_slavic_forms() {
        let rule = PluralRule::EastSlavic;
        assert_eq!(rule.index(1), 0);
        assert_eq!(rule.index(21), 0);
        assert_eq!(rule.index(11), 2);
        assert_eq!(rule.index(3), 1);
        assert_eq!(rule.index(13), 2);
        assert_eq!(rule.index(25), 2);
    }

    #[test]
    fn polish_forms() {
        let rule = PluralRule::Polish;
        assert_eq!(rule.index(1), 0);
        assert_eq!(rule.index(22), 1);
        assert_eq!(rule.index(12), 2);
        assert_eq!(rule.index(21), 2);
    }
}
