// src/common/i18n.rs

use std::{collections::HashMap, sync::Arc};

use anyhow::Context;

pub const DEFAULT_LANG: &str = "pt";

const CATALOGS: [(&str, &str); 2] = [
    ("pt", include_str!("../../locales/pt.json")),
    ("en", include_str!("../../locales/en.json")),
];

// Catálogo de mensagens por idioma, carregado uma vez no AppState
#[derive(Clone)]
pub struct I18nStore {
    catalogs: Arc<HashMap<String, HashMap<String, String>>>,
}

impl I18nStore {
    pub fn new() -> anyhow::Result<Self> {
        let mut catalogs = HashMap::new();
        for (lang, raw) in CATALOGS {
            let messages: HashMap<String, String> = serde_json::from_str(raw)
                .with_context(|| format!("catálogo de mensagens inválido: {lang}"))?;
            catalogs.insert(lang.to_string(), messages);
        }
        Ok(Self { catalogs: Arc::new(catalogs) })
    }

    /// Busca no idioma pedido, depois no padrão (pt); em último caso devolve a própria chave.
    pub fn message(&self, lang: &str, key: &str) -> String {
        [lang, DEFAULT_LANG]
            .iter()
            .find_map(|l| self.catalogs.get(*l).and_then(|c| c.get(key)))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogs_have_the_same_keys() {
        let store = I18nStore::new().unwrap();
        let pt = &store.catalogs["pt"];
        let en = &store.catalogs["en"];
        let mut pt_keys: Vec<_> = pt.keys().collect();
        let mut en_keys: Vec<_> = en.keys().collect();
        pt_keys.sort();
        en_keys.sort();
        assert_eq!(pt_keys, en_keys);
    }

    #[test]
    fn unknown_language_falls_back_to_portuguese() {
        let store = I18nStore::new().unwrap();
        assert_eq!(
            store.message("de", "asset_rented"),
            store.message("pt", "asset_rented")
        );
        assert_ne!(
            store.message("en", "asset_rented"),
            store.message("pt", "asset_rented")
        );
    }

    #[test]
    fn unknown_key_returns_the_key() {
        let store = I18nStore::new().unwrap();
        assert_eq!(store.message("pt", "nao_existe"), "nao_existe");
    }
}
